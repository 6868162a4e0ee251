//! [`Handler`] abstraction.

use std::future::Future;

/// Executor of an `Op`eration.
///
/// The service implements it for every command and query it serves, and a
/// database implements it for every storage operation it supports. Callers
/// bound on exactly the operations they issue, so any backend providing them
/// fits.
///
/// ```rust
/// use common::Handler;
///
/// struct Double;
///
/// impl Handler<u32> for Double {
///     type Ok = u32;
///     type Err = &'static str;
///
///     async fn execute(&self, n: u32) -> Result<u32, Self::Err> {
///         n.checked_mul(2).ok_or("overflow")
///     }
/// }
/// ```
pub trait Handler<Op = ()> {
    /// Outcome of a successfully executed `Op`.
    type Ok;

    /// Error of executing an `Op`.
    type Err;

    /// Executes the provided `Op`.
    fn execute(
        &self,
        op: Op,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
