//! Read entities definitions.

pub mod inquiry;
pub mod legal_document;
pub mod property;
pub mod user;
