//! Infrastructure layer.

pub mod database;
pub mod geocoder;
pub mod media;

pub use self::{
    database::Database, geocoder::Geocoder, media::MediaStorage,
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
