// Adapters: concrete implementations of the domain ports (database, object storage, byte sources).

pub mod mysql;
#[cfg(feature = "s3")]
pub mod s3;
pub mod source;
