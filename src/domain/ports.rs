use crate::domain::model::{Payload, SqlRow, SqlValue};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Opens database connections for one pipeline run.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    async fn connect(&self) -> Result<Self::Conn>;

    /// Human readable target for logs, never includes credentials.
    fn describe(&self) -> String;
}

/// A single open database connection. `close` consumes the handle so a released
/// connection cannot be used again.
#[async_trait]
pub trait Connection: Send + Sized {
    async fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>>;

    async fn close(self) -> Result<()>;
}

pub trait ObjectStore: Send + Sync {
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn bucket_exists(&self, bucket: &str)
        -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_bucket(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where the customer id document comes from.
pub trait ByteSource: Send + Sync {
    fn read(&self) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn describe(&self) -> String;
}

#[async_trait]
pub trait Publish: Send + Sync {
    /// Delivers the payload and returns where it went.
    async fn publish(&self, payload: &Payload) -> Result<String>;
}
