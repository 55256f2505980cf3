#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use customer_etl::core::{Connection, Connector, ObjectStore, Payload, Publish};
use customer_etl::domain::model::{SqlRow, SqlValue};
use customer_etl::{EtlError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Shared, ordered record of what the fakes were asked to do.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.as_str() == call)
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// In-memory `customers` and `orders` tables behind the [`Connector`] port.
#[derive(Clone, Default)]
pub struct FakeDatabase {
    pub customers: Vec<(i64, String)>,
    pub totals: Vec<(i64, i64)>,
    pub refuse_connections: bool,
    pub fail_queries: bool,
    pub log: CallLog,
}

impl FakeDatabase {
    pub fn with_customers(customers: &[(i64, &str)]) -> Self {
        Self {
            customers: customers
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

pub struct FakeConnection {
    db: FakeDatabase,
}

#[async_trait]
impl Connector for FakeDatabase {
    type Conn = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection> {
        self.log.push("connect");
        if self.refuse_connections {
            return Err(EtlError::DbConnectError {
                target: self.describe(),
                source: "Access denied for user 'etl'".into(),
            });
        }
        Ok(FakeConnection { db: self.clone() })
    }

    fn describe(&self) -> String {
        "fake:3306/sales".to_string()
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        self.db.log.push("execute");
        if self.db.fail_queries {
            return Err(EtlError::QueryError {
                query: query.to_string(),
                source: "Unknown column 'CustomerID'".into(),
            });
        }

        if query.contains("FROM orders") {
            let limit = match params {
                [SqlValue::Int(limit)] => *limit as usize,
                _ => 0,
            };
            let mut totals = self.db.totals.clone();
            totals.sort_by(|a, b| b.1.cmp(&a.1));
            totals.truncate(limit);
            return Ok(totals
                .into_iter()
                .map(|(id, total)| vec![SqlValue::Int(id), SqlValue::Decimal(total.into())])
                .collect());
        }

        let mut rows: Vec<_> = self
            .db
            .customers
            .iter()
            .filter(|(id, _)| params.contains(&SqlValue::Int(*id)))
            .cloned()
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        Ok(rows
            .into_iter()
            .map(|(id, name)| vec![SqlValue::Int(id), SqlValue::Text(name), SqlValue::Date(today())])
            .collect())
    }

    async fn close(self) -> Result<()> {
        self.db.log.push("close");
        Ok(())
    }
}

/// Object store kept in memory; buckets must exist before objects are written.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    buckets: Arc<Mutex<HashSet<String>>>,
    fail_create_bucket: bool,
    fail_put: bool,
    pub log: CallLog,
}

impl MemoryStore {
    pub fn with_object(bucket: &str, key: &str, data: &[u8]) -> Self {
        let store = Self::default();
        store.buckets.lock().unwrap().insert(bucket.to_string());
        store
            .objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
        store
    }

    /// Bucket creation fails with a non-storage error, as a throttled client would.
    pub fn refusing_bucket_creation(mut self) -> Self {
        self.fail_create_bucket = true;
        self
    }

    pub fn refusing_uploads(mut self) -> Self {
        self.fail_put = true;
        self
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.lock().unwrap().contains(bucket)
    }
}

impl ObjectStore for MemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.log.push("get_object");
        self.object(bucket, key).ok_or_else(|| EtlError::NotFoundError {
            path: format!("s3://{}/{}", bucket, key),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.log.push("put_object");
        if self.fail_put {
            return Err(EtlError::StorageError {
                message: format!("AccessDenied: s3://{}/{}", bucket, key),
            });
        }
        if !self.has_bucket(bucket) {
            return Err(EtlError::StorageError {
                message: format!("NoSuchBucket: {}", bucket),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.has_bucket(bucket))
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> Result<()> {
        self.log.push("create_bucket");
        if self.fail_create_bucket {
            return Err(EtlError::IoError(std::io::Error::other("SlowDown")));
        }
        self.buckets.lock().unwrap().insert(bucket.to_string());
        Ok(())
    }
}

/// Keeps every payload it is given and writes "publish" into the shared log.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub log: CallLog,
    pub payloads: Arc<Mutex<Vec<Payload>>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn sharing(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Publish for RecordingPublisher {
    async fn publish(&self, payload: &Payload) -> Result<String> {
        self.log.push("publish");
        if self.fail {
            return Err(EtlError::PublishError {
                status: Some(500),
                body: "boom".to_string(),
                source: None,
            });
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok("memory://published".to_string())
    }
}
