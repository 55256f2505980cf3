use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque customer key. Numeric keys stay numeric so they serialize as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerId::Int(id) => write!(f, "{}", id),
            CustomerId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        CustomerId::Int(id)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        CustomerId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    #[serde(rename = "date")]
    pub as_of_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomerRow {
    pub id: CustomerId,
    pub total: BigDecimal,
}

/// What a run hands to the publisher.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Customers(Vec<CustomerRecord>),
    TopCustomers(Vec<TopCustomerRow>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Customers(rows) => rows.len(),
            Payload::TopCustomers(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Payload::Customers(rows) => serde_json::to_vec(rows),
            Payload::TopCustomers(rows) => serde_json::to_vec(rows),
        }
    }

    pub fn to_csv(&self) -> crate::utils::error::Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        match self {
            Payload::Customers(rows) => {
                for row in rows {
                    writer.serialize(row)?;
                }
            }
            Payload::TopCustomers(rows) => {
                for row in rows {
                    writer.serialize(row)?;
                }
            }
        }
        writer
            .into_inner()
            .map_err(|e| crate::utils::error::EtlError::IoError(e.into_error()))
    }
}

/// Parameter and column values exchanged with a [`Connection`](crate::domain::ports::Connection).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
    Decimal(BigDecimal),
    Date(NaiveDate),
}

impl From<&CustomerId> for SqlValue {
    fn from(id: &CustomerId) -> Self {
        match id {
            CustomerId::Int(id) => SqlValue::Int(*id),
            CustomerId::Text(id) => SqlValue::Text(id.clone()),
        }
    }
}

pub type SqlRow = Vec<SqlValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Connected,
    Extracted,
    Queried,
    Published,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "INIT",
            PipelineState::Connected => "CONNECTED",
            PipelineState::Extracted => "EXTRACTED",
            PipelineState::Queried => "QUERIED",
            PipelineState::Published => "PUBLISHED",
            PipelineState::Done => "DONE",
            PipelineState::Failed => "FAILED",
        }
    }
}

/// The step that ended a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DbConnect,
    Extract,
    Query,
    Publish,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Done { records: usize, destination: String },
    Failed {
        kind: FailureKind,
        error: crate::utils::error::EtlError,
    },
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, PipelineOutcome::Done { .. })
    }

    pub fn state(&self) -> PipelineState {
        match self {
            PipelineOutcome::Done { .. } => PipelineState::Done,
            PipelineOutcome::Failed { .. } => PipelineState::Failed,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            PipelineOutcome::Done { .. } => None,
            PipelineOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}
