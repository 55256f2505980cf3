pub mod aggregate;
pub mod etl;
pub mod extract;
pub mod lookup;
pub mod publish;

pub use crate::domain::model::{Payload, PipelineOutcome};
pub use crate::domain::ports::{ByteSource, Connection, Connector, ObjectStore, Publish};
pub use crate::utils::error::Result;
