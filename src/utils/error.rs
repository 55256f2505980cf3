use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Database connection failed ({target}): {source}")]
    DbConnectError {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("Query failed: {source} (query: {query})")]
    QueryError {
        query: String,
        #[source]
        source: BoxError,
    },

    #[error("Malformed input: {message}")]
    MalformedInputError { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgumentError { message: String },

    /// `status` is `None` when no response came back.
    #[error("Publish failed ({}): {body}", status_label(.status))]
    PublishError {
        status: Option<u16>,
        body: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Not found: {path}")]
    NotFoundError { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Database,
    Input,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::DbConnectError { .. } | EtlError::QueryError { .. } => {
                ErrorCategory::Database
            }
            EtlError::MalformedInputError { .. }
            | EtlError::InvalidArgumentError { .. }
            | EtlError::SerializationError(_)
            | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::PublishError { .. } => ErrorCategory::Network,
            EtlError::StorageError { .. } | EtlError::NotFoundError { .. } | EtlError::IoError(_) => {
                ErrorCategory::Storage
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Database | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DbConnectError { target, .. } => {
                format!("Could not connect to the database at {}", target)
            }
            EtlError::QueryError { .. } => "The database query did not complete".to_string(),
            EtlError::MalformedInputError { message } => {
                format!("The customer id file could not be read: {}", message)
            }
            EtlError::InvalidArgumentError { message } => message.clone(),
            EtlError::PublishError {
                status: Some(status),
                ..
            } => format!("The API rejected the data (HTTP {})", status),
            EtlError::PublishError { status: None, .. } => {
                "The API could not be reached".to_string()
            }
            EtlError::StorageError { message } => format!("Could not store the output: {}", message),
            EtlError::NotFoundError { path } => format!("{} does not exist", path),
            EtlError::IoError(e) => format!("File system error: {}", e),
            EtlError::SerializationError(_) | EtlError::CsvError(_) => {
                "The output could not be serialized".to_string()
            }
            EtlError::ConfigError { message } => message.clone(),
            EtlError::MissingConfigError { field } => format!("{} is not configured", field),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::DbConnectError { .. } => {
                "Check HOST_MYSQL, PORT, USER_MYSQL and PASSWORD and that the database is reachable"
            }
            EtlError::QueryError { .. } => "Check that the customers and orders tables exist",
            EtlError::MalformedInputError { .. } => {
                "The input must be a JSON object with a \"CustomerID\" mapping"
            }
            EtlError::InvalidArgumentError { .. } => "Check the input file and command arguments",
            EtlError::PublishError { .. } => {
                "Check the API url and that the service accepts POST requests"
            }
            EtlError::StorageError { .. } => "Check bucket permissions and the output folder",
            EtlError::NotFoundError { .. } | EtlError::IoError(_) => {
                "Check that the path exists and is readable"
            }
            EtlError::SerializationError(_) | EtlError::CsvError(_) => {
                "Inspect the queried rows for unexpected values"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => "Fix config.toml or the environment",
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("HTTP {}", status),
        None => "no response".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
