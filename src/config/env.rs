use crate::config::{
    ApiConfig, AppConfig, AwsConfig, DatabaseConfig, OutputConfig, OutputFormat, ReportConfig,
};
use crate::utils::error::{EtlError, Result};
use secrecy::SecretString;
use std::env;

pub const DEFAULT_ENV_OUTPUT_FOLDER: &str = "/tmp/output";

impl AppConfig {
    /// Builds the configuration from environment variables, the way the Lambda is deployed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| EtlError::MissingConfigError {
                field: name.to_string(),
            })
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| EtlError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => 3306,
        };

        let mysql = DatabaseConfig {
            host: required("HOST_MYSQL")?,
            port,
            user: required("USER_MYSQL")?,
            password: SecretString::new(required("PASSWORD")?),
            database: required("DB_NAME")?,
        };

        let api = lookup("URL").map(|url| ApiConfig { url });

        let aws = lookup("BUCKET_NAME").map(|bucket_name| AwsConfig {
            bucket_name,
            region: lookup("S3_REGION").unwrap_or_else(|| "ap-southeast-2".to_string()),
            file_path_s3: lookup("FILE_PATH_S3"),
            key_prefix: lookup("S3_PREFIX").unwrap_or_else(|| "etl-output".to_string()),
            access_key: lookup("ACCESS_KEY"),
            secret_key: lookup("SECRET_KEY").map(SecretString::new),
        });

        let format = match lookup("OUTPUT_FORMAT").as_deref() {
            None => None,
            Some("json") => Some(OutputFormat::Json),
            Some("csv") => Some(OutputFormat::Csv),
            Some(other) => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "OUTPUT_FORMAT".to_string(),
                    value: other.to_string(),
                    reason: "Valid formats: json, csv".to_string(),
                })
            }
        };

        let report = match lookup("REPORT_LIMIT") {
            Some(raw) => ReportConfig {
                limit: raw.parse().map_err(|_| EtlError::InvalidConfigValueError {
                    field: "REPORT_LIMIT".to_string(),
                    value: raw.clone(),
                    reason: "must be a positive integer".to_string(),
                })?,
            },
            None => ReportConfig::default(),
        };

        Ok(Self {
            mysql,
            api,
            aws,
            output: OutputConfig {
                // Lambda 只有 /tmp 可寫
                folder: lookup("OUTPUT_FOLDER")
                    .unwrap_or_else(|| DEFAULT_ENV_OUTPUT_FOLDER.to_string()),
                format,
            },
            report,
        })
    }
}
