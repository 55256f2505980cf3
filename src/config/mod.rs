#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use secrecy::SecretString;
use serde::Deserialize;

/// 整個行程共用、啟動時載入一次的設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mysql: DatabaseConfig,
    pub api: Option<ApiConfig>,
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    pub bucket_name: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Object key of the customer id file
    pub file_path_s3: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    pub access_key: Option<String>,
    pub secret_key: Option<SecretString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_folder")]
    pub folder: String,
    pub format: Option<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: default_output_folder(),
            format: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_limit")]
    pub limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: default_report_limit(),
        }
    }
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_region() -> String {
    "ap-southeast-2".to_string()
}

fn default_key_prefix() -> String {
    "etl-output".to_string()
}

fn default_output_folder() -> String {
    "./output".to_string()
}

fn default_report_limit() -> usize {
    10
}

impl AppConfig {
    /// 有指定檔案時讀 TOML，否則讀環境變數
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn api_url(&self) -> Result<&str> {
        validation::validate_required_field("api.url", &self.api).map(|api| api.url.as_str())
    }

    pub fn aws(&self) -> Result<&AwsConfig> {
        validation::validate_required_field("aws", &self.aws)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        // 資料庫
        validation::validate_non_empty_string("mysql.host", &self.mysql.host)?;
        validation::validate_range("mysql.port", self.mysql.port, 1, u16::MAX)?;
        validation::validate_non_empty_string("mysql.user", &self.mysql.user)?;
        validation::validate_non_empty_string("mysql.database", &self.mysql.database)?;

        if let Some(api) = &self.api {
            validation::validate_url("api.url", &api.url)?;
        }

        if let Some(aws) = &self.aws {
            validation::validate_s3_bucket_name("aws.bucket_name", &aws.bucket_name)?;
            validation::validate_aws_region("aws.region", &aws.region)?;
            validation::validate_non_empty_string("aws.key_prefix", &aws.key_prefix)?;
            if aws.access_key.is_some() != aws.secret_key.is_some() {
                return Err(crate::utils::error::EtlError::ConfigError {
                    message: "aws.access_key and aws.secret_key must be set together".to_string(),
                });
            }
        }

        validation::validate_path("output.folder", &self.output.folder)?;
        validation::validate_range("report.limit", self.report.limit, 1, 1000)?;

        tracing::debug!("configuration validation passed");
        Ok(())
    }
}
