use crate::config::DatabaseConfig;
use crate::domain::model::{SqlRow, SqlValue};
use crate::domain::ports::{Connection, Connector};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection as _, Row, TypeInfo};
use std::str::FromStr;

/// Opens one MySQL connection per run.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    options: MySqlConnectOptions,
    target: String,
}

impl MySqlConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.database);

        Self {
            options,
            target: format!(
                "mysql://{}@{}:{}/{}",
                config.user, config.host, config.port, config.database
            ),
        }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Conn = MySqlSession;

    async fn connect(&self) -> Result<MySqlSession> {
        let conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| EtlError::DbConnectError {
                target: self.target.clone(),
                source: Box::new(e),
            })?;

        Ok(MySqlSession {
            conn,
            target: self.target.clone(),
        })
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

pub struct MySqlSession {
    conn: MySqlConnection,
    target: String,
}

fn query_error(query: &str, source: sqlx::Error) -> EtlError {
    EtlError::QueryError {
        query: query.to_string(),
        source: Box::new(source),
    }
}

#[async_trait]
impl Connection for MySqlSession {
    async fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        let mut statement = sqlx::query(query);
        for param in params {
            statement = match param {
                SqlValue::Null => statement.bind(None::<String>),
                SqlValue::Int(value) => statement.bind(*value),
                SqlValue::Text(value) => statement.bind(value.clone()),
                SqlValue::Decimal(value) => statement.bind(value.clone()),
                SqlValue::Date(value) => statement.bind(*value),
            };
        }

        let rows = statement
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| query_error(query, e))?;

        rows.iter()
            .map(|row| decode_row(row).map_err(|e| query_error(query, e)))
            .collect()
    }

    async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(|e| EtlError::DbConnectError {
            target: self.target,
            source: Box::new(e),
        })
    }
}

fn decode_row(row: &MySqlRow) -> std::result::Result<SqlRow, sqlx::Error> {
    (0..row.len()).map(|idx| decode_column(row, idx)).collect()
}

fn decode_column(row: &MySqlRow, idx: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let type_name = row.column(idx).type_info().name().to_ascii_uppercase();

    let value = match type_name.as_str() {
        "NULL" => None,
        name if name.ends_with("UNSIGNED") => {
            row.try_get::<Option<u64>, _>(idx)?.map(|v| match i64::try_from(v) {
                Ok(v) => SqlValue::Int(v),
                Err(_) => SqlValue::Text(v.to_string()),
            })
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int)
        }
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "DECIMAL" => row
            .try_get::<Option<BigDecimal>, _>(idx)?
            .map(SqlValue::Decimal),
        "FLOAT" | "DOUBLE" => match row.try_get::<Option<f64>, _>(idx)? {
            Some(v) => Some(SqlValue::Decimal(BigDecimal::from_str(&v.to_string()).map_err(
                |e| sqlx::Error::Decode(Box::new(e)),
            )?)),
            None => None,
        },
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
        _ => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
    };

    Ok(value.unwrap_or(SqlValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_describe_hides_password() {
        let config = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 3307,
            user: "etl".to_string(),
            password: SecretString::new("hunter2".to_string()),
            database: "sales".to_string(),
        };

        let connector = MySqlConnector::new(&config);

        assert_eq!(connector.describe(), "mysql://etl@db.internal:3307/sales");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
