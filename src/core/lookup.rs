use crate::domain::model::{CustomerId, CustomerRecord, SqlRow, SqlValue};
use crate::domain::ports::Connection;
use crate::utils::error::{EtlError, Result};

/// Builds the lookup statement with one bound placeholder per id.
pub fn customer_query(id_count: usize) -> String {
    let placeholders = vec!["?"; id_count].join(", ");
    format!(
        "SELECT CustomerID AS id, CustomerName AS name, CURDATE() AS as_of_date \
         FROM customers WHERE CustomerID IN ({}) ORDER BY CustomerID ASC",
        placeholders
    )
}

/// Fetches the customers matching `ids`, ordered by id. Unknown ids are skipped.
pub async fn lookup_customers<C: Connection>(
    conn: &mut C,
    ids: &[CustomerId],
) -> Result<Vec<CustomerRecord>> {
    if ids.is_empty() {
        return Err(EtlError::InvalidArgumentError {
            message: "customer lookup needs at least one id".to_string(),
        });
    }

    let query = customer_query(ids.len());
    let params: Vec<SqlValue> = ids.iter().map(SqlValue::from).collect();

    tracing::info!(ids = ids.len(), "querying the customers table");
    let rows = conn.execute(&query, &params).await?;

    let records = rows
        .into_iter()
        .map(|row| to_record(&query, row))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        matched = records.len(),
        missing = ids.len().saturating_sub(records.len()),
        "customer rows extracted"
    );
    Ok(records)
}

fn to_record(query: &str, row: SqlRow) -> Result<CustomerRecord> {
    let shape_error = |detail: String| EtlError::QueryError {
        query: query.to_string(),
        source: detail.into(),
    };

    let mut columns = row.into_iter();
    match (columns.next(), columns.next(), columns.next()) {
        (Some(id), Some(SqlValue::Text(name)), Some(SqlValue::Date(as_of_date))) => {
            let id = match id {
                SqlValue::Int(id) => CustomerId::Int(id),
                SqlValue::Text(id) => CustomerId::Text(id),
                other => return Err(shape_error(format!("unexpected customer id {:?}", other))),
            };
            Ok(CustomerRecord {
                id,
                name,
                as_of_date,
            })
        }
        other => Err(shape_error(format!("unexpected customer row {:?}", other))),
    }
}
