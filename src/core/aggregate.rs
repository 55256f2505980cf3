use crate::domain::model::{CustomerId, SqlRow, SqlValue, TopCustomerRow};
use crate::domain::ports::Connection;
use crate::utils::error::{EtlError, Result};

pub const DEFAULT_TOP_N: usize = 10;

/// Order value per line: quantity times discounted unit price, plus shipping.
/// Ties at the limit come back in whatever order MySQL produces.
pub const TOP_CUSTOMERS_QUERY: &str = "SELECT CustomerID AS id, \
     CAST(SUM(OrderQuantity * ((UnitPrice * (1 - Discount)) + ShippingCost)) AS DECIMAL(20, 4)) AS total \
     FROM orders GROUP BY CustomerID ORDER BY total DESC LIMIT ?";

pub async fn top_customers<C: Connection>(conn: &mut C, n: usize) -> Result<Vec<TopCustomerRow>> {
    if n == 0 {
        return Err(EtlError::InvalidArgumentError {
            message: "top customer limit must be positive".to_string(),
        });
    }
    let limit = i64::try_from(n).map_err(|_| EtlError::InvalidArgumentError {
        message: format!("top customer limit {} is too large", n),
    })?;

    tracing::info!(limit = n, "querying the orders table");
    let rows = conn
        .execute(TOP_CUSTOMERS_QUERY, &[SqlValue::Int(limit)])
        .await?;

    let mut top = rows
        .into_iter()
        .map(to_row)
        .collect::<Result<Vec<_>>>()?;
    // never more than n rows, whatever the engine returned
    top.truncate(n);

    tracing::info!(rows = top.len(), "top customers computed");
    Ok(top)
}

fn to_row(row: SqlRow) -> Result<TopCustomerRow> {
    let mut columns = row.into_iter();
    let id = match columns.next() {
        Some(SqlValue::Int(id)) => CustomerId::Int(id),
        Some(SqlValue::Text(id)) => CustomerId::Text(id),
        other => return Err(shape_error(format!("unexpected customer id {:?}", other))),
    };
    let total = match columns.next() {
        Some(SqlValue::Decimal(total)) => total,
        Some(SqlValue::Int(total)) => total.into(),
        other => return Err(shape_error(format!("unexpected order total {:?}", other))),
    };
    Ok(TopCustomerRow { id, total })
}

fn shape_error(detail: String) -> EtlError {
    EtlError::QueryError {
        query: TOP_CUSTOMERS_QUERY.to_string(),
        source: detail.into(),
    }
}
