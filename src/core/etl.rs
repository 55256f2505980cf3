use crate::core::{aggregate, extract, lookup};
use crate::domain::model::{FailureKind, Payload, PipelineOutcome, PipelineState};
use crate::domain::ports::{ByteSource, Connection, Connector, Publish};
use crate::utils::error::EtlError;
use crate::utils::monitor::SystemMonitor;

/// Runs one pipeline at a time: connect, query, release, publish.
///
/// Every step error ends the run in [`PipelineState::Failed`]; nothing is retried.
/// A connection that was opened is closed exactly once before the publisher runs
/// or the failure is reported.
pub struct EtlEngine<C: Connector, P: Publish> {
    connector: C,
    publisher: P,
    monitor: SystemMonitor,
}

impl<C: Connector, P: Publish> EtlEngine<C, P> {
    pub fn new(connector: C, publisher: P) -> Self {
        Self::new_with_monitoring(connector, publisher, false)
    }

    pub fn new_with_monitoring(connector: C, publisher: P, monitor_enabled: bool) -> Self {
        Self {
            connector,
            publisher,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Lookup flow: ids from `source`, matching customers from the database.
    pub async fn run_lookup<S: ByteSource>(&self, source: &S) -> PipelineOutcome {
        tracing::info!(source = %source.describe(), "starting customer lookup run");

        let mut conn = match self.open().await {
            Ok(conn) => conn,
            Err(error) => return fail(FailureKind::DbConnect, error),
        };

        let queried = self.extract_and_lookup(&mut conn, source).await;
        self.release(conn).await;

        match queried {
            Ok(payload) => self.publish(payload).await,
            Err((kind, error)) => fail(kind, error),
        }
    }

    /// Aggregate flow: the `n` customers with the highest order totals.
    pub async fn run_top_customers(&self, n: usize) -> PipelineOutcome {
        tracing::info!(limit = n, "starting top customers run");

        let mut conn = match self.open().await {
            Ok(conn) => conn,
            Err(error) => return fail(FailureKind::DbConnect, error),
        };

        let queried = aggregate::top_customers(&mut conn, n).await;
        self.release(conn).await;

        match queried {
            Ok(rows) => {
                self.transition(PipelineState::Queried);
                self.publish(Payload::TopCustomers(rows)).await
            }
            Err(error) => fail(FailureKind::Query, error),
        }
    }

    async fn open(&self) -> Result<C::Conn, EtlError> {
        self.transition(PipelineState::Init);
        let conn = self.connector.connect().await?;
        tracing::info!(target_db = %self.connector.describe(), "database connection opened");
        self.transition(PipelineState::Connected);
        Ok(conn)
    }

    async fn extract_and_lookup<S: ByteSource>(
        &self,
        conn: &mut C::Conn,
        source: &S,
    ) -> Result<Payload, (FailureKind, EtlError)> {
        let ids = source
            .read()
            .await
            .and_then(|bytes| extract::extract_ids(&bytes))
            .map_err(|e| (FailureKind::Extract, e))?;
        self.transition(PipelineState::Extracted);
        tracing::info!(source = %source.describe(), count = ids.len(), "extracted customer ids");

        let records = lookup::lookup_customers(conn, &ids)
            .await
            .map_err(|e| (FailureKind::Query, e))?;
        self.transition(PipelineState::Queried);

        Ok(Payload::Customers(records))
    }

    async fn release(&self, conn: C::Conn) {
        match conn.close().await {
            Ok(()) => tracing::info!("database connection closed"),
            Err(e) => tracing::warn!(error = %e, "database connection did not close cleanly"),
        }
    }

    async fn publish(&self, payload: Payload) -> PipelineOutcome {
        let records = payload.len();
        match self.publisher.publish(&payload).await {
            Ok(destination) => {
                self.transition(PipelineState::Published);
                self.transition(PipelineState::Done);
                tracing::info!(
                    records,
                    destination = %destination,
                    "SUCCESS: pipeline run completed"
                );
                PipelineOutcome::Done {
                    records,
                    destination,
                }
            }
            Err(error) => fail(FailureKind::Publish, error),
        }
    }

    fn transition(&self, state: PipelineState) {
        tracing::debug!(state = state.as_str(), "pipeline state");
        if self.monitor.is_enabled() {
            self.monitor.log_stats(state.as_str());
        }
    }
}

fn fail(kind: FailureKind, error: EtlError) -> PipelineOutcome {
    tracing::error!(
        state = PipelineState::Failed.as_str(),
        kind = ?kind,
        category = ?error.category(),
        error = %error,
        "ERROR: pipeline run failed"
    );
    PipelineOutcome::Failed { kind, error }
}
