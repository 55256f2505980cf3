use customer_etl::adapters::mysql::MySqlConnector;
use customer_etl::event::S3Event;
use customer_etl::runner::{self, RecordReport, SinkKind};
use customer_etl::utils::{logger, validation::Validate};
use customer_etl::{AppConfig, EtlEngine, S3ObjectStore, Sink};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

type Engine = EtlEngine<MySqlConnector, Sink<S3ObjectStore>>;

#[derive(Debug, Serialize)]
pub struct Response {
    pub message: String,
    pub processed: Vec<RecordReport>,
}

/// 每一筆 S3 通知各自跑一次，失敗不會影響其他筆
async fn function_handler(
    engine: &Engine,
    store: &S3ObjectStore,
    event: LambdaEvent<S3Event>,
) -> Result<Response, Error> {
    let processed = runner::run_event(engine, store, &event.payload).await;

    let failed = processed.iter().filter(|r| r.error.is_some()).count();
    let message = format!(
        "{} of {} records processed successfully",
        processed.len() - failed,
        processed.len()
    );
    tracing::info!("{}", message);

    Ok(Response { message, processed })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = AppConfig::from_env()?;
    config.validate()?;

    let store = match &config.aws {
        Some(aws) => S3ObjectStore::from_config(aws).await,
        None => S3ObjectStore::from_env().await,
    };

    // 有 URL 就送 API，否則寫檔並上傳到 bucket
    let sink_kind = if config.api.is_some() {
        SinkKind::Http
    } else {
        SinkKind::Storage
    };
    let sink = runner::lookup_sink(&config, sink_kind, store.clone())?;
    let engine = EtlEngine::new(MySqlConnector::new(&config.mysql), sink);

    let engine = &engine;
    let store = &store;
    run(service_fn(move |event: LambdaEvent<S3Event>| async move {
        function_handler(engine, store, event).await
    }))
    .await
}
