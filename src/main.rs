use clap::Parser;
use customer_etl::runner;
use customer_etl::utils::error::ErrorSeverity;
use customer_etl::utils::{logger, validation::Validate};
use customer_etl::{
    AppConfig, CliConfig, EtlEngine, EtlError, MySqlConnector, PipelineOutcome, S3ObjectStore,
};

fn exit_code(e: &EtlError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_and_exit(e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting customer-etl");
    tracing::debug!("CLI config: {:?}", cli);

    // 載入並驗證配置
    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_and_exit(&e),
    };
    if let Err(e) = config.validate() {
        report_and_exit(&e);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 沒有 [aws] 區段時用預設的 AWS 設定鏈；真的需要 bucket 時 runner 會回報缺少設定
    let store = match &config.aws {
        Some(aws) => S3ObjectStore::from_config(aws).await,
        None => S3ObjectStore::from_env().await,
    };

    let sink = match runner::lookup_sink(&config, cli.sink, store.clone()) {
        Ok(sink) => sink,
        Err(e) => report_and_exit(&e),
    };
    let engine = EtlEngine::new_with_monitoring(MySqlConnector::new(&config.mysql), sink, cli.monitor);

    let outcome = match runner::run_lookup(
        &engine,
        &config,
        cli.source,
        cli.input_data.as_deref(),
        &store,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => report_and_exit(&e),
    };

    match outcome {
        PipelineOutcome::Done {
            records,
            destination,
        } => {
            println!("✅ {} customer records published to {}", records, destination);
            Ok(())
        }
        PipelineOutcome::Failed { kind, error } => {
            tracing::error!("❌ Run failed at {:?}", kind);
            report_and_exit(&error)
        }
    }
}
