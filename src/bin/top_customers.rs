use clap::Parser;
use customer_etl::runner;
use customer_etl::utils::{logger, validation::Validate};
use customer_etl::{AppConfig, EtlEngine, MySqlConnector, PipelineOutcome, S3ObjectStore};

#[derive(Parser)]
#[command(name = "top-customers")]
#[command(about = "Write the top customers by order value to the output folder and bucket")]
struct Args {
    /// Path to TOML configuration file; environment variables are used when absent
    #[arg(short, long)]
    config: Option<String>,

    /// Number of customers in the report (overrides report.limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Keep the report on the local filesystem even when a bucket is configured
    #[arg(long)]
    local_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log CPU and memory usage per pipeline state
    #[arg(long)]
    monitor: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);
    tracing::info!("🚀 Starting top customers report");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(limit) = args.limit {
        config.report.limit = limit;
        tracing::info!("🔧 Report limit overridden to: {}", limit);
    }
    config.validate()?;

    let store = match (&config.aws, args.local_only) {
        (Some(aws), false) => Some(S3ObjectStore::from_config(aws).await),
        _ => None,
    };
    let publisher = runner::report_publisher(&config, store);

    let engine = EtlEngine::new_with_monitoring(
        MySqlConnector::new(&config.mysql),
        publisher,
        args.monitor,
    );

    match engine.run_top_customers(config.report.limit).await {
        PipelineOutcome::Done {
            records,
            destination,
        } => {
            println!("✅ Top {} customers written to {}", records, destination);
            Ok(())
        }
        PipelineOutcome::Failed { kind, error } => {
            eprintln!("❌ {}", error.user_friendly_message());
            eprintln!("💡 {}", error.recovery_suggestion());
            Err(anyhow::anyhow!("top customers run failed at {:?}: {}", kind, error))
        }
    }
}
