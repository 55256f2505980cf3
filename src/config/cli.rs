pub use crate::runner::{SinkKind, SourceKind};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "customer-etl")]
#[command(about = "Look up customers by id and publish them to an API or a bucket")]
pub struct CliConfig {
    /// Path to TOML configuration file; environment variables are used when absent
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON file holding the "CustomerID" mapping, relative to the output folder
    #[arg(long)]
    pub input_data: Option<String>,

    #[arg(long, value_enum, default_value = "local")]
    pub source: SourceKind,

    #[arg(long, value_enum, default_value = "http")]
    pub sink: SinkKind,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per pipeline state")]
    pub monitor: bool,
}
