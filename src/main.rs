//! Supplier Classifier service
//!
//! Loads configuration, initialises logging and serves the classification API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use supplier_classifier_api::{ApiConfig, ApiServer};
use supplier_classifier_core::{LoggingConfig, LogisticEngine, ServiceConfig, SupplierClassifier};

#[derive(Parser, Debug)]
#[command(name = "supplier-classifier", version, about = "Supplier category classification service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::load(args.config.as_deref())?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    // Dropping the guard flushes the file sink
    let _guard = init_tracing(&config.logging)?;

    info!("Supplier classifier v{}", env!("CARGO_PKG_VERSION"));

    let engine = LogisticEngine::new(config.training.clone());
    let classifier = Arc::new(SupplierClassifier::new(engine));

    let server = ApiServer::new(ApiConfig::from(&config), classifier);
    server.start().await
}

fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file '{}' has no file name", path.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let fmt_layer = if config.json {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["supplier-classifier", "--config", "service.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("service.toml")));
        assert!(!args.print_config);

        let args = Args::parse_from(["supplier-classifier", "--print-config"]);
        assert!(args.config.is_none());
        assert!(args.print_config);
    }
}
