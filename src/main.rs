//! s3-probe entry point

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use s3_probe::config::{Config, OutputFormat};
use s3_probe::probes::builtin_registry;
use s3_probe::report::{TextSink, TracingSink, YamlSink};
use s3_probe::runner::Runner;

/// Print usage information
fn print_usage() {
    eprintln!("Usage: s3-probe <config.yaml> [PROBE...]");
    eprintln!("       s3-probe --list");
    eprintln!();
    eprintln!("s3-probe - conformance probes for S3-compatible endpoints");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.yaml    Path to configuration file");
    eprintln!("  PROBE          Run only the named probes (default: all)");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  s3-probe ./minio.yaml s3-00006 s3-00007");
}

/// Print every built-in probe with its description
fn list_probes() -> Result<(), Box<dyn std::error::Error>> {
    let registry = builtin_registry()?;
    for name in registry.names() {
        println!("{}  {}", name, registry.description(name).unwrap_or(""));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && args[1] == "--list" {
        return list_probes();
    }
    if args.len() < 2 || args[1].starts_with('-') {
        print_usage();
        std::process::exit(2);
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config = match Config::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging; stdout is reserved for results
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directives(config.target.verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("s3-probe starting");
    info!("Loaded configuration from {:?}", config_path);

    // Pick the probes to run: command line wins over runner.only
    let selection: Vec<String> = if args.len() > 2 {
        args[2..].to_vec()
    } else {
        config.runner.only.clone()
    };

    let mut registry = builtin_registry()?;
    if !selection.is_empty() {
        registry = match registry.select(selection.as_slice()) {
            Ok(r) => r,
            Err(e) => {
                error!("{}", e);
                eprintln!("Run `s3-probe --list` to see available probes");
                std::process::exit(2);
            }
        };
    }

    let runner = Runner::new(registry)
        .with_settings(config.runner.clone())
        .with_trust(config.credentials.trust_provider());

    // Ctrl+C cancels in-flight calls; remaining probes report as errored
    let cancel = runner.cancellation_token();
    ctrlc::set_handler(move || {
        info!("Received interrupt, cancelling run");
        cancel.cancel();
    })?;

    let target = Arc::new(config.target.clone());
    let report = match config.output.format {
        OutputFormat::Text => {
            let sink = (TracingSink, TextSink::new(std::io::stdout()));
            runner.run_all(target, &sink).await
        }
        OutputFormat::Yaml => {
            let sink = (TracingSink, YamlSink::new(std::io::stdout()));
            runner.run_all(target, &sink).await
        }
    };

    if !report.is_success() {
        std::process::exit(1);
    }

    info!("All probes passed");
    Ok(())
}
