use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecdar::{run, Cli, Config};
use ecdar_core::DocumentAdapter;
use ecdar_fs::LocalFileSystem;

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: ECDAR_INITIAL_LOCATION_POLICY (default: warn)");
            eprintln!("Optional: ECDAR_REQUIRE_ACYCLIC_SYSTEMS (default: false)");
            std::process::exit(1);
        }
    };
    tracing::debug!("Project policy: {:?}", config.policy());

    let mut adapter = DocumentAdapter::new(config.policy());
    let fs = LocalFileSystem::new();
    let mut stdout = std::io::stdout().lock();

    if let Err(e) = run(cli.command, &mut adapter, &fs, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
