//! primes-server: answers "all primes up to N" over TCP.

use clap::Parser;
use primes_server::config::{Backend, ConfigOverrides, ServerConfig};
use primes_server::server::bind;
use primes_server::{build_source, PrimeServer, ServerError};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prime number query server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on [default: 50051]
    #[arg(long)]
    port: Option<u16>,

    /// Interface to bind [default: localhost]
    #[arg(long)]
    host: Option<String>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of requests computed at once [default: 4]
    #[arg(long)]
    workers: Option<usize>,

    /// How Sieve requests are computed [default: incremental]
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Largest bound a client may request [default: 100000000]
    #[arg(long)]
    max_bound: Option<u64>,

    /// Sieve up to this bound before accepting connections
    #[arg(long)]
    prefill: Option<u64>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            workers: self.workers,
            backend: self.backend,
            max_bound: self.max_bound,
            prefill: self.prefill,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match args.verbose {
        0 => EnvFilter::new("primes_server=warn,prime_cache=warn"),
        1 => EnvFilter::new("primes_server=info,prime_cache=info"),
        _ => EnvFilter::new("primes_server=debug,prime_cache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match args.config {
        Some(ref path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .apply(args.overrides());
    config.validate()?;

    let source = build_source(&config)?;
    let listener = bind(&config)?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::io("reading bound address", e))?;
    info!("Listening on {addr}");

    PrimeServer::new(source, config.workers).serve(&listener);
    Ok(())
}
