//! linefetch Server Binary
//!
//! Serves files from a root directory over the line-based fetch protocol.

use clap::Parser;
use linefetch::config::DEFAULT_SERVER_PORT;
use linefetch::{Acceptor, Config, DispatchPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// linefetch Server
#[derive(Parser, Debug)]
#[command(name = "linefetch-server")]
#[command(about = "Thread-per-connection file server for the linefetch protocol")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory relative resource paths resolve against
    #[arg(short, long, default_value = ".")]
    root: String,

    /// Use a fixed pool of this many handler threads instead of one per connection
    #[arg(short, long)]
    workers: Option<usize>,

    /// Connections allowed to wait for a pooled worker
    #[arg(short, long, default_value = "128")]
    backlog: usize,

    /// Per-connection read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linefetch=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("linefetch server v{}", linefetch::VERSION);
    tracing::info!("Resource root: {}", args.root);

    let dispatch = match args.workers {
        Some(workers) => DispatchPolicy::Bounded {
            workers,
            backlog: args.backlog,
        },
        None => DispatchPolicy::ThreadPerConnection,
    };

    let config = Config::builder()
        .listen_host(&args.host)
        .listen_port(args.port)
        .root_dir(&args.root)
        .dispatch(dispatch)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let acceptor = Acceptor::get_or_create_with(config);
    if let Err(e) = acceptor.start() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    acceptor.wait();
    tracing::info!("Server stopped");
}
