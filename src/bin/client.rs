//! linefetch Client Binary
//!
//! Issues requests one after another and prints each response.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use linefetch::config::{DEFAULT_PATTERN_PORT, DEFAULT_PROXY_PORT};
use linefetch::{Client, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// linefetch Client
#[derive(Parser, Debug)]
#[command(name = "linefetch-client")]
#[command(about = "Client for the linefetch protocol")]
#[command(version)]
struct Args {
    /// Proxy host to connect to
    #[arg(long, default_value = "127.0.0.1")]
    proxy_host: String,

    /// Proxy port (defaults to 4665 for fetch, 7493 for pattern)
    #[arg(long)]
    proxy_port: Option<u16>,

    /// Read timeout in milliseconds (0 = wait for the server to close)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Number of times to issue each request
    #[arg(short, long, default_value = "1")]
    repeat: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch files by path
    Fetch {
        /// Origin host sent with every request
        #[arg(long, default_value = "localhost")]
        origin_host: String,

        /// File listing one resource path per line
        #[arg(short, long)]
        list: Option<PathBuf>,

        /// Resource paths to fetch
        paths: Vec<String>,
    },

    /// Send a pattern request
    Pattern {
        /// Pattern token
        pattern: String,

        /// Count token (sent as text)
        count: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linefetch=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let default_port = match args.command {
        Commands::Fetch { .. } => DEFAULT_PROXY_PORT,
        Commands::Pattern { .. } => DEFAULT_PATTERN_PORT,
    };

    let mut builder = Config::builder()
        .proxy_host(&args.proxy_host)
        .proxy_port(args.proxy_port.unwrap_or(default_port))
        .read_timeout_ms(args.read_timeout_ms);
    if let Commands::Fetch { origin_host, .. } = &args.command {
        builder = builder.identity(origin_host);
    }

    let client = match Client::from_config(&builder.build()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Invalid client configuration: {}", e);
            std::process::exit(1);
        }
    };

    match &args.command {
        Commands::Fetch { list, paths, .. } => {
            let mut all_paths = paths.clone();
            if let Some(list) = list {
                match load_path_list(list) {
                    Ok(listed) => all_paths.extend(listed),
                    Err(e) => {
                        tracing::error!("Failed to read {}: {}", list.display(), e);
                        std::process::exit(1);
                    }
                }
            }

            for _ in 0..args.repeat {
                for path in &all_paths {
                    if let Some(body) = client.fetch(path) {
                        println!("{}", body);
                    }
                }
            }
        }
        Commands::Pattern { pattern, count } => {
            for _ in 0..args.repeat {
                if let Some(body) = client.fetch_pattern(pattern, count) {
                    println!("{}", body);
                }
            }
        }
    }
}

/// One resource path per non-empty line
fn load_path_list(path: &Path) -> std::io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
