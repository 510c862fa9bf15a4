use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vizrec::RecommendRequest;

/// Recommend and rank chart encodings for a field selection
#[derive(Parser, Debug)]
#[command(name = "vizrec")]
#[command(about = "Rank and cluster chart encodings", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the projections generated for the request's fields
    Projections {
        /// Path to the request JSON
        request: PathBuf,
    },
    /// Score and cluster the request's encodings for every projection
    Recommend {
        /// Path to the request JSON
        request: PathBuf,

        /// Override the cluster merge threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn load_request(path: &PathBuf) -> anyhow::Result<RecommendRequest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    RecommendRequest::from_json_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Projections { request } => {
            let request = load_request(&request)?;
            let projections = request.projections()?;
            info!("Generated {} projections", projections.len());
            print_json(&projections, args.pretty)?;
        }
        Command::Recommend { request, threshold } => {
            let mut request = load_request(&request)?;
            if let Some(threshold) = threshold {
                request.cluster_threshold = serde_json::Value::from(threshold);
            }
            let recommendations = request.run()?;
            info!(
                "Ranked {} projections with threshold {}",
                recommendations.len(),
                request.config().cluster_threshold
            );
            print_json(&recommendations, args.pretty)?;
        }
    }

    Ok(())
}
