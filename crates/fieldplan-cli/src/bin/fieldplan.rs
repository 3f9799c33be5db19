use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use fieldplan_cli::validate::{validate_metrics, validate_plan, validate_route, validate_visualize};
use fieldplan_cli::{Config, MetricsRequest, RouteResponse, VisualizeRequest};
use fieldplan_core::{PlanRequest, RouteRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Field coverage path planner", long_about = None)]
struct Args {
    /// Emit log lines as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a coverage path from a plan request
    Plan(Input),
    /// Compute distance, area and time for a path
    Metrics(Input),
    /// Render a path as an ASCII grid
    Visualize(Input),
    /// Find a lattice route between two nodes
    Route(Input),
}

#[derive(ClapArgs, Debug)]
struct Input {
    /// Request JSON file; reads stdin when omitted or "-"
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = Config::from_env();
    tracing::debug!(?config, "loaded limits");

    match &args.command {
        Command::Plan(input) => {
            let request: PlanRequest = read_request(input)?;
            validate_plan(&request, &config)?;
            let plan = fieldplan_core::plan(&request)?;
            write_json(&plan, args.pretty)
        }
        Command::Metrics(input) => {
            let request: MetricsRequest = read_request(input)?;
            validate_metrics(&request, &config)?;
            let stats = fieldplan_core::metrics(&request.path, request.coverage_radius, request.spraying_rate);
            write_json(&stats, args.pretty)
        }
        Command::Visualize(input) => {
            let request: VisualizeRequest = read_request(input)?;
            validate_visualize(&request, &config)?;
            println!(
                "{}",
                fieldplan_core::visualize(
                    &request.path,
                    request.field_width,
                    request.field_height,
                    request.coverage_radius
                )
            );
            Ok(())
        }
        Command::Route(input) => {
            let request: RouteRequest = read_request(input)?;
            validate_route(&request, &config)?;
            let path = fieldplan_core::route(&request)?;
            write_json(&RouteResponse::from(path), args.pretty)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fieldplan=info,fieldplan_core=info,fieldplan_cli=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_request<T: DeserializeOwned>(input: &Input) -> Result<T> {
    let raw = match input.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("failed to parse request JSON")
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
