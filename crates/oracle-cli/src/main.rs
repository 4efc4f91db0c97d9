//! Command-line interface for oracle-rs

use anyhow::Context;
use clap::{Parser, Subcommand};
use oracle_core::{Depth, RunConfig, RunStatus, Style};
use oracle_data::{FmpClient, FmpConfig};
use oracle_eval::Rubric;
use oracle_llm::providers::{OpenAIConfig, OpenAIProvider};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "oracle")]
#[command(about = "Multi-agent company analysis", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analyst workflow for a ticker
    Analyze {
        /// Ticker symbol to analyze
        #[arg(short, long)]
        ticker: String,

        /// Analysis depth
        #[arg(long, default_value = "quick")]
        depth: Depth,

        /// Judge weighting style
        #[arg(long, default_value = "balanced")]
        style: Style,

        /// Completion model name
        #[arg(long)]
        model: Option<String>,

        /// Overall run deadline in seconds
        #[arg(long)]
        timeout_seconds: Option<u64>,

        /// Per-task deadline in seconds
        #[arg(long)]
        task_timeout_seconds: Option<u64>,

        /// Retries after the first attempt on transient failures
        #[arg(long)]
        retry_limit: Option<u32>,

        /// Override the completion API base URL
        #[arg(long)]
        api_base: Option<String>,

        /// Override the data API base URL
        #[arg(long)]
        data_api_base: Option<String>,

        /// Emit the raw report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Score saved reports against a rubric
    Evaluate {
        /// Directory of JSON case files
        #[arg(short, long)]
        corpus: PathBuf,

        /// Rubric file (JSON); defaults to the built-in rubric
        #[arg(long)]
        rubric: Option<PathBuf>,

        /// Emit the summary as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Analyze {
            ticker,
            depth,
            style,
            model,
            timeout_seconds,
            task_timeout_seconds,
            retry_limit,
            api_base,
            data_api_base,
            json,
        } => {
            let mut config = RunConfig {
                depth,
                style,
                ..Default::default()
            };
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(secs) = timeout_seconds {
                config.timeout_seconds = secs;
            }
            if let Some(secs) = task_timeout_seconds {
                config.task_timeout_seconds = secs;
            }
            if let Some(limit) = retry_limit {
                config.retry_limit = limit;
            }

            let mut llm_config =
                OpenAIConfig::from_env().context("completion provider configuration")?;
            if let Some(base) = api_base {
                llm_config = llm_config.with_api_base(base);
            }
            let provider = Arc::new(
                OpenAIProvider::with_config(llm_config)
                    .context("building completion provider")?,
            );

            let mut data_config = FmpConfig::from_env().context("data provider configuration")?;
            if let Some(base) = data_api_base {
                data_config = data_config.with_base_url(base);
            }
            let data = FmpClient::with_config(data_config).context("building data client")?;

            let report = oracle_agents::run_company_analysis(&ticker, config, provider, &data)
                .await
                .context("analysis failed to start")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render::print_report(&report);
            }
            info!(run_id = %report.run_id, status = ?report.status, "analysis finished");

            Ok(match report.status {
                RunStatus::Completed => ExitCode::SUCCESS,
                RunStatus::Failed => ExitCode::from(1),
                RunStatus::Cancelled => ExitCode::from(2),
            })
        }

        Command::Evaluate { corpus, rubric, json } => {
            let rubric = match rubric {
                Some(path) => Rubric::from_file(&path).context("loading rubric")?,
                None => Rubric::default(),
            };
            let summary = oracle_eval::evaluate(&corpus, &rubric).context("evaluating corpus")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                render::print_summary(&summary);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
