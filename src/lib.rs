pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod query;
pub mod setup;
pub mod training;
pub mod training_source;
pub mod units;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use cli::Cli;
use config::Config;
use context::ContextBuilder;
use dispatcher::Analyst;
use model_gateway::HostModelGateway;
use providers::intervals::IntervalsClient;
use query::QueryFocus;
use training::DateWindow;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let _log_guard = logging::init(cli.debug);

    if cli.setup {
        return run_setup().await;
    }

    let cfg = Config::from_env()?;
    info!(
        model = %cfg.settings.model,
        intervals_base_url = %cfg.settings.intervals_base_url,
        "loaded runtime configuration"
    );

    let question = cli.question_text();
    let days = cli
        .days
        .or_else(|| QueryFocus::parse(&question).days_hint())
        .unwrap_or(cfg.settings.default_days);
    let today = Local::now().date_naive();
    let window = DateWindow::ending_on(today, days)
        .with_context(|| format!("cannot look back {days} days from {today}"))?;

    let source = IntervalsClient::from_config(&cfg)?;
    let gateway = HostModelGateway::from_config(&cfg)?;
    let analyst = Analyst::new(&gateway, cfg.settings.model.clone());
    let builder = ContextBuilder::new(cfg.settings.unit_hints, cfg.settings.context_max_chars);

    info!(days, model = %analyst.model(), "answering question");
    let answer =
        pipeline::answer_question(&source, &builder, &analyst, window, &question).await?;
    debug!(model = %answer.model, chars = answer.text.len(), "answer received");
    println!("{}", answer.text);
    Ok(())
}

async fn run_setup() -> Result<()> {
    println!("{}", setup::SETUP_INSTRUCTIONS);
    let cfg = Config::from_env()?;
    info!("loaded runtime configuration");

    let report = setup::check_connectivity(&cfg).await?;
    println!();
    println!("{report}");
    if !report.is_ok() {
        bail!("setup check failed");
    }
    Ok(())
}
