pub mod ansi;
pub mod cli;
pub mod config;
pub mod display;
pub mod extract;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod repl;
pub mod runtime;
pub mod summarize;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use cli::Cli;
use config::Config;
use display::print_wrapped;
use extract::render::RenderStep;
use extract::{Source, extract};
use model_gateway::HostModelGateway;
use repl::run_repl;
use summarize::{Summary, summarize};

const PROJECT_URL: &str = "https://github.com/jlyons210/summurai";
const USER_AGENT: &str = concat!("summurai/", env!("CARGO_PKG_VERSION"));

pub async fn run(cli: Cli) -> Result<()> {
    let source = cli.source()?;
    let cfg = Config::load(&cli.config, &cli.overrides())?;
    info!(
        model = %cfg.model,
        base_url = %cfg.base_url,
        source = %source,
        interactive = cli.interactive,
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to initialize HTTP client")?;

    match &source {
        Source::Pdf(_) => eprintln!("Reading PDF..."),
        Source::Url(_) => eprintln!("Retrieving webpage content..."),
    }
    let render = (!cli.no_render)
        .then(|| RenderStep::headless(Duration::from_secs(cfg.render_timeout_secs)));
    let content = extract(&client, &source, render.as_ref()).await?;

    eprintln!("Summarizing content...");
    let gateway = HostModelGateway::new(&client, &cfg);
    let Summary {
        text,
        mut conversation,
    } = summarize(&gateway, content).await?;

    if cli.show_summary() {
        print_wrapped(&text).context("Failed to write summary")?;
    }
    if cli.interactive {
        run_repl(&gateway, &mut conversation).await?;
    }

    println!(
        "{}\n__\nGenerated by summurai -- {}\n{}\nSummarized using: {}",
        ansi::RESET,
        PROJECT_URL,
        source,
        cfg.model
    );
    Ok(())
}
