use clap::Parser;
use lurker::{EngineConfig, TraversalEngine};
use lurker_cli::browser::ChromiumBrowser;
use lurker_cli::cli::Cli;
use lurker_cli::config::Config;
use lurker_cli::logging::{self, LogCapture};
use lurker_cli::push::PushClient;
use lurker_cli::report;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let capture = LogCapture::new();
    logging::init_logging(cli.verbose, capture.clone());

    if let Err(err) = run(cli, capture).await {
        error!(target = "lurker", error = %err, "run failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, capture: LogCapture) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)?.with_overrides(cli.max_topics, cli.like_probability)?;

    let engine_config = EngineConfig {
        home_url: config.home_url.clone(),
        connect_url: config.connect_url.clone(),
        max_topics: config.max_topics,
        like_probability: config.like_probability,
        ..EngineConfig::default()
    };

    let browser = ChromiumBrowser::launch(cli.headful, engine_config.nav_timeout).await?;
    let primary = browser.primary_page().await?;

    let engine = TraversalEngine::new(&browser, primary.as_ref(), engine_config);
    let summary = engine.run(&config.credentials).await;

    println!("{}", report::render_summary(&summary));

    if let Some(push) = &config.push {
        match PushClient::new(&push.app_token, &push.topic_id) {
            Ok(client) => {
                let body = report::notification_body(&summary, &capture.contents());
                let title = report::notification_summary(&summary);
                match client.send(&body, &title).await {
                    Ok(()) => info!(target = "lurker", "notification dispatched"),
                    Err(err) => {
                        error!(target = "lurker", error = %err, "notification dispatch failed")
                    }
                }
            }
            Err(err) => error!(target = "lurker", error = %err, "push client unavailable"),
        }
    }

    browser.shutdown().await;
    Ok(())
}
