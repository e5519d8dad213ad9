use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use feedhook::{
    api,
    config::AppConfig,
    feed::FeedParser,
    notification::Formatter,
    observability,
    state::{build_monitor, AppState},
    tasks::feed_monitor::{runner, CycleOutcome, HttpFeedSource, LastSeen},
};
use std::process::ExitCode;

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the feed on a timer and serve the HTTP routes (default)
    Serve {
        /// Don't poll on a timer; only check when /check is requested
        #[arg(long)]
        manual: bool,
    },
    /// Run a single cycle and exit
    Check,
    /// Print the newest item and its notification without sending anything
    Preview,
}

fn main() -> ExitCode {
    dotenv().ok();
    observability::init_logging();

    let args = Args::parse();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    match args.command.unwrap_or(Command::Serve { manual: false }) {
        Command::Serve { manual } => serve(config, manual),
        Command::Check => check_once(config),
        Command::Preview => preview(config),
    }
}

fn serve(config: AppConfig, manual: bool) -> ExitCode {
    // The timer has nobody to notify without a transport
    if !manual {
        if let Err(e) = config.require_transport() {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    }

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    match run_server(web::Data::new(state), manual) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[actix_web::main]
async fn run_server(state: web::Data<AppState>, manual: bool) -> std::io::Result<()> {
    let host = state.config.host.clone();
    let port = state.config.port;
    tracing::info!(feed_url = %state.config.feed_url, "Monitoring feed");
    if let Some(monitor) = state.monitor() {
        tracing::info!(transport = monitor.notifier().kind(), "Notifications enabled");
    }
    tracing::info!("Starting server at http://{}:{}", host, port);

    if manual {
        tracing::info!("Manual mode: the feed is only checked on /check");
    } else {
        tracing::info!(
            interval_secs = state.config.poll_interval.as_secs(),
            "Starting feed monitor"
        );
        tokio::spawn(runner::start(state.clone().into_inner()));
    }

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .app_data(state.clone())
            .configure(api::routes::configure)
    })
    .workers(1)
    .bind((host.as_str(), port))?
    .run()
    .await
}

/// One cycle from an empty state. Configuration problems are reported for
/// this invocation only.
#[actix_web::main]
async fn check_once(config: AppConfig) -> ExitCode {
    let monitor = match config
        .require_transport()
        .and_then(|transport| build_monitor(&config, transport))
    {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    let (_, outcome) = monitor.run_cycle(LastSeen::empty()).await;
    tracing::info!(?outcome, "Check completed");

    match outcome {
        CycleOutcome::Notified { .. } | CycleOutcome::Unchanged { .. } | CycleOutcome::NoItems => {
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

#[actix_web::main]
async fn preview(config: AppConfig) -> ExitCode {
    let source = match HttpFeedSource::new(config.feed_url.clone(), config.fetch_timeout) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let formatter = Formatter::new(config.formatter.clone());

    println!("Testing feed {}", config.feed_url);
    match runner::preview(&source, &FeedParser::default(), &formatter).await {
        Ok(Some(preview)) => match serde_json::to_string_pretty(&preview) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize preview");
                ExitCode::FAILURE
            }
        },
        Ok(None) => {
            println!("Feed contains no items");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Feed preview failed");
            ExitCode::FAILURE
        }
    }
}
