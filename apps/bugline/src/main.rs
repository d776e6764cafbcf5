//! bugline - submit bug reports from the command line
//!
//! Collects report text and attachments, submits them through the report
//! crate and renders state changes and upload progress while it runs.

mod cli;
mod display;
mod error;
mod events;
mod input;
mod logging;

use crate::cli::{Cli, Commands, SubmitArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use bugline_config::Config;
use bugline_events::EventReceiver;
use bugline_net::{NetClient, NetConfig};
use bugline_report::{ReportContext, ReportOutcome, Submission, UserReport};
use clap::Parser;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Initialize tracing with JSON awareness
    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "error": e.code(),
                        "message": e.to_string(),
                    })
                );
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic; `Ok(false)` means the report did not succeed
async fn run(cli: Cli) -> Result<bool, CliError> {
    info!("Starting bugline v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.command);

    let renderer = OutputRenderer::new(cli.global.json, cli.global.color.unwrap_or_default());

    match cli.command {
        Commands::Submit(args) => submit(&args, &config, &renderer).await,
        Commands::Config => {
            renderer.render_config(&config.redacted())?;
            Ok(true)
        }
    }
}

/// Compose and submit one report
async fn submit(
    args: &SubmitArgs,
    config: &Config,
    renderer: &OutputRenderer,
) -> Result<bool, CliError> {
    let (event_sender, event_receiver) = bugline_events::channel();

    let mut report = UserReport::new().with_events(event_sender);
    report.set_content(input::read_content(args).await?);
    for extra in &args.append {
        report.append_content(extra);
    }
    report.set_severity(args.severity.unwrap_or(config.report.default_severity));
    report.set_email(
        args.email
            .clone()
            .unwrap_or_else(|| config.report.user_email.clone()),
    );
    for path in &args.attach {
        let (name, bytes) = input::read_attachment(path).await?;
        report.attach_file(name, bytes, input::guess_content_type(path));
    }

    let client = NetClient::new(&NetConfig::from(&config.network))?;
    let ctx = ReportContext::new(Arc::new(client), &config.api);
    let submission = report.create_report(&ctx)?;
    info!(report_id = %submission.report_id(), "Report created");

    let mut event_handler = EventHandler::new(renderer.clone());
    let outcome =
        drive_with_events(submission, event_receiver, &mut event_handler, renderer).await;

    renderer.render_outcome(&outcome)?;
    Ok(outcome.is_success())
}

/// Drive a submission while handling events concurrently
///
/// Ctrl-C cancels the submission; a request already on the wire is left to
/// finish but its result is ignored.
async fn drive_with_events(
    submission: Submission,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    renderer: &OutputRenderer,
) -> ReportOutcome {
    let cancel = submission.cancel_handle();
    let mut submission_future = Box::pin(submission.run(|update| renderer.render_update(update)));
    let mut interrupted = false;

    loop {
        select! {
            // Submission finished
            outcome = &mut submission_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return outcome;
            }

            // Event received
            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }

            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                renderer.show_warning("interrupted, cancelling report");
                cancel.cancel();
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode && !debug_enabled {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
        return;
    }

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "bugline-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        if let Ok(file) = std::fs::File::create(&log_file) {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(
                            "info,bugline=debug,bugline::logging=trace",
                        )
                    }),
                )
                .init();

            if !json_mode {
                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            return;
        }

        if json_mode {
            // Fallback: disable all logging in JSON mode
            tracing_subscriber::fmt()
                .with_writer(std::io::sink)
                .with_env_filter("off")
                .init();
            return;
        }
        eprintln!("Warning: Failed to create log file, logging to stderr");
    }

    // Normal mode: minimal logging to stderr; event warnings are already
    // rendered by the event handler
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("warn,bugline::logging=off")
            }),
        )
        .init();
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, command: &Commands) {
    if let Commands::Submit(args) = command {
        if let Some(token) = &args.token {
            config.api.report_token.clone_from(token);
        }
        if let Some(url) = &args.api_url {
            config.api.base_url.clone_from(url);
        }
    }
}
