use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use puncher_client::{ClientEvent, HttpTransport, PunchForm, PuncherClient, SubmitOutcome};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "puncher-remote", about = "Remote control for the music puncher")]
struct Cli {
    /// Base URL of the puncher API, e.g. http://puncher.local:8080/api
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Settings file (defaults to ./puncher.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct SubmitArgs {
    /// MIDI file to send
    file: Option<PathBuf>,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    transpose: i32,
    #[arg(long)]
    autofit: bool,
    /// Name reported to the server instead of the file name
    #[arg(long)]
    label: Option<String>,
}

impl SubmitArgs {
    fn into_form(self) -> PunchForm {
        PunchForm {
            file: self.file,
            label: self.label,
            transpose: self.transpose,
            autofit: self.autofit,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the job status once
    Status,
    /// Follow the job status until interrupted
    Watch,
    /// Start a punch job
    Punch {
        #[command(flatten)]
        submit: SubmitArgs,
        /// Keep following progress after submitting
        #[arg(long)]
        watch: bool,
    },
    /// Dry run: fetch the MIDI file the server would punch
    Test {
        #[command(flatten)]
        submit: SubmitArgs,
        /// Directory to write puncher.mid into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Cancel the running job
    Stop,
}

/// The server only applies a transposition together with autofit.
fn transpose_ignored(form: &PunchForm) -> bool {
    form.transpose != 0 && !form.autofit
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = &cli.server_url {
        settings.server_url = server_url.clone();
    }
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        settings.poll_interval_ms = poll_interval_ms;
    }
    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = resolve_settings(&cli)?;
    let transport = HttpTransport::with_timeout(&settings.server_url, settings.request_timeout())
        .with_context(|| format!("cannot set up client for '{}'", settings.server_url))?;
    info!(server_url = transport.server_url(), "using puncher api");
    let client = PuncherClient::new(Arc::new(transport), settings.sync_options());

    match cli.command {
        Command::Status => show_status(&client).await,
        Command::Watch => watch(&client).await,
        Command::Punch { submit, watch: follow } => {
            punch(&client, submit.into_form()).await?;
            if follow {
                watch(&client).await?;
            }
            Ok(())
        }
        Command::Test { submit, out } => {
            let out = out.unwrap_or_else(|| settings.download_dir.clone());
            dry_run(&client, submit.into_form(), out).await
        }
        Command::Stop => stop(&client).await,
    }
}

async fn show_status(client: &PuncherClient) -> Result<()> {
    let result = client.poll().await;
    println!("{}", render::render_state(&client.snapshot().await));
    result.map(|_| ()).context("failed to fetch status")
}

async fn watch(client: &Arc<PuncherClient>) -> Result<()> {
    let mut events = client.subscribe_events();
    let polling = client.spawn_polling();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = render::render_event(&event) {
                        println!("{}", render::timestamped(&line));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "state notifications dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    polling.abort();
    Ok(())
}

async fn punch(client: &PuncherClient, form: PunchForm) -> Result<()> {
    if transpose_ignored(&form) {
        warn!(
            transpose = form.transpose,
            "transpose is only applied together with --autofit"
        );
    }
    client.submit(&form, false).await?;
    println!("job submitted");
    println!("{}", render::render_state(&client.snapshot().await));
    Ok(())
}

async fn dry_run(client: &PuncherClient, form: PunchForm, out: PathBuf) -> Result<()> {
    if transpose_ignored(&form) {
        warn!(
            transpose = form.transpose,
            "transpose is only applied together with --autofit"
        );
    }
    let SubmitOutcome::Tested(artifact) = client.submit(&form, true).await? else {
        bail!("server did not return a test result");
    };
    let path = artifact
        .save_in(&out)
        .await
        .with_context(|| format!("failed to write test result into '{}'", out.display()))?;
    println!("test result written to {}", path.display());
    Ok(())
}

async fn stop(client: &Arc<PuncherClient>) -> Result<()> {
    let mut events = client.subscribe_events();
    client.stop().await.context("stop request task failed")?;
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Error(message) = event {
            bail!(message);
        }
    }
    println!("stop requested");
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
