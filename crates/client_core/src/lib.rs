use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use puncher_shared::{
    domain::{JobField, JobState, JobStatus},
    protocol::{PunchRequest, ServerStatus, TEST_OUTPUT_FILENAME},
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

pub mod encoding;
pub mod error;
pub mod state;
pub mod transport;

pub use error::{TransportError, TransportErrorKind, TransportSetupError};
pub use state::StateModel;
pub use transport::{Endpoint, HttpTransport, Response, Transport, DEFAULT_REQUEST_TIMEOUT};

use encoding::EncodingError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    /// Write `progress = 0` whenever a poll reports the job as inactive,
    /// instead of the progress the server reported.
    pub reset_progress_on_idle: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reset_progress_on_idle: false,
        }
    }
}

/// Values read from the submission form.
#[derive(Debug, Clone, Default)]
pub struct PunchForm {
    pub file: Option<PathBuf>,
    /// Name shown to the server; defaults to the selected file's name.
    pub label: Option<String>,
    pub transpose: i32,
    pub autofit: bool,
}

impl PunchForm {
    pub fn label_for(&self, path: &Path) -> String {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Result of a test-mode submission, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            filename: TEST_OUTPUT_FILENAME.to_string(),
            bytes,
        }
    }

    pub async fn save_in(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The job was accepted; its progress shows up through polling.
    Started,
    Tested(DownloadArtifact),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid test result: {0}")]
    TestResult(#[from] EncodingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    StateChanged { field: JobField, state: JobState },
    DownloadReady(DownloadArtifact),
    /// Blocking input problem found before any request was sent.
    ValidationAlert(String),
    /// Submission or stop failure, for the dismissible error banner.
    Error(String),
    ErrorCleared,
}

/// Keeps a [`StateModel`] in step with the server and runs the job actions.
pub struct PuncherClient {
    transport: Arc<dyn Transport>,
    options: SyncOptions,
    model: Mutex<StateModel>,
    poll_seq: AtomicU64,
    error_shown: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
}

impl PuncherClient {
    pub fn new(transport: Arc<dyn Transport>, options: SyncOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        let mut model = StateModel::new();
        for field in JobField::ALL {
            let events = events.clone();
            model.subscribe(field, move |state| {
                let _ = events.send(ClientEvent::StateChanged {
                    field,
                    state: state.clone(),
                });
            });
        }

        Arc::new(Self {
            transport,
            options,
            model: Mutex::new(model),
            poll_seq: AtomicU64::new(0),
            error_shown: AtomicBool::new(false),
            events,
        })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Registers a handler run on every change of `field`. Handlers get a
    /// read-only view and must not block.
    pub async fn subscribe<F>(&self, field: JobField, handler: F)
    where
        F: Fn(&JobState) + Send + Sync + 'static,
    {
        self.model.lock().await.subscribe(field, handler);
    }

    pub async fn snapshot(&self) -> JobState {
        self.model.lock().await.state().clone()
    }

    pub async fn fetch_status(&self) -> Result<ServerStatus, TransportError> {
        self.transport.call(Endpoint::Status, None).await?.json()
    }

    /// Fetches the server status once and writes it into the model. On
    /// failure only `status` changes; file and progress keep their last
    /// values.
    pub async fn poll(&self) -> Result<ServerStatus, TransportError> {
        let seq = self.poll_seq.fetch_add(1, Ordering::Relaxed) + 1;
        match self.fetch_status().await {
            Ok(status) => {
                debug!(
                    poll_seq = seq,
                    active = status.active,
                    progress = status.progress,
                    "status poll succeeded"
                );
                self.apply_status(&status).await;
                if status.active {
                    self.clear_error();
                }
                Ok(status)
            }
            Err(err) => {
                warn!(poll_seq = seq, status_code = ?err.status_code, error = %err, "status poll failed");
                self.model.lock().await.set_status(JobStatus::Error);
                Err(err)
            }
        }
    }

    async fn apply_status(&self, status: &ServerStatus) {
        let progress = if !status.active && self.options.reset_progress_on_idle {
            0
        } else {
            status.progress_percent()
        };

        let mut model = self.model.lock().await;
        model.set_filename(status.active_filename());
        model.set_status(status.job_status());
        model.set_progress(progress);
    }

    /// Starts the fixed-interval poll loop. The first poll fires immediately.
    /// Each tick runs its own poll task, so a slow response never delays the
    /// next one. The loop ends when the client is dropped or the handle is
    /// aborted.
    pub fn spawn_polling(self: &Arc<Self>) -> JoinHandle<()> {
        let client: Weak<Self> = Arc::downgrade(self);
        let period = self.options.poll_interval.max(MIN_POLL_INTERVAL);
        info!(interval_ms = period.as_millis() as u64, "starting status polling");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(client) = client.upgrade() else {
                    break;
                };
                tokio::spawn(async move {
                    let _ = client.poll().await;
                });
            }
            debug!("status polling stopped");
        })
    }

    /// Submits the selected file. `test` asks the server for a dry run that
    /// returns the generated MIDI file instead of starting the job.
    ///
    /// Failures are reported on the error channel and returned; they never
    /// change the polled job status.
    pub async fn submit(&self, form: &PunchForm, test: bool) -> Result<SubmitOutcome, SubmitError> {
        self.clear_error();
        let Some(path) = form.file.as_deref() else {
            warn!(test, "submission rejected: no file selected");
            let _ = self.events.send(ClientEvent::ValidationAlert(
                SubmitError::NoFileSelected.to_string(),
            ));
            return Err(SubmitError::NoFileSelected);
        };

        let result = self.submit_file(path, form, test).await;
        if let Err(err) = &result {
            self.show_error(err.to_string());
        }
        result
    }

    async fn submit_file(
        &self,
        path: &Path,
        form: &PunchForm,
        test: bool,
    ) -> Result<SubmitOutcome, SubmitError> {
        let midi_file_base64 = encoding::file_to_base64(path)
            .await
            .map_err(|source| SubmitError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let request = PunchRequest {
            midi_file_base64,
            filename: form.label_for(path),
            transpose: form.transpose,
            autofit: form.autofit,
        };

        info!(
            filename = %request.filename,
            transpose = request.transpose,
            autofit = request.autofit,
            test,
            "submitting punch request"
        );
        let response = self
            .transport
            .call(Endpoint::Punch { test }, Some(&request))
            .await?;

        if test {
            let artifact = DownloadArtifact::new(encoding::base64_to_binary(&response.body)?);
            info!(bytes = artifact.bytes.len(), "test result ready");
            let _ = self.events.send(ClientEvent::DownloadReady(artifact.clone()));
            return Ok(SubmitOutcome::Tested(artifact));
        }

        // Refresh right away instead of waiting for the next tick.
        let _ = self.poll().await;
        Ok(SubmitOutcome::Started)
    }

    /// Requests cancellation of the active job without waiting for the
    /// server. The returned handle may be dropped; awaiting it only tells the
    /// caller the request has completed.
    pub fn stop(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            info!("requesting stop");
            if let Err(err) = client.transport.call(Endpoint::Stop, None).await {
                warn!(status_code = ?err.status_code, error = %err, "stop request failed");
                client.show_error(err.to_string());
            }
        })
    }

    fn show_error(&self, message: String) {
        self.error_shown.store(true, Ordering::Relaxed);
        let _ = self.events.send(ClientEvent::Error(message));
    }

    fn clear_error(&self) {
        if self.error_shown.swap(false, Ordering::Relaxed) {
            let _ = self.events.send(ClientEvent::ErrorCleared);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
