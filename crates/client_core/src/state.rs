//! Observable job state.
//!
//! Every setter compares the incoming value with the stored one and only on a
//! change stores it and runs the handlers subscribed to that field. Handlers
//! run synchronously, in subscription order, before the setter returns.

use std::{collections::HashMap, fmt};

use puncher_shared::domain::{JobField, JobState, JobStatus};
use tracing::trace;

pub type StateHandler = Box<dyn Fn(&JobState) + Send + Sync>;

#[derive(Default)]
pub struct StateModel {
    state: JobState,
    handlers: HashMap<JobField, Vec<StateHandler>>,
}

impl fmt::Debug for StateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers: HashMap<JobField, usize> = self
            .handlers
            .iter()
            .map(|(field, handlers)| (*field, handlers.len()))
            .collect();
        f.debug_struct("StateModel")
            .field("state", &self.state)
            .field("subscribers", &subscribers)
            .finish()
    }
}

impl StateModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status
    }

    pub fn filename(&self) -> Option<&str> {
        self.state.filename.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.state.progress
    }

    pub fn subscribe<F>(&mut self, field: JobField, handler: F)
    where
        F: Fn(&JobState) + Send + Sync + 'static,
    {
        self.handlers
            .entry(field)
            .or_default()
            .push(Box::new(handler));
    }

    /// Returns `true` when the value changed and handlers ran.
    pub fn set_status(&mut self, status: JobStatus) -> bool {
        if self.state.status == status {
            return false;
        }
        self.state.status = status;
        self.notify(JobField::Status);
        true
    }

    pub fn set_filename(&mut self, filename: Option<String>) -> bool {
        if self.state.filename == filename {
            return false;
        }
        self.state.filename = filename;
        self.notify(JobField::Filename);
        true
    }

    pub fn set_progress(&mut self, progress: u8) -> bool {
        let progress = progress.min(100);
        if self.state.progress == progress {
            return false;
        }
        self.state.progress = progress;
        self.notify(JobField::Progress);
        true
    }

    fn notify(&self, field: JobField) {
        trace!(field = field.as_str(), state = ?self.state, "job state changed");
        if let Some(handlers) = self.handlers.get(&field) {
            for handler in handlers {
                handler(&self.state);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
