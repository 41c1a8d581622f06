//! Scoped progress spinners for blocking operations.
//!
//! A `Spinner` is opened for the duration of one external call (a build
//! command, a backend hook) and is always cleared when it goes out of scope,
//! whether the call succeeded or failed.

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A spinner bound to the lifetime of one operation.
pub struct Spinner {
    pb: Option<ProgressBar>,
    message: String,
    finished: bool,
}

impl Spinner {
    /// Start a spinner with the given message.
    ///
    /// Nothing is drawn when stderr is not a terminal.
    pub fn open(message: impl Display) -> Self {
        let message = message.to_string();
        let pb = if std::io::stderr().is_terminal() {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(message.clone());
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        tracing::debug!("{} ...", message);

        Spinner {
            pb,
            message,
            finished: false,
        }
    }

    /// Mark the operation as finished successfully.
    pub fn finish(mut self) {
        self.finished = true;
        tracing::debug!("{} ... done", self.message);
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("{} ... error", self.message);
        }
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
    }
}
