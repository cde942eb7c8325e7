use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::application::Notifier;
use crate::domain::{Notice, NoticeLevel};

/// The spinner currently drawn on stderr, shared with [`ConsoleNotifier`]
/// so notices can be printed without tearing through it.
#[derive(Clone, Default)]
pub struct ActiveSpinner {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl ActiveSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking a spinner with `message`, replacing any previous one.
    pub fn start(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.bar.lock() {
            if let Some(previous) = bar.replace(spinner.clone()) {
                previous.finish_and_clear();
            }
        }
        spinner
    }

    pub fn finish(&self) {
        let bar = self.bar.lock().ok().and_then(|mut bar| bar.take());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }

    /// Runs `f` with the spinner hidden, or directly when none is active.
    fn suspend<F: FnOnce()>(&self, f: F) {
        let bar = self.bar.lock().ok().and_then(|bar| bar.clone());
        match bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

/// Prints notices to stderr so they stay out of the chat transcript.
pub struct ConsoleNotifier {
    spinner: ActiveSpinner,
}

impl ConsoleNotifier {
    pub fn with_spinner(spinner: ActiveSpinner) -> Self {
        Self { spinner }
    }

    fn render(notice: &Notice) -> String {
        let prefix = match notice.level() {
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✖",
        };
        format!("{} {}", prefix, notice.message())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        debug!("Notice: {}", notice);
        let line = Self::render(&notice);
        self.spinner.suspend(|| {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
        });
    }
}
