//! Progress display.

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::media::Item;
use crate::output::sink::ItemSink;

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{pos} items]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Sink wrapper that ticks a spinner for every forwarded item.
pub struct ProgressSink<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: ItemSink> ProgressSink<S> {
    pub fn new(inner: S, bar: ProgressBar) -> Self {
        Self { inner, bar }
    }

    /// Stop the spinner and hand back the wrapped sink.
    pub fn finish(self) -> S {
        self.bar.finish_and_clear();
        self.inner
    }
}

impl<S: ItemSink> ItemSink for ProgressSink<S> {
    fn emit(&mut self, item: &Item) -> Result<()> {
        self.inner.emit(item)?;
        self.bar.inc(1);
        Ok(())
    }
}
