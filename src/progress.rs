//! Progress hand-off between an import step and the terminal
//!
//! The producer runs on its own scoped thread and sends one `usize` per
//! finished record. The calling thread drains the channel into a progress
//! bar until the producer drops its sender.

use crossbeam_channel::{unbounded, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("{0} import thread panicked")]
    ProducerPanicked(String),
}

/// What a step produced plus how many progress signals arrived.
#[derive(Debug)]
pub struct StepOutcome<R> {
    pub result: R,
    pub signals: usize,
}

/// Run `producer` on a scoped thread while advancing `bar` for every
/// signal it sends.
///
/// Returns once the producer has finished and its sender is gone. The
/// producer's own result is passed through untouched, errors included.
pub fn run_step<R, F>(
    name: &str,
    bar: &ProgressBar,
    producer: F,
) -> Result<StepOutcome<R>, ProgressError>
where
    R: Send,
    F: FnOnce(Sender<usize>) -> R + Send,
{
    let (tx, rx) = unbounded();

    thread::scope(|s| {
        let handle = s.spawn(move || producer(tx));

        let mut signals = 0;
        for _ in rx.iter() {
            signals += 1;
            bar.inc(1);
        }

        match handle.join() {
            Ok(result) => Ok(StepOutcome { result, signals }),
            Err(_) => Err(ProgressError::ProducerPanicked(name.to_string())),
        }
    })
}

/// Create bar progress style
fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ")
}

/// A bar for `len` records, or a hidden one when progress is off.
pub fn step_bar(len: usize, message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(create_bar_style());
    bar.set_message(message.to_string());
    bar
}
