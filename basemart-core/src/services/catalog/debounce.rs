use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

const OUTPUT_CAPACITY: usize = 16;

/// Forwards a search query only once it stopped changing for `delay`.
/// Every keystroke restarts the quiet period.
#[derive(Debug)]
pub struct SearchDebouncer {
    input: watch::Sender<String>,
    handle: JoinHandle<()>,
}

impl SearchDebouncer {
    pub fn spawn(delay: Duration) -> (Self, mpsc::Receiver<String>) {
        let (input, mut changes) = watch::channel(String::new());
        let (output, settled) = mpsc::channel(OUTPUT_CAPACITY);

        let handle = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => break,
                        changed = changes.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                }

                let query = changes.borrow_and_update().clone();
                debug!("Search settled on '{}'", query);
                if output.send(query).await.is_err() {
                    return;
                }
            }
        });

        (Self { input, handle }, settled)
    }

    pub fn push(&self, query: impl Into<String>) {
        self.input.send_replace(query.into());
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
