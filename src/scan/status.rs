//! Transient operator message that falls back to "ready" after a delay.
//!
//! Each post bumps a generation counter; the delayed clear only applies if
//! no newer message was posted in the meantime.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub const READY_TEXT: &str = "Point camera at QR code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ready,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub generation: u64,
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn ready(generation: u64) -> Self {
        Self {
            generation,
            kind: StatusKind::Ready,
            text: READY_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<StatusMessage>>,
    clear_after: Duration,
    timers: CancellationToken,
}

impl StatusBoard {
    pub fn new(clear_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(StatusMessage::ready(0));
        Self {
            tx: Arc::new(tx),
            clear_after,
            timers: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusMessage> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> StatusMessage {
        self.tx.borrow().clone()
    }

    /// Show `text` and schedule its clear. Returns the message generation.
    /// Must be called from within a tokio runtime.
    pub fn post(&self, kind: StatusKind, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut generation = 0;
        self.tx.send_modify(|m| {
            m.generation += 1;
            m.kind = kind;
            m.text = text;
            generation = m.generation;
        });

        self.schedule_clear(generation);
        generation
    }

    fn schedule_clear(&self, generation: u64) {
        let tx = Arc::clone(&self.tx);
        let timers = self.timers.clone();
        let delay = self.clear_after;

        tokio::spawn(async move {
            tokio::select! {
                _ = timers.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tx.send_if_modified(|m| {
                        if m.generation != generation {
                            return false;
                        }
                        *m = StatusMessage::ready(generation);
                        true
                    });
                }
            }
        });
    }

    /// Cancel every pending clear. Later posts are not cleared either.
    pub fn shutdown(&self) {
        self.timers.cancel();
    }
}
