//! Human-readable progress lines
//!
//! Each line is logged through `tracing` and, when a consumer is attached,
//! also sent over an unbounded channel. Sending never waits, so a slow or
//! vanished consumer cannot stall the crawl.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Sink for progress lines emitted by the crawl worker
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<UnboundedSender<String>>,
}

impl Progress {
    /// Creates a reporter and the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A reporter that only logs
    pub fn silent() -> Self {
        Self::default()
    }

    /// Reports a phase transition
    pub fn info(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{}", line);
        self.send(line);
    }

    /// Reports a block, a failure or an early stop
    pub fn warn(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{}", line);
        self.send(line);
    }

    fn send(&self, line: String) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is listening any more
            let _ = tx.send(line);
        }
    }
}
