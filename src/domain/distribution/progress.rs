//! Progress notifications for a running distribution.
//!
//! The engine owns the [`ProgressSender`]; when the run finishes the sender
//! is dropped and the [`ProgressStream`] ends.

use futures::Stream;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;

use crate::models::{DistributionPhase, ProgressUpdate};

#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ProgressUpdate>>,
}

impl ProgressSender {
    /// A sender nobody listens to.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, update: ProgressUpdate) {
        if let Some(tx) = &self.tx {
            // the stream may already be dropped
            let _ = tx.send(update);
        }
    }

    pub fn emit(&self, phase: DistributionPhase, current: usize, total: usize) {
        self.send(ProgressUpdate::new(phase, current, total));
    }
}

/// Finite, single-consumer stream of [`ProgressUpdate`]s.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<ProgressUpdate>,
}

impl Stream for ProgressStream {
    type Item = ProgressUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

pub fn progress_channel() -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx: Some(tx) }, ProgressStream { rx })
}
