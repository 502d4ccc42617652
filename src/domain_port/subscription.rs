use crate::domain_port::Document;
use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::UnboundedReceiver;

type Release = Box<dyn FnOnce() + Send>;

/// Live query registration. Yields the full result set every time it changes.
///
/// `cancel` hands the registration back to the store. It is safe before the
/// first snapshot and safe to repeat. Dropping the subscription cancels it.
pub struct Subscription {
    receiver: UnboundedReceiver<Vec<Document>>,
    release: Option<Release>,
}

impl Subscription {
    pub fn new(
        receiver: UnboundedReceiver<Vec<Document>>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            self.receiver.close();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.release.is_none()
    }
}

impl Stream for Subscription {
    type Item = Vec<Document>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.is_cancelled() {
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
