use crate::domain_port::{Document, Subscription};
use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

type Projection<T> = Box<dyn Fn(Vec<Document>) -> Vec<T> + Send>;

/// Typed, live-updating result set. Every item is a complete snapshot.
pub struct LiveView<T> {
    subscription: Subscription,
    project: Projection<T>,
}

impl<T> LiveView<T> {
    pub fn new(
        subscription: Subscription,
        project: impl Fn(Vec<Document>) -> Vec<T> + Send + 'static,
    ) -> Self {
        Self {
            subscription,
            project: Box::new(project),
        }
    }

    /// Applies `f` to every snapshot after the current projection.
    pub fn map<U>(self, f: impl Fn(Vec<T>) -> Vec<U> + Send + 'static) -> LiveView<U>
    where
        T: 'static,
    {
        let project = self.project;
        LiveView {
            subscription: self.subscription,
            project: Box::new(move |documents| f(project(documents))),
        }
    }

    pub fn cancel(&mut self) {
        self.subscription.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }
}

impl<T> Stream for LiveView<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.subscription).poll_next(cx) {
            Poll::Ready(Some(documents)) => Poll::Ready(Some((this.project)(documents))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
