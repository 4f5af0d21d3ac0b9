// Copyright 2022 Cognite AS
//! Delivering request outcomes to one consuming context.
//!
//! Requests dispatched against the same [`CompletionSink`] may run on any
//! executor, concurrently, but every outcome lands in the single
//! [`CompletionQueue`], so whoever drains the queue sees results in one place
//! and needs no locking of its own. Each dispatched request pushes exactly one
//! message: its outcome, or [`Error::Cancelled`] if it was aborted or dropped
//! before finishing.
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::future::{abortable, AbortHandle, Aborted, BoxFuture};
use futures::{FutureExt, Stream, StreamExt};
use log::debug;

use crate::error::Error;

/// Create a linked sink and queue.
pub fn channel<M>() -> (CompletionSink<M>, CompletionQueue<M>) {
    let (tx, rx) = mpsc::unbounded();
    (CompletionSink { tx }, CompletionQueue { rx })
}

pub struct CompletionSink<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for CompletionSink<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> CompletionSink<M> {
    fn deliver(&self, message: M) {
        if self.tx.unbounded_send(message).is_err() {
            debug!("completion: queue dropped, discarding outcome");
        }
    }
}

/// The receiving end. Ends once every sink and in-flight request is gone.
pub struct CompletionQueue<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M> CompletionQueue<M> {
    /// Take an already delivered message without waiting, for hosts that poll
    /// from their own loop.
    pub fn try_next(&mut self) -> Option<M> {
        self.rx.try_recv().ok()
    }
}

impl<M> Stream for CompletionQueue<M> {
    type Item = M;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<M>> {
        self.rx.poll_next_unpin(cx)
    }
}

/// A dispatched request. Spawn or await it to make progress; the outcome goes
/// to the queue, not to the awaiter.
#[must_use = "an in-flight request does nothing unless polled"]
pub struct InFlight {
    task: BoxFuture<'static, ()>,
    handle: AbortHandle,
}

impl InFlight {
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Future for InFlight {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.task.as_mut().poll(cx)
    }
}

struct Delivery<O, M, F>
where
    F: FnOnce(Result<O, Error>) -> M,
{
    sink: CompletionSink<M>,
    wrap: Option<F>,
    _outcome: PhantomData<fn(O)>,
}

impl<O, M, F> Delivery<O, M, F>
where
    F: FnOnce(Result<O, Error>) -> M,
{
    fn complete(&mut self, outcome: Result<O, Error>) {
        if let Some(wrap) = self.wrap.take() {
            self.sink.deliver(wrap(outcome));
        }
    }
}

impl<O, M, F> Drop for Delivery<O, M, F>
where
    F: FnOnce(Result<O, Error>) -> M,
{
    fn drop(&mut self) {
        self.complete(Err(Error::Cancelled));
    }
}

pub(crate) fn in_flight<O, M, F, Fut>(outcome: Fut, sink: &CompletionSink<M>, wrap: F) -> InFlight
where
    Fut: Future<Output = Result<O, Error>> + Send + 'static,
    O: 'static,
    M: Send + 'static,
    F: FnOnce(Result<O, Error>) -> M + Send + 'static,
{
    let (outcome, handle) = abortable(outcome);
    let mut delivery = Delivery {
        sink: sink.clone(),
        wrap: Some(wrap),
        _outcome: PhantomData,
    };
    let task = async move {
        match outcome.await {
            Ok(outcome) => delivery.complete(outcome),
            Err(Aborted) => delivery.complete(Err(Error::Cancelled)),
        }
    }
    .boxed();
    InFlight { task, handle }
}
