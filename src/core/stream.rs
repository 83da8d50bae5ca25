//! Single-use byte stream handle returned by a resolver.
//!
//! The stream is forward-only and pull-based; the HTTP layer polls it
//! only when the outbound transport is ready. Dropping the stream (the
//! client disconnected, or the response was abandoned) cancels the
//! attached token, which the producing side uses to kill its upstream
//! process or connection instead of silently draining.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::models::quality::FormatContainer;

pub struct MediaStream {
    pub container: FormatContainer,
    /// Sanitized basename without extension.
    pub filename: String,
    body: GuardedStream,
}

impl MediaStream {
    /// Wraps `stream` so that dropping the body cancels `cancel`.
    pub fn new<S>(
        container: FormatContainer,
        filename: impl Into<String>,
        stream: S,
        cancel: CancellationToken,
    ) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            container,
            filename: filename.into(),
            body: GuardedStream {
                inner: stream.boxed(),
                _guard: cancel.drop_guard(),
            },
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.container.mime()
    }

    /// Suggested `filename="..."` value, extension included.
    pub fn attachment_name(&self) -> String {
        format!("{}.{}", self.filename, self.container.ext())
    }

    pub fn into_body(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        self.body
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("container", &self.container)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

struct GuardedStream {
    inner: BoxStream<'static, io::Result<Bytes>>,
    _guard: DropGuard,
}

impl Stream for GuardedStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.inner.as_mut().poll_next(cx);
        if let Poll::Ready(Some(Err(e))) = &polled {
            // Headers may already be on the wire; the transport can only
            // abort the connection, so record the cause here.
            tracing::error!("media stream failed mid-transfer: {}", e);
        }
        polled
    }
}
