use std::collections::VecDeque;
use std::future::Future;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::error::TransportError;

/// A lazy, finite source of byte increments.
///
/// Increments carry no alignment to records or magic markers; any split
/// of the stream, down to single bytes, must decode identically.
/// `Ok(None)` is the normal end of stream. Errors are the source's own
/// and are reported as [`ProtocolError::Transport`](crate::ProtocolError::Transport).
///
/// Awaiting `next_chunk` is the only suspension point of a retrieval.
/// Dropping the retrieval future between awaits abandons it cleanly.
pub trait Transport {
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, TransportError>> + Send;
}

/// Reads increments from any [`AsyncRead`]: a file, a socket, a pipe.
pub struct ReaderTransport<R> {
    reader: R,
    chunk_size: usize,
}

impl<R> ReaderTransport<R> {
    #[must_use]
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: AsyncRead + Unpin + Send> Transport for ReaderTransport<R> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        let mut buf = BytesMut::with_capacity(self.chunk_size);
        let n = self.reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }
}

/// Receives increments pushed by another task, typically one draining
/// an HTTP response body. Closing the sender ends the stream.
pub struct ChannelTransport {
    rx: mpsc::Receiver<Result<Bytes, TransportError>>,
}

impl ChannelTransport {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Result<Bytes, TransportError>>) -> Self {
        Self { rx }
    }

    /// A bounded channel and the transport reading from it.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<Bytes, TransportError>>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

impl Transport for ChannelTransport {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        self.rx.recv().await.transpose()
    }
}

/// Serves pre-split increments from memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    chunks: VecDeque<Bytes>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `data` into increments of `chunk_size` bytes (the last one
    /// may be shorter).
    #[must_use]
    pub fn split(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        let data = data.into();
        let chunk_size = chunk_size.max(1);
        let chunks = (0..data.len())
            .step_by(chunk_size)
            .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
            .collect();
        Self { chunks }
    }

    /// Number of increments not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

impl Transport for MemoryTransport {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        Ok(self.chunks.pop_front())
    }
}
