//! I/O types.
//!
//! Messages are encoded with `bincode` and carried in length-delimited frames.

use bytes::Bytes;
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Maximum length of a frame in bytes.
pub const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

/// An I/O error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

trait Duplex: AsyncRead + AsyncWrite {}

impl<T> Duplex for T where T: AsyncRead + AsyncWrite {}

type Transport = Framed<Box<dyn Duplex + Send + Unpin>, LengthDelimitedCodec>;

/// I/O channel.
pub struct Io {
    framed: Transport,
}

impl std::fmt::Debug for Io {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Io").finish_non_exhaustive()
    }
}

impl Io {
    /// Creates a new channel over a byte stream.
    pub fn new<T>(io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let io: Box<dyn Duplex + Send + Unpin> = Box::new(io);
        let framed = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_LEN)
            .new_framed(io);

        Self { framed }
    }

    /// Sends a message.
    pub async fn send<M: Serialize>(&mut self, msg: &M) -> Result<(), IoError> {
        send(&mut self.framed, msg).await
    }

    /// Receives a message, returning `None` if the peer closed the channel.
    pub async fn recv<M: DeserializeOwned>(&mut self) -> Result<Option<M>, IoError> {
        recv(&mut self.framed).await
    }

    /// Splits the channel into a sending and a receiving half.
    pub fn split(self) -> (IoSink, IoStream) {
        let (sink, stream) = self.framed.split();
        (IoSink { sink }, IoStream { stream })
    }
}

/// Sending half of an [`Io`] channel.
pub struct IoSink {
    sink: SplitSink<Transport, Bytes>,
}

impl std::fmt::Debug for IoSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoSink").finish_non_exhaustive()
    }
}

impl IoSink {
    /// Sends a message.
    pub async fn send<M: Serialize>(&mut self, msg: &M) -> Result<(), IoError> {
        send(&mut self.sink, msg).await
    }

    /// Flushes and closes the sending half.
    pub async fn close(&mut self) -> Result<(), IoError> {
        self.sink.close().await.map_err(IoError::from)
    }
}

/// Receiving half of an [`Io`] channel.
pub struct IoStream {
    stream: SplitStream<Transport>,
}

impl std::fmt::Debug for IoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoStream").finish_non_exhaustive()
    }
}

impl IoStream {
    /// Receives a message, returning `None` if the peer closed the channel.
    pub async fn recv<M: DeserializeOwned>(&mut self) -> Result<Option<M>, IoError> {
        recv(&mut self.stream).await
    }
}

async fn send<S, M>(sink: &mut S, msg: &M) -> Result<(), IoError>
where
    S: futures::Sink<Bytes, Error = std::io::Error> + Unpin,
    M: Serialize,
{
    let bytes = bincode::serialize(msg)?;
    sink.send(Bytes::from(bytes)).await?;
    Ok(())
}

async fn recv<S, M>(stream: &mut S) -> Result<Option<M>, IoError>
where
    S: futures::Stream<Item = Result<bytes::BytesMut, std::io::Error>> + Unpin,
    M: DeserializeOwned,
{
    match stream.next().await {
        Some(frame) => Ok(Some(bincode::deserialize(&frame?)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_io() {
        let (a, b) = tokio::io::duplex(1024);
        let (mut a, mut b) = (Io::new(a), Io::new(b));

        a.send(&("hello".to_string(), 42u32)).await.unwrap();
        let msg: (String, u32) = b.recv().await.unwrap().unwrap();
        assert_eq!(msg, ("hello".to_string(), 42));

        let (mut sink, _stream) = b.split();
        sink.send(&7u8).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(a.recv::<u8>().await.unwrap(), Some(7));
        assert_eq!(a.recv::<u8>().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_io_bad_frame() {
        let (a, b) = tokio::io::duplex(1024);
        let (mut a, mut b) = (Io::new(a), Io::new(b));

        a.send(&1u8).await.unwrap();

        assert!(matches!(b.recv::<String>().await, Err(IoError::Codec(_))));
    }
}
