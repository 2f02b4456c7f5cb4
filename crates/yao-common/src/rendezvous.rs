//! Rendezvous transport.
//!
//! Connects a party to the relay. Values are published into the peer's
//! mailbox under a tag and fetched from the party's own mailbox by tag.
//! Each fetch receives exactly one value.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, ToSocketAddrs},
    task::JoinHandle,
};
use tracing::{debug, error, trace, warn};

use crate::{
    future::{new_output, Canceled, MaybeDone, Sender},
    io::{Io, IoError, IoSink, IoStream},
    msgs::{ClientMessage, Event, EventKind, JoinRequest, OtRandomness, Payload, ServerMessage},
};

/// Errors that can occur when talking to the relay.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("invalid mailbox value for tag {tag}: {source}")]
    Value {
        tag: String,
        #[source]
        source: bincode::Error,
    },
    #[error("connection to the relay closed")]
    Closed,
}

impl From<Canceled> for TransportError {
    fn from(_: Canceled) -> Self {
        TransportError::Closed
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(IoError::Io(err))
    }
}

/// Requests waiting for a message from the relay.
#[derive(Debug, Default)]
struct Pending {
    fetches: HashMap<String, Sender<Payload>>,
    events: HashMap<EventKind, Vec<Sender<Event>>>,
    oblv: HashMap<String, Sender<OtRandomness>>,
    closed: bool,
}

impl Pending {
    fn handle(&mut self, msg: ServerMessage) {
        self.prune();
        match msg {
            ServerMessage::Whoami(role) => self.fire(Event::Whoami(role)),
            ServerMessage::Go => self.fire(Event::Go),
            ServerMessage::Shutdown { reason } => self.fire(Event::Shutdown(reason)),
            ServerMessage::Rejected { reason } => self.fire(Event::Rejected(reason)),
            ServerMessage::Deliver { tag, value } => match self.fetches.remove(&tag) {
                Some(sender) => {
                    trace!(%tag, len = value.len(), "received value");
                    let _ = sender.send(value);
                }
                None => warn!(%tag, "received value nobody is waiting for"),
            },
            ServerMessage::Oblv { msg_id, randomness } => match self.oblv.remove(&msg_id) {
                Some(sender) => {
                    let _ = sender.send(randomness);
                }
                None => warn!(%msg_id, "received OT randomness nobody is waiting for"),
            },
        }
    }

    fn fire(&mut self, event: Event) {
        debug!(?event, "session event");
        for sender in self.events.remove(&event.kind()).unwrap_or_default() {
            let _ = sender.send(event.clone());
        }
    }

    /// Forgets requests whose caller has stopped waiting.
    fn prune(&mut self) {
        self.fetches.retain(|_, sender| !sender.is_canceled());
        self.oblv.retain(|_, sender| !sender.is_canceled());
        self.events.retain(|_, senders| {
            senders.retain(|sender| !sender.is_canceled());
            !senders.is_empty()
        });
    }

    /// Drops every pending request, which cancels them.
    fn close(&mut self) {
        self.closed = true;
        self.fetches.clear();
        self.events.clear();
        self.oblv.clear();
    }
}

#[derive(Debug, Default)]
struct Shared(Mutex<Pending>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Inner {
    sink: tokio::sync::Mutex<IoSink>,
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// A connection to the relay.
///
/// Cloning is cheap and every clone shares the same connection.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    inner: Arc<Inner>,
}

impl Rendezvous {
    /// Connects to a relay.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        Ok(Self::new(stream))
    }

    /// Creates a new connection over a byte stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<T>(io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (sink, stream) = Io::new(io).split();
        let shared = Arc::new(Shared::default());
        let reader = tokio::spawn(read_loop(stream, shared.clone()));

        Self {
            inner: Arc::new(Inner {
                sink: tokio::sync::Mutex::new(sink),
                shared,
                reader,
            }),
        }
    }

    async fn send(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        self.inner.sink.lock().await.send(msg).await?;
        Ok(())
    }

    /// Requests a role from the relay.
    pub async fn join(&self, request: JoinRequest) -> Result<(), TransportError> {
        debug!(?request, "joining session");
        self.send(&ClientMessage::Join(request)).await
    }

    /// Returns a future which resolves the next time `kind` fires.
    ///
    /// Register before sending the request which triggers the event.
    pub fn wait_for(&self, kind: EventKind) -> MaybeDone<Event> {
        let (sender, recv) = new_output();
        let mut pending = self.inner.shared.lock();
        if !pending.closed {
            pending.prune();
            pending.events.entry(kind).or_default().push(sender);
        }
        recv
    }

    /// Publishes a value under `tag` in the peer's mailbox.
    pub async fn publish<V: Serialize + ?Sized>(
        &self,
        tag: &str,
        value: &V,
    ) -> Result<(), TransportError> {
        let value = bincode::serialize(value).map_err(|source| TransportError::Value {
            tag: tag.to_string(),
            source,
        })?;

        trace!(%tag, len = value.len(), "publishing value");
        self.send(&ClientMessage::Send {
            tag: tag.to_string(),
            value,
        })
        .await
    }

    /// Fetches the value stored under `tag` in the party's own mailbox,
    /// waiting until the peer publishes it.
    pub async fn fetch<V: DeserializeOwned>(&self, tag: &str) -> Result<V, TransportError> {
        let (sender, recv) = new_output();
        {
            let mut pending = self.inner.shared.lock();
            if pending.closed {
                return Err(TransportError::Closed);
            }
            pending.prune();
            pending.fetches.insert(tag.to_string(), sender);
        }

        self.send(&ClientMessage::ListeningFor {
            tag: tag.to_string(),
        })
        .await?;

        let value = recv.await?;
        bincode::deserialize(&value).map_err(|source| TransportError::Value {
            tag: tag.to_string(),
            source,
        })
    }

    /// Requests OT randomness for the transfer `msg_id`.
    pub async fn oblv(&self, msg_id: &str, length: usize) -> Result<OtRandomness, TransportError> {
        let (sender, recv) = new_output();
        {
            let mut pending = self.inner.shared.lock();
            if pending.closed {
                return Err(TransportError::Closed);
            }
            pending.prune();
            pending.oblv.insert(msg_id.to_string(), sender);
        }

        self.send(&ClientMessage::Oblv {
            msg_id: msg_id.to_string(),
            length,
        })
        .await?;

        Ok(recv.await?)
    }

    /// Closes the sending half of the connection.
    ///
    /// The relay treats this as a disconnect.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.inner.sink.lock().await.close().await?;
        Ok(())
    }
}

async fn read_loop(mut stream: IoStream, shared: Arc<Shared>) {
    loop {
        match stream.recv::<ServerMessage>().await {
            Ok(Some(msg)) => shared.lock().handle(msg),
            Ok(None) => {
                debug!("relay closed the connection");
                break;
            }
            Err(err) => {
                error!("failed to read from relay: {err}");
                break;
            }
        }
    }

    shared.lock().close();
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::msgs::Role;

    fn pair() -> (Rendezvous, Io) {
        let (a, b) = tokio::io::duplex(1 << 16);
        (Rendezvous::new(a), Io::new(b))
    }

    #[tokio::test]
    async fn test_join_and_events() {
        let (client, mut relay) = pair();

        let whoami = client.wait_for(EventKind::Whoami);
        let go = client.wait_for(EventKind::Go);
        client.join(JoinRequest::Any).await.unwrap();

        assert_eq!(
            relay.recv::<ClientMessage>().await.unwrap(),
            Some(ClientMessage::Join(JoinRequest::Any))
        );

        relay
            .send(&ServerMessage::Whoami(Role::Garbler))
            .await
            .unwrap();
        relay.send(&ServerMessage::Go).await.unwrap();

        assert_eq!(whoami.await.unwrap(), Event::Whoami(Role::Garbler));
        assert_eq!(go.await.unwrap(), Event::Go);
    }

    #[tokio::test]
    async fn test_publish() {
        let (client, mut relay) = pair();

        client.publish("results", &vec![true, false]).await.unwrap();

        let Some(ClientMessage::Send { tag, value }) = relay.recv().await.unwrap() else {
            panic!("expected a send");
        };
        assert_eq!(tag, "results");
        assert_eq!(
            bincode::deserialize::<Vec<bool>>(&value).unwrap(),
            vec![true, false]
        );
    }

    #[tokio::test]
    async fn test_fetch() {
        let (client, mut relay) = pair();

        let fetch = tokio::spawn({
            let client = client.clone();
            async move { client.fetch::<String>("Wire0").await }
        });

        assert_eq!(
            relay.recv::<ClientMessage>().await.unwrap(),
            Some(ClientMessage::ListeningFor {
                tag: "Wire0".to_string()
            })
        );

        relay
            .send(&ServerMessage::Deliver {
                tag: "Wire0".to_string(),
                value: bincode::serialize("label").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(fetch.await.unwrap().unwrap(), "label");
    }

    #[tokio::test]
    async fn test_oblv() {
        let (client, mut relay) = pair();

        let oblv = tokio::spawn({
            let client = client.clone();
            async move { client.oblv("ot/Wire2", 17).await }
        });

        assert_eq!(
            relay.recv::<ClientMessage>().await.unwrap(),
            Some(ClientMessage::Oblv {
                msg_id: "ot/Wire2".to_string(),
                length: 17
            })
        );

        let randomness = OtRandomness::Receiver {
            choice: true,
            pad: vec![1; 17],
        };
        relay
            .send(&ServerMessage::Oblv {
                msg_id: "ot/Wire2".to_string(),
                randomness: randomness.clone(),
            })
            .await
            .unwrap();

        assert_eq!(oblv.await.unwrap().unwrap(), randomness);
    }

    #[tokio::test]
    async fn test_fetch_fails_when_relay_closes() {
        let (client, mut relay) = pair();

        let fetch = tokio::spawn({
            let client = client.clone();
            async move { client.fetch::<u8>("gates").await }
        });

        assert!(relay.recv::<ClientMessage>().await.unwrap().is_some());
        drop(relay);

        assert!(matches!(
            fetch.await.unwrap(),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            client.fetch::<u8>("gates").await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_abandoned_requests_are_forgotten() {
        let (client, mut relay) = pair();

        let fetch = tokio::spawn({
            let client = client.clone();
            async move { client.fetch::<u8>("Wire1").await }
        });
        assert!(relay.recv::<ClientMessage>().await.unwrap().is_some());
        fetch.abort();
        assert!(fetch.await.unwrap_err().is_cancelled());

        drop(client.wait_for(EventKind::Shutdown));
        let go = client.wait_for(EventKind::Go);

        {
            let pending = client.inner.shared.lock();
            assert!(pending.fetches.is_empty());
            assert_eq!(pending.events.len(), 1);
            assert!(pending.events.contains_key(&EventKind::Go));
        }

        relay.send(&ServerMessage::Go).await.unwrap();
        assert_eq!(go.await.unwrap(), Event::Go);
    }

    #[tokio::test]
    async fn test_rejected_join() {
        let (client, mut relay) = pair();

        let rejected = client.wait_for(EventKind::Rejected);
        client.join(JoinRequest::Role(Role::Evaluator)).await.unwrap();
        assert!(relay.recv::<ClientMessage>().await.unwrap().is_some());

        relay
            .send(&ServerMessage::Rejected {
                reason: "the evaluator slot is already taken".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            rejected.await.unwrap(),
            Event::Rejected("the evaluator slot is already taken".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_invalid_value() {
        let (client, mut relay) = pair();

        let fetch = tokio::spawn({
            let client = client.clone();
            async move { client.fetch::<String>("evaluation").await }
        });

        assert!(relay.recv::<ClientMessage>().await.unwrap().is_some());
        relay
            .send(&ServerMessage::Deliver {
                tag: "evaluation".to_string(),
                value: vec![1],
            })
            .await
            .unwrap();

        assert!(matches!(
            fetch.await.unwrap(),
            Err(TransportError::Value { tag, .. }) if tag == "evaluation"
        ));
    }
}
