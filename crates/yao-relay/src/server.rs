use std::{net::SocketAddr, sync::Arc};

use tokio::{
    net::{TcpListener, TcpStream, ToSocketAddrs},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use yao_common::{
    io::Io,
    msgs::{ClientMessage, ServerMessage},
};

use crate::{
    session::{ConnectionId, Outbox, SessionError, SharedSession},
    RelayError, RelayProperties,
};

/// Reason sent to the parties when the relay shuts down.
pub const SHUTDOWN_REASON: &str = "finished";

/// Handle used to shut down a running relay.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    session: Arc<SharedSession>,
    token: CancellationToken,
}

impl RelayHandle {
    /// Notifies every connected party and stops the relay.
    pub fn shutdown(&self) {
        if self.token.is_cancelled() {
            return;
        }

        // Queue the notifications before any connection task sees the
        // cancellation and drops its outbox.
        self.session.lock().shutdown(SHUTDOWN_REASON);
        self.token.cancel();
    }

    /// Returns `true` if the relay was shut down.
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The relay service.
#[derive(Debug)]
pub struct Relay {
    listener: TcpListener,
    session: Arc<SharedSession>,
    token: CancellationToken,
}

impl Relay {
    /// Binds the relay to an address.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;

        Ok(Self {
            listener,
            session: Arc::new(SharedSession::default()),
            token: CancellationToken::new(),
        })
    }

    /// Returns the address the relay is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a handle to the relay.
    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            session: self.session.clone(),
            token: self.token.clone(),
        }
    }

    /// Accepts connections until the relay is shut down.
    pub async fn run(self) -> Result<(), RelayError> {
        info!("Listening for TCP traffic at {}", self.local_addr()?);

        let mut next_id: ConnectionId = 0;
        loop {
            let (stream, peer) = tokio::select! {
                _ = self.token.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        error!("failed to accept connection: {err}");
                        continue;
                    }
                },
            };

            next_id += 1;
            let id = next_id;
            info!(id, %peer, "accepted connection");

            tokio::spawn(
                handle_connection(id, stream, self.session.clone(), self.token.clone())
                    .instrument(info_span!("connection", id)),
            );
        }

        info!("relay stopped");

        Ok(())
    }
}

async fn handle_connection(
    id: ConnectionId,
    stream: TcpStream,
    session: Arc<SharedSession>,
    token: CancellationToken,
) {
    if let Err(err) = stream.set_nodelay(true) {
        warn!("failed to set TCP_NODELAY: {err}");
    }

    let (mut sink, mut stream) = Io::new(stream).split();
    let (outbox, mut queue) = mpsc::unbounded_channel::<ServerMessage>();
    session.lock().connect(id, outbox.clone());

    // Runs until every outbox of the connection is dropped.
    tokio::spawn(
        async move {
            while let Some(msg) = queue.recv().await {
                if let Err(err) = sink.send(&msg).await {
                    error!("failed to write message: {err}");
                    return;
                }
            }

            if let Err(err) = sink.close().await {
                debug!("failed to close connection: {err}");
            }
        }
        .in_current_span(),
    );

    loop {
        let msg = tokio::select! {
            _ = token.cancelled() => break,
            msg = stream.recv::<ClientMessage>() => msg,
        };

        match msg {
            Ok(Some(msg)) => {
                if let Err(err) = handle_message(id, msg, &session, &outbox) {
                    warn!("rejected message: {err}");
                }
            }
            Ok(None) => {
                debug!("client closed the connection");
                break;
            }
            Err(err) => {
                error!("failed to read message: {err}");
                break;
            }
        }
    }

    session.lock().disconnect(id);
}

fn handle_message(
    id: ConnectionId,
    msg: ClientMessage,
    session: &SharedSession,
    outbox: &Outbox,
) -> Result<(), SessionError> {
    match msg {
        ClientMessage::Join(request) => session.lock().join(id, request),
        ClientMessage::Send { tag, value } => session.lock().publish(id, tag, value),
        ClientMessage::ListeningFor { tag } => {
            let pending = session.lock().listen(id, tag.clone())?;
            if let Some(pending) = pending {
                let outbox = outbox.clone();
                tokio::spawn(
                    async move {
                        // Canceled if the mailbox is cleared before the value arrives.
                        if let Ok(value) = pending.await {
                            let _ = outbox.send(ServerMessage::Deliver { tag, value });
                        }
                    }
                    .in_current_span(),
                );
            }
            Ok(())
        }
        ClientMessage::Oblv { msg_id, length } => session.lock().oblv(id, msg_id, length),
    }
}

/// Runs the relay until it receives ctrl-c.
pub async fn run_server(config: &RelayProperties) -> Result<(), RelayError> {
    let relay = Relay::bind(config.addr()).await?;
    let handle = relay.handle();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c"),
            Err(err) => error!("failed to listen for ctrl-c: {err}"),
        }
        handle.shutdown();
    });

    relay.run().await
}
