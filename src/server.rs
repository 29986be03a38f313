use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::commands;
use crate::config::Config;
use crate::connection::{Connection, Peer};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// A framed command on its way to the executor, along with where its reply goes.
pub struct Message {
    pub peer: Peer,
    pub frame: Frame,
}

/// Connection tasks only read and frame. Every frame is queued for a single executor that owns
/// the store, so commands run one at a time in queue order and the store needs no locks.
pub struct Server {
    listener: TcpListener,
    config: Config,
    shutdown: CancellationToken,
}

impl Server {
    pub async fn bind(config: Config) -> Result<Server, Error> {
        let listener = TcpListener::bind(&config.addr).await?;

        Ok(Server {
            listener,
            config,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Cancelling the returned token stops the server. Connections still open are dropped
    /// without being drained.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<(), Error> {
        info!("Redis server listening on {}", self.listener.local_addr()?);

        // A zero capacity channel is not allowed.
        let (tx, rx) = mpsc::channel(self.config.queue_capacity.max(1));

        let acceptor = tokio::spawn(accept(self.listener, tx, self.config.max_frame_size));

        execute(rx, self.shutdown).await;

        acceptor.abort();
        // Wait for the listener to be dropped.
        let _ = acceptor.await;
        info!("Server stopped");

        Ok(())
    }
}

/// Binds to the configured address and serves until the process is interrupted.
pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let server = Server::bind(config).await?;

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!("Failed to listen for the shutdown signal: {}", e),
        }
        shutdown.cancel();
    });

    server.run().await
}

async fn accept(listener: TcpListener, queue: Sender<Message>, max_frame_size: usize) {
    loop {
        let (socket, client_address) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(handle_connection(
            socket,
            client_address,
            queue.clone(),
            max_frame_size,
        ));
    }
}

async fn execute(mut queue: Receiver<Message>, shutdown: CancellationToken) {
    let mut store = Store::new();

    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            message = queue.recv() => match message {
                Some(message) => message,
                None => break,
            },
        };

        let reply = commands::execute(&mut store, message.frame);
        debug!(
            peer = %message.peer.id,
            keys = store.len(),
            "Sending response to client: {:?}",
            reply
        );

        // The executor waits for the write, so a slow client holds everybody back.
        if let Err(e) = message.peer.send(reply).await {
            warn!(peer = %message.peer.id, "Failed to send response: {}", e);
        }
    }
}

#[instrument(
    name = "connection",
    skip(stream, queue, max_frame_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    queue: Sender<Message>,
    max_frame_size: usize,
) {
    let mut conn = Connection::new(stream, max_frame_size);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                error!("Closing connection after read failure: {}", e);
                break;
            }
        };
        debug!("Received frame from client: {}", frame);

        let message = Message {
            peer: conn.peer(),
            frame,
        };
        if queue.send(message).await.is_err() {
            warn!("Server is shutting down, dropping frame");
            break;
        }
    }

    info!("Connection closed");
}
