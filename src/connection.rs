use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use uuid::Uuid;

use crate::codec::{self, FrameCodec, ReplyCodec};
use crate::frame::Frame;
use crate::value::Value;

/// The read side of a client connection. Bytes are read from the socket into a buffer and cut
/// into frames; replies go out through the connection's [`Peer`].
pub struct Connection {
    pub id: Uuid,
    frames: FramedRead<OwnedReadHalf, FrameCodec>,
    peer: Peer,
}

impl Connection {
    pub fn new(stream: TcpStream, max_frame_size: usize) -> Connection {
        let id = Uuid::new_v4();
        let (reader, writer) = stream.into_split();

        Connection {
            id,
            frames: FramedRead::new(reader, FrameCodec::new(max_frame_size)),
            peer: Peer {
                id,
                writer: Arc::new(Mutex::new(FramedWrite::new(writer, ReplyCodec::default()))),
            },
        }
    }

    /// Waits for the next complete frame. `None` means the client closed the connection and
    /// every buffered byte has been framed.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, codec::Error> {
        self.frames.next().await.transpose()
    }

    pub fn peer(&self) -> Peer {
        self.peer.clone()
    }
}

/// Handle used to send replies back to the client a frame came from.
#[derive(Clone)]
pub struct Peer {
    pub id: Uuid,
    writer: Arc<Mutex<FramedWrite<OwnedWriteHalf, ReplyCodec>>>,
}

impl Peer {
    /// Encodes `value` and writes it out, returning once the socket has taken every byte.
    pub async fn send(&self, value: Value) -> Result<(), codec::Error> {
        let mut writer = self.writer.lock().await;
        writer.send(value).await
    }
}
