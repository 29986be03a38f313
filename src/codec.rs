use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::encoder::{self, SerDeOptions};
use crate::frame::{self, Frame, Recognition};
use crate::value::Value;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("frame size {size} exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Cuts a connection's byte stream into command frames.
///
/// An array frame is only emitted once it is complete. A buffer starting with `*` that is not
/// yet a well-formed array waits for more bytes, and becomes one last inline frame if the stream
/// ends first. Any other buffer is read one line at a time.
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }

    fn next_frame(&mut self, src: &mut BytesMut, at_eof: bool) -> Result<Option<Frame>, Error> {
        if src.is_empty() {
            return Ok(None);
        }

        if src[0] == b'*' {
            return match frame::recognize_array(src) {
                Recognition::Recognized(len) => Ok(Some(Frame::Array(src.split_to(len).freeze()))),
                Recognition::NotRecognized if at_eof => {
                    let rest = src.split().freeze();
                    Ok(Some(Frame::Inline(rest)))
                }
                // Not enough data to recognize a frame.
                Recognition::NotRecognized => self.wait_for_more(src),
            };
        }

        match frame::scan_line(src, at_eof) {
            Some((line, len)) => {
                let line = Bytes::copy_from_slice(line);
                src.advance(len);
                Ok(Some(Frame::Inline(line)))
            }
            None => self.wait_for_more(src),
        }
    }

    /// Only bytes that could not be framed yet count against the limit.
    fn wait_for_more(&self, src: &BytesMut) -> Result<Option<Frame>, Error> {
        if src.len() > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size: src.len(),
                limit: self.max_frame_size,
            });
        }
        Ok(None)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.next_frame(src, false)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.next_frame(src, true)
    }
}

/// Writes replies in wire format using the connection's encoding options.
#[derive(Default)]
pub struct ReplyCodec {
    options: SerDeOptions,
}

impl ReplyCodec {
    #[cfg(test)]
    pub(crate) fn new(options: SerDeOptions) -> ReplyCodec {
        ReplyCodec { options }
    }
}

impl Encoder<Value> for ReplyCodec {
    type Error = Error;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encoder::encode_into(&item, &self.options, dst);
        Ok(())
    }
}
