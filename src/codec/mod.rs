//! Codec module - framing of call headers and bodies over a byte stream.
//!
//! A frame is a [`Header`] followed by a body. Codecs write no length prefix
//! and no boundary marker: the reader stays in step with the writer only by
//! decoding the same sequence of values in the same order.
//!
//! - [`MsgPackCodec`] - self-describing MessagePack using `rmp-serde`
//! - [`JsonCodec`] - one JSON document per line using `serde_json`
//!
//! # Contract
//!
//! - `read_header` must precede every `read_body`/`skip_body`
//! - `write` encodes header then body into one buffer and always flushes it
//! - a failed `write` closes the connection; the codec must not be reused
//! - a codec is not safe for concurrent writes; callers serialize access
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use rpcwire::codec::{Codec, Header, MsgPackCodec};
//!
//! let conn = TcpStream::connect("127.0.0.1:9999")?;
//! let mut codec = MsgPackCodec::new(conn);
//! codec.write(&Header::new("Arith.Multiply", 1), &(3, 4))?;
//!
//! let mut header = Header::default();
//! codec.read_header(&mut header)?;
//! let mut product = 0i64;
//! codec.read_body(&mut product)?;
//! # Ok::<(), rpcwire::RpcwireError>(())
//! ```

mod body;
mod conn;
mod header;
mod json;
mod msgpack;
mod stream;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RpcwireError};

pub use body::Body;
pub use conn::Connection;
pub use header::Header;
pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
pub use stream::{
    CodecConfig, DEFAULT_MAX_LINE_LENGTH, DEFAULT_READ_BUFFER_CAPACITY,
    DEFAULT_WRITE_BUFFER_CAPACITY,
};

/// Frame encoder/decoder bound to one connection.
pub trait Codec: Send {
    /// Decode the next frame header.
    fn read_header(&mut self, header: &mut Header) -> Result<()>;

    /// Decode the body of the last header into a pre-allocated value.
    fn read_body(&mut self, body: &mut dyn Body) -> Result<()>;

    /// Consume and discard the body of the last header.
    fn skip_body(&mut self) -> Result<()>;

    /// Encode and flush one frame. Closes the connection on failure.
    fn write(&mut self, header: &Header, body: &dyn Body) -> Result<()>;

    /// Release the underlying connection.
    fn close(&mut self) -> Result<()>;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn read_header(&mut self, header: &mut Header) -> Result<()> {
        (**self).read_header(header)
    }

    fn read_body(&mut self, body: &mut dyn Body) -> Result<()> {
        (**self).read_body(body)
    }

    fn skip_body(&mut self) -> Result<()> {
        (**self).skip_body()
    }

    fn write(&mut self, header: &Header, body: &dyn Body) -> Result<()> {
        (**self).write(header, body)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Available codec implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodecKind {
    /// [`MsgPackCodec`].
    #[default]
    #[serde(rename = "application/msgpack")]
    MsgPack,
    /// [`JsonCodec`].
    #[serde(rename = "application/json")]
    Json,
}

impl CodecKind {
    /// All known codecs.
    pub const ALL: [CodecKind; 2] = [CodecKind::MsgPack, CodecKind::Json];

    /// Content type naming this codec during option negotiation.
    pub fn content_type(self) -> &'static str {
        match self {
            CodecKind::MsgPack => "application/msgpack",
            CodecKind::Json => "application/json",
        }
    }

    /// Build a codec of this kind over `conn`.
    pub fn new_codec<S>(self, conn: S, config: &CodecConfig) -> Box<dyn Codec>
    where
        S: Connection + 'static,
    {
        match self {
            CodecKind::MsgPack => Box::new(MsgPackCodec::with_config(conn, config)),
            CodecKind::Json => Box::new(JsonCodec::with_config(conn, config)),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

impl FromStr for CodecKind {
    type Err = RpcwireError;

    fn from_str(s: &str) -> Result<Self> {
        CodecKind::ALL
            .into_iter()
            .find(|kind| kind.content_type() == s)
            .ok_or_else(|| RpcwireError::Protocol(format!("invalid codec type {:?}", s)))
    }
}
