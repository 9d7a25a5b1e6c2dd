//! Line-delimited JSON stream codec.
//!
//! Every header and every body is one JSON document on its own line.
//! `serde_json` escapes newlines inside strings, so a line break always ends a
//! value; lines longer than `max_line_length` are rejected.

use std::io::{BufRead, Read};

use bytes::BufMut;
use serde::de::IgnoredAny;

use super::stream::{CodecConfig, FramedStream};
use super::{Body, Codec, Connection, Header};
use crate::error::{Result, RpcwireError};

/// JSON-lines codec bound to one connection.
pub struct JsonCodec<S> {
    stream: FramedStream<S>,
    max_line_length: usize,
    line: String,
}

impl<S: Connection> JsonCodec<S> {
    /// Create a codec with default buffer sizes and line limit.
    pub fn new(conn: S) -> Self {
        Self::with_config(conn, &CodecConfig::default())
    }

    /// Create a codec with the given configuration.
    pub fn with_config(conn: S, config: &CodecConfig) -> Self {
        Self {
            stream: FramedStream::new(conn, config),
            max_line_length: config.max_line_length,
            line: String::new(),
        }
    }

    /// Check if the codec has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }
}

/// Read one line (without its terminator) into `line`.
///
/// `max` bounds the line content; the `\n` or `\r\n` terminator is not
/// counted against it.
fn read_line<R: BufRead>(reader: &mut R, line: &mut String, max: usize) -> Result<()> {
    line.clear();
    // Room for a `\r\n` terminator
    let limit = (max as u64).saturating_add(2);
    let n = reader
        .by_ref()
        .take(limit)
        .read_line(line)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                RpcwireError::Protocol("line is not valid UTF-8".to_string())
            }
            _ => RpcwireError::Io(e),
        })?;
    if n == 0 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    if !line.ends_with('\n') {
        if n as u64 >= limit {
            return Err(too_long(max));
        }
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    line.pop();
    if line.ends_with('\r') {
        line.pop();
    }
    if line.len() > max {
        return Err(too_long(max));
    }
    Ok(())
}

fn too_long(max: usize) -> RpcwireError {
    RpcwireError::Protocol(format!("line exceeds maximum length of {} bytes", max))
}

impl<S: Connection> Codec for JsonCodec<S> {
    fn read_header(&mut self, header: &mut Header) -> Result<()> {
        let reader = self.stream.header_reader()?;
        read_line(reader, &mut self.line, self.max_line_length)?;
        *header = serde_json::from_str(&self.line)?;
        self.stream.header_done();
        Ok(())
    }

    fn read_body(&mut self, body: &mut dyn Body) -> Result<()> {
        let reader = self.stream.body_reader()?;
        read_line(reader, &mut self.line, self.max_line_length)?;
        let mut de = serde_json::Deserializer::from_str(&self.line);
        body.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut de))?;
        de.end()?;
        Ok(())
    }

    fn skip_body(&mut self) -> Result<()> {
        let reader = self.stream.body_reader()?;
        read_line(reader, &mut self.line, self.max_line_length)?;
        serde_json::from_str::<IgnoredAny>(&self.line)?;
        Ok(())
    }

    fn write(&mut self, header: &Header, body: &dyn Body) -> Result<()> {
        self.stream.write_frame(|buf| {
            serde_json::to_writer((&mut *buf).writer(), header).map_err(|e| {
                tracing::error!("rpc codec: json error encoding header: {}", e);
                RpcwireError::JsonEncode(e)
            })?;
            buf.put_u8(b'\n');
            serde_json::to_writer((&mut *buf).writer(), body.encode()).map_err(|e| {
                tracing::error!("rpc codec: json error encoding body: {}", e);
                RpcwireError::JsonEncode(e)
            })?;
            buf.put_u8(b'\n');
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        self.stream.close()
    }
}
