//! Shared framing state for stream codecs.
//!
//! Owns the connection, the read buffer and the write batch buffer, and
//! enforces the ordering rules every codec must honor:
//!
//! - a body is read only after its header, and a header only once the
//!   previous body has been consumed
//! - header and body are encoded into one buffer and flushed together, even
//!   when encoding fails halfway
//! - any failed write closes the connection; the codec is unusable afterward

use std::io::BufReader;

use bytes::BytesMut;

use super::Connection;
use crate::error::{Result, RpcwireError};

/// Default read buffer capacity (8 KB).
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default write buffer capacity (8 KB).
pub const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default maximum length of one line for line-delimited codecs (16 MB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Configuration shared by all codecs.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Capacity of the buffered reader wrapping the connection.
    pub read_buffer_capacity: usize,
    /// Initial capacity of the per-frame write buffer.
    pub write_buffer_capacity: usize,
    /// Longest accepted line, for line-delimited codecs.
    pub max_line_length: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
            write_buffer_capacity: DEFAULT_WRITE_BUFFER_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Which half of a frame the reader expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Header,
    Body,
}

/// Connection plus framing state.
pub(crate) struct FramedStream<S> {
    reader: BufReader<S>,
    buf: BytesMut,
    expect: Expect,
    closed: bool,
}

impl<S: Connection> FramedStream<S> {
    pub(crate) fn new(conn: S, config: &CodecConfig) -> Self {
        Self {
            reader: BufReader::with_capacity(config.read_buffer_capacity, conn),
            buf: BytesMut::with_capacity(config.write_buffer_capacity),
            expect: Expect::Header,
            closed: false,
        }
    }

    /// Reader positioned at the start of a header.
    pub(crate) fn header_reader(&mut self) -> Result<&mut BufReader<S>> {
        self.ensure_open()?;
        if self.expect == Expect::Body {
            return Err(RpcwireError::Protocol(
                "header read while a body is pending".to_string(),
            ));
        }
        Ok(&mut self.reader)
    }

    /// Mark the header as consumed; the next read must be its body.
    pub(crate) fn header_done(&mut self) {
        self.expect = Expect::Body;
    }

    /// Reader positioned at the body of the last header.
    ///
    /// The body counts as consumed from here on, whether or not it decodes.
    pub(crate) fn body_reader(&mut self) -> Result<&mut BufReader<S>> {
        self.ensure_open()?;
        if self.expect == Expect::Header {
            return Err(RpcwireError::Protocol(
                "body read without a preceding header".to_string(),
            ));
        }
        self.expect = Expect::Header;
        Ok(&mut self.reader)
    }

    /// Encode one frame into the batch buffer and flush it.
    ///
    /// The buffer is flushed whatever `encode` returns. On any error the
    /// connection is closed before the error is returned.
    pub(crate) fn write_frame<F>(&mut self, encode: F) -> Result<()>
    where
        F: FnOnce(&mut BytesMut) -> Result<()>,
    {
        self.ensure_open()?;
        self.buf.clear();

        let encoded = encode(&mut self.buf);
        let flushed = self.flush();

        match encoded.and(flushed) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = self.close();
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        let conn = self.reader.get_mut();
        conn.write_all(&self.buf).map_err(RpcwireError::Write)?;
        conn.flush().map_err(RpcwireError::Write)?;
        self.buf.clear();
        Ok(())
    }

    /// Shut the connection down. Closing twice is a no-op.
    pub(crate) fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!("rpc codec: closing connection");
        self.reader.get_mut().shutdown()?;
        Ok(())
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RpcwireError::ConnectionClosed)
        } else {
            Ok(())
        }
    }
}
