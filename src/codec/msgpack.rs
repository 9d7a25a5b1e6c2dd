//! MsgPack stream codec using `rmp-serde`.
//!
//! Header and body are written back to back as two self-describing MessagePack
//! values, with no length prefix. Structs are encoded with `write_named`
//! (struct-as-map), so peers do not need to agree on field order.

use serde::de::IgnoredAny;
use serde::Deserialize;

use bytes::BufMut;

use super::stream::{CodecConfig, FramedStream};
use super::{Body, Codec, Connection, Header};
use crate::error::Result;

/// MessagePack codec bound to one connection.
pub struct MsgPackCodec<S> {
    stream: FramedStream<S>,
}

impl<S: Connection> MsgPackCodec<S> {
    /// Create a codec with default buffer sizes.
    pub fn new(conn: S) -> Self {
        Self::with_config(conn, &CodecConfig::default())
    }

    /// Create a codec with the given configuration.
    pub fn with_config(conn: S, config: &CodecConfig) -> Self {
        Self {
            stream: FramedStream::new(conn, config),
        }
    }

    /// Check if the codec has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }
}

impl<S: Connection> Codec for MsgPackCodec<S> {
    fn read_header(&mut self, header: &mut Header) -> Result<()> {
        let reader = self.stream.header_reader()?;
        *header = Header::deserialize(&mut rmp_serde::Deserializer::new(reader))?;
        self.stream.header_done();
        Ok(())
    }

    fn read_body(&mut self, body: &mut dyn Body) -> Result<()> {
        let reader = self.stream.body_reader()?;
        let mut de = rmp_serde::Deserializer::new(reader);
        body.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut de))?;
        Ok(())
    }

    fn skip_body(&mut self) -> Result<()> {
        let reader = self.stream.body_reader()?;
        IgnoredAny::deserialize(&mut rmp_serde::Deserializer::new(reader))?;
        Ok(())
    }

    fn write(&mut self, header: &Header, body: &dyn Body) -> Result<()> {
        self.stream.write_frame(|buf| {
            let mut writer = buf.writer();
            // CRITICAL: write_named, NOT write! Bodies must stay struct-as-map.
            rmp_serde::encode::write_named(&mut writer, header).map_err(|e| {
                tracing::error!("rpc codec: msgpack error encoding header: {}", e);
                e
            })?;
            rmp_serde::encode::write_named(&mut writer, body.encode()).map_err(|e| {
                tracing::error!("rpc codec: msgpack error encoding body: {}", e);
                e
            })?;
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        self.stream.close()
    }
}
