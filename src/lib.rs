//! # rpcwire
//!
//! Dispatch core for a blocking RPC runtime.
//!
//! This crate turns plain Rust objects into remotely callable services and
//! moves call headers and bodies across a byte stream. Listening, dialing,
//! request scheduling and timeouts belong to the server/client built on top.
//!
//! ## Architecture
//!
//! - **Codec** ([`codec`]): two-part frames (header, body) with no length
//!   prefix, over any [`codec::Connection`]. MsgPack and JSON-lines included.
//! - **Registry** ([`service`]): a [`ServiceDescriptor`] per receiver, with one
//!   [`MethodDescriptor`] per callable method.
//!
//! ## Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use rpcwire::codec::{Codec, Header, MsgPackCodec};
//! use rpcwire::ServiceDescriptor;
//!
//! struct Arith;
//!
//! impl Arith {
//!     fn add(&self, args: (i64, i64), reply: &mut i64) -> Result<(), rpcwire::MethodError> {
//!         *reply = args.0 + args.1;
//!         Ok(())
//!     }
//! }
//!
//! let service = ServiceDescriptor::builder(Arith).method("Add", Arith::add).build()?;
//! let mut codec = MsgPackCodec::new(TcpStream::connect("127.0.0.1:9999")?);
//!
//! let mut header = Header::default();
//! codec.read_header(&mut header)?;
//! let (_, method_name) = header.split_service_method()?;
//! let method = service.lookup(method_name)?;
//!
//! let mut argv = method.new_argument();
//! codec.read_body(argv.as_mut())?;
//! let mut replyv = method.new_reply();
//! if let Err(e) = service.call(method, argv, replyv.as_mut()) {
//!     header.error = e.to_string();
//! }
//! codec.write(&header, replyv.as_ref())?;
//! # Ok::<(), rpcwire::RpcwireError>(())
//! ```

pub mod codec;
pub mod error;
pub mod service;

pub use codec::{Codec, CodecKind, Header};
pub use error::{MethodError, Result, RpcwireError};
pub use service::{MethodDescriptor, ServiceDescriptor};
