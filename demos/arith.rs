//! Arith - blocking request/response over loopback TCP.
//!
//! This demo shows:
//! - Registering a service with explicit method registration
//! - A minimal server loop: read header, look up, decode, call, reply
//! - A client issuing calls with increasing sequence numbers
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --example arith
//! ```

use std::net::{TcpListener, TcpStream};
use std::thread;

use rpcwire::codec::{Codec, CodecConfig, CodecKind, Header};
use rpcwire::{MethodError, ServiceDescriptor};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Arguments for the binary operations.
#[derive(Serialize, Deserialize, Default, Debug)]
struct Args {
    a: i64,
    b: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("divide by zero")]
struct DivideByZero;

struct Arith;

impl Arith {
    fn multiply(&self, args: Args, reply: &mut i64) -> Result<(), MethodError> {
        *reply = args.a * args.b;
        Ok(())
    }

    fn divide(&self, args: Args, reply: &mut i64) -> Result<(), DivideByZero> {
        if args.b == 0 {
            return Err(DivideByZero);
        }
        *reply = args.a / args.b;
        Ok(())
    }
}

fn serve(service: &ServiceDescriptor, mut codec: Box<dyn Codec>) -> rpcwire::Result<()> {
    loop {
        let mut header = Header::default();
        if let Err(e) = codec.read_header(&mut header) {
            tracing::debug!("connection done: {}", e);
            return Ok(());
        }

        let method = match header
            .split_service_method()
            .and_then(|(_, name)| service.lookup(name))
        {
            Ok(method) => method,
            Err(e) => {
                codec.skip_body()?;
                header.error = e.to_string();
                codec.write(&header, &())?;
                continue;
            }
        };

        let mut argv = method.new_argument();
        codec.read_body(argv.as_mut())?;
        let mut replyv = method.new_reply();
        if let Err(e) = service.call(method, argv, replyv.as_mut()) {
            header.error = e.to_string();
        }
        codec.write(&header, replyv.as_ref())?;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // An unregistrable service is a startup bug: stop here.
    let service = ServiceDescriptor::builder(Arith)
        .method("Multiply", Arith::multiply)
        .method("Divide", Arith::divide)
        .build()?;

    for method in service.methods() {
        println!(
            "{}.{}({}) -> {}",
            service.name(),
            method.name(),
            method.argument(),
            method.reply()
        );
    }

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let kind = CodecKind::MsgPack;

    let server = thread::spawn(move || -> rpcwire::Result<()> {
        let (conn, _) = listener.accept()?;
        serve(&service, kind.new_codec(conn, &CodecConfig::default()))
    });

    let mut codec = kind.new_codec(TcpStream::connect(addr)?, &CodecConfig::default());
    let calls = [
        ("Arith.Multiply", Args { a: 6, b: 7 }),
        ("Arith.Divide", Args { a: 10, b: 0 }),
        ("Arith.Modulo", Args { a: 10, b: 3 }),
    ];

    for (seq, (service_method, args)) in calls.into_iter().enumerate() {
        codec.write(&Header::new(service_method, seq as u64), &args)?;

        let mut header = Header::default();
        codec.read_header(&mut header)?;
        if header.is_error() {
            codec.skip_body()?;
            println!("{} #{} failed: {}", service_method, header.seq, header.error);
        } else {
            let mut reply = 0i64;
            codec.read_body(&mut reply)?;
            println!("{} #{} = {}", service_method, header.seq, reply);
        }
    }

    codec.close()?;
    server.join().map_err(|_| "server thread panicked")??;
    Ok(())
}
