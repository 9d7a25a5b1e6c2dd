//! Integration tests for rpcwire.
//!
//! These tests drive the registry and the codecs together, the way a server
//! loop would.

use std::collections::HashMap;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use rpcwire::codec::{Codec, CodecConfig, CodecKind, Header, JsonCodec, MsgPackCodec};
use rpcwire::service::ValueShape;
use rpcwire::{MethodError, RpcwireError, ServiceDescriptor};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
struct Pair {
    #[serde(rename = "X")]
    x: i64,
    #[serde(rename = "Y")]
    y: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("divide by zero")]
struct DivideByZero;

#[derive(Default)]
struct Arith;

impl Arith {
    fn add(&self, args: Pair, reply: &mut i64) -> Result<(), MethodError> {
        *reply = args.x + args.y;
        Ok(())
    }

    fn divide(&self, args: Pair, reply: &mut i64) -> Result<(), DivideByZero> {
        if args.y == 0 {
            return Err(DivideByZero);
        }
        *reply = args.x / args.y;
        Ok(())
    }

    fn histogram(
        &self,
        args: Vec<String>,
        reply: &mut HashMap<String, u32>,
    ) -> Result<(), MethodError> {
        for word in args {
            *reply.entry(word).or_default() += 1;
        }
        Ok(())
    }

    fn echo(&self, args: Pair, reply: &mut Pair) -> Result<(), MethodError> {
        *reply = args;
        Ok(())
    }
}

fn arith() -> ServiceDescriptor {
    ServiceDescriptor::builder(Arith)
        .method("Add", Arith::add)
        .method("Divide", Arith::divide)
        .method("Histogram", Arith::histogram)
        .method("Echo", Arith::echo)
        .method("add", Arith::add)
        .build()
        .unwrap()
}

/// Connected loopback TCP pair.
fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

/// Serve requests on `codec` until the peer hangs up.
fn serve(service: &ServiceDescriptor, mut codec: Box<dyn Codec>) {
    loop {
        let mut header = Header::default();
        if codec.read_header(&mut header).is_err() {
            break;
        }

        let method = header
            .split_service_method()
            .and_then(|(_, method)| service.lookup(method));
        let method = match method {
            Ok(m) => m,
            Err(e) => {
                codec.skip_body().unwrap();
                header.error = e.to_string();
                codec.write(&header, &()).unwrap();
                continue;
            }
        };

        let mut argv = method.new_argument();
        codec.read_body(argv.as_mut()).unwrap();
        let mut replyv = method.new_reply();
        if let Err(e) = service.call(method, argv, replyv.as_mut()) {
            header.error = e.to_string();
        }
        codec.write(&header, replyv.as_ref()).unwrap();
    }
}

#[test]
fn test_register_exposes_exactly_callable_methods() {
    let service = arith();
    assert_eq!(service.name(), "Arith");
    assert_eq!(
        service.method_names(),
        vec!["Add", "Divide", "Echo", "Histogram"]
    );
    assert_eq!(service.excluded().len(), 1);
    assert_eq!(service.excluded()[0].name, "add");
    assert!(service.type_name().ends_with("::Arith"));
    assert!(!service.is_empty());

    let mut signatures: Vec<String> = service
        .methods()
        .map(|m| format!("{}({}) -> {}", m.name(), m.argument(), m.reply()))
        .collect();
    signatures.sort();
    assert_eq!(
        signatures,
        vec![
            "Add(struct Pair) -> scalar i64",
            "Divide(struct Pair) -> scalar i64",
            "Echo(struct Pair) -> struct Pair",
            "Histogram(sequence Vec) -> map HashMap",
        ]
    );

    let empty = ServiceDescriptor::builder(Arith).build().unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_unexported_service_is_not_registered() {
    #[allow(non_camel_case_types)]
    struct arith_impl;

    let err = ServiceDescriptor::builder(arith_impl).build().unwrap_err();
    assert!(matches!(err, RpcwireError::InvalidServiceName(_)));
}

#[test]
fn test_lookup_unknown_method_is_recoverable() {
    let service = arith();
    let err = service.lookup("Pow").unwrap_err();
    assert_eq!(err.to_string(), "can't find method Arith.Pow");

    // The service keeps working
    assert!(service.lookup("Add").is_ok());
}

#[test]
fn test_new_reply_containers_are_empty() {
    let service = arith();
    let method = service.lookup("Histogram").unwrap();

    assert_eq!(method.argument().shape(), ValueShape::Sequence);
    assert_eq!(method.reply().shape(), ValueShape::Map);

    let argv = method.new_argument();
    assert!(argv.downcast_ref::<Vec<String>>().unwrap().is_empty());
    let replyv = method.new_reply();
    assert!(replyv.downcast_ref::<HashMap<String, u32>>().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_are_counted_exactly() {
    const CALLERS: i64 = 64;

    let service = Arc::new(arith());
    let mut tasks = Vec::new();

    for i in 0..CALLERS {
        let service = service.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let method = service.lookup("Add").unwrap();
            let mut replyv = method.new_reply();
            service
                .call(method, Box::new(Pair { x: i, y: 1000 }), replyv.as_mut())
                .unwrap();
            *replyv.downcast_ref::<i64>().unwrap()
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        // Each caller sees only its own reply
        assert_eq!(task.await.unwrap(), i as i64 + 1000);
    }

    let method = service.lookup("Add").unwrap();
    assert_eq!(method.num_calls(), CALLERS as u64);
    assert_eq!(service.lookup("Divide").unwrap().num_calls(), 0);
}

#[test]
fn test_msgpack_round_trip_over_tcp() {
    let (client, server) = tcp_pair();
    let mut writer = MsgPackCodec::new(client);
    let mut reader = MsgPackCodec::new(server);

    let header = Header::new("Foo.Bar", 7);
    writer.write(&header, &Pair { x: 1, y: 2 }).unwrap();

    let mut read_header = Header::default();
    reader.read_header(&mut read_header).unwrap();
    let mut body = Pair::default();
    reader.read_body(&mut body).unwrap();

    assert_eq!(read_header, header);
    assert_eq!(body, Pair { x: 1, y: 2 });
}

#[cfg(unix)]
#[test]
fn test_json_round_trip_over_unix_socket() {
    let (a, b) = std::os::unix::net::UnixStream::pair().unwrap();
    let mut writer = JsonCodec::new(a);
    let mut reader = JsonCodec::new(b);

    let header = Header::new("Foo.Bar", 7);
    writer.write(&header, &Pair { x: 1, y: 2 }).unwrap();

    let mut read_header = Header::default();
    reader.read_header(&mut read_header).unwrap();
    let mut body = Pair::default();
    reader.read_body(&mut body).unwrap();

    assert_eq!(read_header, header);
    assert_eq!(body, Pair { x: 1, y: 2 });
}

#[test]
fn test_write_after_close_fails() {
    let (client, _server) = tcp_pair();
    let mut codec = MsgPackCodec::new(client);

    codec.write(&Header::new("Arith.Add", 1), &Pair::default()).unwrap();
    codec.close().unwrap();

    let err = codec
        .write(&Header::new("Arith.Add", 2), &Pair::default())
        .unwrap_err();
    assert!(matches!(err, RpcwireError::ConnectionClosed));
}

#[test]
fn test_dispatch_loop_end_to_end() {
    for kind in CodecKind::ALL {
        let (client, server) = tcp_pair();
        let service = arith();

        let handle = thread::spawn(move || {
            serve(&service, kind.new_codec(server, &CodecConfig::default()));
        });

        let mut codec = kind.new_codec(client, &CodecConfig::default());
        let mut header = Header::default();

        // Success
        codec
            .write(&Header::new("Arith.Add", 1), &Pair { x: 2, y: 40 })
            .unwrap();
        codec.read_header(&mut header).unwrap();
        let mut sum = 0i64;
        codec.read_body(&mut sum).unwrap();
        assert_eq!((header.seq, header.is_error(), sum), (1, false, 42), "{}", kind);

        // Method error travels in the header
        codec
            .write(&Header::new("Arith.Divide", 2), &Pair { x: 1, y: 0 })
            .unwrap();
        codec.read_header(&mut header).unwrap();
        codec.skip_body().unwrap();
        assert_eq!(header.seq, 2);
        assert_eq!(header.error, "divide by zero");

        // Unknown method, body skipped server side, stream stays in step
        codec
            .write(&Header::new("Arith.Pow", 3), &Pair { x: 2, y: 8 })
            .unwrap();
        codec.read_header(&mut header).unwrap();
        codec.skip_body().unwrap();
        assert_eq!(header.error, "can't find method Arith.Pow");

        // Containers survive the trip
        codec
            .write(
                &Header::new("Arith.Histogram", 4),
                &vec!["a".to_string(), "b".to_string(), "a".to_string()],
            )
            .unwrap();
        codec.read_header(&mut header).unwrap();
        let mut counts: HashMap<String, u32> = HashMap::new();
        codec.read_body(&mut counts).unwrap();
        assert_eq!(header.seq, 4);
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 1);

        codec.close().unwrap();
        handle.join().unwrap();
    }
}
