//! Duplex byte streams a codec can own.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A bidirectional byte stream that can be shut down.
///
/// A codec owns exactly one connection for its whole lifetime.
pub trait Connection: Read + Write + Send {
    /// Release the stream in both directions.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

#[cfg(unix)]
impl Connection for std::os::unix::net::UnixStream {
    fn shutdown(&mut self) -> io::Result<()> {
        std::os::unix::net::UnixStream::shutdown(self, Shutdown::Both)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}
