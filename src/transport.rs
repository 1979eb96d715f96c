// Copyright (C) 2025 syslog-forwarder developers
//
// This file is part of syslog-forwarder.
//
// syslog-forwarder is free software: you can redistribute it and/or modify it under the terms of
// the GNU General Public License as published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// syslog-forwarder is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with syslog-forwarder.
// If not, see <http://www.gnu.org/licenses/>.

//! The syslog transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, the four
//! implementations ([`UdpTransport`], [`TcpTransport`], [`UnixSocket`], [`UnixSyslog`]), and
//! [`open_transport`], which maps a [`ForwarderConfig`] onto a live connection.
//!
//! The trait's seam sits at (severity, text) rather than raw bytes: the socket transports own an
//! [`Rfc3164Frame`] and frame each message themselves, while the local-syslog transport hands
//! the priority to `syslog(3)` and lets libc do the framing. Callers never assemble wire bytes.
//!
//! # Examples
//!
//! To send messages over UDP to a daemon listening on a non-standard port:
//!
//! ```no_run
//! use syslog_forwarder::facility::Severity;
//! use syslog_forwarder::transport::{wire_frame, Transport, UdpTransport};
//!
//! let transpo = UdpTransport::new("some-host.domain.io:5514", wire_frame().unwrap()).unwrap();
//! transpo.send(Severity::Warning, "look out").unwrap();
//! ```

use crate::{
    config::{ForwarderConfig, TransportProtocol, DEFAULT_SOCKET_PATH},
    error::{Error, Result},
    facility::{Facility, Severity},
    rfc3164::{Hostname, Rfc3164Frame, Tag},
};

use backtrace::Backtrace;
use tracing::debug;

use std::io::Write;
use std::net::{TcpStream, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
use std::path::Path;

/// Operations all transport layers must support.
///
/// `send` takes the severity and the formatted record text; delivery is best-effort and failures
/// surface as [`Error::Transport`]. `flush` is a no-op wherever the underlying transport has no
/// buffering. `shutdown` releases the connection; the handle is unusable afterwards and callers
/// are expected to drop it (see [`SyslogForwarder::close`]).
///
/// [`SyslogForwarder::close`]: crate::handler::SyslogForwarder::close
pub trait Transport {
    /// Send one message at the given severity; returns the number of bytes handed to the
    /// transport.
    fn send(&self, severity: Severity, msg: &str) -> Result<usize>;
    /// Push any buffered data toward the collector.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
    /// Tear the connection down.
    fn shutdown(&self) -> Result<()>;
}

/// The live connection a [`SyslogForwarder`](crate::handler::SyslogForwarder) writes to.
pub type SyslogConnection = Box<dyn Transport + Send + Sync>;

fn transport_err<E>(err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::Transport {
        source: Box::new(err),
        back: Backtrace::new(),
    }
}

/// Build the frame every socket transport stamps on its messages: the forwarder's fixed policy
/// plus the discovered local hostname.
pub fn wire_frame() -> Result<Rfc3164Frame> {
    Ok(
        Rfc3164Frame::new(ForwarderConfig::FACILITY, Hostname::try_default()?, Tag::try_from(ForwarderConfig::IDENT)?)
            .tag_in_message(ForwarderConfig::INCLUDE_IDENT)
            .local_timestamp(ForwarderConfig::SEND_LOCAL_TIMESTAMP)
            .max_length(ForwarderConfig::MAX_MESSAGE_LENGTH),
    )
}

/// Establish the transport described by `config`.
///
/// This is the one place protocol selection happens; a connection that cannot be established is
/// an error here, at startup, never a publish-time surprise.
pub fn open_transport(config: &ForwarderConfig) -> Result<SyslogConnection> {
    match config.protocol {
        TransportProtocol::Udp => {
            debug!(
                host = %config.host,
                port = config.port,
                "opening UDP syslog transport"
            );
            Ok(Box::new(UdpTransport::new(
                (config.host.as_str(), config.port),
                wire_frame()?,
            )?))
        }
        TransportProtocol::Tcp => {
            debug!(
                host = %config.host,
                port = config.port,
                "opening TCP syslog transport"
            );
            Ok(Box::new(TcpTransport::new(
                (config.host.as_str(), config.port),
                wire_frame()?,
            )?))
        }
        #[cfg(unix)]
        TransportProtocol::UnixSocket => {
            let path = config
                .socket_path
                .clone()
                .unwrap_or_else(|| DEFAULT_SOCKET_PATH.into());
            debug!(path = %path.display(), "opening unix datagram syslog transport");
            Ok(Box::new(UnixSocket::new(path, wire_frame()?)?))
        }
        #[cfg(unix)]
        TransportProtocol::UnixSyslog => {
            debug!(ident = ForwarderConfig::IDENT, "opening local syslog transport");
            UnixSyslog::new(ForwarderConfig::IDENT, ForwarderConfig::FACILITY)
                .map(|t| Box::new(t) as SyslogConnection)
        }
        #[cfg(not(unix))]
        TransportProtocol::UnixSocket | TransportProtocol::UnixSyslog => Err(transport_err(
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "unix transports are not available on this platform",
            ),
        )),
    }
}

/// Sending syslog messages via UDP datagrams: fire-and-forget, no delivery confirmation.
pub struct UdpTransport {
    socket: UdpSocket,
    frame: Rfc3164Frame,
}

impl UdpTransport {
    /// Construct a [`Transport`] implementation via UDP at `addr`.
    pub fn new<A: std::net::ToSocketAddrs>(addr: A, frame: Rfc3164Frame) -> Result<UdpTransport> {
        // Bind to any available port...
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(transport_err)?;
        // and connect to the syslog daemon at `addr`:
        socket.connect(addr).map_err(transport_err)?;
        Ok(UdpTransport { socket, frame })
    }
}

impl Transport for UdpTransport {
    fn send(&self, severity: Severity, msg: &str) -> Result<usize> {
        self.socket
            .send(&self.frame.render(severity, msg))
            .map_err(transport_err)
    }

    fn shutdown(&self) -> Result<()> {
        // Nothing to tear down for a connectionless socket.
        Ok(())
    }
}

/// Sending syslog messages via a TCP stream, one newline-delimited message per send.
pub struct TcpTransport {
    socket: TcpStream,
    frame: Rfc3164Frame,
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("socket", &self.socket)
            .finish_non_exhaustive()
    }
}

impl TcpTransport {
    /// Construct a [`Transport`] implementation via TCP at `addr`.
    pub fn new<A: std::net::ToSocketAddrs>(addr: A, frame: Rfc3164Frame) -> Result<TcpTransport> {
        Ok(TcpTransport {
            socket: TcpStream::connect(addr).map_err(transport_err)?,
            frame,
        })
    }
}

impl Transport for TcpTransport {
    fn send(&self, severity: Severity, msg: &str) -> Result<usize> {
        let buf = self.frame.render(severity, msg);
        // `Write` wants `&mut self`; it is implemented for `&TcpStream` as well, so take a
        // reference as the writer.
        let mut writer: &TcpStream = &self.socket;
        writer.write_all(&buf).map_err(transport_err)?;
        writer.write_all(b"\n").map_err(transport_err)?;
        Ok(buf.len() + 1)
    }

    fn flush(&self) -> Result<()> {
        let mut writer: &TcpStream = &self.socket;
        writer.flush().map_err(transport_err)
    }

    fn shutdown(&self) -> Result<()> {
        self.socket
            .shutdown(std::net::Shutdown::Both)
            .map_err(transport_err)
    }
}

/// Sending syslog messages via datagrams to a Unix socket at a filesystem path.
#[cfg(unix)]
pub struct UnixSocket {
    socket: UnixDatagram,
    frame: Rfc3164Frame,
}

#[cfg(unix)]
impl UnixSocket {
    /// Construct a [`Transport`] implementation via Unix datagram sockets at `path`.
    pub fn new<P: AsRef<Path>>(path: P, frame: Rfc3164Frame) -> Result<UnixSocket> {
        let socket = UnixDatagram::unbound().map_err(transport_err)?;
        socket.connect(path).map_err(transport_err)?;
        Ok(UnixSocket { socket, frame })
    }
}

#[cfg(unix)]
impl Transport for UnixSocket {
    fn send(&self, severity: Severity, msg: &str) -> Result<usize> {
        self.socket
            .send(&self.frame.render(severity, msg))
            .map_err(transport_err)
    }

    fn shutdown(&self) -> Result<()> {
        self.socket
            .shutdown(std::net::Shutdown::Both)
            .map_err(transport_err)
    }
}

/// Delivery via the local `syslog(3)` call.
///
/// `openlog(3)` keeps the ident pointer, so the [`CString`](std::ffi::CString) must outlive the
/// connection; it lives in the struct for exactly that reason.
#[cfg(unix)]
pub struct UnixSyslog {
    _ident: std::ffi::CString,
    facility: Facility,
}

#[cfg(unix)]
impl UnixSyslog {
    pub fn new(ident: &str, facility: Facility) -> Result<UnixSyslog> {
        let ident = std::ffi::CString::new(ident).map_err(transport_err)?;
        unsafe { libc::openlog(ident.as_ptr(), 0, facility as u8 as libc::c_int) };
        Ok(UnixSyslog {
            _ident: ident,
            facility,
        })
    }
}

#[cfg(unix)]
impl Transport for UnixSyslog {
    fn send(&self, severity: Severity, msg: &str) -> Result<usize> {
        // syslog(3) cannot carry interior NULs; space them out rather than drop the record.
        let msg = std::ffi::CString::new(msg.replace('\0', " ")).map_err(transport_err)?;
        let priority = self.facility.priority(severity) as libc::c_int;
        unsafe { libc::syslog(priority, b"%s\0".as_ptr() as *const libc::c_char, msg.as_ptr()) };
        Ok(msg.as_bytes().len())
    }

    fn shutdown(&self) -> Result<()> {
        unsafe { libc::closelog() };
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::time::Duration;

    fn test_frame() -> Rfc3164Frame {
        Rfc3164Frame::new(
            Facility::Local0,
            Hostname::try_from(String::from("testhost")).unwrap(),
            Tag::try_from("TestLog").unwrap(),
        )
    }

    #[test]
    fn test_udp_roundtrip() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let transport = UdpTransport::new(addr, test_frame()).unwrap();
        transport.send(Severity::Error, "disk full").unwrap();

        let mut buf = [0u8; 2048];
        let n = listener.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<131>testhost TestLog: disk full");
        transport.shutdown().unwrap();
    }

    #[test]
    fn test_tcp_roundtrip() {
        use std::io::BufRead;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut line = String::new();
            std::io::BufReader::new(stream).read_line(&mut line).unwrap();
            line
        });

        let transport = TcpTransport::new(addr, test_frame()).unwrap();
        transport.send(Severity::Warning, "look out").unwrap();
        transport.flush().unwrap();
        transport.shutdown().unwrap();

        assert_eq!(handle.join().unwrap(), "<132>testhost TestLog: look out\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_datagram_roundtrip() {
        let path = std::env::temp_dir().join(format!("syslog-forwarder-transport-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let listener = UnixDatagram::bind(&path).unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let transport = UnixSocket::new(&path, test_frame()).unwrap();
        transport.send(Severity::Debug, "debug trace").unwrap();

        let mut buf = [0u8; 2048];
        let n = listener.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<135>testhost TestLog: debug trace");

        transport.shutdown().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_connect_failure_is_a_transport_error() {
        // No listener there.
        let err = TcpTransport::new("127.0.0.1:1", test_frame()).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(!err.is_config());
    }
}
