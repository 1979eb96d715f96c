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

//! Forwarder configuration.
//!
//! Configuration is read once, at startup, from a [`ConfigSource`]: a key/value string lookup
//! under a namespace prefix ("myapp.syslog.protocol", "myapp.syslog.port", ...). Lookups
//! distinguish absent from present so that defaults can be substituted; present-but-malformed
//! values fail fast with a configuration error rather than surfacing at publish time.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use syslog_forwarder::config::{ForwarderConfig, TransportProtocol};
//!
//! let mut props = HashMap::new();
//! props.insert("app.syslog.protocol".to_string(), "udp".to_string());
//! props.insert("app.syslog.port".to_string(), "5140".to_string());
//!
//! let config = ForwarderConfig::from_source("app.syslog", &props).unwrap();
//! assert_eq!(config.protocol, TransportProtocol::Udp);
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 5140);
//! ```

use crate::{
    error::{Error, Result},
    facility::Facility,
    record::Level,
};

use backtrace::Backtrace;

use std::{collections::HashMap, path::PathBuf};

/// Where a connection falls back to when UNIX_SOCKET is selected with no path configured.
#[cfg(target_os = "macos")]
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/syslog";
/// Where a connection falls back to when UNIX_SOCKET is selected with no path configured.
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_SOCKET_PATH: &str = "/dev/log";

/// The transport protocols the forwarder supports. Chosen once at startup; an unrecognized name
/// is a configuration error, not a publish-time surprise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportProtocol {
    /// Datagrams to host:port, fire-and-forget.
    Udp,
    /// Stream-oriented, newline-delimited messages to host:port.
    Tcp,
    /// Datagrams to a local socket at a filesystem path.
    UnixSocket,
    /// The local `syslog(3)` call.
    UnixSyslog,
}

impl std::fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransportProtocol::Udp => "udp",
                TransportProtocol::Tcp => "tcp",
                TransportProtocol::UnixSocket => "unix_socket",
                TransportProtocol::UnixSyslog => "unix_syslog",
            }
        )
    }
}

impl std::str::FromStr for TransportProtocol {
    type Err = Error;
    fn from_str(s: &str) -> Result<TransportProtocol> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(TransportProtocol::Udp),
            "tcp" => Ok(TransportProtocol::Tcp),
            "unix_socket" => Ok(TransportProtocol::UnixSocket),
            "unix_syslog" => Ok(TransportProtocol::UnixSyslog),
            _ => Err(Error::BadProtocol {
                name: s.to_string(),
                back: Backtrace::new(),
            }),
        }
    }
}

/// Key/value string lookup backing [`ForwarderConfig::from_source`].
///
/// Implementations must return `None` for absent keys (so defaults apply) as opposed to an empty
/// string; whatever property store the host application uses (a parsed config file, framework
/// properties, the environment) adapts here.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// A [`ConfigSource`] over the process environment: "app.syslog.port" is looked up as
/// `APP_SYSLOG_PORT`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key.replace('.', "_").to_ascii_uppercase()).ok()
    }
}

/// Everything the forwarder needs to open its connection. Built once by
/// [`ForwarderConfig::from_source`]; immutable thereafter.
///
/// `host` and `port` are read for UDP, TCP and UNIX_SYSLOG (the last has no use for them but the
/// property store may carry them); `socket_path` only for UNIX_SOCKET.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub protocol: TransportProtocol,
    pub host: String,
    pub port: u16,
    pub socket_path: Option<PathBuf>,
    /// Records below this level are dropped by the default loggability gate.
    pub min_level: Level,
}

impl ForwarderConfig {
    /// Facility stamped on every message.
    pub const FACILITY: Facility = Facility::Local0;
    /// Upper bound, in bytes, on a framed message.
    pub const MAX_MESSAGE_LENGTH: usize = 8 * 1024;
    /// Tag identifying this application in syslog output.
    pub const IDENT: &'static str = "TestLog";
    /// Whether the tag is rendered into the message frame.
    pub const INCLUDE_IDENT: bool = true;
    /// Whether the frame carries a locally-generated timestamp.
    pub const SEND_LOCAL_TIMESTAMP: bool = false;

    /// Read a configuration from `source`, keys namespaced under `prefix`.
    ///
    /// Absent keys get defaults: UNIX_SOCKET transport, host "localhost", port 514, minimum level
    /// INFO. Fails with a configuration error if the protocol or level name is unrecognized or
    /// the port does not parse as an integer.
    pub fn from_source<S: ConfigSource + ?Sized>(
        prefix: &str,
        source: &S,
    ) -> Result<ForwarderConfig> {
        let lookup = |name: &str| source.get(&format!("{}.{}", prefix, name));

        let min_level = match lookup("level") {
            Some(name) => name.parse()?,
            None => Level::Info,
        };
        let protocol = match lookup("protocol") {
            Some(name) => name.parse()?,
            None => TransportProtocol::UnixSocket,
        };

        let mut config = ForwarderConfig {
            protocol,
            host: "localhost".to_string(),
            port: 514,
            socket_path: None,
            min_level,
        };
        match protocol {
            TransportProtocol::UnixSocket => {
                config.socket_path = lookup("path").map(PathBuf::from);
            }
            _ => {
                if let Some(host) = lookup("host") {
                    config.host = host;
                }
                if let Some(port) = lookup("port") {
                    config.port = parse_port(&format!("{}.port", prefix), &port)?;
                }
            }
        }
        Ok(config)
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value.parse().map_err(|_| Error::BadInteger {
        key: key.to_string(),
        value: value.to_string(),
        back: Backtrace::new(),
    })
}
