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

//! The forwarder itself.
//!
//! [`SyslogForwarder`] accepts [`LogRecord`]s from whatever thread emits them, consults the
//! loggability gate, renders the record through its [`RecordFormatter`], maps the record level
//! onto a syslog severity, and sends the result over the connection opened at construction.
//!
//! Delivery is best-effort by contract: a transport failure during [`publish`] is reported on
//! this crate's own [`tracing`] targets and otherwise swallowed, because a logging adapter that
//! raises out of the logging path takes its caller down with it. Configuration and connection
//! problems, by contrast, fail fast in [`open`].
//!
//! [`publish`]: SyslogForwarder::publish
//! [`open`]: SyslogForwarder::open
//!
//! # Examples
//!
//! ```no_run
//! use std::collections::HashMap;
//! use syslog_forwarder::config::ForwarderConfig;
//! use syslog_forwarder::handler::SyslogForwarder;
//! use syslog_forwarder::record::{Level, LogRecord};
//!
//! let mut props = HashMap::new();
//! props.insert("app.syslog.protocol".to_string(), "udp".to_string());
//! props.insert("app.syslog.host".to_string(), "127.0.0.1".to_string());
//! props.insert("app.syslog.port".to_string(), "5140".to_string());
//!
//! let config = ForwarderConfig::from_source("app.syslog", &props).unwrap();
//! let forwarder = SyslogForwarder::open(&config).unwrap();
//! forwarder.publish(&LogRecord::new(Level::Severe, "db", "disk full"));
//! forwarder.close();
//! ```

use crate::{
    config::ForwarderConfig,
    error::Result,
    formatter::{RecordFormatter, SimpleFormatter},
    record::{Level, LogRecord},
    transport::{open_transport, SyslogConnection},
};

use tracing::error;

use std::sync::{Mutex, MutexGuard};

/// Decides whether a record is emitted at all. The forwarder consults it and otherwise stays out
/// of the decision.
pub type LoggabilityGate = Box<dyn Fn(&LogRecord, Level) -> bool + Send + Sync>;

/// The default gate: a record passes when its level is at or above the configured minimum.
fn level_gate(record: &LogRecord, min_level: Level) -> bool {
    record.level >= min_level
}

/// A handler that forwards log records to a syslog collector.
///
/// One forwarder owns at most one live connection. `publish`, `flush` and `close` may be called
/// from any thread; they serialize on the connection guard. `close` is terminal: a closed
/// forwarder drops every subsequent record silently, and closing again is a no-op.
pub struct SyslogForwarder<F: RecordFormatter = SimpleFormatter> {
    min_level: Level,
    formatter: F,
    gate: LoggabilityGate,
    connection: Mutex<Option<SyslogConnection>>,
}

impl SyslogForwarder<SimpleFormatter> {
    /// Open a forwarder over the transport `config` describes, with the default line formatter.
    pub fn open(config: &ForwarderConfig) -> Result<SyslogForwarder> {
        SyslogForwarder::with_formatter(config, SimpleFormatter)
    }

    /// Read configuration from `source` under `prefix` and open a forwarder for it.
    pub fn from_source<S>(prefix: &str, source: &S) -> Result<SyslogForwarder>
    where
        S: crate::config::ConfigSource + ?Sized,
    {
        SyslogForwarder::open(&ForwarderConfig::from_source(prefix, source)?)
    }
}

impl<F: RecordFormatter> SyslogForwarder<F> {
    /// Open a forwarder over the transport `config` describes, rendering records with
    /// `formatter`.
    pub fn with_formatter(config: &ForwarderConfig, formatter: F) -> Result<SyslogForwarder<F>> {
        let connection = open_transport(config)?;
        Ok(SyslogForwarder {
            min_level: config.min_level,
            formatter,
            gate: Box::new(level_gate),
            connection: Mutex::new(Some(connection)),
        })
    }

    /// Replace the loggability gate.
    pub fn with_gate<G>(mut self, gate: G) -> SyslogForwarder<F>
    where
        G: Fn(&LogRecord, Level) -> bool + Send + Sync + 'static,
    {
        self.gate = Box::new(gate);
        self
    }

    // A poisoned guard means some caller's thread panicked mid-send. The connection state
    // itself is still sound (at worst a partial write went out), so recover the guard rather
    // than spreading the panic to every thread that logs.
    fn lock(&self) -> MutexGuard<'_, Option<SyslogConnection>> {
        match self.connection.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Forward one record.
    ///
    /// Returns without side effect when the gate rejects the record or the forwarder is closed.
    /// Never fails: a transport error is reported via `tracing` on this crate's target and the
    /// record is dropped.
    pub fn publish(&self, record: &LogRecord) {
        if !(self.gate)(record, self.min_level) {
            return;
        }
        let severity = record.level.severity();
        let text = self.formatter.format(record);
        if let Some(connection) = self.lock().as_ref() {
            if let Err(err) = connection.send(severity, &text) {
                error!("failed to forward a log record to syslog: {}", err);
            }
        }
    }

    /// Push any buffered data toward the collector; no-op once closed.
    pub fn flush(&self) {
        if let Some(connection) = self.lock().as_ref() {
            if let Err(err) = connection.flush() {
                error!("failed to flush the syslog connection: {}", err);
            }
        }
    }

    /// Shut the connection down and release it. Idempotent; safe under concurrent `flush` and
    /// `publish` calls, which observe either the open connection or none at all.
    pub fn close(&self) {
        if let Some(connection) = self.lock().take() {
            if let Err(err) = connection.shutdown() {
                error!("failed to shut the syslog connection down: {}", err);
            }
        }
    }
}

impl<F: RecordFormatter> Drop for SyslogForwarder<F> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ConfigSource;

    use std::collections::HashMap;
    use std::net::UdpSocket;
    use std::time::Duration;

    fn udp_config(port: u16, level: &str) -> ForwarderConfig {
        let mut props = HashMap::new();
        props.insert("test.protocol".to_string(), "udp".to_string());
        props.insert("test.host".to_string(), "127.0.0.1".to_string());
        props.insert("test.port".to_string(), port.to_string());
        props.insert("test.level".to_string(), level.to_string());
        ForwarderConfig::from_source("test", &props).unwrap()
    }

    fn udp_listener() -> (UdpSocket, u16) {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_millis(250)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    fn recv(listener: &UdpSocket) -> Option<String> {
        let mut buf = [0u8; 16 * 1024];
        match listener.recv(&mut buf) {
            Ok(n) => Some(String::from_utf8_lossy(&buf[..n]).into_owned()),
            Err(_) => None,
        }
    }

    #[test]
    fn test_severe_record_over_udp() {
        let (listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "info")).unwrap();

        forwarder.publish(&LogRecord::new(Level::Severe, "db", "disk full"));

        let datagram = recv(&listener).unwrap();
        assert!(datagram.starts_with("<131>"), "got {:?}", datagram);
        assert!(datagram.contains("TestLog: "));
        assert!(datagram.contains("disk full"));
        assert!(datagram.len() <= ForwarderConfig::MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_oversized_record_is_truncated() {
        let (listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "info")).unwrap();

        let message = "x".repeat(3 * ForwarderConfig::MAX_MESSAGE_LENGTH);
        forwarder.publish(&LogRecord::new(Level::Severe, "db", message));

        let datagram = recv(&listener).unwrap();
        assert_eq!(datagram.len(), ForwarderConfig::MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_below_minimum_level_is_dropped() {
        let (listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "warning")).unwrap();

        forwarder.publish(&LogRecord::new(Level::Fine, "db", "debug trace"));
        assert_eq!(recv(&listener), None);

        forwarder.publish(&LogRecord::new(Level::Warning, "db", "look out"));
        assert!(recv(&listener).unwrap().starts_with("<132>"));
    }

    #[test]
    fn test_publish_after_close_is_a_noop() {
        let (listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "info")).unwrap();

        forwarder.close();
        forwarder.publish(&LogRecord::new(Level::Severe, "db", "disk full"));
        assert_eq!(recv(&listener), None);
    }

    #[test]
    fn test_close_twice_and_flush_after_close() {
        let (_listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "info")).unwrap();

        forwarder.close();
        forwarder.close();
        forwarder.flush();
    }

    #[test]
    fn test_custom_gate() {
        let (listener, port) = udp_listener();
        let forwarder = SyslogForwarder::open(&udp_config(port, "all"))
            .unwrap()
            .with_gate(|record, _min| record.logger != "noisy");

        forwarder.publish(&LogRecord::new(Level::Severe, "noisy", "nope"));
        assert_eq!(recv(&listener), None);

        forwarder.publish(&LogRecord::new(Level::Finest, "quiet", "fine by me"));
        assert!(recv(&listener).unwrap().contains("fine by me"));
    }

    #[cfg(unix)]
    #[test]
    fn test_fine_record_over_unix_socket() {
        use std::os::unix::net::UnixDatagram;

        let path = std::env::temp_dir().join(format!(
            "syslog-forwarder-handler-{}.sock",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let listener = UnixDatagram::bind(&path).unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let mut props = HashMap::new();
        props.insert("test.protocol".to_string(), "unix_socket".to_string());
        props.insert(
            "test.path".to_string(),
            path.to_string_lossy().into_owned(),
        );
        props.insert("test.level".to_string(), "all".to_string());
        let forwarder = SyslogForwarder::from_source("test", &props).unwrap();

        forwarder.publish(&LogRecord::new(Level::Fine, "tracer", "debug trace"));

        let mut buf = [0u8; 2048];
        let n = listener.recv(&mut buf).unwrap();
        let datagram = String::from_utf8_lossy(&buf[..n]).into_owned();
        assert!(datagram.starts_with("<135>"), "got {:?}", datagram);
        assert!(datagram.contains("debug trace"));

        forwarder.close();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_from_source_rejects_bad_protocol() {
        let mut props = HashMap::new();
        props.insert("test.protocol".to_string(), "bogus".to_string());
        assert!(SyslogForwarder::from_source("test", &props).is_err());
        // the trait-object form works too
        let source: &dyn ConfigSource = &props;
        assert!(ForwarderConfig::from_source("test", source).is_err());
    }
}
