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

//! A logging handler that forwards application log records to a [`syslog`] collector.
//!
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//!
//! # Introduction
//!
//! Most logging pipelines end at a file or a console; in fleet deployments they end at a syslog
//! collector instead, because that is where every other daemon on the host already sends its
//! story. This crate is the adapter for that last hop: it accepts log records (a level, a
//! logger name, a message, a timestamp), gates them against a minimum level, renders them to
//! text, translates the pipeline's level onto a syslog severity, and sends the result over a
//! transport chosen once at startup.
//!
//! Four transports are supported: UDP datagrams, stream-oriented TCP, datagrams to a Unix domain
//! socket at a filesystem path, and the local `syslog(3)` call. The socket transports frame
//! messages RFC [3164]-style (PRI, hostname, tag, message) and cap them at 8 KiB; the local call
//! leaves framing to libc. Which transport, which host and port or which socket path, and the
//! minimum level all come from a [`ConfigSource`], any key/value property store the host
//! application cares to adapt. Everything else (facility `local0`, the `TestLog` tag, the
//! length cap) is fixed policy.
//!
//! [3164]: https://datatracker.ietf.org/doc/html/rfc3164
//! [`ConfigSource`]: crate::config::ConfigSource
//!
//! Delivery is deliberately best-effort. A logging adapter sits on its caller's control flow, so
//! [`publish`] never raises: transport failures are reported through [`tracing`] on this crate's
//! own targets (which the bridge [`layer`] refuses to forward, keeping diagnostics out of the
//! syslog path) and the record is dropped. Configuration mistakes, on the other hand, such as
//! an unrecognized protocol name or a port that is not a number, fail fast at initialization.
//!
//! [`publish`]: crate::handler::SyslogForwarder::publish
//!
//! # Usage
//!
//! ```no_run
//! use std::collections::HashMap;
//! use syslog_forwarder::handler::SyslogForwarder;
//! use syslog_forwarder::record::{Level, LogRecord};
//!
//! let mut props = HashMap::new();
//! props.insert("app.syslog.protocol".to_string(), "udp".to_string());
//! props.insert("app.syslog.host".to_string(), "logs.internal".to_string());
//! props.insert("app.syslog.port".to_string(), "5140".to_string());
//!
//! let forwarder = SyslogForwarder::from_source("app.syslog", &props).unwrap();
//! forwarder.publish(&LogRecord::new(Level::Warning, "db", "disk almost full"));
//! forwarder.flush();
//! forwarder.close();
//! ```
//!
//! With no properties set at all, the forwarder speaks datagrams to the platform syslog socket
//! (`/dev/log`), which is what a stock collector listens on.
//!
//! Applications instrumented with [`tracing`] can skip the record plumbing entirely and stack
//! the bridge layer onto their subscriber; see [`layer`].
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html

pub mod config;
pub mod error;
pub mod facility;
pub mod formatter;
pub mod handler;
pub mod layer;
pub mod record;
pub mod rfc3164;
pub mod transport;
