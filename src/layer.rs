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

//! A [`tracing-subscriber`] [`Layer`] that feeds a [`SyslogForwarder`].
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! The forwarder consumes [`LogRecord`]s; this bridge produces them from [`tracing`] [`Event`]s
//! so that an application already instrumented with `tracing` can point its log stream at a
//! syslog collector by stacking one more layer:
//!
//! [`Event`]: https://docs.rs/tracing/latest/tracing/struct.Event.html
//!
//! ```no_run
//! use std::collections::HashMap;
//! use syslog_forwarder::{handler::SyslogForwarder, layer::SyslogLayer};
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let mut props = HashMap::new();
//! props.insert("app.syslog.protocol".to_string(), "udp".to_string());
//! props.insert("app.syslog.port".to_string(), "5140".to_string());
//! let forwarder = SyslogForwarder::from_source("app.syslog", &props).unwrap();
//!
//! let subscriber = Registry::default().with(SyslogLayer::from(forwarder));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! tracing::info!("Hello, world!");
//! ```
//!
//! Events whose target lies inside this crate are never forwarded: the forwarder reports its own
//! transport failures through `tracing`, and that diagnostic channel must stay out of the syslog
//! path or a dead collector would feed itself forever.

use crate::{
    formatter::{RecordFormatter, SimpleFormatter},
    handler::SyslogForwarder,
    record::{Level, LogRecord},
};

use tracing::Event;
use tracing_subscriber::layer::Context;

fn record_level(level: &tracing_core::Level) -> Level {
    match level {
        &tracing_core::Level::ERROR => Level::Severe,
        &tracing_core::Level::WARN => Level::Warning,
        &tracing_core::Level::INFO => Level::Info,
        &tracing_core::Level::DEBUG => Level::Fine,
        &tracing_core::Level::TRACE => Level::Finest,
    }
}

struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            // The tracing macros pre-format the message field into a `std::fmt::Arguments`,
            // which prints through `Debug` without enclosing quotes.
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Wraps a [`SyslogForwarder`] as a [`tracing_subscriber::layer::Layer`].
///
/// Events with no message field are dropped; span enter/exit produce no records.
pub struct SyslogLayer<F: RecordFormatter = SimpleFormatter> {
    forwarder: SyslogForwarder<F>,
}

impl<F: RecordFormatter> From<SyslogForwarder<F>> for SyslogLayer<F> {
    fn from(forwarder: SyslogForwarder<F>) -> Self {
        SyslogLayer { forwarder }
    }
}

impl<F: RecordFormatter> SyslogLayer<F> {
    /// The wrapped forwarder, e.g. to flush or close it through the layer.
    pub fn forwarder(&self) -> &SyslogForwarder<F> {
        &self.forwarder
    }
}

impl<S, F> tracing_subscriber::layer::Layer<S> for SyslogLayer<F>
where
    S: tracing_core::subscriber::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    F: RecordFormatter + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Our own diagnostics must not loop back through the forwarder.
        if metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }
        let mut visitor = MessageVisitor { message: None };
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.forwarder.publish(&LogRecord::new(
                record_level(metadata.level()),
                metadata.target(),
                message,
            ));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ForwarderConfig;

    use tracing_subscriber::{layer::SubscriberExt, registry::Registry};

    use std::collections::HashMap;
    use std::net::UdpSocket;
    use std::time::Duration;

    #[test]
    fn test_level_mapping() {
        assert_eq!(record_level(&tracing_core::Level::ERROR), Level::Severe);
        assert_eq!(record_level(&tracing_core::Level::WARN), Level::Warning);
        assert_eq!(record_level(&tracing_core::Level::INFO), Level::Info);
        assert_eq!(record_level(&tracing_core::Level::DEBUG), Level::Fine);
        assert_eq!(record_level(&tracing_core::Level::TRACE), Level::Finest);
    }

    #[test]
    fn test_events_reach_the_collector() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_millis(250)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut props = HashMap::new();
        props.insert("test.protocol".to_string(), "udp".to_string());
        props.insert("test.host".to_string(), "127.0.0.1".to_string());
        props.insert("test.port".to_string(), port.to_string());
        let config = ForwarderConfig::from_source("test", &props).unwrap();

        let subscriber =
            Registry::default().with(SyslogLayer::from(SyslogForwarder::open(&config).unwrap()));
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::warn!("hello from the layer");

        let mut buf = [0u8; 2048];
        let n = listener.recv(&mut buf).unwrap();
        let datagram = String::from_utf8_lossy(&buf[..n]).into_owned();
        assert!(datagram.starts_with("<132>"), "got {:?}", datagram);
        assert!(datagram.contains("hello from the layer"));

        // An event on this crate's own target is diagnostic, not payload.
        tracing::warn!(target: "syslog_forwarder::handler", "not forwarded");
        assert!(listener.recv(&mut buf).is_err());

        // Below the configured minimum (INFO by default): dropped.
        tracing::debug!("not forwarded either");
        assert!(listener.recv(&mut buf).is_err());
    }
}
