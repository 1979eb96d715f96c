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

//! Record formatting primitives.
//!
//! Turning a [`LogRecord`] into the MSG text of a syslog message is the forwarder's one
//! pluggable formatting seam; [`RecordFormatter`] defines it and [`SimpleFormatter`] is the
//! line-oriented default. Framing (PRI, hostname, tag) is not the formatter's business; that
//! lives with the transport side, in [`rfc3164`](crate::rfc3164).

use crate::record::LogRecord;

/// Render a record to the text that becomes the message body.
///
/// Implementations should produce a single line; syslog collectors treat newlines as message
/// boundaries on stream transports.
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

/// The default, human-readable line formatter:
///
/// ```text
/// Jun 23 16:10:55 db WARNING: disk almost full
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct SimpleFormatter;

impl RecordFormatter for SimpleFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "{} {} {}: {}",
            record.timestamp.format("%b %e %H:%M:%S"),
            record.logger,
            record.level,
            record.message
        )
    }
}
