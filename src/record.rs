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

//! Log records and the level set the log pipeline emits.
//!
//! [`Level`] is the producer-side vocabulary: the nine levels an application log record may carry,
//! from [`Level::All`] up to [`Level::Off`]. It is distinct from [`Severity`], the syslog-side
//! vocabulary; [`Level::severity`] is the bridge between the two. [`LogRecord`] is what the
//! pipeline hands to [`SyslogForwarder::publish`]; the forwarder only reads it.
//!
//! [`SyslogForwarder::publish`]: crate::handler::SyslogForwarder::publish

use crate::{
    error::{Error, Result},
    facility::Severity,
};

use backtrace::Backtrace;
use chrono::{DateTime, Utc};

/// The levels recognized by the log pipeline, declared in ascending order of importance so that
/// the derived ordering is the threshold ordering: a record passes a minimum level `min` exactly
/// when `record.level >= min`. [`Level::All`] as a minimum admits everything; [`Level::Off`]
/// admits nothing a normal producer emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    All,
    Finest,
    Finer,
    Fine,
    Config,
    Info,
    Warning,
    Severe,
    Off,
}

impl Level {
    /// Map this level onto a syslog [`Severity`].
    ///
    /// Total and deterministic: the three fine-grained levels collapse to DEBUG, OFF (the highest
    /// value a record can carry) maps to EMERGENCY, and any level outside the named rows falls
    /// through to INFO.
    pub fn severity(self) -> Severity {
        match self {
            Level::Off => Severity::Emergency,
            Level::Severe => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Config => Severity::Notice,
            Level::Fine | Level::Finer | Level::Finest => Severity::Debug,
            Level::All => Severity::Info,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Level::All => "ALL",
                Level::Finest => "FINEST",
                Level::Finer => "FINER",
                Level::Fine => "FINE",
                Level::Config => "CONFIG",
                Level::Info => "INFO",
                Level::Warning => "WARNING",
                Level::Severe => "SEVERE",
                Level::Off => "OFF",
            }
        )
    }
}

impl std::str::FromStr for Level {
    type Err = Error;
    /// Parse a level name from the configuration source, case-insensitively. "error" is accepted
    /// as an alias for "severe".
    fn from_str(s: &str) -> Result<Level> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Level::All),
            "FINEST" => Ok(Level::Finest),
            "FINER" => Ok(Level::Finer),
            "FINE" => Ok(Level::Fine),
            "CONFIG" => Ok(Level::Config),
            "INFO" => Ok(Level::Info),
            "WARNING" => Ok(Level::Warning),
            "SEVERE" | "ERROR" => Ok(Level::Severe),
            "OFF" => Ok(Level::Off),
            _ => Err(Error::BadLevel {
                name: s.to_string(),
                back: Backtrace::new(),
            }),
        }
    }
}

/// A single log record as produced by the pipeline.
///
/// The forwarder never mutates one; it reads the level (for the gate and the severity mapping)
/// and hands the whole record to the [`RecordFormatter`] for rendering.
///
/// [`RecordFormatter`]: crate::formatter::RecordFormatter
#[derive(Clone, Debug)]
pub struct LogRecord {
    pub level: Level,
    /// Name of the logger that produced this record.
    pub logger: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Build a record stamped with the current time.
    pub fn new<L, M>(level: Level, logger: L, message: M) -> LogRecord
    where
        L: Into<String>,
        M: Into<String>,
    {
        LogRecord {
            level,
            logger: logger.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> LogRecord {
        self.timestamp = timestamp;
        self
    }
}
