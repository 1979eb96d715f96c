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

//! syslog facility & severity definitions.
//!
//! [`Facility`] and [`Severity`] carry the numeric values defined in `<syslog.h>`; facilities are
//! pre-shifted by three bits so that a PRI value is just the bitwise-or of the two (again
//! mirroring the `#define`s in the header). RFCs [3164] and [5424] agree on both sets, so one
//! pair of enumerations serves regardless of framing.
//!
//! [3164]: https://datatracker.ietf.org/doc/html/rfc3164
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424

type StdResult<T, E> = std::result::Result<T, E>;

/// syslog classification of the message source.
///
/// This forwarder pins its output to [`Facility::Local0`]; the full set is retained because the
/// local-syslog transport hands the facility to `openlog(3)`, which expects the `<syslog.h>`
/// values verbatim.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Facility {
    /// kernel messages
    Kern = 0 << 3,
    /// random user-level messages
    User = 1 << 3,
    /// mail system
    Mail = 2 << 3,
    /// system daemons
    Daemon = 3 << 3,
    /// security/authorization messages
    Auth = 4 << 3,
    /// messages generated internally by syslogd
    Syslog = 5 << 3,
    /// line printer subsystem
    Lpr = 6 << 3,
    /// network news subsystem
    News = 7 << 3,
    /// UUCP subsystem
    Uucp = 8 << 3,
    /// clock daemon
    Cron = 9 << 3,
    /// security/authorization messages (private)
    Authpriv = 10 << 3,
    /// ftp daemon
    Ftp = 11 << 3,
    /// reserved for local use
    Local0 = 16 << 3,
    /// reserved for local use
    Local1 = 17 << 3,
    /// reserved for local use
    Local2 = 18 << 3,
    /// reserved for local use
    Local3 = 19 << 3,
    /// reserved for local use
    Local4 = 20 << 3,
    /// reserved for local use
    Local5 = 21 << 3,
    /// reserved for local use
    Local6 = 22 << 3,
    /// reserved for local use
    Local7 = 23 << 3,
}

impl Facility {
    /// Compose the PRI value for a message sent at `severity` from this facility.
    pub const fn priority(self, severity: Severity) -> u8 {
        self as u8 | severity as u8
    }
}

impl std::default::Default for Facility {
    fn default() -> Self {
        Facility::User
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Facility::Kern => "kern",
                Facility::User => "user",
                Facility::Mail => "mail",
                Facility::Daemon => "daemon",
                Facility::Auth => "auth",
                Facility::Syslog => "syslog",
                Facility::Lpr => "lpr",
                Facility::News => "news",
                Facility::Uucp => "uucp",
                Facility::Cron => "cron",
                Facility::Authpriv => "authpriv",
                Facility::Ftp => "ftp",
                Facility::Local0 => "local0",
                Facility::Local1 => "local1",
                Facility::Local2 => "local2",
                Facility::Local3 => "local3",
                Facility::Local4 => "local4",
                Facility::Local5 => "local5",
                Facility::Local6 => "local6",
                Facility::Local7 => "local7",
            }
        )
    }
}

/// syslog priority level, EMERGENCY down to DEBUG, distinct from facility.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    /// system is unusable
    Emergency = 0,
    /// action must be taken immediately
    Alert = 1,
    /// critical conditions
    Critical = 2,
    /// error conditions
    Error = 3,
    /// warning conditions
    Warning = 4,
    /// normal, but significant condition
    Notice = 5,
    /// informational message
    Info = 6,
    /// debug-level message
    Debug = 7,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Severity::Emergency => "emerg",
                Severity::Alert => "alert",
                Severity::Critical => "crit",
                Severity::Error => "err",
                Severity::Warning => "warning",
                Severity::Notice => "notice",
                Severity::Info => "info",
                Severity::Debug => "debug",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Test basic PRI formatting
    #[test]
    fn test_pri() {
        assert_eq!(14, Facility::User.priority(Severity::Info));
        assert_eq!(131, Facility::Local0.priority(Severity::Error));
        assert_eq!(135, Facility::Local0.priority(Severity::Debug));
        assert_eq!(format!("{}", Facility::Local0), "local0".to_string());
        assert_eq!(format!("{}", Severity::Error), "err".to_string());
    }
}
