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

//! [syslog-forwarder](crate) errors

use backtrace::Backtrace;

/// [syslog-forwarder](crate) error type
///
/// [syslog-forwarder](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of a
/// straightforward enumeration with a few match arms chosen on the basis of what the caller will
/// need to respond. Two families matter to callers: configuration errors, which are fatal at
/// startup, and transport errors, which the publish path swallows (see
/// [`SyslogForwarder::publish`]).
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
/// [`SyslogForwarder::publish`]: crate::handler::SyslogForwarder::publish
#[non_exhaustive]
pub enum Error {
    /// Unrecognized transport protocol name in configuration
    BadProtocol { name: String, back: Backtrace },
    /// Unrecognized level name in configuration
    BadLevel { name: String, back: Backtrace },
    /// A property that must be an integer failed to parse as one
    BadInteger {
        key: String,
        value: String,
        back: Backtrace,
    },
    /// The provided or discovered hostname is not usable in a syslog header
    BadHostname { name: Vec<u8>, back: Backtrace },
    /// The provided tag is not usable in a syslog header
    BadTag { name: Vec<u8>, back: Backtrace },
    /// Failed to discover a hostname for the wire frame
    NoHostname {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl Error {
    /// `true` for the variants that belong to the configuration family; these are fatal at
    /// initialization, whereas transport errors are best-effort at publish time.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::BadProtocol { .. } | Error::BadLevel { .. } | Error::BadInteger { .. }
        )
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadProtocol { name, .. } => {
                write!(f, "{:?} is not a recognized transport protocol", name)
            }
            Error::BadLevel { name, .. } => {
                write!(f, "{:?} is not a recognized log level", name)
            }
            Error::BadInteger { key, value, .. } => {
                write!(f, "Property {} is not an integer (got {:?})", key, value)
            }
            Error::BadHostname { name, .. } => {
                write!(f, "{:?} is not usable as a syslog hostname", name)
            }
            Error::BadTag { name, .. } => write!(f, "{:?} is not usable as a syslog tag", name),
            Error::NoHostname { source, .. } => {
                write!(f, "Failed to discover a hostname: {}", source)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other syslog-forwarder error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadProtocol { name: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::BadLevel { name: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::BadInteger { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::BadHostname { name: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::BadTag { name: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::NoHostname { source: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "syslog-forwarder error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_family() {
        let err = Error::BadProtocol {
            name: "bogus".to_string(),
            back: Backtrace::new(),
        };
        assert!(err.is_config());
        assert!(format!("{}", err).contains("bogus"));

        let err = Error::Transport {
            source: Box::new(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
            back: Backtrace::new(),
        };
        assert!(!err.is_config());
    }
}
