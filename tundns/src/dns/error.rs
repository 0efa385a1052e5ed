use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DnsError {
    #[error("Failed to list network interfaces: {0}")]
    Enumeration(#[source] io::Error),
    #[error("Failed to resolve interface {iface}: {source}")]
    Resolution {
        iface: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to query DNS of {iface}: {source}")]
    Query {
        iface: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to set DNS on {iface} interface: {source}")]
    Apply {
        iface: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to restore DNS for {iface}: {source}")]
    Restore {
        iface: String,
        #[source]
        source: io::Error,
    },
    #[error("DNS handler for {0} has already been released")]
    Released(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsErrorKind {
    EnumerationFailure,
    ResolutionFailure,
    QueryFailure,
    ApplyFailure,
    RestoreFailure,
    Released,
}

impl DnsError {
    pub fn kind(&self) -> DnsErrorKind {
        match self {
            DnsError::Enumeration(_) => DnsErrorKind::EnumerationFailure,
            DnsError::Resolution { .. } => DnsErrorKind::ResolutionFailure,
            DnsError::Query { .. } => DnsErrorKind::QueryFailure,
            DnsError::Apply { .. } => DnsErrorKind::ApplyFailure,
            DnsError::Restore { .. } => DnsErrorKind::RestoreFailure,
            DnsError::Released(_) => DnsErrorKind::Released,
        }
    }

    pub(crate) fn resolution(iface: &str, source: io::Error) -> Self {
        DnsError::Resolution {
            iface: iface.to_string(),
            source,
        }
    }

    pub(crate) fn query(iface: &str, source: io::Error) -> Self {
        DnsError::Query {
            iface: iface.to_string(),
            source,
        }
    }

    pub(crate) fn apply(iface: &str, source: io::Error) -> Self {
        DnsError::Apply {
            iface: iface.to_string(),
            source,
        }
    }

    pub(crate) fn restore(iface: &str, source: io::Error) -> Self {
        DnsError::Restore {
            iface: iface.to_string(),
            source,
        }
    }
}
