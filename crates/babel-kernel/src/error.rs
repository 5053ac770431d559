//! Error types for the kernel route layer.

use babel_types::CanonicalAddress;
use std::io;
use thiserror::Error;

/// Failure reported by the kernel RIB client.
///
/// Kernel replies carry an errno; the codes this layer reacts to get their
/// own variant and everything else is kept raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The route is already installed (EEXIST).
    #[error("route already exists")]
    AlreadyExists,

    /// The route to remove is not installed (ESRCH).
    #[error("no such route")]
    NotFound,

    /// Any other OS error code.
    #[error("kernel error: errno {0}")]
    Os(i32),
}

impl KernelError {
    /// Classifies a positive errno value.
    pub fn from_errno(errno: i32) -> Self {
        match errno {
            libc::EEXIST => KernelError::AlreadyExists,
            libc::ESRCH => KernelError::NotFound,
            other => KernelError::Os(other),
        }
    }

    /// Returns the errno this error corresponds to.
    pub fn errno(&self) -> i32 {
        match self {
            KernelError::AlreadyExists => libc::EEXIST,
            KernelError::NotFound => libc::ESRCH,
            KernelError::Os(code) => *code,
        }
    }
}

/// Errors returned by route installation and update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Prefix and gateway disagree on address family.
    #[error("address family mismatch: prefix {prefix}/{prefix_len} with gateway {gateway}")]
    FamilyMismatch {
        prefix: CanonicalAddress,
        prefix_len: u8,
        gateway: CanonicalAddress,
    },

    /// Prefix length beyond the 128-bit canonical width.
    #[error("invalid prefix length {0} (must be 0-128)")]
    InvalidPrefixLength(u8),

    /// The kernel RIB client refused the request.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl RouteError {
    /// Returns true if the kernel reported the route as already present.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RouteError::Kernel(KernelError::AlreadyExists))
    }
}

/// Errors returned by interface identifier derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The interface has no link-layer address to derive from.
    #[error("interface has no hardware address")]
    NoHardwareAddress,

    /// No interface is known under this index.
    #[error("interface not found: index {0}")]
    InterfaceNotFound(u32),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Result type for route operations.
pub type Result<T> = std::result::Result<T, RouteError>;
