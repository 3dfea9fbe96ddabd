//! AU error types.

use std::fmt;

use drumroll_core::KernelError;

/// Error type for AU operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AuError {
    /// Invalid configuration (e.g., invalid sample rate).
    InvalidConfiguration(String),

    /// Not allowed in the current state (e.g., while render resources are allocated).
    InvalidState(String),

    /// Error reported by the kernel.
    Kernel(KernelError),
}

impl AuError {
    /// OSStatus to report to the host for this error.
    pub fn os_status(&self) -> i32 {
        match self {
            Self::InvalidConfiguration(_) => os_status::K_AUDIO_UNIT_ERR_INVALID_PROPERTY_VALUE,
            Self::InvalidState(_) => os_status::K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT,
            Self::Kernel(KernelError::InvalidSampleRate(_)) => {
                os_status::K_AUDIO_UNIT_ERR_FAILED_INITIALIZATION
            }
            Self::Kernel(_) => os_status::K_AUDIO_PARAM_ERR,
        }
    }
}

impl fmt::Display for AuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Self::Kernel(err) => write!(f, "Kernel error: {}", err),
        }
    }
}

impl std::error::Error for AuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kernel(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KernelError> for AuError {
    fn from(err: KernelError) -> Self {
        Self::Kernel(err)
    }
}

/// Result type alias for AU operations.
pub type AuResult<T> = Result<T, AuError>;

/// OSStatus codes returned to the host.
pub mod os_status {
    /// No error.
    pub const NO_ERR: i32 = 0;

    /// Invalid property value.
    pub const K_AUDIO_UNIT_ERR_INVALID_PROPERTY_VALUE: i32 = -10851;

    /// Invalid parameter.
    pub const K_AUDIO_UNIT_ERR_INVALID_PARAMETER: i32 = -10878;

    /// Uninitialized.
    pub const K_AUDIO_UNIT_ERR_UNINITIALIZED: i32 = -10867;

    /// Cannot do in current context.
    pub const K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT: i32 = -10863;

    /// Initialization failed.
    pub const K_AUDIO_UNIT_ERR_FAILED_INITIALIZATION: i32 = -10875;

    /// Generic bad argument.
    pub const K_AUDIO_PARAM_ERR: i32 = -50;
}
