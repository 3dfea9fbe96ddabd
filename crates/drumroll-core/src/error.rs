//! Error types for the kernel.
//!
//! Only non-real-time operations return these. The render path never fails:
//! anything that goes wrong there is dropped silently.

use std::fmt;

/// Errors reported by kernel setup and event-list construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelError {
    /// Sample rate was zero, negative, or not finite.
    InvalidSampleRate(f64),
    /// No room left in an event list.
    EventListFull,
    /// A message does not fit in a single packet (word count given).
    PacketTooLarge(usize),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {}", rate),
            Self::EventListFull => write!(f, "Event list is full"),
            Self::PacketTooLarge(words) => {
                write!(f, "Packet too large: {} words", words)
            }
        }
    }
}

impl std::error::Error for KernelError {}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
