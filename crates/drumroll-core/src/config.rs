//! Kernel configuration.
//!
//! Holds plugin metadata and the defaults the kernel starts from. The values in
//! [`KernelConfig::DEFAULT`] give the stock drum-roll behaviour: retriggers at
//! full MIDI 2.0 velocity on group 0, channel 0.
//!
//! # Example
//!
//! ```
//! use drumroll_core::KernelConfig;
//!
//! pub static CONFIG: KernelConfig = KernelConfig::new("Drum Roll Machine")
//!     .with_vendor("Example Audio")
//!     .with_version(env!("CARGO_PKG_VERSION"))
//!     .with_channel(9);
//!
//! assert_eq!(CONFIG.channel, 9);
//! ```

use crate::types::{FrameCount, Velocity, MAX_VELOCITY};

/// Sample rate assumed until the host calls `initialize`.
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// Frame-count hint used until the host provides one.
pub const DEFAULT_MAX_FRAMES_TO_RENDER: FrameCount = 1024;

/// Plugin metadata and kernel defaults.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Plugin name displayed in the host.
    pub name: &'static str,

    /// Vendor/company name.
    pub vendor: &'static str,

    /// Plugin version string.
    pub version: &'static str,

    /// Sample rate used before initialization.
    pub default_sample_rate: f64,

    /// Initial maximum frames-to-render hint.
    pub max_frames_to_render: FrameCount,

    /// Velocity of every retriggered note-on.
    pub retrigger_velocity: Velocity,

    /// UMP group for outgoing notes (0-15).
    pub group: u8,

    /// MIDI channel for outgoing notes (0-15).
    pub channel: u8,
}

impl KernelConfig {
    /// Stock configuration.
    pub const DEFAULT: Self = Self::new("Drum Roll Machine");

    /// Create a configuration with default kernel settings.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            vendor: "Unknown Vendor",
            version: "1.0.0",
            default_sample_rate: DEFAULT_SAMPLE_RATE,
            max_frames_to_render: DEFAULT_MAX_FRAMES_TO_RENDER,
            retrigger_velocity: MAX_VELOCITY,
            group: 0,
            channel: 0,
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the version string.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Set the initial maximum frames-to-render hint.
    pub const fn with_max_frames_to_render(mut self, frames: FrameCount) -> Self {
        self.max_frames_to_render = frames;
        self
    }

    /// Set the retrigger note-on velocity.
    pub const fn with_retrigger_velocity(mut self, velocity: Velocity) -> Self {
        self.retrigger_velocity = velocity;
        self
    }

    /// Set the output UMP group. Values above 15 are masked to 4 bits.
    pub const fn with_group(mut self, group: u8) -> Self {
        self.group = group & 0x0F;
        self
    }

    /// Set the output MIDI channel. Values above 15 are masked to 4 bits.
    pub const fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
