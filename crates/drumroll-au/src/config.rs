//! AU registration metadata.
//!
//! Complements the format-agnostic [`drumroll_core::KernelConfig`] with the
//! codes the host uses to find and categorize the component.

/// AU component type (4-character code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Audio effect (aufx).
    Effect,

    /// Music device/instrument (aumu).
    MusicDevice,

    /// MIDI processor (aumi). Receives and emits MIDI, no audio.
    MidiProcessor,
}

impl ComponentType {
    /// Get the component type as a 32-bit FourCC value (big-endian).
    pub const fn as_u32(&self) -> u32 {
        match self {
            Self::Effect => u32::from_be_bytes(*b"aufx"),
            Self::MusicDevice => u32::from_be_bytes(*b"aumu"),
            Self::MidiProcessor => u32::from_be_bytes(*b"aumi"),
        }
    }

    /// Get the component type as a 4-character string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Effect => "aufx",
            Self::MusicDevice => "aumu",
            Self::MidiProcessor => "aumi",
        }
    }

    /// Whether the host offers a MIDI output block to this component type.
    pub const fn supports_midi_output(&self) -> bool {
        match self {
            Self::MusicDevice | Self::MidiProcessor => true,
            Self::Effect => false,
        }
    }
}

/// Four-character code (FourCC) for AU identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCharCode(pub [u8; 4]);

impl FourCharCode {
    /// Create a FourCharCode from 4 bytes.
    ///
    /// # Panics
    /// Panics (at compile time in const context) if any byte is not ASCII.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        assert!(
            bytes[0].is_ascii() && bytes[1].is_ascii() && bytes[2].is_ascii() && bytes[3].is_ascii(),
            "FourCC bytes must be ASCII"
        );
        Self(*bytes)
    }

    /// Get the FourCC as a 32-bit value (big-endian).
    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Get the FourCC as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl std::fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AU-specific plugin configuration.
///
/// ```
/// use drumroll_au::{AuConfig, ComponentType, FourCharCode};
///
/// static AU_CONFIG: AuConfig = AuConfig::new(
///     ComponentType::MidiProcessor,
///     FourCharCode::new(b"Demo"),
///     FourCharCode::new(b"drrm"),
/// );
/// assert_eq!(AU_CONFIG.component_type.as_str(), "aumi");
/// ```
#[derive(Debug, Clone)]
pub struct AuConfig {
    /// Component type (aufx, aumu, aumi).
    pub component_type: ComponentType,

    /// Manufacturer code.
    pub manufacturer: FourCharCode,

    /// Subtype code, unique within the manufacturer.
    pub subtype: FourCharCode,

    /// Tags for host-side search.
    pub tags: &'static [&'static str],
}

impl AuConfig {
    /// Stock Drum Roll Machine registration.
    pub const DRUM_ROLL_MACHINE: Self = Self::new(
        ComponentType::MidiProcessor,
        FourCharCode::new(b"Demo"),
        FourCharCode::new(b"drrm"),
    )
    .with_tags(&["MIDI", "Drums"]);

    /// Create a new AU configuration.
    pub const fn new(
        component_type: ComponentType,
        manufacturer: FourCharCode,
        subtype: FourCharCode,
    ) -> Self {
        Self {
            component_type,
            manufacturer,
            subtype,
            tags: &[],
        }
    }

    /// Add tags.
    pub const fn with_tags(mut self, tags: &'static [&'static str]) -> Self {
        self.tags = tags;
        self
    }
}

impl Default for AuConfig {
    fn default() -> Self {
        Self::DRUM_ROLL_MACHINE
    }
}
