//! Common types used throughout the kernel.

/// Absolute sample time as delivered by the host (`AUEventSampleTime`).
pub type SampleTime = i64;

/// Number of sample frames in a render call.
pub type FrameCount = u32;

/// Raw parameter address as the host sends it.
///
/// Use [`ParameterAddress::from_raw`](crate::ParameterAddress::from_raw) to get
/// the typed form.
pub type ParameterAddressRaw = u64;

/// Parameter value in plain (non-normalized) units, as the host sends it.
pub type ParameterValue = f32;

/// MIDI note number (0-127 on the wire, 0-255 as a parameter).
pub type NoteNumber = u8;

/// MIDI 2.0 note velocity (16-bit).
pub type Velocity = u16;

/// Largest velocity a MIDI 2.0 note message can carry.
pub const MAX_VELOCITY: Velocity = u16::MAX;

/// Marker for "no note held" in the raw tracking state.
pub const NO_NOTE: i32 = -1;
