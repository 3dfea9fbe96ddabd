//! Lock-free parameter store shared between the control thread and the
//! render thread.
//!
//! The kernel exposes three host-automatable parameters, addressed by
//! [`ParameterAddress`]. Each value lives in its own atomic cell inside
//! [`KernelParameters`], so the host's control thread can write while the
//! render thread reads without taking a lock.
//!
//! # Thread Safety
//!
//! Every load and store is a single word-sized atomic operation with
//! `Relaxed` ordering. A host change touching several parameters is *not*
//! applied as a group: the render thread may observe any interleaving of
//! the individual writes. Each parameter is meaningful on its own, so this
//! is acceptable.
//!
//! Reads always return the last value written (the goal value). There is no
//! ramping, so the goal value is also the value the render thread uses.
//! If ramping is ever added, [`KernelParameters::get`] must keep returning
//! the goal and must not be treated as the currently-audible value.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use crate::types::{NoteNumber, ParameterAddressRaw, ParameterValue};

// =============================================================================
// Addresses
// =============================================================================

/// The closed set of parameter addresses the kernel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum ParameterAddress {
    /// Momentary "play note" request (boolean stored as 0.0 / 1.0).
    SendNote = 0,
    /// Target note number for the explicit note request.
    MidiNoteNumber = 1,
    /// Retrigger rate. 0 disables retriggering, 1 retriggers every frame.
    Rate = 2,
}

impl ParameterAddress {
    /// All addresses, in address order.
    pub const ALL: [Self; 3] = [Self::SendNote, Self::MidiNoteNumber, Self::Rate];

    /// Look up a raw host address. Returns `None` for unknown addresses.
    #[inline]
    pub const fn from_raw(raw: ParameterAddressRaw) -> Option<Self> {
        match raw {
            0 => Some(Self::SendNote),
            1 => Some(Self::MidiNoteNumber),
            2 => Some(Self::Rate),
            _ => None,
        }
    }

    /// The raw address the host uses for this parameter.
    #[inline]
    pub const fn as_raw(self) -> ParameterAddressRaw {
        self as ParameterAddressRaw
    }

    /// Metadata for the host parameter tree.
    pub fn info(self) -> &'static ParameterInfo {
        match self {
            Self::SendNote => &SEND_NOTE_INFO,
            Self::MidiNoteNumber => &MIDI_NOTE_NUMBER_INFO,
            Self::Rate => &RATE_INFO,
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Display unit of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterUnit {
    /// Generic continuous value.
    Generic,
    /// On/off switch.
    Boolean,
    /// MIDI note number.
    MidiNoteNumber,
}

/// Metadata describing a single parameter, used to build the host's
/// parameter tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Address of the parameter.
    pub address: ParameterAddress,
    /// Stable identifier (used as the parameter key by the host).
    pub identifier: &'static str,
    /// Name shown in the host UI.
    pub name: &'static str,
    /// Minimum plain value.
    pub min: ParameterValue,
    /// Maximum plain value.
    pub max: ParameterValue,
    /// Initial plain value.
    pub default: ParameterValue,
    /// Display unit.
    pub unit: ParameterUnit,
    /// The value snaps back to `min` after the host UI releases it.
    pub is_momentary: bool,
}

impl ParameterInfo {
    /// Clamp a plain value into this parameter's range.
    #[inline]
    pub fn clamp(&self, value: ParameterValue) -> ParameterValue {
        value.clamp(self.min, self.max)
    }
}

static SEND_NOTE_INFO: ParameterInfo = ParameterInfo {
    address: ParameterAddress::SendNote,
    identifier: "sendNote",
    name: "Play note",
    min: 0.0,
    max: 1.0,
    default: 0.0,
    unit: ParameterUnit::Boolean,
    is_momentary: true,
};

static MIDI_NOTE_NUMBER_INFO: ParameterInfo = ParameterInfo {
    address: ParameterAddress::MidiNoteNumber,
    identifier: "midiNoteNumber",
    name: "MIDI Note Number",
    min: 0.0,
    max: 127.0,
    default: 60.0,
    unit: ParameterUnit::MidiNoteNumber,
    is_momentary: false,
};

static RATE_INFO: ParameterInfo = ParameterInfo {
    address: ParameterAddress::Rate,
    identifier: "rate",
    name: "Rate",
    min: 0.0,
    max: 1.0,
    default: 0.0,
    unit: ParameterUnit::Generic,
    is_momentary: false,
};

// =============================================================================
// Store
// =============================================================================

/// Atomic cells for every parameter plus the bypass flag.
///
/// Shared through `Arc` between the host's control thread and the kernel.
#[derive(Debug)]
pub struct KernelParameters {
    send_note: AtomicBool,
    midi_note_number: AtomicU8,
    /// `f64` bit pattern.
    rate: AtomicU64,
    bypassed: AtomicBool,
}

impl Default for KernelParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelParameters {
    /// Create a store holding the startup values.
    ///
    /// The note number starts at 255 (no explicit note chosen yet) and the
    /// rate at 0 (no retriggering).
    pub fn new() -> Self {
        Self {
            send_note: AtomicBool::new(false),
            midi_note_number: AtomicU8::new(u8::MAX),
            rate: AtomicU64::new(0.0f64.to_bits()),
            bypassed: AtomicBool::new(false),
        }
    }

    /// Set a parameter by raw address. Unknown addresses are ignored.
    ///
    /// Lock-free; safe to call from any thread.
    #[inline]
    pub fn set(&self, address: ParameterAddressRaw, value: ParameterValue) {
        if let Some(address) = ParameterAddress::from_raw(address) {
            self.set_typed(address, value);
        }
    }

    /// Get a parameter by raw address. Unknown addresses read as `0.0`.
    #[inline]
    pub fn get(&self, address: ParameterAddressRaw) -> ParameterValue {
        ParameterAddress::from_raw(address)
            .map(|address| self.get_typed(address))
            .unwrap_or(0.0)
    }

    /// Set a parameter by typed address.
    pub fn set_typed(&self, address: ParameterAddress, value: ParameterValue) {
        match address {
            ParameterAddress::SendNote => {
                self.send_note.store(value != 0.0, Ordering::Relaxed);
            }
            ParameterAddress::MidiNoteNumber => {
                // Saturating float-to-int: negative and NaN become 0, > 255 becomes 255.
                self.midi_note_number.store(value as u8, Ordering::Relaxed);
            }
            ParameterAddress::Rate => {
                self.rate.store(f64::from(value).to_bits(), Ordering::Relaxed);
            }
        }
    }

    /// Get a parameter by typed address.
    pub fn get_typed(&self, address: ParameterAddress) -> ParameterValue {
        match address {
            ParameterAddress::SendNote => {
                if self.should_send_note_on() {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterAddress::MidiNoteNumber => self.next_note_to_send() as ParameterValue,
            ParameterAddress::Rate => self.rate() as ParameterValue,
        }
    }

    /// Current retrigger rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    /// Note number latched for the explicit note request.
    #[inline]
    pub fn next_note_to_send(&self) -> NoteNumber {
        self.midi_note_number.load(Ordering::Relaxed)
    }

    /// Whether an explicit note-on has been requested.
    #[inline]
    pub fn should_send_note_on(&self) -> bool {
        self.send_note.load(Ordering::Relaxed)
    }

    /// Whether the kernel is bypassed.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed.load(Ordering::Relaxed)
    }

    /// Set the bypass flag. Takes effect at the start of the next block.
    #[inline]
    pub fn set_bypass(&self, bypassed: bool) {
        self.bypassed.store(bypassed, Ordering::Relaxed);
    }
}
