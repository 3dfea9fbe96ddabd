//! # drumroll-au
//!
//! Audio Unit (AUv3) boundary for the Drum Roll Machine MIDI processor.
//!
//! This crate adapts [`drumroll_core::DrumRollKernel`] to the host's view of
//! an `aumi` component:
//!
//! - Host render events (`AURenderEvent` linked list) become kernel
//!   [`RenderEvent`](drumroll_core::RenderEvent)s
//! - CoreMIDI `MIDIEventList` memory is lent to the kernel in place, never copied
//! - The host's MIDI output and musical context blocks are invoked directly
//! - A C-ABI bridge exposes an opaque instance to the Objective-C wrapper
//!
//! ```text
//! AU host
//!    ↓
//! Objective-C AUAudioUnit subclass
//!    ↓ (C-ABI: drumroll_au_*)
//! AuKernelBridge
//!    ↓
//! drumroll_core::DrumRollKernel
//! ```
//!
//! ## Real-Time Safety
//!
//! - The render call uses `try_lock` on the kernel and never blocks
//! - Event lists already use the host layout and are passed by pointer
//! - Parameters and properties are read from lock-free atomics

pub mod bridge;
pub mod config;
pub mod error;
pub mod midi_event_list;
pub mod midi_output;
mod objc_block;
pub mod render_event;
pub mod transport;

// Re-exports
pub use bridge::{AuKernelBridge, DrumRollAuInstanceHandle, DrumRollAuParameterInfo};
pub use config::{AuConfig, ComponentType, FourCharCode};
pub use error::{os_status, AuError, AuResult};
pub use midi_event_list::{event_list_ptr, event_list_ref, MIDIEventList};
pub use midi_output::BlockMidiOutput;
pub use render_event::{AURenderEvent, AURenderEventType, RenderEvents};
pub use transport::BlockMusicalContext;

// Re-export the kernel crate
pub use drumroll_core;
