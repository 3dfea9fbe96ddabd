//! # drumroll-core
//!
//! Real-time MIDI retrigger kernel for the DrumRollMachine MIDI processor.
//!
//! While a note is held, the kernel repeatedly re-sends it (note-off
//! followed by note-on) at a rate set by a parameter, producing a
//! "drum roll". Incoming MIDI is echoed through unchanged. The crate is
//! format-agnostic; the Audio Unit glue lives in `drumroll-au`.
//!
//! ## Main Types
//!
//! - [`DrumRollKernel`] - Note tracking, retrigger scheduling, MIDI output
//! - [`KernelParameters`] - Lock-free parameter store shared with the host
//! - [`RetriggerScheduler`] - Per-frame retrigger clock
//! - [`EventList`] / [`EventListRef`] - UMP event lists in CoreMIDI's packed layout
//! - [`UmpMessage`] - One Universal MIDI Packet message
//! - [`RenderEvent`] - Timestamped event delivered with a render call
//! - [`MidiOutput`] - Sink for generated and echoed MIDI
//! - [`KernelConfig`] - Static kernel configuration
//!
//! ## Example
//!
//! ```
//! use drumroll_core::{process_with_events, DrumRollKernel, EventListRef, ParameterAddress};
//!
//! let mut kernel = DrumRollKernel::default();
//! kernel.initialize(48_000.0).unwrap();
//! kernel.set_parameter(ParameterAddress::Rate.as_raw(), 0.9);
//! kernel.set_midi_output(Some(Box::new(|_time: i64, _cable: u8, _list: EventListRef<'_>| {})));
//!
//! process_with_events(&mut kernel, 0, 512, Vec::new());
//! assert_eq!(kernel.current_note(), None);
//! ```

pub mod config;
pub mod error;
pub mod event_list;
pub mod events;
pub mod kernel;
pub mod output;
pub mod parameters;
pub mod render;
pub mod scheduler;
pub mod transport;
pub mod types;
pub mod ump;

// Re-exports for convenience
pub use config::{KernelConfig, DEFAULT_MAX_FRAMES_TO_RENDER, DEFAULT_SAMPLE_RATE};
pub use error::{KernelError, KernelResult};
pub use event_list::{
    EventList, EventListRef, EventPacket, MidiProtocol, LIST_HEADER_WORDS, MAX_EVENT_LIST_WORDS,
    MAX_PACKET_WORDS, PACKET_HEADER_WORDS,
};
pub use events::{EventListData, MidiEventListEvent, ParameterEvent, ParameterRampEvent, RenderEvent};
pub use kernel::DrumRollKernel;
pub use output::MidiOutput;
pub use parameters::{KernelParameters, ParameterAddress, ParameterInfo, ParameterUnit};
pub use render::process_with_events;
pub use scheduler::{samples_between_notes, RetriggerScheduler};
pub use transport::{MusicalContext, MusicalContextSource};
pub use types::*;
pub use ump::{midi2_note_off, midi2_note_on, MessageType, NoteEvent, NoteMessage, UmpMessage};
