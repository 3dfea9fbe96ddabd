//! MIDI output sink.
//!
//! The host hands the kernel a callback for outgoing MIDI. In Rust that is
//! anything implementing [`MidiOutput`]; closures work directly.
//!
//! ```
//! use drumroll_core::{EventList, EventListRef, MidiOutput, SampleTime};
//!
//! let mut sent = 0;
//! let mut sink = |_time: SampleTime, _cable: u8, _list: EventListRef<'_>| sent += 1;
//! sink.send(0, 0, EventList::default().as_list_ref());
//! assert_eq!(sent, 1);
//! ```

use crate::event_list::EventListRef;
use crate::types::SampleTime;

/// Destination for outgoing MIDI event lists.
///
/// Called on the render thread: implementations must not block or allocate.
pub trait MidiOutput: Send {
    /// Deliver one event list stamped with an absolute sample time.
    ///
    /// `events` is only valid for the duration of the call.
    fn send(&mut self, sample_time: SampleTime, cable: u8, events: EventListRef<'_>);
}

impl<F> MidiOutput for F
where
    F: FnMut(SampleTime, u8, EventListRef<'_>) + Send,
{
    #[inline]
    fn send(&mut self, sample_time: SampleTime, cable: u8, events: EventListRef<'_>) {
        self(sample_time, cable, events)
    }
}
