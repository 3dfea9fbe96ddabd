//! Timestamped events delivered with a render call.
//!
//! The host interleaves parameter changes and MIDI input in one ordered
//! stream. [`RenderEvent`] is the typed form of one entry; the kernel routes
//! each variant in [`DrumRollKernel::handle_one_event`](crate::DrumRollKernel::handle_one_event).

use crate::event_list::{EventList, EventListRef};
use crate::types::{ParameterAddressRaw, ParameterValue, SampleTime};

/// Immediate parameter change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterEvent {
    /// Absolute sample time of the change.
    pub event_sample_time: SampleTime,
    /// Raw parameter address.
    pub parameter_address: ParameterAddressRaw,
    /// New plain value.
    pub value: ParameterValue,
}

/// Ramped parameter change: move from the current value to `value` over
/// `ramp_duration_sample_frames`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRampEvent {
    /// Absolute sample time where the ramp starts.
    pub event_sample_time: SampleTime,
    /// Raw parameter address.
    pub parameter_address: ParameterAddressRaw,
    /// Target value.
    pub value: ParameterValue,
    /// Ramp length in frames.
    pub ramp_duration_sample_frames: u32,
}

/// Packets of an incoming list: built locally, or borrowed in place from
/// the host.
#[derive(Debug, Clone)]
pub enum EventListData<'a> {
    /// List owned by the event.
    Owned(EventList),
    /// Host memory, valid for the render call.
    Borrowed(EventListRef<'a>),
}

impl EventListData<'_> {
    /// View the packets.
    #[inline]
    pub fn as_list_ref(&self) -> EventListRef<'_> {
        match self {
            Self::Owned(list) => list.as_list_ref(),
            Self::Borrowed(list) => *list,
        }
    }
}

/// Equal when the packed words are equal, wherever they live.
impl PartialEq for EventListData<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_list_ref() == other.as_list_ref()
    }
}

/// Incoming MIDI event list.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiEventListEvent<'a> {
    /// Absolute sample time of the list.
    pub event_sample_time: SampleTime,
    /// Virtual cable number.
    pub cable: u8,
    /// The UMP packets.
    pub event_list: EventListData<'a>,
}

/// One entry of a render call's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent<'a> {
    /// Immediate parameter change.
    Parameter(ParameterEvent),
    /// Ramped parameter change.
    ParameterRamp(ParameterRampEvent),
    /// UMP MIDI event list.
    MidiEventList(MidiEventListEvent<'a>),
    /// Any other host event kind (legacy MIDI bytes, SysEx). Ignored.
    Other {
        /// Absolute sample time of the event.
        event_sample_time: SampleTime,
    },
}

impl RenderEvent<'_> {
    /// Absolute sample time of the event.
    #[inline]
    pub fn sample_time(&self) -> SampleTime {
        match self {
            Self::Parameter(event) => event.event_sample_time,
            Self::ParameterRamp(event) => event.event_sample_time,
            Self::MidiEventList(event) => event.event_sample_time,
            Self::Other { event_sample_time } => *event_sample_time,
        }
    }

    /// Convenience constructor for a MIDI event list entry on cable 0.
    pub fn midi(event_sample_time: SampleTime, event_list: EventList) -> Self {
        Self::MidiEventList(MidiEventListEvent {
            event_sample_time,
            cable: 0,
            event_list: EventListData::Owned(event_list),
        })
    }

    /// Convenience constructor for an immediate parameter change.
    pub const fn parameter(
        event_sample_time: SampleTime,
        parameter_address: ParameterAddressRaw,
        value: ParameterValue,
    ) -> Self {
        Self::Parameter(ParameterEvent {
            event_sample_time,
            parameter_address,
            value,
        })
    }
}
