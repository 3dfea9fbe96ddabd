//! Host render events.
//!
//! The render call carries a linked list of `AURenderEvent` unions, ordered
//! by sample time. [`RenderEvents`] walks the list and converts each node into
//! a [`RenderEvent`] for the kernel. UMP event lists stay in host memory and
//! are lent to the kernel for the render call.

use std::marker::PhantomData;
use std::ptr;

use drumroll_core::{
    EventListData, MidiEventListEvent, ParameterEvent, ParameterRampEvent, RenderEvent, SampleTime,
};

use crate::midi_event_list::{event_list_ref, MIDIEventList};

/// AU render event types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AURenderEventType {
    /// Parameter change
    Parameter = 1,
    /// Parameter ramp over time
    ParameterRamp = 2,
    /// MIDI 1.0 bytes (legacy)
    Midi = 8,
    /// MIDI SysEx bytes
    MidiSysEx = 9,
    /// UMP event list
    MidiEventList = 10,
}

impl AURenderEventType {
    /// Decode the header's type byte.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Parameter),
            2 => Some(Self::ParameterRamp),
            8 => Some(Self::Midi),
            9 => Some(Self::MidiSysEx),
            10 => Some(Self::MidiEventList),
            _ => None,
        }
    }
}

/// Common header of every render event.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AURenderEventHeader {
    /// Next event (null if last)
    pub next: *const AURenderEvent,
    /// Absolute sample time
    pub event_sample_time: i64,
    /// Event type discriminator
    pub event_type: u8,
    /// Reserved
    pub reserved: u8,
}

/// Parameter change, immediate or ramped (`AUParameterEvent`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AUParameterEvent {
    /// Next event
    pub next: *const AURenderEvent,
    /// Absolute sample time
    pub event_sample_time: i64,
    /// `Parameter` or `ParameterRamp`
    pub event_type: u8,
    /// Reserved
    pub reserved: [u8; 3],
    /// Ramp length in frames (0 for immediate changes)
    pub ramp_duration_sample_frames: u32,
    /// Parameter address
    pub parameter_address: u64,
    /// New value, or ramp target
    pub value: f32,
}

/// Legacy MIDI 1.0 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AUMIDIEvent {
    /// Next event
    pub next: *const AURenderEvent,
    /// Absolute sample time
    pub event_sample_time: i64,
    /// `Midi` or `MidiSysEx`
    pub event_type: u8,
    /// Reserved
    pub reserved: u8,
    /// Number of valid bytes in `data`
    pub length: u16,
    /// Virtual cable number
    pub cable: u8,
    /// Status and data bytes
    pub data: [u8; 3],
}

/// UMP event list. The list's packets continue past the end of this struct.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AUMIDIEventList {
    /// Next event
    pub next: *const AURenderEvent,
    /// Absolute sample time
    pub event_sample_time: i64,
    /// `MidiEventList`
    pub event_type: u8,
    /// Reserved
    pub reserved: u8,
    /// Virtual cable number
    pub cable: u8,
    /// Inline list header
    pub event_list: MIDIEventList,
}

/// AU render event union. `head.event_type` selects the variant.
#[repr(C)]
#[derive(Clone, Copy)]
pub union AURenderEvent {
    /// Common header
    pub head: AURenderEventHeader,
    /// Parameter change or ramp
    pub parameter: AUParameterEvent,
    /// Legacy MIDI
    pub midi: AUMIDIEvent,
    /// UMP event list
    pub midi_events_list: AUMIDIEventList,
}

/// Iterator over a host render event list.
#[derive(Debug)]
pub struct RenderEvents<'a> {
    next: *const AURenderEvent,
    _events: PhantomData<&'a AURenderEvent>,
}

impl<'a> RenderEvents<'a> {
    /// Walk the list starting at `head` (null for an empty list).
    ///
    /// # Safety
    /// Every node reachable from `head`, including inline event list
    /// packets, must stay valid for `'a`.
    pub unsafe fn new(head: *const AURenderEvent) -> Self {
        Self {
            next: head,
            _events: PhantomData,
        }
    }

    /// Convert one node.
    unsafe fn convert(event: *const AURenderEvent) -> RenderEvent<'a> {
        let head = (*event).head;
        let event_sample_time: SampleTime = head.event_sample_time;

        match AURenderEventType::from_raw(head.event_type) {
            Some(AURenderEventType::Parameter) => {
                let parameter = (*event).parameter;
                RenderEvent::Parameter(ParameterEvent {
                    event_sample_time,
                    parameter_address: parameter.parameter_address,
                    value: parameter.value,
                })
            }
            Some(AURenderEventType::ParameterRamp) => {
                let parameter = (*event).parameter;
                RenderEvent::ParameterRamp(ParameterRampEvent {
                    event_sample_time,
                    parameter_address: parameter.parameter_address,
                    value: parameter.value,
                    ramp_duration_sample_frames: parameter.ramp_duration_sample_frames,
                })
            }
            Some(AURenderEventType::MidiEventList) => {
                let node = ptr::addr_of!((*event).midi_events_list);
                match event_list_ref(ptr::addr_of!((*node).event_list)) {
                    Some(list) => RenderEvent::MidiEventList(MidiEventListEvent {
                        event_sample_time,
                        cable: (*node).cable,
                        event_list: EventListData::Borrowed(list),
                    }),
                    None => RenderEvent::Other { event_sample_time },
                }
            }
            Some(AURenderEventType::Midi | AURenderEventType::MidiSysEx) | None => {
                RenderEvent::Other { event_sample_time }
            }
        }
    }
}

impl<'a> Iterator for RenderEvents<'a> {
    type Item = RenderEvent<'a>;

    fn next(&mut self) -> Option<RenderEvent<'a>> {
        if self.next.is_null() {
            return None;
        }
        // SAFETY: guaranteed by the caller of `new`.
        unsafe {
            let current = self.next;
            self.next = (*current).head.next;
            Some(Self::convert(current))
        }
    }
}
