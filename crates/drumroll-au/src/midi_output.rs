//! MIDI output through the host's `AUMIDIEventListBlock`.

use std::ffi::c_void;

use drumroll_core::{EventListRef, MidiOutput, SampleTime};

use crate::midi_event_list::{event_list_ptr, MIDIEventList};
use crate::objc_block::BlockPtr;

/// `AUMIDIEventListBlock` invoke signature (block pointer first).
type MidiEventListBlockFn = unsafe extern "C" fn(
    *const c_void,         // block
    i64,                   // AUEventSampleTime
    u8,                    // cable
    *const MIDIEventList,  // eventList
) -> i32;                  // OSStatus

/// [`MidiOutput`] that forwards every list to the host.
///
/// Lists are already in host layout, so they are passed by pointer; an
/// echoed input list goes back out as the host's own memory.
#[derive(Debug)]
pub struct BlockMidiOutput {
    block: BlockPtr,
}

impl BlockMidiOutput {
    /// Wrap the host's MIDI output block. Returns `None` for null.
    ///
    /// # Safety
    /// A non-null `block` must be a valid `AUMIDIEventListBlock` that stays
    /// alive for as long as this value exists.
    pub unsafe fn from_raw(block: *const c_void) -> Option<Self> {
        BlockPtr::new(block).map(|block| Self { block })
    }
}

impl MidiOutput for BlockMidiOutput {
    fn send(&mut self, sample_time: SampleTime, cable: u8, events: EventListRef<'_>) {
        // SAFETY: `from_raw` requires a live AUMIDIEventListBlock; `events`
        // borrows memory that outlives the call.
        unsafe {
            let block_fn: MidiEventListBlockFn = std::mem::transmute(self.block.invoke());
            // A failed status means the host dropped the list; nothing to retry.
            let _ = block_fn(self.block.as_ptr(), sample_time, cable, event_list_ptr(events));
        }
    }
}
