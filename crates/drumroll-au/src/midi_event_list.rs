//! CoreMIDI `MIDIEventList` memory layout.
//!
//! The host structure is packed to 4 bytes:
//!
//! ```text
//! MIDIEventList   { protocol: i32, num_packets: u32, packet[...] }
//! MIDIEventPacket { time_stamp: u64, word_count: u32, words[word_count] }
//! ```
//!
//! Packets follow one another with no padding, so a packet's 64-bit
//! timestamp is only guaranteed 4-byte alignment. Host lists are never
//! copied: [`event_list_ref`] measures the list and lends it to the kernel
//! as a `u32` slice, and outgoing lists are handed to the host the same way.

use std::slice;

use drumroll_core::{EventListRef, LIST_HEADER_WORDS, PACKET_HEADER_WORDS};

/// `MIDIEventList` header. Packets follow inline.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MIDIEventList {
    /// `MIDIProtocolID`: 1 = MIDI 1.0, 2 = MIDI 2.0.
    pub protocol: i32,
    /// Number of packets that follow.
    pub num_packets: u32,
}

/// Borrow a host event list in place. Returns `None` for null.
///
/// Walks the packet headers once to find where the list ends; the packets
/// themselves are neither copied nor truncated, and the protocol word is
/// kept as the host wrote it.
///
/// # Safety
/// A non-null `list` must point to a valid, 4-byte aligned `MIDIEventList`
/// whose `num_packets` packets are all readable for `'a`.
pub unsafe fn event_list_ref<'a>(list: *const MIDIEventList) -> Option<EventListRef<'a>> {
    if list.is_null() {
        return None;
    }

    let words = list.cast::<u32>();
    let mut len = LIST_HEADER_WORDS;
    for _ in 0..(*list).num_packets {
        let word_count = words.add(len + 2).read() as usize;
        len += PACKET_HEADER_WORDS + word_count;
    }

    EventListRef::from_words(slice::from_raw_parts(words, len))
}

/// Host pointer for a list about to be passed to an `AUMIDIEventListBlock`.
///
/// For a list borrowed through [`event_list_ref`] this is the host's own
/// pointer.
#[inline]
pub fn event_list_ptr(list: EventListRef<'_>) -> *const MIDIEventList {
    list.as_words().as_ptr().cast()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drumroll_core::{EventList, MidiProtocol, NoteEvent};

    fn time_stamp_words(time_stamp: u64) -> [u32; 2] {
        let bytes = time_stamp.to_ne_bytes();
        [
            u32::from_ne_bytes(bytes[..4].try_into().unwrap()),
            u32::from_ne_bytes(bytes[4..].try_into().unwrap()),
        ]
    }

    #[test]
    fn test_read_host_layout() {
        let [t0, t1] = time_stamp_words(0x1234_5678_9ABC);
        // Two packets: one MIDI 2.0 note-on, one MIDI 1.0 control change.
        let host: [u32; 11] = [
            2, 2, //
            t0, t1, 2, 0x4090_3C00, 0xFFFF_0000, //
            0, 0, 1, 0x20B0_0740,
        ];

        let list = unsafe { event_list_ref(host.as_ptr().cast()) }.unwrap();

        assert_eq!(list.protocol(), Some(MidiProtocol::Midi2_0));
        assert_eq!(list.as_words().len(), host.len());
        let packets: Vec<_> = list.packets().collect();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].time_stamp, 0x1234_5678_9ABC);
        assert_eq!(packets[0].words(), &[0x4090_3C00, 0xFFFF_0000]);
        assert_eq!(packets[1].time_stamp, 0);
        assert_eq!(packets[1].words(), &[0x20B0_0740]);
    }

    #[test]
    fn test_host_list_is_borrowed_not_copied() {
        let host = [1u32, 1, 0, 0, 1, 0x2090_3C64];
        let ptr: *const MIDIEventList = host.as_ptr().cast();

        let list = unsafe { event_list_ref(ptr) }.unwrap();

        assert_eq!(event_list_ptr(list), ptr);
    }

    #[test]
    fn test_long_host_list_is_read_to_the_end() {
        let packets = 20;
        let mut host = vec![1u32, packets];
        for _ in 1..packets {
            host.extend_from_slice(&[0, 0, 1, 0x20B0_0740]);
        }
        host.extend_from_slice(&[0, 0, 1, 0x2080_3C00]);

        let list = unsafe { event_list_ref(host.as_ptr().cast()) }.unwrap();

        assert_eq!(list.as_words(), &host[..]);
        assert_eq!(list.packets().count(), packets as usize);
        let last = list.messages().last().and_then(|(_, message)| message.note_event());
        assert!(matches!(last, Some(NoteEvent::Off(n)) if n.note == 60));
    }

    #[test]
    fn test_unknown_protocol_is_kept() {
        let host = [9u32, 0];
        let list = unsafe { event_list_ref(host.as_ptr().cast()) }.unwrap();
        assert_eq!(list.protocol_id(), 9);
        assert!(list.is_empty());
    }

    #[test]
    fn test_null_list() {
        assert!(unsafe { event_list_ref(std::ptr::null()) }.is_none());
    }

    #[test]
    fn test_owned_list_passes_as_host_layout() {
        let list = EventList::single(MidiProtocol::Midi1_0, 0, &[0x2080_3C00]).unwrap();
        let ptr = event_list_ptr(list.as_list_ref());

        let header = unsafe { ptr.read() };
        assert_eq!(header.protocol, 1);
        assert_eq!(header.num_packets, 1);
        let copy = unsafe { event_list_ref(ptr) }.unwrap();
        assert_eq!(copy, list.as_list_ref());
    }
}
