//! MIDI event lists in CoreMIDI's packed layout.
//!
//! A `MIDIEventList` is a flat run of 32-bit words:
//!
//! ```text
//! list   = protocol, num_packets, packet*
//! packet = time_stamp (2 words, native order), word_count, words[word_count]
//! ```
//!
//! [`EventListRef`] is a borrowed view over such words, whether they belong
//! to the host or to an [`EventList`]. [`EventList`] builds the same layout in
//! a fixed-size buffer, so building and walking lists on the render thread
//! never touches the heap, and any list can be handed to the host as is.

use crate::error::{KernelError, KernelResult};
use crate::ump::{MessageType, UmpMessage};

/// Maximum UMP words per packet (CoreMIDI's limit).
pub const MAX_PACKET_WORDS: usize = 64;

/// Word capacity of an [`EventList`], headers included.
pub const MAX_EVENT_LIST_WORDS: usize = 512;

/// Words in the list header (protocol, packet count).
pub const LIST_HEADER_WORDS: usize = 2;

/// Words before the payload of each packet (timestamp, word count).
pub const PACKET_HEADER_WORDS: usize = 3;

/// MIDI protocol of an event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum MidiProtocol {
    /// MIDI 1.0 messages in UMP form.
    Midi1_0 = 1,
    /// MIDI 2.0.
    #[default]
    Midi2_0 = 2,
}

impl MidiProtocol {
    /// Decode CoreMIDI's `MIDIProtocolID`.
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Midi1_0),
            2 => Some(Self::Midi2_0),
            _ => None,
        }
    }
}

#[inline]
fn split_time_stamp(time_stamp: u64) -> [u32; 2] {
    let [a, b, c, d, e, f, g, h] = time_stamp.to_ne_bytes();
    [u32::from_ne_bytes([a, b, c, d]), u32::from_ne_bytes([e, f, g, h])]
}

#[inline]
fn join_time_stamp(first: u32, second: u32) -> u64 {
    let [a, b, c, d] = first.to_ne_bytes();
    let [e, f, g, h] = second.to_ne_bytes();
    u64::from_ne_bytes([a, b, c, d, e, f, g, h])
}

// =============================================================================
// Packet
// =============================================================================

/// A timestamped run of UMP words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPacket<'a> {
    /// Packet timestamp (host time; 0 means "now").
    pub time_stamp: u64,
    words: &'a [u32],
}

impl<'a> EventPacket<'a> {
    /// The packet's UMP words.
    #[inline]
    pub fn words(&self) -> &'a [u32] {
        self.words
    }

    /// Iterate over the complete messages in this packet.
    #[inline]
    pub fn messages(&self) -> PacketMessages<'a> {
        PacketMessages { words: self.words }
    }
}

// =============================================================================
// Borrowed List
// =============================================================================

/// Borrowed event list in host layout.
///
/// Nothing is validated up front: iteration stops at the first packet that
/// runs past the end of the words. The protocol word is kept as given, so a
/// list passed back out is bit-for-bit what came in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EventListRef<'a> {
    words: &'a [u32],
}

impl<'a> EventListRef<'a> {
    /// View `words` as an event list. `None` if the header is missing.
    #[inline]
    pub fn from_words(words: &'a [u32]) -> Option<Self> {
        (words.len() >= LIST_HEADER_WORDS).then_some(Self { words })
    }

    /// Raw `MIDIProtocolID`.
    #[inline]
    pub fn protocol_id(&self) -> u32 {
        self.words[0]
    }

    /// Protocol of the list, if it is one this crate knows.
    #[inline]
    pub fn protocol(&self) -> Option<MidiProtocol> {
        MidiProtocol::from_raw(self.protocol_id())
    }

    /// Packet count from the header.
    #[inline]
    pub fn len(&self) -> usize {
        self.words[1] as usize
    }

    /// True if the header announces no packets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The words of the whole list, header included.
    #[inline]
    pub fn as_words(&self) -> &'a [u32] {
        self.words
    }

    /// Iterate over the packets in order.
    #[inline]
    pub fn packets(&self) -> Packets<'a> {
        Packets {
            remaining: self.len(),
            words: &self.words[LIST_HEADER_WORDS..],
        }
    }

    /// Iterate over every message in every packet, paired with its packet
    /// timestamp.
    #[inline]
    pub fn messages(&self) -> Messages<'a> {
        Messages {
            packets: self.packets(),
            current: None,
        }
    }
}

impl core::fmt::Debug for EventListRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventListRef")
            .field("protocol_id", &self.protocol_id())
            .field("packets", &DebugPackets(*self))
            .finish()
    }
}

struct DebugPackets<'a>(EventListRef<'a>);

impl core::fmt::Debug for DebugPackets<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.0.packets()).finish()
    }
}

// =============================================================================
// Owned List
// =============================================================================

/// Fixed-capacity event list, stored in host layout.
#[derive(Clone)]
pub struct EventList {
    words: [u32; MAX_EVENT_LIST_WORDS],
    len: usize,
    /// Word index of the last packet's header.
    last_packet: usize,
}

impl EventList {
    /// Create an empty list.
    pub fn new(protocol: MidiProtocol) -> Self {
        let mut words = [0; MAX_EVENT_LIST_WORDS];
        words[0] = protocol as u32;
        Self {
            words,
            len: LIST_HEADER_WORDS,
            last_packet: LIST_HEADER_WORDS,
        }
    }

    /// Create a list holding one packet.
    pub fn single(protocol: MidiProtocol, time_stamp: u64, words: &[u32]) -> KernelResult<Self> {
        let mut list = Self::new(protocol);
        list.add(time_stamp, words)?;
        Ok(list)
    }

    /// Protocol of the list.
    #[inline]
    pub fn protocol(&self) -> MidiProtocol {
        MidiProtocol::from_raw(self.words[0]).unwrap_or_default()
    }

    /// Number of packets.
    #[inline]
    pub fn len(&self) -> usize {
        self.words[1] as usize
    }

    /// True if the list holds no packets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append words to the list.
    ///
    /// Like `MIDIEventListAdd`: the words join the last packet when it has the
    /// same timestamp and enough room, otherwise they start a new packet.
    pub fn add(&mut self, time_stamp: u64, words: &[u32]) -> KernelResult<()> {
        if words.is_empty() {
            return Ok(());
        }
        if words.len() > MAX_PACKET_WORDS {
            return Err(KernelError::PacketTooLarge(words.len()));
        }

        if !self.is_empty() {
            let header = self.last_packet;
            let last_time = join_time_stamp(self.words[header], self.words[header + 1]);
            let last_count = self.words[header + 2] as usize;
            if last_time == time_stamp
                && last_count + words.len() <= MAX_PACKET_WORDS
                && self.len + words.len() <= MAX_EVENT_LIST_WORDS
            {
                self.words[self.len..self.len + words.len()].copy_from_slice(words);
                self.len += words.len();
                self.words[header + 2] += words.len() as u32;
                return Ok(());
            }
        }

        self.push_packet(time_stamp, words)
    }

    /// Append words as a new packet, never merging with the last one.
    pub fn push_packet(&mut self, time_stamp: u64, words: &[u32]) -> KernelResult<()> {
        if words.len() > MAX_PACKET_WORDS {
            return Err(KernelError::PacketTooLarge(words.len()));
        }
        let header = self.len;
        let end = header + PACKET_HEADER_WORDS + words.len();
        if end > MAX_EVENT_LIST_WORDS {
            return Err(KernelError::EventListFull);
        }

        let [first, second] = split_time_stamp(time_stamp);
        self.words[header] = first;
        self.words[header + 1] = second;
        self.words[header + 2] = words.len() as u32;
        self.words[header + PACKET_HEADER_WORDS..end].copy_from_slice(words);

        self.last_packet = header;
        self.len = end;
        self.words[1] += 1;
        Ok(())
    }

    /// Borrow the list as a view.
    #[inline]
    pub fn as_list_ref(&self) -> EventListRef<'_> {
        EventListRef {
            words: &self.words[..self.len],
        }
    }

    /// The words of the whole list, header included.
    #[inline]
    pub fn as_words(&self) -> &[u32] {
        &self.words[..self.len]
    }

    /// Iterate over the packets in order.
    #[inline]
    pub fn packets(&self) -> Packets<'_> {
        self.as_list_ref().packets()
    }

    /// Iterate over every message in every packet.
    #[inline]
    pub fn messages(&self) -> Messages<'_> {
        self.as_list_ref().messages()
    }
}

impl Default for EventList {
    fn default() -> Self {
        Self::new(MidiProtocol::default())
    }
}

impl core::fmt::Debug for EventList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventList")
            .field("protocol", &self.protocol())
            .field("packets", &DebugPackets(self.as_list_ref()))
            .finish()
    }
}

impl PartialEq for EventList {
    fn eq(&self, other: &Self) -> bool {
        self.as_words() == other.as_words()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Packets of a list, in order.
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    remaining: usize,
    words: &'a [u32],
}

impl<'a> Iterator for Packets<'a> {
    type Item = EventPacket<'a>;

    fn next(&mut self) -> Option<EventPacket<'a>> {
        if self.remaining == 0 || self.words.len() < PACKET_HEADER_WORDS {
            return None;
        }
        let end = PACKET_HEADER_WORDS + self.words[2] as usize;
        if self.words.len() < end {
            self.remaining = 0;
            return None;
        }

        let packet = EventPacket {
            time_stamp: join_time_stamp(self.words[0], self.words[1]),
            words: &self.words[PACKET_HEADER_WORDS..end],
        };
        self.words = &self.words[end..];
        self.remaining -= 1;
        Some(packet)
    }
}

/// Messages within one packet.
///
/// Stops at the first message whose words run past the end of the packet.
#[derive(Debug, Clone)]
pub struct PacketMessages<'a> {
    words: &'a [u32],
}

impl Iterator for PacketMessages<'_> {
    type Item = UmpMessage;

    fn next(&mut self) -> Option<UmpMessage> {
        let first = *self.words.first()?;
        let len = MessageType::from_word(first).word_count();
        if self.words.len() < len {
            self.words = &[];
            return None;
        }
        let (head, rest) = self.words.split_at(len);
        self.words = rest;
        UmpMessage::from_words(head)
    }
}

/// Messages across all packets of a list.
///
/// One pass, no allocation. Obtain a fresh iterator per block.
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    packets: Packets<'a>,
    current: Option<(u64, PacketMessages<'a>)>,
}

impl Iterator for Messages<'_> {
    type Item = (u64, UmpMessage);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((time_stamp, messages)) = &mut self.current {
                if let Some(message) = messages.next() {
                    return Some((*time_stamp, message));
                }
            }
            let packet = self.packets.next()?;
            self.current = Some((packet.time_stamp, packet.messages()));
        }
    }
}
