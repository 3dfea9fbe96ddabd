//! Universal MIDI Packet (UMP) message codec.
//!
//! Only what the kernel needs: walking a word stream message by message,
//! decoding note-on/note-off, and building MIDI 2.0 note messages.
//!
//! ## Word Layout
//!
//! ```text
//! MIDI 1.0 channel voice (type 0x2, 1 word):
//!   [type:4][group:4][status:4][channel:4][note:8][velocity:8]
//!
//! MIDI 2.0 channel voice (type 0x4, 2 words):
//!   [type:4][group:4][status:4][channel:4][note:8][attribute type:8]
//!   [velocity:16][attribute data:16]
//! ```

use crate::types::{NoteNumber, Velocity};

/// Channel voice status nibbles.
pub mod status {
    /// Note off.
    pub const NOTE_OFF: u8 = 0x8;
    /// Note on.
    pub const NOTE_ON: u8 = 0x9;
}

// =============================================================================
// Message Type
// =============================================================================

/// UMP message type (upper nibble of the first word).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Utility messages (NOOP, jitter reduction).
    Utility,
    /// System real-time and common messages.
    System,
    /// MIDI 1.0 channel voice messages.
    Midi1ChannelVoice,
    /// 64-bit data messages (SysEx 7).
    Data64,
    /// MIDI 2.0 channel voice messages.
    Midi2ChannelVoice,
    /// 128-bit data messages (SysEx 8, mixed data set).
    Data128,
    /// Flex data messages.
    FlexData,
    /// UMP stream messages.
    Stream,
    /// Reserved type, carried with its raw nibble.
    Reserved(u8),
}

impl MessageType {
    /// Decode from the upper nibble of a UMP word.
    #[inline]
    pub const fn from_word(word: u32) -> Self {
        match (word >> 28) as u8 {
            0x0 => Self::Utility,
            0x1 => Self::System,
            0x2 => Self::Midi1ChannelVoice,
            0x3 => Self::Data64,
            0x4 => Self::Midi2ChannelVoice,
            0x5 => Self::Data128,
            0xD => Self::FlexData,
            0xF => Self::Stream,
            other => Self::Reserved(other),
        }
    }

    /// Raw 4-bit value.
    #[inline]
    pub const fn as_nibble(self) -> u8 {
        match self {
            Self::Utility => 0x0,
            Self::System => 0x1,
            Self::Midi1ChannelVoice => 0x2,
            Self::Data64 => 0x3,
            Self::Midi2ChannelVoice => 0x4,
            Self::Data128 => 0x5,
            Self::FlexData => 0xD,
            Self::Stream => 0xF,
            Self::Reserved(nibble) => nibble & 0x0F,
        }
    }

    /// Number of 32-bit words in a message of this type.
    #[inline]
    pub const fn word_count(self) -> usize {
        match self.as_nibble() {
            0x0 | 0x1 | 0x2 | 0x6 | 0x7 => 1,
            0x3 | 0x4 | 0x8 | 0x9 | 0xA => 2,
            0xB | 0xC => 3,
            _ => 4,
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// Maximum words in one UMP message.
pub const MAX_MESSAGE_WORDS: usize = 4;

/// One UMP message (1 to 4 words).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UmpMessage {
    words: [u32; MAX_MESSAGE_WORDS],
    len: u8,
}

impl UmpMessage {
    /// Build a message from its words.
    ///
    /// Returns `None` if `words` is empty or shorter than its message type
    /// requires. Extra words are ignored.
    pub fn from_words(words: &[u32]) -> Option<Self> {
        let first = *words.first()?;
        let len = MessageType::from_word(first).word_count();
        if words.len() < len {
            return None;
        }
        let mut storage = [0u32; MAX_MESSAGE_WORDS];
        storage[..len].copy_from_slice(&words[..len]);
        Some(Self {
            words: storage,
            len: len as u8,
        })
    }

    /// The message words.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words[..self.len as usize]
    }

    /// Message type.
    #[inline]
    pub const fn message_type(&self) -> MessageType {
        MessageType::from_word(self.words[0])
    }

    /// UMP group (0-15).
    #[inline]
    pub const fn group(&self) -> u8 {
        ((self.words[0] >> 24) & 0x0F) as u8
    }

    /// Status nibble (upper half of the status byte), e.g. [`status::NOTE_ON`].
    #[inline]
    pub const fn status(&self) -> u8 {
        ((self.words[0] >> 20) & 0x0F) as u8
    }

    /// MIDI channel (0-15).
    #[inline]
    pub const fn channel(&self) -> u8 {
        ((self.words[0] >> 16) & 0x0F) as u8
    }

    /// Note number for note messages (0-127).
    #[inline]
    pub const fn note_number(&self) -> NoteNumber {
        ((self.words[0] >> 8) & 0x7F) as u8
    }

    /// Note velocity as carried on the wire.
    ///
    /// 16-bit for MIDI 2.0 messages, 7-bit for MIDI 1.0 messages.
    #[inline]
    pub const fn velocity(&self) -> Velocity {
        match self.message_type() {
            MessageType::Midi2ChannelVoice => (self.words[1] >> 16) as u16,
            _ => (self.words[0] & 0x7F) as u16,
        }
    }

    /// Decode a note-on or note-off, if this is one.
    ///
    /// MIDI 1.0 note-on with velocity 0 is reported as a note-off. MIDI 2.0
    /// note-on is always a note-on, whatever its velocity.
    pub fn note_event(&self) -> Option<NoteEvent> {
        let is_midi1 = match self.message_type() {
            MessageType::Midi1ChannelVoice => true,
            MessageType::Midi2ChannelVoice => false,
            _ => return None,
        };

        let note = NoteMessage {
            group: self.group(),
            channel: self.channel(),
            note: self.note_number(),
            velocity: self.velocity(),
        };

        match self.status() {
            status::NOTE_ON if is_midi1 && note.velocity == 0 => Some(NoteEvent::Off(note)),
            status::NOTE_ON => Some(NoteEvent::On(note)),
            status::NOTE_OFF => Some(NoteEvent::Off(note)),
            _ => None,
        }
    }
}

/// Fields shared by note-on and note-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMessage {
    /// UMP group (0-15).
    pub group: u8,
    /// MIDI channel (0-15).
    pub channel: u8,
    /// Note number (0-127).
    pub note: NoteNumber,
    /// Velocity as carried on the wire (see [`UmpMessage::velocity`]).
    pub velocity: Velocity,
}

/// Decoded note message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// Note on.
    On(NoteMessage),
    /// Note off.
    Off(NoteMessage),
}

impl NoteEvent {
    /// Note number of either variant.
    #[inline]
    pub const fn note(&self) -> NoteNumber {
        match self {
            Self::On(message) | Self::Off(message) => message.note,
        }
    }
}

// =============================================================================
// MIDI 2.0 Builders
// =============================================================================

#[inline]
const fn midi2_channel_voice(
    group: u8,
    status: u8,
    channel: u8,
    note: NoteNumber,
    attribute_type: u8,
    attribute_data: u16,
    velocity: Velocity,
) -> [u32; 2] {
    let first = (0x4u32 << 28)
        | ((group as u32 & 0x0F) << 24)
        | ((status as u32 & 0x0F) << 20)
        | ((channel as u32 & 0x0F) << 16)
        | ((note as u32 & 0x7F) << 8)
        | attribute_type as u32;
    let second = ((velocity as u32) << 16) | attribute_data as u32;
    [first, second]
}

/// Build a MIDI 2.0 note-on message.
#[inline]
pub const fn midi2_note_on(
    group: u8,
    channel: u8,
    note: NoteNumber,
    attribute_type: u8,
    attribute_data: u16,
    velocity: Velocity,
) -> [u32; 2] {
    midi2_channel_voice(
        group,
        status::NOTE_ON,
        channel,
        note,
        attribute_type,
        attribute_data,
        velocity,
    )
}

/// Build a MIDI 2.0 note-off message.
#[inline]
pub const fn midi2_note_off(
    group: u8,
    channel: u8,
    note: NoteNumber,
    attribute_type: u8,
    attribute_data: u16,
    velocity: Velocity,
) -> [u32; 2] {
    midi2_channel_voice(
        group,
        status::NOTE_OFF,
        channel,
        note,
        attribute_type,
        attribute_data,
        velocity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi2_note_on_layout() {
        let words = midi2_note_on(0, 0, 60, 0, 0, u16::MAX);
        assert_eq!(words, [0x4090_3C00, 0xFFFF_0000]);
    }

    #[test]
    fn test_decode_midi2_note_on() {
        let words = midi2_note_on(3, 5, 64, 0, 0, 0x8000);
        let message = UmpMessage::from_words(&words).unwrap();
        assert_eq!(message.message_type(), MessageType::Midi2ChannelVoice);
        assert_eq!(message.group(), 3);
        assert_eq!(message.channel(), 5);

        match message.note_event() {
            Some(NoteEvent::On(note)) => {
                assert_eq!(note.note, 64);
                assert_eq!(note.velocity, 0x8000);
            }
            other => panic!("Expected NoteOn, got {:?}", other),
        }
    }

    #[test]
    fn test_midi2_note_on_velocity_zero_stays_note_on() {
        let words = midi2_note_on(0, 0, 64, 0, 0, 0);
        let message = UmpMessage::from_words(&words).unwrap();
        assert!(matches!(message.note_event(), Some(NoteEvent::On(_))));
    }

    #[test]
    fn test_decode_midi1_in_ump() {
        // Type 2, group 0, note on channel 1, note 67, velocity 100
        let message = UmpMessage::from_words(&[0x2091_4364]).unwrap();
        match message.note_event() {
            Some(NoteEvent::On(note)) => {
                assert_eq!(note.channel, 1);
                assert_eq!(note.note, 67);
                assert_eq!(note.velocity, 100);
            }
            other => panic!("Expected NoteOn, got {:?}", other),
        }

        // Note on with velocity 0 is a note off in MIDI 1.0
        let message = UmpMessage::from_words(&[0x2090_4300]).unwrap();
        assert!(matches!(message.note_event(), Some(NoteEvent::Off(_))));
    }

    #[test]
    fn test_non_note_messages_decode_to_none() {
        // MIDI 1.0 control change
        let cc = UmpMessage::from_words(&[0x20B0_0740]).unwrap();
        assert_eq!(cc.note_event(), None);

        // System timing clock
        let clock = UmpMessage::from_words(&[0x10F8_0000]).unwrap();
        assert_eq!(clock.note_event(), None);
    }

    #[test]
    fn test_truncated_message_is_rejected() {
        assert!(UmpMessage::from_words(&[0x4090_3C00]).is_none());
        assert!(UmpMessage::from_words(&[]).is_none());
    }

    #[test]
    fn test_word_counts() {
        assert_eq!(MessageType::from_word(0x0000_0000).word_count(), 1);
        assert_eq!(MessageType::from_word(0x2000_0000).word_count(), 1);
        assert_eq!(MessageType::from_word(0x3000_0000).word_count(), 2);
        assert_eq!(MessageType::from_word(0x4000_0000).word_count(), 2);
        assert_eq!(MessageType::from_word(0x5000_0000).word_count(), 4);
        assert_eq!(MessageType::from_word(0xB000_0000).word_count(), 3);
        assert_eq!(MessageType::from_word(0xF000_0000).word_count(), 4);
    }
}
