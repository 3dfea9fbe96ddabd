//! The drum-roll kernel.
//!
//! [`DrumRollKernel`] turns a held note and the rate parameter into a stream
//! of sample-accurate note-off/note-on pairs. It runs on the host's render
//! thread and never allocates, locks, or blocks there.
//!
//! # Lifecycle
//!
//! ```text
//! new(config) → initialize(sample_rate) → process(...)* → deinitialize()
//!                     ↑_____________________________________________|
//! ```
//!
//! Calling [`process`](DrumRollKernel::process) before
//! [`initialize`](DrumRollKernel::initialize) is a host contract violation.
//! It is not checked on the render path; the kernel renders with
//! [`KernelConfig::default_sample_rate`] in that case.
//!
//! # Threads
//!
//! - Control thread: `set_parameter`, `set_bypass` (lock-free, through the
//!   shared [`KernelParameters`]).
//! - Render thread: `process`, `handle_one_event` and everything they call.
//! - Setup (render resources not allocated): `initialize`, `deinitialize`,
//!   `set_midi_output`, `set_musical_context_source`.

use std::sync::Arc;

use crate::config::KernelConfig;
use crate::error::{KernelError, KernelResult};
use crate::event_list::{EventList, MidiProtocol};
use crate::events::{MidiEventListEvent, ParameterEvent, RenderEvent};
use crate::output::MidiOutput;
use crate::parameters::KernelParameters;
use crate::scheduler::{samples_between_notes, RetriggerScheduler};
use crate::transport::{MusicalContext, MusicalContextSource};
use crate::types::{
    FrameCount, NoteNumber, ParameterAddressRaw, ParameterValue, SampleTime, Velocity, NO_NOTE,
};
use crate::ump::{midi2_note_off, midi2_note_on, NoteEvent};

/// Real-time MIDI retrigger kernel.
pub struct DrumRollKernel {
    config: KernelConfig,
    parameters: Arc<KernelParameters>,
    sample_rate: f64,
    initialized: bool,
    /// Advisory; the host sizes its buffers with it.
    max_frames_to_render: FrameCount,

    midi_output: Option<Box<dyn MidiOutput>>,
    musical_context_source: Option<Box<dyn MusicalContextSource>>,
    musical_context: Option<MusicalContext>,

    /// Monophonic: the last note-on wins, any note-off clears it.
    current_note: i32,
    scheduler: RetriggerScheduler,

    // Encoder bookkeeping. Not consulted by the scheduler.
    last_sent_note: NoteNumber,
    note_is_currently_on: bool,
}

impl Default for DrumRollKernel {
    fn default() -> Self {
        Self::new(KernelConfig::DEFAULT)
    }
}

impl core::fmt::Debug for DrumRollKernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrumRollKernel")
            .field("sample_rate", &self.sample_rate)
            .field("initialized", &self.initialized)
            .field("current_note", &self.current_note)
            .field("sample_counter", &self.scheduler.sample_counter())
            .field("has_midi_output", &self.midi_output.is_some())
            .finish_non_exhaustive()
    }
}

impl DrumRollKernel {
    /// Create an uninitialized kernel.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            sample_rate: config.default_sample_rate,
            max_frames_to_render: config.max_frames_to_render,
            config,
            parameters: Arc::new(KernelParameters::new()),
            initialized: false,
            midi_output: None,
            musical_context_source: None,
            musical_context: None,
            current_note: NO_NOTE,
            scheduler: RetriggerScheduler::new(),
            last_sent_note: u8::MAX,
            note_is_currently_on: false,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Prepare for rendering at `sample_rate`.
    ///
    /// Clears note tracking and the retrigger counter. Fails, leaving the
    /// kernel uninitialized, if the sample rate is not a positive finite number.
    pub fn initialize(&mut self, sample_rate: f64) -> KernelResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            self.initialized = false;
            return Err(KernelError::InvalidSampleRate(sample_rate));
        }

        self.sample_rate = sample_rate;
        self.reset();
        self.initialized = true;
        log::debug!(
            "{} kernel initialized: sample_rate={}, max_frames={}",
            self.config.name,
            sample_rate,
            self.max_frames_to_render
        );
        Ok(())
    }

    /// Release render state. The kernel can be initialized again.
    pub fn deinitialize(&mut self) {
        self.initialized = false;
        self.reset();
        self.musical_context = None;
        log::debug!("{} kernel deinitialized", self.config.name);
    }

    fn reset(&mut self) {
        self.current_note = NO_NOTE;
        self.scheduler.reset();
        self.note_is_currently_on = false;
    }

    /// True between `initialize` and `deinitialize`.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sample rate set at initialization.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Configuration the kernel was created with.
    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    // =========================================================================
    // Bypass
    // =========================================================================

    /// Whether processing is bypassed.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.parameters.is_bypassed()
    }

    /// Bypass or resume processing. Checked once at the top of each block.
    #[inline]
    pub fn set_bypass(&self, should_bypass: bool) {
        self.parameters.set_bypass(should_bypass);
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Set a parameter by raw address. Unknown addresses are ignored.
    ///
    /// Takes effect at the next processed frame; never triggers a note itself.
    #[inline]
    pub fn set_parameter(&self, address: ParameterAddressRaw, value: ParameterValue) {
        self.parameters.set(address, value);
    }

    /// Get the last value set for a parameter. Unknown addresses read as 0.
    #[inline]
    pub fn get_parameter(&self, address: ParameterAddressRaw) -> ParameterValue {
        self.parameters.get(address)
    }

    /// Shared parameter store, for handing to the control thread.
    #[inline]
    pub fn parameters(&self) -> Arc<KernelParameters> {
        Arc::clone(&self.parameters)
    }

    // =========================================================================
    // Maximum Frames To Render
    // =========================================================================

    /// Host's frame-count hint.
    #[inline]
    pub fn maximum_frames_to_render(&self) -> FrameCount {
        self.max_frames_to_render
    }

    /// Store the host's frame-count hint. Not enforced by `process`.
    pub fn set_maximum_frames_to_render(&mut self, max_frames: FrameCount) {
        if max_frames == 0 {
            log::warn!("Host set maximumFramesToRender to 0");
        }
        self.max_frames_to_render = max_frames;
    }

    // =========================================================================
    // Host Callbacks
    // =========================================================================

    /// Register (or clear) the musical context source.
    pub fn set_musical_context_source(&mut self, source: Option<Box<dyn MusicalContextSource>>) {
        self.musical_context_source = source;
        self.musical_context = None;
    }

    /// Last musical context read from the host, if any.
    #[inline]
    pub fn musical_context(&self) -> Option<MusicalContext> {
        self.musical_context
    }

    /// Register (or clear) the MIDI output sink.
    pub fn set_midi_output(&mut self, output: Option<Box<dyn MidiOutput>>) {
        self.midi_output = output;
    }

    /// True if a MIDI output sink is registered.
    #[inline]
    pub fn has_midi_output(&self) -> bool {
        self.midi_output.is_some()
    }

    /// MIDI protocol of everything the kernel sends.
    pub const MIDI_PROTOCOL: MidiProtocol = MidiProtocol::Midi2_0;

    /// MIDI protocol reported to the host. Always MIDI 2.0.
    #[inline]
    pub const fn midi_protocol(&self) -> MidiProtocol {
        Self::MIDI_PROTOCOL
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Currently held note, if any.
    #[inline]
    pub fn current_note(&self) -> Option<NoteNumber> {
        if self.current_note == NO_NOTE {
            None
        } else {
            Some(self.current_note as NoteNumber)
        }
    }

    /// Samples elapsed since the last retrigger.
    #[inline]
    pub fn sample_counter(&self) -> u64 {
        self.scheduler.sample_counter()
    }

    /// Note number of the last note-on sent (255 before the first one).
    #[inline]
    pub fn last_sent_note(&self) -> NoteNumber {
        self.last_sent_note
    }

    /// True if a note-on was sent without a following note-off.
    #[inline]
    pub fn note_is_currently_on(&self) -> bool {
        self.note_is_currently_on
    }

    // =========================================================================
    // Process
    // =========================================================================

    /// Render `frame_count` frames starting at `buffer_start_time`.
    ///
    /// Every retrigger is stamped `buffer_start_time + frame_index`.
    pub fn process(&mut self, buffer_start_time: SampleTime, frame_count: FrameCount) {
        if self.is_bypassed() {
            return;
        }

        if let Some(source) = self.musical_context_source.as_mut() {
            self.musical_context = source.musical_context();
        }

        if self.current_note == NO_NOTE {
            self.scheduler.reset();
            return;
        }

        let note = self.current_note as NoteNumber;
        let velocity = self.config.retrigger_velocity;
        let period = samples_between_notes(self.parameters.rate(), self.sample_rate);

        for frame_index in 0..frame_count {
            if self.scheduler.tick(true, period) {
                let sample_time = buffer_start_time + SampleTime::from(frame_index);
                self.send_note_off(sample_time, note, 0);
                self.send_note_on(sample_time, note, velocity);
            }
        }
    }

    // =========================================================================
    // MIDI Output
    // =========================================================================

    /// Emit a MIDI 2.0 note-on. Returns `false` if no output is registered.
    pub fn send_note_on(&mut self, sample_time: SampleTime, note: NoteNumber, velocity: Velocity) -> bool {
        let message = midi2_note_on(self.config.group, self.config.channel, note, 0, 0, velocity);
        if !self.emit(sample_time, &message) {
            return false;
        }
        self.last_sent_note = note;
        self.note_is_currently_on = true;
        true
    }

    /// Emit a MIDI 2.0 note-off. Returns `false` if no output is registered.
    pub fn send_note_off(&mut self, sample_time: SampleTime, note: NoteNumber, velocity: Velocity) -> bool {
        let message = midi2_note_off(self.config.group, self.config.channel, note, 0, 0, velocity);
        if !self.emit(sample_time, &message) {
            return false;
        }
        self.note_is_currently_on = false;
        true
    }

    fn emit(&mut self, sample_time: SampleTime, words: &[u32]) -> bool {
        let Some(output) = self.midi_output.as_mut() else {
            return false;
        };
        match EventList::single(Self::MIDI_PROTOCOL, 0, words) {
            Ok(list) => {
                output.send(sample_time, 0, list.as_list_ref());
                true
            }
            Err(_) => false,
        }
    }

    // =========================================================================
    // Event Dispatch
    // =========================================================================

    /// Route one render event.
    pub fn handle_one_event(&mut self, now: SampleTime, event: &RenderEvent<'_>) {
        match event {
            RenderEvent::Parameter(parameter) => self.handle_parameter_event(now, parameter),
            RenderEvent::MidiEventList(midi) => self.handle_midi_event_list(now, midi),
            RenderEvent::ParameterRamp(_) | RenderEvent::Other { .. } => {}
        }
    }

    /// Track held notes from an incoming list, then echo the list unchanged.
    ///
    /// Every packet is read in place; the sink receives the same words.
    pub fn handle_midi_event_list(&mut self, now: SampleTime, event: &MidiEventListEvent<'_>) {
        let list = event.event_list.as_list_ref();
        for (_, message) in list.messages() {
            match message.note_event() {
                Some(NoteEvent::On(note)) => self.current_note = i32::from(note.note),
                Some(NoteEvent::Off(_)) => self.current_note = NO_NOTE,
                None => {}
            }
        }

        if let Some(output) = self.midi_output.as_mut() {
            output.send(now, event.cable, list);
        }
    }

    /// Parameter events from the render list. Values already arrive through
    /// `set_parameter`, so nothing happens here yet.
    pub fn handle_parameter_event(&mut self, _now: SampleTime, _event: &ParameterEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterAddress;
    use crate::event_list::EventListRef;
    use crate::events::EventListData;
    use crate::ump::{NoteMessage, UmpMessage};
    use std::sync::Mutex;

    /// Sample time, cable, and the list's packed words.
    type Sent = Vec<(SampleTime, u8, Vec<u32>)>;

    fn recording_output() -> (Box<dyn MidiOutput>, Arc<Mutex<Sent>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sent);
        let output: Box<dyn MidiOutput> = Box::new(move |time: SampleTime, cable: u8, list: EventListRef<'_>| {
            sink.lock().unwrap().push((time, cable, list.as_words().to_vec()));
        });
        (output, sent)
    }

    fn first_packet(words: &[u32]) -> Vec<u32> {
        let list = EventListRef::from_words(words).unwrap();
        list.packets().next().unwrap().words().to_vec()
    }

    /// Decoded note events with their sample times.
    fn notes(sent: &Arc<Mutex<Sent>>) -> Vec<(SampleTime, NoteEvent)> {
        sent.lock()
            .unwrap()
            .iter()
            .flat_map(|(time, _, words)| {
                EventListRef::from_words(words)
                    .unwrap()
                    .messages()
                    .filter_map(|(_, message)| message.note_event())
                    .map(move |event| (*time, event))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn note_list(words: &[u32]) -> MidiEventListEvent<'static> {
        let list = EventList::single(MidiProtocol::Midi2_0, 0, words).unwrap();
        MidiEventListEvent {
            event_sample_time: 0,
            cable: 0,
            event_list: EventListData::Owned(list),
        }
    }

    fn hold(kernel: &mut DrumRollKernel, note: NoteNumber) {
        kernel.handle_midi_event_list(0, &note_list(&midi2_note_on(0, 0, note, 0, 0, 0x8000)));
    }

    /// Kernel at 400 Hz so that rate 0.75 gives a period of exactly 100 samples.
    fn kernel_with_period_100() -> DrumRollKernel {
        let mut kernel = DrumRollKernel::default();
        kernel.initialize(400.0).unwrap();
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 0.75);
        kernel
    }

    #[test]
    fn test_retrigger_pairs_at_expected_offsets() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.process(0, 250);

        let events = notes(&sent);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], (101, NoteEvent::Off(n)) if n.note == 60 && n.velocity == 0));
        assert!(matches!(events[1], (101, NoteEvent::On(n)) if n.note == 60 && n.velocity == u16::MAX));
        assert!(matches!(events[2], (202, NoteEvent::Off(n)) if n.note == 60));
        assert!(matches!(events[3], (202, NoteEvent::On(n)) if n.note == 60));
    }

    #[test]
    fn test_retriggers_are_stamped_from_buffer_start() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.process(10_000, 250);

        let times: Vec<_> = notes(&sent).iter().map(|(time, _)| *time).collect();
        assert_eq!(times, vec![10_101, 10_101, 10_202, 10_202]);
    }

    #[test]
    fn test_counter_carries_across_blocks() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.process(0, 64);
        kernel.process(64, 64);
        assert_eq!(kernel.sample_counter(), 128 - 101);

        let times: Vec<_> = notes(&sent).iter().map(|(time, _)| *time).collect();
        assert_eq!(times, vec![101, 101]);
    }

    #[test]
    fn test_no_note_emits_nothing_and_keeps_counter_at_zero() {
        let mut kernel = kernel_with_period_100();
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 1.0);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        for block in 0..10 {
            kernel.process(block * 512, 512);
        }

        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(kernel.sample_counter(), 0);
    }

    #[test]
    fn test_rate_zero_never_retriggers() {
        let mut kernel = DrumRollKernel::default();
        kernel.initialize(48_000.0).unwrap();
        hold(&mut kernel, 36);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.process(0, 1_000_000);

        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(kernel.sample_counter(), 1_000_000);
    }

    #[test]
    fn test_note_off_clears_tracking() {
        let mut kernel = DrumRollKernel::default();
        hold(&mut kernel, 64);
        assert_eq!(kernel.current_note(), Some(64));

        kernel.handle_midi_event_list(0, &note_list(&midi2_note_off(0, 0, 64, 0, 0, 0)));
        assert_eq!(kernel.current_note(), None);
    }

    #[test]
    fn test_last_note_on_wins() {
        let mut kernel = DrumRollKernel::default();
        let mut list = EventList::new(MidiProtocol::Midi2_0);
        list.add(0, &midi2_note_on(0, 0, 64, 0, 0, 0x8000)).unwrap();
        list.add(0, &midi2_note_on(0, 0, 67, 0, 0, 0x8000)).unwrap();

        kernel.handle_midi_event_list(
            0,
            &MidiEventListEvent {
                event_sample_time: 0,
                cable: 0,
                event_list: EventListData::Owned(list),
            },
        );
        assert_eq!(kernel.current_note(), Some(67));
    }

    #[test]
    fn test_incoming_list_is_echoed_verbatim() {
        let mut kernel = DrumRollKernel::default();
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        let mut list = EventList::new(MidiProtocol::Midi2_0);
        list.add(7, &midi2_note_on(2, 3, 50, 0, 0, 1234)).unwrap();
        list.add(7, &[0x20B3_0140]).unwrap();
        let event = MidiEventListEvent {
            event_sample_time: 300,
            cable: 0,
            event_list: EventListData::Borrowed(list.as_list_ref()),
        };

        kernel.handle_one_event(300, &RenderEvent::MidiEventList(event));

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 300);
        assert_eq!(sent[0].2, list.as_words());
        assert_eq!(kernel.current_note(), Some(50));
    }

    #[test]
    fn test_long_list_is_read_and_echoed_whole() {
        let mut kernel = DrumRollKernel::default();
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        // Unknown protocol id, twelve packets, note-off in the last one
        let mut words = vec![7u32, 12];
        for _ in 0..11 {
            words.extend_from_slice(&[0, 0, 1, 0x20B0_0740]);
        }
        words.extend_from_slice(&[0, 0, 2]);
        words.extend_from_slice(&midi2_note_off(0, 0, 60, 0, 0, 0));
        let event = MidiEventListEvent {
            event_sample_time: 64,
            cable: 0,
            event_list: EventListData::Borrowed(EventListRef::from_words(&words).unwrap()),
        };

        kernel.handle_midi_event_list(64, &event);

        assert_eq!(kernel.current_note(), None);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2, words);
    }

    #[test]
    fn test_bypass_emits_nothing_and_freezes_counter() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        kernel.process(0, 50);
        assert_eq!(kernel.sample_counter(), 50);

        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));
        kernel.set_bypass(true);
        assert!(kernel.is_bypassed());

        kernel.process(50, 4096);

        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(kernel.sample_counter(), 50);
        assert_eq!(kernel.current_note(), Some(60));
    }

    #[test]
    fn test_parameter_get_set() {
        let kernel = DrumRollKernel::default();
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 0.5);
        assert_eq!(kernel.get_parameter(ParameterAddress::Rate.as_raw()), 0.5);
        assert_eq!(kernel.get_parameter(999), 0.0);

        kernel.set_parameter(ParameterAddress::MidiNoteNumber.as_raw(), 38.0);
        assert_eq!(kernel.get_parameter(ParameterAddress::MidiNoteNumber.as_raw()), 38.0);
        assert_eq!(kernel.parameters().next_note_to_send(), 38);
    }

    #[test]
    fn test_parameter_write_does_not_trigger() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.set_parameter(ParameterAddress::SendNote.as_raw(), 1.0);
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 1.0);
        assert!(sent.lock().unwrap().is_empty());

        kernel.process(0, 1);
        assert!(sent.lock().unwrap().is_empty());
        kernel.process(1, 1);
        assert_eq!(notes(&sent).len(), 2);
    }

    #[test]
    fn test_send_without_output_is_noop() {
        let mut kernel = DrumRollKernel::default();
        assert!(!kernel.send_note_on(0, 60, u16::MAX));
        assert!(!kernel.send_note_off(0, 60, 0));
        assert_eq!(kernel.last_sent_note(), 255);

        hold(&mut kernel, 60);
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 1.0);
        kernel.process(0, 128);
        assert_eq!(kernel.current_note(), Some(60));
    }

    #[test]
    fn test_note_on_off_round_trip_through_raw_words() {
        let mut kernel = DrumRollKernel::default();
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        assert!(kernel.send_note_on(512, 42, u16::MAX));
        assert!(kernel.note_is_currently_on());
        assert!(kernel.send_note_off(512, 42, 0));
        assert!(!kernel.note_is_currently_on());
        assert_eq!(kernel.last_sent_note(), 42);

        // Decode by hand rather than through UmpMessage
        let sent = sent.lock().unwrap();
        let decoded: Vec<_> = sent
            .iter()
            .map(|(time, cable, list)| {
                let words = first_packet(list);
                assert_eq!(words.len(), 2);
                let status = (words[0] >> 20) & 0xF;
                let note = (words[0] >> 8) & 0x7F;
                let velocity = words[1] >> 16;
                (*time, *cable, status, note, velocity)
            })
            .collect();

        assert_eq!(decoded, vec![(512, 0, 0x9, 42, 0xFFFF), (512, 0, 0x8, 42, 0)]);
    }

    #[test]
    fn test_output_uses_configured_group_and_channel() {
        let config = KernelConfig::new("Test").with_group(1).with_channel(9).with_retrigger_velocity(1000);
        let mut kernel = DrumRollKernel::new(config);
        kernel.initialize(400.0).unwrap();
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), 0.75);
        hold(&mut kernel, 60);
        let (output, sent) = recording_output();
        kernel.set_midi_output(Some(output));

        kernel.process(0, 102);

        let sent = sent.lock().unwrap();
        let note_on = UmpMessage::from_words(&first_packet(&sent[1].2)).unwrap();
        assert_eq!(note_on.group(), 1);
        assert_eq!(note_on.channel(), 9);
        assert_eq!(
            note_on.note_event(),
            Some(NoteEvent::On(NoteMessage { group: 1, channel: 9, note: 60, velocity: 1000 }))
        );
    }

    #[test]
    fn test_initialize_rejects_bad_sample_rate() {
        let mut kernel = DrumRollKernel::default();
        assert_eq!(kernel.initialize(0.0), Err(KernelError::InvalidSampleRate(0.0)));
        assert!(kernel.initialize(f64::NAN).is_err());
        assert!(!kernel.is_initialized());

        kernel.initialize(96_000.0).unwrap();
        assert!(kernel.is_initialized());
        assert_eq!(kernel.sample_rate(), 96_000.0);
    }

    #[test]
    fn test_reinitialize_clears_note_state() {
        let mut kernel = kernel_with_period_100();
        hold(&mut kernel, 60);
        kernel.process(0, 10);

        kernel.deinitialize();
        assert!(!kernel.is_initialized());
        assert_eq!(kernel.current_note(), None);
        assert_eq!(kernel.sample_counter(), 0);

        kernel.initialize(44_100.0).unwrap();
        assert_eq!(kernel.sample_rate(), 44_100.0);
    }

    #[test]
    fn test_musical_context_is_read_each_process() {
        let mut kernel = DrumRollKernel::default();
        kernel.initialize(48_000.0).unwrap();
        let mut tempo = 100.0;
        let source: Box<dyn MusicalContextSource> = Box::new(move || {
            tempo += 10.0;
            Some(MusicalContext {
                tempo: Some(tempo),
                ..Default::default()
            })
        });
        kernel.set_musical_context_source(Some(source));
        assert_eq!(kernel.musical_context(), None);

        kernel.process(0, 64);
        assert_eq!(kernel.musical_context().and_then(|c| c.tempo), Some(110.0));
        kernel.process(64, 64);
        assert_eq!(kernel.musical_context().and_then(|c| c.tempo), Some(120.0));
    }

    #[test]
    fn test_protocol_and_max_frames() {
        let mut kernel = DrumRollKernel::default();
        assert_eq!(kernel.midi_protocol(), MidiProtocol::Midi2_0);
        assert_eq!(kernel.maximum_frames_to_render(), 1024);
        kernel.set_maximum_frames_to_render(4096);
        assert_eq!(kernel.maximum_frames_to_render(), 4096);
    }
}
