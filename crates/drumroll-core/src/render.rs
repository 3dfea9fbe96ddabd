//! Block rendering with interleaved events.
//!
//! A render call carries a time-ordered event stream. The block is cut at
//! each event's sample time: frames before the event are processed first,
//! then every event due at or before `now` is handled, then processing
//! resumes. Output timestamps therefore never go backwards within a block.
//!
//! ```text
//! timestamp                                             timestamp + frames
//! |---- process ----|E1|---- process ----|E2 E3|---- process ----|
//! ```

use crate::events::RenderEvent;
use crate::kernel::DrumRollKernel;
use crate::types::{FrameCount, SampleTime};

/// Render one block, dispatching `events` at their sample times.
///
/// Events are expected in non-decreasing time order, as hosts deliver them.
/// Late events (before `timestamp`) are handled at the start of the block;
/// events past the end of the block are handled after the last frame.
/// A bypassed kernel handles nothing and renders nothing.
pub fn process_with_events<'a, I>(
    kernel: &mut DrumRollKernel,
    timestamp: SampleTime,
    frame_count: FrameCount,
    events: I,
) where
    I: IntoIterator<Item = RenderEvent<'a>>,
{
    if kernel.is_bypassed() {
        return;
    }

    let mut events = events.into_iter().peekable();
    let mut now = timestamp;
    let mut frames_remaining = frame_count;

    while frames_remaining > 0 {
        let Some(next) = events.peek() else {
            kernel.process(now, frames_remaining);
            return;
        };

        let frames_this_segment = (next.sample_time() - now)
            .clamp(0, SampleTime::from(frames_remaining)) as FrameCount;
        if frames_this_segment > 0 {
            kernel.process(now, frames_this_segment);
            frames_remaining -= frames_this_segment;
            now += SampleTime::from(frames_this_segment);
        }

        while let Some(event) = events.next_if(|event| event.sample_time() <= now) {
            kernel.handle_one_event(now, &event);
        }
    }

    for event in events {
        kernel.handle_one_event(now, &event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_list::{EventList, EventListRef, MidiProtocol};
    use crate::output::MidiOutput;
    use crate::parameters::ParameterAddress;
    use crate::ump::{midi2_note_off, midi2_note_on, NoteEvent};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(SampleTime, NoteEvent)>>>;

    fn kernel_with_log(rate: f32) -> (DrumRollKernel, Log) {
        let mut kernel = DrumRollKernel::default();
        kernel.initialize(400.0).unwrap();
        kernel.set_parameter(ParameterAddress::Rate.as_raw(), rate);

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let output: Box<dyn MidiOutput> = Box::new(move |time: SampleTime, _cable: u8, list: EventListRef<'_>| {
            let mut log = sink.lock().unwrap();
            for (_, message) in list.messages() {
                if let Some(event) = message.note_event() {
                    log.push((time, event));
                }
            }
        });
        kernel.set_midi_output(Some(output));
        (kernel, log)
    }

    fn note_on(time: SampleTime, note: u8) -> RenderEvent<'static> {
        let words = midi2_note_on(0, 0, note, 0, 0, 0x8000);
        RenderEvent::midi(time, EventList::single(MidiProtocol::Midi2_0, 0, &words).unwrap())
    }

    fn note_off(time: SampleTime, note: u8) -> RenderEvent<'static> {
        let words = midi2_note_off(0, 0, note, 0, 0, 0);
        RenderEvent::midi(time, EventList::single(MidiProtocol::Midi2_0, 0, &words).unwrap())
    }

    fn times(log: &Log) -> Vec<SampleTime> {
        log.lock().unwrap().iter().map(|(time, _)| *time).collect()
    }

    #[test]
    fn test_output_timestamps_are_non_decreasing() {
        // period 100 at 400 Hz
        let (mut kernel, log) = kernel_with_log(0.75);

        process_with_events(
            &mut kernel,
            0,
            512,
            vec![note_on(10, 60), note_off(300, 60), note_on(320, 62)],
        );

        let times = times(&log);
        assert!(times.windows(2).all(|pair| pair[0] <= pair[1]), "{times:?}");
        assert_eq!(kernel.current_note(), Some(62));
    }

    #[test]
    fn test_note_on_mid_block_starts_counting_at_event() {
        let (mut kernel, log) = kernel_with_log(0.75);

        process_with_events(&mut kernel, 1000, 200, vec![note_on(1050, 60)]);

        // Echo at 1050, then retrigger 101 frames later.
        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], (1050, NoteEvent::On(n)) if n.velocity == 0x8000));
        assert!(matches!(events[1], (1151, NoteEvent::Off(_))));
        assert!(matches!(events[2], (1151, NoteEvent::On(n)) if n.velocity == u16::MAX));
    }

    #[test]
    fn test_note_off_mid_block_stops_retriggers() {
        let (mut kernel, log) = kernel_with_log(1.0);

        process_with_events(&mut kernel, 0, 64, vec![note_on(0, 60), note_off(4, 60)]);

        // Echo at 0, retriggers at frames 1, 2, 3, echo of note-off at 4.
        assert_eq!(times(&log), vec![0, 1, 1, 2, 2, 3, 3, 4]);
        assert_eq!(kernel.current_note(), None);
        assert_eq!(kernel.sample_counter(), 0);
    }

    #[test]
    fn test_simultaneous_events_handled_in_order() {
        let (mut kernel, _log) = kernel_with_log(0.0);

        process_with_events(
            &mut kernel,
            0,
            16,
            vec![note_on(8, 60), note_off(8, 60), note_on(8, 67)],
        );

        assert_eq!(kernel.current_note(), Some(67));
    }

    #[test]
    fn test_late_and_early_events() {
        let (mut kernel, log) = kernel_with_log(0.0);

        process_with_events(&mut kernel, 100, 16, vec![note_on(90, 60), note_on(500, 61)]);

        assert_eq!(times(&log), vec![100, 116]);
        assert_eq!(kernel.current_note(), Some(61));
    }

    #[test]
    fn test_bypass_skips_events() {
        let (mut kernel, log) = kernel_with_log(1.0);
        kernel.set_bypass(true);

        process_with_events(&mut kernel, 0, 64, vec![note_on(0, 60)]);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(kernel.current_note(), None);
    }

    #[test]
    fn test_parameter_events_are_routed_without_effect() {
        let (mut kernel, log) = kernel_with_log(0.0);

        process_with_events(
            &mut kernel,
            0,
            32,
            vec![RenderEvent::parameter(4, ParameterAddress::Rate.as_raw(), 1.0)],
        );

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(kernel.get_parameter(ParameterAddress::Rate.as_raw()), 0.0);
    }

    #[test]
    fn test_empty_block() {
        let (mut kernel, log) = kernel_with_log(1.0);
        process_with_events(&mut kernel, 0, 0, vec![note_on(0, 60)]);

        // Event still handled; no frames rendered.
        assert_eq!(times(&log), vec![0]);
        assert_eq!(kernel.sample_counter(), 0);
    }
}
