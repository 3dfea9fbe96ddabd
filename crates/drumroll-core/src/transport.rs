//! Host musical context.
//!
//! The host may offer tempo and position information. The kernel reads it
//! once per processed segment when a source is registered and keeps the last
//! reading for inspection; the retrigger clock itself is free-running and never
//! depends on it.

/// Snapshot of the host's musical context.
///
/// Every field is optional because hosts fill in different subsets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MusicalContext {
    /// Current tempo in BPM.
    pub tempo: Option<f64>,
    /// Time signature numerator.
    pub time_sig_numerator: Option<f64>,
    /// Time signature denominator.
    pub time_sig_denominator: Option<i64>,
    /// Current beat position in quarter notes.
    pub current_beat_position: Option<f64>,
    /// Samples from the start of the buffer to the next beat.
    pub sample_offset_to_next_beat: Option<i64>,
    /// Beat position of the current measure's downbeat.
    pub current_measure_downbeat_position: Option<f64>,
}

impl MusicalContext {
    /// Length of one beat in samples at the given sample rate, if the tempo
    /// is known.
    #[inline]
    pub fn samples_per_beat(&self, sample_rate: f64) -> Option<f64> {
        self.tempo
            .filter(|tempo| *tempo > 0.0)
            .map(|tempo| sample_rate * 60.0 / tempo)
    }
}

/// Something that can answer musical-context queries on the render thread.
pub trait MusicalContextSource: Send {
    /// Query the host. `None` if the host could not answer.
    fn musical_context(&mut self) -> Option<MusicalContext>;
}

impl<F> MusicalContextSource for F
where
    F: FnMut() -> Option<MusicalContext> + Send,
{
    #[inline]
    fn musical_context(&mut self) -> Option<MusicalContext> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_beat() {
        let context = MusicalContext {
            tempo: Some(120.0),
            ..Default::default()
        };
        assert_eq!(context.samples_per_beat(48_000.0), Some(24_000.0));
        assert_eq!(MusicalContext::default().samples_per_beat(48_000.0), None);
    }
}
