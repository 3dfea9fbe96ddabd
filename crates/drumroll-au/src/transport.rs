//! Musical context from the host's `AUHostMusicalContextBlock`.

use std::ffi::c_void;

use drumroll_core::{MusicalContext, MusicalContextSource};

use crate::objc_block::BlockPtr;

/// `AUHostMusicalContextBlock` invoke signature (block pointer first).
type MusicalContextBlockFn = unsafe extern "C" fn(
    *const c_void, // block
    *mut f64,      // outCurrentTempo
    *mut f64,      // outTimeSignatureNumerator
    *mut isize,    // outTimeSignatureDenominator (NSInteger)
    *mut f64,      // outCurrentBeatPosition
    *mut isize,    // outSampleOffsetToNextBeat (NSInteger)
    *mut f64,      // outCurrentMeasureDownbeatPosition
) -> i32;          // OSStatus

/// [`MusicalContextSource`] backed by the host block.
#[derive(Debug)]
pub struct BlockMusicalContext {
    block: BlockPtr,
}

impl BlockMusicalContext {
    /// Wrap the host's musical context block. Returns `None` for null.
    ///
    /// # Safety
    /// A non-null `block` must be a valid `AUHostMusicalContextBlock` that
    /// stays alive for as long as this value exists.
    pub unsafe fn from_raw(block: *const c_void) -> Option<Self> {
        BlockPtr::new(block).map(|block| Self { block })
    }
}

impl MusicalContextSource for BlockMusicalContext {
    fn musical_context(&mut self) -> Option<MusicalContext> {
        let mut tempo = 0.0;
        let mut time_sig_numerator = 0.0;
        let mut time_sig_denominator: isize = 0;
        let mut beat_position = 0.0;
        let mut sample_offset_to_next_beat: isize = 0;
        let mut measure_downbeat_position = 0.0;

        // SAFETY: `from_raw` requires a live AUHostMusicalContextBlock.
        let status = unsafe {
            let block_fn: MusicalContextBlockFn = std::mem::transmute(self.block.invoke());
            block_fn(
                self.block.as_ptr(),
                &mut tempo,
                &mut time_sig_numerator,
                &mut time_sig_denominator,
                &mut beat_position,
                &mut sample_offset_to_next_beat,
                &mut measure_downbeat_position,
            )
        };
        if status != 0 {
            return None;
        }

        Some(MusicalContext {
            tempo: (tempo > 0.0).then_some(tempo),
            time_sig_numerator: (time_sig_numerator > 0.0).then_some(time_sig_numerator),
            time_sig_denominator: (time_sig_denominator > 0).then_some(time_sig_denominator as i64),
            current_beat_position: Some(beat_position),
            sample_offset_to_next_beat: Some(sample_offset_to_next_beat as i64),
            current_measure_downbeat_position: Some(measure_downbeat_position),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objc_block::{test_block, ObjCBlockLiteral};

    unsafe extern "C" fn host_context(
        _block: *const c_void,
        tempo: *mut f64,
        numerator: *mut f64,
        denominator: *mut isize,
        beat: *mut f64,
        offset: *mut isize,
        downbeat: *mut f64,
    ) -> i32 {
        *tempo = 128.0;
        *numerator = 7.0;
        *denominator = 8;
        *beat = 14.5;
        *offset = 120;
        *downbeat = 14.0;
        0
    }

    unsafe extern "C" fn failing_context(
        _block: *const c_void,
        _: *mut f64,
        _: *mut f64,
        _: *mut isize,
        _: *mut f64,
        _: *mut isize,
        _: *mut f64,
    ) -> i32 {
        -1
    }

    fn source(literal: &ObjCBlockLiteral) -> BlockMusicalContext {
        unsafe { BlockMusicalContext::from_raw(literal as *const ObjCBlockLiteral as *const c_void) }.unwrap()
    }

    #[test]
    fn test_reads_host_values() {
        let literal = test_block(host_context as *const c_void);
        let context = source(&literal).musical_context().unwrap();

        assert_eq!(context.tempo, Some(128.0));
        assert_eq!(context.time_sig_numerator, Some(7.0));
        assert_eq!(context.time_sig_denominator, Some(8));
        assert_eq!(context.current_beat_position, Some(14.5));
        assert_eq!(context.sample_offset_to_next_beat, Some(120));
        assert_eq!(context.current_measure_downbeat_position, Some(14.0));
    }

    #[test]
    fn test_failed_query() {
        let literal = test_block(failing_context as *const c_void);
        assert_eq!(source(&literal).musical_context(), None);
    }

    #[test]
    fn test_null_block() {
        assert!(unsafe { BlockMusicalContext::from_raw(std::ptr::null()) }.is_none());
    }
}
