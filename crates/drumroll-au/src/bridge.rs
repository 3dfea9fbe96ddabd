//! Bridge between the host-facing Audio Unit wrapper and the kernel.
//!
//! ```text
//! AU Host
//!    ↓
//! Objective-C AUAudioUnit subclass
//!    ↓ (C-ABI calls)
//! bridge.rs (this module)
//!    ↓
//! DrumRollKernel
//! ```
//!
//! [`AuKernelBridge`] is the Rust-side audio unit: it owns the kernel, wires
//! host blocks into it when render resources are allocated, and translates
//! the render call's event list. The `drumroll_au_*` functions expose it over
//! a C ABI with an opaque handle.
//!
//! # Threads
//!
//! Parameters, bypass, and the property getters never touch the kernel
//! mutex: they read the lock-free parameter store or atomics mirrored on the
//! bridge. Only render-resource allocation and `set_maximum_frames_to_render`
//! lock the kernel, and hosts do not call those while rendering. The render
//! call uses `try_lock` and reports
//! `kAudioUnitErr_CannotDoInCurrentContext` if the lock is held anyway.

// C-ABI entry points validate handles for null; the wrapper owns validity.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use drumroll_core::{
    process_with_events, DrumRollKernel, FrameCount, KernelConfig, KernelParameters, MidiOutput,
    MusicalContextSource, ParameterAddress, ParameterAddressRaw, ParameterInfo, ParameterUnit,
    ParameterValue, SampleTime,
};

use crate::config::AuConfig;
use crate::error::{os_status, AuError, AuResult};
use crate::midi_output::BlockMidiOutput;
use crate::render_event::{AURenderEvent, RenderEvents};
use crate::transport::BlockMusicalContext;

/// Largest frame count accepted from the host as a render hint.
const MAX_FRAMES_PER_RENDER: FrameCount = 8192;

// =============================================================================
// Bridge
// =============================================================================

/// Rust side of the audio unit.
pub struct AuKernelBridge {
    au_config: AuConfig,
    parameters: Arc<KernelParameters>,
    kernel: Mutex<DrumRollKernel>,
    /// Mirrors of kernel state for the control thread.
    max_frames_to_render: AtomicU32,
    allocated: AtomicBool,
}

impl std::fmt::Debug for AuKernelBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuKernelBridge")
            .field("au_config", &self.au_config)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Default for AuKernelBridge {
    fn default() -> Self {
        Self::new(KernelConfig::DEFAULT, AuConfig::DRUM_ROLL_MACHINE)
    }
}

impl AuKernelBridge {
    /// Create the bridge and seed every parameter with its tree default.
    pub fn new(kernel_config: KernelConfig, au_config: AuConfig) -> Self {
        let kernel = DrumRollKernel::new(kernel_config);
        let parameters = kernel.parameters();
        for address in ParameterAddress::ALL {
            parameters.set_typed(address, address.info().default);
        }
        Self {
            au_config,
            parameters,
            max_frames_to_render: AtomicU32::new(kernel.maximum_frames_to_render()),
            allocated: AtomicBool::new(false),
            kernel: Mutex::new(kernel),
        }
    }

    /// AU registration metadata.
    pub fn au_config(&self) -> &AuConfig {
        &self.au_config
    }

    fn lock_kernel(&self) -> AuResult<MutexGuard<'_, DrumRollKernel>> {
        self.kernel
            .lock()
            .map_err(|_| AuError::InvalidState("kernel mutex poisoned".to_string()))
    }

    #[cfg(test)]
    fn with_kernel<R>(&self, f: impl FnOnce(&mut DrumRollKernel) -> R) -> AuResult<R> {
        let mut kernel = self.lock_kernel()?;
        Ok(f(&mut kernel))
    }

    // =========================================================================
    // Render Resources
    // =========================================================================

    /// Initialize the kernel and register the host's blocks.
    ///
    /// Null blocks are allowed: without a MIDI output block nothing is
    /// emitted, without a musical context block none is read.
    ///
    /// # Safety
    /// Non-null blocks must be a valid `AUMIDIEventListBlock` and
    /// `AUHostMusicalContextBlock` respectively, and must stay alive until
    /// [`deallocate_render_resources`](Self::deallocate_render_resources).
    pub unsafe fn allocate_render_resources(
        &self,
        sample_rate: f64,
        max_frames: FrameCount,
        midi_output_event_list_block: *const c_void,
        musical_context_block: *const c_void,
    ) -> AuResult<()> {
        if max_frames == 0 || max_frames > MAX_FRAMES_PER_RENDER {
            return Err(AuError::InvalidConfiguration(format!(
                "max_frames {} (must be > 0 and <= {})",
                max_frames, MAX_FRAMES_PER_RENDER
            )));
        }

        let mut kernel = self.lock_kernel()?;
        self.allocated.store(false, Ordering::Release);
        kernel.initialize(sample_rate)?;
        kernel.set_maximum_frames_to_render(max_frames);
        self.max_frames_to_render.store(max_frames, Ordering::Relaxed);

        let midi_output = if self.au_config.component_type.supports_midi_output() {
            BlockMidiOutput::from_raw(midi_output_event_list_block)
        } else {
            None
        };
        let musical_context = BlockMusicalContext::from_raw(musical_context_block);
        log::debug!(
            "Host blocks: midi_output={}, musical_context={}",
            midi_output.is_some(),
            musical_context.is_some()
        );
        if midi_output.is_none() && self.au_config.component_type.supports_midi_output() {
            log::warn!("Host provided no MIDI output block; retriggers will not be sent");
        }

        kernel.set_midi_output(midi_output.map(|output| Box::new(output) as Box<dyn MidiOutput>));
        kernel.set_musical_context_source(
            musical_context.map(|source| Box::new(source) as Box<dyn MusicalContextSource>),
        );

        log::debug!(
            "{} render resources allocated: sample_rate={}, max_frames={}",
            kernel.config().name,
            sample_rate,
            max_frames
        );
        self.allocated.store(true, Ordering::Release);
        Ok(())
    }

    /// Drop the host's blocks and deinitialize the kernel.
    pub fn deallocate_render_resources(&self) -> AuResult<()> {
        let mut kernel = self.lock_kernel()?;
        self.allocated.store(false, Ordering::Release);
        kernel.set_midi_output(None);
        kernel.set_musical_context_source(None);
        kernel.deinitialize();
        Ok(())
    }

    /// True between allocate and deallocate.
    pub fn render_resources_allocated(&self) -> bool {
        self.allocated.load(Ordering::Acquire)
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Render one block.
    ///
    /// Returns `K_AUDIO_UNIT_ERR_UNINITIALIZED` before render resources are
    /// allocated, `K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT` if another
    /// thread holds the kernel, and `NO_ERR` otherwise.
    ///
    /// # Safety
    /// `event_head` must be null or the head of a valid render event list
    /// that stays alive for the duration of the call.
    pub unsafe fn render(
        &self,
        sample_time: f64,
        frame_count: FrameCount,
        event_head: *const AURenderEvent,
    ) -> i32 {
        let mut kernel = match self.kernel.try_lock() {
            Ok(guard) => guard,
            Err(_) => return os_status::K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT,
        };
        if !kernel.is_initialized() {
            return os_status::K_AUDIO_UNIT_ERR_UNINITIALIZED;
        }

        process_with_events(
            &mut kernel,
            sample_time as SampleTime,
            frame_count,
            RenderEvents::new(event_head),
        );
        os_status::NO_ERR
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Parameter tree metadata, in address order.
    pub fn parameter_infos(&self) -> impl Iterator<Item = &'static ParameterInfo> {
        ParameterAddress::ALL.into_iter().map(ParameterAddress::info)
    }

    /// Set a parameter from the host, clamped to its range. Unknown
    /// addresses are ignored.
    pub fn set_parameter(&self, address: ParameterAddressRaw, value: ParameterValue) {
        if let Some(address) = ParameterAddress::from_raw(address) {
            self.parameters.set_typed(address, address.info().clamp(value));
        }
    }

    /// Read a parameter for the host. Unknown addresses read as 0.
    pub fn get_parameter(&self, address: ParameterAddressRaw) -> ParameterValue {
        self.parameters.get(address)
    }

    /// Lock-free parameter store.
    pub fn parameters(&self) -> &Arc<KernelParameters> {
        &self.parameters
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// `shouldBypassEffect`.
    pub fn should_bypass_effect(&self) -> bool {
        self.parameters.is_bypassed()
    }

    /// Set `shouldBypassEffect`.
    pub fn set_should_bypass_effect(&self, bypass: bool) {
        self.parameters.set_bypass(bypass);
    }

    /// `AudioUnitMIDIProtocol` (a `MIDIProtocolID`).
    pub fn audio_unit_midi_protocol(&self) -> i32 {
        DrumRollKernel::MIDI_PROTOCOL as i32
    }

    /// `maximumFramesToRender`.
    pub fn maximum_frames_to_render(&self) -> FrameCount {
        self.max_frames_to_render.load(Ordering::Relaxed)
    }

    /// Set `maximumFramesToRender`. Only allowed while render resources are
    /// not allocated.
    pub fn set_maximum_frames_to_render(&self, max_frames: FrameCount) -> AuResult<()> {
        if self.render_resources_allocated() {
            return Err(AuError::InvalidState(
                "maximumFramesToRender changed while render resources are allocated".to_string(),
            ));
        }
        let mut kernel = self.lock_kernel()?;
        kernel.set_maximum_frames_to_render(max_frames);
        self.max_frames_to_render.store(max_frames, Ordering::Relaxed);
        Ok(())
    }
}

// =============================================================================
// C-ABI
// =============================================================================

/// Opaque instance handle passed to the Objective-C wrapper.
pub type DrumRollAuInstanceHandle = *mut AuKernelBridge;

/// Maximum length of parameter identifier/name strings, including the NUL.
pub const DRUMROLL_AU_MAX_PARAM_NAME_LENGTH: usize = 64;

/// `kAudioUnitParameterFlag_IsReadable`
const PARAMETER_FLAG_IS_READABLE: u32 = 1 << 30;
/// `kAudioUnitParameterFlag_IsWritable`
const PARAMETER_FLAG_IS_WRITABLE: u32 = 1 << 31;

/// Parameter metadata in C layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrumRollAuParameterInfo {
    /// Parameter address
    pub address: u64,
    /// NUL-terminated identifier
    pub identifier: [c_char; DRUMROLL_AU_MAX_PARAM_NAME_LENGTH],
    /// NUL-terminated display name
    pub name: [c_char; DRUMROLL_AU_MAX_PARAM_NAME_LENGTH],
    /// Minimum value
    pub min_value: f32,
    /// Maximum value
    pub max_value: f32,
    /// Default value
    pub default_value: f32,
    /// `AudioUnitParameterUnit`
    pub unit: u32,
    /// `AudioUnitParameterOptions`
    pub flags: u32,
    /// Snaps back to the minimum after release
    pub is_momentary: bool,
}

/// `AudioUnitParameterUnit` value for a kernel unit.
const fn audio_unit_parameter_unit(unit: ParameterUnit) -> u32 {
    match unit {
        ParameterUnit::Generic => 0,
        ParameterUnit::Boolean => 2,
        ParameterUnit::MidiNoteNumber => 11,
    }
}

fn copy_c_string(dest: &mut [c_char; DRUMROLL_AU_MAX_PARAM_NAME_LENGTH], src: &str) {
    let len = src.len().min(DRUMROLL_AU_MAX_PARAM_NAME_LENGTH - 1);
    for (d, s) in dest.iter_mut().zip(src.as_bytes()[..len].iter()) {
        *d = *s as c_char;
    }
    dest[len] = 0;
}

impl From<&ParameterInfo> for DrumRollAuParameterInfo {
    fn from(info: &ParameterInfo) -> Self {
        let mut c_info = Self {
            address: info.address.as_raw(),
            identifier: [0; DRUMROLL_AU_MAX_PARAM_NAME_LENGTH],
            name: [0; DRUMROLL_AU_MAX_PARAM_NAME_LENGTH],
            min_value: info.min,
            max_value: info.max,
            default_value: info.default,
            unit: audio_unit_parameter_unit(info.unit),
            flags: PARAMETER_FLAG_IS_READABLE | PARAMETER_FLAG_IS_WRITABLE,
            is_momentary: info.is_momentary,
        };
        copy_c_string(&mut c_info.identifier, info.identifier);
        copy_c_string(&mut c_info.name, info.name);
        c_info
    }
}

/// Write the AudioComponentDescription codes (type, subtype, manufacturer).
///
/// # Safety
/// `desc` must be null or point to 3 writable `u32`s.
#[no_mangle]
pub unsafe extern "C" fn drumroll_au_get_component_description(desc: *mut u32) {
    if desc.is_null() {
        return;
    }
    let config = AuConfig::DRUM_ROLL_MACHINE;
    desc.write(config.component_type.as_u32());
    desc.add(1).write(config.subtype.as_u32());
    desc.add(2).write(config.manufacturer.as_u32());
}

/// Create an instance. Returns null on failure.
#[no_mangle]
pub extern "C" fn drumroll_au_create_instance() -> DrumRollAuInstanceHandle {
    catch_unwind(|| Box::into_raw(Box::new(AuKernelBridge::default())))
        .unwrap_or(std::ptr::null_mut())
}

/// Destroy an instance created by `drumroll_au_create_instance`.
#[no_mangle]
pub extern "C" fn drumroll_au_destroy_instance(instance: DrumRollAuInstanceHandle) {
    if instance.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| unsafe {
        drop(Box::from_raw(instance));
    }));
}

/// Allocate render resources. See [`AuKernelBridge::allocate_render_resources`].
#[no_mangle]
pub extern "C" fn drumroll_au_allocate_render_resources(
    instance: DrumRollAuInstanceHandle,
    sample_rate: f64,
    max_frames: u32,
    midi_output_event_list_block: *const c_void,
    musical_context_block: *const c_void,
) -> i32 {
    if instance.is_null() {
        return os_status::K_AUDIO_UNIT_ERR_INVALID_PARAMETER;
    }

    let result = catch_unwind(AssertUnwindSafe(|| unsafe {
        (*instance).allocate_render_resources(
            sample_rate,
            max_frames,
            midi_output_event_list_block,
            musical_context_block,
        )
    }));

    match result {
        Ok(Ok(())) => os_status::NO_ERR,
        Ok(Err(e)) => {
            log::error!("Failed to allocate render resources: {}", e);
            e.os_status()
        }
        Err(_) => {
            log::error!("Panic while allocating render resources");
            os_status::K_AUDIO_UNIT_ERR_FAILED_INITIALIZATION
        }
    }
}

/// Deallocate render resources.
#[no_mangle]
pub extern "C" fn drumroll_au_deallocate_render_resources(instance: DrumRollAuInstanceHandle) {
    if instance.is_null() {
        return;
    }
    let result = catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).deallocate_render_resources() }));
    if let Ok(Err(e)) = result {
        log::error!("Failed to deallocate render resources: {}", e);
    }
}

/// Render one block. Called from the render block on the render thread.
#[no_mangle]
pub extern "C" fn drumroll_au_render(
    instance: DrumRollAuInstanceHandle,
    sample_time: f64,
    frame_count: u32,
    event_head: *const AURenderEvent,
) -> i32 {
    if instance.is_null() {
        return os_status::K_AUDIO_UNIT_ERR_UNINITIALIZED;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).render(sample_time, frame_count, event_head) }))
        .unwrap_or(os_status::K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT)
}

/// Number of parameters in the tree.
#[no_mangle]
pub extern "C" fn drumroll_au_get_parameter_count() -> u32 {
    ParameterAddress::ALL.len() as u32
}

/// Fill `info` for the parameter at `index`. Returns false if out of range.
#[no_mangle]
pub extern "C" fn drumroll_au_get_parameter_info(index: u32, info: *mut DrumRollAuParameterInfo) -> bool {
    if info.is_null() {
        return false;
    }
    let Some(address) = ParameterAddress::ALL.get(index as usize) else {
        return false;
    };
    unsafe { info.write(DrumRollAuParameterInfo::from(address.info())) };
    true
}

/// Read a parameter value. Unknown addresses read as 0.
#[no_mangle]
pub extern "C" fn drumroll_au_get_parameter_value(instance: DrumRollAuInstanceHandle, address: u64) -> f32 {
    if instance.is_null() {
        return 0.0;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).get_parameter(address) })).unwrap_or(0.0)
}

/// Write a parameter value. Unknown addresses are ignored. Returns an OSStatus.
#[no_mangle]
pub extern "C" fn drumroll_au_set_parameter_value(
    instance: DrumRollAuInstanceHandle,
    address: u64,
    value: f32,
) -> i32 {
    if instance.is_null() {
        return os_status::K_AUDIO_UNIT_ERR_INVALID_PARAMETER;
    }
    match catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).set_parameter(address, value) })) {
        Ok(()) => os_status::NO_ERR,
        Err(_) => {
            log::error!("Panic while setting parameter {}", address);
            os_status::K_AUDIO_UNIT_ERR_CANNOT_DO_IN_CURRENT_CONTEXT
        }
    }
}

/// Set `shouldBypassEffect`.
#[no_mangle]
pub extern "C" fn drumroll_au_set_bypass(instance: DrumRollAuInstanceHandle, bypass: bool) {
    if instance.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).set_should_bypass_effect(bypass) }));
}

/// `AudioUnitMIDIProtocol`.
#[no_mangle]
pub extern "C" fn drumroll_au_get_midi_protocol(instance: DrumRollAuInstanceHandle) -> i32 {
    if instance.is_null() {
        return DrumRollKernel::MIDI_PROTOCOL as i32;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { (*instance).audio_unit_midi_protocol() }))
        .unwrap_or(DrumRollKernel::MIDI_PROTOCOL as i32)
}
