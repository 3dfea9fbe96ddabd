//! Minimal helpers for calling Objective-C blocks from Rust.
//!
//! The host hands its callbacks over as block objects (`*const c_void`). The
//! object itself is not callable: its header holds an `invoke` function
//! pointer that takes the block as an implicit first argument.

use std::ffi::c_void;

/// Block object header layout.
#[repr(C)]
pub(crate) struct ObjCBlockLiteral {
    _isa: *const c_void,
    _flags: u32,
    _reserved: u32,
    invoke: *const c_void,
    _descriptor: *const c_void,
}

/// Extract the block's invoke function pointer.
///
/// # Safety
/// `block` must be a valid Objective-C block object pointer.
#[inline]
pub(crate) unsafe fn invoke_ptr(block: *const c_void) -> *const c_void {
    (*(block as *const ObjCBlockLiteral)).invoke
}

/// Non-null host block pointer that can travel to the render thread.
///
/// The host retains the block for as long as render resources are
/// allocated; the pointer is dropped on deallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockPtr(*const c_void);

// SAFETY: host callback blocks are immutable once handed over and are only
// invoked from the render thread.
unsafe impl Send for BlockPtr {}

impl BlockPtr {
    /// Wrap a block pointer. Returns `None` for null.
    #[inline]
    pub(crate) fn new(block: *const c_void) -> Option<Self> {
        if block.is_null() {
            None
        } else {
            Some(Self(block))
        }
    }

    #[inline]
    pub(crate) fn as_ptr(self) -> *const c_void {
        self.0
    }

    /// The block's invoke function pointer.
    ///
    /// # Safety
    /// The wrapped pointer must still refer to a live block.
    #[inline]
    pub(crate) unsafe fn invoke(self) -> *const c_void {
        invoke_ptr(self.0)
    }
}

/// Block literal around a plain `extern "C"` function, standing in for a
/// host-provided block in tests.
#[cfg(test)]
pub(crate) fn test_block(invoke: *const c_void) -> Box<ObjCBlockLiteral> {
    Box::new(ObjCBlockLiteral {
        _isa: std::ptr::null(),
        _flags: 0,
        _reserved: 0,
        invoke,
        _descriptor: std::ptr::null(),
    })
}
