// ── System message table lookup ───────────────────────────────────────────────
//
// `FormatMessageW` with FORMAT_MESSAGE_ALLOCATE_BUFFER hands back a buffer the
// caller must `LocalFree`.  `LocalBuffer` owns that buffer and frees it on
// drop, so every exit path (no text, bad UTF-16, success) releases it.

#![allow(unsafe_code)]

use windows::{
    core::PWSTR,
    Win32::{
        Foundation::{LocalFree, HLOCAL},
        System::Diagnostics::Debug::{
            FormatMessageW, FORMAT_MESSAGE_ALLOCATE_BUFFER, FORMAT_MESSAGE_FROM_SYSTEM,
            FORMAT_MESSAGE_IGNORE_INSERTS,
        },
    },
};

use crate::hresult::{compose_description, HResult, StatusTranslator};

/// `MAKELANGID(LANG_NEUTRAL, SUBLANG_DEFAULT)`.
const LANG_NEUTRAL_DEFAULT: u32 = 0x0400;

/// Translator backed by the Windows system message table.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MessageTableTranslator;

impl StatusTranslator for MessageTableTranslator {
    fn describe(&self, code: HResult) -> String {
        let text = LocalBuffer::format_system_message(code.bits());
        compose_description(code, text.as_ref().and_then(LocalBuffer::to_utf8).as_deref())
    }
}

// ── Scoped buffer ─────────────────────────────────────────────────────────────

/// A `FormatMessageW`-allocated UTF-16 buffer, released with `LocalFree`.
struct LocalBuffer {
    ptr: PWSTR,
    len: usize,
}

impl LocalBuffer {
    /// Look up `id` in the system message table.
    ///
    /// Returns `None` when the lookup produced no characters.  If the system
    /// allocated a buffer anyway, it is freed before returning.
    fn format_system_message(id: u32) -> Option<Self> {
        let mut ptr = PWSTR::null();

        // SAFETY: With FORMAT_MESSAGE_ALLOCATE_BUFFER, lpBuffer is interpreted
        // as a pointer to a PWSTR that receives a LocalAlloc'd buffer; `&mut ptr`
        // is a valid, writable PWSTR slot for the duration of the call.
        // FORMAT_MESSAGE_IGNORE_INSERTS means `Arguments` is never read.
        let len = unsafe {
            FormatMessageW(
                FORMAT_MESSAGE_ALLOCATE_BUFFER
                    | FORMAT_MESSAGE_FROM_SYSTEM
                    | FORMAT_MESSAGE_IGNORE_INSERTS,
                None,
                id,
                LANG_NEUTRAL_DEFAULT,
                PWSTR(&mut ptr as *mut PWSTR as *mut u16),
                0,
                None,
            )
        };

        // Take ownership first so a zero-length result with a non-null
        // buffer is still released by Drop.
        let buffer = Self {
            ptr,
            len: len as usize,
        };
        if buffer.ptr.is_null() || buffer.len == 0 {
            return None;
        }
        Some(buffer)
    }

    /// Decode the buffer; `None` if it is not valid UTF-16.
    fn to_utf8(&self) -> Option<String> {
        // SAFETY: FormatMessageW reported `len` TCHARs written to `ptr`, and
        // the allocation lives until `self` is dropped.
        let wide = unsafe { std::slice::from_raw_parts(self.ptr.0, self.len) };
        String::from_utf16(wide).ok()
    }
}

impl Drop for LocalBuffer {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: `ptr` was allocated by FormatMessageW via LocalAlloc and is
        // freed exactly once, here.  The returned handle is only non-null on
        // failure, which leaves nothing further to clean up.
        unsafe {
            let _ = LocalFree(HLOCAL(self.ptr.0.cast()));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
