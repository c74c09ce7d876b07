//! C-ABI Foreign Function Interface for slidemark.
//!
//! Exposes the streaming parser as an opaque handle so that hosts written in
//! C, C++, C#, Python or any language with C FFI support can feed generated
//! markup and read back slides as JSON.
//!
//! # Memory Management
//!
//! All strings returned by this library must be freed using
//! `slidemark_free_string`. Parser handles must be freed using
//! `slidemark_parser_free`.
//!
//! # Error Handling
//!
//! Functions returning a pointer return null on error; functions returning
//! `int` return -1. Use `slidemark_last_error` to retrieve the message.
//!
//! # Example (C)
//!
//! ```c
//! #include <stdio.h>
//! #include "slidemark.h"
//!
//! int main() {
//!     SlidemarkParser* parser = slidemark_parser_new();
//!     slidemark_parser_ingest(parser, "<SECTION><H1>Hello</H1>");
//!     slidemark_parser_finalize(parser);
//!
//!     char* json = slidemark_parser_slides_json(parser, SLIDEMARK_JSON_COMPACT);
//!     if (json) {
//!         printf("%s\n", json);
//!         slidemark_free_string(json);
//!     } else {
//!         fprintf(stderr, "Error: %s\n", slidemark_last_error());
//!     }
//!
//!     slidemark_parser_free(parser);
//!     return 0;
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::parser::SlideParser;
use crate::render::{slides_to_json, JsonFormat};

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Opaque handle to a streaming parser.
pub struct SlidemarkParser {
    inner: SlideParser,
}

/// JSON format options.
pub const SLIDEMARK_JSON_PRETTY: c_int = 0;
pub const SLIDEMARK_JSON_COMPACT: c_int = 1;

/// Get the version of the library.
///
/// # Safety
///
/// Returns a static string that must not be freed.
#[no_mangle]
pub extern "C" fn slidemark_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Get the last error message.
///
/// # Safety
///
/// Returns a pointer to a thread-local error string. The pointer is valid
/// until the next call to any slidemark function on the same thread.
#[no_mangle]
pub extern "C" fn slidemark_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Create a parser with default options.
///
/// The returned handle must be freed with `slidemark_parser_free`.
#[no_mangle]
pub extern "C" fn slidemark_parser_new() -> *mut SlidemarkParser {
    clear_last_error();
    Box::into_raw(Box::new(SlidemarkParser {
        inner: SlideParser::new(),
    }))
}

/// Run `f` on the parser behind `parser`, mapping failures to -1.
unsafe fn with_parser(
    parser: *mut SlidemarkParser,
    f: impl FnOnce(&mut SlideParser) -> Result<(), String>,
) -> c_int {
    clear_last_error();

    if parser.is_null() {
        set_last_error("parser is null");
        return -1;
    }

    let handle = &mut *parser;
    match catch_unwind(AssertUnwindSafe(|| f(&mut handle.inner))) {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            set_last_error(&e);
            -1
        }
        Err(_) => {
            set_last_error("panic occurred in parser");
            -1
        }
    }
}

/// Feed markup text to the parser.
///
/// # Safety
///
/// - `parser` must be a valid handle from `slidemark_parser_new`.
/// - `text` must be a valid null-terminated string; it must be UTF-8.
/// - Returns 0 on success, -1 on error (parser state is then unchanged).
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_ingest(
    parser: *mut SlidemarkParser,
    text: *const c_char,
) -> c_int {
    if text.is_null() {
        set_last_error("text is null");
        return -1;
    }
    let bytes = CStr::from_ptr(text).to_bytes();
    with_parser(parser, |p| p.ingest_bytes(bytes).map_err(|e| e.to_string()))
}

/// Force-close all open elements.
///
/// # Safety
///
/// - `parser` must be a valid handle from `slidemark_parser_new`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_finalize(parser: *mut SlidemarkParser) -> c_int {
    with_parser(parser, |p| {
        p.finalize();
        Ok(())
    })
}

/// Clear all parser state.
///
/// # Safety
///
/// - `parser` must be a valid handle from `slidemark_parser_new`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_reset(parser: *mut SlidemarkParser) -> c_int {
    with_parser(parser, |p| {
        p.reset();
        Ok(())
    })
}

/// Get the number of closed slides.
///
/// # Safety
///
/// - `parser` must be a valid handle from `slidemark_parser_new`.
/// - Returns -1 on error.
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_slide_count(parser: *const SlidemarkParser) -> c_int {
    if parser.is_null() {
        set_last_error("parser is null");
        return -1;
    }

    match catch_unwind(AssertUnwindSafe(|| (*parser).inner.all_slides().len())) {
        Ok(count) => c_int::try_from(count).unwrap_or(c_int::MAX),
        Err(_) => {
            set_last_error("panic occurred");
            -1
        }
    }
}

/// Serialize the closed slides as a JSON array.
///
/// # Safety
///
/// - `parser` must be a valid handle from `slidemark_parser_new`.
/// - `format` is one of `SLIDEMARK_JSON_PRETTY` or `SLIDEMARK_JSON_COMPACT`.
/// - Returns null on error. Use `slidemark_last_error` to get the error message.
/// - The returned string must be freed with `slidemark_free_string`.
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_slides_json(
    parser: *const SlidemarkParser,
    format: c_int,
) -> *mut c_char {
    clear_last_error();

    if parser.is_null() {
        set_last_error("parser is null");
        return ptr::null_mut();
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let json_format = if format == SLIDEMARK_JSON_COMPACT {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        slides_to_json((*parser).inner.all_slides(), json_format).map_err(|e| e.to_string())
    }));

    match result {
        Ok(Ok(json)) => match CString::new(json) {
            Ok(s) => s.into_raw(),
            Err(_) => {
                set_last_error("output contains null byte");
                ptr::null_mut()
            }
        },
        Ok(Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic occurred during serialization");
            ptr::null_mut()
        }
    }
}

/// Free a parser handle.
///
/// # Safety
///
/// - `parser` must be a handle returned by `slidemark_parser_new`, or null.
/// - After calling this function, the handle is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn slidemark_parser_free(parser: *mut SlidemarkParser) {
    if !parser.is_null() {
        drop(Box::from_raw(parser));
    }
}

/// Free a string allocated by this library.
///
/// # Safety
///
/// - `s` must be a pointer returned by a slidemark function, or null.
/// - After calling this function, the pointer is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn slidemark_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_error() -> String {
        let err = slidemark_last_error();
        assert!(!err.is_null());
        unsafe { CStr::from_ptr(err) }.to_str().unwrap().to_string()
    }

    #[test]
    fn test_version() {
        let version = slidemark_version();
        assert!(!version.is_null());
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_streaming_roundtrip() {
        let parser = slidemark_parser_new();
        let partial = CString::new("<SECTION><H1>One</H1></SECTION><SECTION><H1>Tw").unwrap();
        unsafe {
            assert_eq!(slidemark_parser_ingest(parser, partial.as_ptr()), 0);
            assert_eq!(slidemark_parser_slide_count(parser), 1);

            assert_eq!(slidemark_parser_finalize(parser), 0);
            assert_eq!(slidemark_parser_slide_count(parser), 2);

            let json = slidemark_parser_slides_json(parser, SLIDEMARK_JSON_COMPACT);
            assert!(!json.is_null());
            let text = CStr::from_ptr(json).to_str().unwrap().to_string();
            slidemark_free_string(json);
            assert!(text.starts_with(r#"[{"id":"slide-1""#));
            assert!(text.contains(r#""text":"Tw""#));

            assert_eq!(slidemark_parser_reset(parser), 0);
            assert_eq!(slidemark_parser_slide_count(parser), 0);
            slidemark_parser_free(parser);
        }
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let parser = slidemark_parser_new();
        let bad = CString::new(vec![b'<', 0xff, b'>']).unwrap();
        unsafe {
            assert_eq!(slidemark_parser_ingest(parser, bad.as_ptr()), -1);
            assert!(last_error().starts_with("Malformed input"));
            slidemark_parser_free(parser);
        }
    }

    #[test]
    fn test_null_parser_operations() {
        unsafe {
            let text = CString::new("<SECTION>").unwrap();
            assert_eq!(slidemark_parser_ingest(ptr::null_mut(), text.as_ptr()), -1);
            assert_eq!(last_error(), "parser is null");
            assert_eq!(slidemark_parser_finalize(ptr::null_mut()), -1);
            assert_eq!(slidemark_parser_reset(ptr::null_mut()), -1);
            assert_eq!(slidemark_parser_slide_count(ptr::null()), -1);
            assert!(slidemark_parser_slides_json(ptr::null(), 0).is_null());
        }
    }

    #[test]
    fn test_free_null() {
        // Should not crash
        unsafe {
            slidemark_parser_free(ptr::null_mut());
            slidemark_free_string(ptr::null_mut());
        }
    }
}
