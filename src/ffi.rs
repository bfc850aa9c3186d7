//! FFI bindings for Synheart Rest
//!
//! This module provides C-compatible functions for calling Rest from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `rest_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ModelConfiguration;
use crate::pipeline::{calculate_bedtime, RestProcessor};

// Thread-local storage for the last error message
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

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a bedtime report from model artifact JSON.
///
/// # Safety
/// - `model_json` and `wake_up` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
/// - Returns NULL on error; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_calculate_bedtime(
    model_json: *const c_char,
    wake_up: *const c_char,
    sleep_amount: f64,
    coffee_amount: u32,
) -> *mut c_char {
    clear_last_error();

    let Some(model_str) = cstr_to_string(model_json) else {
        set_last_error("Invalid model JSON string pointer");
        return ptr::null_mut();
    };

    let Some(wake_str) = cstr_to_string(wake_up) else {
        set_last_error("Invalid wake-up string pointer");
        return ptr::null_mut();
    };

    match calculate_bedtime(model_str, wake_str, sleep_amount, coffee_amount) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a RestProcessor
pub struct RestProcessorHandle {
    processor: RestProcessor,
}

/// Load a model artifact into a new processor.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `rest_processor_free`.
/// - Returns NULL on error; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_processor_new(model_json: *const c_char) -> *mut RestProcessorHandle {
    clear_last_error();

    let Some(model_str) = cstr_to_string(model_json) else {
        set_last_error("Invalid model JSON string pointer");
        return ptr::null_mut();
    };

    match RestProcessor::from_json(&model_str, &ModelConfiguration::default()) {
        Ok(processor) => Box::into_raw(Box::new(RestProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a RestProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `rest_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rest_processor_free(processor: *mut RestProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Compute a bedtime report with a loaded processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `rest_processor_new`.
/// - `wake_up` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
/// - Returns NULL on error; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_processor_calculate(
    processor: *const RestProcessorHandle,
    wake_up: *const c_char,
    sleep_amount: f64,
    coffee_amount: u32,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let Some(wake_str) = cstr_to_string(wake_up) else {
        set_last_error("Invalid wake-up string pointer");
        return ptr::null_mut();
    };

    match handle.processor.process(&wake_str, sleep_amount, coffee_amount) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Rest functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Rest function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rest_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Rest function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn rest_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Rest library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn rest_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
