//! Minimal solver module for exercising the native loaders.
//!
//! Exports the descriptor table and the bare symbols. Replies are fixed;
//! a request with `"decimal_precision":0` gets an error reply. The widgets
//! entry point is only reachable through the bare symbol and always fails.

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(not(feature = "stale-abi"))]
const ABI_VERSION: u32 = 1;
#[cfg(feature = "stale-abi")]
const ABI_VERSION: u32 = 0;

const REPORT: &str = r#"{"node_voltage_pairs":[{"nodes":"V18","voltage":1.5}],"branch_currents":[{"branch":"1-2","current":0.75,"direction":"1 → 2"}],"node_voltage_dict":{"1":0.0,"8":-1.5},"branch_dict":{"1-2":0.75}}"#;

static OUTSTANDING: AtomicUsize = AtomicUsize::new(0);

#[repr(C)]
pub struct ModuleDescriptor {
    abi_version: u32,
    run_analysis: unsafe extern "C" fn(*const c_char) -> *mut c_char,
    create_interactive_widgets: Option<unsafe extern "C" fn(*const c_char) -> *mut c_char>,
    free_string: unsafe extern "C" fn(*mut c_char),
}

static DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    abi_version: ABI_VERSION,
    run_analysis: kvlkcl_run_analysis,
    create_interactive_widgets: None,
    free_string: kvlkcl_free_string,
};

fn hand_out(text: &str) -> *mut c_char {
    match CString::new(text) {
        Ok(s) => {
            OUTSTANDING.fetch_add(1, Ordering::SeqCst);
            s.into_raw()
        }
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn kvlkcl_module_descriptor() -> *const ModuleDescriptor {
    &DESCRIPTOR
}

/// # Safety
/// `request` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn kvlkcl_run_analysis(request: *const c_char) -> *mut c_char {
    if request.is_null() {
        return ptr::null_mut();
    }
    let request = CStr::from_ptr(request).to_string_lossy();
    if !request.contains(r#""num_nodes":"#) {
        return hand_out(r#"{"error":"malformed request"}"#);
    }
    if request.contains(r#""decimal_precision":0"#) {
        return hand_out(r#"{"error":"precision must be positive"}"#);
    }
    hand_out(REPORT)
}

/// # Safety
/// `maps` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn kvlkcl_create_interactive_widgets(maps: *const c_char) -> *mut c_char {
    if maps.is_null() {
        return ptr::null_mut();
    }
    hand_out("no display")
}

/// # Safety
/// `s` must come from this library and be released once.
#[no_mangle]
pub unsafe extern "C" fn kvlkcl_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(CString::from_raw(s));
    OUTSTANDING.fetch_sub(1, Ordering::SeqCst);
}

/// Strings handed out and not yet released.
#[no_mangle]
pub extern "C" fn kvlkcl_fixture_outstanding_strings() -> usize {
    OUTSTANDING.load(Ordering::SeqCst)
}
