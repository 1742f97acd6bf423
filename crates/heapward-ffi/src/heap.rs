//! Heap lifecycle and the `malloc`/`free`/`calloc` entry points.
//!
//! Every heap lives in the global `HEAPS` table for as long as its handle
//! is valid. Entry points hold the table lock for the whole call, so
//! operations on one heap are serialised.

use std::ffi::{c_char, c_void, CStr};
use std::sync::Mutex;

use heapward_arena::{Heap, HeapConfig};
use heapward_core::{Address, Origin};

use crate::handle::HandleTable;
use crate::status::HwStatus;
use crate::types::{HwCursorPolicy, HwReportingMode, HwStatistics};

static HEAPS: Mutex<HandleTable<Heap>> = Mutex::new(HandleTable::new());

/// Build an [`Origin`] from a C source location. Null `file` becomes `"?"`,
/// negative `line` becomes 0.
#[allow(unsafe_code)]
fn origin_from(file: *const c_char, line: i32) -> Origin {
    let line = u32::try_from(line).unwrap_or(0);
    if file.is_null() {
        return Origin::owned("?".to_owned(), line);
    }
    // SAFETY: file is a valid NUL-terminated string per caller contract.
    let file = unsafe { CStr::from_ptr(file) };
    Origin::owned(file.to_string_lossy().into_owned(), line)
}

/// Create a heap over a freshly mapped arena of `capacity` bytes.
///
/// `reporting_mode` and `cursor_policy` take the raw values of
/// [`HwReportingMode`] and [`HwCursorPolicy`]. On success, writes the heap
/// handle to `heap_out` and returns `HW_STATUS_OK`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_heap_create(
    capacity: usize,
    reporting_mode: i32,
    cursor_policy: i32,
    heap_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if heap_out.is_null() {
            return HwStatus::InvalidArgument as i32;
        }
        let reporting_mode = match HwReportingMode::try_from(reporting_mode) {
            Ok(m) => m,
            Err(status) => return status as i32,
        };
        let cursor_policy = match HwCursorPolicy::try_from(cursor_policy) {
            Ok(p) => p,
            Err(status) => return status as i32,
        };
        let config = HeapConfig::new(capacity)
            .with_reporting_mode(reporting_mode.into())
            .with_cursor_policy(cursor_policy.into());
        let heap = match Heap::new(config) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("hw_heap_create({capacity}) failed: {e}");
                return HwStatus::from(&e) as i32;
            }
        };
        let handle = ffi_lock!(HEAPS).insert(heap);
        // SAFETY: heap_out is valid per caller contract.
        unsafe { *heap_out = handle };
        HwStatus::Ok as i32
    })
}

/// Destroy a heap and unmap its arena. Double-destroy returns
/// `HW_STATUS_INVALID_HANDLE`.
///
/// Pointers handed out by the heap dangle afterwards.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_heap_destroy(heap: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(HEAPS).remove(heap);
        match removed {
            Some(_) => HwStatus::Ok as i32,
            None => HwStatus::InvalidHandle as i32,
        }
    })
}

/// Allocate `sz` bytes. Returns null on failure or for an invalid handle.
///
/// `file` and `line` identify the call site for the leak report.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_malloc(heap: u64, sz: usize, file: *const c_char, line: i32) -> *mut c_void {
    ffi_guard_or!(std::ptr::null_mut(), {
        let origin = origin_from(file, line);
        let mut heaps = ffi_lock!(HEAPS, std::ptr::null_mut());
        let Some(h) = heaps.get_mut(heap) else {
            return std::ptr::null_mut();
        };
        match h.allocate_at(sz, origin) {
            Some(address) => h.as_ptr(address).cast(),
            None => std::ptr::null_mut(),
        }
    })
}

/// Release `ptr`. Null is a no-op returning `HW_STATUS_OK`.
///
/// Returns `HW_STATUS_DOUBLE_FREE` or `HW_STATUS_UNKNOWN_POINTER` for
/// invalid releases (after reporting them per the heap's reporting mode).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_free(heap: u64, ptr: *mut c_void, file: *const c_char, line: i32) -> i32 {
    ffi_guard!({
        let origin = origin_from(file, line);
        let mut heaps = ffi_lock!(HEAPS);
        let Some(h) = heaps.get_mut(heap) else {
            return HwStatus::InvalidHandle as i32;
        };
        let address = (!ptr.is_null()).then(|| Address(ptr as usize));
        match h.release_at(address, origin) {
            Ok(()) => HwStatus::Ok as i32,
            Err(e) => HwStatus::from(&e) as i32,
        }
    })
}

/// Allocate a zero-filled array of `count` elements of `sz` bytes.
///
/// Returns null if `count * sz` overflows, on exhaustion, or for an
/// invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_calloc(
    heap: u64,
    count: usize,
    sz: usize,
    file: *const c_char,
    line: i32,
) -> *mut c_void {
    ffi_guard_or!(std::ptr::null_mut(), {
        let origin = origin_from(file, line);
        let mut heaps = ffi_lock!(HEAPS, std::ptr::null_mut());
        let Some(h) = heaps.get_mut(heap) else {
            return std::ptr::null_mut();
        };
        match h.allocate_zeroed_at(count, sz, origin) {
            Some(address) => h.as_ptr(address).cast(),
            None => std::ptr::null_mut(),
        }
    })
}

/// Copy the heap's statistics into `*stats_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_get_statistics(heap: u64, stats_out: *mut HwStatistics) -> i32 {
    ffi_guard!({
        if stats_out.is_null() {
            return HwStatus::InvalidArgument as i32;
        }
        let heaps = ffi_lock!(HEAPS);
        let Some(h) = heaps.get(heap) else {
            return HwStatus::InvalidHandle as i32;
        };
        let stats = HwStatistics::from(&h.statistics());
        // SAFETY: stats_out is valid per caller contract.
        unsafe { *stats_out = stats };
        HwStatus::Ok as i32
    })
}

/// Print the two-line statistics summary to stdout.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_print_statistics(heap: u64) -> i32 {
    ffi_guard!({
        let heaps = ffi_lock!(HEAPS);
        let Some(h) = heaps.get(heap) else {
            return HwStatus::InvalidHandle as i32;
        };
        h.print_statistics();
        HwStatus::Ok as i32
    })
}

/// Print one `LEAK CHECK` line per still-active allocation to stdout.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hw_print_leak_report(heap: u64) -> i32 {
    ffi_guard!({
        let heaps = ffi_lock!(HEAPS);
        let Some(h) = heaps.get(heap) else {
            return HwStatus::InvalidHandle as i32;
        };
        h.print_leak_report();
        HwStatus::Ok as i32
    })
}
