//! System log sink.
//!
//! Root switching usually runs right before `exec`, so diagnostics go to
//! syslog where they survive the process image being replaced.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::sync::OnceLock;

static IDENT: OnceLock<CString> = OnceLock::new();

/// Opens the system log under `ident` with the `LOG_USER` facility.
///
/// Only the first call sets the identity; later calls reuse it.
pub fn init(ident: &str) {
    let ident = IDENT.get_or_init(|| to_c_string(ident));
    // SAFETY: `ident` lives in a static for the rest of the process, which
    // openlog(3) requires because it keeps the pointer.
    unsafe { libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_USER) };
}

/// Writes `message` at `LOG_ERR`.
pub fn error(message: &str) {
    write(libc::LOG_ERR, message);
}

/// Writes `message` at `LOG_INFO`.
pub fn info(message: &str) {
    write(libc::LOG_INFO, message);
}

fn write(priority: libc::c_int, message: &str) {
    let message = to_c_string(message);
    // SAFETY: the format consumes exactly one argument, a valid
    // NUL-terminated string that outlives the call.
    unsafe { libc::syslog(priority, c"%s".as_ptr(), message.as_ptr()) };
}

/// Escapes interior NUL bytes instead of dropping the message.
fn to_c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "\\0")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_nul_is_escaped() {
        let c = to_c_string("bad\0path");
        assert_eq!(c.to_str().expect("utf8"), "bad\\0path");
    }

    #[test]
    fn writing_before_init_is_harmless() {
        error("rootswitch test: error line");
        info("rootswitch test: info line");
    }
}
