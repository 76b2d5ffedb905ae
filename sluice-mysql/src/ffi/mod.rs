//! Native client backed by libmysqlclient.
mod cbox;
mod connection;
mod statement;

pub(crate) use cbox::*;
pub use connection::*;
pub use statement::*;

use crate::{Diagnostic, MySqlDriver};
use std::ffi::{CStr, c_char, c_uint};

/// Driver opening sessions through libmysqlclient.
pub type ClientDriver = MySqlDriver<ClientConnection>;

/// Copy the error reported by a handle.
///
/// # Safety
/// `message` must be null or point to a nul terminated string.
pub(crate) unsafe fn read_diagnostic(code: c_uint, message: *const c_char) -> Diagnostic {
    let message = if message.is_null() {
        Vec::new()
    } else {
        unsafe { CStr::from_ptr(message) }.to_bytes().to_vec()
    };
    Diagnostic::new(code, message)
}
