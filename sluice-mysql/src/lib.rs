mod binder;
mod connection;
mod cursor;
mod driver;
mod error;
#[cfg(feature = "mysqlclient")]
pub mod ffi;
mod native;
mod options;
mod prepared;

pub use binder::*;
pub use connection::*;
pub use cursor::*;
pub use driver::*;
pub use error::translate_error;
pub use native::*;
pub use options::*;
pub use prepared::*;
