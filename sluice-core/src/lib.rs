mod as_value;
mod connection;
mod cursor;
mod driver;
mod error;
mod parameter;
mod prepared;
mod query;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use cursor::*;
pub use driver::*;
pub use error::*;
pub use parameter::*;
pub use prepared::*;
pub use query::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
