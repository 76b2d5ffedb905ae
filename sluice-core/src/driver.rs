use crate::{Connection, Result};

/// Entry point of a backend: names it and opens connections.
pub trait Driver {
    type Connection: Connection;

    /// Name of the backend, also the scheme of its connection URLs.
    const NAME: &'static str;

    /// Open a ready to use, transaction capable connection to the database at `url`.
    fn connect(&self, url: &str) -> Result<Self::Connection>;
}
