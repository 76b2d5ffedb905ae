use crate::{ConnectOptions, MySqlConnection, NativeConnection};
use sluice_core::{Driver, Result};
use std::{
    fmt::{self, Debug},
    marker::PhantomData,
};

/// Name of the backend, also the scheme of its connection URLs.
pub const DRIVER_NAME: &str = "mysql";
/// Character set of a session when the options name none.
pub const DEFAULT_CHARSET: &str = "UTF8";

/// Opens [`MySqlConnection`]s through the native client `N`.
pub struct MySqlDriver<N: NativeConnection>(PhantomData<fn() -> N>);

impl<N: NativeConnection> MySqlDriver<N> {
    pub const DEFAULT_CHARSET: &'static str = DEFAULT_CHARSET;

    pub const fn new() -> Self {
        Self(PhantomData)
    }
    pub fn connect_with(&self, options: &ConnectOptions) -> Result<MySqlConnection<N>> {
        MySqlConnection::connect(options)
    }
}

impl<N: NativeConnection> Default for MySqlDriver<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NativeConnection> Clone for MySqlDriver<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: NativeConnection> Copy for MySqlDriver<N> {}

impl<N: NativeConnection> Debug for MySqlDriver<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MySqlDriver")
    }
}

impl<N: NativeConnection> Driver for MySqlDriver<N> {
    type Connection = MySqlConnection<N>;

    const NAME: &'static str = DRIVER_NAME;

    fn connect(&self, url: &str) -> Result<Self::Connection> {
        self.connect_with(&ConnectOptions::from_url(url)?)
    }
}
