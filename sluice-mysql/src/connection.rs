use crate::{
    ConnectOptions, MySqlStatement, NativeConnection,
    error::{connection_error, execution_error, resource_state},
};
use sluice_core::{Connection, QueryInfo, Result};

/// Statement run right after connecting, `||` concatenates strings like in standard SQL.
pub const SESSION_SQL_MODE: &str = "SET SQL_MODE='PIPES_AS_CONCAT'";

/// A MySQL session with autocommit disabled.
pub struct MySqlConnection<N: NativeConnection> {
    native: Option<N>,
    autocommit: bool,
}

impl<N: NativeConnection> MySqlConnection<N> {
    /// Connect and bootstrap the session: character set, SQL mode and disabled autocommit.
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        let context = || {
            format!(
                "While trying to connect to `{}@{}:{}`",
                options.user, options.host, options.port
            )
        };
        log::debug!("Connecting to {}:{}", options.host, options.port);
        let native = N::connect(options).map_err(|e| connection_error(context(), &e))?;
        let mut connection = Self::from_native(native);
        if let Err(error) = connection.bootstrap(options) {
            let _ = connection.disconnect();
            return Err(error.context(context()));
        }
        Ok(connection)
    }

    /// Wrap an already connected handle without bootstrapping it.
    pub fn from_native(native: N) -> Self {
        Self {
            native: Some(native),
            autocommit: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.native.is_some()
    }

    pub fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    fn native(&mut self, operation: &'static str) -> Result<&mut N> {
        match self.native.as_mut() {
            Some(native) => Ok(native),
            None => Err(resource_state(operation, "disconnected")),
        }
    }

    fn bootstrap(&mut self, options: &ConnectOptions) -> Result<()> {
        let native = self.native("bootstrap the session")?;
        let charset = options.effective_charset();
        if !native.set_charset(charset) {
            return Err(connection_error(
                format!("Could not set the character set `{}`", charset),
                &native.diagnostic(),
            ));
        }
        if !native.query(SESSION_SQL_MODE) {
            return Err(execution_error(
                "Could not set the session SQL mode",
                &native.diagnostic(),
                Some(SESSION_SQL_MODE),
            ));
        }
        self.set_autocommit(false)
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<()> {
        let native = self.native("change autocommit")?;
        if !native.autocommit(enabled) {
            return Err(connection_error(
                format!("Could not set autocommit to {}", enabled),
                &native.diagnostic(),
            ));
        }
        self.autocommit = enabled;
        Ok(())
    }
}

impl<N: NativeConnection> Connection for MySqlConnection<N> {
    type Statement<'c>
        = MySqlStatement<'c, N::Statement>
    where
        Self: 'c;

    fn prepare(&mut self, query: QueryInfo) -> Result<Self::Statement<'_>> {
        let native = self.native("prepare a statement")?;
        log::debug!("Preparing {}", query);
        match native.prepare(query.text()) {
            Some(statement) => Ok(MySqlStatement::new(statement, query)),
            None => Err(execution_error(
                format!("While preparing the query:\n{}", query),
                &native.diagnostic(),
                Some(query.text()),
            )),
        }
    }

    fn start_transaction(&mut self) -> Result<()> {
        if self.autocommit {
            self.set_autocommit(false)?;
        }
        Ok(())
    }

    fn commit(&mut self, autocommit: bool) -> Result<()> {
        let native = self.native("commit")?;
        if !native.commit() {
            return Err(execution_error(
                "Could not commit the transaction",
                &native.diagnostic(),
                None,
            ));
        }
        if autocommit && !self.autocommit {
            self.set_autocommit(true)?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let native = self.native("rollback")?;
        if !native.rollback() {
            return Err(execution_error(
                "Could not roll back the transaction",
                &native.diagnostic(),
                None,
            ));
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(native) = self.native.take() {
            log::debug!("Disconnecting");
            native.close();
        }
        Ok(())
    }
}

impl<N: NativeConnection> Drop for MySqlConnection<N> {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}
