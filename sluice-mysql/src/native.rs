use crate::{BindTypes, ConnectOptions, translate_error};
use sluice_core::{DatabaseError, Value};

/// Last error reported by a native handle, as raw as the client gives it.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: u32,
    pub message: Vec<u8>,
}

impl Diagnostic {
    pub fn new(code: u32, message: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
    /// Translate into a [`DatabaseError`], `None` when the handle reports no error.
    pub fn translate(&self, query: Option<&str>) -> Option<DatabaseError> {
        translate_error(self.code, &self.message, query)
    }
}

/// Outcome of a single row fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    Row(Vec<Value>),
    Done,
    Failed,
}

/// Connection primitives of a MySQL style client library.
///
/// Methods returning `bool` report success, the reason of a failure is read back through
/// [`NativeConnection::diagnostic`].
pub trait NativeConnection: Send + Sized {
    type Statement: NativeStatement;

    fn connect(options: &ConnectOptions) -> Result<Self, Diagnostic>;
    fn set_charset(&mut self, charset: &str) -> bool;
    /// Run a statement that produces no rows.
    fn query(&mut self, sql: &str) -> bool;
    fn autocommit(&mut self, enabled: bool) -> bool;
    /// `None` when the server rejects the query, no handle is left allocated.
    fn prepare(&mut self, sql: &str) -> Option<Self::Statement>;
    fn commit(&mut self) -> bool;
    fn rollback(&mut self) -> bool;
    fn diagnostic(&self) -> Diagnostic;
    fn close(self);
}

/// Prepared statement primitives of a MySQL style client library.
pub trait NativeStatement: Send {
    /// Number of `?` markers in the prepared query.
    fn param_count(&self) -> usize;
    /// Positional binding, `types` has one code for each value.
    fn bind_param(&mut self, types: &BindTypes, values: Vec<Value>) -> bool;
    /// Append `chunk` to the long data of the parameter at `position` (zero based).
    fn send_long_data(&mut self, position: usize, chunk: &[u8]) -> bool;
    fn execute(&mut self) -> bool;
    /// Read the whole result set client side.
    fn store_result(&mut self) -> bool;
    /// Move to row `offset` of a stored result set.
    fn data_seek(&mut self, offset: u64);
    /// Column names of the pending result set, `None` when the statement produced none.
    fn columns(&mut self) -> Option<Vec<String>>;
    fn fetch(&mut self) -> Fetch;
    fn insert_id(&self) -> u64;
    fn affected_rows(&self) -> u64;
    fn free_result(&mut self) -> bool;
    fn diagnostic(&self) -> Diagnostic;
    fn close(self);
}
