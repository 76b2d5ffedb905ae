use crate::{QueryInfo, Result, Statement};

/// A live session with the database.
///
/// A connection prepares one statement at a time: the statement borrows the connection until it
/// is dropped. Transaction *policy* is left to the caller, the connection only forwards the
/// primitives.
pub trait Connection: Send {
    type Statement<'c>: Statement
    where
        Self: 'c;

    /// Prepare `query` on the database.
    fn prepare(&mut self, query: QueryInfo) -> Result<Self::Statement<'_>>;

    /// Make sure the following statements run inside a transaction.
    fn start_transaction(&mut self) -> Result<()>;

    /// Commit the current transaction, switching to autocommit mode when `autocommit` is true.
    fn commit(&mut self, autocommit: bool) -> Result<()>;

    /// Roll back the current transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Release the connection. Calling it again is a no-op, any other operation fails afterwards.
    fn disconnect(&mut self) -> Result<()>;

    /// Convenience for prepare, bind and execute when only the affected rows matter.
    fn execute(
        &mut self,
        query: impl Into<QueryInfo>,
        params: Vec<crate::Parameter>,
    ) -> Result<u64> {
        use crate::Cursor;
        let mut statement = self.prepare(query.into())?;
        statement.bind(params)?;
        let affected = statement.execute()?.affected_rows();
        statement.close()?;
        Ok(affected)
    }
}
