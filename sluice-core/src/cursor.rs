use crate::{FetchMode, FetchedRow, Result};

/// Pending result of an executed statement.
pub trait Cursor {
    type Rows<'r>: Iterator<Item = Result<FetchedRow>>
    where
        Self: 'r;

    /// Lazy, finite sequence of rows shaped by `mode`.
    ///
    /// Fails when the statement did not produce a result set at all, which is different from a
    /// result set with no rows.
    fn rows(&mut self, mode: FetchMode) -> Result<Self::Rows<'_>>;

    /// Materialize the whole result set client side, making it seekable.
    fn buffer(&mut self) -> Result<()>;

    /// Move to the absolute row `offset` of a buffered result set.
    fn seek(&mut self, offset: u64) -> Result<()>;

    /// Identifier generated by the execution for an auto increment column.
    fn last_inserted_id(&self) -> Option<u64>;

    /// Rows changed by the execution.
    fn affected_rows(&self) -> u64;

    /// Release any buffered data, calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}
