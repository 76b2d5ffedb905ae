use crate::{Cursor, Parameter, QueryInfo, Result};

/// A statement prepared by the backend, going through bind, execute and close.
///
/// # Lifecycle
/// `Created` → `Bound` → `Executed` → `Closed`. Binding happens at most once, an empty
/// parameter list binds nothing. Closing is idempotent and also happens on drop, every other
/// operation on a closed statement fails.
///
/// ```rust,ignore
/// let mut statement = connection.prepare("INSERT INTO t VALUES (?, ?)".into())?;
/// statement.bind(params![42, "hello"])?;
/// assert_eq!(statement.execute()?.affected_rows(), 1);
/// statement.close()?;
/// ```
pub trait Statement {
    type Cursor<'s>: Cursor
    where
        Self: 's;

    /// The query this statement was prepared from.
    fn query(&self) -> &QueryInfo;

    /// Number of rows to prefetch, backends that cannot express it return a capability error.
    fn set_fetch_size(&mut self, size: usize) -> Result<()>;

    /// Bind the ordered parameter list to the positional placeholders.
    fn bind(&mut self, params: Vec<Parameter>) -> Result<()>;

    /// Execute the statement, the returned cursor borrows it.
    fn execute(&mut self) -> Result<Self::Cursor<'_>>;

    /// Release the native statement.
    fn close(&mut self) -> Result<()>;
}
