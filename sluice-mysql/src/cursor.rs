use crate::{
    Fetch, NativeStatement,
    error::{execution_error, resource_state, unsupported},
};
use sluice_core::{Cursor, FetchMode, FetchedRow, QueryInfo, Result, RowLabeled, RowNames};
use std::iter::FusedIterator;

/// The pending result of an executed [`crate::MySqlStatement`].
///
/// Rows are streamed from the server unless [`Cursor::buffer`] is called first, only a buffered
/// cursor can seek.
pub struct MySqlCursor<'s, S: NativeStatement> {
    statement: Option<&'s mut S>,
    query: QueryInfo,
    buffered: bool,
    affected_rows: u64,
    insert_id: u64,
}

impl<'s, S: NativeStatement> MySqlCursor<'s, S> {
    pub(crate) fn new(statement: &'s mut S, query: QueryInfo) -> Self {
        let affected_rows = statement.affected_rows();
        let insert_id = statement.insert_id();
        Self {
            statement: Some(statement),
            query,
            buffered: false,
            affected_rows,
            insert_id,
        }
    }
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }
    fn statement(&mut self, operation: &'static str) -> Result<&mut S> {
        match self.statement.as_deref_mut() {
            Some(statement) => Ok(statement),
            None => Err(resource_state(operation, "closed cursor")),
        }
    }
}

impl<'s, S: NativeStatement> Cursor for MySqlCursor<'s, S> {
    type Rows<'r>
        = MySqlRows<'r, S>
    where
        Self: 'r;

    fn rows(&mut self, mode: FetchMode) -> Result<Self::Rows<'_>> {
        let query = self.query.clone();
        let statement = self.statement("fetch the rows")?;
        let Some(labels) = statement.columns() else {
            return Err(execution_error(
                format!("The query did not produce a result set:\n{}", query),
                &statement.diagnostic(),
                Some(query.text()),
            ));
        };
        Ok(MySqlRows {
            statement,
            labels: labels.into(),
            mode,
            query,
            done: false,
        })
    }

    fn buffer(&mut self) -> Result<()> {
        if self.buffered {
            return Ok(());
        }
        let query = self.query.clone();
        let statement = self.statement("buffer the result")?;
        if !statement.store_result() {
            return Err(execution_error(
                format!("Could not buffer the result of the query:\n{}", query),
                &statement.diagnostic(),
                Some(query.text()),
            ));
        }
        self.buffered = true;
        Ok(())
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        let buffered = self.buffered;
        let statement = self.statement("seek")?;
        if !buffered {
            return Err(unsupported("Seeking an unbuffered cursor"));
        }
        statement.data_seek(offset);
        Ok(())
    }

    fn last_inserted_id(&self) -> Option<u64> {
        (self.insert_id != 0).then_some(self.insert_id)
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn close(&mut self) -> Result<()> {
        let Some(statement) = self.statement.take() else {
            return Ok(());
        };
        if !statement.free_result() {
            return Err(execution_error(
                format!("Could not release the result of the query:\n{}", self.query),
                &statement.diagnostic(),
                Some(self.query.text()),
            ));
        }
        Ok(())
    }
}

impl<'s, S: NativeStatement> Drop for MySqlCursor<'s, S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Rows of a [`MySqlCursor`], fetched one at a time.
///
/// A fetch failure is yielded once and ends the iteration.
pub struct MySqlRows<'r, S: NativeStatement> {
    statement: &'r mut S,
    labels: RowNames,
    mode: FetchMode,
    query: QueryInfo,
    done: bool,
}

impl<'r, S: NativeStatement> MySqlRows<'r, S> {
    pub fn labels(&self) -> &RowNames {
        &self.labels
    }
}

impl<'r, S: NativeStatement> Iterator for MySqlRows<'r, S> {
    type Item = Result<FetchedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.statement.fetch() {
            Fetch::Row(values) => Some(Ok(if self.mode.is_labeled() {
                FetchedRow::Labeled(RowLabeled::new(self.labels.clone(), values.into()))
            } else {
                FetchedRow::Positional(values.into())
            })),
            Fetch::Done => {
                self.done = true;
                None
            }
            Fetch::Failed => {
                self.done = true;
                Some(Err(execution_error(
                    format!("Could not fetch a row of the query:\n{}", self.query),
                    &self.statement.diagnostic(),
                    Some(self.query.text()),
                )))
            }
        }
    }
}

impl<'r, S: NativeStatement> FusedIterator for MySqlRows<'r, S> {}
