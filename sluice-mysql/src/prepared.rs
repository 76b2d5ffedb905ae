use crate::{
    Binding, Diagnostic, LobQueue, MySqlCursor, NativeStatement,
    error::{execution_error, resource_state, unsupported},
};
use sluice_core::{DriverError, Error, Parameter, QueryInfo, Result, Statement, log_error};
use std::marker::PhantomData;

/// Client error code for a parameter list not matching the markers of the query.
const CR_PARAMS_NOT_BOUND: u32 = 2031;

/// Position of a [`MySqlStatement`] in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Created,
    Bound,
    Executed,
    Closed,
}

/// A prepared statement owning its native handle, borrowed from the connection that prepared it.
pub struct MySqlStatement<'c, S: NativeStatement> {
    native: Option<S>,
    query: QueryInfo,
    state: State,
    lobs: LobQueue,
    _connection: PhantomData<&'c mut ()>,
}

impl<'c, S: NativeStatement> MySqlStatement<'c, S> {
    pub(crate) fn new(native: S, query: QueryInfo) -> Self {
        Self {
            native: Some(native),
            query,
            state: State::Created,
            lobs: LobQueue::new(),
            _connection: PhantomData,
        }
    }
    pub fn state(&self) -> State {
        self.state
    }
    /// Large objects bound and not yet streamed.
    pub fn pending_lobs(&self) -> &LobQueue {
        &self.lobs
    }
}

impl<'c, S: NativeStatement> Statement for MySqlStatement<'c, S> {
    type Cursor<'s>
        = MySqlCursor<'s, S>
    where
        Self: 's;

    fn query(&self) -> &QueryInfo {
        &self.query
    }

    fn set_fetch_size(&mut self, _size: usize) -> Result<()> {
        Err(unsupported("Setting the fetch size"))
    }

    fn bind(&mut self, params: Vec<Parameter>) -> Result<()> {
        match self.state {
            State::Closed => return Err(resource_state("bind the parameters", "closed statement")),
            State::Executed => {
                return Err(resource_state("bind the parameters", "already executed"));
            }
            State::Bound if params.is_empty() => return Ok(()),
            State::Bound => return Err(resource_state("bind the parameters", "already bound")),
            State::Created => {}
        }
        let Some(native) = self.native.as_mut() else {
            return Err(resource_state("bind the parameters", "closed statement"));
        };
        let binding = Binding::classify(params);
        if binding.values.len() != native.param_count() {
            return Err(execution_error(
                format!("Could not bind the parameters of the query:\n{}", self.query),
                &Diagnostic::new(
                    CR_PARAMS_NOT_BOUND,
                    format!(
                        "The query expects {} parameters but {} were provided",
                        native.param_count(),
                        binding.values.len(),
                    ),
                ),
                Some(self.query.text()),
            ));
        }
        if !binding.is_empty() {
            log::debug!("Binding `{}` to {}", binding.types, self.query);
            if !native.bind_param(&binding.types, binding.values) {
                return Err(execution_error(
                    format!("Could not bind the parameters of the query:\n{}", self.query),
                    &native.diagnostic(),
                    Some(self.query.text()),
                ));
            }
        }
        self.lobs = binding.lobs;
        self.state = State::Bound;
        Ok(())
    }

    fn execute(&mut self) -> Result<Self::Cursor<'_>> {
        let operation = "execute the statement";
        let native = match (self.state, self.native.as_mut()) {
            (State::Closed, _) | (_, None) => return Err(resource_state(operation, "closed statement")),
            (State::Executed, _) => return Err(resource_state(operation, "already executed")),
            (State::Created, Some(native)) if native.param_count() != 0 => {
                return Err(resource_state(operation, "parameters not bound"));
            }
            (_, Some(native)) => native,
        };
        for (position, lob) in &self.lobs {
            for chunk in lob.chunks() {
                log::trace!(
                    "Streaming {} bytes into the parameter {}",
                    chunk.len(),
                    position
                );
                if !native.send_long_data(*position, chunk) {
                    return Err(execution_error(
                        format!(
                            "Could not stream the large object at position {} of the query:\n{}",
                            position, self.query
                        ),
                        &native.diagnostic(),
                        Some(self.query.text()),
                    ));
                }
            }
        }
        log::debug!("Executing {}", self.query);
        if !native.execute() {
            return Err(log_error!(Error::new(DriverError::Syntax {
                query: self.query.text().to_string(),
                source: native.diagnostic().translate(Some(self.query.text())),
            })));
        }
        self.lobs.clear();
        self.state = State::Executed;
        Ok(MySqlCursor::new(native, self.query.clone()))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(native) = self.native.take() {
            log::debug!("Closing {}", self.query);
            native.close();
        }
        self.lobs.clear();
        self.state = State::Closed;
        Ok(())
    }
}

impl<'c, S: NativeStatement> Drop for MySqlStatement<'c, S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
