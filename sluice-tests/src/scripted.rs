//! In-memory native client answering with scripted responses and journaling every call.
use sluice_core::Value;
use sluice_mysql::{
    BindTypes, ConnectOptions, Diagnostic, Fetch, NativeConnection, NativeStatement,
};
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

/// A call received by the scripted client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect { host: String, user: String, scheme: String },
    SetCharset(String),
    Query(String),
    Autocommit(bool),
    Prepare(String),
    Commit,
    Rollback,
    Close,
    BindParam { types: String, values: Vec<Value> },
    SendLongData { position: usize, chunk: Vec<u8> },
    Execute,
    StoreResult,
    DataSeek(u64),
    Fetch,
    FreeResult,
    CloseStatement,
}

impl Call {
    pub fn is_statement_call(&self) -> bool {
        matches!(
            self,
            Call::BindParam { .. }
                | Call::SendLongData { .. }
                | Call::Execute
                | Call::StoreResult
                | Call::DataSeek(..)
                | Call::Fetch
                | Call::FreeResult
                | Call::CloseStatement
        )
    }
}

/// How the scripted server answers a query.
#[derive(Default, Debug, Clone)]
pub struct Response {
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Value>>,
    pub affected_rows: u64,
    pub insert_id: u64,
    /// Markers declared by the prepared query, the `?` in the text when absent.
    pub param_count: Option<usize>,
    pub prepare_error: Option<Diagnostic>,
    pub bind_error: Option<Diagnostic>,
    pub long_data_error: Option<Diagnostic>,
    pub execute_error: Option<Diagnostic>,
    pub store_error: Option<Diagnostic>,
    /// Fetch failing when reaching the row at this index.
    pub fetch_error: Option<(usize, Diagnostic)>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
    pub fn row(mut self, row: impl Into<Vec<Value>>) -> Self {
        self.rows.push(row.into());
        self
    }
    pub fn affected_rows(mut self, affected_rows: u64) -> Self {
        self.affected_rows = affected_rows;
        self
    }
    pub fn insert_id(mut self, insert_id: u64) -> Self {
        self.insert_id = insert_id;
        self
    }
    pub fn param_count(mut self, param_count: usize) -> Self {
        self.param_count = Some(param_count);
        self
    }
    pub fn prepare_error(mut self, code: u32, message: &str) -> Self {
        self.prepare_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn bind_error(mut self, code: u32, message: &str) -> Self {
        self.bind_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn long_data_error(mut self, code: u32, message: &str) -> Self {
        self.long_data_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn execute_error(mut self, code: u32, message: &str) -> Self {
        self.execute_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn store_error(mut self, code: u32, message: &str) -> Self {
        self.store_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fetch_error(mut self, index: usize, code: u32, message: &str) -> Self {
        self.fetch_error = Some((index, Diagnostic::new(code, message)));
        self
    }
}

#[derive(Default, Debug)]
struct ScriptState {
    calls: Vec<Call>,
    responses: HashMap<String, Response>,
    connect_error: Option<Diagnostic>,
    charset_error: Option<Diagnostic>,
    query_error: Option<Diagnostic>,
    autocommit_error: Option<Diagnostic>,
    commit_error: Option<Diagnostic>,
    rollback_error: Option<Diagnostic>,
}

static SERVERS: LazyLock<Mutex<HashMap<String, Script>>> = LazyLock::new(Default::default);

/// Responses and journal shared by every handle of a scripted server.
#[derive(Default, Debug, Clone)]
pub struct Script {
    state: Arc<Mutex<ScriptState>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `sql` with `response`.
    pub fn respond(&self, sql: impl Into<String>, response: Response) -> &Self {
        self.state().responses.insert(sql.into(), response);
        self
    }
    pub fn fail_connect(&self, code: u32, message: &str) -> &Self {
        self.state().connect_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fail_charset(&self, code: u32, message: &str) -> &Self {
        self.state().charset_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fail_query(&self, code: u32, message: &str) -> &Self {
        self.state().query_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fail_autocommit(&self, code: u32, message: &str) -> &Self {
        self.state().autocommit_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fail_commit(&self, code: u32, message: &str) -> &Self {
        self.state().commit_error = Some(Diagnostic::new(code, message));
        self
    }
    pub fn fail_rollback(&self, code: u32, message: &str) -> &Self {
        self.state().rollback_error = Some(Diagnostic::new(code, message));
        self
    }

    /// Make the script reachable by [`NativeConnection::connect`] at `host`.
    pub fn serve(&self, host: impl Into<String>) -> &Self {
        SERVERS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.into(), self.clone());
        self
    }

    /// A connection to this script, skipping the session bootstrap.
    pub fn connection(&self) -> ScriptedConnection {
        ScriptedConnection {
            script: self.clone(),
            last: Diagnostic::default(),
        }
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls received by statements only.
    pub fn statement_calls(&self) -> Vec<Call> {
        self.state()
            .calls
            .iter()
            .filter(|v| v.is_statement_call())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: Call) {
        log::trace!("Scripted call {:?}", call);
        self.state().calls.push(call);
    }
}

/// Outcome of a journaled call, remembering the failure for the next diagnostic.
fn outcome(last: &mut Diagnostic, failure: Option<Diagnostic>) -> bool {
    match failure {
        Some(failure) => {
            *last = failure;
            false
        }
        None => {
            *last = Diagnostic::default();
            true
        }
    }
}

pub struct ScriptedConnection {
    script: Script,
    last: Diagnostic,
}

impl NativeConnection for ScriptedConnection {
    type Statement = ScriptedStatement;

    fn connect(options: &ConnectOptions) -> Result<Self, Diagnostic> {
        let script = SERVERS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&options.host)
            .cloned();
        let Some(script) = script else {
            return Err(Diagnostic::new(
                2005,
                format!("Unknown MySQL server host '{}'", options.host),
            ));
        };
        script.record(Call::Connect {
            host: options.host.clone(),
            user: options.user.clone(),
            scheme: options.scheme.clone(),
        });
        if let Some(error) = script.state().connect_error.clone() {
            return Err(error);
        }
        Ok(script.connection())
    }

    fn set_charset(&mut self, charset: &str) -> bool {
        self.script.record(Call::SetCharset(charset.into()));
        let failure = self.script.state().charset_error.clone();
        outcome(&mut self.last, failure)
    }

    fn query(&mut self, sql: &str) -> bool {
        self.script.record(Call::Query(sql.into()));
        let failure = self.script.state().query_error.clone();
        outcome(&mut self.last, failure)
    }

    fn autocommit(&mut self, enabled: bool) -> bool {
        self.script.record(Call::Autocommit(enabled));
        let failure = self.script.state().autocommit_error.clone();
        outcome(&mut self.last, failure)
    }

    fn prepare(&mut self, sql: &str) -> Option<Self::Statement> {
        self.script.record(Call::Prepare(sql.into()));
        let response = self
            .script
            .state()
            .responses
            .get(sql)
            .cloned()
            .unwrap_or_default();
        if !outcome(&mut self.last, response.prepare_error.clone()) {
            return None;
        }
        Some(ScriptedStatement {
            script: self.script.clone(),
            param_count: response
                .param_count
                .unwrap_or_else(|| sql.matches('?').count()),
            response,
            executed: false,
            position: 0,
            last: Diagnostic::default(),
        })
    }

    fn commit(&mut self) -> bool {
        self.script.record(Call::Commit);
        let failure = self.script.state().commit_error.clone();
        outcome(&mut self.last, failure)
    }

    fn rollback(&mut self) -> bool {
        self.script.record(Call::Rollback);
        let failure = self.script.state().rollback_error.clone();
        outcome(&mut self.last, failure)
    }

    fn diagnostic(&self) -> Diagnostic {
        self.last.clone()
    }

    fn close(self) {
        self.script.record(Call::Close);
    }
}

pub struct ScriptedStatement {
    script: Script,
    response: Response,
    param_count: usize,
    executed: bool,
    position: usize,
    last: Diagnostic,
}

impl NativeStatement for ScriptedStatement {
    fn param_count(&self) -> usize {
        self.param_count
    }

    fn bind_param(&mut self, types: &BindTypes, values: Vec<Value>) -> bool {
        let count = values.len();
        self.script.record(Call::BindParam {
            types: types.to_string(),
            values,
        });
        let failure = self.response.bind_error.clone().or_else(|| {
            (types.len() != count || count != self.param_count).then(|| {
                Diagnostic::new(2031, "No data supplied for parameters in prepared statement")
            })
        });
        outcome(&mut self.last, failure)
    }

    fn send_long_data(&mut self, position: usize, chunk: &[u8]) -> bool {
        self.script.record(Call::SendLongData {
            position,
            chunk: chunk.to_vec(),
        });
        let failure = self.response.long_data_error.clone();
        outcome(&mut self.last, failure)
    }

    fn execute(&mut self) -> bool {
        self.script.record(Call::Execute);
        let failure = self.response.execute_error.clone();
        self.executed = failure.is_none();
        self.position = 0;
        outcome(&mut self.last, failure)
    }

    fn store_result(&mut self) -> bool {
        self.script.record(Call::StoreResult);
        let failure = self.response.store_error.clone();
        outcome(&mut self.last, failure)
    }

    fn data_seek(&mut self, offset: u64) {
        self.script.record(Call::DataSeek(offset));
        self.position = offset as usize;
    }

    fn columns(&mut self) -> Option<Vec<String>> {
        if !self.executed {
            return None;
        }
        self.response.columns.clone()
    }

    fn fetch(&mut self) -> Fetch {
        self.script.record(Call::Fetch);
        if let Some((index, error)) = &self.response.fetch_error
            && *index == self.position
        {
            self.last = error.clone();
            return Fetch::Failed;
        }
        match self.response.rows.get(self.position) {
            Some(row) => {
                self.position += 1;
                Fetch::Row(row.clone())
            }
            None => Fetch::Done,
        }
    }

    fn insert_id(&self) -> u64 {
        if self.executed {
            self.response.insert_id
        } else {
            0
        }
    }

    fn affected_rows(&self) -> u64 {
        if self.executed {
            self.response.affected_rows
        } else {
            0
        }
    }

    fn free_result(&mut self) -> bool {
        self.script.record(Call::FreeResult);
        true
    }

    fn diagnostic(&self) -> Diagnostic {
        self.last.clone()
    }

    fn close(self) {
        self.script.record(Call::CloseStatement);
    }
}
