use crate::Error;

/// Error reported by the native database client, translated into the driver's own representation.
#[derive(Debug, thiserror::Error)]
#[error("[{code}] {}", .message.trim_end())]
pub struct DatabaseError {
    /// Native error code, never zero.
    pub code: u32,
    /// Native message, followed by the query text when one was available.
    pub message: String,
    /// The query that was being processed.
    pub query: Option<String>,
    /// The original bytes of the native message when they were not valid UTF-8.
    pub raw: Option<Box<[u8]>>,
    /// Failure met while reading the native error.
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DatabaseError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            query: None,
            raw: None,
            cause: None,
        }
    }
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Kind of failure raised by a driver.
///
/// Drivers return it inside [`crate::Error`], use `error.downcast_ref::<DriverError>()` to
/// inspect it.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The connection could not be established or bootstrapped.
    #[error("{context}")]
    Connection {
        context: String,
        #[source]
        source: Option<DatabaseError>,
    },
    /// The native client rejected a prepare, bind, stream or transaction call.
    #[error("{context}")]
    Execution {
        context: String,
        #[source]
        source: Option<DatabaseError>,
    },
    /// The native client rejected the execution of the statement.
    #[error("Could not execute the query:\n{query}")]
    Syntax {
        query: String,
        #[source]
        source: Option<DatabaseError>,
    },
    /// The operation is not supported by the backend.
    #[error("{operation} is not supported by {backend}")]
    Capability {
        operation: &'static str,
        backend: &'static str,
    },
    /// The object is not in a state that allows the operation.
    #[error("Cannot {operation}: {reason}")]
    ResourceState {
        operation: &'static str,
        reason: &'static str,
    },
}

impl DriverError {
    /// The translated native error, if any.
    pub fn database_error(&self) -> Option<&DatabaseError> {
        match self {
            DriverError::Connection { source, .. }
            | DriverError::Execution { source, .. }
            | DriverError::Syntax { source, .. } => source.as_ref(),
            _ => None,
        }
    }
    /// The native error code, if any.
    pub fn code(&self) -> Option<u32> {
        self.database_error().map(|e| e.code)
    }
    pub fn is_syntax(&self) -> bool {
        matches!(self, DriverError::Syntax { .. })
    }
    pub fn is_capability(&self) -> bool {
        matches!(self, DriverError::Capability { .. })
    }
    pub fn is_resource_state(&self) -> bool {
        matches!(self, DriverError::ResourceState { .. })
    }
}

/// Look for a [`DriverError`] inside an error chain.
pub fn driver_error(error: &Error) -> Option<&DriverError> {
    error.chain().find_map(|e| e.downcast_ref::<DriverError>())
}
