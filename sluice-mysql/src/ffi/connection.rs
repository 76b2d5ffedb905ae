use super::{CBox, ClientStatement, read_diagnostic};
use crate::{ConnectOptions, Diagnostic, NativeConnection};
use mysqlclient_sys as sys;
use std::{
    ffi::{CString, c_char, c_uint, c_ulong},
    ptr,
    sync::Once,
};

const CR_UNKNOWN_ERROR: u32 = 2000;
const CR_OUT_OF_MEMORY: u32 = 2008;

fn init_library() {
    static INIT: Once = Once::new();
    INIT.call_once(|| unsafe {
        sys::mysql_server_init(0, ptr::null_mut(), ptr::null_mut());
    });
}

/// A session opened through libmysqlclient.
pub struct ClientConnection {
    handle: CBox<*mut sys::MYSQL>,
    failure: Option<Diagnostic>,
}

impl NativeConnection for ClientConnection {
    type Statement = ClientStatement;

    fn connect(options: &ConnectOptions) -> Result<Self, Diagnostic> {
        init_library();
        let cstring = |value: &str| {
            CString::new(value).map_err(|_| {
                Diagnostic::new(
                    CR_UNKNOWN_ERROR,
                    "A connection option contains a nul character",
                )
            })
        };
        let host = cstring(&options.host)?;
        let user = cstring(&options.user)?;
        let password = cstring(&options.password)?;
        let scheme = cstring(&options.scheme)?;
        let handle = CBox::new(unsafe { sys::mysql_init(ptr::null_mut()) }, |p| unsafe {
            sys::mysql_close(p);
        });
        if handle.is_null() {
            return Err(Diagnostic::new(
                CR_OUT_OF_MEMORY,
                "Could not allocate the connection handle",
            ));
        }
        let connected = unsafe {
            sys::mysql_real_connect(
                *handle,
                host.as_ptr(),
                user.as_ptr(),
                password.as_ptr(),
                if options.scheme.is_empty() {
                    ptr::null()
                } else {
                    scheme.as_ptr()
                },
                options.port as c_uint,
                ptr::null(),
                0,
            )
        };
        if connected.is_null() {
            return Err(unsafe {
                read_diagnostic(sys::mysql_errno(*handle), sys::mysql_error(*handle))
            });
        }
        Ok(Self {
            handle,
            failure: None,
        })
    }

    fn set_charset(&mut self, charset: &str) -> bool {
        self.failure = None;
        let Ok(charset) = CString::new(charset) else {
            self.failure = Some(Diagnostic::new(
                CR_UNKNOWN_ERROR,
                "The character set contains a nul character",
            ));
            return false;
        };
        unsafe { sys::mysql_set_character_set(*self.handle, charset.as_ptr()) == 0 }
    }

    fn query(&mut self, sql: &str) -> bool {
        self.failure = None;
        unsafe {
            sys::mysql_real_query(
                *self.handle,
                sql.as_ptr() as *const c_char,
                sql.len() as c_ulong,
            ) == 0
        }
    }

    fn autocommit(&mut self, enabled: bool) -> bool {
        self.failure = None;
        unsafe { !sys::mysql_autocommit(*self.handle, enabled) }
    }

    fn prepare(&mut self, sql: &str) -> Option<Self::Statement> {
        self.failure = None;
        let statement = CBox::new(unsafe { sys::mysql_stmt_init(*self.handle) }, |p| unsafe {
            sys::mysql_stmt_close(p);
        });
        if statement.is_null() {
            return None;
        }
        let rc = unsafe {
            sys::mysql_stmt_prepare(
                *statement,
                sql.as_ptr() as *const c_char,
                sql.len() as c_ulong,
            )
        };
        if rc != 0 {
            // Prepare errors are reported on the statement handle, about to be released
            self.failure = Some(unsafe {
                read_diagnostic(
                    sys::mysql_stmt_errno(*statement),
                    sys::mysql_stmt_error(*statement),
                )
            });
            return None;
        }
        Some(ClientStatement::new(statement))
    }

    fn commit(&mut self) -> bool {
        self.failure = None;
        unsafe { !sys::mysql_commit(*self.handle) }
    }

    fn rollback(&mut self) -> bool {
        self.failure = None;
        unsafe { !sys::mysql_rollback(*self.handle) }
    }

    fn diagnostic(&self) -> Diagnostic {
        match &self.failure {
            Some(failure) => failure.clone(),
            None => unsafe {
                read_diagnostic(sys::mysql_errno(*self.handle), sys::mysql_error(*self.handle))
            },
        }
    }

    fn close(self) {}
}
