use super::{CBox, read_diagnostic};
use crate::{BindType, BindTypes, Diagnostic, Fetch, NativeStatement};
use mysqlclient_sys::{self as sys, enum_field_types as FieldType};
use sluice_core::Value;
use std::{
    ffi::{CStr, c_char, c_uint, c_ulong, c_void},
    mem,
};

const MYSQL_NO_DATA: i32 = 100;
const MYSQL_DATA_TRUNCATED: i32 = 101;
const UNSIGNED_FLAG: u32 = 32;
const BINARY_CHARSET: u32 = 63;
const CR_UNKNOWN_ERROR: u32 = 2000;

/// Parameter data owned by the statement, the bind structures point into it.
#[derive(Debug)]
enum ParamBuffer {
    Null,
    /// Streamed through long data, the flag makes the parameter null when no chunk was sent.
    Long(bool),
    Signed(i64),
    Unsigned(u64),
    Double(f64),
    Text(Vec<u8>),
    Binary(Vec<u8>),
}

impl ParamBuffer {
    fn new(kind: BindType, value: Value) -> Self {
        if kind == BindType::Blob {
            return ParamBuffer::Long(true);
        }
        match value {
            v if v.is_null() => ParamBuffer::Null,
            Value::Int8(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::Int16(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::Int32(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::Int64(Some(v)) => ParamBuffer::Signed(v),
            Value::UInt8(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::UInt16(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::UInt32(Some(v)) => ParamBuffer::Signed(v as i64),
            Value::UInt64(Some(v)) => ParamBuffer::Unsigned(v),
            Value::Float32(Some(v)) => ParamBuffer::Double(v as f64),
            Value::Float64(Some(v)) => ParamBuffer::Double(v),
            Value::Blob(Some(v)) => ParamBuffer::Binary(v.into_vec()),
            v => ParamBuffer::Text(v.to_bytes().unwrap_or_default()),
        }
    }

    fn bind(&mut self) -> sys::MYSQL_BIND {
        let mut bind: sys::MYSQL_BIND = unsafe { mem::zeroed() };
        match self {
            ParamBuffer::Null => bind.buffer_type = FieldType::MYSQL_TYPE_NULL,
            ParamBuffer::Long(null) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_LONG_BLOB;
                bind.is_null = null as *mut bool;
            }
            ParamBuffer::Signed(v) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_LONGLONG;
                bind.buffer = v as *mut i64 as *mut c_void;
            }
            ParamBuffer::Unsigned(v) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_LONGLONG;
                bind.buffer = v as *mut u64 as *mut c_void;
                bind.is_unsigned = true;
            }
            ParamBuffer::Double(v) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_DOUBLE;
                bind.buffer = v as *mut f64 as *mut c_void;
            }
            ParamBuffer::Text(v) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_STRING;
                bind.buffer = v.as_mut_ptr() as *mut c_void;
                bind.buffer_length = v.len() as c_ulong;
            }
            ParamBuffer::Binary(v) => {
                bind.buffer_type = FieldType::MYSQL_TYPE_BLOB;
                bind.buffer = v.as_mut_ptr() as *mut c_void;
                bind.buffer_length = v.len() as c_ulong;
            }
        }
        bind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Binary,
    Text,
}

#[derive(Debug)]
struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    fn from_field(field: &sys::MYSQL_FIELD) -> Self {
        let name = if field.name.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(field.name) }
                .to_string_lossy()
                .into_owned()
        };
        let kind = match field.type_ {
            FieldType::MYSQL_TYPE_TINY
            | FieldType::MYSQL_TYPE_SHORT
            | FieldType::MYSQL_TYPE_LONG
            | FieldType::MYSQL_TYPE_INT24
            | FieldType::MYSQL_TYPE_LONGLONG
            | FieldType::MYSQL_TYPE_YEAR => {
                if field.flags & UNSIGNED_FLAG != 0 {
                    ColumnKind::Unsigned
                } else {
                    ColumnKind::Signed
                }
            }
            FieldType::MYSQL_TYPE_FLOAT => ColumnKind::Float,
            FieldType::MYSQL_TYPE_DOUBLE => ColumnKind::Double,
            FieldType::MYSQL_TYPE_TINY_BLOB
            | FieldType::MYSQL_TYPE_MEDIUM_BLOB
            | FieldType::MYSQL_TYPE_LONG_BLOB
            | FieldType::MYSQL_TYPE_BLOB
            | FieldType::MYSQL_TYPE_STRING
            | FieldType::MYSQL_TYPE_VAR_STRING
            | FieldType::MYSQL_TYPE_BIT
            | FieldType::MYSQL_TYPE_GEOMETRY
                if field.charsetnr == BINARY_CHARSET =>
            {
                ColumnKind::Binary
            }
            _ => ColumnKind::Text,
        };
        Self { name, kind }
    }

    fn buffer_type(&self) -> FieldType {
        match self.kind {
            ColumnKind::Binary => FieldType::MYSQL_TYPE_BLOB,
            _ => FieldType::MYSQL_TYPE_STRING,
        }
    }

    fn null(&self) -> Value {
        match self.kind {
            ColumnKind::Signed => Value::Int64(None),
            ColumnKind::Unsigned => Value::UInt64(None),
            ColumnKind::Float => Value::Float32(None),
            ColumnKind::Double => Value::Float64(None),
            ColumnKind::Binary => Value::Blob(None),
            ColumnKind::Text => Value::Varchar(None),
        }
    }

    /// Decode the textual representation sent by the server.
    fn decode(&self, data: Vec<u8>) -> Option<Value> {
        if self.kind == ColumnKind::Binary {
            return Some(Value::Blob(Some(data.into())));
        }
        let text = String::from_utf8(data).ok()?;
        Some(match self.kind {
            ColumnKind::Signed => Value::Int64(Some(text.parse().ok()?)),
            ColumnKind::Unsigned => Value::UInt64(Some(text.parse().ok()?)),
            ColumnKind::Float => Value::Float32(Some(text.parse().ok()?)),
            ColumnKind::Double => Value::Float64(Some(text.parse().ok()?)),
            _ => Value::Varchar(Some(text)),
        })
    }
}

/// Result buffers, every column is bound with an empty buffer and read with a column fetch.
struct ResultBinding {
    columns: Box<[Column]>,
    binds: Box<[sys::MYSQL_BIND]>,
    lengths: Box<[c_ulong]>,
    nulls: Box<[bool]>,
}

/// A statement prepared through libmysqlclient.
pub struct ClientStatement {
    handle: CBox<*mut sys::MYSQL_STMT>,
    // Read by the client on execute, replaced by the next bind
    #[allow(dead_code)]
    params: Box<[sys::MYSQL_BIND]>,
    #[allow(dead_code)]
    buffers: Box<[ParamBuffer]>,
    result: Option<ResultBinding>,
    failure: Option<Diagnostic>,
}

// The bind structures only point into buffers owned by the statement itself.
unsafe impl Send for ClientStatement {}

impl ClientStatement {
    pub(crate) fn new(handle: CBox<*mut sys::MYSQL_STMT>) -> Self {
        Self {
            handle,
            params: Box::new([]),
            buffers: Box::new([]),
            result: None,
            failure: None,
        }
    }

    fn bind_result(&mut self) -> Option<&mut ResultBinding> {
        if self.result.is_some() {
            return self.result.as_mut();
        }
        let metadata = CBox::new(
            unsafe { sys::mysql_stmt_result_metadata(*self.handle) },
            |p| unsafe { sys::mysql_free_result(p) },
        );
        if metadata.is_null() {
            return None;
        }
        let columns: Box<[Column]> = unsafe {
            let count = sys::mysql_num_fields(*metadata) as usize;
            let fields = sys::mysql_fetch_fields(*metadata);
            if count == 0 || fields.is_null() {
                Box::new([])
            } else {
                std::slice::from_raw_parts(fields, count)
                    .iter()
                    .map(Column::from_field)
                    .collect()
            }
        };
        let mut result = ResultBinding {
            binds: Box::new([]),
            lengths: vec![0; columns.len()].into_boxed_slice(),
            nulls: vec![false; columns.len()].into_boxed_slice(),
            columns,
        };
        result.binds = result
            .columns
            .iter()
            .zip(result.lengths.iter_mut().zip(result.nulls.iter_mut()))
            .map(|(column, (length, null))| {
                let mut bind: sys::MYSQL_BIND = unsafe { mem::zeroed() };
                bind.buffer_type = column.buffer_type();
                bind.length = length;
                bind.is_null = null;
                bind
            })
            .collect();
        if unsafe { sys::mysql_stmt_bind_result(*self.handle, result.binds.as_mut_ptr()) } {
            return None;
        }
        self.result = Some(result);
        self.result.as_mut()
    }

    fn read_row(&mut self) -> Option<Vec<Value>> {
        let handle = *self.handle;
        let result = self.result.as_ref()?;
        let mut row = Vec::with_capacity(result.columns.len());
        for (i, column) in result.columns.iter().enumerate() {
            if result.nulls[i] {
                row.push(column.null());
                continue;
            }
            let mut data = vec![0u8; result.lengths[i] as usize];
            if !data.is_empty() {
                let mut length: c_ulong = 0;
                let mut bind: sys::MYSQL_BIND = unsafe { mem::zeroed() };
                bind.buffer_type = column.buffer_type();
                bind.buffer = data.as_mut_ptr() as *mut c_void;
                bind.buffer_length = data.len() as c_ulong;
                bind.length = &mut length;
                if unsafe { sys::mysql_stmt_fetch_column(handle, &mut bind, i as c_uint, 0) } != 0
                {
                    return None;
                }
                data.truncate(length as usize);
            }
            let Some(value) = column.decode(data) else {
                self.failure = Some(Diagnostic::new(
                    CR_UNKNOWN_ERROR,
                    format!("Could not decode the value of the column `{}`", column.name),
                ));
                return None;
            };
            row.push(value);
        }
        Some(row)
    }
}

impl NativeStatement for ClientStatement {
    fn param_count(&self) -> usize {
        unsafe { sys::mysql_stmt_param_count(*self.handle) as usize }
    }

    fn bind_param(&mut self, types: &BindTypes, values: Vec<Value>) -> bool {
        self.failure = None;
        let mut buffers: Box<[ParamBuffer]> = types
            .iter()
            .zip(values)
            .map(|(kind, value)| ParamBuffer::new(kind, value))
            .collect();
        let mut params: Box<[sys::MYSQL_BIND]> = buffers.iter_mut().map(ParamBuffer::bind).collect();
        let failed = unsafe { sys::mysql_stmt_bind_param(*self.handle, params.as_mut_ptr()) };
        self.params = params;
        self.buffers = buffers;
        !failed
    }

    fn send_long_data(&mut self, position: usize, chunk: &[u8]) -> bool {
        self.failure = None;
        unsafe {
            !sys::mysql_stmt_send_long_data(
                *self.handle,
                position as c_uint,
                chunk.as_ptr() as *const c_char,
                chunk.len() as c_ulong,
            )
        }
    }

    fn execute(&mut self) -> bool {
        self.failure = None;
        self.result = None;
        unsafe { sys::mysql_stmt_execute(*self.handle) == 0 }
    }

    fn store_result(&mut self) -> bool {
        self.failure = None;
        if self.bind_result().is_none() {
            return false;
        }
        unsafe { sys::mysql_stmt_store_result(*self.handle) == 0 }
    }

    fn data_seek(&mut self, offset: u64) {
        unsafe { sys::mysql_stmt_data_seek(*self.handle, offset) }
    }

    fn columns(&mut self) -> Option<Vec<String>> {
        self.failure = None;
        self.bind_result()
            .map(|result| result.columns.iter().map(|c| c.name.clone()).collect())
    }

    fn fetch(&mut self) -> Fetch {
        self.failure = None;
        if self.result.is_none() {
            return Fetch::Failed;
        }
        match unsafe { sys::mysql_stmt_fetch(*self.handle) } {
            0 | MYSQL_DATA_TRUNCATED => match self.read_row() {
                Some(row) => Fetch::Row(row),
                None => Fetch::Failed,
            },
            MYSQL_NO_DATA => Fetch::Done,
            _ => Fetch::Failed,
        }
    }

    fn insert_id(&self) -> u64 {
        unsafe { sys::mysql_stmt_insert_id(*self.handle) }
    }

    fn affected_rows(&self) -> u64 {
        match unsafe { sys::mysql_stmt_affected_rows(*self.handle) } {
            u64::MAX => 0,
            v => v,
        }
    }

    fn free_result(&mut self) -> bool {
        self.failure = None;
        unsafe { !sys::mysql_stmt_free_result(*self.handle) }
    }

    fn diagnostic(&self) -> Diagnostic {
        match &self.failure {
            Some(failure) => failure.clone(),
            None => unsafe {
                read_diagnostic(
                    sys::mysql_stmt_errno(*self.handle),
                    sys::mysql_stmt_error(*self.handle),
                )
            },
        }
    }

    fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::ParamBuffer;
    use crate::BindType;
    use mysqlclient_sys::enum_field_types as FieldType;
    use sluice_core::Value;

    #[test]
    fn lob_without_chunks_is_null() {
        let mut buffer = ParamBuffer::new(BindType::Blob, Value::Null);
        let bind = buffer.bind();
        assert!(matches!(bind.buffer_type, FieldType::MYSQL_TYPE_LONG_BLOB));
        assert!(!bind.is_null.is_null());
        assert!(unsafe { *bind.is_null });
        assert!(bind.buffer.is_null());
    }

    #[test]
    fn scalars() {
        let mut buffer = ParamBuffer::new(BindType::Integer, Value::Int32(Some(7)));
        let bind = buffer.bind();
        assert!(matches!(bind.buffer_type, FieldType::MYSQL_TYPE_LONGLONG));
        assert_eq!(unsafe { *(bind.buffer as *const i64) }, 7);
        let mut buffer = ParamBuffer::new(BindType::String, Value::Boolean(Some(true)));
        let bind = buffer.bind();
        assert!(matches!(bind.buffer_type, FieldType::MYSQL_TYPE_STRING));
        assert_eq!(bind.buffer_length, 1);
        assert_eq!(unsafe { *(bind.buffer as *const u8) }, b'1');
    }
}
