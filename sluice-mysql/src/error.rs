use crate::Diagnostic;
use sluice_core::{DatabaseError, DriverError, Error, log_error};

/// Translate a native error into a [`DatabaseError`].
///
/// Code zero means no error and gives `None`. The query text, when available, follows the native
/// message on its own line. Messages that are not valid UTF-8 are decoded lossily and the original
/// bytes are kept in [`DatabaseError::raw`], the decoding failure becomes the cause.
pub fn translate_error(code: u32, message: &[u8], query: Option<&str>) -> Option<DatabaseError> {
    if code == 0 {
        return None;
    }
    let (text, raw, cause) = match std::str::from_utf8(message) {
        Ok(text) => (text.to_string(), None, None),
        Err(e) => (
            String::from_utf8_lossy(message).into_owned(),
            Some(Box::<[u8]>::from(message)),
            Some(e),
        ),
    };
    let text = if text.trim().is_empty() {
        "MySQL error"
    } else {
        text.as_str()
    };
    let mut error = DatabaseError::new(
        code,
        match query {
            Some(query) => format!("{}\n{}\n", text, query),
            None => text.to_string(),
        },
    );
    error.query = query.map(ToString::to_string);
    error.raw = raw;
    Some(match cause {
        Some(cause) => error.with_cause(cause),
        None => error,
    })
}

pub(crate) fn connection_error(context: impl Into<String>, diagnostic: &Diagnostic) -> Error {
    log_error!(Error::new(DriverError::Connection {
        context: context.into(),
        source: diagnostic.translate(None),
    }))
}

pub(crate) fn execution_error(
    context: impl Into<String>,
    diagnostic: &Diagnostic,
    query: Option<&str>,
) -> Error {
    log_error!(Error::new(DriverError::Execution {
        context: context.into(),
        source: diagnostic.translate(query),
    }))
}

pub(crate) fn resource_state(operation: &'static str, reason: &'static str) -> Error {
    log_error!(Error::new(DriverError::ResourceState { operation, reason }))
}

pub(crate) fn unsupported(operation: &'static str) -> Error {
    log_error!(Error::new(DriverError::Capability {
        operation,
        backend: crate::DRIVER_NAME,
    }))
}

#[cfg(test)]
mod tests {
    use super::translate_error;

    #[test]
    fn no_error() {
        assert!(translate_error(0, b"", None).is_none());
        assert!(translate_error(0, b"ignored", Some("SELECT 1")).is_none());
    }

    #[test]
    fn with_query() {
        let error = translate_error(1064, b"You have an error", Some("SELEC 1")).unwrap();
        assert_eq!(error.code, 1064);
        assert_eq!(error.message, "You have an error\nSELEC 1\n");
        assert_eq!(error.query.as_deref(), Some("SELEC 1"));
        assert!(error.raw.is_none());
        assert!(error.cause.is_none());
        assert_eq!(error.to_string(), "[1064] You have an error\nSELEC 1");
    }

    #[test]
    fn empty_message() {
        let error = translate_error(2006, b"", None).unwrap();
        assert_eq!(error.message, "MySQL error");
        let error = translate_error(2006, b"  ", Some("SELECT 1")).unwrap();
        assert_eq!(error.message, "MySQL error\nSELECT 1\n");
    }

    #[test]
    fn invalid_utf8() {
        // "Таблица" in cp1251
        let message = [0xd2u8, 0xe0, 0xe1, 0xeb, 0xe8, 0xf6, 0xe0];
        let error = translate_error(1146, &message, None).unwrap();
        assert!(error.message.contains('\u{FFFD}'));
        assert_eq!(error.raw.as_deref(), Some(message.as_slice()));
        let cause = std::error::Error::source(&error).unwrap();
        assert!(cause.is::<std::str::Utf8Error>());
    }
}
