#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$crate::floor_char_boundary(&$query, 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

/// Logs the error with its whole chain of causes and evaluates to it.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error = $error;
        ::log::error!("{:#}", error);
        error
    }};
}

/// Largest char boundary not greater than `max`.
pub fn floor_char_boundary(value: &str, max: usize) -> usize {
    if max >= value.len() {
        return value.len();
    }
    (0..=max)
        .rev()
        .find(|i| value.is_char_boundary(*i))
        .unwrap_or(0)
}
