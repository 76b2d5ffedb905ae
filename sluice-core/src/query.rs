use crate::{AsValue, Error, Result, Value, truncate_long};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    ops::BitOr,
    sync::Arc,
};

/// Query text handed to a driver, together with metadata used to identify it in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInfo {
    text: Arc<str>,
    name: Option<Cow<'static, str>>,
}

impl QueryInfo {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            name: None,
        }
    }
    /// Attach a name (for example the query builder operation that generated the text).
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<&str> for QueryInfo {
    fn from(value: &str) -> Self {
        QueryInfo::new(value)
    }
}

impl From<String> for QueryInfo {
    fn from(value: String) -> Self {
        QueryInfo::new(value)
    }
}

impl Display for QueryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "[{}] ", name)?;
        }
        write!(f, "{}", truncate_long!(self.text))
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Decode the column `name` into `T`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::msg(format!("The row has no column named `{}`", name)))?;
        T::try_from_value(value.clone())
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// Shape of the rows produced by a cursor.
///
/// `ASSOC` addresses columns by name, `NUM` by position, `BOTH` allows either. An empty set is
/// treated as `BOTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchMode(u8);

impl FetchMode {
    pub const ASSOC: FetchMode = FetchMode(0b01);
    pub const NUM: FetchMode = FetchMode(0b10);
    pub const BOTH: FetchMode = FetchMode(0b11);

    pub const fn contains(self, other: FetchMode) -> bool {
        self.0 & other.0 == other.0
    }
    /// True when the rows carry their column labels.
    pub const fn is_labeled(self) -> bool {
        self.0 == 0 || self.contains(Self::ASSOC)
    }
}

impl Default for FetchMode {
    fn default() -> Self {
        Self::BOTH
    }
}

impl BitOr for FetchMode {
    type Output = FetchMode;
    fn bitor(self, rhs: Self) -> Self::Output {
        FetchMode(self.0 | rhs.0)
    }
}

/// A row produced by a cursor, shaped according to the requested [`FetchMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedRow {
    /// Values addressable by column name (and position).
    Labeled(RowLabeled),
    /// Values addressable only by position.
    Positional(Row),
}

impl FetchedRow {
    pub fn values(&self) -> &[Value] {
        match self {
            FetchedRow::Labeled(row) => row.values(),
            FetchedRow::Positional(row) => row,
        }
    }
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values().get(index)
    }
    /// Column lookup by name, always `None` for positional rows.
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        match self {
            FetchedRow::Labeled(row) => row.get_column(name),
            FetchedRow::Positional(..) => None,
        }
    }
    pub fn into_values(self) -> Row {
        match self {
            FetchedRow::Labeled(row) => row.values,
            FetchedRow::Positional(row) => row,
        }
    }
}
