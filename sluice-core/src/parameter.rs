use crate::{AsValue, Value};

/// Content of a large object, delivered to the driver in one or more chunks.
///
/// The chunks are kept in insertion order, drivers stream them in that same order.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Lob {
    chunks: Vec<Vec<u8>>,
}

impl Lob {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_chunks<C: Into<Vec<u8>>>(chunks: impl IntoIterator<Item = C>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
    pub fn push(&mut self, chunk: impl Into<Vec<u8>>) -> &mut Self {
        self.chunks.push(chunk.into());
        self
    }
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.chunks.iter().map(Vec::as_slice)
    }
    /// True when there is no chunk at all, a lob made of empty chunks is not empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

impl<C: Into<Vec<u8>>> FromIterator<C> for Lob {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        Self::from_chunks(iter)
    }
}

/// Kind of a [`Parameter`], decided when the parameter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Scalar,
    Text,
    Binary,
}

/// A query parameter.
///
/// Large objects are tagged explicitly by the caller, drivers never guess a lob from the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Plain value bound positionally.
    Scalar(Value),
    /// Character large object.
    Text(Lob),
    /// Binary large object.
    Binary(Lob),
}

impl Parameter {
    pub fn text<C: Into<Vec<u8>>>(chunks: impl IntoIterator<Item = C>) -> Self {
        Parameter::Text(Lob::from_chunks(chunks))
    }
    pub fn binary<C: Into<Vec<u8>>>(chunks: impl IntoIterator<Item = C>) -> Self {
        Parameter::Binary(Lob::from_chunks(chunks))
    }
    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::Scalar(..) => ParameterKind::Scalar,
            Parameter::Text(..) => ParameterKind::Text,
            Parameter::Binary(..) => ParameterKind::Binary,
        }
    }
    pub fn is_lob(&self) -> bool {
        !matches!(self, Parameter::Scalar(..))
    }
}

impl<V: AsValue> From<V> for Parameter {
    fn from(value: V) -> Self {
        Parameter::Scalar(value.as_value())
    }
}

/// Build a `Vec<Parameter>` out of heterogeneous values.
///
/// ```rust
/// use sluice_core::{Parameter, params};
/// let params = params![42, "hello", Parameter::text(["abc", "def"])];
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => { ::std::vec::Vec::<$crate::Parameter>::new() };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Parameter::from($value)),+]
    };
}
