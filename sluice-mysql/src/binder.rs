use sluice_core::{Lob, Parameter, Value};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Write},
};

/// Wire type code of a positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    String,
    Integer,
    Double,
    Blob,
}

impl BindType {
    pub const fn code(self) -> char {
        match self {
            BindType::String => 's',
            BindType::Integer => 'i',
            BindType::Double => 'd',
            BindType::Blob => 'b',
        }
    }
    /// Code of a scalar value, everything that is neither an integer, a float nor a string is sent
    /// as a string. Nulls are strings whatever their declared type.
    pub fn of(value: &Value) -> Self {
        match value {
            v if v.is_null() => BindType::String,
            Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..) => BindType::Integer,
            Value::Float32(..) | Value::Float64(..) => BindType::Double,
            _ => BindType::String,
        }
    }
}

/// Ordered bind type codes, displayed as the usual type string (`"isdb"`).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BindTypes(pub Vec<BindType>);

impl BindTypes {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl ExactSizeIterator<Item = BindType> + '_ {
        self.0.iter().copied()
    }
}

impl Display for BindTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|v| f.write_char(v.code()))
    }
}

/// Large objects waiting to be streamed, by parameter position.
pub type LobQueue = BTreeMap<usize, Lob>;

/// A parameter list split into what is bound positionally and what is streamed afterwards.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Binding {
    pub types: BindTypes,
    pub values: Vec<Value>,
    pub lobs: LobQueue,
}

impl Binding {
    pub fn classify(params: Vec<Parameter>) -> Self {
        let mut binding = Binding {
            types: BindTypes(Vec::with_capacity(params.len())),
            values: Vec::with_capacity(params.len()),
            lobs: LobQueue::new(),
        };
        for (position, param) in params.into_iter().enumerate() {
            match param {
                Parameter::Scalar(value) => {
                    binding.types.0.push(BindType::of(&value));
                    binding.values.push(value);
                }
                Parameter::Text(lob) | Parameter::Binary(lob) => {
                    binding.types.0.push(BindType::Blob);
                    binding.values.push(Value::Null);
                    binding.lobs.insert(position, lob);
                }
            }
        }
        debug_assert_eq!(binding.types.len(), binding.values.len());
        binding
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
