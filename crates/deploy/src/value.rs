//! Constructor argument values.
//!
//! Whether an argument is a concrete value or a reference to another contract is decided once,
//! when the raw input is parsed against the ABI parameter. Everything downstream matches on
//! [`ArgValue`] instead of re-inspecting strings.

use crate::placeholder;
use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::Param;
use alloy_primitives::{Address, B256, Bytes, I256, U256};
use itertools::Itertools;
use std::fmt;

/// Errors produced while turning raw input into typed arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgError {
    #[error("could not resolve the type of {param}")]
    UnknownType {
        param: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    #[error("invalid value {value:?} for {param}")]
    InvalidValue {
        param: String,
        value: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    #[error("{param} cannot reference a contract, only `address` parameters can hold {value:?}")]
    PlaceholderType { param: String, value: String },
    #[error("values of type {0} are not supported as constructor arguments")]
    Unsupported(String),
    #[error("value {value} does not fit type {ty}")]
    Mismatch { ty: String, value: String },
    #[error("expected {expected} constructor arguments, got {actual}")]
    Arity { expected: usize, actual: usize },
}

/// A concrete constructor argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedValue {
    Uint(U256),
    Int(I256),
    Bool(bool),
    Address(Address),
    /// Dynamic `bytes` and fixed `bytesN` alike.
    Bytes(Bytes),
    String(String),
    /// Arrays and tuples.
    List(Vec<TypedValue>),
}

impl TypedValue {
    /// Converts a decoded ABI value.
    pub fn from_sol(value: DynSolValue) -> Result<Self, ArgError> {
        Ok(match value {
            DynSolValue::Bool(b) => Self::Bool(b),
            DynSolValue::Int(i, _) => Self::Int(i),
            DynSolValue::Uint(u, _) => Self::Uint(u),
            DynSolValue::FixedBytes(word, size) => {
                Self::Bytes(Bytes::copy_from_slice(&word[..size]))
            }
            DynSolValue::Address(address) => Self::Address(address),
            DynSolValue::Bytes(bytes) => Self::Bytes(bytes.into()),
            DynSolValue::String(s) => Self::String(s),
            DynSolValue::Array(values)
            | DynSolValue::FixedArray(values)
            | DynSolValue::Tuple(values) => {
                Self::List(values.into_iter().map(Self::from_sol).collect::<Result<_, _>>()?)
            }
            other => {
                let ty = other.sol_type_name().map(|name| name.into_owned()).unwrap_or_default();
                return Err(ArgError::Unsupported(ty));
            }
        })
    }

    /// Converts the value into an ABI value of type `ty`, checking that it fits.
    pub fn to_sol(&self, ty: &DynSolType) -> Result<DynSolValue, ArgError> {
        let mismatch =
            || ArgError::Mismatch { ty: ty.sol_type_name().into_owned(), value: self.to_string() };
        Ok(match (self, ty) {
            (Self::Uint(value), DynSolType::Uint(bits)) => {
                if *bits < 256 && *value >= U256::from(1) << *bits {
                    return Err(mismatch());
                }
                DynSolValue::Uint(*value, *bits)
            }
            (Self::Int(value), DynSolType::Int(bits)) => {
                if *bits < 256 {
                    // Two's complement bounds of an `int<bits>`.
                    let max = I256::from_raw((U256::from(1) << (*bits - 1)) - U256::from(1));
                    let min = I256::from_raw(U256::MAX << (*bits - 1));
                    if *value > max || *value < min {
                        return Err(mismatch());
                    }
                }
                DynSolValue::Int(*value, *bits)
            }
            (Self::Bool(b), DynSolType::Bool) => DynSolValue::Bool(*b),
            (Self::Address(address), DynSolType::Address) => DynSolValue::Address(*address),
            (Self::Bytes(bytes), DynSolType::Bytes) => DynSolValue::Bytes(bytes.to_vec()),
            (Self::Bytes(bytes), DynSolType::FixedBytes(size)) => {
                if bytes.len() != *size {
                    return Err(mismatch());
                }
                DynSolValue::FixedBytes(B256::right_padding_from(bytes), *size)
            }
            (Self::String(s), DynSolType::String) => DynSolValue::String(s.clone()),
            (Self::List(items), DynSolType::Array(inner)) => {
                DynSolValue::Array(
                    items.iter().map(|item| item.to_sol(inner)).collect::<Result<_, _>>()?,
                )
            }
            (Self::List(items), DynSolType::FixedArray(inner, len)) => {
                if items.len() != *len {
                    return Err(mismatch());
                }
                DynSolValue::FixedArray(
                    items.iter().map(|item| item.to_sol(inner)).collect::<Result<_, _>>()?,
                )
            }
            (Self::List(items), DynSolType::Tuple(types)) => {
                if items.len() != types.len() {
                    return Err(mismatch());
                }
                DynSolValue::Tuple(
                    items
                        .iter()
                        .zip(types)
                        .map(|(item, ty)| item.to_sol(ty))
                        .collect::<Result<_, _>>()?,
                )
            }
            _ => return Err(mismatch()),
        })
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(u) => write!(f, "{u}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Address(address) => write!(f, "{address}"),
            Self::Bytes(bytes) => write!(f, "{bytes}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => write!(f, "[{}]", items.iter().format(", ")),
        }
    }
}

impl From<Address> for TypedValue {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<U256> for TypedValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A constructor argument as configured by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Concrete(TypedValue),
    /// The deployed address of the named contract.
    Placeholder(String),
}

impl ArgValue {
    /// Creates a reference to the address of contract `name`.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::Placeholder(name.into())
    }

    /// Parses raw user input for `param`.
    ///
    /// Input of the form `{{Name}}` becomes a [`ArgValue::Placeholder`], which is only allowed for
    /// `address` parameters. Anything else is coerced to the parameter's type.
    pub fn parse(input: &str, param: &Param) -> Result<Self, ArgError> {
        let ty = resolve_type(param)?;

        if let Some(name) = placeholder::decode(input) {
            if ty != DynSolType::Address {
                return Err(ArgError::PlaceholderType {
                    param: describe(param),
                    value: input.to_string(),
                });
            }
            return Ok(Self::Placeholder(name.to_string()));
        }

        let value = ty.coerce_str(input).map_err(|source| ArgError::InvalidValue {
            param: describe(param),
            value: input.to_string(),
            source,
        })?;
        TypedValue::from_sol(value).map(Self::Concrete)
    }

    /// Parses one raw input per constructor parameter.
    pub fn parse_all<S: AsRef<str>>(inputs: &[S], params: &[Param]) -> Result<Vec<Self>, ArgError> {
        if inputs.len() != params.len() {
            return Err(ArgError::Arity { expected: params.len(), actual: inputs.len() });
        }
        inputs.iter().zip(params).map(|(input, param)| Self::parse(input.as_ref(), param)).collect()
    }

    /// Returns the referenced contract name if this is a placeholder.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Self::Placeholder(name) => Some(name),
            Self::Concrete(_) => None,
        }
    }
}

impl From<TypedValue> for ArgValue {
    fn from(value: TypedValue) -> Self {
        Self::Concrete(value)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(value) => value.fmt(f),
            Self::Placeholder(name) => f.write_str(&placeholder::encode(name)),
        }
    }
}

/// Resolves the ABI type of `param`.
pub fn resolve_type(param: &Param) -> Result<DynSolType, ArgError> {
    param.resolve().map_err(|source| ArgError::UnknownType { param: describe(param), source })
}

fn describe(param: &Param) -> String {
    if param.name.is_empty() {
        format!("parameter of type `{}`", param.ty)
    } else {
        format!("parameter `{}` (`{}`)", param.name, param.ty)
    }
}
