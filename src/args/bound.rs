//! Value-side argument types.
//!
//! A parse never mutates the declared schema. Instead it produces a
//! [`BoundArgs`] map pairing every schema key with the value that was
//! parsed for it, or with nothing when the user did not supply one and no
//! default applied. Modules read their arguments from this map at
//! execution time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::args::types::ArgKind;
use crate::error::{ClyjinError, Result};

/// A typed argument value produced by one parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Path(PathBuf),
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Short lowercase name of the runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::Str(_) => "str",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Bool(_) => "bool",
            ArgValue::Path(_) => "path",
            ArgValue::List(_) => "list",
        }
    }

    /// Permissive type check against a declared kind.
    ///
    /// `Raw` accepts anything, an `Int` value satisfies a declared
    /// `Float`, and a string satisfies a declared `Path`. Lists check
    /// their elements. Everything else requires an exact kind match.
    pub fn satisfies(&self, kind: ArgKind) -> bool {
        if kind == ArgKind::Raw {
            return true;
        }
        match self {
            ArgValue::Str(_) => matches!(kind, ArgKind::Str | ArgKind::Path),
            ArgValue::Int(_) => matches!(kind, ArgKind::Int | ArgKind::Float),
            ArgValue::Float(_) => kind == ArgKind::Float,
            ArgValue::Bool(_) => kind == ArgKind::Bool,
            ArgValue::Path(_) => kind == ArgKind::Path,
            ArgValue::List(items) => items.iter().all(|item| item.satisfies(kind)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(x) => Some(*x),
            ArgValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ArgValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render the value as a CLI token, as used for grammar defaults.
    pub fn to_cli_token(&self) -> String {
        match self {
            ArgValue::Str(s) => s.clone(),
            ArgValue::Int(n) => n.to_string(),
            ArgValue::Float(x) => x.to_string(),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::Path(p) => p.display().to_string(),
            ArgValue::List(items) => items
                .iter()
                .map(ArgValue::to_cli_token)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// The values bound to a module's argument keys by one parse.
///
/// Every key of the module's declared [`crate::args::ArgSet`] is bound,
/// either to a value or to "not supplied". Reading a key that was never
/// bound, or one bound without a value, fails with the unset-value
/// condition; [`BoundArgs::get_opt`] is the non-failing accessor for
/// modules that handle absence themselves.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: BTreeMap<String, Option<ArgValue>>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to a parsed value, or to `None` when the grammar
    /// reported the argument as not supplied.
    pub fn bind(&mut self, key: impl Into<String>, value: Option<ArgValue>) {
        self.values.insert(key.into(), value);
    }

    /// Read a bound value, failing with the unset-value condition when
    /// the key was never bound or carries no value.
    pub fn get(&self, key: &str) -> Result<&ArgValue> {
        self.values
            .get(key)
            .and_then(Option::as_ref)
            .ok_or_else(|| ClyjinError::UnsetValue {
                key: key.to_string(),
            })
    }

    /// Read a bound value, returning `None` for unset keys.
    pub fn get_opt(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    /// Whether the key was bound at all, supplied or not.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
