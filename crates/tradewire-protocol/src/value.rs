//! The polymorphic `data` field of a response.
//!
//! A response's payload shape depends on which request produced it: a
//! token string for a login, a number for a balance, a list of stocks,
//! a symbol → quantity map. On the wire the concrete shape is named by a
//! type tag that travels with the value, so the decoder builds whatever
//! the tag says rather than what the caller asked for.
//!
//! The set of shapes is closed. [`Value`] enumerates every variant the
//! codec will ever construct; a tag outside that set is a decode error,
//! never a "best effort" reconstruction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Stock;

/// A self-describing value carried in [`Response::data`](crate::Response).
///
/// `#[serde(tag = "type", content = "value")]` keeps the JSON form
/// tagged the same way the binary form is:
///   `{ "type": "Double", "value": 1000.0 }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// No data (failed requests, Buy/Sell acknowledgements).
    #[default]
    Null,
    Bool(bool),
    /// 32-bit signed integer. Quantities are always this width.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    Double(f64),
    Str(String),
    List(Vec<Value>),
    /// String-keyed mapping. `BTreeMap` keeps encoding deterministic.
    Map(BTreeMap<String, Value>),
    /// A named record: one row of the stock listing.
    Stock(Stock),
}

impl Value {
    /// Short name of the concrete shape, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Stock(_) => "stock",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view. Integers widen to `f64`; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Int(i) => Some(f64::from(*i)),
            Self::Long(l) => Some(*l as f64),
            _ => None,
        }
    }

    /// 32-bit view. A `Long` qualifies only if it fits.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Long(l) => i32::try_from(*l).ok(),
            _ => None,
        }
    }

    /// Interprets a list of stock records. An empty list qualifies;
    /// a list holding anything but stocks does not.
    pub fn as_stocks(&self) -> Option<Vec<Stock>> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::Stock(stock) => Some(stock.clone()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Interprets a symbol → quantity mapping.
    pub fn as_portfolio(&self) -> Option<BTreeMap<String, i32>> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .map(|(symbol, qty)| qty.as_i32().map(|q| (symbol.clone(), q)))
                .collect(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Stock> for Value {
    fn from(v: Stock) -> Self {
        Self::Stock(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(entries: BTreeMap<String, T>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
