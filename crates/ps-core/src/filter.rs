//! Filter predicates: a single keyed comparison over sample attributes.

use ps_common::error::{Error, Result};
use ps_common::value::{self, AttrValue};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Comparison operator for a filter.
///
/// The operator set is closed; unknown operator tokens are rejected when
/// parsing, so evaluation never sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Comparator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::Eq => write!(f, "="),
            Comparator::Ne => write!(f, "!="),
            Comparator::Lt => write!(f, "<"),
            Comparator::Le => write!(f, "<="),
            Comparator::Gt => write!(f, ">"),
            Comparator::Ge => write!(f, ">="),
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "=" => Ok(Comparator::Eq),
            "!=" => Ok(Comparator::Ne),
            "<" => Ok(Comparator::Lt),
            "<=" => Ok(Comparator::Le),
            ">" => Ok(Comparator::Gt),
            ">=" => Ok(Comparator::Ge),
            other => Err(format!("unknown comparator: {other}")),
        }
    }
}

/// Filter operand: a single scalar or an explicit list.
///
/// Text scalars may still encode a pseudo-list ("a,b,c" or "[1, 2]");
/// the coercion happens at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Operand {
    List(Vec<AttrValue>),
    Scalar(AttrValue),
}

impl Operand {
    /// Coerce the operand into a list of raw values.
    pub fn to_list(&self) -> Vec<AttrValue> {
        match self {
            Operand::List(items) => items.clone(),
            Operand::Scalar(value) => value::to_list(Some(value)),
        }
    }
}

impl From<AttrValue> for Operand {
    fn from(value: AttrValue) -> Self {
        Operand::Scalar(value)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Scalar(AttrValue::from(s))
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Scalar(AttrValue::from(n))
    }
}

impl From<Vec<AttrValue>> for Operand {
    fn from(items: Vec<AttrValue>) -> Self {
        Operand::List(items)
    }
}

/// A single keyed comparison, stateless and pure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Filter {
    /// Attribute key this filter reads from a sample.
    pub key: String,
    pub comparator: Comparator,
    pub operand: Operand,
}

impl Filter {
    pub fn new(key: impl Into<String>, comparator: Comparator, operand: impl Into<Operand>) -> Self {
        Self {
            key: key.into(),
            comparator,
            operand: operand.into(),
        }
    }

    /// Evaluate this filter against a sample's value at [`Filter::key`].
    ///
    /// Both sides are list-coerced first; a missing key behaves as an
    /// empty list.
    ///
    /// - `=`: both lists non-empty and some pair of elements is equal.
    /// - `!=`: vacuously true for an empty operand list; otherwise no
    ///   pair of elements may be equal (also vacuous for an empty
    ///   sample list).
    /// - `<`, `<=`, `>`, `>=`: the operand must coerce to exactly one
    ///   element ([`Error::InvalidFilterOperand`] otherwise); true iff
    ///   some sample-side element satisfies the ordering. Kind
    ///   mismatches surface as [`Error::InvalidComparison`].
    pub fn evaluate(&self, sample_value: Option<&AttrValue>) -> Result<bool> {
        let left = value::to_list(sample_value);
        let right = self.operand.to_list();

        match self.comparator {
            Comparator::Eq => {
                if left.is_empty() || right.is_empty() {
                    return Ok(false);
                }
                Ok(left
                    .iter()
                    .any(|l| right.iter().any(|r| value::eq(l, r))))
            }
            Comparator::Ne => {
                if right.is_empty() {
                    return Ok(true);
                }
                Ok(left
                    .iter()
                    .all(|l| right.iter().all(|r| !value::eq(l, r))))
            }
            Comparator::Lt | Comparator::Le | Comparator::Gt | Comparator::Ge => {
                if right.len() != 1 {
                    return Err(Error::InvalidFilterOperand {
                        comparator: self.comparator.to_string(),
                        len: right.len(),
                    });
                }
                let bound = &right[0];
                for l in &left {
                    let ord = value::cmp(l, bound)?;
                    let satisfied = match self.comparator {
                        Comparator::Lt => ord == Ordering::Less,
                        Comparator::Le => ord != Ordering::Greater,
                        Comparator::Gt => ord == Ordering::Greater,
                        Comparator::Ge => ord != Ordering::Less,
                        Comparator::Eq | Comparator::Ne => unreachable!(),
                    };
                    if satisfied {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}
