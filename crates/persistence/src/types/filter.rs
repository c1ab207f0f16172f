//! Recursive search filters.
//!
//! A [`Filter`] is a tree whose leaves are [`AtomicCondition`]s and whose
//! internal nodes are [`LogicalNode`]s:
//!
//! ```json
//! {
//!   "operator": "OR",
//!   "conditions": [
//!     {"field": "compounds.details.corporate_compound_id", "operator": "=", "value": "DG-000001"},
//!     {"field": "compounds.structure", "operator": "IS SIMILAR", "value": "CCO", "threshold": 0.7}
//!   ]
//! }
//! ```
//!
//! Structural invariants are enforced at construction (and therefore at
//! deserialization): a logical node needs at least two children, and a
//! similarity threshold is present exactly when the operator is `IS SIMILAR`.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::FieldPath;
use crate::error::ValidationError;

/// Comparison operators accepted in atomic conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompareOp {
    /// `=`.
    Equals,
    /// `!=`.
    NotEquals,
    /// `IN`, against a list of values.
    In,
    /// `STARTS WITH`, a case-insensitive prefix match.
    StartsWith,
    /// `ENDS WITH`, a case-insensitive suffix match.
    EndsWith,
    /// `LIKE`, with caller-supplied wildcards.
    Like,
    /// `CONTAINS`, a case-insensitive substring match.
    Contains,
    /// `<`.
    LessThan,
    /// `>`.
    GreaterThan,
    /// `<=`.
    LessThanOrEqual,
    /// `>=`.
    GreaterThanOrEqual,
    /// `RANGE`, inclusive between two bounds.
    Range,
    /// `BEFORE`, strictly earlier timestamp.
    Before,
    /// `AFTER`, strictly later timestamp.
    After,
    /// `ON`, same calendar day.
    On,
    /// `IS SIMILAR`, Tanimoto similarity at or above a threshold.
    IsSimilar,
    /// `IS SUBSTRUCTURE OF`, the stored structure is contained in the query.
    IsSubstructureOf,
    /// `HAS SUBSTRUCTURE`, the stored structure contains the query.
    HasSubstructure,
}

/// Groups operators by the shape of SQL they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// `=` and `!=`.
    Equality,
    /// `IN (...)`.
    Membership,
    /// `LIKE` and the wildcard-wrapping `ILIKE` variants.
    Pattern,
    /// `<`, `>`, `<=`, `>=`.
    Ordering,
    /// `BETWEEN` with two bounds.
    Range,
    /// `BEFORE`, `AFTER`, `ON`.
    Temporal,
    /// Structure-extension predicates.
    Molecular,
}

impl CompareOp {
    /// Every operator.
    pub const ALL: [CompareOp; 18] = [
        CompareOp::Equals,
        CompareOp::NotEquals,
        CompareOp::In,
        CompareOp::StartsWith,
        CompareOp::EndsWith,
        CompareOp::Like,
        CompareOp::Contains,
        CompareOp::LessThan,
        CompareOp::GreaterThan,
        CompareOp::LessThanOrEqual,
        CompareOp::GreaterThanOrEqual,
        CompareOp::Range,
        CompareOp::Before,
        CompareOp::After,
        CompareOp::On,
        CompareOp::IsSimilar,
        CompareOp::IsSubstructureOf,
        CompareOp::HasSubstructure,
    ];

    /// Returns the operator keyword as written in requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "!=",
            CompareOp::In => "IN",
            CompareOp::StartsWith => "STARTS WITH",
            CompareOp::EndsWith => "ENDS WITH",
            CompareOp::Like => "LIKE",
            CompareOp::Contains => "CONTAINS",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::GreaterThanOrEqual => ">=",
            CompareOp::Range => "RANGE",
            CompareOp::Before => "BEFORE",
            CompareOp::After => "AFTER",
            CompareOp::On => "ON",
            CompareOp::IsSimilar => "IS SIMILAR",
            CompareOp::IsSubstructureOf => "IS SUBSTRUCTURE OF",
            CompareOp::HasSubstructure => "HAS SUBSTRUCTURE",
        }
    }

    /// Returns the family this operator belongs to.
    pub fn family(&self) -> OperatorFamily {
        match self {
            CompareOp::Equals | CompareOp::NotEquals => OperatorFamily::Equality,
            CompareOp::In => OperatorFamily::Membership,
            CompareOp::StartsWith | CompareOp::EndsWith | CompareOp::Like | CompareOp::Contains => {
                OperatorFamily::Pattern
            }
            CompareOp::LessThan
            | CompareOp::GreaterThan
            | CompareOp::LessThanOrEqual
            | CompareOp::GreaterThanOrEqual => OperatorFamily::Ordering,
            CompareOp::Range => OperatorFamily::Range,
            CompareOp::Before | CompareOp::After | CompareOp::On => OperatorFamily::Temporal,
            CompareOp::IsSimilar | CompareOp::IsSubstructureOf | CompareOp::HasSubstructure => {
                OperatorFamily::Molecular
            }
        }
    }

    /// Returns true for the structure-extension operators.
    pub fn is_molecular(&self) -> bool {
        self.family() == OperatorFamily::Molecular
    }

    /// Returns true when the operator is affected by stored value qualifiers.
    pub fn is_qualifier_aware(&self) -> bool {
        matches!(
            self.family(),
            OperatorFamily::Ordering | OperatorFamily::Range
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        CompareOp::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnsupportedOperator {
                operator: s.to_string(),
            })
    }
}

impl TryFrom<String> for CompareOp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompareOp> for String {
    fn from(op: CompareOp) -> Self {
        op.as_str().to_string()
    }
}

/// Logical connectives for combining conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogicOp {
    /// Every child must match.
    And,
    /// At least one child must match.
    Or,
}

impl LogicOp {
    /// Returns the SQL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(LogicOp::And),
            "OR" => Ok(LogicOp::Or),
            _ => Err(ValidationError::UnsupportedLogicalOperator {
                operator: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LogicOp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogicOp> for String {
    fn from(op: LogicOp) -> Self {
        op.as_str().to_string()
    }
}

/// A single `field operator value` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAtomicCondition")]
pub struct AtomicCondition {
    field: FieldPath,
    operator: CompareOp,
    value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct RawAtomicCondition {
    field: FieldPath,
    operator: CompareOp,
    value: Value,
    #[serde(default)]
    threshold: Option<f64>,
}

impl AtomicCondition {
    /// Creates a condition, enforcing that `threshold` is present exactly
    /// when the operator is `IS SIMILAR`.
    pub fn new(
        field: FieldPath,
        operator: CompareOp,
        value: impl Into<Value>,
        threshold: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let invalid = |message: String| ValidationError::InvalidCondition {
            field: field.to_string(),
            message,
        };

        match (operator, threshold) {
            (CompareOp::IsSimilar, None) => {
                return Err(invalid(
                    "threshold is required for IS SIMILAR operator".to_string(),
                ));
            }
            (CompareOp::IsSimilar, Some(_)) | (_, None) => {}
            (op, Some(_)) => {
                return Err(invalid(format!(
                    "threshold is only allowed for IS SIMILAR, not {}",
                    op
                )));
            }
        }

        Ok(Self {
            field,
            operator,
            value: value.into(),
            threshold,
        })
    }

    /// Shorthand for a condition without a threshold.
    pub fn compare(
        field: FieldPath,
        operator: CompareOp,
        value: impl Into<Value>,
    ) -> Result<Self, ValidationError> {
        Self::new(field, operator, value, None)
    }

    /// The field being compared.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// The comparison operator.
    pub fn operator(&self) -> CompareOp {
        self.operator
    }

    /// The raw comparison value (scalar or list).
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The similarity threshold, for `IS SIMILAR`.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }
}

impl TryFrom<RawAtomicCondition> for AtomicCondition {
    type Error = ValidationError;

    fn try_from(raw: RawAtomicCondition) -> Result<Self, Self::Error> {
        AtomicCondition::new(raw.field, raw.operator, raw.value, raw.threshold)
    }
}

/// An `AND`/`OR` combination of two or more filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogicalNode")]
pub struct LogicalNode {
    operator: LogicOp,
    conditions: Vec<Filter>,
}

#[derive(Deserialize)]
struct RawLogicalNode {
    operator: LogicOp,
    conditions: Vec<Filter>,
}

impl LogicalNode {
    /// Creates a logical node. Fewer than two conditions is rejected as
    /// redundant.
    pub fn new(operator: LogicOp, conditions: Vec<Filter>) -> Result<Self, ValidationError> {
        if conditions.len() < 2 {
            return Err(ValidationError::InvalidFilter {
                message: format!(
                    "{} node needs at least 2 conditions, got {}; use the condition directly",
                    operator,
                    conditions.len()
                ),
            });
        }
        Ok(Self {
            operator,
            conditions,
        })
    }

    /// The connective.
    pub fn operator(&self) -> LogicOp {
        self.operator
    }

    /// The child filters.
    pub fn conditions(&self) -> &[Filter] {
        &self.conditions
    }
}

impl TryFrom<RawLogicalNode> for LogicalNode {
    type Error = ValidationError;

    fn try_from(raw: RawLogicalNode) -> Result<Self, Self::Error> {
        LogicalNode::new(raw.operator, raw.conditions)
    }
}

/// A filter tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    /// Leaf comparison.
    Atomic(AtomicCondition),
    /// `AND`/`OR` of child filters.
    Logical(LogicalNode),
}

impl Filter {
    /// Combines filters with `AND`.
    pub fn and(conditions: Vec<Filter>) -> Result<Self, ValidationError> {
        LogicalNode::new(LogicOp::And, conditions).map(Filter::Logical)
    }

    /// Combines filters with `OR`.
    pub fn or(conditions: Vec<Filter>) -> Result<Self, ValidationError> {
        LogicalNode::new(LogicOp::Or, conditions).map(Filter::Logical)
    }
}

impl From<AtomicCondition> for Filter {
    fn from(condition: AtomicCondition) -> Self {
        Filter::Atomic(condition)
    }
}

impl From<LogicalNode> for Filter {
    fn from(node: LogicalNode) -> Self {
        Filter::Logical(node)
    }
}

// Dispatches on the presence of `conditions` so that validation messages from
// the chosen variant are surfaced instead of an untagged-enum mismatch.
impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(D::Error::custom("filter must be a JSON object"));
        }
        if value.get("conditions").is_some() {
            serde_json::from_value::<LogicalNode>(value)
                .map(Filter::Logical)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value::<AtomicCondition>(value)
                .map(Filter::Atomic)
                .map_err(D::Error::custom)
        }
    }
}
