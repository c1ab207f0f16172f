//! Operator catalog.
//!
//! Translates one [`AtomicCondition`] into a SQL predicate over a resolved
//! [`Operand`], numbering its placeholders from `param_offset + 1`.
//!
//! | Family | Operators | Parameters |
//! |--------|-----------|------------|
//! | Equality | `=` `!=` | 1 |
//! | Membership | `IN` | one per list element |
//! | Pattern | `LIKE` `CONTAINS` `STARTS WITH` `ENDS WITH` | 1 (wildcards added for the last three) |
//! | Ordering | `<` `>` `<=` `>=` | 1 |
//! | Range | `RANGE` | 2 |
//! | Temporal | `BEFORE` `AFTER` `ON` | 1 |
//! | Molecular | `IS SIMILAR` | 3 (query twice, threshold) |
//! | Molecular | `HAS SUBSTRUCTURE` `IS SUBSTRUCTURE OF` | 1 |
//!
//! # Qualified values
//!
//! Details rows may carry a `value_qualifier` (`0` exact, `1` below, `2`
//! above). Ordering and range comparisons against such rows expand into a
//! three-branch disjunction:
//!
//! ```text
//! <, <=   (q = 1) OR (q = 2 AND v < p) OR (q = 0 AND v <op> p)
//! >, >=   (q = 2) OR (q = 1 AND v > p) OR (q = 0 AND v <op> p)
//! RANGE   (q = 2 AND v < p2) OR (q = 1 AND v > p1) OR (q = 0 AND v BETWEEN p1 AND p2)
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::sql::{SqlFragment, SqlParam, placeholder};
use super::table_config::{ColumnType, STRUCTURE_FIELD};
use crate::error::SearchError;
use crate::types::{AtomicCondition, CompareOp, FieldPath, Level, OperatorFamily, ValueQualifier};

/// Accepted date formats for temporal operators.
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M"];

/// Direct columns holding raw structure text, which no operator may target.
pub const RAW_STRUCTURE_COLUMNS: [&str; 2] = ["canonical_smiles", "original_molfile"];

/// The left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A physical column.
    Column {
        /// Qualified column reference.
        expr: String,
        /// Column type, used to cast parameters.
        column_type: ColumnType,
    },
    /// A dynamic property value.
    Dynamic {
        /// Text projection over every value type.
        text: String,
        /// Numeric projection, cast to `NUMERIC`.
        numeric: String,
        /// Datetime projection, cast to `TIMESTAMPTZ`.
        temporal: String,
    },
}

impl Operand {
    /// Returns the expression and parameter cast for `family`.
    fn sides(&self, family: OperatorFamily) -> (String, Option<String>) {
        match (self, family) {
            (
                Operand::Dynamic { numeric, .. },
                OperatorFamily::Ordering | OperatorFamily::Range,
            ) => (numeric.clone(), Some("NUMERIC".to_string())),
            (Operand::Dynamic { temporal, .. }, OperatorFamily::Temporal) => {
                (temporal.clone(), Some("TIMESTAMPTZ".to_string()))
            }
            (Operand::Dynamic { text, .. }, _) => (text.clone(), None),

            (Operand::Column { expr, column_type }, OperatorFamily::Pattern) => {
                if column_type.is_text() {
                    (expr.clone(), None)
                } else {
                    (format!("CAST({} AS TEXT)", expr), None)
                }
            }
            (Operand::Column { expr, column_type }, OperatorFamily::Temporal) => match column_type {
                ColumnType::Temporal(name) => (expr.clone(), Some(name.clone())),
                _ => (
                    format!("CAST({} AS TIMESTAMPTZ)", expr),
                    Some("TIMESTAMPTZ".to_string()),
                ),
            },
            (Operand::Column { expr, .. }, OperatorFamily::Molecular) => (expr.clone(), None),
            (Operand::Column { expr, column_type }, _) => {
                (expr.clone(), column_type.param_cast().map(str::to_string))
            }
        }
    }
}

/// Which bound parameter a qualifier branch compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    First,
    Second,
}

/// The test applied within one qualifier branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchTest {
    /// The qualifier alone satisfies the branch.
    Always,
    /// `value <symbol> bound`.
    Compare(&'static str, Bound),
    /// `value BETWEEN first AND second`.
    Between,
}

/// One disjunct of a qualifier-aware comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QualifierBranch {
    pub qualifier: ValueQualifier,
    pub test: BranchTest,
}

/// Returns the disjuncts for a qualifier-aware operator, or `None` for
/// operators that ignore qualifiers.
pub(crate) fn qualifier_branches(op: CompareOp) -> Option<[QualifierBranch; 3]> {
    use BranchTest::{Always, Between, Compare};
    use ValueQualifier::{Equals, GreaterThan, LessThan};

    if !op.is_qualifier_aware() {
        return None;
    }
    let branch = |qualifier, test| QualifierBranch { qualifier, test };
    match op {
        CompareOp::LessThan | CompareOp::LessThanOrEqual => Some([
            branch(LessThan, Always),
            branch(GreaterThan, Compare("<", Bound::First)),
            branch(Equals, Compare(sql_symbol(op), Bound::First)),
        ]),
        CompareOp::GreaterThan | CompareOp::GreaterThanOrEqual => Some([
            branch(GreaterThan, Always),
            branch(LessThan, Compare(">", Bound::First)),
            branch(Equals, Compare(sql_symbol(op), Bound::First)),
        ]),
        CompareOp::Range => Some([
            branch(GreaterThan, Compare("<", Bound::Second)),
            branch(LessThan, Compare(">", Bound::First)),
            branch(Equals, Between),
        ]),
        _ => None,
    }
}

fn sql_symbol(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Equals => "=",
        CompareOp::NotEquals => "!=",
        CompareOp::LessThan | CompareOp::Before => "<",
        CompareOp::GreaterThan | CompareOp::After => ">",
        CompareOp::LessThanOrEqual => "<=",
        CompareOp::GreaterThanOrEqual => ">=",
        _ => "",
    }
}

/// Operator lookup, validation and SQL generation.
pub struct OperatorCatalog;

impl OperatorCatalog {
    /// Looks up an operator by keyword (case-insensitive).
    pub fn get_operator(name: &str) -> Result<CompareOp, SearchError> {
        name.parse().map_err(|_| SearchError::UnsupportedOperator {
            operator: name.to_string(),
        })
    }

    /// Checks that the operator may be applied to the condition's field.
    ///
    /// Molecular operators are restricted to `compounds.structure`, which in
    /// turn accepts nothing else; raw structure columns accept no operator.
    pub fn validate_operands(condition: &AtomicCondition) -> Result<(), SearchError> {
        let field = condition.field();
        let op = condition.operator();
        let is_structure = matches!(
            field,
            FieldPath::Direct { level: Level::Compounds, column } if column == STRUCTURE_FIELD
        );

        if op.is_molecular() {
            if !is_structure {
                return Err(invalid(
                    condition,
                    "Molecular operators can only be applied to compounds.structure",
                ));
            }
        } else {
            if RAW_STRUCTURE_COLUMNS.contains(&field.name()) {
                return Err(invalid(
                    condition,
                    &format!("Operator {} can not be applied to {}", op, field),
                ));
            }
            if is_structure {
                return Err(invalid(
                    condition,
                    "Only molecular operators can be applied to compounds.structure",
                ));
            }
        }
        Ok(())
    }

    /// Checks the value shape required by the operator.
    pub fn validate_value(condition: &AtomicCondition) -> Result<(), SearchError> {
        let value = condition.value();
        match condition.operator().family() {
            OperatorFamily::Membership => {
                let Some(items) = value.as_array() else {
                    return Err(invalid(condition, "IN operator requires a list of values"));
                };
                if items.is_empty() {
                    return Err(invalid(condition, "IN operator requires at least one value"));
                }
                if !items.iter().all(is_scalar) {
                    return Err(invalid(condition, "IN values must be scalars"));
                }
            }
            OperatorFamily::Range => {
                let bounds = match value.as_array() {
                    Some(items) if items.len() == 2 && items.iter().all(is_scalar) => items,
                    _ => {
                        return Err(invalid(
                            condition,
                            "RANGE operator requires exactly 2 values",
                        ));
                    }
                };
                if !is_ascending(&bounds[0], &bounds[1]) {
                    return Err(invalid(
                        condition,
                        "RANGE operator requires first value to be less than second value",
                    ));
                }
            }
            OperatorFamily::Temporal => {
                let parsed = value.as_str().is_some_and(|s| parse_date(s).is_some());
                if !parsed {
                    return Err(invalid(
                        condition,
                        "DATE value must be in format YYYY-MM-DD or YYYY-MM-DD hh:mm",
                    ));
                }
            }
            OperatorFamily::Molecular => {
                if !value.as_str().is_some_and(|s| !s.trim().is_empty()) {
                    return Err(invalid(condition, "structure value must be a SMILES string"));
                }
                if condition.operator() == CompareOp::IsSimilar {
                    match condition.threshold() {
                        Some(t) if t.is_finite() => {}
                        _ => {
                            return Err(invalid(
                                condition,
                                "threshold is required for IS SIMILAR operator",
                            ));
                        }
                    }
                }
            }
            OperatorFamily::Equality | OperatorFamily::Pattern | OperatorFamily::Ordering => {
                if !is_scalar(value) {
                    return Err(invalid(
                        condition,
                        &format!("{} operator requires a single value", condition.operator()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds the predicate for `condition` over `operand`.
    ///
    /// `qualifier_alias` is the details alias whose `value_qualifier` column
    /// applies, when the operand is a qualified dynamic property.
    pub fn sql_expression(
        condition: &AtomicCondition,
        operand: &Operand,
        qualifier_alias: Option<&str>,
        param_offset: usize,
    ) -> Result<SqlFragment, SearchError> {
        Self::validate_value(condition)?;

        let op = condition.operator();
        let family = op.family();
        let (lhs, cast) = operand.sides(family);
        let cast = cast.as_deref();

        let params = bind_values(condition, cast)?;
        let p = |i: usize| placeholder(param_offset + i + 1, cast);

        let sql = match family {
            OperatorFamily::Equality => format!("{} {} {}", lhs, sql_symbol(op), p(0)),
            OperatorFamily::Membership => {
                let list: Vec<String> = (0..params.len()).map(p).collect();
                format!("{} IN ({})", lhs, list.join(", "))
            }
            OperatorFamily::Pattern => {
                let keyword = if op == CompareOp::Like { "LIKE" } else { "ILIKE" };
                format!("{} {} {}", lhs, keyword, p(0))
            }
            OperatorFamily::Ordering | OperatorFamily::Range => {
                match (qualifier_alias, qualifier_branches(op)) {
                    (Some(alias), Some(branches)) => {
                        render_qualified(&branches, alias, &lhs, &p(0), &p(1))
                    }
                    _ if family == OperatorFamily::Range => {
                        format!("{} BETWEEN {} AND {}", lhs, p(0), p(1))
                    }
                    _ => format!("{} {} {}", lhs, sql_symbol(op), p(0)),
                }
            }
            OperatorFamily::Temporal => match op {
                CompareOp::On => format!("DATE({}) = DATE({})", lhs, p(0)),
                _ => format!("{} {} {}", lhs, sql_symbol(op), p(0)),
            },
            OperatorFamily::Molecular => {
                let query = |i: usize| placeholder(param_offset + i + 1, Some("cstring"));
                match op {
                    CompareOp::IsSimilar => format!(
                        "(public.mol_from_smiles({q1}) IS NOT NULL AND \
                         public.tanimoto_sml(public.morganbv_fp(public.mol_from_smiles({lhs}::cstring)), \
                         public.morganbv_fp(public.mol_from_smiles({q2}))) >= {t})",
                        q1 = query(0),
                        q2 = query(1),
                        lhs = lhs,
                        t = placeholder(param_offset + 3, Some("double precision")),
                    ),
                    CompareOp::HasSubstructure => format!(
                        "public.mol_from_smiles({}::cstring) OPERATOR(public.@>) {}",
                        lhs,
                        placeholder(param_offset + 1, Some("public.qmol"))
                    ),
                    _ => format!(
                        "public.mol_from_smiles({}) OPERATOR(public.@>) \
                         public.mol_from_smiles({}::cstring)",
                        query(0),
                        lhs
                    ),
                }
            }
        };

        Ok(SqlFragment::with_params(sql, params))
    }
}

fn render_qualified(
    branches: &[QualifierBranch; 3],
    alias: &str,
    lhs: &str,
    first: &str,
    second: &str,
) -> String {
    let parts: Vec<String> = branches
        .iter()
        .map(|branch| {
            let q = format!("{}.value_qualifier = {}", alias, branch.qualifier.code());
            let bound = |b: Bound| match b {
                Bound::First => first,
                Bound::Second => second,
            };
            match branch.test {
                BranchTest::Always => format!("({})", q),
                BranchTest::Compare(symbol, b) => {
                    format!("({} AND {} {} {})", q, lhs, symbol, bound(b))
                }
                BranchTest::Between => {
                    format!("({} AND {} BETWEEN {} AND {})", q, lhs, first, second)
                }
            }
        })
        .collect();
    format!("({})", parts.join(" OR "))
}

/// Produces the bound parameters for a validated condition.
fn bind_values(
    condition: &AtomicCondition,
    cast: Option<&str>,
) -> Result<Vec<SqlParam>, SearchError> {
    let value = condition.value();
    let op = condition.operator();

    let scalars: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let (accepts, kind): (fn(&Value) -> bool, &str) = match cast {
        Some("NUMERIC") => (|v| as_number(v).is_some(), "numeric"),
        Some("BOOLEAN") => (|v| as_bool(v).is_some(), "a boolean"),
        Some("UUID") => (|v| as_uuid(v).is_some(), "a UUID"),
        _ => (|_| true, ""),
    };
    if let Some(bad) = scalars.iter().find(|v| !accepts(v)) {
        return Err(invalid(condition, &format!("value {} is not {}", bad, kind)));
    }

    let text = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let params = match op {
        CompareOp::Contains => vec![SqlParam::Text(format!("%{}%", text(value)))],
        CompareOp::StartsWith => vec![SqlParam::Text(format!("{}%", text(value)))],
        CompareOp::EndsWith => vec![SqlParam::Text(format!("%{}", text(value)))],
        CompareOp::IsSimilar => {
            let threshold = condition.threshold().unwrap_or_default();
            vec![
                SqlParam::Text(text(value)),
                SqlParam::Text(text(value)),
                SqlParam::Float(threshold),
            ]
        }
        _ => scalars
            .into_iter()
            .map(|v| {
                SqlParam::from_json(v).ok_or_else(|| invalid(condition, "values must be scalars"))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(params)
}

fn invalid(condition: &AtomicCondition, message: &str) -> SearchError {
    SearchError::ConditionValidation {
        field: condition.field().to_string(),
        operator: condition.operator().to_string(),
        message: message.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_uuid(value: &Value) -> Option<uuid::Uuid> {
    value.as_str().and_then(|s| uuid::Uuid::parse_str(s).ok())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_ascending(first: &Value, second: &Value) -> bool {
    match (as_number(first), as_number(second)) {
        (Some(a), Some(b)) => a < b,
        _ => match (first.as_str(), second.as_str()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

/// Parses a date in one of [`DATE_FORMATS`].
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMATS[0])
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(value, DATE_FORMATS[1]).ok())
}
