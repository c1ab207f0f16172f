//! Output column naming.
//!
//! Every output field and aggregation is projected under a SQL-safe alias
//! derived from its path, and reported to callers under a display label:
//!
//! | Source | Alias | Label |
//! |--------|-------|-------|
//! | `compounds.details.common_name` | `compounds_details_common_name` | `compounds.details.common_name` |
//! | `AVG` of `assay_results.details.clearance` | `avg_assay_results_details_clearance` | `AVG(assay_results.details.clearance)` |

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{AggregationOp, FieldPath, SearchRequest};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("alias pattern is valid"));

/// Converts a field path (and optional aggregation keyword) into a SQL alias.
///
/// Characters outside `[a-zA-Z0-9_]` become `_` and a leading digit is
/// prefixed with `field_`. With an aggregation the keyword is prepended.
/// The alias is always lowercased, matching how Postgres folds unquoted
/// identifiers.
pub fn sanitize_field_name(field: &str, op: Option<AggregationOp>) -> String {
    let mut sanitized = UNSAFE_CHARS.replace_all(field, "_").into_owned();
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized = format!("field_{}", sanitized);
    }
    let alias = match op {
        Some(op) => format!("{}_{}", op.as_str().replace(' ', "_"), sanitized),
        None => sanitized,
    };
    alias.to_lowercase()
}

/// One projected output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    /// SQL alias.
    pub alias: String,
    /// Display label.
    pub label: String,
    /// Source field.
    pub field: FieldPath,
    /// Aggregation applied, if any.
    pub operation: Option<AggregationOp>,
}

impl OutputColumn {
    /// Returns true when an aggregation is applied.
    pub fn is_aggregated(&self) -> bool {
        self.operation.is_some()
    }
}

/// Ordered output columns of a request: output fields first, then
/// aggregations. A column whose alias repeats an earlier one is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMapping {
    columns: Vec<OutputColumn>,
}

impl AliasMapping {
    /// Builds the mapping for `request`.
    pub fn from_request(request: &SearchRequest) -> Self {
        let mut mapping = Self::default();
        for field in request.output() {
            mapping.push(field.clone(), None);
        }
        for aggregation in request.aggregations() {
            mapping.push(aggregation.field.clone(), Some(aggregation.operation));
        }
        mapping
    }

    fn push(&mut self, field: FieldPath, operation: Option<AggregationOp>) {
        let path = field.to_string();
        let alias = sanitize_field_name(&path, operation);
        if self.contains_alias(&alias) {
            return;
        }
        let label = match operation {
            Some(op) => format!("{}({})", op, path),
            None => path,
        };
        self.columns.push(OutputColumn {
            alias,
            label,
            field,
            operation,
        });
    }

    /// Returns true if `alias` is already mapped.
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.columns.iter().any(|c| c.alias == alias)
    }

    /// Columns in projection order.
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Display labels in projection order.
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
