//! Search query assembly.
//!
//! A request compiles to one statement of the form:
//!
//! ```sql
//! WITH base AS (
//!     SELECT <direct fields>, <details values, property names, qualifiers>
//!     FROM moltrack.compounds cc <LEFT JOINs>
//!     WHERE <filter>
//! )
//! SELECT <outer projections> FROM base [GROUP BY ...] ORDER BY <first column> [LIMIT n]
//! ```
//!
//! The `base` CTE joins every details table needed by the output with a wide
//! `LEFT JOIN` over all of the entity's properties. When any output column is
//! dynamic or aggregated, the outer query groups by the plain direct columns
//! plus the level's `id`, and collapses each dynamic column with an aggregate
//! restricted to its own property:
//!
//! ```sql
//! MAX(cd_value) FILTER (WHERE LOWER(p_cd_name) = LOWER($3::text)) AS compounds_details_common_name
//! ```
//!
//! Filter conditions are lowered recursively. Same-level direct fields
//! compare in place; everything else becomes a correlated `EXISTS`, so
//! matching several child rows never duplicates the searched entity.
//!
//! Placeholders are numbered in build order: filter parameters first, then
//! property names bound by the outer projections.

use std::collections::HashSet;

use tracing::debug;

use super::aggregations::AggregationCatalog;
use super::field_resolver::{DynamicField, FieldResolver, ResolveMode};
use super::joins::JoinPlan;
use super::naming::{AliasMapping, sanitize_field_name};
use super::operators::OperatorCatalog;
use super::sql::{SqlFragment, SqlParam};
use crate::error::SearchError;
use crate::types::{
    AggregationOp, AtomicCondition, FieldPath, Filter, Level, SearchRequest, ValueQualifier,
};

/// A compiled search statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// SQL text with `$N` placeholders.
    pub sql: String,
    /// Bound parameters, `params[i]` binding `$i+1`.
    pub params: Vec<SqlParam>,
    /// Display labels of the result columns, in order.
    pub columns: Vec<String>,
}

/// Compiles search requests against a [`FieldResolver`].
pub struct QueryBuilder<'a> {
    resolver: &'a FieldResolver,
}

/// Per-column data gathered while building the `base` CTE.
struct BaseColumn {
    alias: String,
    operation: Option<AggregationOp>,
    dynamic: Option<DynamicField>,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder.
    pub fn new(resolver: &'a FieldResolver) -> Self {
        Self { resolver }
    }

    /// Compiles `request`, projecting the columns of `mapping`.
    pub fn build_query(
        &self,
        request: &SearchRequest,
        mapping: &AliasMapping,
    ) -> Result<BuiltQuery, SearchError> {
        let level = request.level();
        let config = self.resolver.config(level)?;
        let schema = self.resolver.registry().schema();

        if mapping.is_empty() {
            return Err(SearchError::FieldResolution {
                field: level.to_string(),
                message: "no output columns".to_string(),
            });
        }

        let mut joins = JoinPlan::new();
        let mut select = Vec::new();
        let mut emitted_details = HashSet::new();
        let mut columns = Vec::with_capacity(mapping.len());

        for column in mapping.columns() {
            let resolved = self.resolver.resolve_field(
                &column.field,
                level,
                ResolveMode::Select,
                &mut joins,
            )?;

            match &resolved.dynamic {
                None => select.push(format!("{} AS {}", resolved.sql_expression(), column.alias)),
                Some(dynamic) => {
                    if emitted_details.insert(dynamic.details_alias.clone()) {
                        select.push(format!(
                            "{} AS {}",
                            resolved.sql_expression(),
                            dynamic.value_alias()
                        ));
                        select.push(format!(
                            "{} AS {}",
                            dynamic.name_column(),
                            dynamic.projected_name()
                        ));
                        if dynamic.value_qualifier {
                            select.push(format!(
                                "{}.value_qualifier AS {}",
                                dynamic.details_alias,
                                dynamic.qualifier_alias()
                            ));
                        }
                    }
                }
            }

            columns.push(BaseColumn {
                alias: column.alias.clone(),
                operation: column.operation,
                dynamic: resolved.dynamic,
            });
        }

        let grouping = columns
            .iter()
            .any(|c| c.dynamic.is_some() || c.operation.is_some());

        let mut group_by: Vec<String> = columns
            .iter()
            .filter(|c| c.dynamic.is_none() && c.operation.is_none())
            .map(|c| c.alias.clone())
            .collect();

        if grouping {
            let id_path = FieldPath::direct(level, "id");
            let id_alias = sanitize_field_name(&id_path.to_string(), None);
            if !group_by.contains(&id_alias) {
                let resolved =
                    self.resolver.resolve_field(&id_path, level, ResolveMode::Select, &mut joins)?;
                select.push(format!("{} AS {}", resolved.sql_expression(), id_alias));
                group_by.push(id_alias);
            }
        }

        let filter = match request.filter() {
            Some(filter) => Some(self.build_filter_sql(filter, level, 0)?),
            None => None,
        };
        let mut params = filter
            .as_ref()
            .map(|f| f.params.clone())
            .unwrap_or_default();

        let outer: Vec<String> = columns
            .iter()
            .map(|column| {
                if !grouping {
                    return column.alias.clone();
                }
                let projection = match &column.dynamic {
                    None => match column.operation {
                        None => return column.alias.clone(),
                        Some(op) => AggregationCatalog::aggregate(Some(op), &column.alias, None),
                    },
                    Some(dynamic) => {
                        let matched =
                            dynamic.property_match(&dynamic.projected_name(), params.len() + 1);
                        params.extend(matched.params);
                        let value = AggregationCatalog::aggregate(
                            column.operation,
                            &dynamic.value_alias(),
                            Some(&matched.sql),
                        );
                        if dynamic.value_qualifier && column.operation.is_none() {
                            format!(
                                "{} FILTER (WHERE {}) || {}",
                                qualifier_symbol(&dynamic.qualifier_alias()),
                                matched.sql,
                                value
                            )
                        } else {
                            value
                        }
                    }
                };
                format!("{} AS {}", projection, column.alias)
            })
            .collect();

        let mut sql = format!(
            "WITH base AS (SELECT {} FROM {}.{} {}",
            select.join(", "),
            schema,
            config.table(),
            config.outer_alias()
        );
        if !joins.is_empty() {
            sql.push(' ');
            sql.push_str(&joins.to_sql());
        }
        if let Some(filter) = &filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
        }
        sql.push_str(&format!(") SELECT {} FROM base", outer.join(", ")));
        if grouping {
            sql.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
        }
        sql.push_str(&format!(" ORDER BY {}", columns[0].alias));
        if let Some(limit) = request.limit() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        debug!(
            level = %level,
            joins = joins.join_count(),
            params = params.len(),
            grouping,
            "Built search query"
        );

        Ok(BuiltQuery {
            sql,
            params,
            columns: mapping.labels(),
        })
    }

    /// Lowers a filter tree to a predicate, numbering placeholders from
    /// `param_offset + 1`.
    pub fn build_filter_sql(
        &self,
        filter: &Filter,
        level: Level,
        param_offset: usize,
    ) -> Result<SqlFragment, SearchError> {
        match filter {
            Filter::Atomic(condition) => self.build_condition(condition, level, param_offset),
            Filter::Logical(node) => {
                let mut parts = Vec::with_capacity(node.conditions().len());
                let mut params = Vec::new();

                for child in node.conditions() {
                    let fragment =
                        self.build_filter_sql(child, level, param_offset + params.len())?;
                    match child {
                        Filter::Logical(_) => parts.push(format!("({})", fragment.sql)),
                        Filter::Atomic(_) => parts.push(fragment.sql),
                    }
                    params.extend(fragment.params);
                }

                let separator = format!(" {} ", node.operator());
                Ok(SqlFragment::with_params(parts.join(&separator), params))
            }
        }
    }

    /// Lowers one condition, wrapping it in `EXISTS` when the field lives in
    /// a details table or another level.
    pub fn build_condition(
        &self,
        condition: &AtomicCondition,
        level: Level,
        param_offset: usize,
    ) -> Result<SqlFragment, SearchError> {
        OperatorCatalog::validate_operands(condition)?;

        let mut joins = JoinPlan::new();
        let resolved =
            self.resolver
                .resolve_field(condition.field(), level, ResolveMode::Condition, &mut joins)?;

        let fragment = match &resolved.dynamic {
            Some(dynamic) => {
                let matched = dynamic.property_match(&dynamic.name_column(), param_offset + 1);
                let qualifier = dynamic
                    .value_qualifier
                    .then_some(dynamic.details_alias.as_str());
                let value = OperatorCatalog::sql_expression(
                    condition,
                    &resolved.operand,
                    qualifier,
                    param_offset + matched.params.len(),
                )?;
                matched.and(value)
            }
            None => {
                OperatorCatalog::sql_expression(condition, &resolved.operand, None, param_offset)?
            }
        };

        Ok(match &resolved.subquery {
            Some(subquery) => {
                SqlFragment::with_params(subquery.exists(&fragment.sql), fragment.params)
            }
            None => fragment,
        })
    }
}

/// `MAX(CASE <column> WHEN 0 THEN '' WHEN 1 THEN '<' WHEN 2 THEN '>' ELSE '' END)`
fn qualifier_symbol(column: &str) -> String {
    let arms: Vec<String> = [
        ValueQualifier::Equals,
        ValueQualifier::LessThan,
        ValueQualifier::GreaterThan,
    ]
    .iter()
    .map(|q| format!("WHEN {} THEN '{}'", q.code(), q.symbol()))
    .collect();
    format!("MAX(CASE {} {} ELSE '' END)", column, arms.join(" "))
}
