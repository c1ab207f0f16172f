//! Field resolution.
//!
//! Resolves a [`FieldPath`] against a search level into the SQL needed to
//! read it. Resolution runs in one of two modes:
//!
//! - [`ResolveMode::Select`] adds `LEFT JOIN`s to the shared [`JoinPlan`] of
//!   the `base` CTE and yields a column expression usable in its select list.
//! - [`ResolveMode::Condition`] builds the scaffolding for a correlated
//!   `EXISTS` subquery into a plan owned by that one condition. Direct
//!   fields of the search level need no subquery and compare in place.
//!
//! Inside the `base` CTE the searched table carries its doubled alias (`cc`
//! for compounds), while subqueries use single aliases (`c`, `b`, `ar`) for
//! every table they join, so the two scopes never reference the same alias.
//!
//! # Dynamic properties
//!
//! A dynamic field joins the level's details table and then `properties`:
//!
//! ```sql
//! LEFT JOIN moltrack.batch_details bd ON bd.batch_id = b.id
//! LEFT JOIN moltrack.properties p_bd ON p_bd.id = bd.property_id
//! ```
//!
//! Its value is read through a `CASE p_bd.value_type WHEN ... END` projection
//! built from [`ValueType::text_projection`], and matched to the requested
//! property with `LOWER(p_bd.name) = LOWER($n::text)`.

use tracing::trace;

use super::joins::{Hop, HopDirection, JoinClause, JoinKind, JoinPlan, TableRef, level_path};
use super::operators::Operand;
use super::sql::{SqlFragment, SqlParam, placeholder};
use super::table_config::{PROPERTIES_TABLE, TableConfig, TableRegistry};
use crate::error::SearchError;
use crate::types::{FieldPath, Level, ValueType};

/// How a field is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Projected in the `base` CTE.
    Select,
    /// Compared in a filter condition.
    Condition,
}

/// The search level's keys, used to correlate subqueries with the outer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLevelInfo {
    /// Foreign key naming the search level on child tables.
    pub foreign_key: String,
    /// Alias of the searched table in the `base` CTE.
    pub alias: String,
}

/// Details of a resolved dynamic property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicField {
    /// Property name as requested.
    pub property: String,
    /// Alias of the details table holding the value.
    pub details_alias: String,
    /// Alias of the joined `properties` table.
    pub property_alias: String,
    /// Whether the details table carries `value_qualifier`.
    pub value_qualifier: bool,
}

impl DynamicField {
    /// `p_xd.name`
    pub fn name_column(&self) -> String {
        format!("{}.name", self.property_alias)
    }

    /// Name the property-name column is projected as in the `base` CTE.
    pub fn projected_name(&self) -> String {
        format!("{}_name", self.property_alias)
    }

    /// Name the value column is projected as in the `base` CTE.
    pub fn value_alias(&self) -> String {
        format!("{}_value", self.details_alias)
    }

    /// Name the qualifier column is projected as in the `base` CTE.
    pub fn qualifier_alias(&self) -> String {
        format!("{}_qualifier", self.details_alias)
    }

    /// Case-insensitive match of `column` against the property name, bound
    /// as parameter `index`.
    pub fn property_match(&self, column: &str, index: usize) -> SqlFragment {
        SqlFragment::with_params(
            format!("LOWER({}) = LOWER({})", column, placeholder(index, None)),
            vec![SqlParam::Text(self.property.clone())],
        )
    }
}

/// Scaffolding for a correlated `EXISTS` subquery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    /// Root table of the subquery.
    pub from: TableRef,
    /// Rendered joins following the root.
    pub joins: String,
    /// Predicate tying the root to the outer row.
    pub correlation: String,
}

impl Subquery {
    /// Wraps `predicate` into `EXISTS (SELECT 1 ... WHERE correlation AND predicate)`.
    pub fn exists(&self, predicate: &str) -> String {
        let joins = if self.joins.is_empty() {
            String::new()
        } else {
            format!(" {}", self.joins)
        };
        format!(
            "EXISTS (SELECT 1 FROM {}{} WHERE {} AND {})",
            self.from, joins, self.correlation, predicate
        )
    }
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// The resolved path.
    pub path: FieldPath,
    /// Expression reading the field's value.
    pub operand: Operand,
    /// Present for dynamic properties.
    pub dynamic: Option<DynamicField>,
    /// Present when a condition must be evaluated in a subquery.
    pub subquery: Option<Subquery>,
    /// Keys of the search level.
    pub search_level: SearchLevelInfo,
}

impl ResolvedField {
    /// Returns true for dynamic properties.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic.is_some()
    }

    /// The text expression usable in a select list.
    pub fn sql_expression(&self) -> &str {
        match &self.operand {
            Operand::Column { expr, .. } => expr,
            Operand::Dynamic { text, .. } => text,
        }
    }
}

/// Resolves field paths against the table registry.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    registry: TableRegistry,
}

impl FieldResolver {
    /// Creates a resolver over `registry`.
    pub fn new(registry: TableRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Returns the configuration for `level`.
    pub fn config(&self, level: Level) -> Result<&TableConfig, SearchError> {
        self.registry
            .get(level)
            .ok_or_else(|| SearchError::FieldResolution {
                field: level.to_string(),
                message: format!("no table configuration for level {}", level),
            })
    }

    /// Returns true if `path` names a known direct field or a details
    /// property, and, when `level` is given, belongs to that level.
    ///
    /// Output fields are validated with their search level; filter and
    /// aggregation fields may cross levels and are validated without one.
    pub fn validate_field_path(&self, path: &str, level: Option<Level>) -> bool {
        let Ok(parsed) = path.parse::<FieldPath>() else {
            return false;
        };
        if level.is_some_and(|l| l != parsed.level()) {
            return false;
        }
        match &parsed {
            FieldPath::Direct { level, column } => self
                .registry
                .get(*level)
                .is_some_and(|c| c.direct_field(column).is_some()),
            FieldPath::Dynamic { .. } => true,
        }
    }

    /// Resolves `path` for a query over `search_level`.
    ///
    /// In [`ResolveMode::Select`] joins are added to the shared `joins`; in
    /// [`ResolveMode::Condition`] `joins` must be a fresh plan scoped to the
    /// condition's subquery.
    pub fn resolve_field(
        &self,
        path: &FieldPath,
        search_level: Level,
        mode: ResolveMode,
        joins: &mut JoinPlan,
    ) -> Result<ResolvedField, SearchError> {
        let search = self.config(search_level)?;
        let target = self.config(path.level())?;

        let search_info = SearchLevelInfo {
            foreign_key: search.details_fk().to_string(),
            alias: search.outer_alias(),
        };

        if let FieldPath::Direct { column, .. } = path {
            if target.direct_field(column).is_none() {
                return Err(SearchError::FieldResolution {
                    field: path.to_string(),
                    message: format!("unknown direct field '{}'", column),
                });
            }
        }

        let hops = level_path(search_level, path.level());
        trace!(
            field = %path,
            search_level = %search_level,
            hops = hops.len(),
            ?mode,
            "Resolving field"
        );

        let resolved = match mode {
            ResolveMode::Select => self.resolve_select(path, search, target, &hops, joins)?,
            ResolveMode::Condition => self.resolve_condition(path, search, target, &hops, joins)?,
        };

        let (operand, dynamic, subquery) = resolved;
        Ok(ResolvedField {
            path: path.clone(),
            operand,
            dynamic,
            subquery,
            search_level: search_info,
        })
    }

    fn resolve_select(
        &self,
        path: &FieldPath,
        search: &TableConfig,
        target: &TableConfig,
        hops: &[Hop],
        joins: &mut JoinPlan,
    ) -> Result<(Operand, Option<DynamicField>, Option<Subquery>), SearchError> {
        let outer = search.outer_alias();
        let mut owner = outer.clone();
        for (i, hop) in hops.iter().enumerate() {
            let from_alias = if i == 0 {
                outer.clone()
            } else {
                self.config(hop.from)?.alias().to_string()
            };
            joins.add([self.hop_join(hop, &from_alias, JoinKind::Left)?]);
            owner = self.config(hop.to)?.alias().to_string();
        }

        match path {
            FieldPath::Direct { column, .. } => {
                Ok((self.direct_operand(target, column, &owner)?, None, None))
            }
            FieldPath::Dynamic { property, .. } => {
                let dynamic = self.join_details(target, property, &owner, JoinKind::Left, joins);
                Ok((dynamic_operand(target.level(), &dynamic), Some(dynamic), None))
            }
        }
    }

    fn resolve_condition(
        &self,
        path: &FieldPath,
        search: &TableConfig,
        target: &TableConfig,
        hops: &[Hop],
        joins: &mut JoinPlan,
    ) -> Result<(Operand, Option<DynamicField>, Option<Subquery>), SearchError> {
        let outer = search.outer_alias();
        let schema = self.registry.schema();

        let Some((first, rest)) = hops.split_first() else {
            return match path {
                FieldPath::Direct { column, .. } => {
                    Ok((self.direct_operand(target, column, &outer)?, None, None))
                }
                FieldPath::Dynamic { property, .. } => {
                    let details_alias = target.details_alias();
                    let from = TableRef::new(schema, target.details_table(), details_alias);
                    let correlation =
                        format!("{}.{} = {}.id", details_alias, target.details_fk(), outer);
                    let dynamic = self.join_properties(target, property, JoinKind::Inner, joins);
                    let subquery = Subquery {
                        from,
                        joins: joins.to_sql(),
                        correlation,
                    };
                    Ok((dynamic_operand(target.level(), &dynamic), Some(dynamic), Some(subquery)))
                }
            };
        };

        let root = self.config(first.to)?;
        let from = TableRef::new(schema, root.table(), root.alias());
        let correlation = match first.direction {
            HopDirection::ToChild => {
                format!("{}.{} = {}.id", root.alias(), search.details_fk(), outer)
            }
            HopDirection::ToParent => {
                format!("{}.id = {}.{}", root.alias(), outer, root.details_fk())
            }
        };

        for hop in rest {
            let from_alias = self.config(hop.from)?.alias().to_string();
            joins.add([self.hop_join(hop, &from_alias, JoinKind::Inner)?]);
        }

        let owner = if joins.is_last_join(target.table()) {
            joins.last_table_alias().unwrap_or(root.alias()).to_string()
        } else {
            root.alias().to_string()
        };

        let (operand, dynamic) = match path {
            FieldPath::Direct { column, .. } => {
                (self.direct_operand(target, column, &owner)?, None)
            }
            FieldPath::Dynamic { property, .. } => {
                let dynamic = self.join_details(target, property, &owner, JoinKind::Inner, joins);
                (dynamic_operand(target.level(), &dynamic), Some(dynamic))
            }
        };

        let subquery = Subquery {
            from,
            joins: joins.to_sql(),
            correlation,
        };
        Ok((operand, dynamic, Some(subquery)))
    }

    fn hop_join(
        &self,
        hop: &Hop,
        from_alias: &str,
        kind: JoinKind,
    ) -> Result<JoinClause, SearchError> {
        let to = self.config(hop.to)?;
        let fk = self.config(hop.parent())?.details_fk();
        let on = match hop.direction {
            HopDirection::ToChild => format!("{}.{} = {}.id", to.alias(), fk, from_alias),
            HopDirection::ToParent => format!("{}.id = {}.{}", to.alias(), from_alias, fk),
        };
        let table = TableRef::new(self.registry.schema(), to.table(), to.alias());
        Ok(JoinClause::of_kind(kind, table, on))
    }

    fn direct_operand(
        &self,
        config: &TableConfig,
        name: &str,
        owner: &str,
    ) -> Result<Operand, SearchError> {
        let field = config
            .direct_field(name)
            .ok_or_else(|| SearchError::FieldResolution {
                field: format!("{}.{}", config.level(), name),
                message: format!("unknown direct field '{}'", name),
            })?;
        Ok(Operand::Column {
            expr: format!("{}.{}", owner, field.column),
            column_type: field.column_type.clone(),
        })
    }

    fn join_details(
        &self,
        config: &TableConfig,
        property: &str,
        owner: &str,
        kind: JoinKind,
        joins: &mut JoinPlan,
    ) -> DynamicField {
        let details_alias = config.details_alias();
        let table = TableRef::new(self.registry.schema(), config.details_table(), details_alias);
        let on = format!("{}.{} = {}.id", details_alias, config.details_fk(), owner);
        joins.add([JoinClause::of_kind(kind, table, on)]);
        self.join_properties(config, property, kind, joins)
    }

    fn join_properties(
        &self,
        config: &TableConfig,
        property: &str,
        kind: JoinKind,
        joins: &mut JoinPlan,
    ) -> DynamicField {
        let details_alias = config.details_alias();
        let property_alias = format!("p_{}", details_alias);
        let table = TableRef::new(self.registry.schema(), PROPERTIES_TABLE, &property_alias);
        let on = format!("{}.id = {}.property_id", property_alias, details_alias);
        joins.add([JoinClause::of_kind(kind, table, on)]);

        DynamicField {
            property: property.to_string(),
            details_alias: details_alias.to_string(),
            property_alias,
            value_qualifier: config.has_value_qualifier(),
        }
    }
}

/// Builds the typed-value `CASE` over the property's value type, keeping only
/// the types accepted by `keep`. Returns `None` when no type qualifies.
fn value_case(
    level: Level,
    dynamic: &DynamicField,
    keep: impl Fn(ValueType) -> bool,
) -> Option<String> {
    let arms: Vec<String> = ValueType::ALL
        .into_iter()
        .filter(|t| keep(*t))
        .filter_map(|t| {
            t.text_projection(level, &dynamic.details_alias)
                .map(|expr| format!("WHEN '{}' THEN {}", t, expr))
        })
        .collect();
    if arms.is_empty() {
        return None;
    }
    Some(format!(
        "CASE {}.value_type {} END",
        dynamic.property_alias,
        arms.join(" ")
    ))
}

fn dynamic_operand(level: Level, dynamic: &DynamicField) -> Operand {
    let text = value_case(level, dynamic, |_| true).unwrap_or_else(|| "NULL".to_string());
    let numeric = value_case(level, dynamic, |t| matches!(t, ValueType::Int | ValueType::Double))
        .unwrap_or_else(|| "NULL".to_string());
    let temporal = value_case(level, dynamic, |t| t == ValueType::Datetime)
        .unwrap_or_else(|| "NULL".to_string());

    Operand::Dynamic {
        text,
        numeric: format!("CAST({} AS NUMERIC)", numeric),
        temporal: format!("CAST({} AS TIMESTAMPTZ)", temporal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::moltrack_resolver;
    use crate::search::table_config::ColumnType;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_validate_field_path() {
        let resolver = moltrack_resolver();
        assert!(resolver.validate_field_path("compounds.canonical_smiles", None));
        assert!(resolver.validate_field_path("compounds.details.common_name", None));
        assert!(resolver.validate_field_path("compounds.structure", None));
        assert!(!resolver.validate_field_path("compounds.details", None));
        assert!(!resolver.validate_field_path("nonexistent.field", None));
        assert!(!resolver.validate_field_path("compounds.extra.common_name", None));
        assert!(!resolver.validate_field_path("compounds.a.b.c", None));
    }

    #[test]
    fn test_validate_field_path_with_level() {
        let resolver = moltrack_resolver();
        assert!(resolver.validate_field_path("batches.batch_regno", Some(Level::Batches)));
        assert!(!resolver.validate_field_path("batches.batch_regno", Some(Level::Compounds)));
        assert!(resolver.validate_field_path("batches.batch_regno", None));
    }

    #[test]
    fn test_select_same_level_direct_uses_outer_alias() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("compounds.molregno"),
                Level::Compounds,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();

        assert_eq!(field.sql_expression(), "cc.molregno");
        assert!(!field.is_dynamic());
        assert!(field.subquery.is_none());
        assert!(joins.is_empty());
        assert_eq!(field.search_level.alias, "cc");
        assert_eq!(field.search_level.foreign_key, "compound_id");
    }

    #[test]
    fn test_select_structure_maps_to_canonical_smiles() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("compounds.structure"),
                Level::Compounds,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();
        assert_eq!(
            field.operand,
            Operand::Column {
                expr: "cc.canonical_smiles".to_string(),
                column_type: ColumnType::Text,
            }
        );
    }

    #[test]
    fn test_select_same_level_dynamic() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("compounds.details.common_name"),
                Level::Compounds,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();

        assert_eq!(
            joins.to_sql(),
            "LEFT JOIN moltrack.compound_details cd ON cd.compound_id = cc.id \
             LEFT JOIN moltrack.properties p_cd ON p_cd.id = cd.property_id"
        );
        assert_eq!(
            field.sql_expression(),
            "CASE p_cd.value_type WHEN 'int' THEN cd.value_num::text \
             WHEN 'double' THEN cd.value_num::text \
             WHEN 'datetime' THEN cd.value_datetime::text \
             WHEN 'string' THEN cd.value_string \
             WHEN 'uuid' THEN cd.value_uuid::text END"
        );

        let dynamic = field.dynamic.unwrap();
        assert_eq!(dynamic.value_alias(), "cd_value");
        assert_eq!(dynamic.projected_name(), "p_cd_name");
        assert!(dynamic.value_qualifier);
    }

    #[test]
    fn test_select_assay_result_projection_has_bool() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("assay_results.details.active"),
                Level::AssayResults,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();
        let sql = field.sql_expression();
        assert!(sql.contains("WHEN 'bool' THEN ard.value_bool::text"));
        assert!(!sql.contains("value_datetime"));
    }

    #[test]
    fn test_select_cross_level_dynamic() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        resolver
            .resolve_field(
                &path("assay_results.details.clearance"),
                Level::Compounds,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();

        assert_eq!(
            joins.to_sql(),
            "LEFT JOIN moltrack.batches b ON b.compound_id = cc.id \
             LEFT JOIN moltrack.assay_results ar ON ar.batch_id = b.id \
             LEFT JOIN moltrack.assay_result_details ard ON ard.assay_result_id = ar.id \
             LEFT JOIN moltrack.properties p_ard ON p_ard.id = ard.property_id"
        );
    }

    #[test]
    fn test_select_shared_joins_not_repeated() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        for field in ["batches.details.purity", "batches.details.supplier", "batches.batch_regno"] {
            resolver
                .resolve_field(&path(field), Level::Compounds, ResolveMode::Select, &mut joins)
                .unwrap();
        }
        assert_eq!(joins.join_count(), 3);
    }

    #[test]
    fn test_condition_same_level_direct_has_no_subquery() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("batches.batch_regno"),
                Level::Batches,
                ResolveMode::Condition,
                &mut joins,
            )
            .unwrap();
        assert_eq!(field.sql_expression(), "bb.batch_regno");
        assert!(field.subquery.is_none());
    }

    #[test]
    fn test_condition_same_level_dynamic() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("compounds.details.corporate_compound_id"),
                Level::Compounds,
                ResolveMode::Condition,
                &mut joins,
            )
            .unwrap();

        let subquery = field.subquery.unwrap();
        assert_eq!(
            subquery.exists("x"),
            "EXISTS (SELECT 1 FROM moltrack.compound_details cd \
             JOIN moltrack.properties p_cd ON p_cd.id = cd.property_id \
             WHERE cd.compound_id = cc.id AND x)"
        );
    }

    #[test]
    fn test_condition_child_level_dynamic() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("batches.details.corporate_batch_id"),
                Level::Compounds,
                ResolveMode::Condition,
                &mut joins,
            )
            .unwrap();

        let subquery = field.subquery.unwrap();
        assert_eq!(
            subquery.exists("x"),
            "EXISTS (SELECT 1 FROM moltrack.batches b \
             JOIN moltrack.batch_details bd ON bd.batch_id = b.id \
             JOIN moltrack.properties p_bd ON p_bd.id = bd.property_id \
             WHERE b.compound_id = cc.id AND x)"
        );
    }

    #[test]
    fn test_condition_parent_level_direct() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("compounds.molregno"),
                Level::Batches,
                ResolveMode::Condition,
                &mut joins,
            )
            .unwrap();

        assert_eq!(field.sql_expression(), "c.molregno");
        let subquery = field.subquery.unwrap();
        assert_eq!(
            subquery.exists("x"),
            "EXISTS (SELECT 1 FROM moltrack.compounds c WHERE c.id = bb.compound_id AND x)"
        );
    }

    #[test]
    fn test_condition_multi_hop_chains_off_last_join() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("assays.details.target"),
                Level::AssayResults,
                ResolveMode::Condition,
                &mut joins,
            )
            .unwrap();

        let subquery = field.subquery.unwrap();
        assert_eq!(
            subquery.exists("x"),
            "EXISTS (SELECT 1 FROM moltrack.assay_runs rn \
             JOIN moltrack.assays a ON a.id = rn.assay_id \
             JOIN moltrack.assay_details ad ON ad.assay_id = a.id \
             JOIN moltrack.properties p_ad ON p_ad.id = ad.property_id \
             WHERE rn.id = arar.assay_run_id AND x)"
        );
    }

    #[test]
    fn test_unknown_direct_field() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let err = resolver
            .resolve_field(
                &path("compounds.colour"),
                Level::Compounds,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap_err();
        assert!(err.to_string().contains("unknown direct field 'colour'"));
    }

    #[test]
    fn test_numeric_projection_excludes_strings() {
        let resolver = moltrack_resolver();
        let mut joins = JoinPlan::new();
        let field = resolver
            .resolve_field(
                &path("batches.details.purity"),
                Level::Batches,
                ResolveMode::Select,
                &mut joins,
            )
            .unwrap();
        let Operand::Dynamic { numeric, temporal, .. } = field.operand else {
            panic!("expected dynamic operand");
        };
        assert_eq!(
            numeric,
            "CAST(CASE p_bd.value_type WHEN 'int' THEN bd.value_num::text \
             WHEN 'double' THEN bd.value_num::text END AS NUMERIC)"
        );
        assert_eq!(
            temporal,
            "CAST(CASE p_bd.value_type WHEN 'datetime' THEN bd.value_datetime::text END \
             AS TIMESTAMPTZ)"
        );
    }

    #[test]
    fn test_property_match_binds_name() {
        let dynamic = DynamicField {
            property: "Corporate Batch ID".to_string(),
            details_alias: "bd".to_string(),
            property_alias: "p_bd".to_string(),
            value_qualifier: true,
        };
        let frag = dynamic.property_match(&dynamic.name_column(), 4);
        assert_eq!(frag.sql, "LOWER(p_bd.name) = LOWER($4::text)");
        assert_eq!(frag.params, vec![SqlParam::text("Corporate Batch ID")]);
    }
}
