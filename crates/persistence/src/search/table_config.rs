//! Per-level table configuration.
//!
//! For each [`Level`] the registry derives, from schema introspection:
//!
//! | Item | `assay_results` example |
//! |------|-------------------------|
//! | alias | `ar` |
//! | outer alias | `arar` |
//! | details table | `assay_result_details` |
//! | details alias | `ard` |
//! | details foreign key | `assay_result_id` |
//! | direct fields | every column of `assay_results` |
//! | value qualifier | `assay_result_details` has `value_qualifier` |
//!
//! The outer alias is used for the searched level's own table inside the
//! `base` CTE so that it never collides with the single-letter aliases used
//! for the same table in correlated subqueries.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::core::{ColumnInfo, SchemaIntrospector};
use crate::error::StorageResult;
use crate::types::Level;

/// Virtual field on `compounds` addressing the canonical structure.
pub const STRUCTURE_FIELD: &str = "structure";

/// Column backing [`STRUCTURE_FIELD`].
pub const STRUCTURE_COLUMN: &str = "canonical_smiles";

/// Table holding property definitions.
pub const PROPERTIES_TABLE: &str = "properties";

/// Qualifier column on details tables.
pub const QUALIFIER_COLUMN: &str = "value_qualifier";

/// Derives a table alias from the first letter of each underscore-separated
/// word. `assay_runs` is special-cased to `rn` so it does not collide with
/// `assay_results`.
pub fn create_alias(table: &str) -> String {
    if table == "assay_runs" {
        return "rn".to_string();
    }
    table
        .split('_')
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Strips a trailing `es` or `s`, applied to the last word only.
pub fn singularize(table: &str) -> String {
    if let Some(stem) = table.strip_suffix("es") {
        stem.to_string()
    } else if let Some(stem) = table.strip_suffix('s') {
        stem.to_string()
    } else {
        table.to_string()
    }
}

/// Broad classification of a column's SQL type, used to cast bound
/// parameters to the column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// `text`, `varchar`, `char`, `name`.
    Text,
    /// Integer, decimal and floating point types.
    Numeric,
    /// `boolean`.
    Boolean,
    /// Date, time and timestamp types, carrying the declared type name.
    Temporal(String),
    /// `uuid`.
    Uuid,
    /// Anything else, carrying a castable type name.
    Other(String),
}

impl ColumnType {
    /// Classifies an `information_schema.columns` entry.
    pub fn from_column(column: &ColumnInfo) -> Self {
        let data_type = column.data_type.to_lowercase();
        match data_type.as_str() {
            "text" | "character varying" | "character" | "name" | "citext" => ColumnType::Text,
            "smallint" | "integer" | "bigint" | "numeric" | "decimal" | "real"
            | "double precision" => ColumnType::Numeric,
            "boolean" => ColumnType::Boolean,
            "uuid" => ColumnType::Uuid,
            t if t.starts_with("timestamp") || t.starts_with("time") || t == "date" => {
                ColumnType::Temporal(data_type)
            }
            "user-defined" | "array" => ColumnType::Other(column.udt_name.clone()),
            _ => ColumnType::Other(data_type),
        }
    }

    /// Type that a bound text parameter must be cast to before comparing it
    /// with this column, or `None` when no cast is needed.
    pub fn param_cast(&self) -> Option<&str> {
        match self {
            ColumnType::Text => None,
            ColumnType::Numeric => Some("NUMERIC"),
            ColumnType::Boolean => Some("BOOLEAN"),
            ColumnType::Uuid => Some("UUID"),
            ColumnType::Temporal(name) | ColumnType::Other(name) => Some(name),
        }
    }

    /// Returns true for [`ColumnType::Text`].
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

/// A physical (or virtual) column on a level's primary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectField {
    /// Physical column name.
    pub column: String,
    /// Column type classification.
    pub column_type: ColumnType,
}

/// Derived configuration for one level.
#[derive(Debug, Clone)]
pub struct TableConfig {
    level: Level,
    table: String,
    alias: String,
    details_table: String,
    details_alias: String,
    details_fk: String,
    direct_fields: BTreeMap<String, DirectField>,
    has_value_qualifier: bool,
}

impl TableConfig {
    /// Derives the configuration for `level` from the columns of its primary
    /// and details tables. Empty column lists yield no direct fields.
    pub fn derive(level: Level, columns: &[ColumnInfo], details_columns: &[ColumnInfo]) -> Self {
        let table = level.table_name().to_string();
        let alias = create_alias(&table);
        let singular = singularize(&table);

        let mut direct_fields: BTreeMap<String, DirectField> = columns
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    DirectField {
                        column: c.name.clone(),
                        column_type: ColumnType::from_column(c),
                    },
                )
            })
            .collect();

        if level == Level::Compounds {
            let column_type = direct_fields
                .get(STRUCTURE_COLUMN)
                .map(|f| f.column_type.clone())
                .unwrap_or(ColumnType::Text);
            direct_fields.insert(
                STRUCTURE_FIELD.to_string(),
                DirectField {
                    column: STRUCTURE_COLUMN.to_string(),
                    column_type,
                },
            );
        }

        Self {
            level,
            details_table: format!("{}_details", singular),
            details_alias: format!("{}d", alias),
            details_fk: format!("{}_id", singular),
            has_value_qualifier: details_columns.iter().any(|c| c.name == QUALIFIER_COLUMN),
            table,
            alias,
            direct_fields,
        }
    }

    /// The level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Primary table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Alias used inside subqueries and for cross-level joins.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Alias used for the searched level's table in the `base` CTE.
    pub fn outer_alias(&self) -> String {
        self.alias.repeat(2)
    }

    /// Details (EAV) table name.
    pub fn details_table(&self) -> &str {
        &self.details_table
    }

    /// Details table alias.
    pub fn details_alias(&self) -> &str {
        &self.details_alias
    }

    /// Foreign key from the details table (and from child levels) to this
    /// level's `id`.
    pub fn details_fk(&self) -> &str {
        &self.details_fk
    }

    /// Whether the details table carries `value_qualifier`.
    pub fn has_value_qualifier(&self) -> bool {
        self.has_value_qualifier
    }

    /// Looks up a direct field by name.
    pub fn direct_field(&self, name: &str) -> Option<&DirectField> {
        self.direct_fields.get(name)
    }

    /// Iterates over direct field names.
    pub fn direct_field_names(&self) -> impl Iterator<Item = &str> {
        self.direct_fields.keys().map(String::as_str)
    }
}

/// Table configuration for every level, plus the schema they live in.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    schema: String,
    configs: HashMap<Level, TableConfig>,
}

impl TableRegistry {
    /// Introspects the primary and details table of every level.
    pub async fn load<I>(introspector: &I, schema: impl Into<String>) -> StorageResult<Self>
    where
        I: SchemaIntrospector + ?Sized,
    {
        let mut configs = HashMap::new();
        for level in Level::ALL {
            let columns = introspector.table_columns(level.table_name()).await?;
            let details_table = format!("{}_details", singularize(level.table_name()));
            let details_columns = introspector.table_columns(&details_table).await?;

            let config = TableConfig::derive(level, &columns, &details_columns);
            debug!(
                level = %level,
                alias = %config.alias(),
                direct_fields = config.direct_fields.len(),
                value_qualifier = config.has_value_qualifier(),
                "Derived table configuration"
            );
            configs.insert(level, config);
        }

        Ok(Self {
            schema: schema.into(),
            configs,
        })
    }

    /// Builds a registry from already-derived configurations.
    pub fn from_configs(schema: impl Into<String>, configs: Vec<TableConfig>) -> Self {
        Self {
            schema: schema.into(),
            configs: configs.into_iter().map(|c| (c.level(), c)).collect(),
        }
    }

    /// Schema holding the search tables.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Configuration for `level`.
    pub fn get(&self, level: Level) -> Option<&TableConfig> {
        self.configs.get(&level)
    }
}
