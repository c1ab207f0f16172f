//! Shared fixtures for query-building tests.

use crate::core::{ColumnInfo, StaticSchema};
use crate::search::table_config::singularize;
use crate::search::{FieldResolver, TableConfig, TableRegistry};
use crate::types::Level;

fn columns(pairs: &[(&str, &str)]) -> Vec<ColumnInfo> {
    pairs.iter()
        .map(|(name, data_type)| ColumnInfo::new(*name, *data_type))
        .collect()
}

/// The registration schema used throughout the tests.
pub(crate) fn moltrack_schema() -> StaticSchema {
    let ts = "timestamp with time zone";
    StaticSchema::new()
        .with_table(
            "compounds",
            columns(&[
                ("id", "integer"),
                ("molregno", "integer"),
                ("canonical_smiles", "text"),
                ("original_molfile", "text"),
                ("inchi", "text"),
                ("inchikey", "text"),
                ("formula", "text"),
                ("is_archived", "boolean"),
                ("hash_tautomer", "uuid"),
                ("created_at", ts),
                ("updated_at", ts),
            ]),
        )
        .with_table(
            "compound_details",
            columns(&[
                ("id", "integer"),
                ("compound_id", "integer"),
                ("property_id", "integer"),
                ("value_datetime", ts),
                ("value_uuid", "uuid"),
                ("value_num", "double precision"),
                ("value_string", "text"),
                ("value_qualifier", "smallint"),
            ]),
        )
        .with_table(
            "batches",
            columns(&[
                ("id", "integer"),
                ("compound_id", "integer"),
                ("batch_regno", "integer"),
                ("notes", "text"),
                ("created_at", ts),
            ]),
        )
        .with_table(
            "batch_details",
            columns(&[
                ("id", "integer"),
                ("batch_id", "integer"),
                ("property_id", "integer"),
                ("value_qualifier", "smallint"),
                ("value_datetime", ts),
                ("value_uuid", "uuid"),
                ("value_num", "double precision"),
                ("value_string", "text"),
            ]),
        )
        .with_table(
            "assays",
            columns(&[
                ("id", "integer"),
                ("name", "text"),
                ("description", "text"),
                ("created_at", "timestamp without time zone"),
            ]),
        )
        .with_table(
            "assay_details",
            columns(&[
                ("assay_id", "integer"),
                ("property_id", "integer"),
                ("value_datetime", ts),
                ("value_uuid", "uuid"),
                ("value_num", "double precision"),
                ("value_string", "text"),
            ]),
        )
        .with_table(
            "assay_runs",
            columns(&[
                ("id", "integer"),
                ("name", "text"),
                ("description", "text"),
                ("assay_id", "integer"),
                ("created_at", ts),
            ]),
        )
        .with_table(
            "assay_run_details",
            columns(&[
                ("assay_run_id", "integer"),
                ("property_id", "integer"),
                ("value_datetime", ts),
                ("value_uuid", "uuid"),
                ("value_num", "double precision"),
                ("value_string", "text"),
            ]),
        )
        .with_table(
            "assay_results",
            columns(&[
                ("id", "integer"),
                ("batch_id", "integer"),
                ("assay_run_id", "integer"),
                ("updated_at", ts),
            ]),
        )
        .with_table(
            "assay_result_details",
            columns(&[
                ("assay_result_id", "integer"),
                ("property_id", "integer"),
                ("value_qualifier", "smallint"),
                ("value_num", "double precision"),
                ("value_string", "text"),
                ("value_bool", "boolean"),
            ]),
        )
}

/// A registry derived from [`moltrack_schema`].
pub(crate) fn moltrack_registry() -> TableRegistry {
    let schema = moltrack_schema();
    let configs = Level::ALL
        .into_iter()
        .map(|level| {
            let details = format!("{}_details", singularize(level.table_name()));
            TableConfig::derive(
                level,
                &schema.columns(level.table_name()),
                &schema.columns(&details),
            )
        })
        .collect();
    TableRegistry::from_configs("moltrack", configs)
}

/// A resolver over [`moltrack_registry`].
pub(crate) fn moltrack_resolver() -> FieldResolver {
    FieldResolver::new(moltrack_registry())
}
