//! Aggregation catalog.
//!
//! Maps an [`AggregationOp`] to a PostgreSQL aggregate over a column
//! reference. Numeric statistics cast their input to `NUMERIC`; string and
//! mode aggregates work on the raw value. A column with no requested
//! operation collapses with `MAX`, which is how dynamic properties are
//! pivoted into a single value per group.

use crate::types::AggregationOp;

/// Aggregate SQL generation.
pub struct AggregationCatalog;

impl AggregationCatalog {
    /// Renders the aggregate of `column`, optionally restricted with
    /// `FILTER (WHERE filter)`.
    pub fn aggregate(op: Option<AggregationOp>, column: &str, filter: Option<&str>) -> String {
        let numeric = format!("CAST({} AS NUMERIC)", column);
        let percentile = |fraction: &str| {
            format!(
                "PERCENTILE_CONT({}) WITHIN GROUP (ORDER BY {})",
                fraction, numeric
            )
        };

        let expr = match op {
            None => format!("MAX({})", column),
            Some(op) => match op {
                AggregationOp::Count => "COUNT(*)".to_string(),
                AggregationOp::Values => format!("COUNT({})", column),
                AggregationOp::Unique => format!("COUNT(DISTINCT {})", column),
                AggregationOp::Nulls => format!("SUM(({} IS NULL)::int)", column),
                AggregationOp::Min => format!("MIN({})", numeric),
                AggregationOp::Max => format!("MAX({})", numeric),
                AggregationOp::Sum => format!("SUM({})", numeric),
                AggregationOp::Avg => format!("AVG({})", numeric),
                AggregationOp::Med | AggregationOp::Q2 => percentile("0.5"),
                AggregationOp::Q1 => percentile("0.25"),
                AggregationOp::Q3 => percentile("0.75"),
                AggregationOp::Stdev => format!("STDDEV_SAMP({})", numeric),
                AggregationOp::Variance => format!("VAR_SAMP({})", numeric),
                AggregationOp::StddevPop => format!("STDDEV_POP({})", numeric),
                AggregationOp::VarPop => format!("VAR_POP({})", numeric),
                AggregationOp::ArrayAgg => format!("ARRAY_AGG({})", column),
                AggregationOp::ConcatAll => {
                    format!("STRING_AGG(CAST({} AS TEXT), ', ')", column)
                }
                AggregationOp::ConcatUnique => {
                    format!("STRING_AGG(DISTINCT CAST({} AS TEXT), ', ')", column)
                }
                AggregationOp::MostFrequent => {
                    format!("MODE() WITHIN GROUP (ORDER BY {})", column)
                }
            },
        };

        match filter {
            Some(predicate) => format!("{} FILTER (WHERE {})", expr, predicate),
            None => expr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_max() {
        assert_eq!(AggregationCatalog::aggregate(None, "bd_value", None), "MAX(bd_value)");
    }

    #[test]
    fn test_numeric_statistics_cast() {
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::Avg), "x", None),
            "AVG(CAST(x AS NUMERIC))"
        );
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::Stdev), "x", None),
            "STDDEV_SAMP(CAST(x AS NUMERIC))"
        );
    }

    #[test]
    fn test_percentiles() {
        let median = AggregationCatalog::aggregate(Some(AggregationOp::Med), "x", None);
        assert_eq!(
            median,
            "PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY CAST(x AS NUMERIC))"
        );
        assert_eq!(
            median,
            AggregationCatalog::aggregate(Some(AggregationOp::Q2), "x", None)
        );
        assert!(
            AggregationCatalog::aggregate(Some(AggregationOp::Q3), "x", None)
                .starts_with("PERCENTILE_CONT(0.75)")
        );
    }

    #[test]
    fn test_counting() {
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::Count), "x", None),
            "COUNT(*)"
        );
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::Unique), "x", None),
            "COUNT(DISTINCT x)"
        );
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::Nulls), "x", None),
            "SUM((x IS NULL)::int)"
        );
    }

    #[test]
    fn test_string_aggregates() {
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::ConcatUnique), "x", None),
            "STRING_AGG(DISTINCT CAST(x AS TEXT), ', ')"
        );
        assert_eq!(
            AggregationCatalog::aggregate(Some(AggregationOp::MostFrequent), "x", None),
            "MODE() WITHIN GROUP (ORDER BY x)"
        );
    }

    #[test]
    fn test_filter_clause() {
        let sql = AggregationCatalog::aggregate(
            Some(AggregationOp::Avg),
            "ard_value",
            Some("LOWER(p_ard_name) = LOWER($1::text)"),
        );
        assert_eq!(
            sql,
            "AVG(CAST(ard_value AS NUMERIC)) FILTER (WHERE LOWER(p_ard_name) = LOWER($1::text))"
        );
    }

    #[test]
    fn test_every_operation_renders() {
        for op in AggregationOp::ALL {
            let sql = AggregationCatalog::aggregate(Some(op), "col", None);
            assert!(sql.contains('('), "{} rendered {}", op, sql);
        }
    }
}
