//! Search requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FieldPath, Filter, Level};
use crate::error::ValidationError;

/// Aggregate functions that can be applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AggregationOp {
    /// Number of rows in the group.
    Count,
    /// Number of non-null values.
    Values,
    /// Number of distinct values.
    Unique,
    /// Number of null values.
    Nulls,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Sum.
    Sum,
    /// Median.
    Med,
    /// Mean.
    Avg,
    /// Sample standard deviation.
    Stdev,
    /// Sample variance.
    Variance,
    /// Population standard deviation.
    StddevPop,
    /// Population variance.
    VarPop,
    /// First quartile.
    Q1,
    /// Second quartile (median).
    Q2,
    /// Third quartile.
    Q3,
    /// All values as an array.
    ArrayAgg,
    /// Comma-separated concatenation of all values.
    ConcatAll,
    /// Comma-separated concatenation of distinct values.
    ConcatUnique,
    /// Statistical mode.
    MostFrequent,
}

impl AggregationOp {
    /// Every aggregation.
    pub const ALL: [AggregationOp; 20] = [
        AggregationOp::Count,
        AggregationOp::Values,
        AggregationOp::Unique,
        AggregationOp::Nulls,
        AggregationOp::Min,
        AggregationOp::Max,
        AggregationOp::Sum,
        AggregationOp::Med,
        AggregationOp::Avg,
        AggregationOp::Stdev,
        AggregationOp::Variance,
        AggregationOp::StddevPop,
        AggregationOp::VarPop,
        AggregationOp::Q1,
        AggregationOp::Q2,
        AggregationOp::Q3,
        AggregationOp::ArrayAgg,
        AggregationOp::ConcatAll,
        AggregationOp::ConcatUnique,
        AggregationOp::MostFrequent,
    ];

    /// Returns the keyword as written in requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationOp::Count => "COUNT",
            AggregationOp::Values => "VALUES",
            AggregationOp::Unique => "UNIQUE",
            AggregationOp::Nulls => "NULLS",
            AggregationOp::Min => "MIN",
            AggregationOp::Max => "MAX",
            AggregationOp::Sum => "SUM",
            AggregationOp::Med => "MED",
            AggregationOp::Avg => "AVG",
            AggregationOp::Stdev => "STDEV",
            AggregationOp::Variance => "VARIANCE",
            AggregationOp::StddevPop => "STDDEV_POP",
            AggregationOp::VarPop => "VAR_POP",
            AggregationOp::Q1 => "Q1",
            AggregationOp::Q2 => "Q2",
            AggregationOp::Q3 => "Q3",
            AggregationOp::ArrayAgg => "ARRAY_AGG",
            AggregationOp::ConcatAll => "CONCAT ALL",
            AggregationOp::ConcatUnique => "CONCAT UNIQUE",
            AggregationOp::MostFrequent => "MOST FREQUENT",
        }
    }
}

impl fmt::Display for AggregationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        AggregationOp::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnsupportedAggregation {
                operation: s.to_string(),
            })
    }
}

impl TryFrom<String> for AggregationOp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AggregationOp> for String {
    fn from(op: AggregationOp) -> Self {
        op.as_str().to_string()
    }
}

/// An aggregate over a field, projected as an extra output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregation {
    /// Field to aggregate. May belong to any level.
    pub field: FieldPath,
    /// Aggregate function.
    pub operation: AggregationOp,
}

impl Aggregation {
    /// Creates an aggregation.
    pub fn new(field: FieldPath, operation: AggregationOp) -> Self {
        Self { field, operation }
    }
}

/// Serialization format of search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON envelope.
    #[default]
    Json,
    /// Comma-separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl OutputFormat {
    /// File extension used for attachments.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            _ => Err(ValidationError::UnsupportedOutputFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// A complete advanced-search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchRequest")]
pub struct SearchRequest {
    level: Level,
    output: Vec<FieldPath>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aggregations: Vec<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    output_format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
}

#[derive(Deserialize)]
struct RawSearchRequest {
    level: Level,
    output: Vec<FieldPath>,
    #[serde(default)]
    aggregations: Vec<Aggregation>,
    #[serde(default)]
    filter: Option<Filter>,
    #[serde(default)]
    output_format: OutputFormat,
    #[serde(default)]
    limit: Option<u64>,
}

impl SearchRequest {
    /// Creates a request for `level` projecting `output`.
    ///
    /// Fails when `output` is empty.
    pub fn new(level: Level, output: Vec<FieldPath>) -> Result<Self, ValidationError> {
        if output.is_empty() {
            return Err(ValidationError::InvalidRequest {
                message: "output must contain at least one field".to_string(),
            });
        }
        Ok(Self {
            level,
            output,
            aggregations: Vec::new(),
            filter: None,
            output_format: OutputFormat::default(),
            limit: None,
        })
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the aggregations.
    pub fn with_aggregations(mut self, aggregations: Vec<Aggregation>) -> Self {
        self.aggregations = aggregations;
        self
    }

    /// Sets the output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Sets the row limit. Zero means no limit.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Caps the row limit at `max`, applying it when no limit was requested.
    pub fn clamp_limit(mut self, max: u64) -> Self {
        self.limit = Some(self.limit().map_or(max, |l| l.min(max)));
        self
    }

    /// The level being searched.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Requested output fields, in order.
    pub fn output(&self) -> &[FieldPath] {
        &self.output
    }

    /// Requested aggregations, in order.
    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    /// The filter, if any.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// The output format.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// The row limit, if any. A zero limit reads as none.
    pub fn limit(&self) -> Option<u64> {
        self.limit.filter(|l| *l > 0)
    }
}

impl TryFrom<RawSearchRequest> for SearchRequest {
    type Error = ValidationError;

    fn try_from(raw: RawSearchRequest) -> Result<Self, Self::Error> {
        let mut request = SearchRequest::new(raw.level, raw.output)?
            .with_aggregations(raw.aggregations)
            .with_output_format(raw.output_format);
        request.filter = raw.filter;
        request.limit = raw.limit;
        Ok(request)
    }
}
