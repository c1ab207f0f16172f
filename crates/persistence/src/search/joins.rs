//! Join planning.
//!
//! [`JoinPlan`] accumulates join clauses while fields are resolved. Clauses
//! are keyed by the alias of the table instance they introduce, so the same
//! physical table may appear more than once under different aliases (each
//! details table brings its own `properties` join) but no alias is ever
//! joined twice. Insertion order is preserved, which keeps every join after
//! the join it depends on.
//!
//! [`level_path`] finds the chain of foreign-key hops connecting two levels:
//!
//! ```text
//! compounds <- batches.compound_id
//! batches   <- assay_results.batch_id
//! assay_runs <- assay_results.assay_run_id
//! assays    <- assay_runs.assay_id
//! ```

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::types::Level;

/// A table reference with its alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Schema name.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Alias.
    pub alias: String,
}

impl TableRef {
    /// Creates a table reference.
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            alias: alias.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.schema, self.table, self.alias)
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// One join clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// Join type.
    pub kind: JoinKind,
    /// Joined table.
    pub table: TableRef,
    /// `ON` predicate.
    pub on: String,
}

impl JoinClause {
    /// Creates a `LEFT JOIN`.
    pub fn left(table: TableRef, on: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Left,
            table,
            on: on.into(),
        }
    }

    /// Creates an inner `JOIN`.
    pub fn inner(table: TableRef, on: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Inner,
            table,
            on: on.into(),
        }
    }

    /// Creates a join of `kind`.
    pub fn of_kind(kind: JoinKind, table: TableRef, on: impl Into<String>) -> Self {
        Self {
            kind,
            table,
            on: on.into(),
        }
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind.keyword(), self.table, self.on)
    }
}

/// Ordered, de-duplicated join clauses for one query build.
#[derive(Debug, Clone, Default)]
pub struct JoinPlan {
    clauses: Vec<JoinClause>,
    joined: HashSet<String>,
}

impl JoinPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends clauses whose alias is not yet joined. Returns how many were
    /// added.
    pub fn add(&mut self, clauses: impl IntoIterator<Item = JoinClause>) -> usize {
        let mut added = 0;
        for clause in clauses {
            if self.joined.insert(clause.table.alias.clone()) {
                self.clauses.push(clause);
                added += 1;
            }
        }
        added
    }

    /// Returns true if a table instance with `alias` is joined.
    pub fn contains(&self, alias: &str) -> bool {
        self.joined.contains(alias)
    }

    /// Renders all clauses in insertion order.
    pub fn to_sql(&self) -> String {
        self.clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of joins.
    pub fn join_count(&self) -> usize {
        self.clauses.len()
    }

    /// Returns true if nothing is joined.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns true if the most recent join is of `table`.
    pub fn is_last_join(&self, table: &str) -> bool {
        self.clauses.last().is_some_and(|c| c.table.table == table)
    }

    /// Alias of the most recently joined table.
    pub fn last_table_alias(&self) -> Option<&str> {
        self.clauses.last().map(|c| c.table.alias.as_str())
    }
}

/// Direction of a hop between adjacent levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopDirection {
    /// From a parent to a child holding the foreign key.
    ToChild,
    /// From a child to the parent it references.
    ToParent,
}

/// One foreign-key hop between adjacent levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    /// Level joined from.
    pub from: Level,
    /// Level joined to.
    pub to: Level,
    /// Direction of the hop.
    pub direction: HopDirection,
}

impl Hop {
    /// The parent level of the hop; its details foreign key names the column
    /// on the child.
    pub fn parent(&self) -> Level {
        match self.direction {
            HopDirection::ToChild => self.from,
            HopDirection::ToParent => self.to,
        }
    }
}

// (child, parent): the child holds `<parent singular>_id`.
const RELATIONS: [(Level, Level); 4] = [
    (Level::Batches, Level::Compounds),
    (Level::AssayResults, Level::Batches),
    (Level::AssayResults, Level::AssayRuns),
    (Level::AssayRuns, Level::Assays),
];

fn neighbours(level: Level) -> impl Iterator<Item = Hop> {
    RELATIONS.into_iter().filter_map(move |(child, parent)| {
        if child == level {
            Some(Hop {
                from: level,
                to: parent,
                direction: HopDirection::ToParent,
            })
        } else if parent == level {
            Some(Hop {
                from: level,
                to: child,
                direction: HopDirection::ToChild,
            })
        } else {
            None
        }
    })
}

/// Returns the shortest chain of hops from `from` to `to`; empty when the
/// levels are equal.
pub fn level_path(from: Level, to: Level) -> Vec<Hop> {
    let mut queue = VecDeque::from([(from, Vec::new())]);
    let mut visited = HashSet::from([from]);

    while let Some((level, path)) = queue.pop_front() {
        if level == to {
            return path;
        }
        for hop in neighbours(level) {
            if visited.insert(hop.to) {
                let mut next = path.clone();
                next.push(hop);
                queue.push_back((hop.to, next));
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, alias: &str) -> TableRef {
        TableRef::new("moltrack", name, alias)
    }

    #[test]
    fn test_join_plan_dedup_and_order() {
        let mut plan = JoinPlan::new();
        let added = plan.add([
            JoinClause::left(table("batches", "b"), "b.compound_id = cc.id"),
            JoinClause::left(table("batch_details", "bd"), "bd.batch_id = b.id"),
        ]);
        assert_eq!(added, 2);

        let added = plan.add([
            JoinClause::left(table("batches", "b"), "b.compound_id = cc.id"),
            JoinClause::left(table("properties", "p_bd"), "p_bd.id = bd.property_id"),
        ]);
        assert_eq!(added, 1);

        assert_eq!(plan.join_count(), 3);
        assert_eq!(
            plan.to_sql(),
            "LEFT JOIN moltrack.batches b ON b.compound_id = cc.id \
             LEFT JOIN moltrack.batch_details bd ON bd.batch_id = b.id \
             LEFT JOIN moltrack.properties p_bd ON p_bd.id = bd.property_id"
        );
    }

    #[test]
    fn test_same_table_under_distinct_aliases() {
        let mut plan = JoinPlan::new();
        plan.add([JoinClause::inner(table("properties", "p_cd"), "p_cd.id = cd.property_id")]);
        plan.add([JoinClause::inner(table("properties", "p_bd"), "p_bd.id = bd.property_id")]);
        assert_eq!(plan.join_count(), 2);
        assert!(plan.contains("p_cd"));
        assert!(plan.contains("p_bd"));
    }

    #[test]
    fn test_last_join() {
        let mut plan = JoinPlan::new();
        assert!(plan.is_empty());
        assert_eq!(plan.last_table_alias(), None);
        assert!(!plan.is_last_join("batches"));

        plan.add([JoinClause::inner(table("batches", "b"), "b.id = ar.batch_id")]);
        assert!(plan.is_last_join("batches"));
        assert_eq!(plan.last_table_alias(), Some("b"));
    }

    #[test]
    fn test_level_path_adjacent() {
        let path = level_path(Level::Compounds, Level::Batches);
        assert_eq!(
            path,
            vec![Hop {
                from: Level::Compounds,
                to: Level::Batches,
                direction: HopDirection::ToChild,
            }]
        );
        assert_eq!(path[0].parent(), Level::Compounds);
    }

    #[test]
    fn test_level_path_across_results() {
        let path = level_path(Level::Compounds, Level::Assays);
        let levels: Vec<Level> = path.iter().map(|h| h.to).collect();
        assert_eq!(
            levels,
            vec![
                Level::Batches,
                Level::AssayResults,
                Level::AssayRuns,
                Level::Assays
            ]
        );
        assert_eq!(path[0].direction, HopDirection::ToChild);
        assert_eq!(path[2].direction, HopDirection::ToParent);
        assert_eq!(path[2].parent(), Level::AssayRuns);
    }

    #[test]
    fn test_level_path_same_level() {
        assert!(level_path(Level::AssayRuns, Level::AssayRuns).is_empty());
    }
}
