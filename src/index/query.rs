//! Field-weighted structured queries

use serde::{Deserialize, Serialize};

/// Field holding document titles
pub const TITLE_FIELD: &str = "title";
/// Field holding document bodies
pub const BODY_FIELD: &str = "body";

/// Operator for combining terms within a field clause
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// All terms must match (AND)
    And,
    /// At least one term must match (OR)
    #[default]
    Or,
}

/// One field of a structured query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldClause {
    /// Field to search in
    pub field: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
    /// How to combine terms (AND/OR)
    #[serde(default)]
    pub operator: MatchOperator,
}

fn default_boost() -> f32 {
    1.0
}

impl FieldClause {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            boost: 1.0,
            operator: MatchOperator::default(),
        }
    }

    /// Set the operator to AND (all terms must match)
    pub fn with_and_operator(mut self) -> Self {
        self.operator = MatchOperator::And;
        self
    }

    /// Set the operator to OR (at least one term must match)
    pub fn with_or_operator(mut self) -> Self {
        self.operator = MatchOperator::Or;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Query over several fields
///
/// A document matches when at least one clause matches it; its score is the
/// sum of the boosted scores of the matching clauses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub clauses: Vec<FieldClause>,
}

impl StructuredQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clause(mut self, clause: FieldClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Title x2 with every term required, body x1 with any term
    pub fn documentation() -> Self {
        Self::new()
            .clause(
                FieldClause::new(TITLE_FIELD)
                    .with_boost(2.0)
                    .with_and_operator(),
            )
            .clause(FieldClause::new(BODY_FIELD).with_or_operator())
    }
}
