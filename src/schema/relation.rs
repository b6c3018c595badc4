//! Relationship classification: the `RelType` carried on every edge, its
//! weight table, and the relation-name shorthand derived from an FK
//! column name (spec §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelType {
    OneToOne,
    OneToMany,
    Recursive,
    Polymorphic,
    Embedded,
    Remote,
    /// Recorded for documentation but never traversed — weight is
    /// effectively infinite.
    Skip,
}

impl RelType {
    /// Lower is preferred. `Skip` sorts after everything traversable.
    pub fn weight(&self) -> u32 {
        match self {
            RelType::OneToOne | RelType::OneToMany => 1,
            RelType::Embedded => 5,
            RelType::Remote => 8,
            RelType::Recursive => 10,
            RelType::Polymorphic => 15,
            RelType::Skip => u32::MAX,
        }
    }
}

/// One materialized hop. `kind` classifies it; `opposite_edge_id` lets
/// `resolver::pick_edges` forbid an immediate single-hop backtrack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: usize,
    pub opposite_edge_id: usize,
    pub from_node: usize,
    pub to_node: usize,
    pub weight: u32,
    pub kind: RelType,
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
    pub relation_name: String,
}

/// Strip the FK-column affixes spec §4.4 names, in order, and stop at the
/// first match; a column with none of these affixes is used unchanged.
pub fn derive_relation_name(column: &str) -> String {
    if let Some(stripped) = column.strip_suffix("_ids") {
        return stripped.to_string();
    }
    if let Some(stripped) = column.strip_suffix("_id") {
        return stripped.to_string();
    }
    if let Some(stripped) = column.strip_prefix("ids_") {
        return stripped.to_string();
    }
    if let Some(stripped) = column.strip_prefix("id_") {
        return stripped.to_string();
    }
    column.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_affixes() {
        assert_eq!(derive_relation_name("user_id"), "user");
        assert_eq!(derive_relation_name("comment_ids"), "comment");
        assert_eq!(derive_relation_name("id_owner"), "owner");
        assert_eq!(derive_relation_name("ids_owner"), "owner");
        assert_eq!(derive_relation_name("name"), "name");
    }

    #[test]
    fn suffix_checked_before_prefix_for_ids() {
        // "_ids" suffix must win over any coincidental "ids_" prefix read.
        assert_eq!(derive_relation_name("thing_ids"), "thing");
    }

    #[test]
    fn weights_match_spec_table() {
        assert_eq!(RelType::OneToOne.weight(), 1);
        assert_eq!(RelType::OneToMany.weight(), 1);
        assert_eq!(RelType::Embedded.weight(), 5);
        assert_eq!(RelType::Remote.weight(), 8);
        assert_eq!(RelType::Recursive.weight(), 10);
        assert_eq!(RelType::Polymorphic.weight(), 15);
        assert_eq!(RelType::Skip.weight(), u32::MAX);
    }
}
