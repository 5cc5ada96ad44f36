use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub type SummaryMap = HashMap<String, String>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Category,
    Subcategory,
    DuplicateCluster,
    NearDuplicateText,
    TypeCluster,
    AgeBucket,
    File,
    #[default]
    #[serde(other)]
    Other,
}

pub const KIND_ROWS: [NodeKind; 8] = [
    NodeKind::Root,
    NodeKind::Category,
    NodeKind::Subcategory,
    NodeKind::DuplicateCluster,
    NodeKind::NearDuplicateText,
    NodeKind::TypeCluster,
    NodeKind::AgeBucket,
    NodeKind::File,
];

impl NodeKind {
    pub fn row_index(self) -> usize {
        match self {
            Self::Root => 0,
            Self::Category => 1,
            Self::Subcategory => 2,
            Self::DuplicateCluster => 3,
            Self::NearDuplicateText => 4,
            Self::TypeCluster => 5,
            Self::AgeBucket => 6,
            Self::File | Self::Other => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::DuplicateCluster => "duplicate_cluster",
            Self::NearDuplicateText => "near_duplicate_text",
            Self::TypeCluster => "type_cluster",
            Self::AgeBucket => "age_bucket",
            Self::File => "file",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphDoc {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDoc {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub reasoning: Option<Reasoning>,
    #[serde(default)]
    pub meta: NodeMeta,
}

impl NodeRecord {
    pub fn effective_confidence(&self) -> f64 {
        self.reasoning
            .as_ref()
            .and_then(|reasoning| reasoning.confidence)
            .unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Reasoning {
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeMeta {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EdgeRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanDoc {
    #[serde(default)]
    pub deletes: Vec<PlanEntry>,
    #[serde(default)]
    pub moves: Vec<PlanEntry>,
    #[serde(default)]
    pub summary: Option<PlanSummary>,
    #[serde(default)]
    pub cluster_costs: HashMap<String, ClusterCost>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanSummary {
    #[serde(default)]
    pub files_scanned: Option<u64>,
    #[serde(default)]
    pub suggested_deletions: Option<u64>,
    #[serde(default)]
    pub suggested_moves: Option<u64>,
    #[serde(default)]
    pub elapsed_sec: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClusterCost {
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub gb: f64,
    #[serde(default)]
    pub monthly_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_parses_as_other() {
        let node: NodeRecord =
            serde_json::from_str(r#"{"id":"n1","kind":"mystery","label":"x"}"#)
                .expect("node should parse");
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn missing_kind_defaults_to_other() {
        let node: NodeRecord =
            serde_json::from_str(r#"{"id":"n1","label":"x"}"#).expect("node should parse");
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn node_with_only_unknown_fields_parses_as_blank() {
        let node: NodeRecord =
            serde_json::from_str(r#"{"size":12,"mtime":0}"#).expect("node should parse");
        assert_eq!(node.id, "");
        assert_eq!(node.label, "");
        assert!(node.reasoning.is_none());
    }

    #[test]
    fn non_numeric_confidence_is_treated_as_absent() {
        let node: NodeRecord = serde_json::from_str(
            r#"{"id":"n1","kind":"file","label":"x","reasoning":{"confidence":"high","rationale":"r"}}"#,
        )
        .expect("node should parse");

        let reasoning = node.reasoning.expect("reasoning should be present");
        assert!(reasoning.confidence.is_none(), "a string confidence must not count as numeric");
        assert_eq!(reasoning.rationale.as_deref(), Some("r"));
    }

    #[test]
    fn integer_confidence_parses_as_float() {
        let node: NodeRecord = serde_json::from_str(
            r#"{"id":"n1","kind":"file","label":"x","reasoning":{"confidence":1}}"#,
        )
        .expect("node should parse");
        assert_eq!(node.effective_confidence(), 1.0);
    }

    #[test]
    fn effective_confidence_defaults_to_full() {
        let node: NodeRecord =
            serde_json::from_str(r#"{"id":"n1","kind":"file","label":"x"}"#)
                .expect("node should parse");
        assert_eq!(node.effective_confidence(), 1.0);

        let node: NodeRecord = serde_json::from_str(
            r#"{"id":"n2","kind":"file","label":"y","reasoning":{"rationale":"r"}}"#,
        )
        .expect("node should parse");
        assert_eq!(node.effective_confidence(), 1.0);
    }

    #[test]
    fn graph_doc_tolerates_missing_sections_and_extra_fields() {
        let graph: GraphDoc =
            serde_json::from_str(r#"{"nodes":[],"generated_at":"2024-01-01"}"#)
                .expect("graph should parse");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn edge_extra_fields_are_ignored() {
        let edge: EdgeRecord =
            serde_json::from_str(r#"{"source":"a","target":"b","id":"e1","kind":"link"}"#)
                .expect("edge should parse");
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
    }

    #[test]
    fn plan_doc_defaults_every_section() {
        let plan: PlanDoc = serde_json::from_str("{}").expect("plan should parse");
        assert!(plan.deletes.is_empty());
        assert!(plan.moves.is_empty());
        assert!(plan.summary.is_none());
        assert!(plan.cluster_costs.is_empty());
    }

    #[test]
    fn plan_doc_parses_producer_output() {
        let plan: PlanDoc = serde_json::from_str(
            r#"{
                "deletes": [{"id":"f1","path":"/tmp/a.txt","reason":"duplicate","confidence":0.9}],
                "moves": [{"id":"f2","from":"/tmp/b.txt","to":"/archive","reason":"old"}],
                "summary": {"files_scanned": 100, "suggested_deletions": 1, "suggested_moves": 1, "elapsed_sec": 2.5},
                "cluster_costs": {"dup:abc": {"bytes": 2048, "gb": 0.000002, "monthly_cost": 0.01}}
            }"#,
        )
        .expect("plan should parse");

        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].id, "f1");
        assert_eq!(plan.moves[0].to.as_deref(), Some("/archive"));
        assert_eq!(
            plan.summary.and_then(|summary| summary.files_scanned),
            Some(100)
        );
        assert_eq!(plan.cluster_costs["dup:abc"].bytes, 2048);
    }

    #[test]
    fn canonical_rows_cover_every_named_kind_in_order() {
        for (row, kind) in KIND_ROWS.iter().enumerate() {
            assert_eq!(kind.row_index(), row, "row order drifted for {kind:?}");
        }
        assert_eq!(NodeKind::Other.row_index(), NodeKind::File.row_index());
    }
}
