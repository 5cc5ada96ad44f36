use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::doc::model::{GraphDoc, PlanDoc, SummaryMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocSlot {
    Graph,
    Plan,
    Summaries,
}

impl DocSlot {
    pub fn label(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Plan => "plan",
            Self::Summaries => "summaries",
        }
    }
}

#[derive(Clone, Debug)]
pub enum LoadedDocument {
    Graph(GraphDoc),
    Plan(PlanDoc),
    Summaries(SummaryMap),
}

#[derive(Debug, Default)]
pub struct DocumentBundle {
    pub graph: GraphDoc,
    pub plan: Option<PlanDoc>,
    pub summaries: Option<SummaryMap>,
}

pub fn load_graph(path: &Path) -> Result<GraphDoc> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph document {}", path.display()))?;
    parse_graph(&raw)
}

pub fn parse_graph(raw: &str) -> Result<GraphDoc> {
    serde_json::from_str(raw).context("invalid graph JSON")
}

pub fn load_plan(path: &Path) -> Result<PlanDoc> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan document {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid plan JSON")
}

pub fn load_summaries(path: &Path) -> Result<SummaryMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read summaries document {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid summaries JSON")
}

pub fn load_bundle(
    graph_path: &Path,
    plan_path: Option<&Path>,
    summaries_path: Option<&Path>,
) -> Result<DocumentBundle> {
    let graph = load_graph(graph_path)?;
    log::info!(
        "loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let plan = plan_path.and_then(|path| match load_plan(path) {
        Ok(plan) => Some(plan),
        Err(error) => {
            log::warn!("plan document unavailable: {error:#}");
            None
        }
    });

    let summaries = summaries_path.and_then(|path| match load_summaries(path) {
        Ok(summaries) => Some(summaries),
        Err(error) => {
            log::warn!("summaries document unavailable: {error:#}");
            None
        }
    });

    Ok(DocumentBundle {
        graph,
        plan,
        summaries,
    })
}

pub fn load_document(slot: DocSlot, path: &Path) -> Result<LoadedDocument> {
    match slot {
        DocSlot::Graph => load_graph(path).map(LoadedDocument::Graph),
        DocSlot::Plan => load_plan(path).map(LoadedDocument::Plan),
        DocSlot::Summaries => load_summaries(path).map(LoadedDocument::Summaries),
    }
}

pub fn classify_document(raw: &str) -> Result<LoadedDocument> {
    let value: Value = serde_json::from_str(raw).context("invalid JSON")?;
    let Some(object) = value.as_object() else {
        return Err(anyhow!("expected a JSON object at the document root"));
    };

    let looks_like_graph = object.contains_key("nodes");
    let looks_like_plan = object.contains_key("deletes") || object.contains_key("moves");
    let looks_like_summaries = !object.is_empty() && object.values().all(Value::is_string);

    if looks_like_graph {
        let graph = serde_json::from_value(value).context("invalid graph JSON")?;
        Ok(LoadedDocument::Graph(graph))
    } else if looks_like_plan {
        let plan = serde_json::from_value(value).context("invalid plan JSON")?;
        Ok(LoadedDocument::Plan(plan))
    } else if looks_like_summaries {
        let summaries = serde_json::from_value(value).context("invalid summaries JSON")?;
        Ok(LoadedDocument::Summaries(summaries))
    } else {
        Err(anyhow!("unrecognized document shape"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_graph_documents() {
        let raw = r#"{"nodes":[{"id":"n1","kind":"file","label":"a"}],"edges":[]}"#;
        match classify_document(raw).expect("graph should classify") {
            LoadedDocument::Graph(graph) => assert_eq!(graph.node_count(), 1),
            other => panic!("expected a graph, got {other:?}"),
        }
    }

    #[test]
    fn classify_recognizes_plan_documents() {
        let raw = r#"{"deletes":[{"id":"f1"}],"moves":[]}"#;
        match classify_document(raw).expect("plan should classify") {
            LoadedDocument::Plan(plan) => assert_eq!(plan.deletes.len(), 1),
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn classify_recognizes_summary_maps() {
        let raw = r#"{"f1":"a short text file","f2":"a spreadsheet"}"#;
        match classify_document(raw).expect("summaries should classify") {
            LoadedDocument::Summaries(summaries) => {
                assert_eq!(summaries.len(), 2);
                assert_eq!(summaries["f1"], "a short text file");
            }
            other => panic!("expected summaries, got {other:?}"),
        }
    }

    #[test]
    fn classify_rejects_non_objects_and_unknown_shapes() {
        assert!(classify_document("[1,2,3]").is_err());
        assert!(classify_document("{}").is_err());
        assert!(classify_document(r#"{"f1":"text","f2":3}"#).is_err());
    }

    #[test]
    fn classify_prefers_graph_over_summary_shape() {
        let raw = r#"{"nodes":[],"edges":[]}"#;
        assert!(matches!(
            classify_document(raw).expect("graph should classify"),
            LoadedDocument::Graph(_)
        ));
    }

    #[test]
    fn parse_graph_reports_syntax_errors() {
        let error = parse_graph("{not json").expect_err("parse should fail");
        assert!(error.to_string().contains("invalid graph JSON"));
    }
}
