use crate::doc::{GraphDoc, GraphIndex, NodeKind, NodeRecord, PlanIndex, SummaryMap};

pub(super) const SAMPLE_FILE_LIMIT: usize = 40;

pub(super) struct ReportLine {
    pub(super) text: String,
    pub(super) link: Option<String>,
}

impl ReportLine {
    fn plain(text: String) -> Self {
        Self { text, link: None }
    }
}

pub(super) fn display_label(node: &NodeRecord) -> &str {
    if node.label.is_empty() {
        &node.id
    } else {
        &node.label
    }
}

pub(super) fn node_report(
    node: &NodeRecord,
    graph: &GraphDoc,
    index: &GraphIndex,
    plan: Option<&PlanIndex>,
    summaries: &SummaryMap,
) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine::plain(format!("id: {}", node.id)),
        ReportLine::plain(format!("kind: {}", node.kind.label())),
        ReportLine::plain(format!("label: {}", node.label)),
    ];

    if let Some(confidence) = node
        .reasoning
        .as_ref()
        .and_then(|reasoning| reasoning.confidence)
    {
        lines.push(ReportLine::plain(format!("confidence: {confidence:.2}")));
    }

    let summary = node
        .meta
        .summary
        .as_deref()
        .filter(|text| !text.is_empty())
        .or_else(|| {
            summaries
                .get(&node.id)
                .map(String::as_str)
                .filter(|text| !text.is_empty())
        });
    if let Some(summary) = summary {
        lines.push(ReportLine::plain(format!("summary: {summary}")));
    }

    if let Some(rationale) = node
        .reasoning
        .as_ref()
        .and_then(|reasoning| reasoning.rationale.as_deref())
        .filter(|text| !text.is_empty())
    {
        lines.push(ReportLine::plain(format!("rationale: {rationale}")));
    }

    if let Some(hash) = node.meta.hash.as_deref().filter(|text| !text.is_empty()) {
        lines.push(ReportLine::plain(format!("content hash: {hash}")));
    }

    if let Some(file_ids) = &node.meta.file_ids {
        lines.push(ReportLine::plain(format!("cluster size: {}", file_ids.len())));

        if let Some(plan) = plan {
            let deletes = file_ids.iter().filter(|id| plan.is_delete(id)).count();
            let moves = file_ids.iter().filter(|id| plan.is_move(id)).count();
            lines.push(ReportLine::plain(format!("Planned deletes in cluster: {deletes}")));
            lines.push(ReportLine::plain(format!("Planned moves in cluster: {moves}")));
        }
    }

    let samples = sample_file_children(node, graph, index);
    if !samples.is_empty() {
        lines.push(ReportLine::plain("Sample files:".to_string()));
        lines.extend(samples);
    }

    lines
}

fn sample_file_children(
    node: &NodeRecord,
    graph: &GraphDoc,
    index: &GraphIndex,
) -> Vec<ReportLine> {
    let mut samples = Vec::new();

    for &edge_index in index.outgoing_edges(&node.id) {
        if samples.len() >= SAMPLE_FILE_LIMIT {
            break;
        }
        let Some(edge) = graph.edges.get(edge_index) else {
            continue;
        };
        let Some(target) = index.node(graph, &edge.target) else {
            continue;
        };
        if target.kind != NodeKind::File {
            continue;
        }

        samples.push(ReportLine {
            text: display_label(target).to_string(),
            link: Some(target.id.clone()),
        });
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(value: serde_json::Value) -> GraphDoc {
        serde_json::from_value(value).expect("test graph should parse")
    }

    fn plan_index(raw: &str) -> PlanIndex {
        let plan = serde_json::from_str(raw).expect("test plan should parse");
        PlanIndex::build(&plan)
    }

    fn report_texts(lines: &[ReportLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn report_counts_plan_actions_inside_a_cluster() {
        let graph = graph_from(serde_json::json!({
            "nodes": [
                {
                    "id": "c1", "kind": "duplicate_cluster", "label": "cluster",
                    "meta": { "file_ids": ["f1", "f2"] },
                },
                { "id": "f1", "kind": "file", "label": "a.txt" },
            ],
            "edges": [{ "source": "c1", "target": "f1" }],
        }));
        let index = GraphIndex::build(&graph);
        let plan = plan_index(r#"{"deletes":[{"id":"f1"}],"moves":[]}"#);
        let node = index.node(&graph, "c1").expect("c1 should resolve");

        let lines = node_report(node, &graph, &index, Some(&plan), &SummaryMap::new());
        let texts = report_texts(&lines);

        assert!(texts.contains(&"cluster size: 2"));
        assert!(texts.contains(&"Planned deletes in cluster: 1"));
        assert!(texts.contains(&"Planned moves in cluster: 0"));
        assert!(texts.contains(&"Sample files:"));

        let sample = lines
            .iter()
            .find(|line| line.link.is_some())
            .expect("one sample child expected");
        assert_eq!(sample.text, "a.txt");
        assert_eq!(sample.link.as_deref(), Some("f1"));
    }

    #[test]
    fn zero_plan_counts_are_still_reported() {
        let graph = graph_from(serde_json::json!({
            "nodes": [{
                "id": "c1", "kind": "type_cluster", "label": "images",
                "meta": { "file_ids": ["f9"] },
            }],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);
        let plan = plan_index(r#"{"deletes":[{"id":"other"}],"moves":[]}"#);
        let node = index.node(&graph, "c1").expect("c1 should resolve");

        let lines = node_report(node, &graph, &index, Some(&plan), &SummaryMap::new());
        let texts = report_texts(&lines);

        assert!(texts.contains(&"Planned deletes in cluster: 0"));
        assert!(texts.contains(&"Planned moves in cluster: 0"));
    }

    #[test]
    fn plan_lines_require_cluster_membership_data() {
        let graph = graph_from(serde_json::json!({
            "nodes": [{ "id": "cat", "kind": "category", "label": "Documents" }],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);
        let plan = plan_index(r#"{"deletes":[{"id":"f1"}],"moves":[]}"#);
        let node = index.node(&graph, "cat").expect("cat should resolve");

        let lines = node_report(node, &graph, &index, Some(&plan), &SummaryMap::new());

        assert!(
            lines.iter().all(|line| !line.text.starts_with("Planned")
                && !line.text.starts_with("cluster size")),
            "nodes without file_ids carry no plan cross references"
        );
    }

    #[test]
    fn identity_lines_lead_the_report_in_order() {
        let graph = graph_from(serde_json::json!({
            "nodes": [{ "id": "n1", "kind": "age_bucket", "label": "older than 1y" }],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);
        let node = index.node(&graph, "n1").expect("n1 should resolve");

        let lines = node_report(node, &graph, &index, None, &SummaryMap::new());
        let texts = report_texts(&lines);

        assert_eq!(
            &texts[..3],
            &["id: n1", "kind: age_bucket", "label: older than 1y"]
        );
    }

    #[test]
    fn confidence_line_requires_a_numeric_value() {
        let graph = graph_from(serde_json::json!({
            "nodes": [
                {
                    "id": "a", "kind": "file", "label": "a",
                    "reasoning": { "confidence": 0.85 },
                },
                {
                    "id": "b", "kind": "file", "label": "b",
                    "reasoning": { "confidence": "high" },
                },
            ],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);

        let node = index.node(&graph, "a").expect("a should resolve");
        let lines = node_report(node, &graph, &index, None, &SummaryMap::new());
        assert!(report_texts(&lines).contains(&"confidence: 0.85"));

        let node = index.node(&graph, "b").expect("b should resolve");
        let lines = node_report(node, &graph, &index, None, &SummaryMap::new());
        assert!(
            report_texts(&lines)
                .iter()
                .all(|text| !text.starts_with("confidence:"))
        );
    }

    #[test]
    fn summary_prefers_node_meta_over_the_external_map() {
        let graph = graph_from(serde_json::json!({
            "nodes": [
                {
                    "id": "a", "kind": "file", "label": "a",
                    "meta": { "summary": "inline summary" },
                },
                { "id": "b", "kind": "file", "label": "b" },
                {
                    "id": "c", "kind": "file", "label": "c",
                    "meta": { "summary": "" },
                },
            ],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);
        let mut summaries = SummaryMap::new();
        summaries.insert("a".to_string(), "external summary".to_string());
        summaries.insert("c".to_string(), "external summary".to_string());

        let node = index.node(&graph, "a").expect("a should resolve");
        let lines = node_report(node, &graph, &index, None, &summaries);
        assert!(report_texts(&lines).contains(&"summary: inline summary"));

        let node = index.node(&graph, "b").expect("b should resolve");
        let lines = node_report(node, &graph, &index, None, &summaries);
        assert!(
            report_texts(&lines)
                .iter()
                .all(|text| !text.starts_with("summary:")),
            "no summary line when both sources are absent"
        );

        let node = index.node(&graph, "c").expect("c should resolve");
        let lines = node_report(node, &graph, &index, None, &summaries);
        assert!(
            report_texts(&lines).contains(&"summary: external summary"),
            "an empty inline summary falls through to the external map"
        );
    }

    #[test]
    fn rationale_and_hash_lines_require_content() {
        let graph = graph_from(serde_json::json!({
            "nodes": [{
                "id": "a", "kind": "near_duplicate_text", "label": "a",
                "reasoning": { "confidence": 0.7, "rationale": "same shingles" },
                "meta": { "hash": "sha256:abcd" },
            }],
            "edges": [],
        }));
        let index = GraphIndex::build(&graph);
        let node = index.node(&graph, "a").expect("a should resolve");

        let lines = node_report(node, &graph, &index, None, &SummaryMap::new());
        let texts = report_texts(&lines);

        assert!(texts.contains(&"rationale: same shingles"));
        assert!(texts.contains(&"content hash: sha256:abcd"));
    }

    #[test]
    fn sample_children_stop_at_the_limit_and_skip_non_files() {
        let mut nodes = vec![serde_json::json!({
            "id": "c1", "kind": "duplicate_cluster", "label": "big cluster",
        })];
        let mut edges = vec![serde_json::json!({ "source": "c1", "target": "sub" })];
        nodes.push(serde_json::json!({
            "id": "sub", "kind": "subcategory", "label": "not a file",
        }));
        for index in 0..45 {
            let id = format!("f{index}");
            nodes.push(serde_json::json!({
                "id": id, "kind": "file", "label": format!("file {index}"),
            }));
            edges.push(serde_json::json!({ "source": "c1", "target": id }));
        }

        let graph = graph_from(serde_json::json!({ "nodes": nodes, "edges": edges }));
        let index = GraphIndex::build(&graph);
        let node = index.node(&graph, "c1").expect("c1 should resolve");

        let lines = node_report(node, &graph, &index, None, &SummaryMap::new());
        let samples = lines
            .iter()
            .filter(|line| line.link.is_some())
            .collect::<Vec<_>>();

        assert_eq!(samples.len(), SAMPLE_FILE_LIMIT);
        assert_eq!(samples[0].text, "file 0");
        assert!(
            samples.iter().all(|line| line.text.starts_with("file")),
            "the subcategory child must not appear as a sample"
        );
    }
}
