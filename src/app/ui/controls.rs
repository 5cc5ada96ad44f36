use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::{self, Align, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::doc::{DocSlot, KIND_ROWS, PlanEntry};
use crate::util::format_bytes;

use super::super::inspect::display_label;
use super::super::{
    DocumentPaths, EdgeMode, LoadRequest, SearchHit, SearchResultCache, ViewModel,
};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        paths: &mut DocumentPaths,
        load_requests: &mut Vec<LoadRequest>,
        is_loading: bool,
    ) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.label("Search (label or path)")
            .on_hover_text("Case-insensitive substring filter over node labels and file paths.");
        changed |= ui.text_edit_singleline(&mut self.search).changed();

        self.draw_search_results(ui);

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Kind");
            let current = match self.kind_filter {
                None => "all kinds",
                Some(kind) => kind.label(),
            };
            egui::ComboBox::from_id_salt("kind_filter")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut self.kind_filter, None, "all kinds")
                        .changed();
                    for kind in KIND_ROWS {
                        changed |= ui
                            .selectable_value(&mut self.kind_filter, Some(kind), kind.label())
                            .changed();
                    }
                });
        });

        changed |= ui
            .add(
                egui::Slider::new(&mut self.min_confidence, 0.0..=1.0)
                    .step_by(0.05)
                    .text("Min confidence"),
            )
            .on_hover_text(
                "Hide nodes whose reasoning confidence falls below this value. \
                 Nodes without a numeric confidence always stay visible.",
            )
            .changed();

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Edges");
            for mode in [EdgeMode::None, EdgeMode::All, EdgeMode::Selected] {
                changed |= ui
                    .selectable_value(&mut self.edge_mode, mode, mode.label())
                    .on_hover_text(match mode {
                        EdgeMode::None => "Draw no edges.",
                        EdgeMode::All => "Draw every edge between visible cards.",
                        EdgeMode::Selected => "Draw only edges touching the selected card.",
                    })
                    .changed();
            }
        });

        if changed {
            self.scene_dirty = true;
        }

        ui.separator();

        draw_documents_section(ui, paths, load_requests, is_loading);
        self.draw_plan_section(ui);
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let Some(hits) = self.cached_search_hits() else {
            return;
        };
        if hits.is_empty() {
            ui.small("No fuzzy matches.");
            return;
        }

        let mut selected_id = None;

        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(160.0)
            .auto_shrink([false, true])
            .show_rows(ui, 20.0, hits.len(), |ui, row_range| {
                for index in row_range {
                    let Some(hit) = hits.get(index) else {
                        continue;
                    };

                    let is_selected = self.selected.as_deref() == Some(hit.id.as_str());
                    if ui
                        .selectable_label(is_selected, &hit.label)
                        .on_hover_text(&hit.id)
                        .clicked()
                    {
                        selected_id = Some(hit.id.clone());
                    }
                }
            });

        if let Some(id) = selected_id {
            self.set_selected(Some(id));
        }
    }

    fn cached_search_hits(&mut self) -> Option<Arc<Vec<SearchHit>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_result_cache
            && cached.scene_revision == self.scene_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.hits));
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .graph
            .nodes
            .iter()
            .filter_map(|node| {
                let label = display_label(node);
                let label_score = fuzzy_match_score(&matcher, label, query);
                let path_score = node
                    .meta
                    .path
                    .as_deref()
                    .and_then(|path| fuzzy_match_score(&matcher, path, query));

                let score = label_score.max(path_score)?;
                Some(SearchHit {
                    id: node.id.clone(),
                    label: label.to_string(),
                    score,
                })
            })
            .collect::<Vec<_>>();

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.label.cmp(&b.label)));
        hits.truncate(Self::SEARCH_RESULT_LIMIT);

        let hits = Arc::new(hits);
        self.search_result_cache = Some(SearchResultCache {
            query: query.to_owned(),
            scene_revision: self.scene_revision,
            hits: Arc::clone(&hits),
        });

        Some(hits)
    }

    fn draw_plan_section(&self, ui: &mut Ui) {
        let Some(plan) = &self.plan else {
            return;
        };

        ui.add_space(8.0);
        egui::CollapsingHeader::new("Plan overview")
            .default_open(true)
            .show(ui, |ui| {
                ui.label(format!(
                    "{} suggested deletes, {} suggested moves",
                    plan.deletes.len(),
                    plan.moves.len()
                ));

                if let Some(summary) = &plan.summary {
                    if let Some(scanned) = summary.files_scanned {
                        ui.label(format!("files scanned: {scanned}"));
                    }
                    if let Some(elapsed) = summary.elapsed_sec {
                        ui.label(format!("planning time: {elapsed:.1}s"));
                    }
                }

                if !plan.cluster_costs.is_empty() {
                    let bytes: u64 = plan.cluster_costs.values().map(|cost| cost.bytes).sum();
                    let monthly: f64 = plan
                        .cluster_costs
                        .values()
                        .map(|cost| cost.monthly_cost)
                        .sum();
                    ui.label(format!(
                        "duplicate storage: {} (~${monthly:.2}/month)",
                        format_bytes(bytes)
                    ))
                    .on_hover_text("Totals across every costed duplicate cluster.");
                }

                draw_grouped_entries(ui, "Moves by destination", &plan.moves, |entry| {
                    entry.to.as_deref().unwrap_or("(unspecified)")
                });
                draw_grouped_entries(ui, "Deletes by reason", &plan.deletes, |entry| {
                    entry.reason.as_deref().unwrap_or("(unspecified)")
                });
            });
    }
}

fn draw_documents_section(
    ui: &mut Ui,
    paths: &mut DocumentPaths,
    load_requests: &mut Vec<LoadRequest>,
    is_loading: bool,
) {
    egui::CollapsingHeader::new("Documents")
        .default_open(false)
        .show(ui, |ui| {
            document_row(ui, "Graph", DocSlot::Graph, &mut paths.graph, load_requests, is_loading);
            document_row(ui, "Plan", DocSlot::Plan, &mut paths.plan, load_requests, is_loading);
            document_row(
                ui,
                "Summaries",
                DocSlot::Summaries,
                &mut paths.summaries,
                load_requests,
                is_loading,
            );

            ui.add_space(4.0);
            ui.small("Dropping a JSON file onto the window loads it by shape.");
        });
}

fn document_row(
    ui: &mut Ui,
    label: &str,
    slot: DocSlot,
    path: &mut String,
    load_requests: &mut Vec<LoadRequest>,
    is_loading: bool,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(path);

        let can_load = !is_loading && !path.trim().is_empty();
        if ui
            .add_enabled(can_load, egui::Button::new("Load"))
            .clicked()
        {
            load_requests.push(LoadRequest {
                slot,
                path: path.trim().to_string(),
            });
        }
    });
}

fn draw_grouped_entries<'plan>(
    ui: &mut Ui,
    title: &str,
    entries: &'plan [PlanEntry],
    group_key: impl Fn(&'plan PlanEntry) -> &'plan str,
) {
    if entries.is_empty() {
        return;
    }

    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        *groups.entry(group_key(entry)).or_insert(0) += 1;
    }

    ui.add_space(4.0);
    ui.label(RichText::new(title).strong());
    egui::ScrollArea::vertical()
        .id_salt(title)
        .max_height(140.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for (key, count) in &groups {
                ui.horizontal(|ui| {
                    ui.label(*key);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("{count}"));
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{GraphDoc, SummaryMap};

    fn model_with_nodes(nodes: Vec<serde_json::Value>) -> ViewModel {
        let graph: GraphDoc =
            serde_json::from_value(serde_json::json!({ "nodes": nodes, "edges": [] }))
                .expect("test graph should parse");
        ViewModel::new(graph, None, SummaryMap::new())
    }

    #[test]
    fn search_hits_match_labels_and_paths() {
        let mut model = model_with_nodes(vec![
            serde_json::json!({ "id": "a", "kind": "file", "label": "quarterly report" }),
            serde_json::json!({
                "id": "b", "kind": "file", "label": "x7",
                "meta": { "path": "/docs/reports/q3.pdf" },
            }),
            serde_json::json!({ "id": "c", "kind": "file", "label": "holiday photo" }),
        ]);
        model.search = "report".to_string();

        let hits = model.cached_search_hits().expect("query should produce hits");
        let ids = hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>();

        assert!(ids.contains(&"a"));
        assert!(ids.contains(&"b"), "path text should be searchable");
        assert!(!ids.contains(&"c"));
    }

    #[test]
    fn search_hits_are_cached_per_scene_revision() {
        let mut model = model_with_nodes(vec![serde_json::json!({
            "id": "a", "kind": "file", "label": "alpha",
        })]);
        model.search = "alp".to_string();

        let first = model.cached_search_hits().expect("hits");
        let second = model.cached_search_hits().expect("hits");
        assert!(Arc::ptr_eq(&first, &second), "same revision reuses the cache");

        model.rebuild_scene();
        let third = model.cached_search_hits().expect("hits");
        assert!(
            !Arc::ptr_eq(&first, &third),
            "a rebuilt scene invalidates the cache"
        );
    }

    #[test]
    fn search_hits_stop_at_the_result_limit() {
        let nodes = (0..ViewModel::SEARCH_RESULT_LIMIT + 15)
            .map(|index| {
                serde_json::json!({
                    "id": format!("n{index}"),
                    "kind": "file",
                    "label": format!("shared prefix {index}"),
                })
            })
            .collect();
        let mut model = model_with_nodes(nodes);
        model.search = "shared".to_string();

        let hits = model.cached_search_hits().expect("hits");
        assert_eq!(hits.len(), ViewModel::SEARCH_RESULT_LIMIT);
    }
}
