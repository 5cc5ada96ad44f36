use eframe::egui::{self, Align, Align2, Color32, Context, Layout, Vec2};

use crate::doc::{GraphDoc, GraphIndex, PlanDoc, PlanIndex, SummaryMap};

use super::super::{DocumentPaths, EdgeMode, LoadRequest, ViewModel};

impl ViewModel {
    pub(in crate::app) const SEARCH_RESULT_LIMIT: usize = 60;

    pub(in crate::app) fn new(
        graph: GraphDoc,
        plan: Option<PlanDoc>,
        summaries: SummaryMap,
    ) -> Self {
        let index = GraphIndex::build(&graph);
        let plan_index = plan.as_ref().map(PlanIndex::build);

        Self {
            graph,
            index,
            plan,
            plan_index,
            summaries,
            kind_filter: None,
            min_confidence: 0.0,
            search: String::new(),
            edge_mode: EdgeMode::Selected,
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            scene_dirty: true,
            scene_revision: 0,
            scene_cache: None,
            search_result_cache: None,
            alert: None,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        paths: &mut DocumentPaths,
        load_requests: &mut Vec<LoadRequest>,
        is_loading: bool,
    ) {
        if self.scene_dirty {
            self.rebuild_scene();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("clusterlens");
                    ui.separator();
                    ui.label(format!("nodes: {}", self.graph.node_count()));
                    ui.label(format!("edges: {}", self.graph.edge_count()));
                    if let Some(plan) = &self.plan {
                        ui.label(format!(
                            "plan: {} deletes / {} moves",
                            plan.deletes.len(),
                            plan.moves.len()
                        ));
                    }
                    if !self.summaries.is_empty() {
                        ui.label(format!("summaries: {}", self.summaries.len()));
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "visible: {} cards / {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(350.0)
            .show(ctx, |ui| self.draw_controls(ui, paths, load_requests, is_loading));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        self.show_alert(ctx);
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        let changed = self.selected != selected;
        if !changed {
            return;
        }

        self.selected = selected;
        self.scene_dirty = true;
    }

    pub(in crate::app) fn set_plan(&mut self, plan: PlanDoc) {
        self.plan_index = Some(PlanIndex::build(&plan));
        self.plan = Some(plan);
    }

    pub(in crate::app) fn set_summaries(&mut self, summaries: SummaryMap) {
        self.summaries = summaries;
    }

    fn show_alert(&mut self, ctx: &Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let mut dismissed = false;

        egui::Window::new("Document load failed")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.colored_label(Color32::LIGHT_RED, message);
                ui.add_space(8.0);
                if ui.button("Dismiss").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.alert = None;
        }
    }
}
