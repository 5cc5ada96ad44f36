use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;
use super::super::inspect::{display_label, node_report};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Inspector");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a card from the graph or a search result.");
            return;
        };

        let Some(node) = self.index.node(&self.graph, &selected_id) else {
            ui.label("Selected node no longer exists in the graph state.");
            return;
        };

        let title = display_label(node).to_string();
        let report = node_report(
            node,
            &self.graph,
            &self.index,
            self.plan_index.as_ref(),
            &self.summaries,
        );

        ui.label(RichText::new(title).strong());
        ui.small(selected_id.as_str());
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("inspector_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &report {
                    if let Some(target) = &line.link {
                        if ui.link(&line.text).on_hover_text(target.as_str()).clicked() {
                            self.set_selected(Some(target.clone()));
                        }
                    } else {
                        ui.label(&line.text);
                    }
                }
            });
    }
}
