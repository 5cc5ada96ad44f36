use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, StrokeKind, Ui};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, draw_background, edge_visible, kind_color, world_to_screen,
};
use super::build::{LEFT_MARGIN, ROW_HEIGHT};

const CARD_FILL: Color32 = Color32::from_rgb(33, 40, 51);
const CARD_FILL_HOVERED: Color32 = Color32::from_rgb(45, 53, 66);
const CARD_BORDER: Color32 = Color32::from_rgb(58, 68, 82);
const SELECTION_ACCENT: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.scene_dirty {
            self.rebuild_scene();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let pan = self.pan;
        let zoom = self.zoom;
        let zoom_sqrt = zoom.sqrt();
        let selected_id = self.selected.clone();
        let escape_pressed = ui.input(|input| input.key_pressed(egui::Key::Escape));

        // Cards register after the canvas, so they win pointer contention; a click
        // that reaches the canvas landed on empty space.
        let mut pending_selection = if response.clicked_by(egui::PointerButton::Primary)
            || (escape_pressed && selected_id.is_some())
        {
            Some(None)
        } else {
            None
        };

        let Some(scene) = self.scene_cache.as_ref() else {
            return;
        };

        for (index, row) in scene.rows.iter().enumerate() {
            if index % 2 == 1 {
                let top = world_to_screen(rect, pan, zoom, Pos2::new(0.0, row.y - 26.0));
                let band = egui::Rect::from_min_max(
                    Pos2::new(rect.left(), top.y),
                    Pos2::new(rect.right(), top.y + (ROW_HEIGHT * zoom)),
                );
                painter.rect_filled(band, 0.0, Color32::from_rgba_unmultiplied(255, 255, 255, 4));
            }
        }

        for edge in &scene.edges {
            let start = world_to_screen(rect, pan, zoom, edge.from);
            let end = world_to_screen(rect, pan, zoom, edge.to);
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let (line_width, line_color) = if edge.incident {
                ((1.8 * zoom_sqrt).clamp(0.8, 3.5), SELECTION_ACCENT)
            } else {
                (
                    (1.1 * zoom_sqrt).clamp(0.5, 2.5),
                    Color32::from_rgba_unmultiplied(110, 120, 134, 150),
                )
            };
            painter.line_segment([start, end], Stroke::new(line_width, line_color));
        }

        let mut any_card_hovered = false;
        let mut selection_animating = false;

        for card in &scene.cards {
            let screen_rect = egui::Rect::from_min_max(
                world_to_screen(rect, pan, zoom, card.rect.min),
                world_to_screen(rect, pan, zoom, card.rect.max),
            );
            if !rect.intersects(screen_rect) {
                continue;
            }

            let card_response = ui.interact(
                screen_rect,
                ui.make_persistent_id(("node-card", card.id.as_str())),
                Sense::click(),
            );
            if card_response.clicked() {
                pending_selection = Some(Some(card.id.clone()));
            }
            let is_hovered = card_response.hovered();
            any_card_hovered |= is_hovered;

            let is_selected = selected_id.as_deref() == Some(card.id.as_str());
            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("card-selected", card.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            let corner = 6.0 * zoom.clamp(0.5, 2.0);
            let fill = if is_hovered {
                CARD_FILL_HOVERED
            } else {
                CARD_FILL
            };
            painter.rect_filled(screen_rect, corner, fill);
            painter.rect_stroke(
                screen_rect,
                corner,
                Stroke::new(
                    1.0 + (selection_mix * 1.2),
                    blend_color(CARD_BORDER, SELECTION_ACCENT, selection_mix),
                ),
                StrokeKind::Inside,
            );
            if card_response.has_focus() {
                painter.rect_stroke(
                    screen_rect.expand(2.0),
                    corner,
                    Stroke::new(1.0, Color32::from_gray(220)),
                    StrokeKind::Outside,
                );
            }

            painter.circle_filled(
                Pos2::new(screen_rect.left() + (13.0 * zoom), screen_rect.center().y),
                (4.5 * zoom).clamp(1.5, 9.0),
                kind_color(card.kind),
            );

            let font_size = 11.0 * zoom;
            if font_size >= 6.0 {
                painter.with_clip_rect(screen_rect).text(
                    Pos2::new(screen_rect.left() + (24.0 * zoom), screen_rect.center().y),
                    Align2::LEFT_CENTER,
                    &card.title,
                    FontId::proportional(font_size.min(24.0)),
                    Color32::from_gray(235),
                );
            }

            card_response.on_hover_text(card.hover.clone());
        }

        for row in &scene.rows {
            let anchor = world_to_screen(rect, pan, zoom, Pos2::new(LEFT_MARGIN, row.y - 6.0));
            painter.text(
                anchor,
                Align2::LEFT_BOTTOM,
                row.kind.label(),
                FontId::proportional((12.0 * zoom).clamp(9.0, 18.0)),
                Color32::from_gray(150),
            );
        }

        if scene.cards.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No cards match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(140),
            );
        }

        if any_card_hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(selected) = pending_selection {
            self.apply_graph_selection(selected);
        }
    }
}
