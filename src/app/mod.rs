use std::mem;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context as _, Result, anyhow};
use eframe::egui::{self, Context, Pos2, Rect, Vec2};

use crate::doc::{
    DocSlot, DocumentBundle, GraphDoc, GraphIndex, LoadedDocument, NodeKind, PlanDoc, PlanIndex,
    SummaryMap, classify_document, load_bundle, load_document,
};

mod graph;
mod inspect;
mod render_utils;
mod ui;

pub struct ClusterLensApp {
    paths: DocumentPaths,
    state: AppState,
    load_rx: Option<Receiver<(DocSlot, Result<LoadedDocument, String>)>>,
    pending_plan: Option<PlanDoc>,
    pending_summaries: Option<SummaryMap>,
}

struct DocumentPaths {
    graph: String,
    plan: String,
    summaries: String,
}

struct LoadRequest {
    slot: DocSlot,
    path: String,
}

enum AppState {
    Idle,
    Loading {
        rx: Receiver<Result<DocumentBundle, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeMode {
    None,
    All,
    Selected,
}

impl EdgeMode {
    fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::All => "all",
            Self::Selected => "selected",
        }
    }
}

struct ViewModel {
    graph: GraphDoc,
    index: GraphIndex,
    plan: Option<PlanDoc>,
    plan_index: Option<PlanIndex>,
    summaries: SummaryMap,
    kind_filter: Option<NodeKind>,
    min_confidence: f64,
    search: String,
    edge_mode: EdgeMode,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    scene_dirty: bool,
    scene_revision: u64,
    scene_cache: Option<Scene>,
    search_result_cache: Option<SearchResultCache>,
    alert: Option<String>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
struct Scene {
    cards: Vec<SceneCard>,
    edges: Vec<SceneEdge>,
    rows: Vec<RowLabel>,
}

#[derive(Clone, Debug, PartialEq)]
struct SceneCard {
    id: String,
    kind: NodeKind,
    title: String,
    hover: String,
    rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
struct SceneEdge {
    from: Pos2,
    to: Pos2,
    incident: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct RowLabel {
    kind: NodeKind,
    y: f32,
}

struct SearchResultCache {
    query: String,
    scene_revision: u64,
    hits: Arc<Vec<SearchHit>>,
}

struct SearchHit {
    id: String,
    label: String,
    score: i64,
}

impl ClusterLensApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph: Option<String>,
        plan: Option<String>,
        summaries: Option<String>,
    ) -> Self {
        let paths = DocumentPaths {
            graph: graph.unwrap_or_default(),
            plan: plan.unwrap_or_default(),
            summaries: summaries.unwrap_or_default(),
        };
        let state = if paths.graph.trim().is_empty() {
            AppState::Idle
        } else {
            Self::start_bundle_load(&paths)
        };

        Self {
            paths,
            state,
            load_rx: None,
            pending_plan: None,
            pending_summaries: None,
        }
    }

    fn start_bundle_load(paths: &DocumentPaths) -> AppState {
        let graph_path = paths.graph.trim().to_string();
        let plan_path = optional_path(&paths.plan);
        let summaries_path = optional_path(&paths.summaries);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = load_bundle(
                Path::new(&graph_path),
                plan_path.as_deref().map(Path::new),
                summaries_path.as_deref().map(Path::new),
            )
            .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }

    fn spawn_document_load(
        request: LoadRequest,
    ) -> Receiver<(DocSlot, Result<LoadedDocument, String>)> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_document(request.slot, Path::new(&request.path))
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send((request.slot, result));
        });

        rx
    }

    fn spawn_drop_load(
        files: Vec<egui::DroppedFile>,
    ) -> Receiver<(DocSlot, Result<LoadedDocument, String>)> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for file in files {
                let result = read_dropped_file(&file)
                    .and_then(|raw| classify_document(&raw))
                    .map_err(|error| format!("{error:#}"));
                let slot = match &result {
                    Ok(LoadedDocument::Graph(_)) | Err(_) => DocSlot::Graph,
                    Ok(LoadedDocument::Plan(_)) => DocSlot::Plan,
                    Ok(LoadedDocument::Summaries(_)) => DocSlot::Summaries,
                };
                if tx.send((slot, result)).is_err() {
                    return;
                }
            }
        });

        rx
    }

    fn apply_load_result(
        model: &mut ViewModel,
        slot: DocSlot,
        result: Result<LoadedDocument, String>,
    ) {
        match result {
            Ok(LoadedDocument::Graph(graph)) => {
                log::info!(
                    "replacing graph with {} nodes and {} edges",
                    graph.node_count(),
                    graph.edge_count()
                );
                let plan = model.plan.take();
                let summaries = mem::take(&mut model.summaries);
                *model = ViewModel::new(graph, plan, summaries);
            }
            Ok(LoadedDocument::Plan(plan)) => {
                log::info!(
                    "replacing plan with {} deletes and {} moves",
                    plan.deletes.len(),
                    plan.moves.len()
                );
                model.set_plan(plan);
            }
            Ok(LoadedDocument::Summaries(summaries)) => {
                log::info!("replacing summaries with {} entries", summaries.len());
                model.set_summaries(summaries);
            }
            Err(error) => match slot {
                DocSlot::Graph => model.alert = Some(error),
                DocSlot::Plan | DocSlot::Summaries => {
                    log::warn!("{} document unavailable: {error}", slot.label());
                }
            },
        }
    }

    fn absorb_idle_load(
        pending_plan: &mut Option<PlanDoc>,
        pending_summaries: &mut Option<SummaryMap>,
        slot: DocSlot,
        result: Result<LoadedDocument, String>,
    ) -> Option<AppState> {
        match result {
            Ok(LoadedDocument::Graph(graph)) => {
                let plan = pending_plan.take();
                let summaries = pending_summaries.take().unwrap_or_default();
                Some(AppState::Ready(Box::new(ViewModel::new(
                    graph, plan, summaries,
                ))))
            }
            Ok(LoadedDocument::Plan(plan)) => {
                *pending_plan = Some(plan);
                None
            }
            Ok(LoadedDocument::Summaries(summaries)) => {
                *pending_summaries = Some(summaries);
                None
            }
            Err(error) => match slot {
                DocSlot::Graph => Some(AppState::Error(error)),
                DocSlot::Plan | DocSlot::Summaries => {
                    log::warn!("{} document unavailable: {error}", slot.label());
                    None
                }
            },
        }
    }

    fn poll_runtime_load(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok((slot, result)) => {
                    if let AppState::Ready(model) = &mut self.state {
                        Self::apply_load_result(model, slot, result);
                    } else if let Some(next) = Self::absorb_idle_load(
                        &mut self.pending_plan,
                        &mut self.pending_summaries,
                        slot,
                        result,
                    ) {
                        self.state = next;
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.load_rx = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        if self.load_rx.is_some() || matches!(self.state, AppState::Loading { .. }) {
            log::warn!(
                "ignoring {} dropped files while a load is in flight",
                dropped.len()
            );
            return;
        }

        self.load_rx = Some(Self::spawn_drop_load(dropped));
    }

    fn draw_start_screen(ctx: &Context, paths: &mut DocumentPaths) -> bool {
        let mut load_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading("clusterlens");
                ui.label("Inspect a file-organization reasoning graph and its cleanup plan.");
                ui.add_space(24.0);

                egui::Grid::new("start_paths")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Graph JSON");
                        ui.text_edit_singleline(&mut paths.graph);
                        ui.end_row();
                        ui.label("Plan JSON");
                        ui.text_edit_singleline(&mut paths.plan);
                        ui.end_row();
                        ui.label("Summaries JSON");
                        ui.text_edit_singleline(&mut paths.summaries);
                        ui.end_row();
                    });

                ui.add_space(16.0);
                let can_load = !paths.graph.trim().is_empty();
                if ui
                    .add_enabled(can_load, egui::Button::new("Load documents"))
                    .clicked()
                {
                    load_clicked = true;
                }

                ui.add_space(12.0);
                ui.small("You can also drop graph, plan, or summaries JSON files onto this window.");
            });
        });

        load_clicked
    }
}

fn optional_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn read_dropped_file(file: &egui::DroppedFile) -> Result<String> {
    if let Some(bytes) = &file.bytes {
        return String::from_utf8(bytes.to_vec()).context("dropped file is not valid UTF-8");
    }
    if let Some(path) = &file.path {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dropped file {}", path.display()));
    }
    Err(anyhow!("dropped file {} carries no content", file.name))
}

impl eframe::App for ClusterLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Idle => {
                if Self::draw_start_screen(ctx, &mut self.paths) {
                    transition = Some(Self::start_bundle_load(&self.paths));
                }
            }
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(bundle)) => {
                        let summaries = bundle.summaries.unwrap_or_default();
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            bundle.graph,
                            bundle.plan,
                            summaries,
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading reasoning graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut back = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load reasoning graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    back = ui.button("Back to document selection").clicked();
                });
                if back {
                    transition = Some(AppState::Idle);
                }
            }
            AppState::Ready(model) => {
                let mut load_requests = Vec::new();
                let is_loading = self.load_rx.is_some();
                model.show(ctx, &mut self.paths, &mut load_requests, is_loading);

                if self.load_rx.is_none()
                    && let Some(request) = load_requests.into_iter().next()
                {
                    self.load_rx = Some(Self::spawn_document_load(request));
                }
            }
        }

        self.poll_runtime_load();
        self.handle_dropped_files(ctx);

        if self.load_rx.is_some() || matches!(self.state, AppState::Loading { .. }) {
            ctx.request_repaint();
        }

        if let Some(next_state) = transition {
            self.load_rx = None;
            self.state = next_state;
        }
    }
}
