use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context, Vec2};
use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::graph::{Activation, Debounce, InteractionController, QueryError, ViewState};
use crate::interactome::InteractionSource;
use crate::layout::ForceLayout;

mod graph_view;
mod panels;
mod render_utils;
mod table_view;

const FETCH_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct InteractomeApp {
    controller: InteractionController,
    data_label: String,
    search: String,
    search_error: Option<String>,
    suggestions: Vec<String>,
    suggestions_loaded: bool,
    example_ids: Vec<String>,
    quick_picks: Vec<String>,
    viewport: Viewport,
}

type RefitDebounce = Debounce<fn(Vec2) -> Vec2, Vec2>;

fn pass_through(size: Vec2) -> Vec2 {
    size
}

struct Viewport {
    pan: Vec2,
    zoom: f32,
    canvas_size: Option<Vec2>,
    refit: RefitDebounce,
    fitted_revision: Option<u64>,
}

impl Viewport {
    fn new(resize_debounce: Duration) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            canvas_size: None,
            refit: Debounce::new(resize_debounce, pass_through as fn(Vec2) -> Vec2),
            fitted_revision: None,
        }
    }

    fn track_canvas(&mut self, now: Instant, size: Vec2) -> bool {
        let changed = self
            .canvas_size
            .is_none_or(|previous| (previous - size).length_sq() > 0.25);
        if changed {
            if self.canvas_size.is_some() {
                self.refit.call(now, size);
            }
            self.canvas_size = Some(size);
        }

        self.refit.poll(now).is_some()
    }

    fn request_fit(&mut self) {
        self.refit.cancel();
        self.fitted_revision = None;
    }
}

impl InteractomeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ViewerConfig,
        source: Arc<dyn InteractionSource>,
    ) -> Self {
        let layout = ForceLayout::new(config.layout_iterations);
        let mut controller =
            InteractionController::new(config.controller, source, Box::new(layout));

        if let Some(center) = &config.initial_center
            && let Err(error) = controller.select_center(center)
        {
            warn!(%error, center = %center, "ignoring initial center");
        }

        Self {
            controller,
            data_label: config.data_path.display().to_string(),
            search: config.initial_center.unwrap_or_default(),
            search_error: None,
            suggestions: Vec::new(),
            suggestions_loaded: false,
            quick_picks: config.example_ids.clone(),
            example_ids: config.example_ids,
            viewport: Viewport::new(config.resize_debounce),
        }
    }

    fn refresh_suggestions(&mut self) {
        match self.controller.source().entity_ids() {
            Ok(ids) => {
                debug!(entities = ids.len(), "loaded search suggestions");
                self.quick_picks = panels::quick_picks(&self.example_ids, &ids);
                self.suggestions = ids;
                self.suggestions_loaded = true;
            }
            Err(error) => warn!(%error, "search suggestions unavailable"),
        }
    }

    fn submit_search(&mut self, query: &str) {
        match self.controller.select_center(query) {
            Ok(()) => {
                self.search_error = None;
                self.search = query.trim().to_owned();
            }
            Err(error) => self.search_error = Some(error.to_string()),
        }
    }

    fn activate(&mut self, node_id: &str) {
        let activation = self.controller.on_node_activated(Instant::now(), node_id);
        debug!(node = node_id, ?activation, "node activated");
        if matches!(activation, Activation::Recentered | Activation::FetchStarted) {
            self.search = node_id.to_owned();
            self.search_error = None;
        }
    }

    fn reload(&mut self) {
        self.controller.reload();
        self.suggestions_loaded = false;
    }

    fn draw_central(&mut self, ui: &mut egui::Ui) {
        let view = self.controller.state().view().clone();
        match view {
            ViewState::Empty => {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Search for a protein to explore its interactions");
                });
            }
            ViewState::Loading { center } => {
                if self.controller.state().snapshot().is_some() {
                    self.draw_current_mode(ui);
                } else {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading interactions for {center}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                }
            }
            ViewState::Rendered => self.draw_graph(ui),
            ViewState::Tabular => self.draw_table(ui),
            ViewState::Error { center, error } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    match &error {
                        QueryError::NoResultsFound { .. } => {
                            ui.heading(format!("No interactions found for {center}"));
                            ui.label("Check the protein ID or try another one.");
                        }
                        QueryError::FetchFailure(message) => {
                            ui.heading(format!("Failed to load interactions for {center}"));
                            ui.add_space(6.0);
                            ui.label(message.as_str());
                            ui.add_space(10.0);
                            if ui.button("Retry").clicked() {
                                self.controller.retry();
                            }
                        }
                    }
                });
            }
        }
    }

    fn draw_current_mode(&mut self, ui: &mut egui::Ui) {
        match self.controller.state().mode() {
            Some(crate::graph::RenderMode::Table) => self.draw_table(ui),
            Some(crate::graph::RenderMode::Graph) => self.draw_graph(ui),
            None => {}
        }
    }
}

impl eframe::App for InteractomeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if self.controller.poll_fetches() > 0 && !self.suggestions_loaded {
            self.refresh_suggestions();
        }
        if self.controller.has_pending_fetches() {
            ctx.request_repaint_after(FETCH_POLL_INTERVAL);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("search")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_search_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_central(ui));

        if let Some(deadline) = self.viewport.refit.deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn resize_bursts_refit_once_after_the_debounce() {
        let mut viewport = Viewport::new(Duration::from_millis(250));
        let start = Instant::now();

        assert!(!viewport.track_canvas(start, vec2(800.0, 600.0)));
        assert!(!viewport.track_canvas(start + Duration::from_millis(10), vec2(820.0, 600.0)));
        assert!(!viewport.track_canvas(start + Duration::from_millis(100), vec2(840.0, 610.0)));
        assert!(!viewport.track_canvas(start + Duration::from_millis(300), vec2(840.0, 610.0)));
        assert!(viewport.track_canvas(start + Duration::from_millis(350), vec2(840.0, 610.0)));
        assert!(!viewport.track_canvas(start + Duration::from_millis(900), vec2(840.0, 610.0)));
    }
}
