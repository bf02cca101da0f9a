use eframe::egui::{self, Align, Key, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{Role, SelectionPolicy, ViewState};
use crate::util::format_score;

use super::InteractomeApp;
use super::render_utils::{edge_color, role_color};

const MAX_SUGGESTIONS: usize = 12;
const QUICK_PICK_COUNT: usize = 5;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn ranked_suggestions<'a>(ids: &'a [String], query: &str, limit: usize) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut ranked = ids
        .iter()
        .filter_map(|id| fuzzy_match_score(&matcher, id, query).map(|score| (score, id.as_str())))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(_, id)| id).collect()
}

// Configured ids that exist in the dataset, or the first few known ids.
pub(super) fn quick_picks(configured: &[String], known: &[String]) -> Vec<String> {
    let present = configured
        .iter()
        .filter(|id| known.binary_search(*id).is_ok())
        .cloned()
        .collect::<Vec<_>>();
    if !configured.is_empty() {
        return present;
    }

    known.iter().take(QUICK_PICK_COUNT).cloned().collect()
}

impl InteractomeApp {
    pub(super) fn draw_top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("interactome-viewer");
            ui.separator();
            ui.label(format!("data: {}", self.data_label));

            let state = self.controller.state();
            if let Some(snapshot) = state.snapshot() {
                ui.label(format!("center: {}", snapshot.center()));
                ui.label(format!("nodes: {}", snapshot.nodes().len()));
                ui.label(format!("edges: {}", snapshot.edges().len()));
            }
            if let Some(mode) = state.mode() {
                ui.label(format!("view: {}", mode.label()));
            }
            if let ViewState::Loading { center } = state.view() {
                ui.spinner();
                ui.label(format!("loading {center}..."));
            }

            let reload_clicked = ui
                .add_enabled(
                    !self.controller.has_pending_fetches(),
                    egui::Button::new("Reload data"),
                )
                .on_hover_text("Re-read the interaction file and refresh the current center.")
                .clicked();
            let clear_clicked = ui.button("Clear").clicked();
            let fit_clicked = ui.button("Fit view").clicked();

            if reload_clicked {
                self.reload();
            }
            if clear_clicked {
                self.controller.clear();
                self.search.clear();
                self.search_error = None;
            }
            if fit_clicked {
                self.viewport.request_fit();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(format!("state: {}", self.controller.state().view().label()));
            });
        });
    }

    pub(super) fn draw_search_panel(&mut self, ui: &mut Ui) {
        ui.heading("Find a protein");
        ui.add_space(4.0);

        let mut submitted = None;
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("e.g. NDH07G27970.1")
                    .desired_width(200.0),
            );
            if response.changed() {
                self.search_error = None;
            }
            let entered = response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
            if entered || ui.button("Search").clicked() {
                submitted = Some(self.search.clone());
            }
        });

        if let Some(error) = &self.search_error {
            ui.colored_label(ui.visuals().error_fg_color, error.as_str());
        }

        let suggestions = ranked_suggestions(&self.suggestions, &self.search, MAX_SUGGESTIONS)
            .into_iter()
            .filter(|id| *id != self.search.trim())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if !suggestions.is_empty() {
            ui.add_space(4.0);
            for id in suggestions {
                if ui.link(id.as_str()).clicked() {
                    submitted = Some(id);
                }
            }
        }

        if !self.quick_picks.is_empty() {
            ui.add_space(6.0);
            ui.label(RichText::new("Example proteins").small());
            ui.horizontal_wrapped(|ui| {
                for id in &self.quick_picks {
                    let selected = self.search.trim() == id.as_str();
                    if ui.selectable_label(selected, id.as_str()).clicked() {
                        submitted = Some(id.clone());
                    }
                }
            });
        }

        if let Some(query) = submitted {
            self.submit_search(&query);
        }

        ui.separator();
        ui.label(RichText::new("Clicking a peer").strong());
        let mut policy = self.controller.policy();
        ui.horizontal(|ui| {
            ui.selectable_value(&mut policy, SelectionPolicy::Recenter, "Recenter")
                .on_hover_text("Promote the peer to center in place, keeping the layout.");
            ui.selectable_value(&mut policy, SelectionPolicy::Refetch, "Load its network")
                .on_hover_text("Fetch the peer's own interactions and rebuild the graph.");
        });
        if policy != self.controller.policy() {
            self.controller.set_policy(policy);
        }

        ui.separator();
        ui.label(RichText::new("Legend").strong());
        ui.colored_label(role_color(Role::Center), "● center protein");
        ui.colored_label(role_color(Role::Peer), "● interacting protein");
        ui.colored_label(edge_color(true), "-- verified interaction (score = 1)");
        ui.colored_label(edge_color(false), "-- predicted interaction (score < 1)");

        self.draw_center_summary(ui);
    }

    fn draw_center_summary(&self, ui: &mut Ui) {
        let state = self.controller.state();
        let Some(snapshot) = state.snapshot() else {
            return;
        };

        let center = snapshot.center();
        let touching = state
            .records()
            .iter()
            .filter(|record| record.involves(center))
            .collect::<Vec<_>>();
        let verified = touching.iter().filter(|record| record.is_verified()).count();
        let strongest = touching
            .iter()
            .max_by(|a, b| a.score().total_cmp(&b.score()))
            .and_then(|record| Some((record.partner_of(center)?, record.score())));

        ui.separator();
        ui.label(RichText::new(center).strong());
        ui.label(format!(
            "{} interactions in view ({} verified, {} predicted)",
            touching.len(),
            verified,
            touching.len() - verified
        ));
        if let Some((partner, score)) = strongest {
            ui.label(format!("strongest partner: {partner} ({})", format_score(score)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_rank_closer_matches_first() {
        let ids = vec![
            "NDH05G05590.1".to_owned(),
            "NDH07G27970.1".to_owned(),
            "NDH07G27971.1".to_owned(),
        ];

        let ranked = ranked_suggestions(&ids, "07G2797", 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|id| id.contains("07G2797")));
        assert!(ranked_suggestions(&ids, "   ", 10).is_empty());
        assert_eq!(ranked_suggestions(&ids, "NDH", 1).len(), 1);
    }

    #[test]
    fn quick_picks_prefer_configured_ids_present_in_the_data() {
        let known = (1..=8).map(|n| format!("NDH0{n}")).collect::<Vec<_>>();

        let configured = vec!["NDH03".to_owned(), "MISSING".to_owned()];
        assert_eq!(quick_picks(&configured, &known), vec!["NDH03"]);

        let defaults = quick_picks(&[], &known);
        assert_eq!(defaults.len(), QUICK_PICK_COUNT);
        assert_eq!(defaults[0], "NDH01");
        assert!(quick_picks(&[], &[]).is_empty());
    }
}
