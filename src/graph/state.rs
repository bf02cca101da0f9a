use std::collections::HashMap;

use eframe::egui::Vec2;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::interactome::InteractionRecord;

use super::mode::{RenderMode, RenderModeSelector};
use super::transform::{GraphSnapshot, Role, transform};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("failed to fetch interactions: {0}")]
    FetchFailure(String),
    #[error("no interactions found for {center}")]
    NoResultsFound { center: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Loading { center: String },
    Rendered,
    Tabular,
    Error { center: String, error: QueryError },
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading { .. } => "loading",
            Self::Rendered => "rendered",
            Self::Tabular => "tabular",
            Self::Error { .. } => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("discarded result for {origin}; desired center is {desired:?}")]
pub struct StaleResult {
    pub origin: String,
    pub desired: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecenterError {
    #[error("no settled graph to recenter")]
    NotSettled,
    #[error("{0} is not part of the current graph")]
    UnknownNode(String),
    #[error("{0} is already the center")]
    AlreadyCenter(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rendered(RenderMode),
    NoResults,
}

pub struct IncrementalGraphState {
    view: ViewState,
    desired_center: Option<String>,
    snapshot: Option<GraphSnapshot>,
    records: Vec<InteractionRecord>,
    positions: HashMap<String, Vec2>,
    mode: Option<RenderMode>,
    selector: RenderModeSelector,
    min_visual_weight: f64,
    revision: u64,
}

impl IncrementalGraphState {
    pub fn new(selector: RenderModeSelector, min_visual_weight: f64) -> Self {
        Self {
            view: ViewState::Empty,
            desired_center: None,
            snapshot: None,
            records: Vec::new(),
            positions: HashMap::new(),
            mode: None,
            selector,
            min_visual_weight,
            revision: 0,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn desired_center(&self) -> Option<&str> {
        self.desired_center.as_deref()
    }

    pub fn snapshot(&self) -> Option<&GraphSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    pub fn positions(&self) -> &HashMap<String, Vec2> {
        &self.positions
    }

    pub fn mode(&self) -> Option<RenderMode> {
        self.mode
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selector(&self) -> RenderModeSelector {
        self.selector
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, ViewState::Loading { .. })
    }

    pub fn begin_loading(&mut self, center: &str) {
        debug!(center, "loading interactions");
        self.desired_center = Some(center.to_owned());
        self.view = ViewState::Loading {
            center: center.to_owned(),
        };
    }

    fn check_fresh(&self, origin: &str) -> Result<(), StaleResult> {
        if self.desired_center.as_deref() == Some(origin) && self.is_loading() {
            Ok(())
        } else {
            Err(StaleResult {
                origin: origin.to_owned(),
                desired: self.desired_center.clone(),
            })
        }
    }

    /// Replaces the snapshot with one built from `records`, provided the
    /// result still belongs to the desired center.
    pub fn rebuild(
        &mut self,
        origin: &str,
        records: Vec<InteractionRecord>,
    ) -> Result<RebuildOutcome, StaleResult> {
        self.check_fresh(origin)?;

        self.revision = self.revision.wrapping_add(1);
        self.positions.clear();

        if records.is_empty() {
            info!(center = origin, "no interactions found");
            self.snapshot = None;
            self.records.clear();
            self.mode = None;
            self.view = ViewState::Error {
                center: origin.to_owned(),
                error: QueryError::NoResultsFound {
                    center: origin.to_owned(),
                },
            };
            return Ok(RebuildOutcome::NoResults);
        }

        let snapshot = transform(&records, origin, self.min_visual_weight);
        if snapshot.center_node().is_none() {
            warn!(
                center = origin,
                "center does not appear in its own interaction records"
            );
        }

        let mode = self.selector.select_mode(records.len());
        info!(
            center = origin,
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len(),
            mode = mode.label(),
            "rebuilt interaction graph"
        );

        self.snapshot = Some(snapshot);
        self.records = records;
        self.mode = Some(mode);
        self.view = match mode {
            RenderMode::Graph => ViewState::Rendered,
            RenderMode::Table => ViewState::Tabular,
        };

        Ok(RebuildOutcome::Rendered(mode))
    }

    pub fn fail(&mut self, origin: &str, error: QueryError) -> Result<(), StaleResult> {
        self.check_fresh(origin)?;

        self.view = ViewState::Error {
            center: origin.to_owned(),
            error,
        };
        Ok(())
    }

    /// Promotes a peer of the current snapshot to center in place. Node and
    /// edge sets and layout positions are left untouched.
    pub fn recenter(&mut self, node_id: &str) -> Result<(), RecenterError> {
        if !matches!(self.view, ViewState::Rendered | ViewState::Tabular) {
            return Err(RecenterError::NotSettled);
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Err(RecenterError::NotSettled);
        };

        match snapshot.role_of(node_id) {
            None => return Err(RecenterError::UnknownNode(node_id.to_owned())),
            Some(Role::Center) => return Err(RecenterError::AlreadyCenter(node_id.to_owned())),
            Some(Role::Peer) => {}
        }

        debug!(from = snapshot.center(), to = node_id, "recentering graph");
        snapshot.promote(node_id);
        self.desired_center = Some(node_id.to_owned());
        Ok(())
    }

    pub fn apply_positions(&mut self, revision: u64, positions: HashMap<String, Vec2>) -> bool {
        if revision != self.revision || self.snapshot.is_none() {
            debug!(
                revision,
                current = self.revision,
                "ignoring layout for a replaced snapshot"
            );
            return false;
        }

        self.positions = positions;
        true
    }

    pub fn clear(&mut self) {
        self.view = ViewState::Empty;
        self.desired_center = None;
        self.snapshot = None;
        self.records.clear();
        self.positions.clear();
        self.mode = None;
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::graph::transform::DEFAULT_MIN_VISUAL_WEIGHT;

    fn record(a: &str, b: &str, score: f64) -> InteractionRecord {
        InteractionRecord::new(a, b, score).unwrap()
    }

    fn state() -> IncrementalGraphState {
        IncrementalGraphState::new(RenderModeSelector::default(), DEFAULT_MIN_VISUAL_WEIGHT)
    }

    fn star(center: &str, peers: usize) -> Vec<InteractionRecord> {
        (0..peers)
            .map(|index| record(center, &format!("{center}-peer{index}"), 0.5))
            .collect()
    }

    fn rendered_state() -> IncrementalGraphState {
        let mut state = state();
        state.begin_loading("A");
        state
            .rebuild("A", vec![record("A", "B", 1.0), record("A", "C", 0.4)])
            .unwrap();
        state
    }

    #[test]
    fn rebuild_selects_graph_or_table_by_cardinality() {
        let mut state = state();
        state.begin_loading("A");
        assert_eq!(
            state.rebuild("A", star("A", 50)),
            Ok(RebuildOutcome::Rendered(RenderMode::Graph))
        );
        assert_eq!(state.view(), &ViewState::Rendered);

        state.begin_loading("B");
        assert_eq!(
            state.rebuild("B", star("B", 51)),
            Ok(RebuildOutcome::Rendered(RenderMode::Table))
        );
        assert_eq!(state.view(), &ViewState::Tabular);
        assert_eq!(state.records().len(), 51);
        assert_eq!(state.snapshot().map(|snapshot| snapshot.center()), Some("B"));
    }

    #[test]
    fn stale_results_do_not_mutate_state() {
        let mut state = rendered_state();
        let revision = state.revision();

        state.begin_loading("X");
        state.begin_loading("Y");

        let stale = state.rebuild("X", star("X", 3)).unwrap_err();
        assert_eq!(stale.desired.as_deref(), Some("Y"));
        assert_eq!(state.revision(), revision);
        assert_eq!(state.snapshot().map(|snapshot| snapshot.center()), Some("A"));
        assert_eq!(
            state.view(),
            &ViewState::Loading {
                center: "Y".to_owned()
            }
        );

        assert!(
            state
                .fail("X", QueryError::FetchFailure("timeout".to_owned()))
                .is_err()
        );
        assert!(state.is_loading());
    }

    #[test]
    fn results_after_clear_are_discarded() {
        let mut state = state();
        state.begin_loading("A");
        state.clear();

        assert!(state.rebuild("A", star("A", 2)).is_err());
        assert_eq!(state.view(), &ViewState::Empty);
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn duplicate_results_for_a_committed_center_are_discarded() {
        let mut state = rendered_state();
        assert!(state.rebuild("A", star("A", 4)).is_err());
        assert_eq!(state.snapshot().map(|snapshot| snapshot.nodes().len()), Some(3));
    }

    #[test]
    fn empty_results_surface_as_no_results_found() {
        let mut state = rendered_state();
        state.begin_loading("Z");
        assert_eq!(state.rebuild("Z", Vec::new()), Ok(RebuildOutcome::NoResults));
        assert_eq!(
            state.view(),
            &ViewState::Error {
                center: "Z".to_owned(),
                error: QueryError::NoResultsFound {
                    center: "Z".to_owned()
                },
            }
        );
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn fetch_failure_can_be_retried_for_the_same_center() {
        let mut state = state();
        state.begin_loading("A");
        state
            .fail("A", QueryError::FetchFailure("offline".to_owned()))
            .unwrap();
        assert_eq!(state.view().label(), "error");

        state.begin_loading("A");
        assert!(state.rebuild("A", star("A", 2)).is_ok());
        assert_eq!(state.view(), &ViewState::Rendered);
    }

    #[test]
    fn recenter_changes_roles_but_not_structure_or_positions() {
        let mut state = rendered_state();
        let revision = state.revision();
        let positions = HashMap::from([
            ("A".to_owned(), vec2(0.0, 0.0)),
            ("B".to_owned(), vec2(10.0, 5.0)),
            ("C".to_owned(), vec2(-7.0, 3.0)),
        ]);
        assert!(state.apply_positions(revision, positions.clone()));

        let (node_count, edge_count) = state
            .snapshot()
            .map(|snapshot| (snapshot.nodes().len(), snapshot.edges().len()))
            .unwrap();

        state.recenter("C").unwrap();

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.nodes().len(), node_count);
        assert_eq!(snapshot.edges().len(), edge_count);
        assert_eq!(snapshot.center(), "C");
        assert_eq!(snapshot.role_of("C"), Some(Role::Center));
        assert_eq!(snapshot.role_of("A"), Some(Role::Peer));
        assert_eq!(
            snapshot
                .nodes()
                .iter()
                .filter(|node| node.role == Role::Center)
                .count(),
            1
        );
        assert_eq!(state.positions(), &positions);
        assert_eq!(state.revision(), revision);
        assert_eq!(state.desired_center(), Some("C"));
        assert_eq!(state.view(), &ViewState::Rendered);
    }

    #[test]
    fn recenter_rejects_unknown_nodes_and_the_current_center() {
        let mut state = rendered_state();
        assert_eq!(
            state.recenter("Q"),
            Err(RecenterError::UnknownNode("Q".to_owned()))
        );
        assert_eq!(
            state.recenter("A"),
            Err(RecenterError::AlreadyCenter("A".to_owned()))
        );
        assert_eq!(state.snapshot().map(|snapshot| snapshot.center()), Some("A"));

        state.begin_loading("B");
        assert_eq!(state.recenter("B"), Err(RecenterError::NotSettled));
    }

    #[test]
    fn positions_for_replaced_snapshots_are_ignored() {
        let mut state = rendered_state();
        let old_revision = state.revision();

        state.begin_loading("B");
        state.rebuild("B", star("B", 2)).unwrap();

        let positions = HashMap::from([("A".to_owned(), vec2(1.0, 1.0))]);
        assert!(!state.apply_positions(old_revision, positions));
        assert!(state.positions().is_empty());
    }
}
