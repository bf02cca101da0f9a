use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::interactome::{InteractionSource, QueryResult, SourceError};
use crate::layout::LayoutEngine;

use super::coalesce::Throttle;
use super::mode::{RenderMode, RenderModeSelector};
use super::state::{IncrementalGraphState, QueryError, RebuildOutcome, ViewState};
use super::transform::Role;

pub const DEFAULT_CLICK_THROTTLE: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    #[default]
    Recenter,
    Refetch,
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub selector: RenderModeSelector,
    pub min_visual_weight: f64,
    pub click_throttle: Duration,
    pub policy: SelectionPolicy,
    pub id_prefix: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Throttled,
    Stale,
    Unchanged,
    Recentered,
    FetchStarted,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please enter a protein ID")]
    Empty,
    #[error("Please enter a valid protein ID (starting with {prefix})")]
    WrongPrefix { prefix: String },
}

pub struct FetchOutcome {
    pub center: String,
    pub result: Result<QueryResult, SourceError>,
}

type ClickGate = Throttle<fn(String) -> String>;

fn pass_through(node_id: String) -> String {
    node_id
}

pub struct InteractionController {
    state: IncrementalGraphState,
    source: Arc<dyn InteractionSource>,
    layout: Box<dyn LayoutEngine>,
    click_gate: ClickGate,
    policy: SelectionPolicy,
    id_prefix: Option<String>,
    outcome_tx: Sender<FetchOutcome>,
    outcome_rx: Receiver<FetchOutcome>,
    in_flight: usize,
}

impl InteractionController {
    pub fn new(
        config: ControllerConfig,
        source: Arc<dyn InteractionSource>,
        layout: Box<dyn LayoutEngine>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            state: IncrementalGraphState::new(config.selector, config.min_visual_weight),
            source,
            layout,
            click_gate: Throttle::new(config.click_throttle, pass_through as fn(String) -> String),
            policy: config.policy,
            id_prefix: config.id_prefix.filter(|prefix| !prefix.is_empty()),
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &IncrementalGraphState {
        &self.state
    }

    pub fn source(&self) -> &Arc<dyn InteractionSource> {
        &self.source
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    pub fn has_pending_fetches(&self) -> bool {
        self.in_flight > 0
    }

    pub fn on_node_activated(&mut self, now: Instant, node_id: &str) -> Activation {
        let Some(node_id) = self.click_gate.call(now, node_id.to_owned()) else {
            debug!(node = node_id, "click throttled");
            return Activation::Throttled;
        };

        if self.state.is_loading() {
            debug!(node = %node_id, "ignoring click on a superseded view");
            return Activation::Stale;
        }

        if self.state.desired_center() == Some(node_id.as_str()) {
            return Activation::Unchanged;
        }

        let is_peer = self
            .state
            .snapshot()
            .and_then(|snapshot| snapshot.role_of(&node_id))
            == Some(Role::Peer);

        if is_peer && self.policy == SelectionPolicy::Recenter {
            match self.state.recenter(&node_id) {
                Ok(()) => return Activation::Recentered,
                Err(error) => warn!(%error, "recenter not applicable; fetching instead"),
            }
        }

        self.start_fetch(&node_id);
        Activation::FetchStarted
    }

    pub fn select_center(&mut self, query: &str) -> Result<(), SelectionError> {
        let center = query.trim();
        if center.is_empty() {
            return Err(SelectionError::Empty);
        }
        if let Some(prefix) = &self.id_prefix
            && !center.starts_with(prefix.as_str())
        {
            return Err(SelectionError::WrongPrefix {
                prefix: prefix.clone(),
            });
        }

        if self.state.desired_center() == Some(center) {
            match self.state.view() {
                ViewState::Loading { .. } => {
                    debug!(center, "fetch already in flight");
                    return Ok(());
                }
                ViewState::Rendered | ViewState::Tabular => {
                    debug!(center, "center already shown");
                    return Ok(());
                }
                ViewState::Empty | ViewState::Error { .. } => {}
            }
        }

        self.start_fetch(center);
        Ok(())
    }

    pub fn retry(&mut self) -> bool {
        let ViewState::Error { center, .. } = self.state.view() else {
            return false;
        };

        let center = center.clone();
        self.start_fetch(&center);
        true
    }

    pub fn reload(&mut self) {
        self.source.reset();
        if let Some(center) = self.state.desired_center().map(str::to_owned) {
            self.start_fetch(&center);
        }
    }

    pub fn clear(&mut self) {
        info!("clearing interaction graph");
        self.state.clear();
        self.click_gate.reset();
    }

    fn start_fetch(&mut self, center: &str) {
        self.state.begin_loading(center);
        self.in_flight += 1;

        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();
        let center = center.to_owned();

        thread::spawn(move || {
            let result = source.fetch_interactions(&center);
            let _ = tx.send(FetchOutcome { center, result });
        });
    }

    pub fn poll_fetches(&mut self) -> usize {
        let mut applied = 0usize;
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if self.complete_fetch(outcome) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                // The controller holds a sender, so the channel never closes.
                Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome { center, result } = outcome;

        let committed = match result {
            Ok(result) => {
                debug!(
                    center = %center,
                    matches = result.total_count,
                    dropped = result.dropped,
                    "interaction fetch finished"
                );
                self.state
                    .rebuild(&center, result.records)
                    .map(|outcome| {
                        if outcome == RebuildOutcome::Rendered(RenderMode::Graph) {
                            self.run_layout();
                        }
                    })
            }
            Err(error) => {
                warn!(center = %center, %error, "interaction fetch failed");
                self.state
                    .fail(&center, QueryError::FetchFailure(error.to_string()))
            }
        };

        match committed {
            Ok(()) => true,
            Err(stale) => {
                debug!(%stale, "discarding stale interaction result");
                false
            }
        }
    }

    fn run_layout(&mut self) {
        let Some(snapshot) = self.state.snapshot() else {
            return;
        };

        let revision = self.state.revision();
        let positions = self.layout.layout(snapshot);
        self.state.apply_positions(revision, positions);
    }

    #[cfg(test)]
    fn wait_for_fetches(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0usize;
        while self.in_flight > 0 && Instant::now() < deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(outcome) = self.outcome_rx.recv_timeout(remaining) {
                self.in_flight -= 1;
                if self.complete_fetch(outcome) {
                    applied += 1;
                }
            }
        }
        applied
    }
}
