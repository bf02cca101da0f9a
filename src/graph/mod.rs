mod coalesce;
mod controller;
mod mode;
mod state;
mod transform;

pub use coalesce::Debounce;
pub use controller::{
    Activation, ControllerConfig, DEFAULT_CLICK_THROTTLE, InteractionController, SelectionPolicy,
};
pub use mode::{DEFAULT_TABLE_THRESHOLD, RenderMode, RenderModeSelector};
pub use state::{QueryError, ViewState};
pub use transform::{DEFAULT_MIN_VISUAL_WEIGHT, GraphSnapshot, Role};

#[cfg(test)]
pub use transform::transform;
