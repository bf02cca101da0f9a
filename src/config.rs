use std::path::PathBuf;
use std::time::Duration;

use crate::graph::ControllerConfig;

pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub data_path: PathBuf,
    pub initial_center: Option<String>,
    pub example_ids: Vec<String>,
    pub controller: ControllerConfig,
    pub resize_debounce: Duration,
    pub layout_iterations: usize,
}
