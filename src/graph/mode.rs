pub const DEFAULT_TABLE_THRESHOLD: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Graph,
    Table,
}

impl RenderMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Table => "table",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderModeSelector {
    table_threshold: usize,
}

impl Default for RenderModeSelector {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_THRESHOLD)
    }
}

impl RenderModeSelector {
    pub fn new(table_threshold: usize) -> Self {
        Self { table_threshold }
    }

    pub fn table_threshold(self) -> usize {
        self.table_threshold
    }

    pub fn select_mode(self, total_match_count: usize) -> RenderMode {
        if total_match_count > self.table_threshold {
            RenderMode::Table
        } else {
            RenderMode::Graph
        }
    }
}
