use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use thiserror::Error;
use tracing::{info, warn};

use super::cache::LoadOnce;
use super::parse::{ParsedRecords, parse_json, parse_tsv};
use super::record::InteractionRecord;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    pub total_count: usize,
    pub records: Vec<InteractionRecord>,
    pub dropped: usize,
}

impl QueryResult {
    pub fn new(records: Vec<InteractionRecord>, dropped: usize) -> Self {
        Self {
            total_count: records.len(),
            records,
            dropped,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to load interaction data: {0:#}")]
    Load(#[from] anyhow::Error),
}

pub trait InteractionSource: Send + Sync {
    fn fetch_interactions(&self, center: &str) -> Result<QueryResult, SourceError>;

    fn entity_ids(&self) -> Result<Vec<String>, SourceError>;

    fn reset(&self) {}
}

#[derive(Debug)]
struct Dataset {
    records: Vec<InteractionRecord>,
    dropped: usize,
    entity_ids: Vec<String>,
}

impl Dataset {
    fn from_parsed(parsed: ParsedRecords) -> Self {
        let entity_ids = parsed
            .records
            .iter()
            .flat_map(|record| [record.entity_a(), record.entity_b()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect();

        Self {
            dropped: parsed.dropped.len(),
            records: parsed.records,
            entity_ids,
        }
    }
}

pub struct FileInteractionSource {
    path: PathBuf,
    dataset: LoadOnce<Dataset>,
}

impl FileInteractionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: LoadOnce::new(),
        }
    }

    fn load(&self) -> Result<Dataset> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        let extension = self
            .path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        let parsed = match extension.as_deref() {
            Some("json") => parse_json(&raw),
            Some("tsv" | "txt") | None => parse_tsv(&raw),
            Some(other) => Err(anyhow!("unsupported interaction file extension `.{other}`")),
        }
        .with_context(|| format!("failed to parse {}", self.path.display()))?;

        let dataset = Dataset::from_parsed(parsed);
        if dataset.dropped > 0 {
            warn!(
                path = %self.path.display(),
                dropped = dataset.dropped,
                "skipped malformed interaction records"
            );
        }
        info!(
            path = %self.path.display(),
            records = dataset.records.len(),
            entities = dataset.entity_ids.len(),
            "loaded interaction dataset"
        );

        Ok(dataset)
    }
}

impl InteractionSource for FileInteractionSource {
    fn fetch_interactions(&self, center: &str) -> Result<QueryResult, SourceError> {
        let dataset = self.dataset.get_or_try_load(|| self.load())?;
        let records = dataset
            .records
            .iter()
            .filter(|record| record.involves(center))
            .cloned()
            .collect::<Vec<_>>();

        Ok(QueryResult::new(records, dataset.dropped))
    }

    fn entity_ids(&self) -> Result<Vec<String>, SourceError> {
        let dataset = self.dataset.get_or_try_load(|| self.load())?;
        Ok(dataset.entity_ids.clone())
    }

    fn reset(&self) {
        if self.dataset.is_loaded() {
            info!(path = %self.path.display(), "dropping cached interaction dataset");
        }
        self.dataset.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_fixture(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn fetch_filters_to_records_touching_the_center() {
        let file = write_fixture(
            ".tsv",
            "protein1\tprotein2\tscore\nA\tB\t1\nC\tA\t0.4\nB\tC\t0.2\n",
        );
        let source = FileInteractionSource::new(file.path());

        let result = source.fetch_interactions("A").unwrap();
        assert_eq!(result.total_count, 2);
        assert!(result.records.iter().all(|record| record.involves("A")));

        let none = source.fetch_interactions("Z").unwrap();
        assert_eq!(none.total_count, 0);
    }

    #[test]
    fn dataset_is_cached_until_reset() {
        let mut file = write_fixture(".tsv", "protein1\tprotein2\tscore\nA\tB\t1\n");
        let source = FileInteractionSource::new(file.path());
        assert_eq!(source.fetch_interactions("A").unwrap().total_count, 1);

        file.write_all(b"A\tC\t0.5\n").unwrap();
        file.flush().unwrap();
        assert_eq!(source.fetch_interactions("A").unwrap().total_count, 1);

        source.reset();
        assert_eq!(source.fetch_interactions("A").unwrap().total_count, 2);
    }

    #[test]
    fn json_datasets_report_dropped_records_and_entities() {
        let file = write_fixture(
            ".json",
            r#"[{"protein1": "B", "protein2": "A", "score": 0.5},
                {"protein1": "A", "score": 0.5}]"#,
        );
        let source = FileInteractionSource::new(file.path());

        let result = source.fetch_interactions("A").unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.dropped, 1);
        assert_eq!(source.entity_ids().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let source = FileInteractionSource::new("/nonexistent/interactions.tsv");
        let error = source.fetch_interactions("A").unwrap_err();
        assert!(matches!(error, SourceError::Load(_)));
        assert!(error.to_string().contains("failed to read"));
    }
}
