use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::record::{InteractionRecord, RawInteraction, RecordError};

const ENTITY_A_COLUMNS: &[&str] = &["protein1", "protein 1", "protein_1"];
const ENTITY_B_COLUMNS: &[&str] = &["protein2", "protein 2", "protein_2"];
const SCORE_COLUMNS: &[&str] = &["score"];

#[derive(Debug, Default)]
pub(super) struct ParsedRecords {
    pub(super) records: Vec<InteractionRecord>,
    pub(super) dropped: Vec<RecordError>,
}

impl ParsedRecords {
    fn push(&mut self, raw: Result<RawInteraction, RecordError>) {
        match raw.and_then(RawInteraction::validate) {
            Ok(record) => self.records.push(record),
            Err(error) => {
                debug!(%error, "dropping invalid interaction record");
                self.dropped.push(error);
            }
        }
    }
}

fn column_index(header: &StringRecord, accepted: &[&str]) -> Option<usize> {
    header.iter().position(|column| {
        let column = column.to_ascii_lowercase();
        accepted.iter().any(|name| *name == column)
    })
}

pub(super) fn parse_tsv(raw: &str) -> Result<ParsedRecords> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let header = reader
        .headers()
        .context("unreadable interaction table header")?
        .clone();
    if header.iter().all(str::is_empty) {
        bail!("interaction table is empty");
    }

    let entity_a = column_index(&header, ENTITY_A_COLUMNS)
        .ok_or_else(|| anyhow!("interaction table has no protein1 column"))?;
    let entity_b = column_index(&header, ENTITY_B_COLUMNS)
        .ok_or_else(|| anyhow!("interaction table has no protein2 column"))?;
    let score = column_index(&header, SCORE_COLUMNS)
        .ok_or_else(|| anyhow!("interaction table has no score column"))?;

    let mut parsed = ParsedRecords::default();
    for row in reader.records() {
        let raw = row
            .map(|row| {
                let field = |index: usize| {
                    row.get(index)
                        .filter(|value| !value.is_empty())
                        .map(str::to_owned)
                };
                RawInteraction {
                    protein1: field(entity_a),
                    protein2: field(entity_b),
                    score: field(score).map(Value::String),
                }
            })
            .map_err(|error| RecordError::Malformed(error.to_string()));
        parsed.push(raw);
    }

    Ok(parsed)
}

pub(super) fn parse_json(raw: &str) -> Result<ParsedRecords> {
    let parsed: Value = serde_json::from_str(raw).context("invalid interaction JSON")?;
    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("interactions") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(anyhow!("expected a JSON array of interaction records")),
        },
        _ => return Err(anyhow!("unexpected JSON type for interaction records")),
    };

    let mut records = ParsedRecords::default();
    for entry in entries {
        records.push(
            RawInteraction::deserialize(entry)
                .map_err(|error| RecordError::Malformed(error.to_string())),
        );
    }

    Ok(records)
}
