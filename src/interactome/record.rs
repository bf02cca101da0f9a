use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionRecord {
    entity_a: String,
    entity_b: String,
    score: f64,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RecordError {
    #[error("record is missing the `{0}` field")]
    MissingField(&'static str),
    #[error("record has an empty `{0}` identifier")]
    EmptyIdentifier(&'static str),
    #[error("score {0:?} is not a number")]
    UnparsableScore(String),
    #[error("score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl InteractionRecord {
    pub fn new(
        entity_a: impl Into<String>,
        entity_b: impl Into<String>,
        score: f64,
    ) -> Result<Self, RecordError> {
        let entity_a = entity_a.into().trim().to_owned();
        let entity_b = entity_b.into().trim().to_owned();

        if entity_a.is_empty() {
            return Err(RecordError::EmptyIdentifier("protein1"));
        }
        if entity_b.is_empty() {
            return Err(RecordError::EmptyIdentifier("protein2"));
        }
        if !score.is_finite() {
            return Err(RecordError::UnparsableScore(score.to_string()));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(RecordError::ScoreOutOfRange(score));
        }

        Ok(Self {
            entity_a,
            entity_b,
            score,
        })
    }

    pub fn entity_a(&self) -> &str {
        &self.entity_a
    }

    pub fn entity_b(&self) -> &str {
        &self.entity_b
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_verified(&self) -> bool {
        self.score == 1.0
    }

    pub fn involves(&self, id: &str) -> bool {
        self.entity_a == id || self.entity_b == id
    }

    pub fn partner_of(&self, id: &str) -> Option<&str> {
        if self.entity_a == id {
            Some(&self.entity_b)
        } else if self.entity_b == id {
            Some(&self.entity_a)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawInteraction {
    #[serde(default, alias = "Protein 1", alias = "protein_1")]
    pub(super) protein1: Option<String>,
    #[serde(default, alias = "Protein 2", alias = "protein_2")]
    pub(super) protein2: Option<String>,
    #[serde(default, alias = "Score")]
    pub(super) score: Option<Value>,
}

impl RawInteraction {
    pub(super) fn validate(self) -> Result<InteractionRecord, RecordError> {
        let entity_a = self.protein1.ok_or(RecordError::MissingField("protein1"))?;
        let entity_b = self.protein2.ok_or(RecordError::MissingField("protein2"))?;
        let score = match self.score {
            None | Some(Value::Null) => return Err(RecordError::MissingField("score")),
            Some(Value::Number(number)) => number
                .as_f64()
                .ok_or_else(|| RecordError::UnparsableScore(number.to_string()))?,
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| RecordError::UnparsableScore(text.clone()))?,
            Some(other) => return Err(RecordError::UnparsableScore(other.to_string())),
        };

        InteractionRecord::new(entity_a, entity_b, score)
    }
}
