mod cache;
mod parse;
mod record;
mod source;

pub use record::InteractionRecord;
pub use source::{FileInteractionSource, InteractionSource, QueryResult, SourceError};
