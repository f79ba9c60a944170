//! Export and import of the full record history.
//!
//! Exports are pretty-printed JSON arrays. The `json` and `txt` formats carry
//! identical content and only differ in their conventional file name.
//! Imports replace the history wholesale; they never merge.

use std::io;

use crate::record::GameRecord;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr)]
pub enum ExportFormat {
    #[default]
    #[display("json")]
    Json,
    #[display("txt")]
    Txt,
}

impl ExportFormat {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Json => "mines_predictor_games.json",
            Self::Txt => "mines_predictor_games.txt",
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ImportError {
    #[display("failed to parse import file as JSON")]
    Parse(serde_json::Error),
    #[display("invalid data format: expected a list of game records, found {found}")]
    NotASequence { found: &'static str },
    #[display("invalid game record at index {index}")]
    InvalidRecord {
        index: usize,
        source: serde_json::Error,
    },
}

/// Writes `records` as a pretty-printed JSON document followed by a newline.
pub fn export_records<W>(mut writer: W, records: &[GameRecord]) -> io::Result<()>
where
    W: io::Write,
{
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()
}

/// Parses an exported document back into records.
///
/// The document must be a JSON array and every element must be a valid
/// record; otherwise nothing is returned.
pub fn import_records(document: &str) -> Result<Vec<GameRecord>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(document).map_err(ImportError::Parse)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(ImportError::NotASequence {
                found: json_kind(&other),
            });
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| ImportError::InvalidRecord { index, source })
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
