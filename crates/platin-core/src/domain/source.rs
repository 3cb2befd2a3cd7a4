//! Selectable audio inputs reported by the hub.
//!
//! The list-sources reply carries a JSON document:
//!
//! ```json
//! {"src":[{"ix":0,"name":"Optical","sts":0},{"ix":2,"name":"Bluetooth","sts":1}]}
//! ```
//!
//! `sts` is the bare token `0` or `1`.  Any other value, quoted digits
//! included, is rejected rather than read as inactive.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::protocol::codec::ProtocolError;

/// One selectable input, as reported by a single list-sources reply.
///
/// Snapshots are never cached or updated; query the hub again for fresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Hub-side index, used as the argument of the select-source command.
    pub index: i64,
    /// Display name.
    pub name: String,
    /// Whether this is the currently selected input.
    pub active: bool,
}

impl Source {
    pub fn new(index: i64, name: impl Into<String>, active: bool) -> Self {
        Self {
            index,
            name: name.into(),
            active,
        }
    }
}

#[derive(Deserialize)]
struct SourceListDocument {
    /// `null` and a missing key both mean no sources.
    #[serde(rename = "src", default)]
    sources: Option<Vec<SourceRecord>>,
}

#[derive(Deserialize)]
struct SourceRecord {
    ix: i64,
    name: String,
    sts: Value,
}

impl TryFrom<SourceRecord> for Source {
    type Error = ProtocolError;

    fn try_from(record: SourceRecord) -> Result<Self, Self::Error> {
        let active = match record.sts.as_u64() {
            Some(0) => false,
            Some(1) => true,
            _ => {
                return Err(ProtocolError::InvalidActiveFlag {
                    name: record.name,
                    value: record.sts.to_string(),
                })
            }
        };
        Ok(Source {
            index: record.ix,
            name: record.name,
            active,
        })
    }
}

/// Parses the payload of a list-sources reply.
///
/// Sources are returned in the order the hub listed them.  An empty payload,
/// a document without a `src` key, or `"src": null` yields an empty list.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if the payload is not the
/// expected JSON shape, or [`ProtocolError::InvalidActiveFlag`] if any record's
/// `sts` is not `0` or `1`.
///
/// # Examples
///
/// ```rust
/// use platin_core::parse_source_list;
///
/// let sources = parse_source_list(br#"{"src":[{"ix":3,"name":"TV","sts":1}]}"#).unwrap();
/// assert_eq!(sources[0].name, "TV");
/// assert!(sources[0].active);
/// ```
pub fn parse_source_list(payload: &[u8]) -> Result<Vec<Source>, ProtocolError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let document: SourceListDocument = serde_json::from_slice(payload)
        .map_err(|e| ProtocolError::MalformedPayload(format!("source list: {e}")))?;

    let sources = document
        .sources
        .unwrap_or_default()
        .into_iter()
        .map(Source::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("parsed {} sources", sources.len());
    Ok(sources)
}

/// Returns the first source flagged active.
pub fn find_active(sources: &[Source]) -> Option<&Source> {
    sources.iter().find(|s| s.active)
}

/// Returns the first source whose name equals `name` exactly.
pub fn find_by_name<'a>(sources: &'a [Source], name: &str) -> Option<&'a Source> {
    sources.iter().find(|s| s.name == name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
