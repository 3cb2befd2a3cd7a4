//! Domain entities for the hub.
//!
//! Pure data and parsing with no I/O. The hub owns all of its state (power,
//! volume, sources); the types here are per-call snapshots of what it reported.

/// Selectable audio inputs and the source list parser.
///
/// See [`source::parse_source_list`].
pub mod source;
