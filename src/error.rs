use arcstr::ArcStr;
use thiserror::Error;

/// Errors raised while validating inputs or planning the physical view.
///
/// All of these are detected before any output file is opened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "{name}: not enough routing tracks for pins (pins: {pins}, available tracks: {tracks})"
    )]
    InsufficientTracks {
        name: ArcStr,
        pins: usize,
        tracks: usize,
    },

    #[error("{name}: invalid {field}: {value}")]
    InvalidDimension {
        name: ArcStr,
        field: &'static str,
        value: String,
    },

    #[error("invalid design rule {rule}: {value}")]
    InvalidRule { rule: &'static str, value: String },
}

pub type LayoutResult<T> = std::result::Result<T, LayoutError>;
