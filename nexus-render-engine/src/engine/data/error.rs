use thiserror::Error;

/// Reason a single input record was rejected.
///
/// Rejections are logged and the record is skipped; the rest of the snapshot
/// is still rendered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("non-finite coordinate (lon {lon}, lat {lat})")]
    NonFiniteCoordinate { lon: f64, lat: f64 },
    #[error("density {0} is not a finite, non-negative value")]
    InvalidDensity(f64),
    #[error("{field} {value} is not a finite, non-negative value")]
    InvalidMagnitude { field: &'static str, value: f64 },
}
