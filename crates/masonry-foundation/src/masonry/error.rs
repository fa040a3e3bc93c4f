use std::fmt;

/// Rejected engine configuration.
///
/// This is the only error the engine surfaces. Missing measurements, an unknown
/// container width and zero-height items are all ordinary states.
#[derive(Debug, Clone, PartialEq)]
pub enum MasonryConfigError {
    NonPositiveColumnWidth { column_width: f32 },
    NoColumns,
    InvalidGutter { gutter: f32 },
    InvalidOverscan { overscan_factor: f32 },
}

impl fmt::Display for MasonryConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasonryConfigError::NonPositiveColumnWidth { column_width } => {
                write!(f, "column width must be positive, got {column_width}")
            }
            MasonryConfigError::NoColumns => write!(f, "min_columns must be at least 1"),
            MasonryConfigError::InvalidGutter { gutter } => {
                write!(f, "gutter must be a non-negative number, got {gutter}")
            }
            MasonryConfigError::InvalidOverscan { overscan_factor } => {
                write!(
                    f,
                    "overscan factor must be a non-negative number, got {overscan_factor}"
                )
            }
        }
    }
}

impl std::error::Error for MasonryConfigError {}
