// error.rs

use std::fmt;
use std::path::PathBuf;

/// Why an existing boundary file could not be turned into a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatIssue {
    MissingColumns(Vec<String>),
    DuplicateDistrict { state: String, district: String },
    UnsupportedExtension,
    UnsupportedShape(String),
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// None of the candidate boundary files exist.
    DataNotFound { candidates: Vec<PathBuf> },
    /// The boundary file exists but cannot be used.
    DataFormat { path: PathBuf, issue: FormatIssue },
    /// A category tag outside the closed set.
    UnknownCategory(String),
    /// A suitability layer tag outside the closed set.
    UnknownLayer(String),
}

impl DashboardError {
    pub fn format(path: impl Into<PathBuf>, issue: FormatIssue) -> Self {
        DashboardError::DataFormat {
            path: path.into(),
            issue,
        }
    }
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatIssue::MissingColumns(columns) => {
                write!(f, "missing required column(s): {}", columns.join(", "))
            }
            FormatIssue::DuplicateDistrict { state, district } => {
                write!(f, "district '{}' appears more than once in state '{}'", district, state)
            }
            FormatIssue::UnsupportedExtension => {
                write!(f, "unsupported file type (expected .shp, .geojson or .json)")
            }
            FormatIssue::UnsupportedShape(kind) => {
                write!(f, "unsupported geometry '{}' (expected polygons)", kind)
            }
            FormatIssue::Parse(message) => write!(f, "{}", message),
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::DataNotFound { candidates } => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                write!(f, "No boundary data found. Looked for: {}", names.join(", "))
            }
            DashboardError::DataFormat { path, issue } => {
                write!(f, "Could not load '{}': {}", path.display(), issue)
            }
            DashboardError::UnknownCategory(tag) => write!(
                f,
                "Unknown parameter category '{}' (expected crop, water, energy, utility or demographics)",
                tag
            ),
            DashboardError::UnknownLayer(tag) => write!(
                f,
                "Unknown suitability layer '{}' (expected adaptation, mitigation, replacement or general)",
                tag
            ),
        }
    }
}

impl std::error::Error for DashboardError {}
