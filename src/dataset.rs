// dataset.rs

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo::MultiPolygon;

use crate::error::{DashboardError, FormatIssue};

static NULL: AttrValue = AttrValue::Null;

/// One cell of the attribute table.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Null,
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::Number(n) => n.is_nan(),
            AttrValue::Text(s) => s.is_empty() || s.eq_ignore_ascii_case("nan"),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Null => f.write_str("N/A"),
        }
    }
}

/// One district: names, boundary and suitability attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub state: String,
    pub district: String,
    pub geometry: Arc<MultiPolygon<f64>>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl RegionRecord {
    /// Value of `column`, `Null` when the record has no such attribute.
    pub fn get(&self, column: &str) -> &AttrValue {
        self.attributes.get(column).unwrap_or(&NULL)
    }
}

/// The loaded, read-only boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    path: PathBuf,
    columns: BTreeSet<String>,
    records: Vec<RegionRecord>,
    modified: Option<String>,
}

impl Dataset {
    /// Builds a dataset, rejecting a district that repeats within its state.
    pub fn new(
        path: impl Into<PathBuf>,
        columns: BTreeSet<String>,
        records: Vec<RegionRecord>,
    ) -> Result<Self, DashboardError> {
        let path = path.into();
        let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(records.len());
        for record in &records {
            if record.state.is_empty() || record.district.is_empty() {
                continue;
            }
            if !seen.insert((record.state.as_str(), record.district.as_str())) {
                return Err(DashboardError::format(
                    path,
                    FormatIssue::DuplicateDistrict {
                        state: record.state.clone(),
                        district: record.district.clone(),
                    },
                ));
            }
        }

        Ok(Dataset {
            path,
            columns,
            records,
            modified: None,
        })
    }

    pub fn with_modified(mut self, modified: Option<String>) -> Self {
        self.modified = modified;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn modified(&self) -> Option<&str> {
        self.modified.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn get_defaults_to_null() {
        let rec = record("A", "X", 0.0, 0.0);
        assert_eq!(rec.get("nope"), &AttrValue::Null);
        // aridity is the eighth parameter column
        assert_eq!(rec.get("aridity"), &AttrValue::Number(7.0));
    }

    #[test]
    fn rejects_duplicate_district_in_state() {
        let records = vec![record("A", "X", 0.0, 0.0), record("A", "X", 1.0, 0.0)];
        let err = Dataset::new("dup.shp", columns(), records).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::DataFormat { issue: FormatIssue::DuplicateDistrict { .. }, .. }
        ));
    }

    #[test]
    fn same_district_name_in_two_states_is_allowed() {
        let records = vec![record("A", "X", 0.0, 0.0), record("B", "X", 1.0, 0.0)];
        assert_eq!(Dataset::new("ok.shp", columns(), records).unwrap().len(), 2);
    }

    #[test]
    fn null_like_values() {
        assert!(AttrValue::Null.is_null());
        assert!(AttrValue::Text("nan".into()).is_null());
        assert!(AttrValue::Number(f64::NAN).is_null());
        assert!(!AttrValue::Number(0.0).is_null());
        assert_eq!(AttrValue::Null.to_string(), "N/A");
    }
}
