// filter.rs

use std::cmp::Ordering;
use std::fmt;

use crate::dataset::RegionRecord;

/// One side of a filter: everything, or a single named value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    All,
    Named(String),
}

impl Scope {
    /// Parses user input; empty, "all", "All States" and "All Districts" mean `All`.
    pub fn parse(input: &str) -> Scope {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();
        if trimmed.is_empty() || lower == "all" || lower == "all states" || lower == "all districts"
        {
            Scope::All
        } else {
            Scope::Named(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Named(name) => name == value,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Scope::All => None,
            Scope::Named(name) => Some(name),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("All"),
            Scope::Named(name) => f.write_str(name),
        }
    }
}

/// The user's (state, district) narrowing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterSelection {
    pub state: Scope,
    pub district: Scope,
}

impl FilterSelection {
    pub fn all() -> Self {
        FilterSelection::default()
    }

    pub fn new(state: Scope, district: Scope) -> Self {
        FilterSelection { state, district }
    }

    pub fn named(state: &str, district: &str) -> Self {
        FilterSelection::new(Scope::parse(state), Scope::parse(district))
    }

    pub fn matches(&self, record: &RegionRecord) -> bool {
        self.state.matches(&record.state) && self.district.matches(&record.district)
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, &self.district) {
            (Scope::All, Scope::All) => f.write_str("All States"),
            (Scope::Named(state), Scope::All) => write!(f, "{}", state),
            (Scope::All, Scope::Named(district)) => write!(f, "{} (all states)", district),
            (Scope::Named(state), Scope::Named(district)) => write!(f, "{}, {}", district, state),
        }
    }
}

fn case_insensitive(a: &String, b: &String) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
    names.sort_by(case_insensitive);
    names.dedup();
    names
}

/// Distinct state names, alphabetical ignoring case.
pub fn list_states(records: &[RegionRecord]) -> Vec<String> {
    sorted_names(records.iter().map(|r| r.state.as_str()))
}

/// Distinct districts of `state`; empty when the state is unknown.
pub fn list_districts(records: &[RegionRecord], state: &str) -> Vec<String> {
    sorted_names(
        records
            .iter()
            .filter(|r| r.state == state)
            .map(|r| r.district.as_str()),
    )
}

/// District choices for a state scope; every district when no state is chosen.
pub fn district_options(records: &[RegionRecord], state: &Scope) -> Vec<String> {
    match state {
        Scope::All => sorted_names(records.iter().map(|r| r.district.as_str())),
        Scope::Named(state) => list_districts(records, state),
    }
}

/// Drops the parts of `selection` that no longer exist in `records`.
pub fn resolve(records: &[RegionRecord], selection: &FilterSelection) -> FilterSelection {
    let state = match &selection.state {
        Scope::Named(state) if !records.iter().any(|r| &r.state == state) => {
            return FilterSelection::all();
        }
        other => other.clone(),
    };

    let district = match &selection.district {
        Scope::Named(district)
            if !records
                .iter()
                .any(|r| state.matches(&r.state) && &r.district == district) =>
        {
            Scope::All
        }
        other => other.clone(),
    };

    FilterSelection::new(state, district)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::{record, small};

    #[test]
    fn states_and_districts_of_small_fixture() {
        let dataset = small();
        assert_eq!(list_states(dataset.records()), vec!["A", "B"]);
        assert_eq!(list_districts(dataset.records(), "B"), vec!["Z"]);
        assert_eq!(list_districts(dataset.records(), "A"), vec!["X", "Y"]);
    }

    #[test]
    fn districts_belong_to_their_state() {
        let dataset = small();
        for state in list_states(dataset.records()) {
            for district in list_districts(dataset.records(), &state) {
                assert!(
                    dataset
                        .records()
                        .iter()
                        .any(|r| r.state == state && r.district == district)
                );
            }
        }
    }

    #[test]
    fn unknown_state_has_no_districts() {
        assert!(list_districts(small().records(), "Q").is_empty());
    }

    #[test]
    fn ordering_ignores_case() {
        let records = vec![
            record("bihar", "b", 0.0, 0.0),
            record("Assam", "a", 0.0, 0.0),
            record("Chhattisgarh", "c", 0.0, 0.0),
            record("", "orphan", 0.0, 0.0),
        ];
        assert_eq!(list_states(&records), vec!["Assam", "bihar", "Chhattisgarh"]);
    }

    #[test]
    fn all_states_offers_every_district() {
        let dataset = small();
        assert_eq!(
            district_options(dataset.records(), &Scope::All),
            vec!["X", "Y", "Z"]
        );
    }

    #[test]
    fn parse_scope() {
        assert_eq!(Scope::parse("all"), Scope::All);
        assert_eq!(Scope::parse("All Districts"), Scope::All);
        assert_eq!(Scope::parse(" "), Scope::All);
        assert_eq!(Scope::parse(" Kutch "), Scope::Named("Kutch".into()));
    }

    #[test]
    fn invalid_state_degrades_to_no_filter() {
        let dataset = small();
        let resolved = resolve(dataset.records(), &FilterSelection::named("Q", "X"));
        assert_eq!(resolved, FilterSelection::all());
    }

    #[test]
    fn invalid_district_keeps_state() {
        let dataset = small();
        let resolved = resolve(dataset.records(), &FilterSelection::named("B", "X"));
        assert_eq!(resolved, FilterSelection::named("B", "all"));
    }

    #[test]
    fn valid_selection_is_unchanged() {
        let dataset = small();
        let selection = FilterSelection::named("A", "X");
        assert_eq!(resolve(dataset.records(), &selection), selection);
    }
}
