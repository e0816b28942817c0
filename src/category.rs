// category.rs

use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// A displayed parameter: its label and the attribute column it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub label: &'static str,
    pub column: &'static str,
}

const fn param(label: &'static str, column: &'static str) -> Parameter {
    Parameter { label, column }
}

const CROP: &[Parameter] = &[
    param("Cropping Intensity (%)", "CI_____1"),
    param("Cultivated Land (% of total)", "C_Land_Rc"),
];

const WATER: &[Parameter] = &[
    param("Irrigation Coverage (%)", "Irrig_cov_"),
    param("Irrigation Water Requirement", "ration__cu"),
    param("Groundwater Development (%)", "GW_dev_sta"),
    param("Aquifer Depth (mbgl)", "C_Aqua_C"),
    param("Surface Water Body (ha)", "C_SWC"),
];

const ENERGY: &[Parameter] = &[param("Solar Radiance (Aridity Index)", "aridity")];

const UTILITY: &[Parameter] = &[
    param("Pump Energy Source (Electric)", "C_E_FC"),
    param("Energy Subsidy", "C_Others"),
];

const DEMOGRAPHICS: &[Parameter] = &[
    param("Small & Marginal Holdings (%)", "C_S_H"),
    param("Farmers Average Area (ha)", "C_Ag_All"),
    param("Land Fragmentation", "C_F_L"),
];

/// Display grouping of the suitability parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterCategory {
    Crop,
    Water,
    Energy,
    Utility,
    Demographics,
}

impl ParameterCategory {
    pub const ALL: [ParameterCategory; 5] = [
        ParameterCategory::Crop,
        ParameterCategory::Water,
        ParameterCategory::Energy,
        ParameterCategory::Utility,
        ParameterCategory::Demographics,
    ];

    pub fn parameters(self) -> &'static [Parameter] {
        match self {
            ParameterCategory::Crop => CROP,
            ParameterCategory::Water => WATER,
            ParameterCategory::Energy => ENERGY,
            ParameterCategory::Utility => UTILITY,
            ParameterCategory::Demographics => DEMOGRAPHICS,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ParameterCategory::Crop => "Crops",
            ParameterCategory::Water => "Water",
            ParameterCategory::Energy => "Energy",
            ParameterCategory::Utility => "Utilities",
            ParameterCategory::Demographics => "Demographics",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ParameterCategory::Crop => "crop",
            ParameterCategory::Water => "water",
            ParameterCategory::Energy => "energy",
            ParameterCategory::Utility => "utility",
            ParameterCategory::Demographics => "demographics",
        }
    }

    /// Position in `ALL`, used for cycling through the control.
    pub fn index(self) -> usize {
        ParameterCategory::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for ParameterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ParameterCategory {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crop" | "crops" => Ok(ParameterCategory::Crop),
            "water" => Ok(ParameterCategory::Water),
            "energy" => Ok(ParameterCategory::Energy),
            "utility" | "utilities" => Ok(ParameterCategory::Utility),
            "demographics" | "demographic" => Ok(ParameterCategory::Demographics),
            _ => Err(DashboardError::UnknownCategory(s.to_string())),
        }
    }
}

/// Attribute columns shown for `category`, in display order.
pub fn columns_for(category: ParameterCategory) -> Vec<&'static str> {
    category.parameters().iter().map(|p| p.column).collect()
}

/// Every parameter column across all categories.
pub fn all_parameter_columns() -> impl Iterator<Item = &'static str> {
    ParameterCategory::ALL
        .into_iter()
        .flat_map(|c| c.parameters().iter().map(|p| p.column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn columns_are_non_empty_and_unique() {
        for category in ParameterCategory::ALL {
            let columns = columns_for(category);
            assert!(!columns.is_empty(), "{category} has no columns");
            let unique: HashSet<_> = columns.iter().collect();
            assert_eq!(unique.len(), columns.len(), "{category} repeats a column");
        }
    }

    #[test]
    fn categories_do_not_overlap() {
        let all: Vec<_> = all_parameter_columns().collect();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn columns_are_stable_across_calls() {
        assert_eq!(
            columns_for(ParameterCategory::Water),
            columns_for(ParameterCategory::Water)
        );
        assert_eq!(columns_for(ParameterCategory::Energy), vec!["aridity"]);
    }

    #[test]
    fn parses_tags() {
        assert_eq!("crop".parse::<ParameterCategory>(), Ok(ParameterCategory::Crop));
        assert_eq!("Utilities".parse::<ParameterCategory>(), Ok(ParameterCategory::Utility));
        assert_eq!(
            " demographics ".parse::<ParameterCategory>(),
            Ok(ParameterCategory::Demographics)
        );
    }

    #[test]
    fn rejects_unknown_tag() {
        assert_eq!(
            "wind".parse::<ParameterCategory>(),
            Err(DashboardError::UnknownCategory("wind".into()))
        );
    }

    #[test]
    fn index_matches_all_order() {
        for (i, category) in ParameterCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }
}
