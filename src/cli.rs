// cli.rs

use std::path::PathBuf;

use crate::category::ParameterCategory;
use crate::config::DEFAULT_CONFIG_FILE;
use crate::legend::SuitabilityLayer;

/// Solar suitability dashboard for district boundary data
#[derive(clap::Parser, Debug)]
#[command(name = "solar-dashboard", version, about)]
pub struct Cli {
    /// Boundary file to load before the configured candidates (.shp or .geojson)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Initial state filter ("all" for every state)
    #[arg(long)]
    pub state: Option<String>,

    /// Initial district filter ("all" for every district)
    #[arg(long)]
    pub district: Option<String>,

    /// Parameter category: crop, water, energy, utility or demographics
    #[arg(long, value_parser = parse_category)]
    pub category: Option<ParameterCategory>,

    /// Suitability layer: adaptation, mitigation, replacement or general
    #[arg(long, value_parser = parse_layer)]
    pub layer: Option<SuitabilityLayer>,

    /// Print the selection summary to stdout instead of opening the dashboard
    #[arg(long)]
    pub summary: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_category(s: &str) -> Result<ParameterCategory, String> {
    s.parse().map_err(|e: crate::error::DashboardError| e.to_string())
}

fn parse_layer(s: &str) -> Result<SuitabilityLayer, String> {
    s.parse().map_err(|e: crate::error::DashboardError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["solar-dashboard"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("dashboard.toml"));
        assert!(cli.data.is_none());
        assert!(!cli.summary);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_selection_flags() {
        let cli = Cli::try_parse_from([
            "solar-dashboard",
            "--data",
            "layer.geojson",
            "--state",
            "Gujarat",
            "--category",
            "water",
            "--layer",
            "general",
            "--summary",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("layer.geojson")));
        assert_eq!(cli.state.as_deref(), Some("Gujarat"));
        assert_eq!(cli.category, Some(ParameterCategory::Water));
        assert_eq!(cli.layer, Some(SuitabilityLayer::General));
        assert!(cli.summary);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(Cli::try_parse_from(["solar-dashboard", "--category", "wind"]).is_err());
    }
}
