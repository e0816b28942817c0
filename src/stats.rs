// stats.rs

use std::collections::HashMap;

use crate::category::ParameterCategory;
use crate::dataset::{AttrValue, Dataset};
use crate::filter::{FilterSelection, resolve};
use crate::legend::SuitabilityLayer;
use crate::view::{View, matching};

/// Share of one suitability class among the filtered districts.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare {
    pub class: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub layer: SuitabilityLayer,
    /// Matching districts, the denominator of every percentage.
    pub total: usize,
    /// Matching districts that carry a class value.
    pub classified: usize,
    pub shares: Vec<ClassShare>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Class counts of `layer` over the districts matching `selection`.
///
/// Returns `None` when the dataset has no column for the layer.
pub fn suitability_breakdown(
    dataset: &Dataset,
    selection: &FilterSelection,
    layer: SuitabilityLayer,
) -> Option<Breakdown> {
    if !dataset.has_column(layer.column()) {
        return None;
    }

    let selection = resolve(dataset.records(), selection);
    let mut total = 0;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in matching(dataset.records(), &selection) {
        total += 1;
        let value = record.get(layer.column());
        if value.is_null() {
            continue;
        }
        if let Some(class) = value.as_text() {
            *counts.entry(class).or_insert(0) += 1;
        }
    }

    let mut shares: Vec<ClassShare> = counts
        .into_iter()
        .map(|(class, count)| ClassShare {
            class: class.to_string(),
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.class.cmp(&b.class)));
    let classified = shares.iter().map(|s| s.count).sum();

    Some(Breakdown {
        layer,
        total,
        classified,
        shares,
    })
}

/// Class value per matching district, aligned with `build_view` rows.
pub fn classes_for(
    dataset: &Dataset,
    selection: &FilterSelection,
    layer: SuitabilityLayer,
) -> Vec<Option<String>> {
    let selection = resolve(dataset.records(), selection);
    matching(dataset.records(), &selection)
        .map(|record| {
            let value = record.get(layer.column());
            if value.is_null() {
                None
            } else {
                Some(value.to_string())
            }
        })
        .collect()
}

/// Summary line of one parameter for the key-parameters panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSummary {
    pub label: &'static str,
    pub column: &'static str,
    pub value: String,
}

/// Mean of numeric values, else the most common text, else "N/A".
fn summarize_values<'a>(values: impl Iterator<Item = &'a AttrValue>) -> String {
    let mut numbers = Vec::new();
    let mut texts: HashMap<&str, usize> = HashMap::new();
    for value in values.filter(|v| !v.is_null()) {
        match value {
            AttrValue::Number(n) => numbers.push(*n),
            AttrValue::Text(s) => *texts.entry(s.as_str()).or_insert(0) += 1,
            AttrValue::Null => {}
        }
    }

    if !numbers.is_empty() {
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        return format!("{:.2}", mean);
    }

    texts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(text, _)| text.to_string())
        .unwrap_or_else(|| String::from("N/A"))
}

pub fn summarize(view: &View) -> Vec<ParameterSummary> {
    view.category
        .parameters()
        .iter()
        .enumerate()
        .map(|(i, parameter)| ParameterSummary {
            label: parameter.label,
            column: parameter.column,
            value: summarize_values(view.column_values(i)),
        })
        .collect()
}

/// Icon shown beside each category in the parameters panel.
pub fn category_icon(category: ParameterCategory) -> &'static str {
    match category {
        ParameterCategory::Crop => "🌾",
        ParameterCategory::Water => "💧",
        ParameterCategory::Energy => "☀",
        ParameterCategory::Utility => "⚡",
        ParameterCategory::Demographics => "👥",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RegionRecord;
    use crate::dataset::fixtures::{columns, record, small};
    use crate::view::build_view;

    fn classified() -> Dataset {
        let classes = [
            ("A", "P", Some("Highly Suitable")),
            ("A", "Q", Some("Less Suitable")),
            ("A", "R", Some("Highly Suitable")),
            ("A", "S", None),
            ("B", "T", Some("Moderately Suitable")),
        ];
        let records: Vec<RegionRecord> = classes
            .iter()
            .enumerate()
            .map(|(i, (state, district, class))| {
                let mut rec = record(state, district, i as f64, 0.0);
                let value = class.map_or(AttrValue::Null, |c| AttrValue::Text(c.into()));
                rec.attributes.insert("Adaptation".into(), value);
                rec
            })
            .collect();
        let mut cols = columns();
        cols.insert("Adaptation".into());
        Dataset::new("classified.geojson", cols, records).unwrap()
    }

    #[test]
    fn breakdown_counts_and_percentages() {
        let dataset = classified();
        let breakdown = suitability_breakdown(
            &dataset,
            &FilterSelection::named("A", "all"),
            SuitabilityLayer::Adaptation,
        )
        .unwrap();

        assert_eq!(breakdown.total, 4);
        assert_eq!(breakdown.classified, 3);
        assert_eq!(
            breakdown.shares,
            vec![
                ClassShare {
                    class: "Highly Suitable".into(),
                    count: 2,
                    percentage: 50.0
                },
                ClassShare {
                    class: "Less Suitable".into(),
                    count: 1,
                    percentage: 25.0
                },
            ]
        );
    }

    #[test]
    fn unclassified_rows_count_in_total_only() {
        let dataset = classified();
        let breakdown = suitability_breakdown(
            &dataset,
            &FilterSelection::named("A", "S"),
            SuitabilityLayer::Adaptation,
        )
        .unwrap();
        assert_eq!(breakdown.total, 1);
        assert_eq!(breakdown.classified, 0);
        assert!(breakdown.shares.is_empty());

        let breakdown =
            suitability_breakdown(&dataset, &FilterSelection::all(), SuitabilityLayer::Adaptation)
                .unwrap();
        assert_eq!(breakdown.total, 5);
        assert_eq!(breakdown.classified, 4);
    }

    #[test]
    fn percentages_round_to_two_places() {
        let dataset = classified();
        let breakdown =
            suitability_breakdown(&dataset, &FilterSelection::all(), SuitabilityLayer::Adaptation)
                .unwrap();
        assert_eq!(breakdown.total, 5);
        let highly = &breakdown.shares[0];
        assert_eq!(highly.percentage, 40.0);
        let moderately = breakdown
            .shares
            .iter()
            .find(|s| s.class == "Moderately Suitable")
            .unwrap();
        assert_eq!(moderately.percentage, 20.0);
    }

    #[test]
    fn missing_layer_column_has_no_breakdown() {
        assert!(
            suitability_breakdown(&small(), &FilterSelection::all(), SuitabilityLayer::General)
                .is_none()
        );
    }

    #[test]
    fn classes_align_with_view_rows() {
        let dataset = classified();
        let selection = FilterSelection::named("A", "all");
        let classes = classes_for(&dataset, &selection, SuitabilityLayer::Adaptation);
        let view = build_view(dataset.records(), &selection, ParameterCategory::Crop);
        assert_eq!(classes.len(), view.len());
        assert_eq!(classes[3], None);
        assert_eq!(classes[1].as_deref(), Some("Less Suitable"));
    }

    #[test]
    fn numeric_parameters_average() {
        let dataset = small();
        let view = build_view(dataset.records(), &FilterSelection::all(), ParameterCategory::Crop);
        let summary = summarize(&view);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].label, "Cropping Intensity (%)");
        // x offsets are 4, 2 and 0; first crop column adds 0
        assert_eq!(summary[0].value, "2.00");
        assert_eq!(summary[1].value, "3.00");
    }

    #[test]
    fn text_parameters_use_most_common_value() {
        let values = [
            AttrValue::Text("Grid".into()),
            AttrValue::Text("Diesel".into()),
            AttrValue::Text("Grid".into()),
            AttrValue::Null,
        ];
        assert_eq!(summarize_values(values.iter()), "Grid");
    }

    #[test]
    fn no_values_is_not_available() {
        let values = [AttrValue::Null, AttrValue::Text("nan".into())];
        assert_eq!(summarize_values(values.iter()), "N/A");
        assert_eq!(summarize_values([].iter()), "N/A");
    }
}
