// view.rs

use std::sync::Arc;

use geo::{BoundingRect, MultiPolygon, Rect};

use crate::category::{ParameterCategory, columns_for};
use crate::dataset::{AttrValue, RegionRecord};
use crate::filter::{FilterSelection, resolve};

/// Centre used when there is no geometry to frame (lat 20.5937, lon 78.9629).
pub const DEFAULT_CENTER: (f64, f64) = (78.9629, 20.5937);
const DEFAULT_HALF_SPAN: f64 = 15.0;
const PADDING_RATIO: f64 = 0.05;
const MIN_SPAN: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub state: String,
    pub district: String,
    pub values: Vec<AttrValue>,
}

/// Filtered geometry and attributes handed to the map and panels.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub selection: FilterSelection,
    pub category: ParameterCategory,
    pub columns: Vec<&'static str>,
    pub geometry: Vec<Arc<MultiPolygon<f64>>>,
    pub attributes: Vec<AttributeRow>,
}

impl View {
    /// A view with no rows, before anything is selected.
    pub fn empty(category: ParameterCategory) -> View {
        View {
            selection: FilterSelection::all(),
            category,
            columns: columns_for(category),
            geometry: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Values of one category column across the view's rows.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &AttrValue> {
        self.attributes.iter().filter_map(move |row| row.values.get(index))
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        union_bounds(self.geometry.iter().map(|g| g.as_ref()))
    }
}

/// Records matching `selection`, in input order.
pub fn matching<'a>(
    records: &'a [RegionRecord],
    selection: &'a FilterSelection,
) -> impl Iterator<Item = &'a RegionRecord> {
    records.iter().filter(move |r| selection.matches(r))
}

pub fn build_view(
    records: &[RegionRecord],
    selection: &FilterSelection,
    category: ParameterCategory,
) -> View {
    let selection = resolve(records, selection);
    let columns = columns_for(category);

    let mut geometry = Vec::new();
    let mut attributes = Vec::new();
    for record in matching(records, &selection) {
        geometry.push(Arc::clone(&record.geometry));
        attributes.push(AttributeRow {
            state: record.state.clone(),
            district: record.district.clone(),
            values: columns.iter().map(|c| record.get(c).clone()).collect(),
        });
    }

    View {
        selection,
        category,
        columns,
        geometry,
        attributes,
    }
}

fn union_bounds<'a>(geoms: impl Iterator<Item = &'a MultiPolygon<f64>>) -> Option<Rect<f64>> {
    geoms
        .filter_map(|g| g.bounding_rect())
        .reduce(|acc, r| {
            Rect::new(
                (acc.min().x.min(r.min().x), acc.min().y.min(r.min().y)),
                (acc.max().x.max(r.max().x), acc.max().y.max(r.max().y)),
            )
        })
}

/// Plot window in lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Extent {
    /// A window around the default centre.
    fn default() -> Extent {
        let (x, y) = DEFAULT_CENTER;
        Extent {
            min_x: x - DEFAULT_HALF_SPAN,
            max_x: x + DEFAULT_HALF_SPAN,
            min_y: y - DEFAULT_HALF_SPAN,
            max_y: y + DEFAULT_HALF_SPAN,
        }
    }
}

impl Extent {
    fn padded(rect: Rect<f64>) -> Extent {
        let (cx, cy) = (rect.center().x, rect.center().y);
        let half_w = (rect.width().max(MIN_SPAN) * (1.0 + 2.0 * PADDING_RATIO)) / 2.0;
        let half_h = (rect.height().max(MIN_SPAN) * (1.0 + 2.0 * PADDING_RATIO)) / 2.0;
        Extent {
            min_x: cx - half_w,
            max_x: cx + half_w,
            min_y: cy - half_h,
            max_y: cy + half_h,
        }
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [self.min_x, self.max_x]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        [self.min_y, self.max_y]
    }
}

/// Window framing the view: the whole dataset when no state is chosen.
pub fn map_extent(records: &[RegionRecord], view: &View) -> Extent {
    let rect = if view.selection.state.is_all() {
        union_bounds(records.iter().map(|r| r.geometry.as_ref()))
    } else {
        view.bounds()
    };
    rect.map(Extent::padded).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::small;
    use crate::filter::Scope;
    use approx::assert_relative_eq;

    #[test]
    fn all_selection_returns_every_record() {
        let dataset = small();
        for category in ParameterCategory::ALL {
            let view = build_view(dataset.records(), &FilterSelection::all(), category);
            assert_eq!(view.len(), dataset.len());
            assert_eq!(view.geometry.len(), dataset.len());
            assert_eq!(view.columns, columns_for(category));
            for row in &view.attributes {
                assert_eq!(row.values.len(), view.columns.len());
            }
        }
    }

    #[test]
    fn input_order_is_preserved() {
        let dataset = small();
        let view = build_view(dataset.records(), &FilterSelection::all(), ParameterCategory::Crop);
        let districts: Vec<&str> = view.attributes.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(districts, vec!["Z", "Y", "X"]);
    }

    #[test]
    fn state_and_district_select_one_record() {
        let dataset = small();
        let view = build_view(
            dataset.records(),
            &FilterSelection::named("A", "X"),
            ParameterCategory::Energy,
        );
        assert_eq!(view.len(), 1);
        let expected = &dataset.records()[2];
        assert_eq!(view.attributes[0].state, "A");
        assert_eq!(view.attributes[0].district, "X");
        assert_eq!(view.attributes[0].values, vec![expected.get("aridity").clone()]);
        assert_eq!(view.geometry[0], expected.geometry);
    }

    #[test]
    fn state_only_keeps_all_of_its_districts() {
        let dataset = small();
        let view = build_view(
            dataset.records(),
            &FilterSelection::new(Scope::Named("A".into()), Scope::All),
            ParameterCategory::Water,
        );
        assert_eq!(view.len(), 2);
        assert!(view.attributes.iter().all(|r| r.state == "A"));
    }

    #[test]
    fn build_view_is_idempotent() {
        let dataset = small();
        let selection = FilterSelection::named("A", "all");
        let first = build_view(dataset.records(), &selection, ParameterCategory::Utility);
        let second = build_view(dataset.records(), &selection, ParameterCategory::Utility);
        assert_eq!(first, second);
    }

    #[test]
    fn stale_selection_falls_back_to_everything() {
        let dataset = small();
        let view = build_view(
            dataset.records(),
            &FilterSelection::named("Gone", "Nowhere"),
            ParameterCategory::Crop,
        );
        assert_eq!(view.selection, FilterSelection::all());
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn extent_of_all_states_covers_dataset_with_padding() {
        let dataset = small();
        let view = build_view(dataset.records(), &FilterSelection::all(), ParameterCategory::Crop);
        let extent = map_extent(dataset.records(), &view);
        // squares span x 0..5, y 0..1
        assert_relative_eq!(extent.min_x, -0.25, epsilon = 1e-9);
        assert_relative_eq!(extent.max_x, 5.25, epsilon = 1e-9);
        assert_relative_eq!(extent.min_y, -0.05, epsilon = 1e-9);
        assert_relative_eq!(extent.max_y, 1.05, epsilon = 1e-9);
    }

    #[test]
    fn extent_of_one_state_frames_only_it() {
        let dataset = small();
        let view = build_view(
            dataset.records(),
            &FilterSelection::named("B", "all"),
            ParameterCategory::Crop,
        );
        let extent = map_extent(dataset.records(), &view);
        assert_relative_eq!(extent.min_x, 3.95, epsilon = 1e-9);
        assert_relative_eq!(extent.max_x, 5.05, epsilon = 1e-9);
    }

    #[test]
    fn empty_geometry_uses_default_center() {
        let view = build_view(&[], &FilterSelection::all(), ParameterCategory::Crop);
        let extent = map_extent(&[], &view);
        assert_relative_eq!((extent.min_x + extent.max_x) / 2.0, DEFAULT_CENTER.0);
        assert_relative_eq!((extent.min_y + extent.max_y) / 2.0, DEFAULT_CENTER.1);
    }
}
