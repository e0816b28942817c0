// export.rs

use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use plotters::prelude::*;
use tracing::info;

use crate::dataset::AttrValue;
use crate::legend::{Rgb, SuitabilityLayer};
use crate::loader::{DISTRICT_COLUMN, STATE_COLUMN};
use crate::view::{Extent, View};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const BACKGROUND: RGBColor = RGBColor(44, 62, 80);

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Everything the PNG renderer needs about the current screen.
pub struct MapRender<'a> {
    pub view: &'a View,
    pub classes: &'a [Option<String>],
    pub layer: SuitabilityLayer,
    pub extent: Extent,
}

/// Draws the view's districts filled by suitability class to a PNG file.
pub fn export_png(render: &MapRender<'_>, output: &Path) -> Result<PathBuf> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }

    let root = BitMapBackend::new(output, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let caption = format!(
        "Solar Suitability: {} ({})",
        render.layer.title(),
        render.view.selection
    );
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(&caption, ("sans-serif", 32).into_font().color(&WHITE))
        .build_cartesian_2d(
            render.extent.min_x..render.extent.max_x,
            render.extent.min_y..render.extent.max_y,
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .axis_style(&WHITE)
        .label_style(("sans-serif", 14).into_font().color(&WHITE))
        .draw()?;

    // One series per class so each gets a legend entry.
    let mut by_class: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, class) in render.classes.iter().enumerate() {
        let key = class.clone().unwrap_or_else(|| String::from("No Data"));
        by_class.entry(key).or_default().push(i);
    }

    for (class, rows) in &by_class {
        let known = (class != "No Data").then_some(class.as_str());
        let fill = rgb(render.layer.color_for(known));
        let mut outlines = Vec::new();
        let mut fills = Vec::new();
        for &row in rows {
            let Some(geometry) = render.view.geometry.get(row) else {
                continue;
            };
            for polygon in &geometry.0 {
                let ring: Vec<(f64, f64)> =
                    polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
                fills.push(Polygon::new(ring.clone(), fill.mix(0.7).filled()));
                outlines.push(PathElement::new(ring, BLACK.stroke_width(1)));
            }
        }
        chart
            .draw_series(fills)?
            .label(class.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.filled()));
        chart.draw_series(outlines)?;
    }

    if !by_class.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    info!(path = %output.display(), districts = render.view.len(), "exported map image");
    Ok(output.to_path_buf())
}

fn attr_to_json(value: &AttrValue) -> serde_json::Value {
    match value {
        AttrValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        AttrValue::Text(s) => serde_json::Value::String(s.clone()),
        AttrValue::Null => serde_json::Value::Null,
    }
}

fn geometry_value(geometry: &geo::MultiPolygon<f64>) -> Value {
    Value::MultiPolygon(
        geometry
            .0
            .iter()
            .map(|polygon| {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            })
            .collect(),
    )
}

/// Builds a FeatureCollection of the view's rows and category columns.
pub fn view_to_geojson(view: &View) -> GeoJson {
    let features = view
        .attributes
        .iter()
        .zip(&view.geometry)
        .map(|(row, geometry)| {
            let mut properties = JsonObject::new();
            properties.insert(STATE_COLUMN.into(), row.state.clone().into());
            properties.insert(DISTRICT_COLUMN.into(), row.district.clone().into());
            for (column, value) in view.columns.iter().zip(&row.values) {
                properties.insert(column.to_string(), attr_to_json(value));
            }
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geometry_value(geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn export_geojson(view: &View, output: &Path) -> Result<PathBuf> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    let text = serde_json::to_string_pretty(&view_to_geojson(view))?;
    fs::write(output, text)
        .with_context(|| format!("Failed to write GeoJSON to {}", output.display()))?;
    info!(path = %output.display(), features = view.len(), "exported view as GeoJSON");
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ParameterCategory;
    use crate::dataset::fixtures::small;
    use crate::filter::FilterSelection;
    use crate::view::build_view;

    #[test]
    fn geojson_carries_names_and_category_columns() {
        let dataset = small();
        let view = build_view(
            dataset.records(),
            &FilterSelection::named("A", "all"),
            ParameterCategory::Utility,
        );
        let GeoJson::FeatureCollection(collection) = view_to_geojson(&view) else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.features.len(), 2);
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties[STATE_COLUMN], "A");
        assert!(properties.contains_key("C_E_FC"));
        assert!(properties.contains_key("C_Others"));
        assert!(!properties.contains_key("aridity"));
        assert_eq!(properties.len(), 4);
    }

    #[test]
    fn exported_geojson_loads_back() {
        let dataset = small();
        let view = build_view(dataset.records(), &FilterSelection::all(), ParameterCategory::Water);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("view.geojson");
        export_geojson(&view, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: GeoJson = text.parse().unwrap();
        let GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.features.len(), 3);
    }

    #[test]
    fn ensure_dir_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());
        assert!(ensure_dir_exists(&dir.path().join("fresh")).is_ok());
    }
}
