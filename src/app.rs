// app.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::{debug, error, info};

use crate::category::ParameterCategory;
use crate::dataset::Dataset;
use crate::export::{self, MapRender};
use crate::filter::{FilterSelection, Scope, district_options, list_states, resolve};
use crate::legend::SuitabilityLayer;
use crate::stats::{self, Breakdown, ParameterSummary};
use crate::view::{self, Extent, View};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrentScreen {
    Dashboard,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Navigation,
    EditingFilename,
}

/// The filter control that j/k currently changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    State,
    District,
    Category,
    Layer,
}

impl Control {
    const ORDER: [Control; 4] = [
        Control::State,
        Control::District,
        Control::Category,
        Control::Layer,
    ];

    fn shifted(self, delta: isize) -> Control {
        let len = Control::ORDER.len() as isize;
        let i = Control::ORDER.iter().position(|c| *c == self).unwrap_or(0) as isize;
        Control::ORDER[(i + delta).rem_euclid(len) as usize]
    }
}

fn saved_at() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Steps through an option list with a leading "All" entry, wrapping around.
fn step_scope(options: &[String], current: &Scope, delta: isize) -> Scope {
    let len = options.len() as isize + 1;
    let i = match current {
        Scope::All => 0,
        Scope::Named(name) => options
            .iter()
            .position(|o| o == name)
            .map_or(0, |p| p as isize + 1),
    };
    match (i + delta).rem_euclid(len) {
        0 => Scope::All,
        n => Scope::Named(options[n as usize - 1].clone()),
    }
}

fn step_in<T: Copy + PartialEq>(items: &[T], current: T, delta: isize) -> T {
    if items.is_empty() {
        return current;
    }
    let len = items.len() as isize;
    let i = items.iter().position(|x| *x == current).unwrap_or(0) as isize;
    items[(i + delta).rem_euclid(len) as usize]
}

pub struct App {
    pub current_screen: CurrentScreen,
    pub current_mode: AppMode,
    pub should_quit: bool,

    // Session snapshot and the user's choices
    pub dataset: Arc<Dataset>,
    pub states: Vec<String>,
    pub districts: Vec<String>,
    pub layers: Vec<SuitabilityLayer>,
    pub selection: FilterSelection,
    pub category: ParameterCategory,
    pub layer: SuitabilityLayer,
    pub focus: Control,

    // Recomputed on every change
    pub view: View,
    pub classes: Vec<Option<String>>,
    pub breakdown: Option<Breakdown>,
    pub parameters: Vec<ParameterSummary>,
    pub extent: Extent,

    // Output filename editing
    pub output_dir: PathBuf,
    pub output_filename_buffer: String,
    pub output_filename_cursor: usize,
    pub previous_output_filename_buffer: String,

    // UI related
    pub notification: String,
    pub help_keybinds: Vec<String>,

    // Resizing of the map pane
    pub left_pane_width_percentage: u16,
    pub is_resizing: bool,
    pub terminal_width: u16,
}

impl App {
    pub fn new(
        dataset: Arc<Dataset>,
        selection: FilterSelection,
        category: ParameterCategory,
        layer: SuitabilityLayer,
        output_dir: PathBuf,
        output_filename: String,
    ) -> App {
        let states = list_states(dataset.records());
        let mut layers: Vec<SuitabilityLayer> = SuitabilityLayer::ALL
            .into_iter()
            .filter(|l| dataset.has_column(l.column()))
            .collect();
        if layers.is_empty() {
            layers = SuitabilityLayer::ALL.to_vec();
        }
        let layer = if layers.contains(&layer) { layer } else { layers[0] };


        let mut app = App {
            current_screen: CurrentScreen::Dashboard,
            current_mode: AppMode::Navigation,
            should_quit: false,

            dataset,
            states,
            districts: Vec::new(),
            layers,
            selection,
            category,
            layer,
            focus: Control::State,

            view: View::empty(category),
            classes: Vec::new(),
            breakdown: None,
            parameters: Vec::new(),
            extent: Extent::default(),

            output_filename_cursor: output_filename.chars().count(),
            output_filename_buffer: output_filename,
            output_dir,
            previous_output_filename_buffer: String::new(),

            notification: String::from("Choose a state and district to explore:"),
            help_keybinds: vec![
                "Tab / Shift-Tab: Move between filters".to_string(),
                "J/K or Arrow Keys: Change the focused filter".to_string(),
                "1-5: Crops, Water, Energy, Utilities, Demographics".to_string(),
                "A: Reset state and district to All".to_string(),
                "E: Export map as PNG".to_string(),
                "G: Export view as GeoJSON".to_string(),
                "R: Rename output plot".to_string(),
                "Q / Esc: Quit the application".to_string(),
                "H / ?: Show Help screen".to_string(),
                "Click & Drag Divider: Resize panels".to_string(),
            ],

            left_pane_width_percentage: 50,
            is_resizing: false,
            terminal_width: 0,
        };
        // derived fields are filled in by refresh only
        app.refresh();
        app
    }

    /// Recomputes everything derived from the current selection.
    pub fn refresh(&mut self) {
        let records = self.dataset.records();
        self.selection = resolve(records, &self.selection);
        self.districts = district_options(records, &self.selection.state);
        self.view = view::build_view(records, &self.selection, self.category);
        self.extent = view::map_extent(records, &self.view);
        self.classes = stats::classes_for(&self.dataset, &self.selection, self.layer);
        self.breakdown = stats::suitability_breakdown(&self.dataset, &self.selection, self.layer);
        self.parameters = stats::summarize(&self.view);
        debug!(
            selection = %self.selection,
            category = self.category.tag(),
            layer = self.layer.title(),
            rows = self.view.len(),
            "view recomputed"
        );
    }

    pub fn set_state(&mut self, state: Scope) {
        if self.selection.state != state {
            self.selection = FilterSelection::new(state, Scope::All);
            self.refresh();
        }
    }

    pub fn set_district(&mut self, district: Scope) {
        if self.selection.district != district {
            self.selection.district = district;
            self.refresh();
        }
    }

    pub fn set_category(&mut self, category: ParameterCategory) {
        if self.category != category {
            self.category = category;
            self.refresh();
        }
    }

    pub fn set_layer(&mut self, layer: SuitabilityLayer) {
        if self.layer != layer {
            self.layer = layer;
            self.refresh();
        }
    }

    fn step_focused(&mut self, delta: isize) {
        match self.focus {
            Control::State => {
                let next = step_scope(&self.states, &self.selection.state, delta);
                self.set_state(next);
            }
            Control::District => {
                let next = step_scope(&self.districts, &self.selection.district, delta);
                self.set_district(next);
            }
            Control::Category => {
                let next = step_in(&ParameterCategory::ALL, self.category, delta);
                self.set_category(next);
            }
            Control::Layer => {
                let next = step_in(&self.layers, self.layer, delta);
                self.set_layer(next);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.current_mode {
            AppMode::Navigation => self.handle_navigation_key(key),
            AppMode::EditingFilename => self.handle_filename_key(key),
        }
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) {
        if self.current_screen == CurrentScreen::Help {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                _ => self.current_screen = CurrentScreen::Dashboard,
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::Char('?') => self.current_screen = CurrentScreen::Help,
            KeyCode::Tab | KeyCode::Right => self.focus = self.focus.shifted(1),
            KeyCode::BackTab | KeyCode::Left => self.focus = self.focus.shifted(-1),
            KeyCode::Char('j') | KeyCode::Down => self.step_focused(1),
            KeyCode::Char('k') | KeyCode::Up => self.step_focused(-1),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.set_category(ParameterCategory::ALL[index]);
            }
            KeyCode::Char('a') => {
                self.selection = FilterSelection::all();
                self.refresh();
                self.notification = String::from("Filters reset to All States");
            }
            KeyCode::Char('e') => self.export_png(),
            KeyCode::Char('g') => self.export_geojson(),
            KeyCode::Char('r') => {
                self.previous_output_filename_buffer
                    .clone_from(&self.output_filename_buffer);
                self.output_filename_cursor = self.output_filename_buffer.chars().count();
                self.current_mode = AppMode::EditingFilename;
                self.notification = String::from("Editing output filename (Enter to save, Esc to cancel)");
            }
            _ => {}
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.output_filename_buffer
            .char_indices()
            .nth(cursor)
            .map_or(self.output_filename_buffer.len(), |(i, _)| i)
    }

    fn handle_filename_key(&mut self, key: KeyEvent) {
        let len = self.output_filename_buffer.chars().count();
        match key.code {
            KeyCode::Enter => {
                if self.output_filename_buffer.trim().is_empty() {
                    self.output_filename_buffer
                        .clone_from(&self.previous_output_filename_buffer);
                }
                self.notification = format!("Output filename set to {}", self.output_filename_buffer);
                self.current_mode = AppMode::Navigation;
            }
            KeyCode::Esc => {
                self.output_filename_buffer
                    .clone_from(&self.previous_output_filename_buffer);
                self.notification = String::from("Filename edit cancelled");
                self.current_mode = AppMode::Navigation;
            }
            KeyCode::Left => self.output_filename_cursor = self.output_filename_cursor.saturating_sub(1),
            KeyCode::Right => self.output_filename_cursor = (self.output_filename_cursor + 1).min(len),
            KeyCode::Backspace => {
                if self.output_filename_cursor > 0 {
                    self.output_filename_cursor -= 1;
                    let at = self.byte_index(self.output_filename_cursor);
                    self.output_filename_buffer.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.output_filename_cursor < len {
                    let at = self.byte_index(self.output_filename_cursor);
                    self.output_filename_buffer.remove(at);
                }
            }
            KeyCode::Char(c) if !c.is_control() && c != '/' && c != '\\' => {
                let at = self.byte_index(self.output_filename_cursor);
                self.output_filename_buffer.insert(at, c);
                self.output_filename_cursor += 1;
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.terminal_width == 0 {
            return;
        }
        let divider = (self.terminal_width as u32 * self.left_pane_width_percentage as u32 / 100) as u16;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if mouse.column.abs_diff(divider) <= 1 => {
                self.is_resizing = true;
            }
            MouseEventKind::Drag(MouseButton::Left) if self.is_resizing => {
                let pct = (mouse.column as u32 * 100 / self.terminal_width as u32) as u16;
                self.left_pane_width_percentage = pct.clamp(20, 80);
            }
            MouseEventKind::Up(MouseButton::Left) => self.is_resizing = false,
            _ => {}
        }
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        Path::new(&self.output_dir)
            .join(&self.output_filename_buffer)
            .with_extension(extension)
    }

    pub fn export_png(&mut self) {
        let render = MapRender {
            view: &self.view,
            classes: &self.classes,
            layer: self.layer,
            extent: self.extent,
        };
        let path = self.output_path("png");
        self.notification = match export::export_png(&render, &path) {
            Ok(path) => format!("Map saved to {} at {}", path.display(), saved_at()),
            Err(e) => {
                error!(error = %format!("{e:#}"), "PNG export failed");
                format!("Export failed: {e}")
            }
        };
    }

    pub fn export_geojson(&mut self) {
        let path = self.output_path("geojson");
        self.notification = match export::export_geojson(&self.view, &path) {
            Ok(path) => {
                info!(path = %path.display(), "view exported");
                format!("View saved to {} at {}", path.display(), saved_at())
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "GeoJSON export failed");
                format!("Export failed: {e}")
            }
        };
    }
}
