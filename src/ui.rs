// ui.rs

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::app::{App, AppMode, Control, CurrentScreen};
use crate::category::ParameterCategory;
use crate::legend::{Rgb, display_name};
use crate::stats::category_icon;

const BAR_WIDTH: usize = 20;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Notification
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    app.terminal_width = main_layout[2].width;

    let notification_paragraph = Paragraph::new(app.notification.clone())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(notification_paragraph, main_layout[0]);

    render_filters(frame, app, main_layout[1]);

    match app.current_screen {
        CurrentScreen::Dashboard => render_dashboard(frame, app, main_layout[2]),
        CurrentScreen::Help => render_help_screen(frame, app, main_layout[2]),
    }

    render_footer(frame, app, main_layout[3]);
}

/// Renders the help screen.
fn render_help_screen(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Help Screen ")
        .title_style(Style::default().fg(Color::Yellow).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let mut lines: Vec<Line> = vec![
        Line::from("Keybinds:"),
        Line::from(""),
    ];
    lines.extend(app.help_keybinds.iter().map(|s| Line::from(format!("  {}", s))));
    lines.push(Line::from(""));
    lines.push(Line::from("Press any key to return to the dashboard."));

    let help_text = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::LightGreen));

    frame.render_widget(help_text, area);
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(area);

    let state = match app.selection.state.name() {
        Some(name) => name.to_string(),
        None => String::from("All States"),
    };
    let district = match app.selection.district.name() {
        Some(name) => name.to_string(),
        None => String::from("All Districts"),
    };
    let controls = [
        (Control::State, " 🌍 State ", state),
        (Control::District, " 🏘 District ", district),
        (Control::Category, " 📊 Category ", app.category.title().to_string()),
        (Control::Layer, " ☀ Layer ", app.layer.title().to_string()),
    ];

    for (i, (control, title, value)) in controls.into_iter().enumerate() {
        let focused = app.focus == control && app.current_mode == AppMode::Navigation;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border);
        let mut style = Style::default().fg(Color::White);
        if focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        let paragraph = Paragraph::new(format!("◀ {} ▶", value))
            .alignment(Alignment::Center)
            .style(style)
            .block(block);
        frame.render_widget(paragraph, chunks[i]);
    }
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let main_content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(app.left_pane_width_percentage), // Map
            Constraint::Percentage(100 - app.left_pane_width_percentage), // Panels
        ])
        .split(area);

    render_map(frame, app, main_content_layout[0]);

    let right_panel_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Statistics
            Constraint::Min(0),         // Parameters
            Constraint::Length(6),      // Dataset info
        ])
        .split(main_content_layout[1]);

    render_statistics(frame, app, right_panel_chunks[0]);
    render_parameters(frame, app, right_panel_chunks[1]);
    render_dataset_info(frame, app, right_panel_chunks[2]);

    // divider for resizing the main panels
    let divider_x_pos = main_content_layout[0].x + main_content_layout[0].width;
    if divider_x_pos < area.x + area.width {
        let style = if app.is_resizing {
            Style::default().bg(Color::LightRed)
        } else {
            Style::default().bg(Color::DarkGray)
        };
        for y in area.y..(area.y + area.height) {
            frame
                .buffer_mut()
                .get_mut(divider_x_pos, y)
                .set_symbol("│")
                .set_style(style);
        }
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" 🗺 Solar Suitability Map: {} ", app.layer.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));

    if app.view.is_empty() {
        let warning = Paragraph::new("No data available for selected filters.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(warning, area);
        return;
    }

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(app.extent.x_bounds())
        .y_bounds(app.extent.y_bounds())
        .paint(|ctx| {
            for (geometry, class) in app.view.geometry.iter().zip(&app.classes) {
                let stroke = color(app.layer.color_for(class.as_deref()));
                for polygon in &geometry.0 {
                    for segment in polygon.exterior().lines() {
                        ctx.draw(&CanvasLine {
                            x1: segment.start.x,
                            y1: segment.start.y,
                            x2: segment.end.x,
                            y2: segment.end.y,
                            color: stroke,
                        });
                    }
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn render_statistics(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" 📊 Summary Statistics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightYellow));

    let mut lines: Vec<Line> = Vec::new();
    match &app.breakdown {
        Some(breakdown) if !breakdown.shares.is_empty() => {
            lines.push(Line::from(vec![
                Span::raw("Total Features: "),
                Span::styled(
                    breakdown.classified.to_string(),
                    Style::default().fg(Color::LightYellow).bold(),
                ),
            ]));
            lines.push(Line::from(""));
            for share in &breakdown.shares {
                let swatch = color(app.layer.color_for(Some(&share.class)));
                let filled = ((share.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
                lines.push(Line::from(vec![
                    Span::styled("■ ", Style::default().fg(swatch)),
                    Span::raw(display_name(&share.class)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("█".repeat(filled.max(1)), Style::default().fg(swatch)),
                    Span::styled(
                        format!(" {:.1}%", share.percentage),
                        Style::default().fg(Color::LightYellow).bold(),
                    ),
                ]));
            }
        }
        _ => lines.push(Line::from("No statistics available").fg(Color::Gray)),
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_parameters(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(
            " 📋 Key Parameters: {} ",
            app.category.title()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightGreen));

    let icon = category_icon(app.category);
    let mut lines: Vec<Line> = app
        .parameters
        .iter()
        .map(|summary| {
            Line::from(vec![
                Span::raw(format!("{} {}: ", icon, summary.label)),
                Span::styled(
                    summary.value.clone(),
                    Style::default().fg(Color::LightYellow).bold(),
                ),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    let tabs: Vec<Span> = ParameterCategory::ALL
        .iter()
        .map(|category| {
            let text = format!("{}:{} ", category.index() + 1, category.title());
            if *category == app.category {
                Span::styled(text, Style::default().fg(Color::Black).bg(Color::LightGreen))
            } else {
                Span::styled(text, Style::default().fg(Color::Gray))
            }
        })
        .collect();
    lines.push(Line::from(tabs));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_dataset_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Dataset ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightCyan));

    let inner = block.inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Source
            Constraint::Length(1), // Counts
            Constraint::Length(1), // Modified
            Constraint::Length(1), // Output filename
            Constraint::Min(0),
        ])
        .split(inner);
    frame.render_widget(block, area);

    frame.render_widget(
        Paragraph::new(format!("Source: {}", app.dataset.path().display())),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(format!(
            "Districts: {} shown of {}",
            app.view.len(),
            app.dataset.len()
        )),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(format!(
            "Modified: {}",
            app.dataset.modified().unwrap_or("N/A")
        )),
        chunks[2],
    );

    let output_filename_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(17), // "Output Filename:"
            Constraint::Min(0),     // Input field
        ])
        .split(chunks[3]);
    frame.render_widget(Paragraph::new("Output Filename:"), output_filename_layout[0]);

    let editing = app.current_mode == AppMode::EditingFilename;
    let filename_input_paragraph = Paragraph::new(app.output_filename_buffer.clone()).style(
        if editing {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Style::default().fg(Color::White)
        },
    );
    frame.render_widget(filename_input_paragraph, output_filename_layout[1]);

    if editing {
        frame.set_cursor(
            output_filename_layout[1].x + app.output_filename_cursor as u16,
            output_filename_layout[1].y,
        );
    }
}

/// Renders a common footer area.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let current_screen_name = match app.current_screen {
        CurrentScreen::Dashboard => "Dashboard",
        CurrentScreen::Help => "Help",
    };

    let current_mode_name = match app.current_mode {
        AppMode::Navigation => "Navigation",
        AppMode::EditingFilename => "Editing Filename",
    };

    let footer_text = Line::from(vec![
        Span::raw("Screen: "),
        Span::styled(
            current_screen_name,
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Mode: "),
        Span::styled(
            current_mode_name,
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Press "),
        Span::styled(
            "q",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Red),
        ),
        Span::raw(" to quit "),
        Span::raw(" | Press "),
        Span::styled(
            "h",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Green),
        ),
        Span::raw(" for Help "),
    ]);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let footer = Paragraph::new(footer_text)
        .alignment(Alignment::Center)
        .block(block)
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend};

    use crate::dataset::fixtures::{self, small};
    use crate::dataset::{AttrValue, Dataset};
    use crate::filter::FilterSelection;
    use crate::legend::SuitabilityLayer;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn dashboard_renders_panels() {
        let mut app = App::new(
            Arc::new(small()),
            FilterSelection::all(),
            ParameterCategory::Crop,
            SuitabilityLayer::Adaptation,
            PathBuf::from("output/"),
            String::from("map.png"),
        );
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Summary Statistics"));
        assert!(text.contains("Cropping Intensity"));
        assert!(text.contains("No statistics available"));
        assert_eq!(app.terminal_width, 140);
    }

    #[test]
    fn total_features_counts_classified_districts() {
        let mut records: Vec<_> = small().records().to_vec();
        for (i, record) in records.iter_mut().enumerate() {
            let value = if i == 0 {
                AttrValue::Text("Highly Suitable".into())
            } else {
                AttrValue::Null
            };
            record.attributes.insert("Adaptation".into(), value);
        }
        let mut columns = fixtures::columns();
        columns.insert("Adaptation".into());
        let dataset = Dataset::new("classes.geojson", columns, records).unwrap();

        let mut app = App::new(
            Arc::new(dataset),
            FilterSelection::all(),
            ParameterCategory::Crop,
            SuitabilityLayer::Adaptation,
            PathBuf::from("output/"),
            String::from("map.png"),
        );
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Total Features: 1"));
        assert!(text.contains("33.3%"));
    }

    #[test]
    fn empty_view_shows_warning() {
        let dataset = crate::dataset::Dataset::new(
            "empty.geojson",
            Default::default(),
            Vec::new(),
        )
        .unwrap();
        let mut app = App::new(
            Arc::new(dataset),
            FilterSelection::all(),
            ParameterCategory::Water,
            SuitabilityLayer::General,
            PathBuf::from("output/"),
            String::from("map.png"),
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("No data available"));
    }
}
