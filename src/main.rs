// main.rs for the solar suitability dashboard
mod app;
mod category;
mod cli;
mod config;
mod dataset;
mod error;
mod event;
mod export;
mod filter;
mod legend;
mod loader;
mod stats;
mod ui;
mod view;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{Level, debug, info};

use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::event::{Event, EventHandler};
use crate::filter::{FilterSelection, Scope};

fn init_logging(log_file: &Path, verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Warning: could not open log file '{}': {}",
                log_file.display(),
                e
            );
            return;
        }
    };
    if let Err(e) = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
    {
        eprintln!("Warning: could not initialise logging: {}", e);
    }
}

fn print_summary(app: &App) {
    println!("Dataset: {} ({} districts)", app.dataset.path().display(), app.dataset.len());
    println!("States: {}", app.states.join(", "));
    println!("Selection: {}", app.selection);
    println!("Districts shown: {}", app.view.len());

    println!();
    match &app.breakdown {
        Some(breakdown) if !breakdown.shares.is_empty() => {
            println!(
                "{} distribution ({} features):",
                breakdown.layer.title(),
                breakdown.classified
            );
            for share in &breakdown.shares {
                println!(
                    "  {:<40} {:>5}  {:>6.2}%",
                    share.class, share.count, share.percentage
                );
            }
        }
        _ => {
            println!("{} distribution:", app.layer.title());
            println!("  No statistics available");
        }
    }

    println!();
    println!("{} parameters:", app.category.title());
    for summary in &app.parameters {
        println!("  {} [{}]: {}", summary.label, summary.column, summary.value);
    }
}

fn run_dashboard(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let events = EventHandler::new(tick_rate);
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next(tick_rate) {
            Ok(Some(Event::Input(key))) => app.handle_key(key),
            Ok(Some(Event::Mouse(mouse))) => app.handle_mouse(mouse),
            Ok(Some(Event::Resize)) | Ok(Some(Event::Tick)) | Ok(None) => {}
            Err(_) => {
                debug!("event thread stopped");
                break;
            }
        }
    }
    Ok(())
}

/// Runs `body`, then `restore` whatever the outcome. The body's error wins.
fn with_restore<T>(
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

fn start_tui(app: &mut App, tick_rate: Duration) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    with_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            let result = run_dashboard(&mut terminal, app, tick_rate);
            terminal.show_cursor()?;
            result
        },
        restore_terminal,
    )
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    init_logging(&config.log_file, cli.verbose);
    info!(config = %cli.config.display(), "starting solar dashboard");

    let candidates = loader::candidate_list(cli.data.as_deref(), &config.candidates);
    let dataset: Dataset = loader::load_first(&candidates)?;

    let selection = FilterSelection::new(
        cli.state.as_deref().map(Scope::parse).unwrap_or_default(),
        cli.district.as_deref().map(Scope::parse).unwrap_or_default(),
    );
    let category = match cli.category {
        Some(category) => category,
        None => config.category()?,
    };
    let layer = match cli.layer {
        Some(layer) => layer,
        None => config.layer()?,
    };

    let mut app = App::new(
        Arc::new(dataset),
        selection,
        category,
        layer,
        config.output_dir.clone(),
        config.output_filename.clone(),
    );

    if cli.summary {
        print_summary(&app);
        return Ok(());
    }

    start_tui(&mut app, Duration::from_millis(config.tick_rate_ms.max(1)))?;
    info!("dashboard closed");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
