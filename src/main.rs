//! Worldgrid - Entry Point
//!
//! Loads configuration and templates, opens the start map, and runs the
//! terminal editor loop.

use std::fs::OpenOptions;
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use worldgrid::data::{export_builtin_templates, TemplateDir, TemplateRegistry};
use worldgrid::save::{MapDirectory, MapLibrary};
use worldgrid::scene::TileScene;
use worldgrid::ui::App;
use worldgrid::{EditorConfig, MapEditorSession};

/// How long to wait for input before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type Session = MapEditorSession<MapDirectory, TileScene>;

fn main() -> Result<()> {
    // Initialize logging to file (to avoid interfering with TUI)
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("worldgrid.log")
        .or_else(|_| OpenOptions::new().write(true).open("/dev/null"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Worldgrid v{}", env!("CARGO_PKG_VERSION"));

    let config = EditorConfig::load();
    let registry = load_registry(&config);
    let library = MapLibrary::new(
        MapDirectory::new(&config.maps_dir),
        config.default_width,
        config.default_height,
    )
    .context("invalid default map size in config")?;

    let mut session = MapEditorSession::new(registry, library, TileScene::new());
    if let Err(e) = session.initialize(&config.start_map) {
        log::warn!("Could not open '{}': {}, falling back to default map", config.start_map, e);
        session.reset_to_default();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.terrain_seed);
    let result = run_editor_loop(&mut terminal, &mut app, &mut session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Report any errors
    if let Err(ref e) = result {
        log::error!("Editor exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Worldgrid shut down cleanly");
    result
}

/// Templates from the configured directory, seeding it with the builtins on
/// first run
fn load_registry(config: &EditorConfig) -> TemplateRegistry {
    let dir = &config.templates_dir;
    if !dir.exists() {
        if let Err(e) = export_builtin_templates(dir) {
            log::warn!("Failed to export builtin templates: {}", e);
        }
    }

    let mut registry = TemplateRegistry::new();
    if registry.load(&TemplateDir::new(dir)) == 0 {
        log::warn!("No templates in {:?}, using builtins", dir);
        registry = TemplateRegistry::with_builtins();
    }
    registry
}

/// Main editor loop
fn run_editor_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            app.render(frame, session);
        })?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key, session) {
                        Ok(should_quit) if should_quit => break,
                        Ok(_) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }
    }

    Ok(())
}
