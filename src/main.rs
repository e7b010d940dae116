use clap::Parser;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use particle_network::app::{self, App};
use particle_network::color::Rgba;
use particle_network::config::AppConfig;
use particle_network::{logging, ui};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "particle-network")]
#[command(about = "Animated particle network in the terminal")]
struct Args {
    /// Number of particles generated per build (10-2000)
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Edge length of a spatial grid cell, in Braille dots
    #[arg(long = "cell-size")]
    cell_size: Option<f64>,

    /// Radius within which particles connect to the mouse pointer
    #[arg(long = "mouse-range")]
    mouse_range: Option<f64>,

    /// Particle and line color, e.g. "rgba(255, 255, 255, 1)" or "#88ccff"
    #[arg(long = "particle-color")]
    particle_color: Option<Rgba>,

    /// Background color
    #[arg(long = "background-color")]
    background_color: Option<Rgba>,

    /// Target frames per second (1-240)
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for reproducible particle batches
    #[arg(long)]
    seed: Option<u64>,

    /// Load settings from this JSON file instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this file and exit
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Write logs here instead of the cache directory
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// File config, then CLI overrides on top
fn resolve_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            AppConfig::load_from_file(path)?
        }
        None => match AppConfig::default_path().filter(|p| p.exists()) {
            Some(path) => match AppConfig::load_from_file(&path) {
                Ok(config) => {
                    info!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("ignoring {}: {}", path.display(), e);
                    AppConfig::default()
                }
            },
            None => AppConfig::default(),
        },
    };

    let options = &mut config.options;
    if let Some(particles) = args.particles {
        options.number_of_particles = particles.clamp(10, 2000);
    }
    if let Some(cell_size) = args.cell_size {
        options.grid_cell_size = cell_size;
    }
    if let Some(range) = args.mouse_range {
        options.mouse_connection_range = range;
    }
    if let Some(color) = args.particle_color {
        options.particle_color = color;
    }
    if let Some(color) = args.background_color {
        options.background_color = color;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    config.fps = config.fps.clamp(1, 240);

    config.options.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_path = logging::init(args.log_file.as_deref())?;
    let config = resolve_config(&args)?;
    info!("starting with {:?}", config);

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        info!("wrote config to {}", path.display());
        println!("Wrote config to {}", path.display());
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let res = App::new(frame_rect, config.options, config.fps, args.seed)
        .map_err(|e| Box::new(e) as Box<dyn Error>)
        .and_then(|mut app| {
            let save_path = args.config.clone().or_else(AppConfig::default_path);
            run_app(&mut terminal, &mut app, save_path.as_deref())
        });

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("fatal: {}", err);
        eprintln!("Error: {}", err);
        if let Some(path) = log_path {
            eprintln!("See {} for details", path.display());
        }
        std::process::exit(1);
    }

    info!("exiting");
    Ok(())
}

/// Export the running settings; a failed save is logged, not fatal
fn save_settings(app: &App, path: Option<&Path>) {
    let Some(path) = path else {
        warn!("no config directory available, settings not saved");
        return;
    };
    match app.to_config().save_to_file(path) {
        Ok(()) => info!("saved settings to {}", path.display()),
        Err(e) => error!("{}", e),
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    save_path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let frame_duration = Duration::from_secs_f64(1.0 / app.fps as f64);
    let mut last_tick = Instant::now()
        .checked_sub(frame_duration)
        .unwrap_or_else(Instant::now);

    loop {
        let now = Instant::now();
        if now.duration_since(last_tick) >= frame_duration {
            last_tick = now;
            app.tick(now)?;
            terminal.draw(|frame| ui::render(frame, app))?;
        }

        // Poll for events for the rest of the frame budget
        let timeout = frame_duration.saturating_sub(last_tick.elapsed());
        if !event::poll(timeout)? {
            continue;
        }

        let now = Instant::now();
        match event::read()? {
            Event::Key(key) => {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    // System controls
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => app.toggle_pause(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.regenerate()?,
                    KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(now),
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Char('s') | KeyCode::Char('S') => save_settings(app, save_path),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_particles(10)?,
                    KeyCode::Char('-') | KeyCode::Char('_') => app.adjust_particles(-10)?,
                    KeyCode::Char('[') => app.adjust_mouse_range(-10.0),
                    KeyCode::Char(']') => app.adjust_mouse_range(10.0),

                    // Navigation
                    KeyCode::Tab => app.next_focus(),
                    KeyCode::BackTab => app.prev_focus(),
                    KeyCode::Up => {
                        if !app.show_help && app.focus.is_param() {
                            app.adjust_focused_up()?;
                        }
                    }
                    KeyCode::Down => {
                        if !app.show_help && app.focus.is_param() {
                            app.adjust_focused_down()?;
                        }
                    }
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        } else {
                            app.focus = app::Focus::Controls;
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    app.pointer_moved(mouse.column, mouse.row, now)
                }
                _ => {}
            },
            Event::FocusLost => app.pointer_left(now),
            Event::Resize(width, height) => app.resize_terminal(width, height, now),
            _ => {}
        }
    }
}
