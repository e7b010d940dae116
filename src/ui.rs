use crate::app::{App, Focus};
use crate::network::TickOutcome;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Area inside the canvas border, where particles are drawn
pub fn get_canvas_area(frame_area: Rect, fullscreen: bool) -> Rect {
    let left = if fullscreen { 0 } else { SIDEBAR_WIDTH.min(frame_area.width) };
    Rect {
        x: frame_area.x + left + 1,
        y: frame_area.y + 1,
        width: frame_area.width.saturating_sub(left + 2),
        height: frame_area.height.saturating_sub(2),
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Status
            Constraint::Length(5), // Parameters
            Constraint::Min(8),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Particle Network ");
    let network = &app.network;

    let status_text = app.status();
    let status_color = match status_text {
        "PAUSED" => HIGHLIGHT_COLOR,
        "REBUILDING" | "STOPPED" => DIM_TEXT_COLOR,
        _ => Color::Green,
    };

    let (grid_text, occupied) = match network.grid() {
        Some(grid) => (
            format!("{}x{}", grid.num_cols(), grid.num_rows()),
            grid.occupied_cells().to_string(),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    let stats = match app.last_outcome {
        TickOutcome::Advanced(stats) | TickOutcome::Paused(stats) => Some(stats),
        TickOutcome::Suspended => None,
    };
    let links = stats.map_or("-".to_string(), |s| s.connections.to_string());
    let pointer_links = stats.map_or("-".to_string(), |s| s.pointer_connections.to_string());

    let pointer_text = match network.pointer() {
        Some(p) => format!("{:.0},{:.0}", p.x, p.y),
        None => "none".to_string(),
    };

    let line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<9}", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let content = vec![
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
        line("Points", network.particles().len().to_string()),
        line("Grid", grid_text),
        line("Occupied", occupied),
        line("Links", links),
        line("Pointer", pointer_links),
        line("Cursor", pointer_text),
        line("Frames", app.frames.to_string()),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let options = app.network.options();

    let content = vec![
        make_line(
            "Cell",
            format!("{:.0}", options.grid_cell_size),
            app.focus == Focus::CellSize,
        ),
        make_line(
            "Mouse",
            format!("{:.0}", options.mouse_connection_range),
            app.focus == Focus::MouseRange,
        ),
        make_line(
            "Particles",
            format!("{}", options.number_of_particles),
            app.focus == Focus::Particles,
        ),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, _app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume"),
        make_control("R", "regenerate"),
        make_control("+/-", "particles"),
        make_control("[/]", "mouse range"),
        make_control("Tab", "select param"),
        make_control("↑/↓", "adjust param"),
        make_control("V", "fullscreen"),
        make_control("S", "save settings"),
        make_control("H", "help"),
        make_control("Q", "quit"),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let background = app.surface.background().to_color();
    let block = styled_block("").style(Style::default().bg(background));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buffer = frame.buffer_mut();
    for cell in app.surface.cells() {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buffer.cell_mut(Position::new(x, y)) {
                target.set_char(cell.char).set_fg(cell.color).set_bg(background);
            }
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(26);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("PARTICLE NETWORK", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Points drift across the canvas and bounce off its edges. Points closer than their range are joined by a line that fades with distance."),
        Line::from(""),
        Line::from(Span::styled("POINTER:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Move the mouse over the canvas to pull lines towards it. [/] change how far it reaches."),
        Line::from(""),
        Line::from(Span::styled("GRID:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Neighbours are looked up through a uniform grid. Tab to Cell and use arrows to change its cell size."),
        Line::from(""),
        Line::from(Span::styled("RESIZE:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Resizing the terminal rebuilds the network once the resize settles."),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Space=Pause, R=Regenerate, +/-=Particles, V=Fullscreen, S=Save settings, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
