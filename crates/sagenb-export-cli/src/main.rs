use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use sagenb_export_config::Config;
use sagenb_export_engine::{Cell, ParseError, Worksheet, io};
use std::{
    env,
    io::stdout,
    path::{Path, PathBuf},
    process,
};

struct App {
    worksheets: Vec<Worksheet>,
    list_state: ListState,
    current_content: Vec<String>,
}

impl App {
    fn new(dot_sage: PathBuf) -> Result<Self> {
        let worksheets = io::all_worksheets(&dot_sage)?;

        let mut app = Self {
            worksheets,
            list_state: ListState::default(),
            current_content: Vec::new(),
        };

        // Select first worksheet if available
        if !app.worksheets.is_empty() {
            app.list_state.select(Some(0));
            app.update_content_for_selection();
        }

        Ok(app)
    }

    fn next_worksheet(&mut self) {
        if self.worksheets.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.worksheets.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_worksheet(&mut self) {
        if self.worksheets.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.worksheets.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn update_content_for_selection(&mut self) {
        if let Some(index) = self.list_state.selected()
            && let Some(worksheet) = self.worksheets.get(index)
        {
            // A broken worksheet only affects its own pane
            self.current_content = match render_worksheet(worksheet) {
                Ok(lines) => lines,
                Err(e) => {
                    log::warn!("Failed to convert {}: {e}", worksheet.unique_id());
                    vec![format!("Error converting worksheet: {e}")]
                }
            };
        }
    }
}

/// Render a worksheet the way it reads after conversion.
fn render_worksheet(worksheet: &Worksheet) -> Result<Vec<String>, ParseError> {
    let mut lines = vec![
        format!("{} ({})", worksheet.name(), worksheet.unique_id()),
        String::new(),
    ];
    for cell in worksheet.cells() {
        lines.extend(render_cell(&cell?));
    }
    Ok(lines)
}

fn render_cell(cell: &Cell) -> Vec<String> {
    let mut lines = Vec::new();
    match cell {
        Cell::Text(text) => {
            lines.extend(text.input().lines().map(str::to_string));
        }
        Cell::Compute(code) => {
            lines.push(format!("In [{}]:", code.index()));
            lines.extend(code.directive_rewrite().lines().map(|l| format!("    {l}")));
            let output = code.visible_output();
            if !output.trim().is_empty() {
                lines.push("Out:".to_string());
                lines.extend(output.lines().map(|l| format!("    {l}")));
            }
        }
    }
    lines.push(String::new());
    lines
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Determine data directory from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let dot_sage;
    let from_config;

    match args.len() {
        1 => match Config::load() {
            Ok(Some(config)) => {
                dot_sage = config.dot_sage;
                from_config = true;
            }
            Ok(None) => {
                dot_sage = Config::default_dot_sage();
                from_config = false;
                log::info!(
                    "No config file at {}, using {}",
                    config_path.display(),
                    dot_sage.display()
                );
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} [sage-data-dir] [worksheet-name-or-id]", args[0]);
                process::exit(1);
            }
        },
        2 | 3 => {
            dot_sage = PathBuf::from(&args[1]);
            from_config = false;
        }
        _ => {
            eprintln!("Usage: {} [sage-data-dir] [worksheet-name-or-id]", args[0]);
            process::exit(1);
        }
    }

    // Validate data directory using engine
    if let Err(e) = io::validate_dot_sage(&dot_sage) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Sage data directory '{}'{} is invalid: {e}",
            dot_sage.display(),
            source
        );
        process::exit(1);
    }

    if args.len() > 1 {
        remember_dot_sage(&dot_sage);
    }

    if let Some(query) = args.get(2) {
        return print_worksheet(&dot_sage, query);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new(dot_sage).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Save the first data directory given on the command line so later runs
/// can omit it. An existing config file is left alone.
fn remember_dot_sage(dot_sage: &Path) {
    let dot_sage = dot_sage
        .canonicalize()
        .unwrap_or_else(|_| dot_sage.to_path_buf());
    match Config::remember(&dot_sage) {
        Ok(true) => log::info!(
            "Saved {} to {}",
            dot_sage.display(),
            Config::config_path().display()
        ),
        Ok(false) => {}
        Err(e) => log::warn!("Could not save config: {e}"),
    }
}

fn print_worksheet(dot_sage: &Path, query: &str) -> Result<()> {
    let worksheet = io::find_worksheet(dot_sage, query)?;
    let lines = render_worksheet(&worksheet)
        .with_context(|| format!("Failed to convert worksheet '{query}'"))?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_worksheet(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_worksheet(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(f.area());

    // Worksheet list panel
    let items: Vec<ListItem> = app
        .worksheets
        .iter()
        .map(|ws| {
            let display_text = format!("{}  {}", ws.unique_id(), ws.name());
            ListItem::new(vec![Line::from(vec![Span::raw(display_text)])])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Worksheets"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    // Converted cells panel
    let content_text = if app.current_content.is_empty() {
        vec![Line::from("No worksheets found")]
    } else {
        app.current_content
            .iter()
            .map(|line| Line::from(vec![Span::raw(line.clone())]))
            .collect()
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Cells"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    // Place help at bottom
    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}
