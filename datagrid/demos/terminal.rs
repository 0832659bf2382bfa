//! Browse, sort, filter and edit 10,000 records in the terminal.
//!
//! Keys: arrows / PageUp / PageDown / Home / End move, Left / Right pick a
//! column, `s` toggles sort, `/` filters, `e` or Enter edits, `q` quits.
//! Logs go to `terminal.log`.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal,
};
use datagrid::{
    EventKind, Grid, GridConfig, GridEvent, Record, RenderSurface, ScrollRequest, SortDirection,
    SurfaceSignal, ViewportBounds,
};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const COLUMNS: [&str; 4] = ["Name", "Age", "City", "Id"];
const WIDTHS: [usize; 4] = [16, 5, 14, 8];

const NAMES: [&str; 8] = [
    "Ada", "björn", "Chloé", "dmitri", "Émile", "Farah", "gus", "Hana",
];
const CITIES: [&str; 6] = ["Berlin", "Paris", "Zürich", "Oslo", "Kyoto", "Lisbon"];

// =============================================================================
// Surface
// =============================================================================

/// A rendered body line.
struct RowLine {
    text: String,
}

struct TerminalSurface {
    offset: u32,
    height: u32,
}

impl RenderSurface for TerminalSurface {
    type Handle = RowLine;

    fn materialize(&mut self, record: &Record, _derived_index: usize) -> RowLine {
        let text = record
            .cells()
            .iter()
            .zip(WIDTHS)
            .map(|(cell, width)| fit(cell, width))
            .collect::<Vec<_>>()
            .join(" ");
        RowLine { text }
    }

    fn dispose(&mut self, _handle: RowLine) {}

    fn viewport_bounds(&self) -> ViewportBounds {
        ViewportBounds::new(self.offset, self.height)
    }

    fn scroll_to(&mut self, offset: u32) {
        self.offset = offset;
    }
}

/// Truncate or pad `s` to exactly `width` columns.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

// =============================================================================
// Terminal guard
// =============================================================================

struct Screen {
    stdout: io::Stdout,
}

impl Screen {
    fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// =============================================================================
// App
// =============================================================================

enum Mode {
    Browse,
    Filter(String),
    Edit(String),
}

struct App {
    grid: Grid<TerminalSurface>,
    mode: Mode,
    cursor: usize,
    column: usize,
    status: Rc<RefCell<String>>,
}

impl App {
    fn column_name(&self) -> &'static str {
        COLUMNS[self.column]
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.grid.view().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
        self.grid.scroll(ScrollRequest::IntoView(self.cursor));
    }

    fn report(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = message.into();
    }

    /// Returns false to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let page = self.grid.viewport().viewport_extent as isize;
        match &mut self.mode {
            Mode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return false,
                KeyCode::Up => self.move_cursor(-1),
                KeyCode::Down => self.move_cursor(1),
                KeyCode::PageUp => self.move_cursor(-page),
                KeyCode::PageDown => self.move_cursor(page),
                KeyCode::Home => self.move_cursor(isize::MIN),
                KeyCode::End => self.move_cursor(isize::MAX),
                KeyCode::Left => self.column = self.column.saturating_sub(1),
                KeyCode::Right => self.column = (self.column + 1).min(COLUMNS.len() - 1),
                KeyCode::Char('s') => {
                    let column = self.column_name();
                    match self.grid.toggle_sort(column) {
                        Ok(direction) => self.report(format!("sorted {column} {direction:?}")),
                        Err(e) => self.report(e.to_string()),
                    }
                }
                KeyCode::Char('/') => self.mode = Mode::Filter(String::new()),
                KeyCode::Char('e') | KeyCode::Enter => {
                    let signal = SurfaceSignal::DoubleActivate {
                        row: self.cursor,
                        col: self.column_name().to_string(),
                    };
                    match self.grid.dispatch(signal) {
                        Ok(()) => {
                            let draft = self
                                .grid
                                .edit_session()
                                .map(|s| s.draft.clone())
                                .unwrap_or_default();
                            self.mode = Mode::Edit(draft);
                        }
                        Err(e) => self.report(e.to_string()),
                    }
                }
                _ => {}
            },
            Mode::Filter(text) => {
                match key.code {
                    KeyCode::Enter => self.mode = Mode::Browse,
                    KeyCode::Esc => {
                        self.grid.clear_filter();
                        self.mode = Mode::Browse;
                    }
                    KeyCode::Backspace => {
                        text.pop();
                        self.grid.filter(text);
                    }
                    KeyCode::Char(c) => {
                        text.push(c);
                        self.grid.filter(text);
                    }
                    _ => {}
                }
                self.move_cursor(0);
            }
            Mode::Edit(draft) => {
                let signal = match key.code {
                    KeyCode::Enter => Some(SurfaceSignal::Blur {
                        draft: draft.clone(),
                    }),
                    KeyCode::Esc => Some(SurfaceSignal::Cancel),
                    KeyCode::Backspace => {
                        draft.pop();
                        self.grid.set_draft(draft.clone());
                        None
                    }
                    KeyCode::Char(c) => {
                        draft.push(c);
                        self.grid.set_draft(draft.clone());
                        None
                    }
                    _ => None,
                };
                if let Some(signal) = signal {
                    self.mode = Mode::Browse;
                    if let Err(e) = self.grid.dispatch(signal) {
                        self.report(e.to_string());
                    }
                    self.move_cursor(0);
                }
            }
        }
        true
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;

        let sort = self.grid.sort_key();
        let header = COLUMNS
            .iter()
            .zip(WIDTHS)
            .enumerate()
            .map(|(i, (name, width))| {
                let marker = match sort {
                    Some(key) if key.column == i => match key.direction {
                        SortDirection::Ascending => " ^",
                        SortDirection::Descending => " v",
                    },
                    _ => "",
                };
                let label = format!("{name}{marker}");
                if i == self.column {
                    fit(&format!("[{label}]"), width)
                } else {
                    fit(&label, width)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            Print(header),
            SetAttribute(Attribute::Reset)
        )?;

        let viewport = self.grid.viewport();
        let top = (viewport.scroll_offset / viewport.row_extent) as usize;
        for y in 0..viewport.viewport_extent as usize {
            let index = top + y;
            let Some(line) = self.grid.materialized().handle(index) else {
                break;
            };
            queue!(out, cursor::MoveTo(0, y as u16 + 1))?;
            if index == self.cursor {
                queue!(
                    out,
                    SetAttribute(Attribute::Reverse),
                    Print(&line.text),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(out, Print(&line.text))?;
            }
        }

        let prompt = match &self.mode {
            Mode::Browse => format!(
                "{}/{} rows | {}",
                self.grid.view().len(),
                self.grid.len(),
                self.status.borrow()
            ),
            Mode::Filter(text) => format!("filter: {text}"),
            Mode::Edit(draft) => format!("edit {}: {draft}", self.column_name()),
        };
        let bottom = viewport.viewport_extent as u16 + 1;
        let total: usize = WIDTHS.iter().sum::<usize>() + WIDTHS.len();
        let prompt = if prompt.width() > total {
            fit(&prompt, total)
        } else {
            prompt
        };
        queue!(out, cursor::MoveTo(0, bottom), Print(prompt))?;
        out.flush()
    }
}

fn records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::from(vec![
                format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len()),
                ((i * 37) % 90 + 10).to_string(),
                CITIES[(i / 3) % CITIES.len()].to_string(),
                i.to_string(),
            ])
        })
        .collect()
}

fn main() -> io::Result<()> {
    let log_file = File::create("terminal.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let mut screen = Screen::new()?;
    let (_, rows) = terminal::size()?;

    let surface = TerminalSurface {
        offset: 0,
        height: u32::from(rows.saturating_sub(2)),
    };
    let config = GridConfig::new("terminal").overscan(5);
    let grid = Grid::with_records(COLUMNS, records(10_000), surface, config)
        .map_err(io::Error::other)?;

    let mut app = App {
        grid,
        mode: Mode::Browse,
        cursor: 0,
        column: 0,
        status: Rc::new(RefCell::new(String::from("ready"))),
    };

    let status = app.status.clone();
    app.grid.on(EventKind::Change, move |event, _| {
        let GridEvent::Change(change) = event else {
            return;
        };
        if !change.is_cell_edit() {
            return;
        }
        info!("Cell changed: {:?}", change);
        *status.borrow_mut() = format!(
            "row {} {}: {} -> {}",
            change.row.unwrap_or_default(),
            change.col.as_deref().unwrap_or(""),
            change.old_value.as_deref().unwrap_or(""),
            change.new_value.as_deref().unwrap_or("")
        );
    });

    loop {
        app.draw(&mut screen.stdout)?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !app.handle_key(key) {
                    break;
                }
            }
            Event::Resize(_, rows) => {
                app.grid.surface_mut().height = u32::from(rows.saturating_sub(2));
                app.grid
                    .dispatch(SurfaceSignal::Resize)
                    .map_err(io::Error::other)?;
                app.move_cursor(0);
            }
            _ => {}
        }
    }

    info!(
        "Exiting with {} materialized rows",
        app.grid.materialized().len()
    );
    Ok(())
}
