//! Ratatui-based terminal UI.
//!
//! Two screens: a loan form and a chart view. Submitting the form validates
//! the input, sends the request on a worker thread and switches to the chart
//! once the schedule arrives. Redo discards the chart and shows an empty form.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::chart::ChartState;
use crate::data::{RateResponse, RateService};
use crate::domain::{LoanRequest, RawLoanInput};
use crate::error::AppError;

mod plotters_chart;
pub mod surface;

use surface::{BufferSurface, TerminalSurfaces};

/// Start the TUI.
pub fn run(service: Arc<dyn RateService>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service);
    let result = app.event_loop(&mut terminal);
    app.shutdown();
    result
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

const FORM_FIELDS: [&str; 4] = [
    "Maturity Date (YYYY-MM-DD)",
    "Rate Floor (e.g., 0.02)",
    "Rate Ceiling (e.g., 0.2)",
    "Rate Spread (e.g., 0.01)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Form,
    Chart,
}

/// Blocking notification; must be dismissed before anything else happens.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Popup {
    title: &'static str,
    message: String,
}

#[derive(Debug, Default)]
struct FormState {
    input: RawLoanInput,
    selected: usize,
}

impl FormState {
    fn field_mut(&mut self, idx: usize) -> &mut String {
        match idx {
            0 => &mut self.input.maturity_date,
            1 => &mut self.input.rate_floor,
            2 => &mut self.input.rate_ceiling,
            _ => &mut self.input.rate_spread,
        }
    }

    fn field(&self, idx: usize) -> &str {
        match idx {
            0 => &self.input.maturity_date,
            1 => &self.input.rate_floor,
            2 => &self.input.rate_ceiling,
            _ => &self.input.rate_spread,
        }
    }
}

struct App {
    service: Arc<dyn RateService>,
    tx: Sender<RateResponse>,
    rx: Receiver<RateResponse>,
    screen: Screen,
    form: FormState,
    chart: Option<ChartState<BufferSurface>>,
    surfaces: TerminalSurfaces,
    /// Request the chart was built from.
    request: Option<LoanRequest>,
    /// Bumped on every submit and on redo; responses from older generations are dropped.
    generation: u64,
    pending: Option<u64>,
    popup: Option<Popup>,
    render_error: Option<String>,
    status: String,
}

impl App {
    fn new(service: Arc<dyn RateService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            screen: Screen::Form,
            form: FormState::default(),
            chart: None,
            surfaces: TerminalSurfaces::new(),
            request: None,
            generation: 0,
            pending: None,
            popup: None,
            render_error: None,
            status: "Enter loan parameters.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_responses() {
                needs_redraw = true;
            }

            if needs_redraw || self.chart.as_ref().is_some_and(|c| c.needs_render()) {
                let size = terminal
                    .size()
                    .map_err(|e| AppError::new(4, format!("Terminal size error: {e}")))?;
                self.prepare_chart(Rect::new(0, 0, size.width, size.height));
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply every response that has arrived; true if anything changed.
    fn drain_responses(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.rx.try_recv() {
            self.apply_response(response);
            changed = true;
        }
        changed
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.popup = None;
            }
            return false;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key.code),
            Screen::Chart => self.handle_chart_key(key.code),
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::BackTab => {
                self.form.selected = self.form.selected.checked_sub(1).unwrap_or(FORM_FIELDS.len() - 1);
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form.selected = (self.form.selected + 1) % FORM_FIELDS.len();
            }
            KeyCode::Backspace => {
                self.form.field_mut(self.form.selected).pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.form.field_mut(self.form.selected).push(c);
            }
            KeyCode::Enter => self.submit(),
            _ => {}
        }
        false
    }

    fn handle_chart_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('p') => {
                if let Some(chart) = &mut self.chart {
                    let mode = chart.toggle_mode();
                    self.status = format!("Showing {} values.", mode.display_name().to_lowercase());
                }
            }
            KeyCode::Char('r') => self.redo(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn submit(&mut self) {
        let request = match crate::request::format(&self.form.input) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "form rejected");
                self.popup = Some(Popup {
                    title: "Invalid input",
                    message: err.to_string(),
                });
                return;
            }
        };

        // A submit while another is pending supersedes it.
        self.generation += 1;
        self.pending = Some(self.generation);
        self.status = "Calculating...".to_string();
        info!(generation = self.generation, "submitting loan request");
        crate::data::spawn_request(self.service.clone(), self.generation, request, self.tx.clone());
    }

    fn apply_response(&mut self, response: RateResponse) {
        if self.pending != Some(response.generation) {
            warn!(generation = response.generation, "discarding stale rate response");
            return;
        }
        self.pending = None;

        match response.result {
            Ok(series) => {
                if let Some(mut old) = self.chart.take() {
                    old.dispose();
                }
                let request = response.request;
                self.status = format!("{} rates received.", series.len());
                self.chart = Some(ChartState::present(series, request.rate_floor, request.rate_ceiling));
                self.request = Some(request);
                self.render_error = None;
                self.screen = Screen::Chart;
            }
            Err(err) => {
                self.status = "Rate calculation failed.".to_string();
                self.popup = Some(Popup {
                    title: "Rate service error",
                    message: err.to_string(),
                });
            }
        }
    }

    /// Discard the chart and go back to an empty form.
    fn redo(&mut self) {
        if let Some(mut chart) = self.chart.take() {
            chart.dispose();
        }
        self.generation += 1;
        self.pending = None;
        self.request = None;
        self.render_error = None;
        self.form = FormState::default();
        self.surfaces.set_area(None);
        self.screen = Screen::Form;
        self.status = "Enter loan parameters.".to_string();
    }

    fn export(&mut self) {
        let Some(chart) = &self.chart else {
            return;
        };
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = PathBuf::from(format!("loan-rates-{stamp}.csv"));
        match crate::io::export::write_series_csv(&path, &chart.frame()) {
            Ok(()) => {
                info!(path = %path.display(), "schedule exported");
                self.status = format!("Exported {}", path.display());
            }
            Err(err) => {
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(chart) = &mut self.chart {
            chart.dispose();
        }
        self.pending = None;
    }

    /// Track the chart area and re-render the chart surface when needed.
    fn prepare_chart(&mut self, screen: Rect) {
        let area = (self.screen == Screen::Chart).then(|| chart_inner(body_rect(screen)));
        let resized = self.surfaces.set_area(area);

        let Some(chart) = &mut self.chart else {
            return;
        };
        if resized {
            chart.invalidate();
        }
        if !chart.needs_render() {
            return;
        }
        match chart.render(&mut self.surfaces) {
            Ok(()) => self.render_error = None,
            Err(err) => {
                warn!(error = %err, "chart render failed");
                self.render_error = Some(err.to_string());
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = screen_layout(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Form => self.draw_form(frame, chunks[1]),
            Screen::Chart => self.draw_chart(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        if let Some(popup) = &self.popup {
            draw_popup(frame, popup);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("loan-rates", Style::default().fg(Color::Cyan)),
            Span::raw(" - Loan Rate Chart"),
        ]));

        let summary = match (&self.request, &self.chart) {
            (Some(req), Some(chart)) => format!(
                "{} | maturity: {} | floor: {} | ceiling: {} | spread: {} | mode: {}",
                req.reference_rate.display_name(),
                req.wire_maturity_date(),
                req.rate_floor,
                req.rate_ceiling,
                req.rate_spread,
                chart.display_mode().display_name(),
            ),
            _ => "Loan Calculation Form".to_string(),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FORM_FIELDS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let value = self.form.field(i);
                let cursor = if i == self.form.selected { "_" } else { "" };
                ListItem::new(format!("{label:<28} {value}{cursor}"))
            })
            .collect();

        let title = if self.pending.is_some() {
            "Loan Parameters (calculating...)"
        } else {
            "Loan Parameters"
        };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.form.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Loan Rate Chart").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if let Some(surface) = self.chart.as_ref().and_then(|c| c.surface()) {
            frame.buffer_mut().merge(surface.buffer());
            return;
        }

        let (msg, color) = match &self.render_error {
            Some(err) => (err.clone(), Color::Red),
            None => ("Waiting for data...".to_string(), Color::Yellow),
        };
        frame.render_widget(Paragraph::new(msg).style(Style::default().fg(color)), inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.screen {
            Screen::Form => "↑/↓ select  type to edit  Enter calculate  Esc quit",
            Screen::Chart => "p percent/decimal  r redo  e export  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn screen_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
        .split(area)
}

fn body_rect(screen: Rect) -> Rect {
    screen_layout(screen)[1]
}

/// Chart drawing area inside the bordered chart block.
fn chart_inner(body: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(body)
}

fn draw_popup(frame: &mut ratatui::Frame<'_>, popup: &Popup) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(popup.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )),
    ]);
    let p = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(popup.title)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(p, area);
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
