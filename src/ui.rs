//! TUI presentation
//!
//! Features:
//! - Boot splash
//! - Transcript with per-kind colors and the typing effect for AI lines
//! - Input line with history recall and tab completion
//! - Input disabled while a command is executing

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use crate::pages;
use crate::record::{OutputRecord, RecordKind};
use crate::session::{Session, Submission};
use crate::typewriter::{Typewriter, CURSOR};

const BOOT_STEPS: &[&str] = &[
    "BIOS Version 2.1.0",
    "CPU: Virtual Core @ 3.60GHz",
    "Memory Test: 32768MB OK",
    "Initializing Portfolio System...",
    "Loading AI Assistant...",
    "Mounting Terminal Interface...",
    "Boot Complete!",
];

const BOOT_STEP_INTERVAL: Duration = Duration::from_millis(150);
const BOOT_DURATION: Duration = Duration::from_millis(1000);
const CURSOR_BLINK: Duration = Duration::from_millis(530);

pub struct UiOptions {
    pub typing_delay: Duration,
    pub boot_splash: bool,
}

// ═══════════════════════════════════════════════════════════════
// BOOT SPLASH
// ═══════════════════════════════════════════════════════════════

fn run_boot(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, assistant_online: bool) -> Result<()> {
    let start = Instant::now();

    while start.elapsed() < BOOT_DURATION {
        let step = ((start.elapsed().as_millis() / BOOT_STEP_INTERVAL.as_millis()) as usize)
            .min(BOOT_STEPS.len() - 1);

        terminal.draw(|f| render_boot(f, step, assistant_online))?;

        if event::poll(Duration::from_millis(30))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn render_boot(f: &mut Frame, step: usize, assistant_online: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(BOOT_STEPS.len() as u16),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.size());

    let green = Style::default().fg(Color::Green);

    let header = Paragraph::new(format!("PORTFOLIO BIOS {}", pages::VERSION))
        .style(green.add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    let lines: Vec<Line> = BOOT_STEPS[..=step]
        .iter()
        .map(|s| Line::from(vec![Span::styled("✓ ", green), Span::raw(*s)]))
        .collect();
    f.render_widget(Paragraph::new(lines).style(green), chunks[1]);

    let ratio = (step + 1) as f64 / BOOT_STEPS.len() as f64;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .gauge_style(green)
        .ratio(ratio);
    f.render_widget(gauge, chunks[2]);

    let status = format!(
        "System Ready: {}  AI Assistant: {}  Terminal: {}",
        if step + 1 == BOOT_STEPS.len() { "YES" } else { "NO" },
        match (step >= 4, assistant_online) {
            (false, _) => "OFFLINE",
            (true, true) => "ONLINE",
            (true, false) => "DEMO",
        },
        if step >= 5 { "READY" } else { "LOADING" },
    );
    f.render_widget(Paragraph::new(status).style(Style::default().fg(Color::DarkGray)), chunks[3]);
}

// ═══════════════════════════════════════════════════════════════
// MAIN TUI
// ═══════════════════════════════════════════════════════════════

struct TuiState {
    input: String,
    /// Lines scrolled up from the bottom
    scroll_back: u16,
    /// AI record currently being typed
    typing: Option<(Uuid, Typewriter)>,
    /// Transcript length already inspected for new AI records
    seen: usize,
    started: Instant,
}

impl TuiState {
    fn new(seen: usize) -> Self {
        Self {
            input: String::new(),
            scroll_back: 0,
            typing: None,
            seen,
            started: Instant::now(),
        }
    }

    /// Start the typing effect for the newest unseen AI record
    fn track_new_records(&mut self, transcript: &[OutputRecord], delay: Duration) {
        if transcript.len() < self.seen {
            // Cleared
            self.seen = 0;
            self.typing = None;
        }
        for record in &transcript[self.seen..] {
            if record.kind == RecordKind::Ai {
                if let Some((_, tw)) = self.typing.as_mut() {
                    tw.skip();
                }
                self.typing = Some((record.id, Typewriter::new(&record.content, delay)));
                self.scroll_back = 0;
            }
        }
        self.seen = transcript.len();
    }

    fn cursor_visible(&self) -> bool {
        (self.started.elapsed().as_millis() / CURSOR_BLINK.as_millis()) % 2 == 0
    }
}

/// Run the interactive session until Esc / Ctrl-C
pub async fn run_tui(session: Session, options: UiOptions) -> Result<()> {
    let mut terminal = setup_terminal()?;

    // Panics print to stderr by default, which would tear the alternate screen
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|info| tracing::error!("panic: {}", info)));

    let result = run_tui_loop(&mut terminal, session, &options).await;

    let _ = std::panic::take_hook();
    std::panic::set_hook(previous_hook);
    restore_terminal(terminal)?;
    result
}

async fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut session: Session,
    options: &UiOptions,
) -> Result<()> {
    if options.boot_splash {
        run_boot(terminal, session.interpreter().delegate().is_configured())?;
    }

    let mut state = TuiState::new(session.transcript().len());
    let (tx, mut rx) = mpsc::channel::<OutputRecord>(8);

    loop {
        // Results from the in-flight assistant task
        while let Ok(record) = rx.try_recv() {
            session.resolve(record);
        }
        state.track_new_records(session.transcript(), options.typing_delay);

        terminal.draw(|f| render_tui(f, &state, &session))?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Global controls
        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::PageUp => {
                state.scroll_back = state.scroll_back.saturating_add(5);
                continue;
            }
            KeyCode::PageDown => {
                state.scroll_back = state.scroll_back.saturating_sub(5);
                continue;
            }
            _ => {}
        }

        if session.is_executing() {
            continue;
        }

        match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(&mut state.input);
                if let Some((_, tw)) = state.typing.as_mut() {
                    tw.skip();
                }
                state.scroll_back = 0;
                match session.submit(&line) {
                    Submission::Pending(task) => {
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let record = task.await;
                            let _ = tx.send(record).await;
                        });
                    }
                    Submission::Ignored => state.input = line,
                    Submission::Completed | Submission::Reset | Submission::Rejected => {}
                }
            }
            KeyCode::Up => state.input = session.history_prev(&state.input),
            KeyCode::Down => state.input = session.history_next(&state.input),
            KeyCode::Tab => {
                if let Some(completed) = session.complete(&state.input) {
                    state.input = completed;
                }
            }
            KeyCode::Char(c) => state.input.push(c),
            KeyCode::Backspace => {
                state.input.pop();
            }
            _ => {}
        }
    }

    Ok(())
}

fn kind_style(kind: RecordKind) -> Style {
    match kind {
        RecordKind::Command => Style::default().fg(Color::Cyan),
        RecordKind::Error => Style::default().fg(Color::Red),
        RecordKind::Ai => Style::default().fg(Color::Yellow),
        RecordKind::Output => Style::default().fg(Color::Green),
    }
}

fn transcript_lines<'a>(session: &'a Session, state: &TuiState) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for record in session.transcript() {
        let style = kind_style(record.kind);
        let text = match (&state.typing, record.kind) {
            (Some((id, tw)), RecordKind::Ai) if *id == record.id => tw.frame(),
            (_, RecordKind::Command) => format!("$ {}", record.content),
            _ => record.content.clone(),
        };
        for line in text.split('\n') {
            lines.push(Line::styled(line.to_string(), style));
        }
    }
    lines
}

/// Rows a set of lines occupies once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|l| {
            let w: usize = l.spans.iter().map(|s| s.content.width()).sum();
            w.max(1).div_ceil(width)
        })
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_tui(f: &mut Frame, state: &TuiState, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(5),    // Transcript
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(f.size());

    let handle = &session.interpreter().profile().handle;
    let title = Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Red)),
        Span::styled("● ", Style::default().fg(Color::Yellow)),
        Span::styled("● ", Style::default().fg(Color::Green)),
        Span::raw(format!(" {}@portfolio:~$", handle)),
        Span::styled(format!("   Terminal {}", pages::VERSION), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(title).style(Style::default().bg(Color::DarkGray)), chunks[0]);

    // Transcript pinned to the bottom unless scrolled back
    let body = chunks[1];
    let lines = transcript_lines(session, state);
    let inner_width = body.width.saturating_sub(2);
    let inner_height = body.height.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let offset = total
        .saturating_sub(inner_height)
        .saturating_sub(state.scroll_back);
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(para, body);

    // Input
    let executing = session.is_executing();
    let mut input_spans = vec![
        Span::styled("$ ", Style::default().fg(Color::Green)),
        Span::styled(state.input.clone(), Style::default().fg(Color::Green)),
    ];
    if !executing && state.cursor_visible() {
        input_spans.push(Span::styled(CURSOR.to_string(), Style::default().fg(Color::Green)));
    }
    let input_title = if executing { "Processing..." } else { "" };
    let input = Paragraph::new(Line::from(input_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(input_title, Style::default().fg(Color::Yellow))),
    );
    f.render_widget(input, chunks[2]);

    let status = Paragraph::new(" ↑/↓ history | Tab complete | PgUp/PgDn scroll | Esc quit")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(status, chunks[3]);
}

// ═══════════════════════════════════════════════════════════════
// TERMINAL SETUP
// ═══════════════════════════════════════════════════════════════

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
