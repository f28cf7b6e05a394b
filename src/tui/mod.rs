//! TUI module - Terminal progress dashboard with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::catalog::TOTAL_WEEKS;
use crate::session::WorkoutSummary;
use crate::store::{ProgressStore, WeeklyProgress};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for the dashboard.
pub struct App {
    store: ProgressStore,
    week: u32,
    progress: WeeklyProgress,
    streak: u32,
    completions: Vec<String>,
    last_workout: Option<WorkoutSummary>,
    should_quit: bool,
}

impl App {
    pub fn new(store: ProgressStore) -> Result<Self> {
        let mut app = Self {
            store,
            week: 1,
            progress: WeeklyProgress {
                completed: 0,
                total: 3,
                percentage: 0,
            },
            streak: 0,
            completions: Vec::new(),
            last_workout: None,
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    fn refresh(&mut self) -> Result<()> {
        self.week = self.store.current_week()?;
        self.progress = self.store.weekly_progress()?;
        self.streak = self.store.streak()?;
        let mut completions = self.store.completion_keys()?;
        completions.reverse(); // newest first
        self.completions = completions;
        self.last_workout = self.store.last_workout()?;
        Ok(())
    }

    /// Run the dashboard loop.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let streak_label = if self.streak > 0 {
            format!(" | streak: {} days", self.streak)
        } else {
            String::new()
        };
        let header = Paragraph::new(format!(
            "FitFlow - Week {} of {TOTAL_WEEKS}{streak_label}",
            self.week
        ))
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Weekly progress gauge
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                "This week: {}/{} workouts",
                self.progress.completed, self.progress.total
            )))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(self.progress.percentage.min(100) as u16);
        frame.render_widget(gauge, chunks[1]);

        // Completion history (key format: week-day-date)
        let rows: Vec<Row> = self
            .completions
            .iter()
            .map(|key| {
                let mut parts = key.splitn(3, '-');
                Row::new(vec![
                    Cell::from(parts.next().unwrap_or("?").to_string()),
                    Cell::from(parts.next().unwrap_or("?").to_string()),
                    Cell::from(parts.next().unwrap_or("?").to_string()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Min(12),
            ],
        )
        .header(Row::new(vec!["Week", "Day", "Date"]).style(Style::default().bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Completed Workouts"),
        );

        frame.render_widget(table, chunks[2]);

        // Footer
        let last = self
            .last_workout
            .as_ref()
            .map(|w| {
                format!(
                    "last: day {} | {}:{:02} | {} kcal",
                    w.day_type,
                    w.duration / 60,
                    w.duration % 60,
                    w.calories_burned
                )
            })
            .unwrap_or_else(|| "no workouts yet".to_string());
        let footer = Paragraph::new(format!("q: quit | r: refresh | {last}"))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => self.should_quit = true,
                        KeyCode::Char('r') => {
                            self.refresh()?;
                        }
                        _ => {}
                    }
                }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
