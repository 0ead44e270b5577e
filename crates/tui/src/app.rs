use std::{io, thread, time::Duration};

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info, warn};
use trivia_core::{
    config::AppConfig,
    game::{Game, GameError, Phase},
    models::Question,
    repository::{LoadError, QuestionRepository},
    scoring::WinnerResult,
    session::SessionError,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_NAMES_LEN: usize = 256;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Register,
    Categories,
    Play,
    Winner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AlertModal {
    title: String,
    message: String,
}

impl AlertModal {
    fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    QuestionsLoaded(Result<Vec<Question>, LoadError>),
}

/// Terminal frontend driving a [`Game`].
pub struct TriviaApp {
    repository: QuestionRepository,
    game: Game,
    state: UiState,
    pending_load: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl TriviaApp {
    pub fn new(repository: QuestionRepository, config: &AppConfig) -> Self {
        Self::with_game(repository, Game::from_config(config))
    }

    fn with_game(repository: QuestionRepository, game: Game) -> Self {
        Self {
            repository,
            game,
            state: UiState::default(),
            pending_load: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state
            .set_status(format!("Questions from {}", self.repository.source()));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn screen(&self) -> Screen {
        match self.game.phase() {
            Phase::Registration => Screen::Register,
            Phase::CategorySelection => Screen::Categories,
            Phase::Playing => Screen::Play,
            Phase::Finished(_) => Screen::Winner,
        }
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if let Err(err) = self.handle_key(key) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            Some(AppEvent::QuestionsLoaded(result)) => {
                self.pending_load = false;
                self.apply_loaded_questions(result);
                true
            }
            None => false,
        }
    }

    fn apply_loaded_questions(&mut self, result: Result<Vec<Question>, LoadError>) {
        match result {
            Ok(questions) => match self.game.attach_questions(questions) {
                Ok(categories) => {
                    self.state.category_cursor = 0;
                    self.state
                        .set_status(format!("{categories} categories ready, pick one to start"));
                }
                Err(err) => {
                    warn!(%err, "Loaded questions could not be used");
                    self.state.alert = Some(AlertModal::new("Cannot start", err.to_string()));
                }
            },
            Err(err) => {
                error!(%err, "Question load failed");
                self.state.alert = Some(AlertModal::new(
                    "Loading failed",
                    format!("Failed to load the questions: {err}"),
                ));
                self.state.set_status("Fix the question source and try again".to_string());
            }
        }
    }

    fn start_question_load(&mut self) -> Result<()> {
        if self.pending_load {
            return Ok(());
        }
        let sender = self
            .event_tx
            .clone()
            .ok_or_else(|| anyhow!("event loop is not running"))?;

        self.pending_load = true;
        self.state.set_status("Loading questions…".to_string());
        let repository = self.repository.clone();
        spawn(async move {
            let result = repository.load().await;
            if sender.send(AppEvent::QuestionsLoaded(result)).await.is_err() {
                warn!("Question load finished after the UI closed");
            }
        });
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.alert = None;
            }
            return Ok(());
        }
        if self.state.show_help {
            self.state.show_help = false;
            return Ok(());
        }
        if key.code == KeyCode::F(1) {
            self.state.show_help = true;
            return Ok(());
        }

        match self.screen() {
            Screen::Register => self.handle_register_key(key),
            Screen::Categories => self.handle_category_key(key),
            Screen::Play => self.handle_play_key(key),
            Screen::Winner => self.handle_winner_key(key),
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Enter => self.submit_names()?,
            KeyCode::Backspace => {
                self.state.name_input.pop();
            }
            KeyCode::Char(c) => {
                if (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
                    && self.state.name_input.chars().count() < MAX_NAMES_LEN
                {
                    self.state.name_input.push(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_names(&mut self) -> Result<()> {
        if self.pending_load {
            self.state
                .set_status("Still loading questions, please wait".to_string());
            return Ok(());
        }
        match self.game.register_players(&self.state.name_input) {
            Ok(count) => {
                info!(players = count, "Players registered from UI");
                self.state.player_cursor = 0;
                self.start_question_load()
            }
            Err(GameError::Score(_)) => {
                self.state.alert = Some(AlertModal::new(
                    "Players",
                    "Enter the players' names separated by commas.",
                ));
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn handle_category_key(&mut self, key: KeyEvent) -> Result<()> {
        let total = self.game.categories().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('?') => self.state.show_help = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_category_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_category_cursor(-1, total),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Enter => {
                let Some(category) = self.game.categories().get(self.state.category_cursor).cloned()
                else {
                    self.state.alert = Some(AlertModal::new(
                        "Categories",
                        "Please choose a question category.",
                    ));
                    return Ok(());
                };
                self.game.choose_category(&category)?;
                self.state.revealed = false;
                self.state.set_status(format!("Playing {category}"));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_play_key(&mut self, key: KeyEvent) -> Result<()> {
        let players = self.game.players().len();
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('?') => self.state.show_help = true,
            KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::Right => {
                let result = self.game.next_question().map(|_| ());
                self.after_navigation(result)?;
            }
            KeyCode::Char('p') | KeyCode::Left => {
                let result = self.game.previous_question().map(|_| ());
                self.after_navigation(result)?;
            }
            KeyCode::Char('a') | KeyCode::Enter => self.state.revealed = true,
            KeyCode::Char('c') | KeyCode::Esc => {
                self.game.back_to_categories()?;
                self.state.set_status("Pick a category".to_string());
            }
            KeyCode::Char('r') => self.restart(),
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                self.state.move_player_cursor(1, players)
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                self.state.move_player_cursor(-1, players)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < players {
                    self.state.player_cursor = index;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_score(true)?,
            KeyCode::Char('-') => self.adjust_score(false)?,
            _ => {}
        }
        Ok(())
    }

    fn after_navigation(&mut self, result: Result<(), GameError>) -> Result<()> {
        match result {
            Ok(()) => {
                self.state.revealed = false;
                let session = self.game.session();
                self.state.set_status(format!(
                    "Question {} · {} left in {}",
                    session.history_len(),
                    session.remaining(),
                    session.selected_category().unwrap_or_default()
                ));
                Ok(())
            }
            Err(GameError::Session(SessionError::Exhausted { category })) => {
                self.state.revealed = false;
                self.state.alert = Some(AlertModal::new(
                    "Category finished",
                    format!(
                        "All questions in '{category}' have been asked. Choose another category to keep playing."
                    ),
                ));
                self.state.set_status("Pick a category".to_string());
                Ok(())
            }
            Err(GameError::Session(SessionError::NoPreviousQuestion)) => {
                self.state.alert = Some(AlertModal::new(
                    "Previous question",
                    "There is no previous question.",
                ));
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn adjust_score(&mut self, award: bool) -> Result<()> {
        let index = self.state.player_cursor;
        let update = if award {
            self.game.award(index)?
        } else {
            self.game.deduct(index)?
        };
        self.state
            .set_status(format!("{}: {} points", update.name, update.score));
        if let Some(result) = update.game_over {
            info!(?result, "Game finished");
            self.state
                .set_status(format!("{} reached {} points", update.name, update.score));
        }
        Ok(())
    }

    fn handle_winner_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('r') | KeyCode::Enter => self.restart(),
            _ => {}
        }
        Ok(())
    }

    fn restart(&mut self) {
        self.game.restart();
        self.state.reset_for_new_game();
        self.state
            .set_status("New game: enter the players' names".to_string());
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.screen() {
            Screen::Register => self.draw_register(frame, chunks[1]),
            Screen::Categories => self.draw_categories(frame, chunks[1]),
            Screen::Play => self.draw_play(frame, chunks[1]),
            Screen::Winner => self.draw_winner(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);

        if self.state.show_help {
            self.render_help(frame);
        }
        if let Some(alert) = &self.state.alert {
            self.render_alert(frame, alert);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let subtitle = match self.screen() {
            Screen::Register => "Register players",
            Screen::Categories => "Choose a category",
            Screen::Play => "Question round",
            Screen::Winner => "Results",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "TRIVIA",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" · {subtitle}"), Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn draw_register(&self, frame: &mut Frame, area: Rect) {
        let width = 64.min(area.width.max(1));
        let form_area = centered_rect(width, 8, area);
        frame.render_widget(Clear, form_area);

        let loading = if self.pending_load {
            Line::from(Span::styled(
                "Loading questions…",
                Style::default().fg(self.theme.warning),
            ))
        } else {
            Line::from("")
        };
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.state.name_input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" start  "),
            Span::styled("F1", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" help  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from("Player names, separated by commas"),
            input_line,
            Line::from(""),
            helper,
            loading,
        ])
        .block(Block::default().borders(Borders::ALL).title("Players"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, form_area);

        let cursor_x = (form_area.x + 3 + self.state.name_input.chars().count() as u16)
            .min(form_area.x + form_area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, form_area.y + 2);
    }

    fn draw_categories(&self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let items: Vec<ListItem> = self
            .game
            .categories()
            .iter()
            .enumerate()
            .map(|(idx, category)| {
                let marker = if idx == self.state.category_cursor {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(
                        category.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.state.category_cursor));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Categories"))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, body[0], &mut list_state);

        self.render_scoreboard(frame, body[1], false);
    }

    fn draw_play(&self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(3)])
            .split(body[0]);

        self.render_question(frame, left[0]);
        self.render_play_keys(frame, left[1]);
        self.render_scoreboard(frame, body[1], true);
    }

    fn render_question(&self, frame: &mut Frame, area: Rect) {
        let Some(question) = self.game.current_question() else {
            let empty = Paragraph::new("No questions left.")
                .block(Block::default().borders(Borders::ALL).title("Question"));
            frame.render_widget(empty, area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                question.text.clone(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (idx, option) in question.options.iter().enumerate() {
            let style = if self.state.revealed && idx == question.correct_index {
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            let marker = if self.state.revealed && idx == question.correct_index {
                "✓"
            } else {
                " "
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} {}. {option}", idx + 1),
                style,
            )));
        }

        let session = self.game.session();
        let title = format!(
            "{} · question {} · {} left",
            question.category,
            session.history_len(),
            session.remaining()
        );
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_play_keys(&self, frame: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled("n", bold),
            Span::raw(" next  "),
            Span::styled("p", bold),
            Span::raw(" previous  "),
            Span::styled("a", bold),
            Span::raw(" answer  "),
            Span::styled("+/-", bold),
            Span::raw(" score  "),
            Span::styled("c", bold),
            Span::raw(" categories  "),
            Span::styled("?", bold),
            Span::raw(" help"),
        ]);
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn render_scoreboard(&self, frame: &mut Frame, area: Rect, show_cursor: bool) {
        let target = self.game.winning_score();
        let lines: Vec<Line> = self
            .game
            .players()
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                let selected = show_cursor && idx == self.state.player_cursor;
                let marker = if selected { "▶" } else { " " };
                let style = if selected {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                Line::from(Span::styled(
                    format!("{marker} {}. {:<16} {:>3}", idx + 1, player.name, player.score),
                    style,
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Scores · first to {target}")),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_winner(&self, frame: &mut Frame, area: Rect) {
        let Phase::Finished(result) = self.game.phase() else {
            return;
        };
        let colour = match result {
            WinnerResult::NoPlayers => self.theme.muted,
            WinnerResult::SingleWinner { .. } => self.theme.success,
            WinnerResult::TiedWinners { .. } => self.theme.warning,
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                result.message(),
                Style::default().fg(colour).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(self.game.players().iter().map(|player| {
            Line::from(Span::styled(
                format!("{}: {}", player.name, player.score),
                Style::default().fg(self.theme.primary_fg),
            ))
        }));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter new game · q quit",
            Style::default().fg(self.theme.muted),
        )));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Game over"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let paragraph = Paragraph::new(Line::from(self.state.status.clone()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = centered_rect(58, 16, frame.size());
        frame.render_widget(Clear, area);
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let entry = |keys: &'static str, text: &'static str| {
            Line::from(vec![Span::styled(format!("{keys:<12}"), bold), Span::raw(text)])
        };
        let lines = vec![
            Line::from("Enter everyone's names, pick a category and take"),
            Line::from("turns answering. Award points with + and -."),
            Line::from(format!(
                "The first to {} points ends the game.",
                self.game.winning_score()
            )),
            Line::from(""),
            entry("n / Space", "next question"),
            entry("p", "previous question"),
            entry("a / Enter", "show the answer"),
            entry("Tab / 1-9", "select player"),
            entry("+ / -", "change selected player's score"),
            entry("c", "back to categories"),
            entry("r", "restart"),
            entry("q", "quit"),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("How to play"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_alert(&self, frame: &mut Frame, alert: &AlertModal) {
        let width = 56.min(frame.size().width.saturating_sub(4)).max(24);
        let area = centered_rect(width, 7, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(alert.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to close",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.danger))
                .title(alert.title.clone()),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    name_input: String,
    category_cursor: usize,
    player_cursor: usize,
    revealed: bool,
    status: String,
    alert: Option<AlertModal>,
    show_help: bool,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            name_input: String::new(),
            category_cursor: 0,
            player_cursor: 0,
            revealed: false,
            status: "Ready".to_string(),
            alert: None,
            show_help: false,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_category_cursor(&mut self, delta: isize, total: usize) {
        self.category_cursor = step_cursor(self.category_cursor, delta, total);
    }

    fn move_player_cursor(&mut self, delta: isize, total: usize) {
        self.player_cursor = step_cursor(self.player_cursor, delta, total);
    }

    fn reset_for_new_game(&mut self) {
        let status = std::mem::take(&mut self.status);
        *self = Self {
            status,
            ..Self::default()
        };
    }
}

// Wraps around in both directions.
fn step_cursor(current: usize, delta: isize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let total = total as isize;
    (current as isize + delta).rem_euclid(total) as usize
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::{repository::QuestionSource, session::ThreadRandom};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TriviaApp, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch))).expect("typing");
        }
    }

    fn questions() -> Vec<Question> {
        ["Art", "Art", "Sport"]
            .iter()
            .enumerate()
            .map(|(idx, category)| Question {
                text: format!("question {idx}"),
                options: vec!["one".to_string(), "two".to_string()],
                correct_index: 1,
                category: category.to_string(),
            })
            .collect()
    }

    fn app_with_players() -> TriviaApp {
        let repository =
            QuestionRepository::new(QuestionSource::File("unused.json".into()), "General");
        let mut app = TriviaApp::with_game(repository, Game::new(ThreadRandom::seeded(3), 2));
        type_text(&mut app, "Ann, Bo");
        // No event loop in tests, so loading is reported as an error and
        // questions are delivered by hand.
        assert!(app.handle_key(key(KeyCode::Enter)).is_err());
        app.apply_loaded_questions(Ok(questions()));
        app
    }

    #[test]
    fn empty_names_raise_alert() {
        let repository =
            QuestionRepository::new(QuestionSource::File("unused.json".into()), "General");
        let mut app = TriviaApp::with_game(repository, Game::new(ThreadRandom::seeded(1), 10));
        type_text(&mut app, " , ");
        app.handle_key(key(KeyCode::Enter)).expect("submit");
        assert!(app.state.alert.is_some());
        assert_eq!(app.screen(), Screen::Register);

        app.handle_key(key(KeyCode::Enter)).expect("close alert");
        assert!(app.state.alert.is_none());
    }

    #[test]
    fn load_failure_stays_on_registration() {
        let repository =
            QuestionRepository::new(QuestionSource::File("unused.json".into()), "General");
        let mut app = TriviaApp::with_game(repository, Game::new(ThreadRandom::seeded(1), 10));
        type_text(&mut app, "Ann");
        let _ = app.handle_key(key(KeyCode::Enter));
        app.apply_loaded_questions(Err(LoadError::Empty));
        assert_eq!(app.screen(), Screen::Register);
        assert!(app.state.alert.is_some());
    }

    #[test]
    fn playing_through_a_category_returns_to_selection() {
        let mut app = app_with_players();
        assert_eq!(app.screen(), Screen::Categories);

        app.handle_key(key(KeyCode::Enter)).expect("choose Art");
        assert_eq!(app.screen(), Screen::Play);

        app.handle_key(key(KeyCode::Char('p'))).expect("previous");
        assert!(app.state.alert.is_some());
        app.handle_key(key(KeyCode::Esc)).expect("close alert");

        app.handle_key(key(KeyCode::Char('n'))).expect("second question");
        assert_eq!(app.screen(), Screen::Play);
        app.handle_key(key(KeyCode::Char('n'))).expect("exhausted");
        assert_eq!(app.screen(), Screen::Categories);
        assert!(app
            .state
            .alert
            .as_ref()
            .is_some_and(|alert| alert.message.contains("'Art'")));
    }

    #[test]
    fn scoring_to_threshold_shows_winner() {
        let mut app = app_with_players();
        app.handle_key(key(KeyCode::Down)).expect("move to Sport");
        app.handle_key(key(KeyCode::Enter)).expect("choose Sport");

        app.handle_key(key(KeyCode::Char('a'))).expect("reveal");
        assert!(app.state.revealed);

        app.handle_key(key(KeyCode::Char('2'))).expect("select Bo");
        app.handle_key(key(KeyCode::Char('+'))).expect("point");
        app.handle_key(key(KeyCode::Char('+'))).expect("winning point");
        assert_eq!(app.screen(), Screen::Winner);
        assert_eq!(
            app.game.phase(),
            &Phase::Finished(WinnerResult::SingleWinner {
                name: "Bo".to_string(),
                score: 2
            })
        );

        app.handle_key(key(KeyCode::Enter)).expect("restart");
        assert_eq!(app.screen(), Screen::Register);
        assert!(app.state.name_input.is_empty());
        assert!(app.game.players().is_empty());
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        assert_eq!(step_cursor(0, -1, 3), 2);
        assert_eq!(step_cursor(2, 1, 3), 0);
        assert_eq!(step_cursor(0, 1, 0), 0);
    }
}
