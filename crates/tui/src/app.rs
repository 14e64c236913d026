use std::{
    io,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use freegames_core::{
    categories::{self, CATEGORIES},
    CatalogError, CatalogSnapshot, CatalogStore, DetailsCache, Game, GameDetails, GameId,
    HttpGamesApi,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);

const LOAD_TIMEOUT_MESSAGE: &str = "Games won't load! Check your internet connection or API key validity, then press Ctrl+r to retry.";

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
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
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Browse,
    Details,
}

enum AppEvent {
    Input(Event),
    Tick,
    CatalogLoaded {
        slug: &'static str,
        result: Result<Vec<Game>, CatalogError>,
    },
    DetailsLoaded {
        id: GameId,
        result: Result<Arc<GameDetails>, CatalogError>,
    },
}

/// Load started by the UI, watched by the safety timer.
struct PendingLoad {
    slug: &'static str,
    started: Instant,
    reported: bool,
}

/// Terminal front end over the catalog store and the details cache.
pub struct FreeGamesApp {
    catalog: Arc<CatalogStore<HttpGamesApi>>,
    details: Arc<DetailsCache<HttpGamesApi>>,
    loading_timeout: Duration,
    state: UiState,
    screen: Screen,
    category: usize,
    pending_load: Option<PendingLoad>,
    pending_details: Option<GameId>,
    current_details: Option<Arc<GameDetails>>,
    details_scroll: u16,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl FreeGamesApp {
    pub fn new(
        catalog: Arc<CatalogStore<HttpGamesApi>>,
        details: Arc<DetailsCache<HttpGamesApi>>,
        loading_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            details,
            loading_timeout,
            state: UiState::default(),
            screen: Screen::Browse,
            category: 0,
            pending_load: None,
            pending_details: None,
            current_details: None,
            details_scroll: 0,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
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

        info!("loading initial games");
        self.start_catalog_load(CATEGORIES[0].slug);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn start_catalog_load(&mut self, slug: &'static str) {
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        self.pending_load = Some(PendingLoad {
            slug,
            started: Instant::now(),
            reported: false,
        });
        self.state.set_status(format!(
            "Loading {}…",
            categories::display_name(slug)
        ));

        let catalog = Arc::clone(&self.catalog);
        spawn(async move {
            let result = catalog.load(slug).await;
            let _ = sender.send(AppEvent::CatalogLoaded { slug, result }).await;
        });
    }

    fn start_details_load(&mut self, game: &Game) {
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        let id = game.id;
        self.pending_details = Some(id);
        self.state
            .set_status(format!("Loading details for {}…", game.title));

        let details = Arc::clone(&self.details);
        spawn(async move {
            let result = details.get(id).await;
            let _ = sender.send(AppEvent::DetailsLoaded { id, result }).await;
        });
    }

    fn refresh_games(&mut self) {
        let slug = CATEGORIES[self.category].slug;
        self.start_catalog_load(slug);
    }

    fn select_category(&mut self, index: usize) {
        if index >= CATEGORIES.len() {
            return;
        }
        self.category = index;
        self.start_catalog_load(CATEGORIES[index].slug);
    }

    fn handle_tick(&mut self) {
        if let Some(pending) = self.pending_load.as_mut() {
            if !pending.reported && pending.started.elapsed() >= self.loading_timeout {
                pending.reported = true;
                warn!(
                    category = pending.slug,
                    elapsed = ?pending.started.elapsed(),
                    "catalog load still pending"
                );
                self.state.set_status(LOAD_TIMEOUT_MESSAGE.to_string());
            }
        }
    }

    fn handle_catalog_loaded(&mut self, slug: &'static str, result: Result<Vec<Game>, CatalogError>) {
        match result {
            Ok(games) => {
                let snapshot = self.catalog.snapshot();
                info!(category = slug, count = games.len(), "catalog ready");
                if self.pending_load.as_ref().map(|p| p.slug) == Some(slug) {
                    self.pending_load = None;
                }
                self.category = category_tab(&snapshot, self.category);
                self.state.set_snapshot(snapshot.clone());
                let mut status = format!(
                    "Loaded {} games · {}",
                    games.len(),
                    categories::display_name(snapshot.category().unwrap_or(""))
                );
                if snapshot.is_fallback() {
                    status = format!(
                        "{} unavailable; showing all games ({})",
                        categories::display_name(slug),
                        games.len()
                    );
                }
                self.state.set_status(status);
            }
            Err(CatalogError::Superseded) => {
                debug!(category = slug, "ignoring superseded load");
            }
            Err(err) => {
                error!(category = slug, error = %err, "catalog load failed");
                if self.pending_load.as_ref().map(|p| p.slug) == Some(slug) {
                    self.pending_load = None;
                }
                self.category = category_tab(&self.catalog.snapshot(), self.category);
                self.state
                    .set_status(format!("{err} Press Ctrl+r to retry."));
            }
        }
    }

    fn handle_details_loaded(&mut self, id: GameId, result: Result<Arc<GameDetails>, CatalogError>) {
        if self.pending_details != Some(id) {
            debug!(game_id = %id, "ignoring details for a deselected game");
            return;
        }
        self.pending_details = None;
        match result {
            Ok(details) => {
                info!(game_id = %id, title = %details.title(), "showing game details");
                self.state.set_status(format!(
                    "{} · {} cached",
                    details.title(),
                    self.details.size()
                ));
                self.current_details = Some(details);
                self.details_scroll = 0;
                self.screen = Screen::Details;
            }
            Err(err) => {
                error!(game_id = %id, error = %err, "details load failed");
                self.state.set_status(err.to_string());
            }
        }
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::CatalogLoaded { slug, result }) => {
                self.handle_catalog_loaded(slug, result);
                true
            }
            Some(AppEvent::DetailsLoaded { id, result }) => {
                self.handle_details_loaded(id, result);
                true
            }
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        match self.screen {
            Screen::Browse => match self.state.mode {
                Mode::Search => self.handle_search_key(key),
                Mode::Browse => self.handle_browse_key(key),
            },
            Screen::Details => self.handle_details_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.filter.clear();
                self.state.apply_filter();
                self.state.set_status("Search cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.state.set_status(format!(
                    "Search applied: {} ({} matches)",
                    self.state.filter,
                    self.state.filtered.len()
                ));
            }
            KeyCode::Backspace => {
                self.state.filter.pop();
                self.state.apply_filter();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.filter.push(c);
                    self.state.apply_filter();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.state.move_to(0),
            KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Search;
                self.state.set_status("Search title, genre or publisher".to_string());
            }
            KeyCode::Char('f') if key.modifiers.is_empty() => {
                let genre = self.state.cycle_genre();
                let message = match genre {
                    Some(genre) => format!("Genre: {genre}"),
                    None => "Genre filter cleared".to_string(),
                };
                self.state.set_status(message);
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_games();
            }
            KeyCode::Char('c') if key.modifiers.is_empty() => {
                let dropped = self.details.size();
                self.details.clear();
                self.state
                    .set_status(format!("Cleared {dropped} cached details"));
            }
            KeyCode::Tab => self.select_category((self.category + 1) % CATEGORIES.len()),
            KeyCode::BackTab => self.select_category(
                (self.category + CATEGORIES.len() - 1) % CATEGORIES.len(),
            ),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.select_category(index);
            }
            KeyCode::Enter => {
                if let Some(game) = self.state.current_game().cloned() {
                    self.start_details_load(&game);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_details_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                self.screen = Screen::Browse;
                self.current_details = None;
                self.state.set_status(format!(
                    "{} games",
                    self.state.filtered.len()
                ));
            }
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.details_scroll = self.details_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.details_scroll = self.details_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.details_scroll = self.details_scroll.saturating_add(10);
            }
            KeyCode::PageUp => {
                self.details_scroll = self.details_scroll.saturating_sub(10);
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Browse => self.draw_browse(frame),
            Screen::Details => self.draw_details(frame),
        }
    }

    fn draw_browse(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.render_categories(frame, chunks[0]);
        self.render_game_list(frame, body[0]);
        self.render_game_summary(frame, body[1]);
        self.render_status(frame, chunks[2]);
    }

    fn draw_details(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(size);

        match self.current_details.clone() {
            Some(details) => self.render_details(frame, chunks[0], &details),
            None => {
                let block = Block::default().borders(Borders::ALL).title("Game Details");
                frame.render_widget(Paragraph::new("No game selected").block(block), chunks[0]);
            }
        }
        self.render_status(frame, chunks[1]);
    }

    fn render_categories(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = CATEGORIES
            .iter()
            .enumerate()
            .map(|(idx, category)| Line::from(format!("{} {}", idx + 1, category.label)))
            .collect();
        let title = categories::display_name(CATEGORIES[self.category].slug);
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title(title))
            .select(self.category)
            .style(Style::default().fg(self.theme.primary_fg))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_game_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let mut list_state = ListState::default();
        let games = self.state.visible_games(self.state.list_height);
        if !games.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(games.len().saturating_sub(1));
            list_state.select(Some(selected));
        }
        let items: Vec<ListItem> = games
            .iter()
            .enumerate()
            .map(|(idx, game)| {
                let is_selected = self.state.cursor == self.state.offset + idx;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let title = Span::styled(
                    game.title.clone(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                );
                let genre = Span::styled(
                    format!(" · {}", game.genre),
                    Style::default().fg(self.theme.muted),
                );
                let platform = Span::styled(
                    format!(" · {}", game.platform),
                    Style::default().fg(self.theme.muted),
                );
                ListItem::new(Line::from(vec![marker, title, genre, platform]))
            })
            .collect();

        let mut title = format!("Games ({})", self.state.filtered.len());
        if let Some(genre) = &self.state.genre {
            title.push_str(&format!(" · {genre}"));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_summary(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game");
        let Some(game) = self.state.current_game() else {
            let message = if self.pending_load.is_some() {
                "Loading games…"
            } else {
                "No games found"
            };
            frame.render_widget(Paragraph::new(message).block(block), area);
            return;
        };

        let mut lines = vec![Line::from(Span::styled(
            game.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        lines.push(Line::from(Span::styled(
            game.short_description.clone(),
            Style::default().fg(self.theme.muted),
        )));
        lines.push(Line::from(""));
        push_field(&mut lines, "Genre", &game.genre);
        push_field(&mut lines, "Platform", &game.platform);
        push_field(&mut lines, "Publisher", &game.publisher);
        push_field(&mut lines, "Released", &game.release_date);
        if self.details.contains(game.id) {
            lines.push(Line::from(Span::styled(
                "Details cached",
                Style::default().fg(self.theme.accent),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: details",
            Style::default().fg(self.theme.muted),
        )));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, details: &GameDetails) {
        let game = &details.game;
        let mut lines = Vec::new();
        push_field(&mut lines, "Genre", &game.genre);
        push_field(&mut lines, "Platform", &game.platform);
        push_field(&mut lines, "Publisher", &game.publisher);
        if let Some(developer) = &game.developer {
            push_field(&mut lines, "Developer", developer);
        }
        push_field(&mut lines, "Released", &game.release_date);
        if let Some(status) = &details.status {
            push_field(&mut lines, "Status", status);
        }
        if let Some(url) = details.play_url() {
            push_field(&mut lines, "Play", url);
        }
        if let Some(url) = &game.freetogame_profile_url {
            push_field(&mut lines, "Profile", url);
        }

        let description = details
            .description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&game.short_description);
        if !description.is_empty() {
            lines.push(Line::from(""));
            lines.push(section_heading("About", &self.theme));
            lines.extend(description.lines().map(|line| Line::from(line.to_string())));
        }

        if !details.screenshots.is_empty() {
            lines.push(Line::from(""));
            lines.push(section_heading("Screenshots", &self.theme));
            for shot in &details.screenshots {
                lines.push(Line::from(format!("• {}", shot.image)));
            }
        }

        if let Some(requirements) = &details.minimum_system_requirements {
            let entries = requirements.entries();
            if !entries.is_empty() {
                lines.push(Line::from(""));
                lines.push(section_heading("Minimum System Requirements", &self.theme));
                for (label, value) in entries {
                    push_field(&mut lines, label, value);
                }
            }
        }

        let title = format!("{} · Esc to go back", details.title());
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true })
            .scroll((self.details_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Search {
            format!("Search: {}", self.state.filter)
        } else {
            self.state.status.clone()
        };
        let primary_style = match &self.pending_load {
            Some(pending) if pending.reported => Style::default().fg(self.theme.danger),
            Some(_) => Style::default().fg(self.theme.warning),
            None => Style::default(),
        };
        let snapshot = self.catalog.snapshot();
        let stats = snapshot.stats();
        let mut secondary = format!(
            "{} games · {} genres · {} platforms · {} details cached",
            stats.total,
            stats.genre_count,
            stats.platform_count,
            self.details.size()
        );
        if let Some(loaded_at) = snapshot.loaded_at() {
            secondary.push_str(&format!(" · updated {}", loaded_at.format("%H:%M:%S UTC")));
        }
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(primary, primary_style)),
            Line::from(Span::styled(secondary, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

/// Tab matching what the list shows. With nothing loaded yet the requested
/// tab stays selected so a retry targets it.
fn category_tab(snapshot: &CatalogSnapshot, requested: usize) -> usize {
    if snapshot.is_empty() {
        return requested;
    }
    categories::index_of(snapshot.category().unwrap_or("")).unwrap_or(0)
}

fn push_field<'a>(lines: &mut Vec<Line<'a>>, label: &str, value: &str) {
    if value.trim().is_empty() {
        return;
    }
    lines.push(Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.to_string()),
    ]));
}

fn section_heading(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    ))
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

/// List state for the browse screen. Queries always run against one
/// catalog snapshot so the list never mixes two loads.
struct UiState {
    snapshot: Arc<CatalogSnapshot>,
    filtered: Vec<Game>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    filter: String,
    genre: Option<String>,
    status: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(CatalogSnapshot::default()),
            filtered: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            filter: String::new(),
            genre: None,
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_snapshot(&mut self, snapshot: Arc<CatalogSnapshot>) {
        self.snapshot = snapshot;
        if let Some(genre) = &self.genre {
            if !self.snapshot.available_genres().contains(genre) {
                self.genre = None;
            }
        }
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let mut games = match &self.genre {
            Some(genre) => self.snapshot.filter_by_genre(genre),
            None => self.snapshot.games().to_vec(),
        };
        let needle = self.filter.trim().to_lowercase();
        if !needle.is_empty() {
            games.retain(|game| game.matches(&needle));
        }
        self.filtered = games;
        self.cursor = 0;
        self.offset = 0;
    }

    /// Advance to the next genre in sorted order, wrapping to "no filter".
    fn cycle_genre(&mut self) -> Option<String> {
        let genres = self.snapshot.available_genres();
        let next = match &self.genre {
            None => genres.first().cloned(),
            Some(current) => genres
                .iter()
                .position(|genre| genre == current)
                .and_then(|idx| genres.get(idx + 1))
                .cloned(),
        };
        self.genre = next.clone();
        self.apply_filter();
        next
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let idx = (self.cursor as isize + delta).clamp(0, len - 1);
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = index.min(self.filtered.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = self.filtered.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(-(delta as isize));
    }

    fn visible_games(&self, height: usize) -> &[Game] {
        if self.filtered.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.filtered.len());
        &self.filtered[self.offset..end]
    }

    fn current_game(&self) -> Option<&Game> {
        self.filtered.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.filtered.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.filtered.len() {
            self.cursor = self.filtered.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.list_height {
            self.offset = self.cursor + 1 - self.list_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: u32, title: &str, genre: &str, publisher: &str) -> Game {
        Game {
            id: GameId(id),
            title: title.to_string(),
            thumbnail: String::new(),
            short_description: String::new(),
            genre: genre.to_string(),
            platform: "PC (Windows)".to_string(),
            publisher: publisher.to_string(),
            release_date: String::new(),
            developer: None,
            game_url: None,
            freetogame_profile_url: None,
        }
    }

    fn state_with(games: Vec<Game>) -> UiState {
        let snapshot: CatalogSnapshot = games.into();
        let mut state = UiState::default();
        state.set_snapshot(Arc::new(snapshot));
        state
    }

    fn ids(state: &UiState) -> Vec<u32> {
        state.filtered.iter().map(|game| game.id.get()).collect()
    }

    #[test]
    fn search_and_genre_filters_combine() {
        let mut state = state_with(vec![
            game(1, "Alpha", "Shooter", "Acme"),
            game(2, "Bravo", "MMORPG", "Acme"),
            game(3, "Charlie", "Shooter", "Globex"),
        ]);
        assert_eq!(ids(&state), vec![1, 2, 3]);

        state.filter = "acme".to_string();
        state.apply_filter();
        assert_eq!(ids(&state), vec![1, 2]);

        assert_eq!(state.cycle_genre().as_deref(), Some("MMORPG"));
        assert_eq!(ids(&state), vec![2]);
        assert_eq!(state.cycle_genre().as_deref(), Some("Shooter"));
        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.cycle_genre(), None);
        assert_eq!(ids(&state), vec![1, 2]);
    }

    #[test]
    fn cursor_stays_in_bounds_and_visible() {
        let games = (1..=10).map(|id| game(id, "Game", "Shooter", "Acme")).collect();
        let mut state = state_with(games);
        state.list_height = 3;

        state.move_cursor(-5);
        assert_eq!(state.cursor, 0);
        state.move_cursor(4);
        assert_eq!(state.cursor, 4);
        assert_eq!(state.offset, 2);
        state.move_to_end();
        assert_eq!(state.cursor, 9);
        assert_eq!(state.visible_games(3).len(), 3);
        state.page_up();
        assert_eq!(state.cursor, 6);
        state.move_to(0);
        assert_eq!(state.offset, 0);
        assert_eq!(state.current_game().map(|g| g.id), Some(GameId(1)));
    }

    #[test]
    fn tab_follows_the_loaded_snapshot() {
        let empty = CatalogSnapshot::default();
        assert_eq!(category_tab(&empty, 3), 3);

        let all: CatalogSnapshot = vec![game(1, "Alpha", "Shooter", "Acme")].into();
        let racing = CATEGORIES
            .iter()
            .position(|category| category.slug == "racing")
            .unwrap_or_default();
        assert_eq!(category_tab(&all, racing), 0);
    }

    #[test]
    fn list_rows_show_title_genre_and_platform() -> Result<()> {
        use freegames_core::AppConfig;
        use ratatui::backend::TestBackend;

        let config = AppConfig {
            api_key: "test-key".to_string(),
            api_host: "games.example.com".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            loading_timeout_secs: 5,
            connect_timeout_secs: None,
            log_dir: None,
        };
        let api = HttpGamesApi::new(&config)?;
        let mut app = FreeGamesApp::new(
            Arc::new(CatalogStore::new(api.clone())),
            Arc::new(DetailsCache::new(api)),
            config.loading_timeout(),
        );
        app.state
            .set_snapshot(Arc::new(vec![game(1, "Alpha", "Shooter", "Acme")].into()));

        let mut terminal = Terminal::new(TestBackend::new(100, 20))?;
        terminal.draw(|frame| app.draw(frame))?;
        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect()
            })
            .collect();
        assert!(rows
            .iter()
            .any(|row| row.contains("Alpha · Shooter · PC (Windows)")));
        Ok(())
    }

    #[test]
    fn new_snapshot_drops_unknown_genre() {
        let mut state = state_with(vec![game(1, "Alpha", "Shooter", "Acme")]);
        state.cycle_genre();
        assert_eq!(state.genre.as_deref(), Some("Shooter"));

        state.set_snapshot(Arc::new(vec![game(2, "Bravo", "Racing", "Acme")].into()));
        assert_eq!(state.genre, None);
        assert_eq!(ids(&state), vec![2]);
    }
}
