// 🖥️ Terminal Dashboard - Rooms, tenants, payments and balances in one screen
//
// The App owns the session's AppState plus views derived from it (balances,
// payment history, summary). Every change goes through `App::apply`, which
// re-derives the views so the header cards never go stale.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use serene_manager::report::{format_balance, format_currency};
use serene_manager::{
    AppState, BalanceStatus, Mutation, PaymentRow, PortfolioSummary, RemoteApi, Room, RoomStatus,
    Tenant, TenantBalance,
};

const PAGE_JUMP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Rooms,
    Tenants,
    Payments,
    Balances,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Rooms, Page::Tenants, Page::Payments, Page::Balances];

    pub fn next(&self) -> Self {
        match self {
            Page::Rooms => Page::Tenants,
            Page::Tenants => Page::Payments,
            Page::Payments => Page::Balances,
            Page::Balances => Page::Rooms,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Rooms => Page::Balances,
            Page::Tenants => Page::Rooms,
            Page::Payments => Page::Tenants,
            Page::Balances => Page::Payments,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Rooms => "Rooms",
            Page::Tenants => "Tenants",
            Page::Payments => "Payments",
            Page::Balances => "Balances",
        }
    }

    fn index(&self) -> usize {
        match self {
            Page::Rooms => 0,
            Page::Tenants => 1,
            Page::Payments => 2,
            Page::Balances => 3,
        }
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPage,
    PreviousPage,
    Down,
    Up,
    PageDown,
    PageUp,
    First,
    Last,
    ToggleDetail,
    Reload,
    VacateRoom,
    ToggleMaintenance,
    FilterRooms,
}

pub fn action_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::BackTab => Action::PreviousPage,
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Action::PreviousPage,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Action::NextPage,
        KeyCode::Left | KeyCode::Char('h') => Action::PreviousPage,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Home | KeyCode::Char('g') => Action::First,
        KeyCode::End | KeyCode::Char('G') => Action::Last,
        KeyCode::Enter => Action::ToggleDetail,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('v') => Action::VacateRoom,
        KeyCode::Char('m') => Action::ToggleMaintenance,
        KeyCode::Char('/') => Action::FilterRooms,
        _ => return None,
    };
    Some(action)
}

pub struct App {
    pub state: AppState,
    pub balances: Vec<TenantBalance>,
    pub history: Vec<PaymentRow>,
    pub summary: PortfolioSummary,
    pub currency: String,
    pub today: NaiveDate,
    pub current_page: Page,
    pub tables: [TableState; 4],
    pub show_detail: bool,
    pub message: Option<String>,
    /// Room-number search on the Rooms page
    pub room_filter: String,
    pub editing_filter: bool,
}

impl App {
    pub fn new(state: AppState, currency: String) -> Self {
        Self::with_date(state, currency, Local::now().date_naive())
    }

    pub fn with_date(state: AppState, currency: String, today: NaiveDate) -> Self {
        let mut app = Self {
            balances: Vec::new(),
            history: Vec::new(),
            summary: state.summary(today),
            state,
            currency,
            today,
            current_page: Page::Rooms,
            tables: Default::default(),
            show_detail: false,
            message: None,
            room_filter: String::new(),
            editing_filter: false,
        };
        app.refresh_views();
        app
    }

    /// Apply a mutation and re-derive every view.
    pub fn apply(&mut self, mutation: Mutation) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(mutation);
        self.refresh_views();
    }

    fn refresh_views(&mut self) {
        self.balances = self.state.balances(self.today);
        self.history = self.state.payment_history();
        self.summary = self.state.summary(self.today);

        // Keep every selection inside its (possibly shrunken) table
        for page in Page::ALL {
            let len = self.len_of(page);
            let table = &mut self.tables[page.index()];
            match (table.selected(), len) {
                (_, 0) => table.select(None),
                (None, _) => table.select(Some(0)),
                (Some(i), len) if i >= len => table.select(Some(len - 1)),
                _ => {}
            }
        }
    }

    fn len_of(&self, page: Page) -> usize {
        match page {
            Page::Rooms => self.visible_rooms().len(),
            Page::Tenants => self.state.tenants.len(),
            Page::Payments => self.history.len(),
            Page::Balances => self.balances.len(),
        }
    }

    fn table(&mut self) -> &mut TableState {
        &mut self.tables[self.current_page.index()]
    }

    pub fn selected(&self) -> Option<usize> {
        self.tables[self.current_page.index()].selected()
    }

    pub fn selected_room(&self) -> Option<&Room> {
        match self.current_page {
            Page::Rooms => self.selected().and_then(|i| self.visible_rooms().get(i).copied()),
            Page::Tenants => self
                .selected_tenant()
                .and_then(|t| self.state.room_of_tenant(t.id)),
            Page::Balances => self
                .selected()
                .and_then(|i| self.balances.get(i))
                .and_then(|b| b.room_id)
                .and_then(|id| self.state.room(id)),
            Page::Payments => None,
        }
    }

    pub fn selected_tenant(&self) -> Option<&Tenant> {
        match self.current_page {
            Page::Tenants => self.selected().and_then(|i| self.state.tenants.get(i)),
            _ => None,
        }
    }

    /// Rooms whose number contains the filter, case-insensitively
    pub fn visible_rooms(&self) -> Vec<&Room> {
        let needle = self.room_filter.trim().to_lowercase();
        self.state
            .rooms
            .iter()
            .filter(|r| needle.is_empty() || r.room_number.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn start_room_filter(&mut self) {
        self.current_page = Page::Rooms;
        self.editing_filter = true;
    }

    /// Feed a key to the filter prompt. Enter keeps the filter, Esc clears it.
    pub fn filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.editing_filter = false,
            KeyCode::Esc => {
                self.room_filter.clear();
                self.editing_filter = false;
            }
            KeyCode::Backspace => {
                self.room_filter.pop();
            }
            KeyCode::Char(c) => self.room_filter.push(c),
            _ => return,
        }
        self.refresh_views();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.len_of(self.current_page);
        if len == 0 {
            return;
        }
        let i = match self.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table().select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.len_of(self.current_page);
        if len == 0 {
            return;
        }
        let i = match self.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.table().select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.len_of(self.current_page);
        if len == 0 {
            return;
        }
        let i = self.selected().map(|i| (i + PAGE_JUMP).min(len - 1)).unwrap_or(0);
        self.table().select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.len_of(self.current_page) == 0 {
            return;
        }
        let i = self.selected().map(|i| i.saturating_sub(PAGE_JUMP)).unwrap_or(0);
        self.table().select(Some(i));
    }

    pub fn first(&mut self) {
        if self.len_of(self.current_page) > 0 {
            self.table().select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let len = self.len_of(self.current_page);
        if len > 0 {
            self.table().select(Some(len - 1));
        }
    }

    fn tenant_name(&self, tenant_id: Option<i64>) -> &str {
        tenant_id
            .and_then(|id| self.state.tenant(id))
            .map(|t| t.name.as_str())
            .unwrap_or("-")
    }

    fn money(&self, amount: f64) -> String {
        format_currency(&self.currency, amount)
    }
}

pub async fn run_ui(app: &mut App, api: &RemoteApi) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, api).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &RemoteApi,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.editing_filter {
            app.filter_key(key.code);
            continue;
        }

        match action_for(key.code, key.modifiers) {
            Some(Action::Quit) => return Ok(()),
            Some(Action::NextPage) => app.next_page(),
            Some(Action::PreviousPage) => app.previous_page(),
            Some(Action::Down) => app.next(),
            Some(Action::Up) => app.previous(),
            Some(Action::PageDown) => app.page_down(),
            Some(Action::PageUp) => app.page_up(),
            Some(Action::First) => app.first(),
            Some(Action::Last) => app.last(),
            Some(Action::ToggleDetail) => app.toggle_detail(),
            Some(Action::FilterRooms) => app.start_room_filter(),
            Some(action) => {
                // Remote actions: a failure is shown in the status bar, not fatal
                app.message = Some(match perform(app, api, action).await {
                    Ok(done) => done,
                    Err(err) => {
                        tracing::warn!(error = %err, ?action, "dashboard action failed");
                        format!("✗ {}", err)
                    }
                });
            }
            None => {}
        }
    }
}

/// `m` flips between maintenance and vacant; an occupied room is refused
/// by `RoomUpdate::status_change` before anything is sent.
pub fn maintenance_target(room: &Room) -> RoomStatus {
    match room.status {
        RoomStatus::Maintenance => RoomStatus::Vacant,
        _ => RoomStatus::Maintenance,
    }
}

/// Run a remote action and fold its result into the app.
async fn perform(app: &mut App, api: &RemoteApi, action: Action) -> Result<String> {
    match action {
        Action::Reload => {
            app.apply(api.reload().await?);
            Ok(format!(
                "✓ Reloaded {} rooms, {} tenants, {} payments",
                app.state.rooms.len(),
                app.state.tenants.len(),
                app.state.payments.len()
            ))
        }
        Action::VacateRoom => {
            let Some(room) = app.selected_room() else {
                return Ok("Select a room first".to_string());
            };
            if room.tenant_id.is_none() && room.status == RoomStatus::Vacant {
                return Ok(format!("Room {} is already vacant", room.room_number));
            }
            let room_id = room.id;
            let updated = api.vacate_room(room_id).await?;
            let label = updated.room_number.clone();
            app.apply(Mutation::RoomUpdated(updated));
            Ok(format!("✓ Room {} vacated", label))
        }
        Action::ToggleMaintenance => {
            let Some(room) = app.selected_room() else {
                return Ok("Select a room first".to_string());
            };
            let room = room.clone();
            let updated = api.set_room_status(&room, maintenance_target(&room)).await?;
            let label = format!("✓ Room {} is now {}", updated.room_number, updated.status);
            app.apply(Mutation::RoomUpdated(updated));
            Ok(label)
        }
        _ => Ok(String::new()),
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Page tabs
            Constraint::Length(4), // Summary cards
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_cards(f, chunks[1], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);

        render_page(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_page(f, chunks[2], app);
    }

    render_status_bar(f, chunks[3], app);
}

fn render_page(f: &mut Frame, area: Rect, app: &mut App) {
    match app.current_page {
        Page::Rooms => render_rooms(f, area, app),
        Page::Tenants => render_tenants(f, area, app),
        Page::Payments => render_payments(f, area, app),
        Page::Balances => render_balances(f, area, app),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🏠 Serene Manager  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("as of {}", app.today),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let s = &app.summary;
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let entries = [
        ("Total Collections", app.money(s.total_collections), Color::Green),
        ("This Month", app.money(s.this_period_collections), Color::Cyan),
        (
            "Arrears",
            format!("{} ({})", app.money(s.total_arrears), s.tenants_in_arrears),
            Color::Red,
        ),
        (
            "Occupancy",
            format!(
                "{}/{} ({:.0}%) · {} maint.",
                s.occupancy.occupied,
                s.occupancy.total,
                s.occupancy.rate(),
                s.occupancy.maintenance
            ),
            Color::Yellow,
        ),
    ];

    for (i, (title, value, color)) in entries.into_iter().enumerate() {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", title)),
        );
        f.render_widget(card, cards[i]);
    }
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn page_table<'a>(rows: Vec<Row<'a>>, widths: &[Constraint], header: Row<'a>, title: String) -> Table<'a> {
    Table::new(rows, widths.to_vec())
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ")
}

fn status_color(status: RoomStatus) -> Color {
    match status {
        RoomStatus::Vacant => Color::Green,
        RoomStatus::Occupied => Color::Cyan,
        RoomStatus::Maintenance => Color::Yellow,
    }
}

fn render_rooms(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .visible_rooms()
        .into_iter()
        .map(|room| {
            let mut status = Cell::from(room.status.to_string())
                .style(Style::default().fg(status_color(room.status)));
            if !room.is_consistent() {
                status = Cell::from(format!("{} ⚠", room.status)).style(Style::default().fg(Color::Red));
            }
            Row::new(vec![
                Cell::from(room.room_number.clone()),
                Cell::from(truncate(&room.room_type, 14)),
                status,
                Cell::from(app.money(room.rent_amount)),
                Cell::from(truncate(app.tenant_name(room.tenant_id), 24)),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        &[
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(18),
            Constraint::Min(20),
        ],
        header_row(&["Room", "Type", "Status", "Rent", "Tenant"]),
        if app.room_filter.is_empty() {
            format!(" Rooms ({}) ", app.state.rooms.len())
        } else {
            format!(" Rooms ({} of {}) matching \"{}\" ", app.len_of(Page::Rooms), app.state.rooms.len(), app.room_filter)
        },
    );

    f.render_stateful_widget(table, area, &mut app.tables[Page::Rooms.index()]);
}

fn render_tenants(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .state
        .tenants
        .iter()
        .map(|t| {
            let room = app
                .state
                .room_of_tenant(t.id)
                .map(|r| r.room_number.clone())
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(truncate(&t.name, 24)),
                Cell::from(truncate(&t.email, 28)),
                Cell::from(t.phone.clone()),
                Cell::from(format_date(t.moving_in_date)),
                Cell::from(room),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        &[
            Constraint::Length(26),
            Constraint::Length(30),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Min(8),
        ],
        header_row(&["Name", "Email", "Phone", "Moved in", "Room"]),
        format!(" Tenants ({}) ", app.state.tenants.len()),
    );

    f.render_stateful_widget(table, area, &mut app.tables[Page::Tenants.index()]);
}

fn render_payments(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .history
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(format_date(p.date)),
                Cell::from(truncate(&p.tenant_name, 24)),
                Cell::from(p.room_number.clone()),
                Cell::from(app.money(p.amount)).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        &[
            Constraint::Length(12),
            Constraint::Length(26),
            Constraint::Length(10),
            Constraint::Min(16),
        ],
        header_row(&["Date", "Tenant", "Room", "Amount"]),
        format!(" Payment History ({}) ", app.history.len()),
    );

    f.render_stateful_widget(table, area, &mut app.tables[Page::Payments.index()]);
}

fn render_balances(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .balances
        .iter()
        .map(|b| {
            let color = if b.in_arrears() {
                Color::Red
            } else if b.in_credit() {
                Color::Green
            } else if b.has_room() {
                Color::White
            } else {
                Color::DarkGray
            };
            Row::new(vec![
                Cell::from(truncate(&b.tenant_name, 24)),
                Cell::from(b.room_number.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(b.months_elapsed.to_string()),
                Cell::from(app.money(b.expected_rent)),
                Cell::from(app.money(b.total_paid)),
                Cell::from(format_balance(&app.currency, b)).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        &[
            Constraint::Length(26),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Min(18),
        ],
        header_row(&["Tenant", "Room", "Months", "Expected", "Paid", "Balance"]),
        format!(" Balances ({} in arrears) ", app.summary.tenants_in_arrears),
    );

    f.render_stateful_widget(table, area, &mut app.tables[Page::Balances.index()]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.len_of(app.current_page);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if app.editing_filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Room: {}_", app.room_filter),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw(" (Enter keep, Esc clear)"));
    } else if let Some(message) = &app.message {
        let color = if message.starts_with('✗') { Color::Red } else { Color::Green };
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(color)));
    }

    for (key, label, color) in [
        ("Enter", " Details", Color::Yellow),
        ("Tab", " Page", Color::Yellow),
        ("r", " Reload", Color::Yellow),
        ("v", " Vacate", Color::Yellow),
        ("m", " Maintenance", Color::Yellow),
        ("/", " Find room", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(label));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {}: ", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

/// Lines for the detail panel of the current selection.
pub fn detail_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];

    match app.current_page {
        Page::Rooms => {
            let Some(room) = app.selected_room() else {
                return vec![Line::from("  No room selected")];
            };
            lines.push(section("ROOM"));
            lines.push(detail_line("Number", room.room_number.clone()));
            lines.push(detail_line("Type", room.room_type.clone()));
            lines.push(detail_line("Status", room.status.to_string()));
            lines.push(detail_line("Rent", app.money(room.rent_amount)));
            lines.push(detail_line("Tenant", app.tenant_name(room.tenant_id).to_string()));
            if !room.is_consistent() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "  ⚠ Status and tenant disagree",
                    Style::default().fg(Color::Red),
                )));
            }
        }
        Page::Tenants => {
            let Some(tenant) = app.selected_tenant() else {
                return vec![Line::from("  No tenant selected")];
            };
            lines.push(section("TENANT"));
            lines.push(detail_line("Name", tenant.name.clone()));
            lines.push(detail_line("Email", tenant.email.clone()));
            lines.push(detail_line("Phone", tenant.phone.clone()));
            lines.push(detail_line("Moved in", format_date(tenant.moving_in_date)));
            if let Some(b) = app.balances.iter().find(|b| b.tenant_id == tenant.id) {
                lines.push(Line::from(""));
                lines.extend(balance_lines(app, b));
            }
        }
        Page::Payments => {
            let Some(row) = app.selected().and_then(|i| app.history.get(i)) else {
                return vec![Line::from("  No payment selected")];
            };
            lines.push(section("PAYMENT"));
            lines.push(detail_line("Id", row.payment_id.to_string()));
            lines.push(detail_line("Date", format_date(row.date)));
            lines.push(detail_line("Tenant", row.tenant_name.clone()));
            lines.push(detail_line("Room", row.room_number.clone()));
            lines.push(detail_line("Amount", app.money(row.amount)));
        }
        Page::Balances => {
            let Some(b) = app.selected().and_then(|i| app.balances.get(i)) else {
                return vec![Line::from("  No tenant selected")];
            };
            lines.push(detail_line("Tenant", b.tenant_name.clone()));
            lines.push(Line::from(""));
            lines.extend(balance_lines(app, b));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn balance_lines(app: &App, b: &TenantBalance) -> Vec<Line<'static>> {
    let mut lines = vec![section("BALANCE")];
    match b.status {
        BalanceStatus::NoRoom => {
            lines.push(Line::from("  No room assigned"));
        }
        BalanceStatus::InvalidMoveIn => {
            lines.push(Line::from("  Moving-in date missing or invalid"));
            lines.push(detail_line("Paid", app.money(b.total_paid)));
        }
        BalanceStatus::Computed => {
            lines.push(detail_line("Room", b.room_number.clone().unwrap_or_default()));
            lines.push(detail_line("Monthly rent", app.money(b.monthly_rent)));
            lines.push(detail_line("Months", b.months_elapsed.to_string()));
            lines.push(detail_line("Expected", app.money(b.expected_rent)));
            lines.push(detail_line("Paid", app.money(b.total_paid)));
            lines.push(detail_line("Balance", format_balance(&app.currency, b)));
        }
    }
    lines
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let panel = Paragraph::new(detail_lines(app)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} Details ", app.current_page.title())),
    );

    f.render_widget(panel, area);
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
