use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use escrow_insights::{
    classify, format_ada, group_failures, group_messages, CategoryGroup, DashboardStats,
    EscrowTransaction, Taxonomy, TxStatus,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Ledger,
    Messages,
    Failures,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Ledger => Page::Messages,
            Page::Messages => Page::Failures,
            Page::Failures => Page::Ledger,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Ledger => Page::Failures,
            Page::Messages => Page::Ledger,
            Page::Failures => Page::Messages,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Ledger => "Transactions",
            Page::Messages => "Message Categories",
            Page::Failures => "Failed Transactions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    All,
    Status(TxStatus),
}

pub struct App {
    pub transactions: Vec<EscrowTransaction>,
    pub filtered_transactions: Vec<EscrowTransaction>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub active_filter: FilterType,
    pub messages: Taxonomy,
    pub failures: Taxonomy,
}

impl App {
    pub fn new(transactions: Vec<EscrowTransaction>, messages: Taxonomy, failures: Taxonomy) -> Self {
        let mut state = TableState::default();
        if !transactions.is_empty() {
            state.select(Some(0));
        }

        let filtered_transactions = transactions.clone();

        Self {
            transactions,
            filtered_transactions,
            state,
            current_page: Page::Ledger,
            show_detail: false,
            active_filter: FilterType::All,
            messages,
            failures,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_transaction(&self) -> Option<&EscrowTransaction> {
        self.state.selected().and_then(|i| self.filtered_transactions.get(i))
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        self.active_filter = filter;

        self.filtered_transactions = match filter {
            FilterType::All => self.transactions.clone(),
            FilterType::Status(status) => self
                .transactions
                .iter()
                .filter(|tx| tx.status == status)
                .cloned()
                .collect(),
        };

        if !self.filtered_transactions.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn next(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered_transactions.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_transactions(&self.transactions)
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "dashboard loop failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.current_page = app.current_page.previous();
                    } else {
                        app.current_page = app.current_page.next();
                    }
                }
                KeyCode::BackTab => app.current_page = app.current_page.previous(),
                KeyCode::Char('1') => app.apply_filter(FilterType::All),
                KeyCode::Char('2') => app.apply_filter(FilterType::Status(TxStatus::Success)),
                KeyCode::Char('3') => app.apply_filter(FilterType::Status(TxStatus::Failed)),
                KeyCode::Char('4') => app.apply_filter(FilterType::Status(TxStatus::Pending)),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered_transactions.is_empty() {
                        app.state.select(Some(app.filtered_transactions.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Ledger if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_table(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Ledger => render_table(f, chunks[1], app),
        Page::Messages => {
            let groups = group_messages(&app.transactions, &app.messages);
            render_groups(f, chunks[1], Page::Messages, &groups, |tx| tx.message_text());
        }
        Page::Failures => {
            let groups = group_failures(&app.transactions, &app.failures);
            render_groups(f, chunks[1], Page::Failures, &groups, |tx| tx.error_text());
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn status_color(status: TxStatus) -> Color {
    match status {
        TxStatus::Success => Color::Green,
        TxStatus::Failed => Color::Red,
        TxStatus::Pending => Color::Yellow,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let mut tab_spans = vec![];
    for (i, page) in [Page::Ledger, Page::Messages, Page::Failures].iter().enumerate() {
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
        format!("Total: {}", stats.total),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("✓ {}", stats.succeeded),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("✗ {}", stats.failed),
        Style::default().fg(Color::Red),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("… {}", stats.pending),
        Style::default().fg(Color::Yellow),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Sent: {}", format_ada(stats.total_sent_lovelace)),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Date", "Recipient", "Amount", "Status", "Message"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered_transactions.iter().map(|tx| {
        let color = status_color(tx.status);

        let cells = vec![
            Cell::from(tx.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::from(truncate(&tx.recipient, 24)),
            Cell::from(format_ada(tx.amount_lovelace)),
            Cell::from(tx.status.as_str()).style(Style::default().fg(color)),
            Cell::from(truncate(tx.message.as_deref().unwrap_or(""), 40)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(26),
            Constraint::Length(20),
            Constraint::Length(9),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Transactions "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_groups<F>(
    f: &mut Frame,
    area: Rect,
    page: Page,
    groups: &[CategoryGroup<'_, EscrowTransaction>],
    text: F,
) where
    F: Fn(&EscrowTransaction) -> Option<&str>,
{
    let mut rows = Vec::new();

    for group in groups {
        let color = group.category.color.as_deref().map_or(Color::Cyan, hex_color);
        let total: u64 = group.items.iter().map(|tx| tx.amount_lovelace).sum();

        rows.push(
            Row::new(vec![
                Cell::from(format!(
                    "{} {}",
                    group.category.icon.as_deref().unwrap_or("•"),
                    group.name()
                )),
                Cell::from(format!("{} txs", group.len())),
                Cell::from(format_ada(total)),
            ])
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );

        for tx in &group.items {
            rows.push(Row::new(vec![
                Cell::from(format!("   {}", truncate(text(*tx).unwrap_or(""), 40))),
                Cell::from(tx.timestamp.format("%Y-%m-%d").to_string()),
                Cell::from(format_ada(tx.amount_lovelace)),
            ]));
        }
    }

    if rows.is_empty() {
        rows.push(Row::new(vec![Cell::from("   (nothing to group)")]));
    }

    let table = Table::new(
        rows,
        [Constraint::Min(30), Constraint::Length(12), Constraint::Length(20)],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", page.title())),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.filtered_transactions.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if let FilterType::Status(status) = app.active_filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", status.as_str()),
            Style::default().fg(status_color(status)),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("1", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("1-4", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" All/Success/Failed/Pending | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Transaction Details ");

    let Some(tx) = app.selected_transaction() else {
        f.render_widget(Paragraph::new("No transaction selected").block(block), area);
        return;
    };

    let label = |name: &'static str| {
        Span::styled(name, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("  Date: "), Span::raw(tx.timestamp.to_rfc3339())]),
        Line::from(""),
        Line::from(vec![label("  Recipient: "), Span::raw(tx.recipient.clone())]),
        Line::from(""),
        Line::from(vec![
            label("  Amount: "),
            Span::raw(format_ada(tx.amount_lovelace)),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Status: "),
            Span::styled(tx.status.as_str(), Style::default().fg(status_color(tx.status))),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Tx Hash: "),
            Span::raw(tx.tx_hash.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
    ];

    if let Some(message) = tx.message_text() {
        content.push(Line::from(vec![
            label("  Category: "),
            Span::raw(classify(&app.messages, message).to_string()),
        ]));
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                wrap_text(message, 35),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
        content.push(Line::from(""));
    }

    if let (true, Some(error)) = (tx.is_failed(), tx.error_text()) {
        content.push(Line::from(vec![
            label("  Failure: "),
            Span::styled(
                classify(&app.failures, error).to_string(),
                Style::default().fg(Color::Red),
            ),
        ]));
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                wrap_text(error, 35),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

/// `#RRGGBB` to a terminal color, cyan when unparsable
fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Cyan;
    }

    let channel = |range: std::ops::Range<usize>| {
        digits.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
    };

    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Cyan,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines.join("\n  ")
}
