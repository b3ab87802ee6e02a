//! TUI views and rendering
//!
//! Drawing only. The one thing written back is layout: the board records its
//! column rectangles for mouse hit-testing and the chat caches its scroll
//! bound.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use taskstore::{Status, Task, partition};
use tracing::trace;

use super::state::{AppState, CARD_HEIGHT, Field, InteractionMode};
use crate::board::{BoardController, Draft};
use crate::coordinator::{Coordinator, Tab};
use crate::llm::Role;

const APP_TITLE: &str = "Tasks Done OR ELSE";

mod colors {
    use ratatui::style::Color;

    pub const TODO: Color = Color::Rgb(255, 215, 0); // Gold
    pub const DOING: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const DONE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const DRAGGING: Color = Color::Rgb(255, 69, 0); // Orange red
    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;

    pub const CHAT_USER: Color = Color::Rgb(0, 255, 127); // Green
    pub const CHAT_ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => colors::TODO,
        Status::Doing => colors::DOING,
        Status::Done => colors::DONE,
    }
}

/// Main render function
pub fn render(state: &mut AppState, coordinator: &Coordinator, frame: &mut Frame) {
    trace!(tab = ?coordinator.tab(), "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(coordinator, frame, chunks[0]);

    match coordinator.tab() {
        Tab::Chat => render_chat_view(state, coordinator, frame, chunks[1]),
        Tab::Tasks => render_board(state, coordinator, frame, chunks[1]),
    }

    render_footer(state, coordinator, frame, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        render_help_overlay(frame, frame.area());
    }
}

/// Title, tabs and session token usage
fn render_header(coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let mut left_spans = vec![
        Span::styled(
            format!(" {APP_TITLE}"),
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
    ];
    for (i, tab) in [Tab::Chat, Tab::Tasks].into_iter().enumerate() {
        if i > 0 {
            left_spans.push(Span::styled(" · ", Style::default().fg(colors::DIM)));
        }
        let style = if tab == coordinator.tab() {
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors::DIM)
        };
        left_spans.push(Span::styled(tab.title(), style));
    }

    let usage = coordinator.chat.usage();
    let model = coordinator.model().unwrap_or("no model");
    let right_line = Line::from(vec![
        Span::styled(model.to_string(), Style::default().fg(colors::DIM)),
        Span::raw(" "),
        Span::raw(format!(
            "↑{} ↓{} ",
            format_tokens(usage.input_tokens),
            format_tokens(usage.output_tokens)
        )),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_line.width() as u16)])
        .split(inner);
    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(right_line), chunks[1]);
}

// === Board ===

fn render_board(state: &mut AppState, coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    let tasks = coordinator.store.tasks();
    trace!(task_count = tasks.len(), "render_board: called");
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let columns = partition(tasks);
    for status in Status::ALL {
        let column_area = areas[status.index()];
        state.column_areas[status.index()] = column_area;
        render_column(
            state,
            &coordinator.board,
            status,
            &columns[status.index()],
            frame,
            column_area,
        );
    }
}

fn render_column(
    state: &mut AppState,
    board: &BoardController,
    status: Status,
    tasks: &[&Task],
    frame: &mut Frame,
    area: Rect,
) {
    trace!(%status, count = tasks.len(), "render_column: called");
    let focused = board.focus() == status;
    let border_color = match (focused, board.dragged()) {
        (true, Some(_)) => colors::DRAGGING,
        (true, None) => status_color(status),
        (false, _) => colors::DIM,
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {status}"),
            Style::default().fg(status_color(status)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" ({}) ", tasks.len()), Style::default().fg(colors::DIM)),
    ]);

    let editing = board.editing();
    let editing_field = match state.interaction_mode {
        InteractionMode::Editing { field } => Some(field),
        _ => None,
    };

    let mut lines: Vec<Line> = Vec::new();
    for (row, task) in tasks.iter().enumerate() {
        if let Some(edit) = editing.filter(|e| e.id == task.id) {
            lines.extend(form_lines(&edit.draft, editing_field, "✎ "));
            lines.push(Line::from(""));
            continue;
        }

        let selected = focused && row == board.selected_row(status);
        let is_dragged = board.dragged().is_some_and(|t| t.id == task.id);
        let bg = if selected { colors::SELECTED_BG } else { Color::Reset };
        let (marker, title_color) = if is_dragged {
            ("↔ ", colors::DRAGGING)
        } else if selected {
            ("▸ ", Color::White)
        } else {
            ("  ", Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(title_color).bg(bg)),
            Span::styled(
                task.title.clone(),
                Style::default().fg(title_color).bg(bg).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default().bg(bg)),
            Span::styled(task.description.clone(), Style::default().fg(colors::DIM).bg(bg)),
        ]));
        lines.push(Line::from(""));
    }

    let column = board.column(status);
    let adding_here = match state.interaction_mode {
        InteractionMode::Adding { status: s, field } if s == status => Some(field),
        _ => None,
    };
    if column.adding {
        if adding_here.is_none() {
            lines.push(Line::from(Span::styled(
                "  (draft parked, press a to resume)",
                Style::default().fg(colors::DIM),
            )));
        }
        lines.extend(form_lines(&column.draft, adding_here, "+ "));
    } else if tasks.is_empty() {
        lines.push(Line::from(Span::styled("  No tasks", Style::default().fg(colors::DIM))));
    }

    // Keep the selected card (or the add form) on screen
    let visible = (area.height.saturating_sub(2) / CARD_HEIGHT).max(1) as usize;
    let anchor = if adding_here.is_some() {
        Some(tasks.len())
    } else if focused {
        Some(board.selected_row(status))
    } else {
        None
    };
    let offset = column_offset(state.column_scroll[status.index()], anchor, visible, tasks.len());
    state.column_scroll[status.index()] = offset;
    let scroll = u16::try_from(offset * CARD_HEIGHT as usize).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(title),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// First visible card so `anchor` stays within `visible` cards, moving as little as possible
fn column_offset(current: usize, anchor: Option<usize>, visible: usize, len: usize) -> usize {
    let current = current.min(len.saturating_sub(visible));
    match anchor {
        Some(row) if row < current => row,
        Some(row) if row >= current + visible => row + 1 - visible,
        _ => current,
    }
}

/// Two-line title/description form; `active` marks the field being typed
fn form_lines<'a>(draft: &'a Draft, active: Option<Field>, marker: &'a str) -> Vec<Line<'a>> {
    let field_line = |label: &'a str, text: &'a str, field: Field, prefix: &'a str| {
        let is_active = active == Some(field);
        let label_style = if is_active {
            Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::DIM)
        };
        let mut spans = vec![
            Span::raw(prefix),
            Span::styled(label, label_style),
            Span::raw(text),
        ];
        if is_active {
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
        Line::from(spans)
    };
    vec![
        field_line("Title: ", &draft.title, Field::Title, marker),
        field_line("Desc:  ", &draft.description, Field::Description, "  "),
    ]
}

// === Chat ===

fn render_chat_view(state: &mut AppState, coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    trace!("render_chat_view: called");
    let banner_height = if coordinator.chat.error().is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    if let Some(error) = coordinator.chat.error() {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                " Error: ",
                Style::default().fg(colors::CHAT_ERROR).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error, Style::default().fg(colors::CHAT_ERROR)),
            Span::styled("  [x] dismiss", Style::default().fg(colors::DIM)),
        ]));
        frame.render_widget(banner, chunks[0]);
    }

    render_chat_history(state, coordinator, frame, chunks[1]);
    render_chat_input(state, coordinator, frame, chunks[2]);
}

fn render_chat_history(state: &mut AppState, coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    let messages = coordinator.chat.messages();
    trace!(history_len = messages.len(), "render_chat_history: called");
    let mut lines: Vec<Line> = Vec::new();

    for msg in messages {
        match msg.role {
            Role::User => {
                for (i, content_line) in msg.content.lines().enumerate() {
                    let prefix = if i == 0 { "> " } else { "  " };
                    lines.push(Line::from(vec![
                        Span::styled(
                            prefix,
                            Style::default().fg(colors::CHAT_USER).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(content_line, Style::default().fg(colors::CHAT_USER)),
                    ]));
                }
            }
            Role::Assistant => {
                let markdown_text = tui_markdown::from_str(&msg.content);
                for line in markdown_text.lines.iter() {
                    let mut spans = vec![Span::raw("  ")];
                    spans.extend(line.spans.iter().cloned());
                    lines.push(Line::from(spans));
                }
            }
            // Tool exchanges never reach the transcript
            Role::Tool => continue,
        }
        lines.push(Line::from(""));
    }

    let phase = coordinator.chat.phase();
    if phase.is_busy() {
        let word = if state.streaming_word.is_empty() { "Thinking" } else { &state.streaming_word };
        let elapsed = state
            .streaming_start
            .map(|t| format_streaming_duration(t.elapsed()))
            .unwrap_or_else(|| "0s".to_string());
        lines.push(Line::from(Span::styled(
            format!("* {}... ({} · {})", word, phase.label(), elapsed),
            Style::default().fg(colors::DIM),
        )));
    }

    if messages.is_empty() && !phase.is_busy() {
        lines.push(Line::from(Span::styled(
            "Ask about your tasks",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press i to type a message, Enter to send.",
            Style::default().fg(colors::DIM),
        )));
    }

    let viewport_height = area.height as usize;
    let viewport_width = area.width as usize;
    let content_height: usize = lines
        .iter()
        .map(|line| {
            let line_width = line.width();
            if viewport_width == 0 || line_width == 0 {
                1
            } else {
                line_width.div_ceil(viewport_width)
            }
        })
        .sum();
    let max_scroll = content_height.saturating_sub(viewport_height);
    state.chat_max_scroll = max_scroll;
    let scroll = state.chat_scroll.unwrap_or(max_scroll).min(max_scroll);

    let history = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(history, area);
}

fn render_chat_input(state: &AppState, coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    trace!(input_len = state.chat_input.len(), "render_chat_input: called");
    let active = state.interaction_mode == InteractionMode::ChatInput;
    let busy = coordinator.chat.is_busy();
    let input_style = if busy {
        Style::default().fg(colors::DIM)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![Span::styled(
        "> ",
        Style::default().fg(colors::CHAT_USER).add_modifier(Modifier::BOLD),
    )];
    if state.chat_input.is_empty() && !active {
        spans.push(Span::styled("Type your message...", Style::default().fg(colors::DIM)));
    } else {
        spans.push(Span::styled(state.chat_input.as_str(), input_style));
    }
    if active && !busy {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    let border = if active { colors::KEYBIND } else { colors::DIM };
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);
}

// === Footer and overlays ===

fn render_footer(state: &AppState, coordinator: &Coordinator, frame: &mut Frame, area: Rect) {
    trace!(?state.interaction_mode, "render_footer: called");
    let keybinds: Vec<(&str, &str)> = match state.interaction_mode {
        InteractionMode::Adding { .. } => vec![
            ("[Tab]", "Field"),
            ("[Enter]", "Save"),
            ("[Ctrl+P]", "Park"),
            ("[Esc]", "Cancel"),
        ],
        InteractionMode::Editing { .. } => vec![("[Tab]", "Field"), ("[Enter]", "Save"), ("[Esc]", "Cancel")],
        InteractionMode::ChatInput => vec![("[Enter]", "Send"), ("[Esc]", "Done")],
        InteractionMode::Normal | InteractionMode::Help => match coordinator.tab() {
            Tab::Chat => vec![("[i]", "Type"), ("[c]", "Clear"), ("[j/k]", "Scroll")],
            Tab::Tasks => vec![
                ("[a]", "Add"),
                ("[e]", "Edit"),
                ("[d]", "Delete"),
                ("[m]", "Move"),
                ("[h/l]", "Column"),
            ],
        },
    };

    let mut left_spans = vec![Span::raw(" ")];
    if let Some(status) = &state.status_line {
        left_spans.push(Span::styled(format!("{status}  "), Style::default().fg(colors::TODO)));
    }
    for (key, action) in keybinds {
        left_spans.push(Span::styled(
            key,
            Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD),
        ));
        left_spans.push(Span::raw(format!(" {} ", action)));
    }

    let right_line = if state.interaction_mode.is_typing() {
        Line::from("")
    } else {
        Line::from(vec![
            Span::styled("[Tab]", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
            Span::raw(" Views "),
            Span::styled("[?]", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
            Span::raw(" Help "),
            Span::styled("[q]", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit "),
        ])
    };

    let footer_block = Block::default().borders(Borders::ALL);
    let inner = footer_block.inner(area);
    frame.render_widget(footer_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_line.width() as u16)])
        .split(inner);
    frame.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    frame.render_widget(Paragraph::new(right_line), chunks[1]);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = |name: &'static str| {
        Line::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD)))
    };
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )),
        Line::from(""),
        section("Global"),
        key_line("Tab", "Switch between Chat and Tasks"),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
        key_line("Ctrl+C", "Quit from anywhere"),
        Line::from(""),
        section("Chat"),
        key_line("i/Enter", "Type a message"),
        key_line("Enter", "Send (while typing)"),
        key_line("c", "Clear conversation"),
        key_line("x", "Dismiss error"),
        key_line("j/k", "Scroll"),
        Line::from(""),
        section("Tasks"),
        key_line("h/l", "Previous / next column"),
        key_line("j/k", "Move selection"),
        key_line("a", "Add task to column"),
        key_line("e/Enter", "Edit selected"),
        key_line("d", "Delete selected"),
        key_line("m/Space", "Pick up / drop card"),
        key_line("Esc", "Cancel move"),
        key_line("Mouse", "Drag a card onto another column"),
        Line::from(""),
        section("Forms"),
        key_line("Tab", "Switch title / description"),
        key_line("Ctrl+P", "Park the add form"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(help, popup_area);
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    trace!(percent_x, percent_y, "centered_rect: called");
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Format token count for display (e.g., "1.2K", "3.5M")
fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format duration for display (e.g., "45s", "1m 15s")
fn format_streaming_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;
    use taskstore::{MemoryStorage, SequentialIdSource, TaskStore};

    fn coordinator() -> Coordinator {
        let mut store = TaskStore::open(MemoryStorage::new(), SequentialIdSource::default());
        store.create(Task::new(1, "Fix bug", "in module X", Status::Doing));
        Coordinator::new(store, Err("no key".to_string()))
    }

    fn draw(state: &mut AppState, coordinator: &Coordinator) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|frame| render(state, coordinator, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_200), "1.2K");
        assert_eq!(format_tokens(3_500_000), "3.5M");
    }

    #[test]
    fn test_format_streaming_duration() {
        assert_eq!(format_streaming_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_streaming_duration(Duration::from_secs(75)), "1m 15s");
    }

    #[test]
    fn test_board_renders_columns_and_records_areas() {
        let mut coordinator = coordinator();
        coordinator.set_tab(Tab::Tasks);
        let mut state = AppState::new();

        let screen = draw(&mut state, &coordinator);

        assert!(screen.contains("TO-DO (0)"));
        assert!(screen.contains("DOING (1)"));
        assert!(screen.contains("DONE (0)"));
        assert!(screen.contains("Fix bug"));
        assert!(state.column_areas.iter().all(|a| a.width > 0));
    }

    #[test]
    fn test_column_offset_follows_anchor() {
        assert_eq!(column_offset(0, Some(2), 5, 10), 0);
        assert_eq!(column_offset(0, Some(7), 5, 10), 3);
        assert_eq!(column_offset(3, Some(1), 5, 10), 1);
        assert_eq!(column_offset(3, None, 5, 10), 3);
        // Stale offset after deletes
        assert_eq!(column_offset(8, None, 5, 4), 0);
        // Add form sits one past the last card
        assert_eq!(column_offset(0, Some(10), 5, 10), 6);
    }

    #[test]
    fn test_board_scrolls_to_selected_card() {
        let mut coordinator = coordinator();
        for id in 2..=13 {
            coordinator
                .store
                .create(Task::new(id, format!("Task {id}"), "details", Status::Todo));
        }
        coordinator.set_tab(Tab::Tasks);
        coordinator.board.set_focus(Status::Todo);
        coordinator.board.select(Status::Todo, 11);
        let mut state = AppState::new();

        let screen = draw(&mut state, &coordinator);

        assert!(screen.contains("Task 13"));
        assert!(!screen.contains("Task 2 "));
        let scroll = state.column_scroll[Status::Todo.index()];
        assert!(scroll > 0);
        let area = state.column_areas[Status::Todo.index()];
        assert_eq!(state.row_at(Status::Todo, area.y + 1), Some(scroll));
    }

    #[test]
    fn test_chat_renders_error_banner() {
        let mut coordinator = coordinator();
        coordinator.fail_turn("hello", "boom".to_string());
        let mut state = AppState::new();

        let screen = draw(&mut state, &coordinator);

        assert!(screen.contains(APP_TITLE));
        assert!(screen.contains("Error: boom"));
        assert!(screen.contains("> hello"));
    }
}
