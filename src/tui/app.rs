//! TUI application - main event loop and terminal management.
//!
//! This module contains the core TUI application logic including:
//! - Terminal setup and restoration
//! - Event loop for keyboard input
//! - Tree pane with cursor, expand/collapse and refresh
//! - Modal editor dispatch and delete confirmation
//!
//! One backend operation runs at a time, blocking only the key that
//! initiated it; nothing is cancelable once dispatched, and the tree
//! shown is always the result of the last completed fetch.

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::editor::{EditorModal, ModalEvent, centered_rect};
use crate::api::ApiClient;
use crate::editor::EditorMode;
use crate::models::MenuName;
use crate::models::tree::{ExpansionState, visible_rows};
use crate::render::render_row;

/// One-line feedback shown in the status bar.
struct StatusLine {
    message: String,
    is_error: bool,
}

impl StatusLine {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// A delete waiting for its y/n confirmation.
struct PendingDelete {
    id: i64,
    code_name: String,
}

/// TUI application state.
struct App {
    client: ApiClient,
    tree: Vec<crate::models::CodeNode>,
    expansion: ExpansionState,
    cursor: usize,
    status: Option<StatusLine>,
    modal: Option<EditorModal>,
    confirm_delete: Option<PendingDelete>,
    should_quit: bool,
}

impl App {
    fn new(client: ApiClient) -> Self {
        Self {
            client,
            tree: Vec::new(),
            expansion: ExpansionState::new(),
            cursor: 0,
            status: None,
            modal: None,
            confirm_delete: None,
            should_quit: false,
        }
    }

    fn row_count(&self) -> usize {
        visible_rows(&self.tree, &self.expansion).len()
    }

    /// Identity of the row under the cursor: (id, label, expandable).
    fn selected(&self) -> Option<(i64, String, bool)> {
        visible_rows(&self.tree, &self.expansion)
            .get(self.cursor)
            .map(|row| (row.node.id, row.node.code_name.clone(), row.expandable))
    }

    /// Replace the tree with a fresh fetch. Expansion resets to
    /// all-collapsed; on failure the previous tree stays as it was.
    fn refresh(&mut self) {
        match self.client.fetch_codes() {
            Ok(tree) => {
                self.tree = tree;
                self.expansion.clear();
                self.cursor = 0;
            }
            Err(e) => {
                self.status = Some(StatusLine::error(format!("Refresh failed: {}", e)));
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        // Modal editor swallows all input while open
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        // Pending delete confirmation
        if let Some(pending) = self.confirm_delete.take() {
            if matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.delete(pending);
            } else {
                self.status = Some(StatusLine::info("Delete cancelled"));
            }
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                let count = self.row_count();
                if count > 0 && self.cursor + 1 < count {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor = self.row_count().saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some((id, _, expandable)) = self.selected() {
                    if expandable {
                        self.expansion.toggle(id);
                    }
                }
            }
            KeyCode::Char('r') => {
                self.refresh();
                if self.status.is_none() {
                    self.status = Some(StatusLine::info("Refreshed"));
                }
            }
            KeyCode::Char('n') => {
                self.modal = Some(EditorModal::create_root(MenuName::Library));
            }
            KeyCode::Char('a') => {
                if let Some((id, _, _)) = self.selected() {
                    match EditorModal::create_child(&self.tree, id) {
                        Ok(modal) => self.modal = Some(modal),
                        Err(e) => self.status = Some(StatusLine::error(e.to_string())),
                    }
                }
            }
            KeyCode::Char('e') => {
                if let Some((id, _, _)) = self.selected() {
                    match EditorModal::edit(&self.tree, id) {
                        Ok(modal) => self.modal = Some(modal),
                        Err(e) => self.status = Some(StatusLine::error(e.to_string())),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some((id, code_name, _)) = self.selected() {
                    self.confirm_delete = Some(PendingDelete { id, code_name });
                }
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyCode) {
        let Some(mut modal) = self.modal.take() else {
            return;
        };
        match modal.handle_key(key) {
            ModalEvent::None => self.modal = Some(modal),
            ModalEvent::Cancel => {}
            ModalEvent::Submit => self.submit_modal(modal),
        }
    }

    /// Build the payload, dispatch it, and refetch on success. A
    /// failed save keeps the modal open with the backend's message so
    /// the input can be corrected and retried.
    fn submit_modal(&mut self, mut modal: EditorModal) {
        let payload = match modal.build_payload() {
            Ok(payload) => payload,
            Err(e) => {
                modal.error = Some(e.to_string());
                self.modal = Some(modal);
                return;
            }
        };

        let (result, verb) = match modal.mode() {
            EditorMode::Create => (self.client.create_code(&payload), "Created"),
            EditorMode::Edit(id) => (self.client.update_code(id, &payload), "Updated"),
        };

        match result {
            Ok(()) => {
                self.status = Some(StatusLine::info(format!(
                    "{} \"{}\"",
                    verb, payload.code_name
                )));
                self.refresh();
            }
            Err(e) => {
                modal.error = Some(e.to_string());
                self.modal = Some(modal);
            }
        }
    }

    fn delete(&mut self, pending: PendingDelete) {
        match self.client.delete_code(pending.id) {
            Ok(()) => {
                self.status = Some(StatusLine::info(format!(
                    "Deleted \"{}\"",
                    pending.code_name
                )));
                self.refresh();
            }
            Err(e) => {
                // Tree stays exactly as rendered before the attempt
                self.status = Some(StatusLine::error(e.to_string()));
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Tree pane
                Constraint::Length(3), // Status bar
            ])
            .split(frame.area());

        self.render_title_bar(frame, chunks[0]);
        self.render_tree(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);

        if let Some(ref modal) = self.modal {
            modal.render(frame, frame.area());
        } else if let Some(ref pending) = self.confirm_delete {
            self.render_confirm(frame, frame.area(), pending);
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(" motcode ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("— {}", self.client.base_url()),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    fn render_tree(&self, frame: &mut Frame, area: Rect) {
        let rows = visible_rows(&self.tree, &self.expansion);

        let lines: Vec<Line> = if rows.is_empty() {
            vec![Line::from(Span::styled(
                " No codes defined (press n to create one)",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            rows.iter()
                .enumerate()
                .map(|(index, row)| {
                    let text = render_row(row);
                    if index == self.cursor {
                        Line::from(Span::styled(
                            text,
                            Style::default().add_modifier(Modifier::REVERSED),
                        ))
                    } else {
                        Line::from(text)
                    }
                })
                .collect()
        };

        // Keep the cursor inside the viewport
        let inner_height = area.height.saturating_sub(2) as usize;
        let offset = if inner_height > 0 {
            self.cursor.saturating_sub(inner_height - 1)
        } else {
            0
        };

        let pane = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Classification tree "),
            )
            .scroll((offset as u16, 0));
        frame.render_widget(pane, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = match self.status {
            Some(ref status) => {
                let color = if status.is_error {
                    Color::Red
                } else {
                    Color::Green
                };
                Line::from(Span::styled(
                    format!(" {}", status.message),
                    Style::default().fg(color),
                ))
            }
            None => Line::from(Span::styled(
                " j/k:Move  Enter:Expand  n:New root  a:Add child  e:Edit  d:Delete  r:Refresh  q:Quit",
                Style::default().fg(Color::DarkGray),
            )),
        };
        let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect, pending: &PendingDelete) {
        let popup = centered_rect(area, 46, 5);
        frame.render_widget(Clear, popup);
        let text = vec![
            Line::from(format!(
                " Delete code #{} \"{}\"?",
                pending.id, pending.code_name
            )),
            Line::default(),
            Line::from(Span::styled(
                " y:Delete  any other key:Cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default().borders(Borders::ALL).title(" Confirm ");
        frame.render_widget(Paragraph::new(text).block(block), popup);
    }
}

/// Setup the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the interactive tree editor against `server_url`.
pub fn run(server_url: &str) -> crate::Result<()> {
    let mut app = App::new(ApiClient::new(server_url));
    app.refresh();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app);
    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> crate::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
