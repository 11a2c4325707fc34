//! Modal editor state for the TUI.
//!
//! Wraps [`EditorForm`] with the screen-side concerns: text buffers,
//! field focus, menu cycling, and inline error display. The form
//! decides which fields exist and what the payload looks like; this
//! type only moves keystrokes into it.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::editor::{EditorForm, EditorMode};
use crate::models::tree::find_node;
use crate::models::{CodeNode, CodePayload, MenuName, NodeLevel};
use crate::{Error, Result};

/// A focusable field of the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Menu,
    CodeName,
    Description,
    SortOrder,
}

/// What a keystroke did to the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    /// Keep the modal open
    None,
    /// User cancelled; discard the modal
    Cancel,
    /// User asked to save; build the payload and dispatch
    Submit,
}

/// In-screen state of the node editor modal.
pub struct EditorModal {
    form: EditorForm,
    title: String,
    focus: Field,
    code_name: String,
    description: String,
    sort_input: String,
    menu_index: usize,
    /// Last failed-save message; the modal stays open so the input can
    /// be corrected and retried
    pub error: Option<String>,
}

impl EditorModal {
    fn from_form(form: EditorForm, title: String) -> Self {
        let menu_index = MenuName::ALL
            .iter()
            .position(|menu| *menu == form.menu_name())
            .unwrap_or(0);

        Self {
            title,
            focus: Field::CodeName,
            code_name: form.code_name().to_string(),
            description: form.description().to_string(),
            sort_input: form
                .sort_order()
                .map(|order| order.to_string())
                .unwrap_or_default(),
            menu_index,
            error: None,
            form,
        }
    }

    /// Modal for a new level-1 code.
    pub fn create_root(menu: MenuName) -> Self {
        Self::from_form(
            EditorForm::create_root(menu),
            "New level-1 code".to_string(),
        )
    }

    /// Modal for a new child of `parent_id`.
    pub fn create_child(tree: &[CodeNode], parent_id: i64) -> Result<Self> {
        let form = EditorForm::create_child(tree, parent_id)?;
        let parent_name = find_node(tree, parent_id)
            .map(|node| node.code_name.clone())
            .unwrap_or_else(|| format!("#{}", parent_id));
        let title = format!("New {} code under \"{}\"", form.level(), parent_name);
        Ok(Self::from_form(form, title))
    }

    /// Modal for editing an existing code.
    pub fn edit(tree: &[CodeNode], id: i64) -> Result<Self> {
        let form = EditorForm::edit(tree, id)?;
        let title = format!("Edit code #{} ({})", id, form.level());
        Ok(Self::from_form(form, title))
    }

    /// What the modal was opened for.
    pub fn mode(&self) -> EditorMode {
        self.form.mode()
    }

    fn focusable_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.form.menu_editable() {
            fields.push(Field::Menu);
        }
        fields.push(Field::CodeName);
        fields.push(Field::Description);
        if self.form.shows_sort_order() {
            fields.push(Field::SortOrder);
        }
        fields
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.focusable_fields();
        let current = fields
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn cycle_menu(&mut self, forward: bool) {
        let len = MenuName::ALL.len();
        self.menu_index = if forward {
            (self.menu_index + 1) % len
        } else {
            (self.menu_index + len - 1) % len
        };
    }

    /// Feed one keystroke into the modal.
    pub fn handle_key(&mut self, key: KeyCode) -> ModalEvent {
        match key {
            KeyCode::Esc => return ModalEvent::Cancel,
            KeyCode::Enter => return ModalEvent::Submit,
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            KeyCode::Left => {
                if self.focus == Field::Menu {
                    self.cycle_menu(false);
                }
            }
            KeyCode::Right => {
                if self.focus == Field::Menu {
                    self.cycle_menu(true);
                }
            }
            KeyCode::Backspace => match self.focus {
                Field::CodeName => {
                    self.code_name.pop();
                }
                Field::Description => {
                    self.description.pop();
                }
                Field::SortOrder => {
                    self.sort_input.pop();
                }
                Field::Menu => {}
            },
            KeyCode::Char(c) => match self.focus {
                Field::CodeName => self.code_name.push(c),
                Field::Description => self.description.push(c),
                Field::SortOrder => {
                    if c.is_ascii_digit() {
                        self.sort_input.push(c);
                    }
                }
                Field::Menu => {
                    if c == ' ' {
                        self.cycle_menu(true);
                    }
                }
            },
            _ => {}
        }
        ModalEvent::None
    }

    /// Apply the buffers to the form and assemble the wire payload.
    pub fn build_payload(&mut self) -> Result<CodePayload> {
        self.form.set_code_name(self.code_name.clone());
        self.form.set_description(self.description.clone());
        if self.form.menu_editable() {
            self.form.set_menu_name(MenuName::ALL[self.menu_index])?;
        }
        if self.form.shows_sort_order() {
            let trimmed = self.sort_input.trim();
            // An emptied field falls back to the preloaded value
            if !trimmed.is_empty() {
                let order: i64 = trimmed.parse().map_err(|_| {
                    Error::InvalidInput(format!("sort order must be a number, got {:?}", trimmed))
                })?;
                self.form.set_sort_order(order)?;
            }
        }
        self.form.payload()
    }

    fn field_line(&self, field: Field, label: &str, value: String) -> Line<'_> {
        let focused = self.focus == field;
        let mut spans = vec![Span::styled(
            format!("  {:<13}", label),
            Style::default().fg(Color::DarkGray),
        )];

        let value_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(value, value_style));
        if focused {
            spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    }

    /// Render the modal centered in `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 52, 11);
        frame.render_widget(Clear, popup);

        let menu_value = if self.form.menu_editable() {
            format!("◂ {} ▸", MenuName::ALL[self.menu_index])
        } else {
            format!("{} (inherited)", self.form.menu_name())
        };

        let mut lines = vec![
            self.field_line(Field::Menu, "Menu", menu_value),
            self.field_line(Field::CodeName, "Name", self.code_name.clone()),
            self.field_line(Field::Description, "Description", self.description.clone()),
        ];
        if self.form.shows_sort_order() {
            lines.push(self.field_line(Field::SortOrder, "Order", self.sort_input.clone()));
        }
        if matches!(self.form.level(), NodeLevel::Level1) {
            lines.push(Line::from(Span::styled(
                "  ◂/▸ changes the menu",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
        if let Some(ref error) = self.error {
            lines.push(Line::from(Span::styled(
                format!("  {}", error),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "  Tab:Next field  Enter:Save  Esc:Cancel",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title));
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// A centered rectangle of at most `width` x `height` inside `area`.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
