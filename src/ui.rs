use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::collections::HashMap;
use textwrap::wrap;
use tui_input::Input;

use parley::models::{AttachmentKind, Contact, DeliveryStatus, Message, Sender};
use parley::utils::{format_message_time, preview_snippet};

// Export types needed by the main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// Tag filters the console cycles through with Ctrl+T.
pub const TAG_FILTERS: &[&str] = &["all", "friends", "work", "family"];

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Contacts,
    Messages,
    Filter,
}

/// Render state for the two-pane console. All conversation data comes from
/// the store on every frame; this struct only holds view concerns.
pub struct ChatUI {
    pub input: Input,
    pub filter: Input,
    active_tab: Tab,
    pub contact_index: usize,
    pub tag_index: usize,
    pub recording_secs: Option<u64>,
    pub status_line: String,
    pub staged_labels: Vec<String>,
    pub reply_label: Option<String>,
    // Contact -> when the peer was last seen typing
    peer_typing: HashMap<String, chrono::DateTime<chrono::Utc>>,
}

impl ChatUI {
    pub fn new() -> Self {
        ChatUI {
            input: Input::default(),
            filter: Input::default(),
            active_tab: Tab::Messages,
            contact_index: 0,
            tag_index: 0,
            recording_secs: None,
            status_line: String::new(),
            staged_labels: Vec::new(),
            reply_label: None,
            peer_typing: HashMap::new(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn toggle_pane(&mut self) {
        self.active_tab = match self.active_tab {
            Tab::Contacts => Tab::Messages,
            Tab::Messages => Tab::Contacts,
            Tab::Filter => Tab::Contacts,
        };
    }

    pub fn tag_filter(&self) -> &'static str {
        TAG_FILTERS[self.tag_index % TAG_FILTERS.len()]
    }

    pub fn cycle_tag_filter(&mut self) {
        self.tag_index = (self.tag_index + 1) % TAG_FILTERS.len();
    }

    pub fn next_contact(&mut self, contact_count: usize) {
        if contact_count > 0 && self.contact_index + 1 < contact_count {
            self.contact_index += 1;
        }
    }

    pub fn prev_contact(&mut self) {
        self.contact_index = self.contact_index.saturating_sub(1);
    }

    pub fn set_peer_typing(&mut self, contact_id: &str) {
        self.peer_typing
            .insert(contact_id.to_string(), chrono::Utc::now());
    }

    pub fn clear_peer_typing(&mut self, contact_id: &str) {
        self.peer_typing.remove(contact_id);
    }

    pub fn is_peer_typing(&self, contact_id: &str) -> bool {
        self.peer_typing.contains_key(contact_id)
    }

    /// Drop typing states older than the timeout, in case a reply never
    /// lands to clear them.
    pub fn clean_typing_states(&mut self, timeout_secs: i64) {
        let now = chrono::Utc::now();
        self.peer_typing
            .retain(|_, seen| (now - *seen).num_seconds() <= timeout_secs);
    }

    pub fn draw<B: Backend>(
        &self,
        frame: &mut Frame<B>,
        contacts: &[Contact],
        active_id: Option<&str>,
        thread: &[Message],
        my_name: &str,
    ) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Contacts panel
                Constraint::Percentage(70), // Chat panel
            ])
            .split(size);

        let chat_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Messages area
                Constraint::Length(1), // Typing indicator / status line
                Constraint::Length(1), // Staged attachments / recording
                Constraint::Length(3), // Input box
                Constraint::Length(1), // Help line
            ])
            .split(chunks[1]);

        draw_contacts(frame, contacts, chunks[0], self);
        draw_thread(frame, thread, chat_chunks[0], active_id, my_name);

        // Typing / status line
        let typing_text = match active_id {
            Some(id) if self.is_peer_typing(id) => "typing…".to_string(),
            _ => self.status_line.clone(),
        };
        frame.render_widget(
            Paragraph::new(typing_text).style(Style::default().fg(Color::Gray)),
            chat_chunks[1],
        );

        // Staged attachments and recording banner
        let mut compose_state = Vec::new();
        if let Some(secs) = self.recording_secs {
            compose_state.push(Span::styled(
                format!("● REC {:02}:{:02}  ", secs / 60, secs % 60),
                Style::default().fg(Color::Red),
            ));
        }
        if let Some(reply) = &self.reply_label {
            compose_state.push(Span::styled(
                format!("↩ {}  ", reply),
                Style::default().fg(Color::Cyan),
            ));
        }
        if !self.staged_labels.is_empty() {
            compose_state.push(Span::styled(
                self.staged_labels.join("  "),
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(compose_state)), chat_chunks[2]);

        // Input box
        let input_title = match self.active_tab {
            Tab::Filter => format!("Filter: {}", self.filter.value()),
            _ => "Message".to_string(),
        };
        let input_block = Block::default()
            .title(input_title)
            .borders(Borders::ALL)
            .border_style(match self.active_tab {
                Tab::Messages => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            });
        let input_widget = Paragraph::new(self.input.value()).block(input_block);
        frame.render_widget(input_widget, chat_chunks[3]);

        let help = Paragraph::new(Line::from(vec![Span::styled(
            "ESC quit | TAB pane | / filter | Ctrl+T tag | Ctrl+R rec | Ctrl+A attach | Ctrl+E reply | Ctrl+S star | Ctrl+X del",
            Style::default().fg(Color::Gray),
        )]));
        frame.render_widget(help, chat_chunks[4]);

        // Cursor follows whichever input is being edited
        match self.active_tab {
            Tab::Messages => frame.set_cursor(
                chat_chunks[3].x + self.input.cursor() as u16 + 1,
                chat_chunks[3].y + 1,
            ),
            Tab::Filter => frame.set_cursor(
                chat_chunks[3].x + self.filter.cursor() as u16 + 1,
                chat_chunks[3].y + 1,
            ),
            Tab::Contacts => {}
        }
    }
}

fn draw_contacts<B: Backend>(f: &mut Frame<B>, contacts: &[Contact], area: Rect, ui: &ChatUI) {
    let items: Vec<ListItem> = contacts
        .iter()
        .map(|c| {
            let presence = if c.online { "●" } else { "○" };
            let unread = if c.unread_count > 0 {
                format!(" ({})", c.unread_count)
            } else {
                String::new()
            };
            let time = if c.last_message_time > 0 {
                format_message_time(c.last_message_time)
            } else {
                String::new()
            };
            let preview = preview_snippet(&c.last_message_preview, 24);

            let header_style = if c.unread_count > 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} {}{}", presence, c.name, unread),
                        header_style,
                    ),
                    Span::styled(format!("  {}", time), Style::default().fg(Color::Gray)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", preview),
                    Style::default().fg(Color::Gray),
                )),
            ];
            ListItem::new(lines)
        })
        .collect();

    let title = format!("Chats [{}]", ui.tag_filter());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(match ui.active_tab() {
                    Tab::Contacts | Tab::Filter => Style::default().fg(Color::Yellow),
                    _ => Style::default(),
                }),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !contacts.is_empty() {
        state.select(Some(ui.contact_index.min(contacts.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_thread<B: Backend>(
    f: &mut Frame<B>,
    thread: &[Message],
    area: Rect,
    active_id: Option<&str>,
    my_name: &str,
) {
    let wrap_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = thread
        .iter()
        .flat_map(|m| {
            let who = match m.sender {
                Sender::Me => my_name.to_string(),
                Sender::Peer => active_id.unwrap_or("peer").to_string(),
            };
            let star = if m.is_starred { "★ " } else { "" };
            let ticks = match m.sender {
                Sender::Me => match m.status {
                    DeliveryStatus::Sent => " ✓",
                    DeliveryStatus::Delivered => " ✓✓",
                    DeliveryStatus::Read => " ✓✓✓",
                },
                Sender::Peer => "",
            };

            let mut lines: Vec<String> = Vec::new();
            if let Some(reply) = &m.reply_to {
                lines.push(format!(
                    "  ┌ {}: {}",
                    reply.sender_label,
                    preview_snippet(&reply.content, 40)
                ));
            }
            let body = format!(
                "[{}] {}{}: {}{}",
                format_message_time(m.timestamp),
                star,
                who,
                m.content,
                ticks
            );
            lines.extend(wrap(&body, wrap_width).into_iter().map(|l| l.into_owned()));
            for attachment in &m.attachments {
                let extra = match attachment.kind {
                    AttachmentKind::Location => format!(" @ {}", attachment.source_ref),
                    _ => String::new(),
                };
                lines.push(format!(
                    "  ⎙ [{}] {}{}",
                    attachment.kind.label(),
                    attachment.display_name,
                    extra
                ));
            }

            let style = match m.sender {
                Sender::Me => match m.status {
                    DeliveryStatus::Delivered | DeliveryStatus::Read => {
                        Style::default().fg(Color::Green)
                    }
                    DeliveryStatus::Sent => Style::default().fg(Color::Blue),
                },
                Sender::Peer => Style::default(),
            };

            lines
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    let title = match active_id {
        Some(id) => format!("Messages: {}", id),
        None => "Messages".to_string(),
    };

    // Keep the newest message scrolled into view without highlighting it
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(items.len() - 1));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, area, &mut state);
}
