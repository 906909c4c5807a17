use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::config::RgbColor;
use crate::contact::Contact;
use crate::view::Phase;

use super::app::{display_name, App, Focus};

const TITLE: &str = "Contact Manager";
const ADD_LINK: &str = "[a] Add contacts";
const DESCRIPTION: &str =
    "A contact manager is a tool designed to save, view, add, edit, and delete contact information efficiently.";
const CARD_ACTIONS: &str = "[v] view  [e] edit  [d] delete";
const LIST_HELP: &str = "/: search  j/k: move  r: reload  q: quit";
const SEARCH_HELP: &str = "Type to filter  Esc/Enter: back to list";

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_search(frame, layout[1], app);
    draw_body(frame, layout[2], app);
    draw_footer(frame, layout[3], app);
    draw_confirm_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let accent = color(app.config().ui.colors.accent);
    let lines = vec![
        Line::from(vec![
            Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(ADD_LINK, Style::default().fg(accent)),
        ]),
        Line::from(Span::styled(
            DESCRIPTION,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let focused = app.focus() == Focus::Search;
    let border_style = if focused {
        Style::default().fg(color(app.config().ui.colors.accent))
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Search Names");
    let inner = block.inner(area);

    let input = app.search_input();
    let width = inner.width.max(1) as usize;
    let scroll = input.visual_scroll(width);
    let paragraph = Paragraph::new(input.value())
        .scroll((0, scroll as u16))
        .block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let cursor = input.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((inner.x + cursor, inner.y));
    }
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let state = app.view().state();

    if state.loading {
        let text = format!("{} {}", app.spinner_frame(), app.config().ui.spinner);
        let spinner = Paragraph::new(text).alignment(Alignment::Center);
        frame.render_widget(spinner, centered_line(area));
        return;
    }

    let mut list_area = area;
    if !state.error_message.is_empty() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);
        let error = Paragraph::new(state.error_message.as_str())
            .style(Style::default().fg(color(app.config().ui.colors.error_fg)))
            .wrap(Wrap { trim: true });
        frame.render_widget(error, chunks[0]);
        list_area = chunks[1];
    }

    let contacts = &state.filtered_contacts;
    if contacts.is_empty() {
        if state.error_message.is_empty() {
            frame.render_widget(
                Paragraph::new("No contacts").alignment(Alignment::Center),
                centered_line(list_area),
            );
        }
        return;
    }

    let colors = &app.config().ui.colors;
    let items: Vec<ListItem> = contacts.iter().map(contact_card).collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(color(colors.selection_fg))
                .bg(color(colors.selection_bg)),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected()));
    frame.render_stateful_widget(list, list_area, &mut list_state);
}

fn contact_card(contact: &Contact) -> ListItem<'_> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::raw("Name: "), Span::styled(contact.name_or_blank(), bold)]),
        Line::from(vec![
            Span::raw("Mobile: "),
            Span::styled(contact.mobile_or_blank(), bold),
        ]),
        Line::from(vec![
            Span::raw("Email: "),
            Span::styled(contact.email_or_blank(), bold),
        ]),
        Line::from(vec![
            Span::raw("Image: "),
            Span::raw(contact.image_or_blank()),
        ]),
        Line::from(Span::styled(
            CARD_ACTIONS,
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
    ];
    ListItem::new(lines)
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let view = app.view();
    let summary = match app.status() {
        Some(status) => status.to_string(),
        None => match view.phase() {
            Phase::Loading => "Loading".to_string(),
            Phase::Error => "Error".to_string(),
            Phase::Idle => format!(
                "{} of {} contacts",
                view.filtered_contacts().len(),
                view.state().contacts.len()
            ),
        },
    };
    let help = match app.focus() {
        Focus::Search => SEARCH_HELP,
        Focus::List => LIST_HELP,
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(help.len() as u16)])
        .split(area);

    let accent = color(app.config().ui.colors.accent);
    frame.render_widget(
        Paragraph::new(summary).style(Style::default().fg(accent)),
        chunks[0],
    );
    frame.render_widget(Paragraph::new(help), chunks[1]);
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(contact) = app.confirm_delete() else {
        return;
    };

    let message = format!("Delete {}? (y/n)", display_name(contact));
    let width = (message.len() as u16 + 4).min(area.width);
    let popup = centered_rect(width, 3, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(app.config().ui.colors.error_fg)))
        .title("DELETE CONTACT");
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block),
        popup,
    );
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: area.height.min(1),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
