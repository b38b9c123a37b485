//! Console pane rendering

use crate::snapshot::Console;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console pane.
///
/// `input_buffer` is `Some` while the user is typing a value for a starved program.
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    console: &Console,
    input_buffer: Option<&str>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = console.get_output();

    if lines.is_empty() && input_buffer.is_none() {
        let paragraph = Paragraph::new("(no input or output yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let mut all_items: Vec<ListItem> = lines
        .into_iter()
        .map(|line| {
            let color = if line.starts_with("<<") {
                DEFAULT_THEME.secondary
            } else {
                DEFAULT_THEME.fg
            };
            ListItem::new(line).style(Style::default().fg(color))
        })
        .collect();

    if let Some(buffer) = input_buffer {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("<< ", Style::default().fg(DEFAULT_THEME.secondary)),
            Span::styled(
                format!("{}_", buffer),
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
        ])));
    }

    // Calculate visible range for scrolling
    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
