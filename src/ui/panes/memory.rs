//! Memory pane rendering
//!
//! Shows the address space as a grid of words, eight per row. Words written by
//! the step that produced the current snapshot are highlighted, as is the word
//! at the instruction pointer. A faulting address is shown in the error color.
//! Words written far past the dense region follow the grid, one per row.

use crate::snapshot::Snapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustc_hash::FxHashMap;

/// Words shown per grid row
pub const WORDS_PER_ROW: usize = 8;

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    changed: &FxHashMap<usize, (i64, i64)>,
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

    let words = snapshot.memory.words();
    let sparse = snapshot.memory.sparse_words();
    let title = if sparse.is_empty() {
        format!(" Memory ({} words) ", words.len())
    } else {
        format!(" Memory ({} words + {} far) ", words.len(), sparse.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if words.is_empty() && sparse.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let fault_address = snapshot
        .fault
        .as_ref()
        .and_then(|f| f.address())
        .and_then(|a| usize::try_from(a).ok());

    let word_style = |address: usize, word: i64| {
        if Some(address) == fault_address {
            Style::default()
                .bg(DEFAULT_THEME.error)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if address == snapshot.ip {
            Style::default()
                .bg(DEFAULT_THEME.primary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else if changed.contains_key(&address) {
            Style::default()
                .fg(DEFAULT_THEME.changed)
                .add_modifier(Modifier::BOLD)
        } else if word == 0 {
            Style::default().fg(DEFAULT_THEME.comment)
        } else {
            Style::default().fg(DEFAULT_THEME.number)
        }
    };

    // Column width fits the widest word in memory
    let cell_width = words
        .iter()
        .chain(sparse.iter().map(|(_, word)| word))
        .map(|w| w.to_string().len())
        .max()
        .unwrap_or(1)
        .max(3);

    let dense_rows = words.len().div_ceil(WORDS_PER_ROW);
    let total_rows = dense_rows + sparse.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if total_rows > visible_height {
        *scroll_offset = (*scroll_offset).min(total_rows - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let address_span = |address: usize| {
        vec![
            Span::styled(
                format!("{:05}", address),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(" │", Style::default().fg(DEFAULT_THEME.comment)),
        ]
    };

    let rows: Vec<Line> = (*scroll_offset..total_rows)
        .take(visible_height)
        .map(|row| {
            if row >= dense_rows {
                let (address, word) = sparse[row - dense_rows];
                let mut spans = address_span(address);
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("{:>width$}", word, width = cell_width),
                    word_style(address, word),
                ));
                return Line::from(spans);
            }

            let base = row * WORDS_PER_ROW;
            let end = (base + WORDS_PER_ROW).min(words.len());
            let mut spans = address_span(base);
            for (address, &word) in (base..end).zip(&words[base..end]) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("{:>width$}", word, width = cell_width),
                    word_style(address, word),
                ));
            }

            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(rows).block(block), area);
}
