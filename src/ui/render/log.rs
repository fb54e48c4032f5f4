use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, List, ListItem},
};

/// Render the most recent log entries that fit in the panel.
///
pub fn log(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.get_theme();
    let block = Block::default()
        .title("Log (l: hide)")
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));

    let entries = state.get_log_entries();
    let capacity = size.height.saturating_sub(2) as usize;
    let skip = entries.len().saturating_sub(capacity);
    let items: Vec<ListItem> = entries.into_iter().skip(skip).map(ListItem::new).collect();

    let list = List::new(items)
        .style(styling::muted_text_style(theme))
        .block(block);
    frame.render_widget(list, size);
}
