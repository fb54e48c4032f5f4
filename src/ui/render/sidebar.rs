use super::Frame;
use crate::state::{Focus, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BLOCK_TITLE: &str = "Lists";

/// Render the smart lists followed by the user's projects.
///
pub fn sidebar(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.get_theme();
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));
    let title = match state.get_account() {
        Some(account) => format!("{} ({})", BLOCK_TITLE, account.name),
        None => BLOCK_TITLE.to_owned(),
    };
    if state.current_focus() == Focus::Sidebar {
        block = block
            .border_style(styling::active_block_border_style(theme))
            .title(Span::styled(title, styling::active_block_title_style()));
    } else {
        block = block.title(title);
    }

    let width = size.width.saturating_sub(2) as usize;
    let mut items: Vec<ListItem> = state
        .smart_list_counts()
        .iter()
        .map(|(list, count)| row(list.title(), *count, width))
        .collect();
    items.extend(
        state
            .get_projects()
            .iter()
            .map(|project| row(&project.name, state.project_task_count(&project.id), width)),
    );

    let list = List::new(items)
        .style(styling::normal_text_style(theme))
        .highlight_style(styling::active_list_item_style(theme))
        .block(block);
    frame.render_stateful_widget(list, size, state.get_sidebar_list_state());
}

/// A sidebar row with the count right-aligned.
///
fn row(label: &str, count: usize, width: usize) -> ListItem<'static> {
    let count = count.to_string();
    let padding = width.saturating_sub(label.chars().count() + count.len() + 1);
    ListItem::new(Line::from(vec![
        Span::raw(format!("{}{}", label, " ".repeat(padding))),
        Span::raw(count),
    ]))
}
