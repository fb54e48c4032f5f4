use super::widgets::spinner;
use super::Frame;
use crate::backend::Task;
use crate::state::{Focus, State};
use crate::ui::widgets::styling;
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Render the revealed tasks of the current view.
///
pub fn tasks(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.get_theme();
    let reveal = state.get_reveal();
    let title = format!(
        "{} [{}] {}/{}",
        state.view_title(),
        state.filter_label(),
        reveal.visible_items().len(),
        reveal.items().len()
    );
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));
    if state.current_focus() == Focus::Tasks {
        block = block
            .border_style(styling::active_block_border_style(theme))
            .title(Span::styled(title, styling::active_block_title_style()));
    } else {
        block = block.title(title);
    }

    if !state.is_loaded() {
        frame.render_widget(spinner::widget(state, size.height).block(block), size);
        return;
    }
    if reveal.items().is_empty() {
        let empty = Paragraph::new("No tasks here.")
            .style(styling::muted_text_style(theme))
            .block(block);
        frame.render_widget(empty, size);
        return;
    }

    // Rows of the newest page light up one after another.
    let elapsed = state.reveal_elapsed();
    let mut items: Vec<ListItem> = reveal
        .visible_items()
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let style = match reveal.item_style(index).animation_delay {
                _ if task.completed => styling::completed_task_style(theme),
                Some(delay) if delay > elapsed => styling::muted_text_style(theme),
                Some(_) => styling::entering_item_style(theme),
                None => styling::normal_text_style(theme),
            };
            task_item(task, state.task_project_name(task), style)
        })
        .collect();

    let remaining = reveal.items().len() - reveal.visible_items().len();
    if reveal.is_loading() {
        items.push(ListItem::new(Span::styled(
            format!("{} Loading more...", spinner::frame(state)),
            styling::muted_text_style(theme),
        )));
    } else if reveal.has_more() {
        items.push(ListItem::new(Span::styled(
            format!("{} more (m to load)", remaining),
            styling::muted_text_style(theme),
        )));
    }

    let list = List::new(items)
        .highlight_style(styling::active_list_item_style(theme))
        .highlight_symbol("> ")
        .block(block);
    frame.render_stateful_widget(list, size, state.get_tasks_list_state());
}

fn task_item(task: &Task, project: Option<&str>, style: Style) -> ListItem<'static> {
    let mut spans = vec![
        Span::styled(if task.completed { "[x] " } else { "[ ] " }, style),
        Span::styled(task.content.to_owned(), style),
    ];
    if let Some(due) = task.due_date {
        spans.push(Span::styled(
            format!("  {}", due.with_timezone(&Local).format("%b %d")),
            style,
        ));
    }
    if let Some(project) = project {
        spans.push(Span::styled(format!("  #{}", project), style));
    }
    ListItem::new(Line::from(spans))
}
