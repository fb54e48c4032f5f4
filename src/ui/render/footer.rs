use super::widgets::spinner;
use super::Frame;
use crate::state::{Focus, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

const PROMPT_HOTKEYS: &str = " Enter: submit, Esc: cancel, Backspace: delete";
const SIDEBAR_HOTKEYS: &str =
    " j/k: navigate, Enter: open, Tab: tasks, f: filter, a: add task, p: new project, r: refresh, l: log, q: quit";
const TASKS_HOTKEYS: &str =
    " j/k: navigate, m: load more, x: complete, d: delete, f: filter, a: add task, Tab: lists, q: quit";

/// Render the hotkey hints and the status line.
///
pub fn footer(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.get_theme();
    let hotkeys = if state.is_prompt_open() {
        PROMPT_HOTKEYS
    } else {
        match state.current_focus() {
            Focus::Sidebar => SIDEBAR_HOTKEYS,
            Focus::Tasks => TASKS_HOTKEYS,
        }
    };

    let status = match state.get_status() {
        Some(status) => Span::styled(format!(" {}", status), styling::status_style(theme)),
        None if !state.is_loaded() => Span::styled(
            format!(" {} Loading tasks...", spinner::frame(state)),
            styling::muted_text_style(theme),
        ),
        None => Span::styled(
            format!(
                " Filter: {}  Showing {} of {}",
                state.filter_label(),
                state.get_reveal().visible_items().len(),
                state.get_filter().filtered_count()
            ),
            styling::muted_text_style(theme),
        ),
    };

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(hotkeys, styling::muted_text_style(theme))),
        Line::from(status),
    ]);
    frame.render_widget(paragraph, size);
}
