mod footer;
mod log;
mod prompt;
mod sidebar;
mod tasks;

use self::log::log;
use super::*;
use crate::state::State;
use footer::footer;
use prompt::prompt;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use sidebar::sidebar;
use tasks::tasks;

const SIDEBAR_WIDTH: u16 = 30;
const LOG_HEIGHT: u16 = 10;
const FOOTER_HEIGHT: u16 = 2;

/// Render every widget according to state.
///
pub fn render(frame: &mut Frame, state: &mut State) {
    let size = frame.size();

    let mut constraints = vec![Constraint::Min(5)];
    if state.is_log_visible() {
        constraints.push(Constraint::Length(LOG_HEIGHT));
    }
    constraints.push(Constraint::Length(FOOTER_HEIGHT));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[0]);
    sidebar(frame, columns[0], state);
    tasks(frame, columns[1], state);

    if state.is_log_visible() {
        log(frame, rows[1], state);
    }
    footer(frame, rows[rows.len() - 1], state);

    if state.is_prompt_open() {
        prompt(frame, centered_rect(60, 20, size), state);
    }
}

/// Return a rectangle centered in `area`, sized by percentages.
///
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
