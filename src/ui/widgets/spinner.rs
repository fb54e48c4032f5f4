use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{layout::Alignment, text::Line, widgets::Paragraph};

/// Braille frames cycled on every terminal tick.
///
pub const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Return the spinner frame for the state's current index.
///
pub fn frame(state: &State) -> &'static str {
    FRAMES[state.get_spinner_index() % FRAMES.len()]
}

/// Return a centered spinner paragraph sized for the given height.
///
pub fn widget(state: &State, height: u16) -> Paragraph<'static> {
    let padding = (height.saturating_sub(2) / 2) as usize;
    let mut lines = vec![Line::from(""); padding];
    lines.push(Line::from(format!("{} Loading...", frame(state))));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(styling::muted_text_style(state.get_theme()))
}
