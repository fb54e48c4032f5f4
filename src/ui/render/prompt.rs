use super::Frame;
use crate::state::{PromptKind, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the open text prompt as a modal on top of everything.
///
pub fn prompt(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.get_theme();
    let Some((kind, text)) = state.get_prompt() else {
        return;
    };

    let mut lines = vec![];
    if let PromptKind::ProjectPrompt { name } = kind {
        lines.push(Line::from(Span::styled(
            format!("Project: {}", name),
            styling::muted_text_style(theme),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled(text.to_owned(), styling::normal_text_style(theme)),
        Span::styled("_", styling::active_list_item_style(theme)),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styling::active_block_border_style(theme))
            .title(Span::styled(kind.title(), styling::active_block_title_style())),
    );
    frame.render_widget(Clear, size);
    frame.render_widget(paragraph, size);
}
