use crate::ui::theme::Theme;
use ratatui::style::{Modifier, Style};

/// Return the border style for active blocks.
///
pub fn active_block_border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.border_active.to_color())
}

/// Return the border style for normal blocks.
///
pub fn normal_block_border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.border_normal.to_color())
}

pub fn active_block_title_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Return the highlight style for the list under the cursor.
///
pub fn active_list_item_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.primary.to_color())
        .add_modifier(Modifier::BOLD)
}

pub fn normal_text_style(theme: &Theme) -> Style {
    Style::default().fg(theme.text.to_color())
}

pub fn muted_text_style(theme: &Theme) -> Style {
    Style::default().fg(theme.text_muted.to_color())
}

/// Return the style for completed tasks.
///
pub fn completed_task_style(theme: &Theme) -> Style {
    muted_text_style(theme).add_modifier(Modifier::CROSSED_OUT)
}

/// Return the style for rows still inside their entrance window.
///
pub fn entering_item_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.entering.to_color())
        .add_modifier(Modifier::ITALIC)
}

pub fn status_style(theme: &Theme) -> Style {
    Style::default().fg(theme.warning.to_color())
}
