use crate::state::{Focus, PromptKind, State};
use anyhow::Result;
use crossterm::{
    event,
    event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use log::*;
use std::{sync::mpsc, thread, time::Duration};

/// Specify terminal event poll rate in milliseconds.
///
const TICK_RATE_IN_MS: u64 = 60;

/// Specify different terminal event types.
///
#[derive(Debug)]
pub enum Event<I> {
    Input(I),
    Tick,
}

/// Specify struct for managing terminal events channel.
///
pub struct Handler {
    rx: mpsc::Receiver<Event<KeyEvent>>,
    _tx: mpsc::Sender<Event<KeyEvent>>,
}

impl Handler {
    /// Return new instance after spawning new input polling thread.
    ///
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();
        thread::spawn(move || loop {
            let tick_rate = Duration::from_millis(TICK_RATE_IN_MS);
            match event::poll(tick_rate) {
                Ok(true) => {
                    if let Ok(CrosstermEvent::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press && tx_clone.send(Event::Input(key)).is_err() {
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
            if tx_clone.send(Event::Tick).is_err() {
                break;
            }
        });
        Handler { rx, _tx: tx }
    }

    /// Receive next terminal event and handle it accordingly. Returns result
    /// with value true if should continue or false if exit was requested.
    ///
    pub fn handle_next(&self, state: &mut State) -> Result<bool> {
        match self.rx.recv()? {
            Event::Input(event) => Ok(handle_key(event, state)),
            Event::Tick => {
                state.advance_spinner_index();
                Ok(true)
            }
        }
    }
}

/// Apply one key press to state. Returns false if exit was requested.
///
pub fn handle_key(event: KeyEvent, state: &mut State) -> bool {
    if let KeyEvent {
        code: KeyCode::Char('c'),
        modifiers: KeyModifiers::CONTROL,
        ..
    } = event
    {
        debug!("Processing exit terminal event '{:?}'...", event);
        return false;
    }

    if state.is_prompt_open() {
        match event.code {
            KeyCode::Esc => {
                state.close_prompt();
            }
            KeyCode::Enter => {
                if let Err(e) = state.submit_prompt() {
                    warn!("{}", e);
                    state.set_status(Some(e.to_string()));
                }
            }
            KeyCode::Backspace => {
                state.remove_prompt_char();
            }
            KeyCode::Char(c) => {
                state.add_prompt_char(c);
            }
            _ => {}
        }
        return true;
    }

    match event.code {
        KeyCode::Char('q') => return false,
        KeyCode::Tab => {
            state.toggle_focus();
        }
        KeyCode::Char('j') | KeyCode::Down => match state.current_focus() {
            Focus::Sidebar => {
                state.next_sidebar_index();
            }
            Focus::Tasks => {
                state.next_task_index();
            }
        },
        KeyCode::Char('k') | KeyCode::Up => match state.current_focus() {
            Focus::Sidebar => {
                state.previous_sidebar_index();
            }
            Focus::Tasks => {
                state.previous_task_index();
            }
        },
        KeyCode::Enter if state.current_focus() == Focus::Sidebar => {
            state.select_sidebar_item();
        }
        KeyCode::Char('m') => {
            state.load_more();
        }
        KeyCode::Char('f') => {
            state.next_project_filter();
        }
        KeyCode::Char('a') => {
            state.open_prompt(PromptKind::AddTask);
        }
        KeyCode::Char('p') => {
            state.open_prompt(PromptKind::ProjectName);
        }
        KeyCode::Char('r') => {
            state.refresh();
        }
        KeyCode::Char('l') => {
            state.toggle_log();
        }
        KeyCode::Char(' ') | KeyCode::Char('x') if state.current_focus() == Focus::Tasks => {
            if let Err(e) = state.toggle_selected_task() {
                state.set_status(Some(e.to_string()));
            }
        }
        KeyCode::Char('d') if state.current_focus() == Focus::Tasks => {
            if let Err(e) = state.delete_selected_task() {
                state.set_status(Some(e.to_string()));
            }
        }
        KeyCode::Esc => {
            state.set_status(None);
        }
        _ => {}
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SmartList, View};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        let mut state = State::default();
        assert!(!handle_key(press(KeyCode::Char('q')), &mut state));
        assert!(!handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut state
        ));
    }

    #[test]
    fn sidebar_navigation_opens_view() {
        let mut state = State::default();
        assert!(handle_key(press(KeyCode::Char('j')), &mut state));
        handle_key(press(KeyCode::Enter), &mut state);
        assert_eq!(*state.current_view(), View::Smart(SmartList::Upcoming));
        assert_eq!(state.current_focus(), Focus::Tasks);
    }

    #[test]
    fn prompt_captures_text_keys() {
        let mut state = State::default();
        handle_key(press(KeyCode::Char('a')), &mut state);
        assert!(state.is_prompt_open());
        for c in "quit".chars() {
            assert!(handle_key(press(KeyCode::Char(c)), &mut state));
        }
        handle_key(press(KeyCode::Backspace), &mut state);
        assert_eq!(
            state.get_prompt().map(|(_, text)| text.as_str()),
            Some("qui")
        );
        handle_key(press(KeyCode::Esc), &mut state);
        assert!(!state.is_prompt_open());
    }

    #[test]
    fn empty_task_is_reported() {
        let mut state = State::default();
        handle_key(press(KeyCode::Char('a')), &mut state);
        handle_key(press(KeyCode::Enter), &mut state);
        assert!(state.is_prompt_open());
        assert_eq!(state.get_status(), Some("Task content cannot be empty"));
    }

    #[test]
    fn toggle_without_tasks_sets_status() {
        let mut state = State::default();
        handle_key(press(KeyCode::Tab), &mut state);
        handle_key(press(KeyCode::Char('x')), &mut state);
        assert_eq!(state.get_status(), Some("No task selected"));
    }
}
