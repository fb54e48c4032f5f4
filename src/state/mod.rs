//! Application state management module.
//!
//! This module contains the state management for the application, including:
//! - Main `State` struct that holds all terminal UI data
//! - The project filter and incremental reveal controllers
//! - Smart list selection
//! - Navigation types (View, Focus, PromptKind)
//! - State error handling

mod error;
mod filter;
mod navigation;
mod reveal;
mod smart_list;

pub use error::StateError;
pub use filter::{ProjectFilter, ProjectSelection, INBOX};
pub use navigation::{Focus, PromptKind, View};
pub use reveal::{
    Delay, ItemStyle, LoadTicket, NoDelay, RevealConfig, RevealController, TokioDelay,
    ENTRANCE_CLASS,
};
pub use smart_list::{counts, DayBounds, SmartList};

#[path = "state_impl.rs"]
mod state_impl;

pub use state_impl::{parse_due_date, State};
