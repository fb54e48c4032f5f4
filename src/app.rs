use crate::ai::{Gemini, TextGenerator};
use crate::backend::Backend;
use crate::config::Config;
use crate::events::network::{Event as NetworkEvent, Handler as NetworkEventHandler};
use crate::events::terminal::Handler as TerminalEventHandler;
use crate::logger::{CustomLogger, LogBuffer};
use crate::state::{State, TokioDelay};
use crate::ui::Theme;
use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::*;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type NetworkEventSender = std::sync::mpsc::Sender<NetworkEvent>;
type NetworkEventReceiver = std::sync::mpsc::Receiver<NetworkEvent>;

/// Oversees event processing, state management, and terminal output.
///
pub struct App {
    state: Arc<Mutex<State>>,
    config: Config,
}

impl App {
    /// Start a new application according to the given configuration. Returns
    /// the result of the application execution.
    ///
    pub async fn start(config: Config, level: LevelFilter) -> Result<()> {
        let log_buffer = LogBuffer::default();
        CustomLogger::install_buffered(level, log_buffer.clone())?;

        info!("Starting application...");
        let theme = Theme::from_name(&config.theme_name).unwrap_or_else(|| {
            warn!("Unknown theme '{}', using default.", config.theme_name);
            Theme::default()
        });
        let (tx, rx) = std::sync::mpsc::channel::<NetworkEvent>();
        let app = App {
            state: Arc::new(Mutex::new(State::new(
                tx.clone(),
                config.reveal.to_reveal_config(),
                log_buffer,
                theme,
            ))),
            config,
        };
        app.start_network(rx);
        app.start_ui(tx).await?;

        info!("Exiting application...");
        Ok(())
    }

    /// Start a separate thread for asynchronous state mutations.
    ///
    fn start_network(&self, net_receiver: NetworkEventReceiver) {
        debug!("Creating new thread for asynchronous networking...");
        let cloned_state = Arc::clone(&self.state);
        let config = self.config.clone();
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start network runtime: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                let backend = Backend::from_config(&config);
                let generator: Option<Box<dyn TextGenerator>> = match Gemini::new(&config.ai) {
                    Ok(gemini) => Some(Box::new(gemini)),
                    Err(e) => {
                        warn!("{}; AI task generation disabled.", e);
                        None
                    }
                };
                match backend.store().account().await {
                    Ok(account) => {
                        cloned_state.lock().await.set_account(account);
                    }
                    Err(e) => warn!("Failed to load account: {}", e),
                }

                let mut network_event_handler = NetworkEventHandler::new(
                    &cloned_state,
                    &backend,
                    generator.as_deref(),
                    Arc::new(TokioDelay),
                );
                while let Ok(network_event) = net_receiver.recv() {
                    if let Err(e) = network_event_handler.handle(network_event).await {
                        error!("Failed to handle network event: {}", e);
                    }
                }
            })
        });
    }

    /// Begin the terminal event poll on a separate thread before starting the
    /// render loop on the main thread. Return the result following an exit
    /// request or unrecoverable error.
    ///
    async fn start_ui(&self, net_sender: NetworkEventSender) -> Result<()> {
        debug!("Starting user interface on main thread...");
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        enable_raw_mode()?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        net_sender.send(NetworkEvent::Bootstrap)?;

        let terminal_event_handler = TerminalEventHandler::new();
        let result = loop {
            let mut state = self.state.lock().await;
            if let Err(e) = terminal.draw(|frame| crate::ui::render(frame, &mut state)) {
                break Err(e.into());
            }
            match terminal_event_handler.handle_next(&mut state) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Received application exit request.");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };

        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }
}
