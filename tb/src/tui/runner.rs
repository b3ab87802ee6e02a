//! TUI Runner - main loop that owns the terminal
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to App
//! - Starting chat turns in the background and feeding their progress back
//! - Watching the task store for changes to refresh the board cursor

use std::time::Duration;

use eyre::Result;
use taskstore::StoreEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views;
use crate::chat::{ChatEngine, TurnEvent, TurnOutcome};
use crate::coordinator::Coordinator;

/// Input poll interval; also the redraw rate while idle
const TICK_RATE: Duration = Duration::from_millis(100);

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    event_handler: EventHandler,
    /// Change notifications from the task store
    store_events: broadcast::Receiver<StoreEvent>,
    /// Progress of the turn in flight, if any
    turn_rx: Option<mpsc::UnboundedReceiver<TurnEvent>>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, coordinator: Coordinator) -> Self {
        debug!("TuiRunner::new: called");
        let store_events = coordinator.subscribe();
        Self {
            app: App::new(coordinator),
            terminal,
            event_handler: EventHandler::new(TICK_RATE),
            store_events,
            turn_rx: None,
        }
    }

    /// Run the main loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| {
                let (state, coordinator) = self.app.parts_mut();
                views::render(state, coordinator, frame)
            })?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => {}
                        Event::Key(key_event) => {
                            if self.app.handle_key(key_event) {
                                break;
                            }
                        }
                        Event::Mouse(mouse_event) => self.app.handle_mouse(mouse_event),
                        Event::Resize(width, height) => {
                            trace!(width, height, "TuiRunner::run: resize");
                        }
                    }
                }
                turn_event = async {
                    if let Some(rx) = &mut self.turn_rx {
                        rx.recv().await
                    } else {
                        std::future::pending::<Option<TurnEvent>>().await
                    }
                } => {
                    match turn_event {
                        Some(turn_event) => self.handle_turn_event(turn_event),
                        None => self.abandon_turn(),
                    }
                }
            }

            self.drain_store_events();
            if let Some(input) = self.app.state_mut().pending_submit.take() {
                self.start_turn(input);
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Kick off a chat turn on a background task
    fn start_turn(&mut self, input: String) {
        debug!(input_len = input.len(), "TuiRunner::start_turn: called");
        let coordinator = self.app.coordinator_mut();
        let engine: Result<ChatEngine, String> = coordinator.engine().cloned().map_err(str::to_string);
        let engine = match engine {
            Ok(engine) => engine,
            Err(error) => {
                warn!(%error, "TuiRunner::start_turn: no LLM client");
                coordinator.fail_turn(&input, error);
                return;
            }
        };

        let snapshot = coordinator.snapshot();
        let Some(history) = coordinator.chat.begin(&input) else {
            return;
        };

        let (tx, rx) = mpsc::unbounded_channel();
        self.turn_rx = Some(rx);
        self.app.state_mut().start_streaming();

        tokio::spawn(async move {
            let outcome = engine.run_turn(history, snapshot, Some(&tx)).await;
            let _ = tx.send(TurnEvent::Done(outcome));
        });
    }

    fn handle_turn_event(&mut self, event: TurnEvent) {
        debug!(?event, "TuiRunner::handle_turn_event: called");
        match event {
            TurnEvent::Phase(phase) => self.app.coordinator_mut().chat.set_phase(phase),
            TurnEvent::Done(outcome) => {
                self.app.coordinator_mut().chat.finish(outcome);
                self.app.state_mut().stop_streaming();
                self.turn_rx = None;
            }
        }
    }

    /// The turn task went away without reporting an outcome
    fn abandon_turn(&mut self) {
        warn!("TuiRunner::abandon_turn: turn task ended without an outcome");
        self.turn_rx = None;
        self.app.state_mut().stop_streaming();
        self.app.coordinator_mut().chat.finish(TurnOutcome::Failed {
            error: "Chat request was interrupted".to_string(),
            usage: Default::default(),
        });
    }

    /// Apply store notifications without blocking the loop
    fn drain_store_events(&mut self) {
        loop {
            match self.store_events.try_recv() {
                Ok(event) => {
                    info!(?event, "Task store changed");
                    let status = match event {
                        StoreEvent::Loaded { count } => format!("Loaded {count} tasks"),
                        StoreEvent::Created { id } => format!("Created task {id}"),
                        StoreEvent::Updated { id } => format!("Updated task {id}"),
                        StoreEvent::Deleted { id } => format!("Deleted task {id}"),
                    };
                    self.app.state_mut().status_line = Some(status);
                    let coordinator = self.app.coordinator_mut();
                    coordinator.board.clamp(coordinator.store.tasks());
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "TuiRunner::drain_store_events: lagged behind store");
                }
                Err(broadcast::error::TryRecvError::Empty) | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
    }
}
