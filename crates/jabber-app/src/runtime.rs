//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O

use jabber_client::{ChatSnapshot, ClientConfig};
use jabber_core::Environment;
use tokio::sync::watch;

use crate::{App, AppAction, AppEvent, Bridge, Driver, TransportCommand};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment supplying the clock type
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime around `driver` and `app`.
    pub fn new(driver: D, app: App, config: ClientConfig) -> Self {
        Self { driver, app, bridge: Bridge::new(config) }
    }

    /// Run the main event loop until the App quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let mut quit = self.start().await?;
        while !quit {
            quit = self.step().await?;
        }

        self.driver.stop();
        Ok(())
    }

    /// Execute the App's start-up actions (auto-connect, first render).
    ///
    /// Returns `true` if the application should quit.
    pub async fn start(&mut self) -> Result<bool, D::Error> {
        let actions = self.app.start();
        self.process_actions(actions).await
    }

    /// Process one cycle of the event loop.
    ///
    /// 1. Polls for an input event from the driver
    /// 2. Drains pending transport events into the bridge
    /// 3. Ticks the bridge so timers can fire
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while let Some(event) = self.driver.recv().await {
            let events = self.bridge.handle_transport(event);
            self.flush().await;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.flush().await;
        self.process_bridge_events(events).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => {
                        let visible = self.driver.render(&self.app)?;
                        pending_actions.extend(self.app.visible(visible));
                    },
                    AppAction::Quit => return Ok(true),

                    // Protocol operations go through the bridge
                    AppAction::Connect { .. }
                    | AppAction::Disconnect
                    | AppAction::SendMessage { .. }
                    | AppAction::InputChanged
                    | AppAction::MessagesVisible { .. } => {
                        let now = self.driver.now();
                        let events = self.bridge.process_app_action(action, now);
                        self.flush().await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute all queued transport commands.
    async fn flush(&mut self) {
        for command in self.bridge.take_outgoing() {
            match command {
                TransportCommand::Open(transport) => self.driver.open(transport).await,
                TransportCommand::Send { transport, text } => {
                    self.driver.send_text(transport, text).await;
                },
                TransportCommand::Close(transport) => self.driver.close(transport),
            }
        }
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge.
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Observe chat snapshots published by the bridge.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.bridge.subscribe()
    }
}
