//! Multi-client simulation.
//!
//! A [`ChatCluster`] runs several production [`Runtime`]s against one
//! [`crate::SimServer`] and steps them round-robin. Everything is
//! single-threaded and driven by the test, so runs are reproducible.

use std::{
    sync::{MutexGuard, PoisonError},
    time::Duration,
};

use jabber_app::{App, AppEvent, Driver, KeyInput, Runtime};
use jabber_client::{ChatSnapshot, ClientConfig};

use crate::{
    SimDriver, SimDriverError, SimEnv,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    sim_server::{SharedSimServer, SimServer, create_shared_server},
};

/// Upper bound on rounds in [`ChatCluster::settle`].
const MAX_SETTLE_ROUNDS: usize = 1024;

struct Member {
    runtime: Runtime<SimDriver, SimEnv>,
    quit: bool,
}

/// Simulated clients sharing one server and one clock.
pub struct ChatCluster {
    env: SimEnv,
    server: SharedSimServer,
    members: Vec<Member>,
    config: ClientConfig,
    check_invariants: bool,
}

impl Default for ChatCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        let env = SimEnv::new();
        let server = create_shared_server(env.clone());
        Self {
            env,
            server,
            members: Vec::new(),
            config: ClientConfig::default(),
            check_invariants: false,
        }
    }

    /// Check the standard invariants on every render of every client.
    #[must_use]
    pub fn with_invariants(mut self) -> Self {
        self.check_invariants = true;
        self
    }

    /// Use `config` for clients added from now on.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Start a client, auto-connecting as `username` if given.
    ///
    /// Returns the client's index.
    pub async fn add_client(&mut self, username: Option<&str>) -> Result<usize, SimDriverError> {
        let index = self.members.len();
        let id = u64::try_from(index).unwrap_or(u64::MAX);

        let mut driver = SimDriver::new(id, self.env.clone(), self.server.clone());
        if self.check_invariants {
            driver = driver.with_invariants(InvariantRegistry::standard());
        }
        let app = App::new("ws://sim", username.map(str::to_string));
        let mut runtime = Runtime::new(driver, app, self.config);

        let quit = runtime.start().await?;
        self.members.push(Member { runtime, quit });
        Ok(index)
    }

    /// Queue keystrokes for `line` plus Enter on client `index`.
    pub fn type_line(&mut self, index: usize, line: &str) {
        self.members[index].runtime.driver_mut().type_line(line);
    }

    /// Queue a single key on client `index`.
    pub fn key(&mut self, index: usize, key: KeyInput) {
        self.members[index].runtime.driver_mut().inject_event(AppEvent::Key(key));
    }

    /// Mutable access to a client's driver for fault injection.
    pub fn driver_mut(&mut self, index: usize) -> &mut SimDriver {
        self.members[index].runtime.driver_mut()
    }

    /// Run one event-loop step on every running client.
    ///
    /// A client that quits has its transports closed, as on exit.
    pub async fn step_all(&mut self) -> Result<(), SimDriverError> {
        for member in &mut self.members {
            if member.quit {
                continue;
            }
            member.quit = member.runtime.step().await?;
            if member.quit {
                member.runtime.driver_mut().stop();
            }
        }
        Ok(())
    }

    /// Step until no client has queued input and the server has nothing to
    /// deliver.
    ///
    /// # Errors
    ///
    /// Returns an error if a driver fails or the cluster does not go quiet
    /// within a bounded number of rounds.
    pub async fn settle(&mut self) -> Result<(), SimDriverError> {
        for _ in 0..MAX_SETTLE_ROUNDS {
            self.step_all().await?;
            let busy = self
                .members
                .iter()
                .any(|member| !member.quit && member.runtime.driver().has_pending());
            if !busy && self.server().queued() == 0 {
                return Ok(());
            }
        }
        Err(SimDriverError(format!("cluster still busy after {MAX_SETTLE_ROUNDS} rounds")))
    }

    /// Move the shared clock forward.
    pub fn advance(&self, duration: Duration) {
        self.env.advance(duration);
    }

    /// App of client `index`.
    pub fn app(&self, index: usize) -> &App {
        self.members[index].runtime.app()
    }

    /// Latest chat state of client `index`.
    pub fn snapshot(&self, index: usize) -> &ChatSnapshot {
        self.app(index).snapshot()
    }

    /// True once client `index` has quit.
    pub fn has_quit(&self, index: usize) -> bool {
        self.members[index].quit
    }

    /// Observable state of every client.
    pub fn system_snapshot(&self) -> SystemSnapshot {
        let clients = (0..self.members.len())
            .map(|index| {
                ClientSnapshot::from_app(u64::try_from(index).unwrap_or(u64::MAX), self.app(index))
            })
            .collect();
        SystemSnapshot::from_clients(clients)
    }

    /// Lock the shared server.
    pub fn server(&self) -> MutexGuard<'_, SimServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Number of clients.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if no client was added.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
