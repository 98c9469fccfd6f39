//! Transmission engine
//!
//! An [`Engine`] owns everything needed to get channel values onto the wire:
//! the universe registry, the fixture map, the transmitter and one scheduling
//! task per universe. Engines are plain values; create as many as needed.
//!
//! ```rust,no_run
//! use dmxflow_control::{Engine, EngineConfig, UniverseConfig};
//! use dmxflow_core::PortAddress;
//! use std::time::Duration;
//!
//! # async fn run() -> dmxflow_control::Result<()> {
//! let universe = PortAddress::new(0, 0, 1)?;
//! let config = EngineConfig::new().with_universe(
//!     UniverseConfig::new(universe).with_destination("192.168.1.20:6454".parse().unwrap()),
//! );
//!
//! let engine = Engine::bind(config).await?;
//! engine.set_channel(universe, 0, 255)?;
//! engine.shutdown(Duration::from_millis(250)).await;
//! # Ok(())
//! # }
//! ```

use dmxflow_core::{
    FixtureId, FixtureInstance, FixtureMap, PortAddress, UniverseBuffer, Universes,
};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    error::ControlError,
    scheduler::{Timing, UniverseWorker},
    stats::{EngineEvent, StatsSnapshot, UniverseStats, EVENT_CAPACITY},
    transmitter::{Transmitter, Transport, UdpTransport},
    Result,
};

/// Art-Net transmission engine
pub struct Engine<T: Transport = UdpTransport> {
    config: EngineConfig,
    runtime: Handle,
    transmitter: Transmitter<T>,
    universes: Universes,
    fixtures: RwLock<FixtureMap>,
    stats: RwLock<BTreeMap<PortAddress, Arc<UniverseStats>>>,
    tasks: Mutex<BTreeMap<PortAddress, JoinHandle<()>>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: watch::Sender<bool>,
}

impl Engine<UdpTransport> {
    /// Validate `config`, bind the UDP socket and start transmitting.
    ///
    /// Fails with [`ControlError::Configuration`] before any task is spawned
    /// if the config is invalid or the socket cannot be bound.
    pub async fn bind(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let transport = UdpTransport::bind(config.bind_address, config.broadcast).await?;
        Self::start(config, transport)
    }
}

impl<T: Transport> Engine<T> {
    /// Start an engine on an existing transport.
    ///
    /// Must be called from within a tokio runtime; configured universes get
    /// their scheduling tasks immediately.
    pub fn start(config: EngineConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| {
            ControlError::Configuration(format!("Engine requires a tokio runtime: {}", e))
        })?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (shutdown, _) = watch::channel(false);

        let engine = Self {
            fixtures: RwLock::new(FixtureMap::with_policy(config.overlap_policy)),
            config,
            runtime,
            transmitter: Transmitter::new(transport),
            universes: Universes::new(),
            stats: RwLock::new(BTreeMap::new()),
            tasks: Mutex::new(BTreeMap::new()),
            events,
            shutdown,
        };

        let configured: Vec<PortAddress> =
            engine.config.universes.iter().map(|u| u.address).collect();
        for address in configured {
            engine.ensure_universe(address);
        }

        info!(
            "Engine started: {} universes, refresh {:?}, coalesce {:?}",
            engine.universes.len(),
            engine.config.refresh_interval(),
            engine.config.coalesce_window()
        );

        Ok(engine)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Transport the engine sends through
    pub fn transport(&self) -> &T {
        self.transmitter.transport()
    }

    /// Whether shutdown has been requested
    pub fn is_running(&self) -> bool {
        !*self.shutdown.borrow()
    }

    /// Return the universe at `address`, creating it (and its scheduling
    /// task) on first reference.
    pub fn ensure_universe(&self, address: PortAddress) -> Arc<UniverseBuffer> {
        let (buffer, created) = self.universes.get_or_create(address);
        if created {
            self.spawn_worker(buffer.clone());
        }
        buffer
    }

    fn spawn_worker(&self, buffer: Arc<UniverseBuffer>) {
        let address = buffer.address();

        if !self.is_running() {
            debug!("Universe {} created after shutdown, not scheduling", address);
            return;
        }

        let destinations = self.config.destinations_for(address).to_vec();
        if destinations.is_empty() {
            warn!(
                "Universe {} has no destinations and will not be transmitted",
                address
            );
            return;
        }

        let (sequencing, physical) = self
            .config
            .universe(address)
            .map(|u| (u.sequencing, u.physical))
            .unwrap_or((true, 0));

        let stats = Arc::new(UniverseStats::new());
        self.stats.write().insert(address, stats.clone());

        let worker = UniverseWorker::new(
            buffer,
            destinations,
            physical,
            sequencing,
            Timing {
                refresh_interval: self.config.refresh_interval(),
                coalesce_window: self.config.coalesce_window(),
            },
            self.transmitter.clone(),
            stats,
            self.events.clone(),
        );

        let task = self.runtime.spawn(worker.run(self.shutdown.subscribe()));
        self.tasks.lock().insert(address, task);
    }

    /// Look up an existing universe
    pub fn universe(&self, address: PortAddress) -> Option<Arc<UniverseBuffer>> {
        self.universes.get(address)
    }

    /// All known universes
    pub fn universes(&self) -> Vec<PortAddress> {
        self.universes.addresses()
    }

    /// Set one channel of a universe (0-based offset)
    pub fn set_channel(&self, address: PortAddress, offset: usize, value: u8) -> Result<()> {
        Ok(self.ensure_universe(address).set(offset, value)?)
    }

    /// Set consecutive channels of a universe, all or nothing
    pub fn set_channels(&self, address: PortAddress, offset: usize, values: &[u8]) -> Result<()> {
        Ok(self.ensure_universe(address).set_range(offset, values)?)
    }

    /// Place a fixture and make sure its universe is transmitted
    pub fn place_fixture(&self, fixture: FixtureInstance) -> Result<FixtureId> {
        let universe = fixture.universe();
        let id = self.fixtures.write().place(fixture)?;
        self.ensure_universe(universe);
        Ok(id)
    }

    /// Remove a placement. Channel values it wrote are left as they are.
    pub fn remove_fixture(&self, id: FixtureId) -> Option<FixtureInstance> {
        self.fixtures.write().remove(id)
    }

    /// Copy of the fixture map as of the call
    pub fn fixtures(&self) -> FixtureMap {
        self.fixtures.read().clone()
    }

    /// A placed fixture
    pub fn fixture(&self, id: FixtureId) -> Option<FixtureInstance> {
        self.fixtures.read().get(id).cloned()
    }

    /// Resolve a fixture's 0-based logical channel to `(universe, offset)`
    pub fn resolve(&self, id: FixtureId, index: usize) -> Result<(PortAddress, usize)> {
        Ok(self.fixtures.read().resolve(id, index)?)
    }

    /// Write a fixture's 0-based logical channel
    pub fn write(&self, id: FixtureId, index: usize, value: u8) -> Result<()> {
        let (universe, offset) = self.resolve(id, index)?;
        self.set_channel(universe, offset, value)
    }

    /// Write a fixture channel by role name, e.g. `"Red"`
    pub fn write_role(&self, id: FixtureId, role: &str, value: u8) -> Result<()> {
        let (universe, offset) = self.fixtures.read().resolve_role(id, role)?;
        self.set_channel(universe, offset, value)
    }

    /// Transmission counters of a universe, if it is being transmitted
    pub fn stats(&self, address: PortAddress) -> Option<StatsSnapshot> {
        self.stats.read().get(&address).map(|stats| stats.snapshot())
    }

    /// Subscribe to send events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Stop all scheduling tasks.
    ///
    /// Tasks stop issuing new sends as soon as the signal is raised; any task
    /// still running after `grace` is aborted.
    pub async fn shutdown(&self, grace: Duration) {
        self.shutdown.send_replace(true);

        let tasks = std::mem::take(&mut *self.tasks.lock());
        let deadline = Instant::now() + grace;
        info!("Stopping engine ({} scheduling tasks)", tasks.len());

        join_all(tasks.into_iter().map(|(address, mut task)| async move {
            match timeout_at(deadline, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Universe {} task failed: {}", address, e),
                Err(_) => {
                    warn!(
                        "Universe {} task still running after {:?}, aborting",
                        address, grace
                    );
                    task.abort();
                }
            }
        }))
        .await;

        info!("Engine stopped");
    }
}

impl<T: Transport> Drop for Engine<T> {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
