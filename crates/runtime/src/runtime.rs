//! High-level runtime orchestrator.
//!
//! The runtime owns the automation worker, wires up command/event channels,
//! and exposes a builder-based API for hosts to drive the controller.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use autocast_core::{CommandListener, Controller, Host};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{AutomationWorker, Command};

type HostFactory = Box<dyn FnOnce(CommandListener) -> Box<dyn Host> + Send>;

/// Main runtime that orchestrates the automation controller
///
/// Design: Runtime owns the worker and coordinates its lifetime.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to controller events of one topic
    pub fn subscribe(&self, topic: Topic) -> tokio::sync::broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker ends the session on its way out; outstanding handles
    /// observe [`RuntimeError::CommandChannelClosed`] afterwards.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone; joining reports why.
        let _ = self.handle.shutdown().await;
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    host: Option<HostFactory>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            host: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the host the controller observes and commands
    pub fn host(mut self, host: impl Host + 'static) -> Self {
        self.host = Some(Box::new(move |_: CommandListener| Box::new(host) as Box<dyn Host>));
        self
    }

    /// Set a host that reports order events synchronously.
    ///
    /// `factory` receives the controller's [`CommandListener`] once the
    /// controller exists, so the host can feed it from inside its issuance
    /// primitives.
    pub fn host_with_listener<H, F>(mut self, factory: F) -> Self
    where
        H: Host + 'static,
        F: FnOnce(CommandListener) -> H + Send + 'static,
    {
        self.host = Some(Box::new(move |listener: CommandListener| {
            Box::new(factory(listener)) as Box<dyn Host>
        }));
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let factory = self.host.ok_or(RuntimeError::MissingHost)?;
        let controller =
            Controller::new(self.config.controller).map_err(RuntimeError::InvalidConfig)?;
        let host = factory(controller.command_listener());

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let worker = AutomationWorker::new(controller, host, command_rx, event_bus);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
