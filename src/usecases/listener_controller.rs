//! Listener lifecycle: Stopped <-> Running.
//!
//! Transitions are serialized by one async mutex held across bind/unbind, so
//! at most one endpoint is ever bound. Starting while Running and stopping
//! while Stopped are no-ops. Request handling is not behind this lock.
//!
//! The status seen by the control surface is published on a watch channel at
//! the end of each transition, so reading it never waits for a slow stop.

use crate::domain::{DomainError, ListenerStatus, StartOutcome, StopOutcome};
use crate::ports::{BoundListener, EndpointPort};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

enum ListenerState {
    Stopped,
    Running {
        addr: SocketAddr,
        handle: Box<dyn BoundListener>,
    },
}

/// Owns the process-wide listener state.
pub struct ListenerController {
    endpoint: Arc<dyn EndpointPort>,
    addr: SocketAddr,
    state: Mutex<ListenerState>,
    status: watch::Sender<ListenerStatus>,
}

impl ListenerController {
    pub fn new(endpoint: Arc<dyn EndpointPort>, addr: SocketAddr) -> Self {
        Self {
            endpoint,
            addr,
            state: Mutex::new(ListenerState::Stopped),
            status: watch::Sender::new(ListenerStatus::Stopped),
        }
    }

    /// Configured listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Status as of the last completed transition.
    pub fn status(&self) -> ListenerStatus {
        *self.status.borrow()
    }

    /// Follow status changes.
    pub fn subscribe(&self) -> watch::Receiver<ListenerStatus> {
        self.status.subscribe()
    }

    /// Bind and serve. No-op if already running.
    ///
    /// # Errors
    /// `DomainError::Bind` if the address is unavailable; state stays Stopped.
    pub async fn start(&self) -> Result<StartOutcome, DomainError> {
        let mut state = self.state.lock().await;
        if let ListenerState::Running { addr, .. } = &*state {
            info!(addr = %addr, "listener already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let handle = self.endpoint.bind(self.addr).await.inspect_err(|e| {
            error!(addr = %self.addr, error = %e, "listener failed to start");
        })?;
        let addr = handle.local_addr();
        *state = ListenerState::Running { addr, handle };
        self.status.send_replace(ListenerStatus::Running { addr });
        info!(addr = %addr, "listener started");
        Ok(StartOutcome::Started(addr))
    }

    /// Stop accepting and release the port. No-op if already stopped.
    ///
    /// The state is Stopped afterwards even if the unbind reported an error.
    pub async fn stop(&self) -> Result<StopOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let ListenerState::Running { addr, handle } =
            std::mem::replace(&mut *state, ListenerState::Stopped)
        else {
            info!("listener already stopped");
            return Ok(StopOutcome::AlreadyStopped);
        };

        let result = handle.shutdown().await;
        self.status.send_replace(ListenerStatus::Stopped);
        match result {
            Ok(()) => {
                info!(addr = %addr, "listener stopped");
                Ok(StopOutcome::Stopped)
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "listener stopped uncleanly");
                Err(e)
            }
        }
    }

    /// Stop then start. Sequential: the old binding is gone before the new one exists.
    pub async fn restart(&self) -> Result<StartOutcome, DomainError> {
        if let Err(e) = self.stop().await {
            warn!(error = %e, "restart: stop reported an error; starting anyway");
        }
        self.start().await
    }

    /// Final stop during teardown. Safe to call more than once.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            warn!(error = %e, "shutdown: listener stop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryEndpoint;
    use std::time::Duration;

    fn addr() -> SocketAddr {
        "127.0.0.1:9002".parse().unwrap()
    }

    fn controller() -> (MemoryEndpoint, Arc<ListenerController>) {
        controller_on(MemoryEndpoint::new())
    }

    fn controller_on(endpoint: MemoryEndpoint) -> (MemoryEndpoint, Arc<ListenerController>) {
        let controller = Arc::new(ListenerController::new(
            Arc::new(endpoint.clone()),
            addr(),
        ));
        (endpoint, controller)
    }

    #[tokio::test]
    async fn test_starts_stopped() {
        let (endpoint, c) = controller();
        assert_eq!(c.status(), ListenerStatus::Stopped);
        assert_eq!(endpoint.bound_count(), 0);
    }

    #[tokio::test]
    async fn test_double_start_binds_once() {
        let (endpoint, c) = controller();
        assert_eq!(c.start().await.unwrap(), StartOutcome::Started(addr()));
        assert_eq!(c.start().await.unwrap(), StartOutcome::AlreadyRunning);
        assert_eq!(endpoint.bound_count(), 1);
        assert_eq!(endpoint.total_binds(), 1);
        assert_eq!(c.status(), ListenerStatus::Running { addr: addr() });
    }

    #[tokio::test]
    async fn test_double_stop_is_noop() {
        let (endpoint, c) = controller();
        assert_eq!(c.stop().await.unwrap(), StopOutcome::AlreadyStopped);
        c.start().await.unwrap();
        assert_eq!(c.stop().await.unwrap(), StopOutcome::Stopped);
        assert_eq!(c.stop().await.unwrap(), StopOutcome::AlreadyStopped);
        assert_eq!(endpoint.bound_count(), 0);
    }

    #[tokio::test]
    async fn test_restart_rebinds_same_address() {
        let (endpoint, c) = controller();
        c.start().await.unwrap();
        c.stop().await.unwrap();
        assert_eq!(c.start().await.unwrap(), StartOutcome::Started(addr()));
        assert_eq!(c.restart().await.unwrap(), StartOutcome::Started(addr()));
        assert_eq!(endpoint.bound_count(), 1);
        assert_eq!(endpoint.total_binds(), 3);
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_stopped() {
        let (endpoint, c) = controller();
        endpoint.occupy(addr());
        let err = c.start().await.unwrap_err();
        assert!(matches!(err, DomainError::Bind { .. }));
        assert_eq!(c.status(), ListenerStatus::Stopped);
        assert_eq!(c.stop().await.unwrap(), StopOutcome::AlreadyStopped);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_bind_once() {
        let (endpoint, c) = controller();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let c = Arc::clone(&c);
            handles.push(tokio::spawn(async move { c.start().await }));
        }
        let mut started = 0;
        for h in handles {
            if let StartOutcome::Started(_) = h.await.unwrap().unwrap() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert_eq!(endpoint.total_binds(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (endpoint, c) = controller();
        c.start().await.unwrap();
        c.shutdown().await;
        c.shutdown().await;
        assert_eq!(c.status(), ListenerStatus::Stopped);
        assert_eq!(endpoint.bound_count(), 0);
    }

    #[tokio::test]
    async fn test_status_readable_while_stop_in_progress() {
        let (endpoint, c) =
            controller_on(MemoryEndpoint::new().with_shutdown_delay(Duration::from_millis(300)));
        c.start().await.unwrap();
        let mut changes = c.subscribe();

        let stopping = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!stopping.is_finished());
        assert_eq!(c.status(), ListenerStatus::Running { addr: addr() });

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow(), ListenerStatus::Stopped);
        assert_eq!(stopping.await.unwrap().unwrap(), StopOutcome::Stopped);
        assert_eq!(c.status(), ListenerStatus::Stopped);
        assert_eq!(endpoint.bound_count(), 0);
    }
}
