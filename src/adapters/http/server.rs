//! Implements EndpointPort with axum on a tokio TcpListener.
//!
//! `bind` returns once the socket is bound; serving runs on its own task and
//! ends on a oneshot signal (graceful: in-flight requests finish).

use crate::adapters::http::routes::build_router;
use crate::domain::DomainError;
use crate::ports::{BoundListener, EndpointPort};
use crate::usecases::DispatchService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// HTTP ingestion endpoint.
pub struct AxumEndpoint {
    dispatcher: Arc<DispatchService>,
    shutdown_timeout: Duration,
}

impl AxumEndpoint {
    pub fn new(dispatcher: Arc<DispatchService>, shutdown_timeout: Duration) -> Self {
        Self {
            dispatcher,
            shutdown_timeout,
        }
    }
}

#[async_trait::async_trait]
impl EndpointPort for AxumEndpoint {
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn BoundListener>, DomainError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DomainError::Bind {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| DomainError::Listener(format!("local_addr: {}", e)))?;
        info!(addr = %local_addr, "listening");

        let app = build_router(Arc::clone(&self.dispatcher));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!(addr = %local_addr, error = %e, "HTTP server error");
            }
        });

        Ok(Box::new(HttpListener {
            addr: local_addr,
            shutdown: Some(shutdown_tx),
            join,
            timeout: self.shutdown_timeout,
        }))
    }
}

struct HttpListener {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
    timeout: Duration,
}

#[async_trait::async_trait]
impl BoundListener for HttpListener {
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn shutdown(self: Box<Self>) -> Result<(), DomainError> {
        let HttpListener {
            addr,
            shutdown,
            mut join,
            timeout,
        } = *self;
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        match tokio::time::timeout(timeout, &mut join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DomainError::Listener(format!("server task failed: {}", e))),
            Err(_) => {
                // Connections that outlive the timeout keep running on their own
                // tasks; aborting only drops the accept loop and the socket.
                warn!(
                    addr = %addr,
                    timeout_ms = timeout.as_millis() as u64,
                    "graceful shutdown timed out; aborting"
                );
                join.abort();
                let _ = join.await;
                Ok(())
            }
        }
    }
}
