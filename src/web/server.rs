//! Web server for hoard.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::upload::now_ms;
use crate::{HoardError, Result};

use super::router::create_router;
use super::state::AppState;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server for the given state.
    pub fn new(app_state: AppState) -> Result<Self> {
        let web = &app_state.config.web;
        let addr = format!("{}:{}", web.host, web.port)
            .parse()
            .map_err(|e| HoardError::Config(format!("invalid web server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the in-process expiry sweep.
    ///
    /// Does nothing when the interval is zero; deployments then rely on
    /// an external scheduler calling `/api/check-expired`.
    fn start_sweep_task(state: Arc<AppState>) {
        let interval_secs = state.config.sweep.interval_secs;
        if interval_secs == 0 {
            return;
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                if let Err(e) = state.uploads().sweep(now_ms()).await {
                    tracing::warn!(error = %e, "Scheduled expiry sweep failed");
                }
            }
        });

        tracing::info!(interval_secs, "Expiry sweep task started");
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        Ok((listener, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let (listener, local_addr) = self.bind().await?;
        Self::start_sweep_task(self.app_state.clone());

        let router = create_router(self.app_state);
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, local_addr) = self.bind().await?;
        Self::start_sweep_task(self.app_state.clone());

        let router = create_router(self.app_state);
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
