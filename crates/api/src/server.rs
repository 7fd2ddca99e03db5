use crate::routes::build_router;
use crate::state::AppState;
use std::net::SocketAddr;
use tracing::info;

/// Listener configuration, environment-driven.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }

    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// HTTP server wrapping the router.
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Binds and serves until the process exits.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or the listener
    /// fails.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr: SocketAddr = self
            .config
            .addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let app = build_router(self.state);

        info!(%addr, "HTTP server listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_formatting() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(config.addr(), "127.0.0.1:9000");
    }
}
