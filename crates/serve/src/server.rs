//! Server module for Plugdir serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use crate::ServerConfig;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    Router,
};
use plugdir_core::{PlugdirConfig, PlugdirError, Result};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Plugdir HTTP server
pub struct PlugdirServer {
    config: ServerConfig,
    app: Router,
}

impl PlugdirServer {
    /// Create a server over prepared application state
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        let app = create_app(state);

        Self { config, app }
    }

    /// Open the configured stores and create a server over them
    pub async fn from_config(config: &PlugdirConfig) -> Result<Self> {
        let state = AppState::from_config(config).await?;
        Ok(Self::new(state))
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| PlugdirError::validation(format!("Invalid address {}: {}", addr, e)))?;

        tracing::info!("Starting Plugdir server on {}", addr);

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| PlugdirError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| PlugdirError::network(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The fully layered router
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Create the Axum application with middleware
pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.max_request_size;
    let cors_enabled = state.config.cors_enabled;

    let mut app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(max_request_size)),
    );

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE]);

        app = app.layer(cors);
    }

    app
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: PlugdirConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: PlugdirConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn from_config(config: PlugdirConfig) -> Self {
        Self { config }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the database URL
    pub fn database_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.database.url = Some(url.into());
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.server.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.server.max_request_size = size;
        self
    }

    /// Add an accepted moderator key
    pub fn moderator_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.server.moderator_keys.push(key.into());
        self
    }

    /// Build the server, opening the configured stores
    pub async fn build(self) -> Result<PlugdirServer> {
        self.config.validate()?;
        PlugdirServer::from_config(&self.config).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = ServerBuilder::new()
            .host("0.0.0.0")
            .port(8080)
            .database_url("postgresql://localhost/plugdir_test")
            .cors(false)
            .max_request_size(5 * 1024 * 1024)
            .moderator_key("mod-key");

        assert_eq!(builder.config.server.host, "0.0.0.0");
        assert_eq!(builder.config.server.port, 8080);
        assert_eq!(
            builder.config.database.url.as_deref(),
            Some("postgresql://localhost/plugdir_test")
        );
        assert!(!builder.config.server.cors_enabled);
        assert_eq!(builder.config.server.max_request_size, 5 * 1024 * 1024);
        assert_eq!(builder.config.server.moderator_keys, vec!["mod-key"]);
    }

    #[tokio::test]
    async fn test_build_in_memory_server() {
        let server = ServerBuilder::new().port(4000).build().await.unwrap();
        assert_eq!(server.config().port, 4000);
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        assert!(ServerBuilder::new().port(0).build().await.is_err());
    }
}
