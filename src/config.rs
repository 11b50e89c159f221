use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TURN_MS: u64 = 30_000;

/// Server settings, sourced from the environment with development defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port for the combined HTTP + WebSocket listener (`PORT`).
    pub port: u16,
    /// Browser origins allowed to open WebSocket connections
    /// (`ALLOWED_ORIGINS`, comma-separated, merged with the dev defaults).
    pub allowed_origins: Vec<String>,
    /// Turn deadline applied to every round (`TURN_TIMEOUT_MS`).
    pub turn_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            turn_ms: DEFAULT_TURN_MS,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            config.port = port;
        }
        if let Some(turn_ms) = env::var("TURN_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()) {
            config.turn_ms = turn_ms;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            config.allowed_origins.extend(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        config
    }

    /// Origin gate for WebSocket handshakes. Non-browser clients omit the
    /// header and are let through; browsers must match the allow-list.
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed_origins.iter().any(|o| o == origin),
        }
    }
}
