// config.rs
// Process configuration read from the environment (after dotenvy loads .env).

use std::{env, net::SocketAddr};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub users_file: String,
    pub services_file: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub typst_bin: String,
    pub salon_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: bind_addr("BIND_ADDR"),
            mongodb_uri: env_or("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_db: env_or("MONGODB_DB", "aminna"),
            users_file: env_or("USERS_FILE", "./data/users.json"),
            services_file: env_or("SERVICES_FILE", "./data/services.json"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            typst_bin: env_or("TYPST_BIN", "typst"),
            salon_name: env_or("SALON_NAME", "Aminna"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are both treated as missing.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn bind_addr(key: &str) -> SocketAddr {
    let fallback: SocketAddr = DEFAULT_BIND_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080)));
    match optional_env(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "invalid {key}, using {DEFAULT_BIND_ADDR}");
            fallback
        }),
        None => fallback,
    }
}
