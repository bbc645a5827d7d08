use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    pub listing: ListingConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the document store REST surface
    pub base_url: String,
    /// Base URL of the identity provider
    pub auth_url: String,
    pub timeout_secs: u64,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Number of page links shown around the current page
    pub page_window: usize,
    /// Terminal width at which lists switch from cards to a table
    pub table_min_width: usize,
    /// Forces one page size for every collection when set
    pub page_size_override: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Client config directory override (defaults to ~/.config/haven/admin)
    pub config_dir: Option<String>,
    /// Sessions without an expiry claim are dropped after this many hours
    pub fallback_expiry_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Gateway overrides
        if let Ok(v) = env::var("HAVEN_GATEWAY_URL") {
            self.gateway.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("HAVEN_AUTH_URL") {
            self.gateway.auth_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("HAVEN_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = v.parse().unwrap_or(self.gateway.timeout_secs);
        }
        if let Ok(v) = env::var("HAVEN_GATEWAY_DEBUG_LOGGING") {
            self.gateway.debug_logging = v.parse().unwrap_or(self.gateway.debug_logging);
        }

        // Listing overrides
        if let Ok(v) = env::var("HAVEN_PAGE_WINDOW") {
            self.listing.page_window = v.parse().unwrap_or(self.listing.page_window);
        }
        if let Ok(v) = env::var("HAVEN_TABLE_MIN_WIDTH") {
            self.listing.table_min_width = v.parse().unwrap_or(self.listing.table_min_width);
        }
        if let Ok(v) = env::var("HAVEN_PAGE_SIZE") {
            // Zero would make every list unpageable
            self.listing.page_size_override = v.parse().ok().filter(|size: &usize| *size > 0);
        }

        // Session overrides
        if let Ok(v) = env::var("HAVEN_CONFIG_DIR") {
            self.session.config_dir = Some(v);
        }
        if let Ok(v) = env::var("HAVEN_SESSION_FALLBACK_EXPIRY_HOURS") {
            self.session.fallback_expiry_hours = v.parse().unwrap_or(self.session.fallback_expiry_hours);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            gateway: GatewayConfig {
                base_url: "http://localhost:8080/api".to_string(),
                auth_url: "http://localhost:8080/auth".to_string(),
                timeout_secs: 30,
                debug_logging: true,
            },
            listing: ListingConfig {
                page_window: 5,
                table_min_width: 100,
                page_size_override: None,
            },
            session: SessionConfig {
                config_dir: None,
                fallback_expiry_hours: 24 * 7,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: GatewayConfig {
                base_url: "https://staging.haven.example.com/api".to_string(),
                auth_url: "https://staging.haven.example.com/auth".to_string(),
                timeout_secs: 15,
                debug_logging: false,
            },
            listing: ListingConfig {
                page_window: 5,
                table_min_width: 100,
                page_size_override: None,
            },
            session: SessionConfig {
                config_dir: None,
                fallback_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: GatewayConfig {
                base_url: "https://haven.example.com/api".to_string(),
                auth_url: "https://haven.example.com/auth".to_string(),
                timeout_secs: 10,
                debug_logging: false,
            },
            listing: ListingConfig {
                page_window: 5,
                table_min_width: 100,
                page_size_override: None,
            },
            session: SessionConfig {
                config_dir: None,
                fallback_expiry_hours: 4,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
