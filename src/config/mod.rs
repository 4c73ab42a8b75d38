use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub table: TableConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub server_url: String,
    /// No timeout unless set; a hung request hangs the command
    pub request_timeout_secs: Option<u64>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub default_page_size: usize,
    pub max_page_size: Option<usize>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub token_key: String,
    pub legacy_token_key: String,
    pub school_id_key: String,
    /// Opaque (non-JWT) tokens at least this long are treated as valid
    pub min_opaque_token_len: usize,
    /// Sign-in responses with shorter tokens are rejected
    pub min_sign_in_token_len: usize,
    pub sign_in_route: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("PROEDUC_SERVER_URL") {
            self.api.server_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Table overrides
        if let Ok(v) = env::var("TABLE_DEFAULT_PAGE_SIZE") {
            self.table.default_page_size = v.parse().unwrap_or(self.table.default_page_size);
        }
        if let Ok(v) = env::var("TABLE_MAX_PAGE_SIZE") {
            self.table.max_page_size = v.parse().ok();
        }
        if let Ok(v) = env::var("TABLE_DEBUG_LOGGING") {
            self.table.debug_logging = v.parse().unwrap_or(self.table.debug_logging);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_MIN_OPAQUE_TOKEN_LEN") {
            self.session.min_opaque_token_len = v.parse().unwrap_or(self.session.min_opaque_token_len);
        }

        self
    }

    fn session_defaults() -> SessionConfig {
        SessionConfig {
            token_key: "proeduc-jwt-token".to_string(),
            legacy_token_key: "accessToken".to_string(),
            school_id_key: "proeduc-school-id".to_string(),
            min_opaque_token_len: 16,
            min_sign_in_token_len: 10,
            sign_in_route: "/auth/jwt/sign-in".to_string(),
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                server_url: "http://localhost:3333".to_string(),
                request_timeout_secs: None,
                enable_request_logging: true,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: Some(1000),
                debug_logging: true,
            },
            session: Self::session_defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                server_url: "https://staging-api.proeduc.com.br".to_string(),
                request_timeout_secs: None,
                enable_request_logging: true,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: Some(500),
                debug_logging: false,
            },
            session: Self::session_defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                server_url: "https://api.proeduc.com.br".to_string(),
                request_timeout_secs: None,
                enable_request_logging: false,
            },
            table: TableConfig {
                default_page_size: 10,
                max_page_size: Some(100),
                debug_logging: false,
            },
            session: Self::session_defaults(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
