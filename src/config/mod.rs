use once_cell::sync::Lazy;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Connection details for the hosted Supabase project. Both values are
/// required; the service must not start without them.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

impl Environment {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl AppConfig {
    /// Build configuration from the environment. Panics when a required
    /// secret is missing or malformed - a misconfigured service must not
    /// start serving requests.
    pub fn from_env() -> Self {
        let environment = Environment::from_env_value(env::var("APP_ENV").ok().as_deref());

        let url = require_env("SUPABASE_URL");
        if let Err(e) = Url::parse(&url) {
            panic!("SUPABASE_URL is not a valid URL: {}", e);
        }
        let service_role_key = require_env("SUPABASE_SERVICE_ROLE_KEY");

        let port = port_from(
            env::var("TREKGEAR_API_PORT")
                .ok()
                .or_else(|| env::var("PORT").ok()),
        );

        Self {
            environment,
            server: ServerConfig { port },
            supabase: SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                service_role_key,
            },
        }
    }
}

fn require_env(name: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => panic!("{} must be set", name),
    }
}

fn port_from(value: Option<String>) -> u16 {
    value.and_then(|s| s.parse().ok()).unwrap_or(3000)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
