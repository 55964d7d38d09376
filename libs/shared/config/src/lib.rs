use std::env;
use tracing::warn;

/// Which `BookingStore` implementation the API wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Some(StoreBackend::Memory),
            "supabase" | "postgrest" => Some(StoreBackend::Supabase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_store: StoreBackend,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Supabase settings are only
    /// reported as missing when the Supabase store is selected.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            supabase_url: lookup("SUPABASE_URL").unwrap_or_default(),
            supabase_anon_key: lookup("SUPABASE_ANON_PUBLIC_KEY").unwrap_or_default(),
            booking_store: match lookup("BOOKING_STORE") {
                Some(value) => StoreBackend::parse(&value).unwrap_or_else(|| {
                    warn!("BOOKING_STORE value '{}' not recognized, using in-memory store", value);
                    StoreBackend::Memory
                }),
                None => StoreBackend::Memory,
            },
            server_port: lookup("SERVER_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SERVER_PORT not set or invalid, using default");
                    3000
                }),
        };

        for key in config.missing_settings() {
            warn!("{} not set, the Supabase booking store will not be able to connect", key);
        }

        config
    }

    /// Settings the selected store needs but that are empty.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        if self.booking_store != StoreBackend::Supabase {
            return Vec::new();
        }

        let mut missing = Vec::new();
        if self.supabase_url.is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.supabase_anon_key.is_empty() {
            missing.push("SUPABASE_ANON_PUBLIC_KEY");
        }
        missing
    }
}
