use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Base URLs of the services we call out to. Overridable so tests and
/// docker-compose setups can point them elsewhere.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub open_meteo_url: String,
    pub fastapi_url: String,
    pub nominatim_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wastewatch".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wastewatch-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };
        let upstream = UpstreamConfig {
            open_meteo_url: std::env::var("OPEN_METEO_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com".into()),
            fastapi_url: std::env::var("FASTAPI_URL")
                .unwrap_or_else(|_| "http://fastapi:8000".into()),
            nominatim_url: std::env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".into()),
            timeout_secs: env_parse("HTTP_TIMEOUT_SECS").unwrap_or(15),
        };
        Ok(Self {
            database_url,
            jwt,
            upstream,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Settings of the detection simulator binary.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    pub api_url: String,
    pub port: u16,
    pub email: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl SimulatorConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_url: std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
            port: env_parse("SIM_PORT").unwrap_or(3001),
            email: non_empty("SIM_EMAIL"),
            password: non_empty("SIM_PASSWORD"),
            timeout_secs: env_parse("HTTP_TIMEOUT_SECS").unwrap_or(15),
        }
    }

    /// Login credentials, when both are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.email, &self.password) {
            (Some(e), Some(p)) => Some((e.clone(), p.clone())),
            _ => None,
        }
    }
}
