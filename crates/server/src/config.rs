//! Server configuration

/// Server configuration loaded from environment variables
pub struct Config {
    /// Base URL of the FHIR R4 server, without trailing slash
    pub fhir_base_url: String,
    pub bind_address: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let fhir_base_url = std::env::var("FHIR_BASE_URL")
            .unwrap_or_else(|_| "http://hapi.fhir.org/baseR4".into());

        Self {
            fhir_base_url: fhir_base_url.trim_end_matches('/').to_string(),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
            ),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
