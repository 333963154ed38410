// ============================================================================
// Configuration - Environment-Driven, Loaded Once
// ============================================================================
//
// Read in main and passed down explicitly; nothing else in the crate touches
// the environment.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the API server. `HTTP_PORT`, default 8080.
    pub http_port: u16,

    /// Port for the Prometheus /metrics server. `METRICS_PORT`, default 9090.
    pub metrics_port: u16,

    /// Load the demo catalog, users, and orders at startup.
    /// `SEED_DEMO_DATA`, default false.
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            http_port: parse_port(std::env::var("HTTP_PORT").ok().as_deref(), 8080),
            metrics_port: parse_port(std::env::var("METRICS_PORT").ok().as_deref(), 9090),
            seed_demo_data: parse_bool(std::env::var("SEED_DEMO_DATA").ok().as_deref()),
        }
    }
}

fn parse_port(raw: Option<&str>, default: u16) -> u16 {
    match raw {
        Some(s) => s.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(value = s, default, "Ignoring unparseable port");
            default
        }),
        None => default,
    }
}

fn parse_bool(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_defaults_and_overrides() {
        assert_eq!(parse_port(None, 8080), 8080);
        assert_eq!(parse_port(Some("9000"), 8080), 9000);
        assert_eq!(parse_port(Some("not-a-port"), 8080), 8080);
    }

    #[test]
    fn test_parse_bool_accepts_common_truthy_values() {
        assert!(parse_bool(Some("1")));
        assert!(parse_bool(Some("true")));
        assert!(parse_bool(Some("YES")));
        assert!(!parse_bool(Some("0")));
        assert!(!parse_bool(Some("off")));
        assert!(!parse_bool(None));
    }
}
