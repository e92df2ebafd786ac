use mintbay_core::AppError;

/// Server-level configuration (bind address and rate limiting).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Per-IP token bucket on the auth routes; `None` disables the layer
    /// (used by tests, which drive the router without a socket).
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub replenish_per_second: u64,
    pub burst: u32,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `MINTBAY_SERVER_PORT` (optional, defaults to 3000)
    /// - `MINTBAY_RATE_LIMIT_PER_SECOND` (optional, defaults to 2)
    /// - `MINTBAY_RATE_LIMIT_BURST` (optional, defaults to 10)
    /// - `MINTBAY_RATE_LIMIT_DISABLED` (optional; set to `1` to disable)
    pub fn from_env() -> Result<Self, AppError> {
        let port = match std::env::var("MINTBAY_SERVER_PORT") {
            Err(_) => 3000,
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid MINTBAY_SERVER_PORT '{raw}': must be a port number"
                ))
            })?,
        };

        let disabled = std::env::var("MINTBAY_RATE_LIMIT_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let rate_limit = if disabled {
            None
        } else {
            let replenish_per_second = parse_env_u64("MINTBAY_RATE_LIMIT_PER_SECOND", 2)?;
            let burst = parse_env_u64("MINTBAY_RATE_LIMIT_BURST", 10)? as u32;
            Some(RateLimitConfig {
                replenish_per_second,
                burst,
            })
        };

        Ok(Self { port, rate_limit })
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let parsed: u64 = raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid {name} '{raw}': must be a positive integer"))
            })?;
            if parsed == 0 {
                return Err(AppError::ConfigError(format!("{name} must be at least 1")));
            }
            Ok(parsed)
        }
    }
}
