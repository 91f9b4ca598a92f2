use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Knobs an operator may tune without recompiling.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Seconds an unpaid booking may keep its seats before the sweep
    /// cancels it.
    pub hold_window_seconds: u64,
    /// Flat fee in cents added once per booking at checkout, never at
    /// quote time.
    pub booking_fee_cents: i64,
    /// Cadence of the background expiry sweep.
    pub sweep_interval_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("server.port", 8080)?
            .set_default("business_rules.hold_window_seconds", 900)?
            .set_default("business_rules.booking_fee_cents", 5000)?
            .set_default("business_rules.sweep_interval_seconds", 60)?
            // Checked-in defaults, then the current environment file,
            // then a local file kept out of git. All optional; the
            // built-in defaults above keep a bare checkout runnable.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `RAILBOOK__SERVER__PORT=9090`
            .add_source(config::Environment::with_prefix("RAILBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_falls_back_to_defaults() {
        let config = Config::load().expect("defaults should satisfy the schema");
        assert_eq!(config.business_rules.hold_window_seconds, 900);
        assert_eq!(config.business_rules.booking_fee_cents, 5000);
        assert!(config.server.port > 0);
    }
}
