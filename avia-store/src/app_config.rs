use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub limits: LimitsConfig,
    pub fees: FeeConfig,
    pub lock: LockConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub dir: String,
    pub bookings_file: String,
    pub flights_file: String,
    pub lock_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            bookings_file: "bookings.json".to_string(),
            flights_file: "flights.json".to_string(),
            lock_file: "lock.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_bookings: usize,
    pub max_flights: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_bookings: 100,
            max_flights: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeeConfig {
    pub seat_change: f64,
    pub date_change: f64,
    pub min_cancellation: f64,
    pub long_horizon_cancellation: f64,
    pub taxes_and_fees: f64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            seat_change: 25.0,
            date_change: 75.0,
            min_cancellation: 25.0,
            long_horizon_cancellation: 50.0,
            taxes_and_fees: 45.50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LockConfig {
    pub retry_ms: u64,
    /// Bounded wait for lock acquisition. `None` retries forever, matching
    /// the reference behavior.
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            retry_ms: 200,
            acquire_timeout_ms: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Every file layer is optional; serde defaults supply the
            // reference constants when nothing is configured.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `AVIA__LIMITS__MAX_BOOKINGS=200`
            .add_source(config::Environment::with_prefix("AVIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn bookings_path(&self) -> PathBuf {
        PathBuf::from(&self.data.dir).join(&self.data.bookings_file)
    }

    pub fn flights_path(&self) -> PathBuf {
        PathBuf::from(&self.data.dir).join(&self.data.flights_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        PathBuf::from(&self.data.dir).join(&self.data.lock_file)
    }
}
