use charlcd_gpio::lcd::hd44780::intf::InterfaceConfig;
use dotenv::var;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "charlcd.json";

/// Display and timing settings. Missing keys take their default value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Screen width in characters.
    pub width: i16,
    /// Screen height in rows.
    pub height: i16,
    pub busy_poll_limit: u32,
    pub first_function_set_delay_us: u32,
    pub second_function_set_delay_us: u32,
    /// Time between two clock updates.
    pub refresh_ms: u64,
    /// Stop after this many seconds. Runs forever if absent.
    pub run_for_secs: Option<u64>,
}

impl Config {
    pub fn try_load() -> Option<Self> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str
            .as_deref()
            .unwrap_or(OsStr::new(DEFAULT_CONFIG_FILE));
        let config_path = Path::new(config_str);
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let config_path = Path::new(&config_str);
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn interface_config(&self) -> InterfaceConfig {
        InterfaceConfig::default()
            .with_busy_poll_limit(self.busy_poll_limit)
            .with_function_set_delays_us(
                self.first_function_set_delay_us,
                self.second_function_set_delay_us,
            )
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 16,
            height: 2,
            busy_poll_limit: InterfaceConfig::DEFAULT_BUSY_POLL_LIMIT,
            first_function_set_delay_us: InterfaceConfig::DEFAULT_FIRST_FUNCTION_SET_DELAY_US,
            second_function_set_delay_us: InterfaceConfig::DEFAULT_SECOND_FUNCTION_SET_DELAY_US,
            refresh_ms: 500,
            run_for_secs: None,
        }
    }
}
