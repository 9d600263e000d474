mod config;

use crate::config::Config;
use charlcd_gpio::delay::StdDelay;
use charlcd_gpio::gpiod::GpiodLcdPort;
use charlcd_gpio::lcd::hd44780::display::LcdDisplay;
use charlcd_gpio::lcd::hd44780::intf::ControllerInterface;
use dotenv::dotenv;
use eyre::eyre;
use log::{debug, info, warn};
use std::env::var;
use std::fmt::Write;
use std::thread::sleep;
use std::time::{Duration, Instant};
use sysinfo::System;
use time::{OffsetDateTime, UtcOffset};

const DEFAULT_CHIP: &str = "/dev/gpiochip0";

fn parse_pin_bus(pin_str: &str) -> eyre::Result<Vec<u32>> {
    let pins = pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pins)
}

struct Pins {
    chip: String,
    rs: u32,
    rw: u32,
    e: u32,
    data: Vec<u32>,
}

impl Pins {
    fn from_env() -> eyre::Result<Self> {
        Ok(Pins {
            chip: var("CHARLCD_GPIO_CHIP").unwrap_or_else(|_| DEFAULT_CHIP.to_string()),
            rs: var("CHARLCD_PIN_RS")?.parse()?,
            rw: var("CHARLCD_PIN_RW")?.parse()?,
            e: var("CHARLCD_PIN_E")?.parse()?,
            data: parse_pin_bus(&var("CHARLCD_PINS_DATA")?)?,
        })
    }

    fn open<const N: usize>(&self) -> eyre::Result<GpiodLcdPort<N>> {
        let data: [u32; N] = self
            .data
            .clone()
            .try_into()
            .map_err(|_| eyre!("Invalid number of data pins"))?;
        Ok(GpiodLcdPort::open(&self.chip, self.rs, self.rw, self.e, data)?)
    }
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!(
        "Hostname {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR)
    );

    let pins = Pins::from_env()?;
    info!(
        "LCD @ {} E: {}, RW: {}, RS: {}, Data: {:?}",
        pins.chip, pins.e, pins.rw, pins.rs, pins.data
    );

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    debug!("{:?}", config);

    match pins.data.len() {
        4 => run(pins.open::<4>()?, &config),
        8 => run(pins.open::<8>()?, &config),
        n => Err(eyre!("Expected 4 or 8 data pins, got {}", n)),
    }
}

fn run<const N: usize>(port: GpiodLcdPort<N>, config: &Config) -> eyre::Result<()> {
    let width = GpiodLcdPort::<N>::bus_width().ok_or_else(|| eyre!("Unsupported bus width"))?;

    let mut intf = ControllerInterface::init(port, StdDelay, width, config.interface_config())?;
    intf.initialize_controller()?;

    let mut lcd = LcdDisplay::new(intf).with_dimensions(config.width, config.height);
    lcd.clear()?;

    let clock_row = if config.height > 1 {
        lcd.puts(concat!("charlcd v", env!("CARGO_PKG_VERSION")))?;
        1
    } else {
        0
    };

    info!("Starting clock...");

    let started = Instant::now();
    let run_for = config.run_for_secs.map(Duration::from_secs);
    let refresh = Duration::from_millis(config.refresh_ms);

    let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("Local offset unknown, showing UTC");
        UtcOffset::UTC
    });

    while run_for.is_none_or(|limit| started.elapsed() < limit) {
        let now = OffsetDateTime::now_utc().to_offset(offset);

        lcd.goto_xy(0, clock_row)?;
        write!(lcd, "{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())?;

        sleep(refresh);
    }

    lcd.clear()?;
    let (port, _) = lcd.into_inner().deinit()?;
    debug!("{:?} done.", port);

    Ok(())
}
