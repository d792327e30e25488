//! Cabin environment check (idle menu option 3).
//!
//! Three screens, each held for the configured dwell:
//!
//! | Screen   | Line 1                   | Line 2              |
//! |----------|--------------------------|---------------------|
//! | Ambient  | `Amb:22.5C L:312`        | `Humid:41.0%`       |
//! | Lighting | `Light ON  - Dark`       | `Level: 812`        |
//! | Rain     | `Rain Detected`          | `Wipers ON`         |
//!
//! Any failed reading renders as `N/A`; nothing here aborts the caller.
//! The lighting screen also drives the cabin light.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{ClimateReading, DisplayPort, EnvironmentPort};
use crate::config::SystemConfig;

/// Full-scale value of the 10-bit light ADC.
pub const ADC_MAX: u16 = 1023;

pub struct EnvironmentMonitor {
    light_channel: u8,
    dark_threshold: u16,
    invert: bool,
}

impl EnvironmentMonitor {
    pub fn new(light_channel: u8, dark_threshold: u16, invert: bool) -> Self {
        Self {
            light_channel: light_channel.min(7),
            dark_threshold: dark_threshold.min(ADC_MAX),
            invert,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.light_channel, config.light_threshold, config.light_invert)
    }

    /// Light level (0–1023) or `None` on a failed or out-of-range read.
    pub fn read_light_level(&self, hw: &mut impl EnvironmentPort) -> Option<u16> {
        match hw.read_analog(self.light_channel) {
            Ok(level) if level <= ADC_MAX => Some(level),
            Ok(level) => {
                debug!("Env: light level {level} out of range");
                None
            }
            Err(e) => {
                debug!("Env: light read failed ({e})");
                None
            }
        }
    }

    /// Dark decision for a valid level.
    pub fn is_dark(&self, level: u16) -> bool {
        (level > self.dark_threshold) != self.invert
    }

    pub fn read_climate(&self, hw: &mut impl EnvironmentPort) -> Option<ClimateReading> {
        match hw.read_climate() {
            Ok(r) if r.celsius.is_finite() && r.humidity_pct.is_finite() => Some(r),
            Ok(_) => None,
            Err(e) => {
                debug!("Env: climate read failed ({e})");
                None
            }
        }
    }

    pub fn read_rain(&self, hw: &mut impl EnvironmentPort) -> Option<bool> {
        hw.read_moisture()
            .map_err(|e| debug!("Env: moisture read failed ({e})"))
            .ok()
    }

    /// Screen 1: temperature, humidity and raw light level.
    pub fn show_ambient<H>(&self, hw: &mut H, dwell_ms: u32)
    where
        H: EnvironmentPort + DisplayPort + DelayNs,
    {
        let climate = self.read_climate(hw);
        let light = na_or(self.read_light_level(hw));
        match climate {
            Some(c) => hw.show(
                &format!("Amb:{:.1}C L:{}", c.celsius, light),
                &format!("Humid:{:.1}%", c.humidity_pct),
            ),
            None => hw.show(&format!("Amb:N/A  L:{light}"), "Humid:N/A"),
        }
        hw.delay_ms(dwell_ms);
    }

    /// Screen 2: drive the cabin light from the dark decision.  Returns the
    /// light state, or `None` if the level could not be read (light off).
    pub fn update_lighting<H>(&self, hw: &mut H, dwell_ms: u32) -> Option<bool>
    where
        H: EnvironmentPort + DisplayPort + DelayNs,
    {
        let level = self.read_light_level(hw);
        let dark = level.map(|l| self.is_dark(l));

        let on = dark.unwrap_or(false);
        if let Err(e) = hw.set_cabin_light(on) {
            warn!("Env: cabin light command failed ({e})");
        }
        info!("Env: cabin light {}", if on { "ON" } else { "OFF" });

        hw.show(
            if on { "Light ON  - Dark" } else { "Light OFF - Bright" },
            &format!("Level: {}", na_or(level)),
        );
        hw.delay_ms(dwell_ms);
        dark
    }

    /// Screen 3: rain / wiper status.
    pub fn show_rain<H>(&self, hw: &mut H, dwell_ms: u32)
    where
        H: EnvironmentPort + DisplayPort + DelayNs,
    {
        match self.read_rain(hw) {
            Some(true) => hw.show("Rain Detected", "Wipers ON"),
            Some(false) => hw.show("No Rain", "Wipers OFF"),
            None => hw.show("Rain: N/A", ""),
        }
        hw.delay_ms(dwell_ms);
    }

    /// All three screens in sequence.
    pub fn display_all<H>(&self, hw: &mut H, dwell_ms: u32)
    where
        H: EnvironmentPort + DisplayPort + DelayNs,
    {
        self.show_ambient(hw, dwell_ms);
        let _ = self.update_lighting(hw, dwell_ms);
        self.show_rain(hw, dwell_ms);
    }
}

fn na_or(level: Option<u16>) -> String {
    level.map_or_else(|| "N/A".to_owned(), |l| l.to_string())
}
