//! CarGuard Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   NvsStorage   ConsoleReader  │
//! │  (servo, motor,     (EventSink)    (registry,   (UID frames)   │
//! │   buzzer, IR, sw)                   config)     LogDisplay     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MenuController (foreground loop)          │    │
//! │  │  Door · Engine · Intrusion · Alarm · Environment       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                          ▲                                     │
//! │                     KeyQueue (64)                              │
//! │                          ▲                                     │
//! │        Keypad task (core 1) · KeypadScanner                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, InputPin, Output, OutputPin, PinDriver, Pull};
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, config::TimerConfig};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::{info, warn};

use carguard::adapters::console::{ConsoleReader, LogDisplay};
use carguard::adapters::hardware::{Actuators, HardwareAdapter, Inputs};
use carguard::adapters::log_sink::LogEventSink;
use carguard::adapters::nvs::NvsStorage;
use carguard::app::ports::StoragePort;
use carguard::app::service::MenuController;
use carguard::config::SystemConfig;
use carguard::error::{ConfigError, Error};
use carguard::drivers::buzzer::Buzzer;
use carguard::drivers::keypad::{KeypadScanner, LAYOUT_4X3, ScanTiming};
use carguard::drivers::motor::MotorDriver;
use carguard::drivers::servo::ServoDriver;
use carguard::events::{InputEventSource, KeyQueue};
use carguard::registry::UserRegistry;
use carguard::sensors::motion::MotionSensor;
use carguard::sensors::switch::SlideSwitch;

const CONFIG_NAMESPACE: &str = "carguard";
const CONFIG_KEY: &str = "config";

// ── Helpers ───────────────────────────────────────────────────

fn output(pin: impl OutputPin) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
    Ok(PinDriver::output(pin.downgrade_output())?)
}

fn pulled_up(pin: impl InputPin) -> Result<PinDriver<'static, AnyInputPin, Input>> {
    let mut drv = PinDriver::input(pin.downgrade_input())?;
    drv.set_pull(Pull::Up)?;
    Ok(drv)
}

/// JSON config document stored in NVS.
fn stored_config(storage: &NvsStorage) -> carguard::error::Result<SystemConfig> {
    let mut buf = vec![0u8; 2048];
    let len = storage.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf)?;
    let raw = core::str::from_utf8(&buf[..len]).map_err(|_| ConfigError::Malformed)?;
    Ok(SystemConfig::from_json(raw)?)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CarGuard v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let p = Peripherals::take()?;

    // ── 2. Storage, config, registry ──────────────────────────
    let storage = NvsStorage::new().map_err(Error::from)?;
    let config = stored_config(&storage).unwrap_or_else(|e| {
        info!("Config: using defaults ({})", e);
        SystemConfig::default()
    });
    match UserRegistry::open(storage) {
        Ok(reg) => info!("Registry: {} enrolled user(s)", reg.len()),
        Err(e) => warn!("Registry unavailable: {}", e),
    }

    // ── 3. PWM: servo at 50 Hz, motor at 1 kHz ────────────────
    let servo_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default().frequency(50.Hz().into()).resolution(Resolution::Bits14),
    )?;
    let motor_timer = LedcTimerDriver::new(
        p.ledc.timer1,
        &TimerConfig::default().frequency(1.kHz().into()).resolution(Resolution::Bits10),
    )?;
    let servo_pwm = LedcDriver::new(p.ledc.channel0, &servo_timer, p.pins.gpio18)?;
    let motor_pwm = LedcDriver::new(p.ledc.channel1, &motor_timer, p.pins.gpio19)?;

    // ── 4. GPIO ───────────────────────────────────────────────
    let actuators = Actuators {
        servo: ServoDriver::new(servo_pwm),
        motor: MotorDriver::new(motor_pwm),
        buzzer: Buzzer::new(output(p.pins.gpio23)?),
    };
    let inputs = Inputs {
        motion: MotionSensor::new(pulled_up(p.pins.gpio27)?),
        switch: SlideSwitch::new(pulled_up(p.pins.gpio32)?, false),
    };

    // ── 5. Keypad producer task ───────────────────────────────
    let queue = Arc::new(KeyQueue::new());
    let keypad = KeypadScanner::new(
        [
            output(p.pins.gpio13)?,
            output(p.pins.gpio12)?,
            output(p.pins.gpio14)?,
            output(p.pins.gpio15)?,
        ],
        [pulled_up(p.pins.gpio26)?, pulled_up(p.pins.gpio25)?, pulled_up(p.pins.gpio33)?],
        LAYOUT_4X3,
        FreeRtos,
        ScanTiming::default(),
    );
    let _keypad_task = InputEventSource::new(keypad, queue.clone()).spawn()?;

    // ── 6. Controller ─────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        actuators,
        inputs,
        Box::new(LogDisplay::new()),
        Box::new(ConsoleReader::new(std::io::stdin().lock())),
        FreeRtos,
    );
    let mut sink = LogEventSink::new();
    let mut controller = MenuController::new(&config, queue, &mut hw);
    controller.start(&mut hw, &mut sink);

    info!("Entering control loop");
    loop {
        controller.tick(&mut hw, &mut sink);
    }
}
