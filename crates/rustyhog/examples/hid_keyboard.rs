//! Example running the emulated HID keyboard
//!
//! Builds the default application, prints its managed objects, subscribes to
//! the Battery Level and HID Report characteristics the way a central would,
//! and logs every notification for a while.
//!
//! Run with `RUST_LOG=debug` for request-level logging.

use rustyhog::gatt::{event_channel, ObjectPath};
use rustyhog::{default_application, start_producers, ApplicationConfig, ThreadTimer};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ApplicationConfig {
        battery_interval: Duration::from_secs(1),
        key_interval: Duration::from_millis(500),
        generic_services: true,
        ..Default::default()
    };

    let (events, rx) = event_channel();
    let app = default_application(&config, events)?;

    println!("Managed objects:");
    for (path, interfaces) in app.snapshot() {
        for (interface, props) in interfaces {
            println!("  {} [{}]", path, interface);
            for (name, value) in props {
                println!("    {}: {:?}", name, value);
            }
        }
    }

    let timer = ThreadTimer;
    let producers = start_producers(&app, &timer);
    println!("Started {} producers", producers);

    let battery = ObjectPath::service(&config.path_base, 0).characteristic(0);
    let report = ObjectPath::service(&config.path_base, 1).characteristic(3);
    app.start_notify(&battery)?;
    app.start_notify(&report)?;

    let deadline = Instant::now() + Duration::from_secs(10);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(remaining) {
            Ok(event) => {
                let value = event.new_value().map(hex::encode).unwrap_or_default();
                println!("PropertiesChanged {} Value={}", event.path, value);
            }
            Err(_) => break,
        }
    }

    app.stop_notify(&report)?;
    app.stop_notify(&battery)?;
    println!("Notifications stopped");
    Ok(())
}
