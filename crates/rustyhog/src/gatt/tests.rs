//! Unit tests for the GATT registry and notification engine

use super::constants::*;
use super::*;
use crate::config::ApplicationConfig;
use crate::error::GattError;
use crate::profiles::default_application;
use crate::scheduler::{start_producers, ManualTimer};
use crate::uuid::Uuid;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn keyboard() -> (Application, Receiver<PropertiesChanged>) {
    init_logging();
    let (events, rx) = event_channel();
    let app = default_application(&ApplicationConfig::default(), events).unwrap();
    (app, rx)
}

fn path(s: &str) -> ObjectPath {
    ObjectPath::new(s)
}

const BATTERY_LEVEL: &str = "/org/bluez/example/service0/char0";
const HID_REPORT_MAP: &str = "/org/bluez/example/service1/char0";
const HID_CONTROL_POINT: &str = "/org/bluez/example/service1/char2";
const HID_REPORT: &str = "/org/bluez/example/service1/char3";
const HID_PROTOCOL_MODE: &str = "/org/bluez/example/service1/char4";

#[test]
fn test_snapshot_shape() {
    let (app, _rx) = keyboard();
    let objects = app.snapshot();

    // 2 services, 6 characteristics, 1 descriptor
    assert_eq!(objects.len(), 9);
    assert_eq!(app.len(), 9);
    let unique: HashSet<&ObjectPath> = objects.keys().collect();
    assert_eq!(unique.len(), objects.len());

    let battery = &objects[&path("/org/bluez/example/service0")][GATT_SERVICE_IFACE];
    assert_eq!(battery[PROP_UUID], PropertyValue::Uuid(Uuid::from_u16(0x180f)));
    assert_eq!(battery[PROP_PRIMARY], PropertyValue::Bool(true));
    assert_eq!(
        battery[PROP_CHARACTERISTICS].as_paths(),
        Some(&[path(BATTERY_LEVEL)][..])
    );

    let hid = app.service(&path("/org/bluez/example/service1")).unwrap();
    let expected: Vec<ObjectPath> = (0..5)
        .map(|i| path(&format!("/org/bluez/example/service1/char{}", i)))
        .collect();
    assert_eq!(hid.characteristic_paths(), &expected[..]);
}

#[test]
fn test_parent_references() {
    let (app, _rx) = keyboard();
    let objects = app.snapshot();

    for chrc in app.characteristics() {
        let props = &objects[chrc.path()][GATT_CHRC_IFACE];
        let parent = props[PROP_SERVICE].as_path().unwrap();
        assert_eq!(parent, chrc.service_path());
        assert!(app.service(parent).unwrap().characteristic_paths().contains(chrc.path()));
        assert_eq!(chrc.path().parent().as_ref(), Some(parent));
    }

    for desc in app.descriptors() {
        let props = &objects[desc.path()][GATT_DESC_IFACE];
        let parent = props[PROP_CHARACTERISTIC].as_path().unwrap();
        let chrc = app.characteristic(parent).unwrap();
        assert!(chrc.descriptor_paths().contains(desc.path()));
    }
}

#[test]
fn test_published_flags() {
    let (app, _rx) = keyboard();
    let flags = |p: &str| app.get_all(&path(p), GATT_CHRC_IFACE).unwrap()[PROP_FLAGS].clone();

    assert_eq!(
        flags(BATTERY_LEVEL),
        PropertyValue::Strings(vec!["read".into(), "notify".into()])
    );
    assert_eq!(flags(HID_CONTROL_POINT), PropertyValue::Strings(vec!["write".into()]));
    assert_eq!(
        flags(HID_PROTOCOL_MODE),
        PropertyValue::Strings(vec!["read".into(), "write".into()])
    );
}

#[test]
fn test_get_all_rejects_other_interface() {
    let (app, _rx) = keyboard();
    assert!(matches!(
        app.get_all(&path(BATTERY_LEVEL), GATT_SERVICE_IFACE),
        Err(GattError::InvalidArguments(_))
    ));
    assert!(matches!(
        app.get_all(&path("/org/bluez/example/service0"), "org.example.Nope"),
        Err(GattError::InvalidArguments(_))
    ));
    assert!(app.get_all(&path("/org/bluez/example/service0"), GATT_SERVICE_IFACE).is_ok());
}

#[test]
fn test_unknown_path() {
    let (app, _rx) = keyboard();
    let missing = path("/org/bluez/example/service9/char0");
    let opts = RequestOptions::default();

    assert_eq!(app.read_value(&missing, &opts), Err(GattError::DoesNotExist(missing.clone())));
    assert_eq!(app.start_notify(&missing), Err(GattError::DoesNotExist(missing.clone())));
    assert!(app.characteristic(&missing).is_none());
}

#[test]
fn test_operations_gated_by_flags() {
    let (app, rx) = keyboard();
    let opts = RequestOptions::default();

    // Report Map is read-only and cannot notify
    assert_eq!(app.write_value(&path(HID_REPORT_MAP), &[0], &opts), Err(GattError::NotSupported));
    assert_eq!(app.start_notify(&path(HID_REPORT_MAP)), Err(GattError::NotSupported));
    assert_eq!(app.stop_notify(&path(HID_REPORT_MAP)), Err(GattError::NotSupported));

    // Control Point is write-only
    assert_eq!(app.read_value(&path(HID_CONTROL_POINT), &opts), Err(GattError::NotSupported));
    app.write_value(&path(HID_CONTROL_POINT), &[0x01], &opts).unwrap();
    assert_eq!(
        app.write_value(&path(HID_CONTROL_POINT), &[0x02], &opts),
        Err(GattError::CommandRejected(0x02))
    );

    // Services accept no value operations
    let service = path("/org/bluez/example/service0");
    assert_eq!(app.read_value(&service, &opts), Err(GattError::NotSupported));

    // The Report Reference descriptor is read-only
    let reference = path(HID_REPORT).descriptor(0);
    assert_eq!(app.read_value(&reference, &opts).unwrap(), vec![0x01, 0x01]);
    assert_eq!(app.write_value(&reference, &[0], &opts), Err(GattError::NotSupported));
    assert_eq!(app.start_notify(&reference), Err(GattError::NotSupported));

    assert!(rx.try_recv().is_err());
}

#[test]
fn test_start_notify_is_idempotent() {
    let (app, rx) = keyboard();
    let battery = path(BATTERY_LEVEL);

    app.start_notify(&battery).unwrap();
    app.start_notify(&battery).unwrap();
    assert!(app.characteristic(&battery).unwrap().is_notifying());

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, battery);
    assert_eq!(events[0].interface, GATT_CHRC_IFACE);
    assert_eq!(events[0].new_value(), Some(&[100u8][..]));

    app.stop_notify(&battery).unwrap();
    app.stop_notify(&battery).unwrap();
    assert!(!app.characteristic(&battery).unwrap().is_notifying());
}

#[test]
fn test_emit_changed_requires_subscriber() {
    let (app, rx) = keyboard();
    let report = app.characteristic(&path(HID_REPORT)).unwrap();

    assert!(!report.emit_changed(vec![1]));
    assert!(rx.try_recv().is_err());

    app.start_notify(report.path()).unwrap();
    // HID Report has no initial value on subscribe
    assert!(rx.try_recv().is_err());
    assert!(report.emit_changed(vec![1]));
    assert_eq!(rx.try_recv().unwrap().new_value(), Some(&[1u8][..]));

    app.stop_notify(report.path()).unwrap();
    assert!(!report.emit_changed(vec![2]));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_producers_drive_notifications() {
    let (app, rx) = keyboard();
    let timer = ManualTimer::new();
    assert_eq!(start_producers(&app, &timer), 2);
    assert!(app.characteristic(&path(BATTERY_LEVEL)).unwrap().has_producer());
    assert!(!app.characteristic(&path(HID_REPORT_MAP)).unwrap().has_producer());

    // Producers run while unsubscribed but emit nothing
    timer.advance(Duration::from_secs(10));
    assert!(rx.try_recv().is_err());
    let opts = RequestOptions::default();
    assert_eq!(app.read_value(&path(BATTERY_LEVEL), &opts).unwrap(), vec![96]);
    assert_eq!(app.read_value(&path(HID_REPORT), &opts).unwrap()[2], 0x06);

    app.start_notify(&path(BATTERY_LEVEL)).unwrap();
    timer.advance(Duration::from_secs(15));
    let levels: Vec<u8> = rx.try_iter().map(|e| e.new_value().unwrap()[0]).collect();
    assert_eq!(levels, vec![96, 94, 92, 90]);

    app.stop_notify(&path(BATTERY_LEVEL)).unwrap();
    timer.advance(Duration::from_secs(5));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_key_reports_cycle() {
    let (app, rx) = keyboard();
    let timer = ManualTimer::new();
    start_producers(&app, &timer);
    app.start_notify(&path(HID_REPORT)).unwrap();

    timer.advance(Duration::from_secs(5 * 26));
    let keys: Vec<u8> = rx
        .try_iter()
        .filter(|e| e.path == path(HID_REPORT))
        .map(|e| e.new_value().unwrap()[2])
        .collect();
    assert_eq!(keys.len(), 26);
    assert_eq!(keys[0], 0x05); // 'b'
    assert_eq!(keys[24], 0x1D); // 'z'
    assert_eq!(keys[25], 0x04); // back to 'a'
}

#[test]
fn test_dropping_application_stops_producers() {
    let (app, _rx) = keyboard();
    let timer = ManualTimer::new();
    start_producers(&app, &timer);
    assert_eq!(timer.active_tasks(), 2);

    drop(app);
    assert_eq!(timer.active_tasks(), 0);
    assert_eq!(timer.advance(Duration::from_secs(60)), 0);
}

#[test]
fn test_path_base_trailing_slash() {
    let mut builder = ApplicationBuilder::new("/base/");
    let registered = builder.register(ServiceDefinition::new(Uuid::from_u16(0x180f), true));
    assert_eq!(registered, path("/base/service0"));

    let app = builder.build(discard_events()).unwrap();
    assert_eq!(app.len(), 1);
    assert!(app.service(&registered).unwrap().characteristic_paths().is_empty());
}

#[test]
fn test_optional_services() {
    let config = ApplicationConfig {
        path_base: "/org/rustyhog".to_string(),
        generic_services: true,
        test_service: true,
        ..Default::default()
    };
    let app = default_application(&config, discard_events()).unwrap();

    let uuids: Vec<Uuid> = app.services().iter().map(|s| s.uuid()).collect();
    assert_eq!(uuids[..4], [
        Uuid::from_u16(0x180f),
        Uuid::from_u16(0x1812),
        Uuid::from_u16(0x1800),
        Uuid::from_u16(0x1801),
    ]);
    assert_eq!(uuids.len(), 5);
    assert_eq!(app.services()[4].path(), &path("/org/rustyhog/service4"));
}

#[test]
fn test_no_event_after_stop_notify_with_concurrent_ticks() {
    init_logging();
    let stopped = Arc::new(AtomicBool::new(false));
    let late = Arc::new(AtomicUsize::new(0));
    let (s, l) = (stopped.clone(), late.clone());
    let events: PropertiesChangedCallback = Arc::new(move |_| {
        if s.load(Ordering::SeqCst) {
            l.fetch_add(1, Ordering::SeqCst);
        }
    });
    let app = default_application(&ApplicationConfig::default(), events).unwrap();
    let battery = app.characteristic(&path(BATTERY_LEVEL)).unwrap().clone();

    for _ in 0..50 {
        stopped.store(false, Ordering::SeqCst);
        battery.start_notify().unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    battery.tick();
                }
            });
            thread::yield_now();
            battery.stop_notify().unwrap();
            stopped.store(true, Ordering::SeqCst);
        });
    }

    assert_eq!(late.load(Ordering::SeqCst), 0);
}

#[test]
fn test_events_follow_drain_order_across_threads() {
    let (app, rx) = keyboard();
    let battery = app.characteristic(&path(BATTERY_LEVEL)).unwrap();
    battery.start_notify().unwrap();

    // 40 ticks stay clear of the recharge at tick 51
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..10 {
                    battery.tick();
                }
            });
        }
    });

    let levels: Vec<u8> = rx.try_iter().map(|e| e.new_value().unwrap()[0]).collect();
    let expected: Vec<u8> = (0..=40u8).map(|n| 100 - 2 * n).collect();
    assert_eq!(levels, expected);
}

#[test]
fn test_explicit_service_indices() {
    let mut builder = ApplicationBuilder::new("/idx");
    let hid = builder.register_at(1, crate::profiles::hid_service(Duration::from_secs(5)));
    let battery = builder.register_at(0, crate::profiles::battery_service(Duration::from_secs(5)));
    let next = builder.register(ServiceDefinition::new(Uuid::from_u16(0x1801), true));
    assert_eq!(hid, path("/idx/service1"));
    assert_eq!(battery, path("/idx/service0"));
    assert_eq!(next, path("/idx/service2"));

    let app = builder.build(discard_events()).unwrap();
    // Registration order is kept; paths follow the explicit indices
    assert_eq!(app.services()[0].path(), &hid);
    assert!(app.characteristic(&battery.characteristic(0)).is_some());
    assert!(app.characteristic(&hid.characteristic(4)).is_some());
}

#[test]
fn test_duplicate_service_index_rejected() {
    let mut builder = ApplicationBuilder::new("/dup");
    builder.register_at(0, crate::profiles::battery_service(Duration::from_secs(5)));
    let clash = builder.register_at(0, crate::profiles::hid_service(Duration::from_secs(5)));

    let err = builder.build(discard_events()).unwrap_err();
    assert_eq!(err, GattError::AlreadyRegistered(clash));
    assert_eq!(err.dbus_name(), "org.bluez.Error.AlreadyExists");
}
