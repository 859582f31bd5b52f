//! GATT object-model constants

/// Object manager interface the application root answers on
pub const DBUS_OM_IFACE: &str = "org.freedesktop.DBus.ObjectManager";
/// Properties interface carrying `GetAll` and `PropertiesChanged`
pub const DBUS_PROP_IFACE: &str = "org.freedesktop.DBus.Properties";

pub const GATT_SERVICE_IFACE: &str = "org.bluez.GattService1";
pub const GATT_CHRC_IFACE: &str = "org.bluez.GattCharacteristic1";
pub const GATT_DESC_IFACE: &str = "org.bluez.GattDescriptor1";

/// Default root under which services are published
pub const DEFAULT_PATH_BASE: &str = "/org/bluez/example";

// Path segment prefixes
pub const SERVICE_SEGMENT: &str = "service";
pub const CHARACTERISTIC_SEGMENT: &str = "char";
pub const DESCRIPTOR_SEGMENT: &str = "desc";

// Property names
pub const PROP_UUID: &str = "UUID";
pub const PROP_PRIMARY: &str = "Primary";
pub const PROP_CHARACTERISTICS: &str = "Characteristics";
pub const PROP_SERVICE: &str = "Service";
pub const PROP_FLAGS: &str = "Flags";
pub const PROP_DESCRIPTORS: &str = "Descriptors";
pub const PROP_CHARACTERISTIC: &str = "Characteristic";
pub const PROP_VALUE: &str = "Value";
