//! Object paths identifying services, characteristics and descriptors
//!
//! A node's path is its parent's path plus a segment carrying the node's
//! ordinal among its siblings: `{base}/service0/char3/desc1`.

use super::constants::{CHARACTERISTIC_SEGMENT, DESCRIPTOR_SEGMENT, SERVICE_SEGMENT};
use std::fmt;

/// Hierarchical object path of an attribute node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Wrap a path string as-is
    pub fn new(path: impl Into<String>) -> Self {
        ObjectPath(path.into())
    }

    /// Path of the `index`-th service under `base`
    pub fn service(base: &str, index: usize) -> Self {
        ObjectPath(format!("{}/{}{}", base.trim_end_matches('/'), SERVICE_SEGMENT, index))
    }

    /// Path of the `index`-th characteristic of this service
    pub fn characteristic(&self, index: usize) -> Self {
        self.child(CHARACTERISTIC_SEGMENT, index)
    }

    /// Path of the `index`-th descriptor of this characteristic
    pub fn descriptor(&self, index: usize) -> Self {
        self.child(DESCRIPTOR_SEGMENT, index)
    }

    fn child(&self, segment: &str, index: usize) -> Self {
        ObjectPath(format!("{}/{}{}", self.0, segment, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the node one level up, if any
    pub fn parent(&self) -> Option<ObjectPath> {
        match self.0.rfind('/') {
            Some(0) | None => None,
            Some(pos) => Some(ObjectPath(self.0[..pos].to_string())),
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        ObjectPath::new(path)
    }
}

impl PartialEq<str> for ObjectPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ObjectPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_derivation() {
        let service = ObjectPath::service("/org/bluez/example", 1);
        assert_eq!(service, "/org/bluez/example/service1");

        let chrc = service.characteristic(3);
        assert_eq!(chrc, "/org/bluez/example/service1/char3");

        let desc = chrc.descriptor(0);
        assert_eq!(desc, "/org/bluez/example/service1/char3/desc0");
        assert_eq!(desc.parent(), Some(chrc.clone()));
        assert_eq!(chrc.parent(), Some(service));
    }

    #[test]
    fn test_trailing_slash_base() {
        assert_eq!(ObjectPath::service("/app/", 0), "/app/service0");
        assert_eq!(ObjectPath::new("/").parent(), None);
    }
}
