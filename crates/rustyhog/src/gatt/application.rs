//! GATT application registry
//!
//! The application is the root of the attribute tree. Services are
//! registered on an [`ApplicationBuilder`]; building it assigns every node
//! its path and freezes the tree shape. From then on only per-node values
//! and subscription state change, so snapshots need no locking.

use super::characteristic::Characteristic;
use super::constants::DEFAULT_PATH_BASE;
use super::descriptor::Descriptor;
use super::handler::RequestOptions;
use super::path::ObjectPath;
use super::properties::{ManagedObjects, PropertiesChangedCallback, PropertyMap};
use super::service::{Service, ServiceDefinition};
use crate::error::{GattError, GattResult};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Path the application root itself is exported at
pub const APPLICATION_PATH: &str = "/";

/// Arena slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeId {
    Service(usize),
    Characteristic(usize),
    Descriptor(usize),
}

/// Collects services before publication
#[derive(Debug)]
pub struct ApplicationBuilder {
    path_base: String,
    /// Service index paired with its definition, in registration order
    services: Vec<(usize, ServiceDefinition)>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_BASE)
    }
}

impl ApplicationBuilder {
    /// Create a builder publishing services under `path_base`
    pub fn new(path_base: impl Into<String>) -> Self {
        Self {
            path_base: path_base.into(),
            services: Vec::new(),
        }
    }

    /// Register a service under the next free index and return the path it
    /// will be published at.
    pub fn register(&mut self, service: ServiceDefinition) -> ObjectPath {
        let index = self
            .services
            .iter()
            .map(|(index, _)| index + 1)
            .max()
            .unwrap_or(0);
        self.register_at(index, service)
    }

    /// Register a service under an explicit index. An index already taken
    /// makes [`ApplicationBuilder::build`] fail with `AlreadyRegistered`.
    pub fn register_at(&mut self, index: usize, service: ServiceDefinition) -> ObjectPath {
        let path = ObjectPath::service(&self.path_base, index);
        debug!("Registering service {} at {}", service.uuid(), path);
        self.services.push((index, service));
        path
    }

    /// Assign paths to every node and publish the tree
    pub fn build(self, events: PropertiesChangedCallback) -> GattResult<Application> {
        let mut app = Application {
            services: Vec::with_capacity(self.services.len()),
            characteristics: Vec::new(),
            descriptors: Vec::new(),
            index: HashMap::new(),
        };

        for (service_index, service_def) in self.services {
            let service_path = ObjectPath::service(&self.path_base, service_index);
            app.insert_path(&service_path, NodeId::Service(app.services.len()))?;
            let mut characteristic_paths = Vec::with_capacity(service_def.characteristics.len());

            for (chrc_index, chrc_def) in service_def.characteristics.into_iter().enumerate() {
                let chrc_path = service_path.characteristic(chrc_index);
                let mut descriptor_paths = Vec::with_capacity(chrc_def.descriptors.len());

                for (desc_index, desc_def) in chrc_def.descriptors.into_iter().enumerate() {
                    let desc_path = chrc_path.descriptor(desc_index);
                    app.insert_path(&desc_path, NodeId::Descriptor(app.descriptors.len()))?;
                    app.descriptors
                        .push(Descriptor::new(desc_path.clone(), chrc_path.clone(), desc_def));
                    descriptor_paths.push(desc_path);
                }

                app.insert_path(&chrc_path, NodeId::Characteristic(app.characteristics.len()))?;
                app.characteristics.push(Arc::new(Characteristic::new(
                    chrc_path.clone(),
                    service_path.clone(),
                    chrc_def.uuid,
                    chrc_def.flags,
                    chrc_def.handler,
                    descriptor_paths,
                    events.clone(),
                )));
                characteristic_paths.push(chrc_path);
            }

            app.services.push(Service::new(
                service_path,
                service_def.uuid,
                service_def.primary,
                characteristic_paths,
            ));
        }

        info!(
            "GATT application built: {} services, {} characteristics, {} descriptors",
            app.services.len(),
            app.characteristics.len(),
            app.descriptors.len()
        );
        Ok(app)
    }
}

/// The published attribute tree
#[derive(Debug)]
pub struct Application {
    services: Vec<Service>,
    characteristics: Vec<Arc<Characteristic>>,
    descriptors: Vec<Descriptor>,
    index: HashMap<ObjectPath, NodeId>,
}

impl Application {
    fn insert_path(&mut self, path: &ObjectPath, id: NodeId) -> GattResult<()> {
        if self.index.contains_key(path) {
            return Err(GattError::AlreadyRegistered(path.clone()));
        }
        self.index.insert(path.clone(), id);
        Ok(())
    }

    fn lookup(&self, path: &ObjectPath) -> GattResult<NodeId> {
        self.index
            .get(path)
            .copied()
            .ok_or_else(|| GattError::DoesNotExist(path.clone()))
    }

    pub fn path(&self) -> ObjectPath {
        ObjectPath::new(APPLICATION_PATH)
    }

    /// Services in registration order
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// All characteristics, service by service
    pub fn characteristics(&self) -> &[Arc<Characteristic>] {
        &self.characteristics
    }

    /// All descriptors, characteristic by characteristic
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn service(&self, path: &ObjectPath) -> Option<&Service> {
        match self.index.get(path)? {
            NodeId::Service(i) => self.services.get(*i),
            _ => None,
        }
    }

    pub fn characteristic(&self, path: &ObjectPath) -> Option<&Arc<Characteristic>> {
        match self.index.get(path)? {
            NodeId::Characteristic(i) => self.characteristics.get(*i),
            _ => None,
        }
    }

    pub fn descriptor(&self, path: &ObjectPath) -> Option<&Descriptor> {
        match self.index.get(path)? {
            NodeId::Descriptor(i) => self.descriptors.get(*i),
            _ => None,
        }
    }

    /// Number of published nodes
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every node's path mapped to its interfaces and properties.
    ///
    /// Reflects tree shape only, never attribute values.
    pub fn snapshot(&self) -> ManagedObjects {
        let mut objects = ManagedObjects::new();
        for service in &self.services {
            objects.insert(service.path().clone(), service.properties());
        }
        for chrc in &self.characteristics {
            objects.insert(chrc.path().clone(), chrc.properties());
        }
        for desc in &self.descriptors {
            objects.insert(desc.path().clone(), desc.properties());
        }
        objects
    }

    /// `GetAll(interface)` on the node at `path`
    pub fn get_all(&self, path: &ObjectPath, interface: &str) -> GattResult<PropertyMap> {
        match self.lookup(path)? {
            NodeId::Service(i) => self.services[i].get_all(interface),
            NodeId::Characteristic(i) => self.characteristics[i].get_all(interface),
            NodeId::Descriptor(i) => self.descriptors[i].get_all(interface),
        }
    }

    /// `ReadValue` on the characteristic or descriptor at `path`
    pub fn read_value(&self, path: &ObjectPath, options: &RequestOptions) -> GattResult<Vec<u8>> {
        match self.lookup(path)? {
            NodeId::Service(_) => Err(GattError::NotSupported),
            NodeId::Characteristic(i) => self.characteristics[i].read_value(options),
            NodeId::Descriptor(i) => self.descriptors[i].read_value(options),
        }
    }

    /// `WriteValue` on the characteristic or descriptor at `path`
    pub fn write_value(
        &self,
        path: &ObjectPath,
        value: &[u8],
        options: &RequestOptions,
    ) -> GattResult<()> {
        match self.lookup(path)? {
            NodeId::Service(_) => Err(GattError::NotSupported),
            NodeId::Characteristic(i) => self.characteristics[i].write_value(value, options),
            NodeId::Descriptor(i) => self.descriptors[i].write_value(value, options),
        }
    }

    /// `StartNotify` on the characteristic at `path`
    pub fn start_notify(&self, path: &ObjectPath) -> GattResult<()> {
        match self.lookup(path)? {
            NodeId::Characteristic(i) => self.characteristics[i].start_notify(),
            _ => Err(GattError::NotSupported),
        }
    }

    /// `StopNotify` on the characteristic at `path`
    pub fn stop_notify(&self, path: &ObjectPath) -> GattResult<()> {
        match self.lookup(path)? {
            NodeId::Characteristic(i) => self.characteristics[i].stop_notify(),
            _ => Err(GattError::NotSupported),
        }
    }
}
