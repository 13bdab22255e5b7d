//! Layer registry: ordered ownership of mesh layers

use crate::host::InstanceHost;
use crate::layer::{Layer, LayerConfig, MeshKind};
use flexspline_core::{FlexError, LayerId, Result};
use indexmap::IndexMap;

/// Registry that owns every mesh layer, in insertion order.
///
/// The position of a layer in the registry is its ordinal, which picks its
/// debug indicator color.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: IndexMap<LayerId, Layer>,
    last_assigned: Option<String>,
}

impl LayerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Add a layer that will be named and filled from the template on the
    /// next reconciliation
    pub fn add_uninitialized(&mut self) -> LayerId {
        let layer = Layer::uninitialized();
        let id = layer.id();
        self.layers.insert(id, layer);
        id
    }

    /// Add a named, ready-to-use layer
    pub fn insert(&mut self, name: impl Into<String>, config: LayerConfig) -> Result<LayerId> {
        let name = name.into();
        self.check_name(&name, None)?;
        config.validate()?;
        let layer = Layer::initialized(name, config);
        let id = layer.id();
        self.layers.insert(id, layer);
        Ok(id)
    }

    pub fn rename(&mut self, id: LayerId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.check_name(&name, Some(id))?;
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or_else(|| FlexError::LayerNotFound(id.to_string()))?;
        layer.set_name(name);
        Ok(())
    }

    fn check_name(&self, name: &str, except: Option<LayerId>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(FlexError::InvalidLayerName(name.to_string()));
        }
        let taken = self
            .layers
            .values()
            .any(|l| Some(l.id()) != except && l.name() == name);
        if taken {
            return Err(FlexError::DuplicateLayerName(name.to_string()));
        }
        Ok(())
    }

    /// Remove a layer and destroy every object it owns
    pub fn remove<H: InstanceHost + ?Sized>(&mut self, id: LayerId, host: &mut H) -> Result<()> {
        let mut layer = self
            .layers
            .shift_remove(&id)
            .ok_or_else(|| FlexError::LayerNotFound(id.to_string()))?;
        layer.release_all(host);
        log::debug!("removed layer '{}'", layer.name());
        Ok(())
    }

    /// Remove every layer, destroying owned objects
    pub fn clear<H: InstanceHost + ?Sized>(&mut self, host: &mut H) {
        for layer in self.layers.values_mut() {
            layer.release_all(host);
        }
        self.layers.clear();
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.values().find(|l| l.name() == name)
    }

    pub fn ordinal(&self, id: LayerId) -> Option<usize> {
        self.layers.get_index_of(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.values_mut()
    }

    /// Number of active layers of the given kind
    pub fn count_active(&self, kind: MeshKind) -> usize {
        self.iter()
            .filter(|l| l.config.flags.is_active() && l.kind() == kind)
            .count()
    }

    /// Fill uninitialized layers from the template and give them a name.
    /// Returns how many were initialized.
    pub fn initialize_pending(&mut self, template: &LayerConfig) -> usize {
        let pending: Vec<LayerId> = self
            .layers
            .values()
            .filter(|l| !l.is_initialized())
            .map(|l| l.id())
            .collect();

        for &id in &pending {
            let name = self.next_free_name();
            let Some(layer) = self.layers.get_mut(&id) else {
                continue;
            };
            layer.initialize_from(template);
            match name {
                Some(name) => {
                    log::debug!("initialized layer '{}'", name);
                    layer.set_name(name.clone());
                    self.last_assigned = Some(name);
                }
                None => log::warn!(
                    "no free layer name, keeping '{}' for layer {}",
                    layer.name(),
                    id
                ),
            }
        }
        pending.len()
    }

    /// Smallest `"Layer {n}"` with `n < len` that is unused and differs from
    /// the name handed out last
    fn next_free_name(&self) -> Option<String> {
        (0..self.layers.len())
            .map(|n| format!("Layer {}", n))
            .find(|candidate| {
                self.find_by_name(candidate).is_none()
                    && self.last_assigned.as_deref() != Some(candidate.as_str())
            })
    }
}
