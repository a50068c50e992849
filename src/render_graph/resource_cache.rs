//! Resource registry for a compiled graph
//!
//! Fields registered under their full `"pass.field"` name map onto slots in
//! a flat table; aliasing is two names sharing one slot with a merged
//! descriptor. The cache owns every allocated resource and tracks each
//! slot's lifetime as the min/max of the time points it was registered at.

use std::collections::HashMap;

use thiserror::Error;

use crate::backend::traits::{AllocationError, RenderDevice, ResourceHandle};
use crate::backend::types::{
    BindFlags, DefaultProperties, ResourceDescriptor, ResourceKind, TextureFormat,
};
use crate::render_graph::reflection::Field;

/// Registration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceCacheError {
    #[error("Alias target '{0}' is not registered")]
    UnknownAlias(String),
    #[error("Cannot alias '{name}' onto '{target}': {reason}")]
    IncompatibleMerge {
        name: String,
        target: String,
        reason: String,
    },
}

/// One physical resource slot
struct ResourceData {
    /// Merged field properties across every name aliased onto this slot
    field: Field,
    /// First and last time point at which the resource is used
    lifetime: (u32, u32),
    resource: Option<ResourceHandle>,
    /// Descriptor used at the last allocation, for change detection
    allocated_desc: Option<ResourceDescriptor>,
    /// Bind flags were left unset by at least one alias and must be
    /// computed from the merged usage at allocation time
    resolve_bind_flags: bool,
    /// Full name the slot was first registered under
    name: String,
}

/// Registry mapping full field names to descriptors, lifetimes and
/// allocated resources
#[derive(Default)]
pub struct ResourceCache {
    name_to_index: HashMap<String, usize>,
    resource_data: Vec<ResourceData>,
    external_resources: HashMap<String, ResourceHandle>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field that requires an allocated resource.
    ///
    /// `name` is the full `"pass.field"` name. If `alias` names an existing
    /// entry, the field is merged into that entry and `name` maps onto the
    /// same slot. Re-registering an existing name merges in place. The
    /// slot's lifetime extends to cover `time_point`.
    pub fn register_field(
        &mut self,
        name: &str,
        field: &Field,
        time_point: u32,
        alias: Option<&str>,
    ) -> Result<(), ResourceCacheError> {
        let target = match alias {
            Some(alias_name) => Some(
                *self
                    .name_to_index
                    .get(alias_name)
                    .ok_or_else(|| ResourceCacheError::UnknownAlias(alias_name.to_string()))?,
            ),
            None => self.name_to_index.get(name).copied(),
        };

        match target {
            Some(index) => {
                let data = &mut self.resource_data[index];
                let merged = data.field.merge(field).map_err(|reason| {
                    ResourceCacheError::IncompatibleMerge {
                        name: name.to_string(),
                        target: data.name.clone(),
                        reason,
                    }
                })?;
                data.field = merged;
                data.resolve_bind_flags |= field.get_bind_flags().is_empty();
                data.lifetime.0 = data.lifetime.0.min(time_point);
                data.lifetime.1 = data.lifetime.1.max(time_point);
                self.name_to_index.insert(name.to_string(), index);
            }
            None => {
                let index = self.resource_data.len();
                self.resource_data.push(ResourceData {
                    field: field.clone(),
                    lifetime: (time_point, time_point),
                    resource: None,
                    allocated_desc: None,
                    resolve_bind_flags: field.get_bind_flags().is_empty(),
                    name: name.to_string(),
                });
                self.name_to_index.insert(name.to_string(), index);
            }
        }
        Ok(())
    }

    /// Bind (`Some`) or unbind (`None`) a caller-supplied resource such as a
    /// swap-chain image. External resources are exempt from allocation.
    pub fn register_external_resource(&mut self, name: &str, resource: Option<ResourceHandle>) {
        match resource {
            Some(handle) => {
                self.external_resources.insert(name.to_string(), handle);
            }
            None => {
                self.external_resources.remove(name);
            }
        }
    }

    /// Resolve a full name to its bound resource. External resources take
    /// precedence over allocated ones; `None` means unallocated or unknown.
    pub fn get_resource(&self, name: &str) -> Option<ResourceHandle> {
        if let Some(&handle) = self.external_resources.get(name) {
            return Some(handle);
        }
        self.name_to_index
            .get(name)
            .and_then(|&index| self.resource_data[index].resource)
    }

    /// Merged field properties registered under a full name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.name_to_index
            .get(name)
            .map(|&index| &self.resource_data[index].field)
    }

    pub fn lifetime(&self, name: &str) -> Option<(u32, u32)> {
        self.name_to_index
            .get(name)
            .map(|&index| self.resource_data[index].lifetime)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name) || self.external_resources.contains_key(name)
    }

    /// True if two full names resolve to the same slot
    pub fn is_aliased(&self, a: &str, b: &str) -> bool {
        match (self.name_to_index.get(a), self.name_to_index.get(b)) {
            (Some(ia), Some(ib)) => ia == ib,
            _ => false,
        }
    }

    /// (Re)create a device resource for every slot that has none, or whose
    /// resolved descriptor changed since the last allocation. Does nothing
    /// for unchanged slots, so repeated calls are idempotent.
    pub fn allocate_resources(
        &mut self,
        device: &mut dyn RenderDevice,
        defaults: &DefaultProperties,
    ) -> Result<(), AllocationError> {
        for data in &mut self.resource_data {
            let desc = resolve_descriptor(&data.field, data.resolve_bind_flags, defaults, &data.name);
            let up_to_date = data.resource.is_some() && data.allocated_desc.as_ref() == Some(&desc);
            if up_to_date {
                continue;
            }
            if let Some(stale) = data.resource.take() {
                device.destroy_resource(stale);
            }
            let handle = device.create_resource(&desc)?;
            log::debug!(
                "Allocated resource '{}' ({}x{}x{}, {:?}, {} sample(s))",
                data.name,
                desc.width,
                desc.height,
                desc.depth,
                desc.format,
                desc.sample_count
            );
            data.resource = Some(handle);
            data.allocated_desc = Some(desc);
        }
        Ok(())
    }

    /// Drop every entry and destroy every owned resource. External
    /// registrations are forgotten but their resources stay untouched.
    pub fn reset(&mut self, device: &mut dyn RenderDevice) {
        for data in &mut self.resource_data {
            if let Some(handle) = data.resource.take() {
                device.destroy_resource(handle);
            }
        }
        self.resource_data.clear();
        self.name_to_index.clear();
        self.external_resources.clear();
    }

    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.name_to_index.keys().map(|k| k.as_str())
    }
}

/// Fill unset field properties from defaults and compute final bind flags
fn resolve_descriptor(
    field: &Field,
    resolve_bind_flags: bool,
    defaults: &DefaultProperties,
    name: &str,
) -> ResourceDescriptor {
    let format = if field.get_format().is_unknown() {
        defaults.format
    } else {
        field.get_format()
    };

    let bind_flags = if resolve_bind_flags || field.get_bind_flags().is_empty() {
        resolve_bind_flags_for(field, format) | field.get_bind_flags()
    } else {
        field.get_bind_flags()
    };

    ResourceDescriptor {
        label: Some(name.to_string()),
        kind: field.kind(),
        width: if field.width() == 0 {
            defaults.dims.x
        } else {
            field.width()
        },
        height: if field.height() == 0 {
            defaults.dims.y
        } else {
            field.height()
        },
        depth: field.depth().max(1),
        sample_count: field.sample_count().max(1),
        format,
        bind_flags,
    }
}

/// Union of the usages the merged visibility actually requires
fn resolve_bind_flags_for(field: &Field, format: TextureFormat) -> BindFlags {
    let visibility = field.get_visibility();
    let mut flags = BindFlags::NONE;
    if field.kind() == ResourceKind::Buffer {
        flags = flags | BindFlags::UNORDERED_ACCESS | BindFlags::SHADER_RESOURCE;
        return flags;
    }
    if visibility.is_output() || visibility.is_internal() {
        flags = flags
            | if format.is_depth() {
                BindFlags::DEPTH_STENCIL
            } else {
                BindFlags::RENDER_TARGET
            };
    }
    if visibility.is_input() || visibility.is_internal() || visibility.is_output() {
        flags = flags | BindFlags::SHADER_RESOURCE;
    }
    flags
}
