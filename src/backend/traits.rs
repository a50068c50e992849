//! Device and command-recording traits
//!
//! These are the only surfaces through which the graph compiler and the
//! compiled executable touch GPU state. Concrete backends live outside this
//! crate and implement them.

use crate::backend::types::*;
use thiserror::Error;

/// Allocation error type
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Failed to create resource '{name}': {reason}")]
    ResourceCreationFailed { name: String, reason: String },
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type AllocationResult<T> = Result<T, AllocationError>;

/// Handle to a device resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Resource allocation backend.
///
/// Consumed only by [`ResourceCache::allocate_resources`] and
/// [`ResourceCache::reset`]; passes never see the device directly.
///
/// [`ResourceCache::allocate_resources`]: crate::render_graph::ResourceCache::allocate_resources
/// [`ResourceCache::reset`]: crate::render_graph::ResourceCache::reset
pub trait RenderDevice {
    fn create_resource(&mut self, desc: &ResourceDescriptor) -> AllocationResult<ResourceHandle>;

    fn destroy_resource(&mut self, handle: ResourceHandle);
}

/// Per-frame command recorder handed to pass execution.
///
/// Passes record in resolved execution order into one recorder per frame;
/// cross-pass ordering on the GPU timeline is recording order, nothing more.
pub trait RenderContext {
    /// Resolve a multi-sampled resource into a single-sample one
    fn resolve_resource(&mut self, src: ResourceHandle, dst: ResourceHandle);

    /// Copy/convert between two resources of compatible shape
    fn blit(&mut self, src: ResourceHandle, dst: ResourceHandle);
}
