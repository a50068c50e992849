//! # Render Graph
//!
//! A compiled render graph: passes declare their resources through typed
//! reflection, the compiler schedules them, allocates and aliases physical
//! resources by lifetime, and splices in adapter passes where producer and
//! consumer disagree in a reconcilable way.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphDescription`] - Editable description of passes, edges and outputs
//! - [`Compiler`] - Turns a graph into an [`Executable`], all-or-nothing
//! - [`Executable`] - Immutable ordered pipeline, run once per frame
//! - [`RenderDevice`] / [`RenderContext`] - Traits a backend implements
//!
//! ## Example
//!
//! ```ignore
//! use render_graph::{Compiler, Dependencies, GraphDescription};
//!
//! let mut graph = GraphDescription::new();
//! graph.add_pass("gbuffer", "GBufferPass", GBufferPass::new())?;
//! graph.add_pass("lighting", "LightingPass", LightingPass::new())?;
//! graph.add_edge("gbuffer.albedo", "lighting.albedo")?;
//! graph.mark_output("lighting.color")?;
//!
//! let exe = Compiler::compile(&mut graph, &mut device, Dependencies::default())?;
//! ```

pub mod backend;
pub mod render_graph;

// Re-export main types for convenience
pub use backend::traits::{
    AllocationError, AllocationResult, RenderContext, RenderDevice, ResourceHandle,
};
pub use backend::types::{
    BindFlags, DefaultProperties, FormatClass, ResourceDescriptor, ResourceKind,
    TextureChannelFlags, TextureFormat,
};
pub use render_graph::{
    CompileData, CompileError, Compiler, Dependencies, Dictionary, Executable, ExecutionContext,
    Field, FieldRef, FieldVisibility, GraphDescription, GraphStructure, GraphStructureError,
    PassReflection, RenderData, RenderPass, ResolvePass, ResourceCache,
};
