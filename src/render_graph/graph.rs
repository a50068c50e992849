//! The editable graph description
//!
//! Pure data: passes in declaration order, producer/consumer edges and
//! marked graph outputs. All scheduling, adapter insertion and validation
//! live in the compiler; this type only enforces local structural rules
//! (unique pass names, known fields, one producer per destination field).

use std::fmt;

use thiserror::Error;

use crate::backend::types::TextureChannelFlags;
use crate::render_graph::pass::{make_pass, PassRef, RenderPass};
use crate::render_graph::reflection::CompileData;

/// Structural editing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphStructureError {
    #[error("Pass '{0}' already exists in the graph")]
    DuplicatePass(String),
    #[error("Pass '{0}' does not exist in the graph")]
    UnknownPass(String),
    #[error("Pass '{pass}' does not declare a field named '{field}'")]
    UnknownField { pass: String, field: String },
    #[error("'{0}' is not a valid 'pass.field' reference")]
    MalformedFieldRef(String),
    #[error("Edge source '{0}' is not an output field")]
    SourceNotAnOutput(FieldRef),
    #[error("Edge destination '{0}' is not an input field")]
    DestinationNotAnInput(FieldRef),
    #[error("Destination '{dst}' already has a producer ('{existing}')")]
    DuplicateProducer { dst: FieldRef, existing: FieldRef },
    #[error("Edge {0} -> {1} does not exist")]
    UnknownEdge(FieldRef, FieldRef),
    #[error("Output '{0}' is not marked")]
    UnknownOutput(String),
}

/// A `pass.field` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub pass: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(pass: &str, field: &str) -> Self {
        Self {
            pass: pass.to_string(),
            field: field.to_string(),
        }
    }

    pub fn parse(name: &str) -> Result<Self, GraphStructureError> {
        match name.split_once('.') {
            Some((pass, field)) if !pass.is_empty() && !field.is_empty() => {
                Ok(Self::new(pass, field))
            }
            _ => Err(GraphStructureError::MalformedFieldRef(name.to_string())),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.pass, self.field)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pass, self.field)
    }
}

/// A producer-field to consumer-field connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: FieldRef,
    pub dst: FieldRef,
}

/// A graph-level output kept alive even when nothing downstream consumes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOutput {
    pub field: FieldRef,
    pub mask: TextureChannelFlags,
}

/// One pass node: unique name, type identifier and the pass object
pub struct PassNode {
    name: String,
    type_name: String,
    pass: PassRef,
}

impl PassNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn pass(&self) -> &PassRef {
        &self.pass
    }
}

/// Snapshot of the user-visible structure, for comparing a graph before and
/// after a compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStructure {
    pub passes: Vec<String>,
    pub edges: Vec<Edge>,
}

/// The main editable graph structure
#[derive(Default)]
pub struct GraphDescription {
    passes: Vec<PassNode>,
    edges: Vec<Edge>,
    outputs: Vec<GraphOutput>,
}

impl GraphDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to the graph
    pub fn add_pass<P: RenderPass + 'static>(
        &mut self,
        name: &str,
        type_name: &str,
        pass: P,
    ) -> Result<(), GraphStructureError> {
        self.add_pass_shared(name, type_name, make_pass(pass))
    }

    /// Add an already shared pass object (used for generated adapter passes
    /// and for callers that keep their own handle to the pass)
    pub fn add_pass_shared(
        &mut self,
        name: &str,
        type_name: &str,
        pass: PassRef,
    ) -> Result<(), GraphStructureError> {
        if self.pass(name).is_some() {
            return Err(GraphStructureError::DuplicatePass(name.to_string()));
        }
        self.passes.push(PassNode {
            name: name.to_string(),
            type_name: type_name.to_string(),
            pass,
        });
        Ok(())
    }

    /// Remove a pass along with every edge and marked output touching it
    pub fn remove_pass(&mut self, name: &str) -> Result<(), GraphStructureError> {
        let index = self
            .passes
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| GraphStructureError::UnknownPass(name.to_string()))?;
        self.passes.remove(index);
        self.edges
            .retain(|e| e.src.pass != name && e.dst.pass != name);
        self.outputs.retain(|o| o.field.pass != name);
        Ok(())
    }

    /// Connect `"srcPass.field"` to `"dstPass.field"`.
    ///
    /// Fails if either pass or field is unknown, the source is not an
    /// output, the destination is not an input, or the destination already
    /// has a producer.
    pub fn add_edge(&mut self, src: &str, dst: &str) -> Result<(), GraphStructureError> {
        let src = FieldRef::parse(src)?;
        let dst = FieldRef::parse(dst)?;
        self.add_edge_refs(src, dst)
    }

    pub(crate) fn add_edge_refs(
        &mut self,
        src: FieldRef,
        dst: FieldRef,
    ) -> Result<(), GraphStructureError> {
        let src_field = self.lookup_field(&src)?;
        if !src_field.get_visibility().is_output() {
            return Err(GraphStructureError::SourceNotAnOutput(src));
        }
        let dst_field = self.lookup_field(&dst)?;
        if !dst_field.get_visibility().is_input() {
            return Err(GraphStructureError::DestinationNotAnInput(dst));
        }
        if let Some(existing) = self.incoming_edge(&dst) {
            return Err(GraphStructureError::DuplicateProducer {
                dst,
                existing: existing.src.clone(),
            });
        }
        self.edges.push(Edge { src, dst });
        Ok(())
    }

    pub fn remove_edge(&mut self, src: &str, dst: &str) -> Result<(), GraphStructureError> {
        let src = FieldRef::parse(src)?;
        let dst = FieldRef::parse(dst)?;
        self.remove_edge_refs(&src, &dst)
    }

    pub(crate) fn remove_edge_refs(
        &mut self,
        src: &FieldRef,
        dst: &FieldRef,
    ) -> Result<(), GraphStructureError> {
        let index = self
            .edges
            .iter()
            .position(|e| &e.src == src && &e.dst == dst)
            .ok_or_else(|| GraphStructureError::UnknownEdge(src.clone(), dst.clone()))?;
        self.edges.remove(index);
        Ok(())
    }

    /// Mark `"pass.field"` as a graph output with the full channel mask
    pub fn mark_output(&mut self, name: &str) -> Result<(), GraphStructureError> {
        self.mark_output_with_mask(name, TextureChannelFlags::ALL)
    }

    /// Mark a graph output with an explicit channel mask. Marking the same
    /// field again widens the mask.
    pub fn mark_output_with_mask(
        &mut self,
        name: &str,
        mask: TextureChannelFlags,
    ) -> Result<(), GraphStructureError> {
        let field = FieldRef::parse(name)?;
        if let Some(existing) = self.outputs.iter_mut().find(|o| o.field == field) {
            existing.mask = existing.mask | mask;
            return Ok(());
        }
        self.outputs.push(GraphOutput { field, mask });
        Ok(())
    }

    pub fn unmark_output(&mut self, name: &str) -> Result<(), GraphStructureError> {
        let field = FieldRef::parse(name)?;
        let index = self
            .outputs
            .iter()
            .position(|o| o.field == field)
            .ok_or_else(|| GraphStructureError::UnknownOutput(name.to_string()))?;
        self.outputs.remove(index);
        Ok(())
    }

    pub fn pass(&self, name: &str) -> Option<&PassNode> {
        self.passes.iter().find(|p| p.name == name)
    }

    /// Declaration index of a pass; drives the compiler's deterministic
    /// tie-break.
    pub fn pass_index(&self, name: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.name == name)
    }

    pub fn passes(&self) -> &[PassNode] {
        &self.passes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outputs(&self) -> &[GraphOutput] {
        &self.outputs
    }

    /// The edge producing into `dst`, if any. A destination field has at
    /// most one producer.
    pub fn incoming_edge(&self, dst: &FieldRef) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.dst == dst)
    }

    pub fn outgoing_edges<'a>(&'a self, src: &'a FieldRef) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| &e.src == src)
    }

    pub fn is_output_marked(&self, field: &FieldRef) -> bool {
        self.outputs.iter().any(|o| &o.field == field)
    }

    /// Snapshot of passes and edges for structural comparison
    pub fn structure(&self) -> GraphStructure {
        GraphStructure {
            passes: self.passes.iter().map(|p| p.name.clone()).collect(),
            edges: self.edges.clone(),
        }
    }

    fn lookup_field(
        &self,
        field_ref: &FieldRef,
    ) -> Result<crate::render_graph::reflection::Field, GraphStructureError> {
        let node = self
            .pass(&field_ref.pass)
            .ok_or_else(|| GraphStructureError::UnknownPass(field_ref.pass.clone()))?;
        // Field existence is checked against a reflection with default
        // compile data; passes whose field set depends on upstream data must
        // still declare every field name up front.
        let reflection = node.pass.borrow().reflect(&CompileData::default());
        reflection
            .field(&field_ref.field)
            .cloned()
            .ok_or_else(|| GraphStructureError::UnknownField {
                pass: field_ref.pass.clone(),
                field: field_ref.field.clone(),
            })
    }
}
