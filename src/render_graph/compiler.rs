//! Graph compilation
//!
//! One `compile()` call turns the editable [`GraphDescription`] into an
//! [`Executable`]: topological ordering with a deterministic tie-break,
//! per-pass reflection, adapter-pass insertion to a fixed point, resource
//! allocation and aggregated validation. Any graph mutation made along the
//! way is recorded and rolled back before returning, on success and failure
//! alike, so the user-authored graph never accumulates generated artifacts.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;

use crate::backend::traits::{AllocationError, RenderDevice, ResourceHandle};
use crate::backend::types::{BindFlags, DefaultProperties};
use crate::render_graph::auto_pass::{check_edge, AdapterKind, EdgeCompatibility};
use crate::render_graph::exe::Executable;
use crate::render_graph::graph::{Edge, FieldRef, GraphDescription, GraphStructureError};
use crate::render_graph::pass::PassRef;
use crate::render_graph::reflection::{CompileData, Field, PassReflection};
use crate::render_graph::resource_cache::ResourceCache;

/// Compilation failure. Structural and validation findings are aggregated
/// into one report per attempt; cycles and allocation failures abort
/// immediately. Every variant leaves the graph in its pre-compile state.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Structure(#[from] GraphStructureError),
    #[error("Cycle detected involving passes: {}", passes.join(", "))]
    Cycle { passes: Vec<String> },
    #[error("Adapter-pass insertion did not reach a fixed point after {iterations} iterations")]
    AutoPassResolution { iterations: u32 },
    #[error("Graph validation failed:\n  {}", problems.join("\n  "))]
    Validation { problems: Vec<String> },
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Everything a compile needs besides the graph and the device
pub struct Dependencies {
    pub default_props: DefaultProperties,
    /// Resources supplied by the caller, bound by full name before
    /// compilation (e.g. the swap-chain image a graph input reads)
    pub external_resources: HashMap<String, ResourceHandle>,
    /// Cache recycled from a discarded [`Executable`]; unchanged resources
    /// keep their handles across recompiles. `None` starts fresh.
    pub resource_cache: Option<ResourceCache>,
}

impl Default for Dependencies {
    fn default() -> Self {
        Self {
            default_props: DefaultProperties::default(),
            external_resources: HashMap::new(),
            resource_cache: None,
        }
    }
}

/// One pass in the resolved execution order
struct PassData {
    time_point: u32,
    name: String,
    pass: PassRef,
    reflection: PassReflection,
}

/// Reversible record of one graph mutation made during compilation
enum CompilationChange {
    AddedPass { name: String },
    AddedEdge { src: FieldRef, dst: FieldRef },
    RemovedEdge { src: FieldRef, dst: FieldRef },
}

/// Transient state for a single compile() invocation
pub struct Compiler<'a> {
    graph: &'a mut GraphDescription,
    execution_list: Vec<PassData>,
    changes: Vec<CompilationChange>,
    problems: Vec<String>,
}

impl<'a> Compiler<'a> {
    /// Compile `graph` into an executable pipeline. All-or-nothing: on any
    /// failure no executable is produced and the graph is left exactly as
    /// it was.
    pub fn compile(
        graph: &'a mut GraphDescription,
        device: &mut dyn RenderDevice,
        dependencies: Dependencies,
    ) -> Result<Executable, CompileError> {
        let mut compiler = Compiler {
            graph,
            execution_list: Vec::new(),
            changes: Vec::new(),
            problems: Vec::new(),
        };
        let result = compiler.run(device, dependencies);
        compiler.restore_compilation_changes();
        result
    }

    fn run(
        &mut self,
        device: &mut dyn RenderDevice,
        dependencies: Dependencies,
    ) -> Result<Executable, CompileError> {
        let mut cache = dependencies.resource_cache.unwrap_or_default();
        for (name, handle) in &dependencies.external_resources {
            cache.register_external_resource(name, Some(*handle));
        }

        if let Err(err) = self.run_phases(device, &mut cache, &dependencies.default_props) {
            // a failed compile yields no executable, so nothing can own the
            // cache afterwards; destroy every handle it holds, recycled
            // ones included, rather than dropping them unreachable
            cache.reset(device);
            return Err(err);
        }

        let mut exe = Executable::new(cache);
        for pass_data in &self.execution_list {
            exe.insert_pass(&pass_data.name, pass_data.pass.clone());
        }
        log::info!("Compiled graph: {} passes", self.execution_list.len());
        Ok(exe)
    }

    fn run_phases(
        &mut self,
        device: &mut dyn RenderDevice,
        cache: &mut ResourceCache,
        defaults: &DefaultProperties,
    ) -> Result<(), CompileError> {
        // every round inserts at least one adapter pass, so a healthy
        // catalogue converges in far fewer rounds than the graph has passes
        let max_iterations = self.graph.passes().len() as u32;
        let mut iterations = 0u32;
        loop {
            self.resolve_execution_order()?;
            self.compile_passes(defaults);
            if !self.insert_auto_passes()? {
                break;
            }
            iterations += 1;
            if iterations > max_iterations {
                return Err(CompileError::AutoPassResolution { iterations });
            }
            log::debug!("Adapter passes inserted (round {iterations}); re-resolving order");
        }

        self.allocate_resources(device, cache, defaults)?;
        self.validate_graph(cache)
    }

    /// Kahn's algorithm over the pass/edge structure. The ready set is a
    /// min-heap on declaration index, so ordering is deterministic for an
    /// unchanged graph; the resulting position is the pass's time point and
    /// drives lifetime accounting and aliasing.
    fn resolve_execution_order(&mut self) -> Result<(), CompileError> {
        self.execution_list.clear();
        let count = self.graph.passes().len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];
        for edge in self.graph.edges() {
            let (Some(src), Some(dst)) = (
                self.graph.pass_index(&edge.src.pass),
                self.graph.pass_index(&edge.dst.pass),
            ) else {
                continue;
            };
            adjacency[src].push(dst);
            in_degree[dst] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
            .filter(|&i| in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(count);
        while let Some(Reverse(index)) = ready.pop() {
            order.push(index);
            for &next in &adjacency[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != count {
            return Err(CompileError::Cycle {
                passes: self.cycle_members(&adjacency, &in_degree),
            });
        }

        self.execution_list = order
            .into_iter()
            .enumerate()
            .map(|(time_point, index)| {
                let node = &self.graph.passes()[index];
                PassData {
                    time_point: time_point as u32,
                    name: node.name().to_string(),
                    pass: node.pass().clone(),
                    reflection: PassReflection::new(),
                }
            })
            .collect();
        Ok(())
    }

    /// Passes left unscheduled by the topological sort include acyclic
    /// passes that merely sit downstream of a cycle. Peel those off by
    /// repeatedly removing residual passes with no residual successors;
    /// what remains is the cyclic core.
    fn cycle_members(&self, adjacency: &[Vec<usize>], in_degree: &[usize]) -> Vec<String> {
        let count = in_degree.len();
        let mut residual: Vec<bool> = in_degree.iter().map(|&degree| degree > 0).collect();
        let mut out_degree = vec![0usize; count];
        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); count];
        for i in 0..count {
            if !residual[i] {
                continue;
            }
            for &next in &adjacency[i] {
                if residual[next] {
                    out_degree[i] += 1;
                    reverse[next].push(i);
                }
            }
        }

        let mut peel: Vec<usize> = (0..count)
            .filter(|&i| residual[i] && out_degree[i] == 0)
            .collect();
        while let Some(index) = peel.pop() {
            residual[index] = false;
            for &prev in &reverse[index] {
                out_degree[prev] -= 1;
                if residual[prev] && out_degree[prev] == 0 {
                    peel.push(prev);
                }
            }
        }

        (0..count)
            .filter(|&i| residual[i])
            .map(|i| self.graph.passes()[i].name().to_string())
            .collect()
    }

    /// Reflect every pass in execution order, feeding each one the producer
    /// fields already reflected for its bound inputs.
    fn compile_passes(&mut self, defaults: &DefaultProperties) {
        for index in 0..self.execution_list.len() {
            let compile_data = self.prep_pass_compilation_data(index, defaults);
            let pass = self.execution_list[index].pass.clone();
            let reflection = pass.borrow().reflect(&compile_data);
            self.execution_list[index].reflection = reflection;
        }
    }

    fn prep_pass_compilation_data(&self, index: usize, defaults: &DefaultProperties) -> CompileData {
        let mut compile_data = CompileData::new(defaults);
        let pass_name = &self.execution_list[index].name;
        for edge in self.graph.edges() {
            if edge.dst.pass != *pass_name {
                continue;
            }
            // producers sit earlier in the execution list and are reflected
            let Some(producer) = self.execution_list[..index]
                .iter()
                .find(|p| p.name == edge.src.pass)
            else {
                continue;
            };
            if let Some(field) = producer.reflection.field(&edge.src.field) {
                compile_data
                    .connected_resources
                    .push_field(field.renamed(&edge.dst.field));
            }
        }
        compile_data
    }

    /// Splice a catalogue pass into every edge with a reconcilable
    /// producer/consumer mismatch. Returns whether anything was inserted.
    fn insert_auto_passes(&mut self) -> Result<bool, CompileError> {
        struct Pending {
            edge: Edge,
            kind: AdapterKind,
            producer_field: Field,
        }

        let mut pending = Vec::new();
        for edge in self.graph.edges() {
            let (Some(producer), Some(consumer)) = (
                self.reflected_field(&edge.src),
                self.reflected_field(&edge.dst),
            ) else {
                continue;
            };
            // Compatible needs nothing; Fatal is validation's to report
            if let EdgeCompatibility::Resolvable(kind) = check_edge(producer, consumer) {
                pending.push(Pending {
                    edge: edge.clone(),
                    kind,
                    producer_field: producer.clone(),
                });
            }
        }

        let inserted = !pending.is_empty();
        for Pending {
            edge,
            kind,
            producer_field,
        } in pending
        {
            let adapter = kind.instantiate(&producer_field);
            let name = self.unique_pass_name(&edge);

            self.graph
                .add_pass_shared(&name, adapter.type_name, adapter.pass)?;
            self.changes
                .push(CompilationChange::AddedPass { name: name.clone() });

            self.graph.remove_edge_refs(&edge.src, &edge.dst)?;
            self.changes.push(CompilationChange::RemovedEdge {
                src: edge.src.clone(),
                dst: edge.dst.clone(),
            });

            let adapter_in = FieldRef::new(&name, adapter.input);
            self.graph
                .add_edge_refs(edge.src.clone(), adapter_in.clone())?;
            self.changes.push(CompilationChange::AddedEdge {
                src: edge.src.clone(),
                dst: adapter_in,
            });

            let adapter_out = FieldRef::new(&name, adapter.output);
            self.graph
                .add_edge_refs(adapter_out.clone(), edge.dst.clone())?;
            self.changes.push(CompilationChange::AddedEdge {
                src: adapter_out,
                dst: edge.dst.clone(),
            });

            log::info!(
                "Inserted adapter pass '{name}' between {} and {}",
                edge.src,
                edge.dst
            );
        }
        Ok(inserted)
    }

    /// Register every field with its time point, then let the cache
    /// (re)create whatever is missing or stale. Inputs bound by an edge
    /// alias onto their producer's slot; merge conflicts are collected for
    /// the validation report.
    fn allocate_resources(
        &mut self,
        device: &mut dyn RenderDevice,
        cache: &mut ResourceCache,
        defaults: &DefaultProperties,
    ) -> Result<(), CompileError> {
        for index in 0..self.execution_list.len() {
            let time_point = self.execution_list[index].time_point;
            let pass_name = self.execution_list[index].name.clone();
            let reflection = self.execution_list[index].reflection.clone();

            for field in reflection.fields() {
                let field_ref = FieldRef::new(&pass_name, field.name());
                let full_name = field_ref.full_name();
                let visibility = field.get_visibility();

                if visibility.is_input() {
                    if let Some(edge) = self.graph.incoming_edge(&field_ref) {
                        let alias = edge.src.full_name();
                        if let Err(err) =
                            cache.register_field(&full_name, field, time_point, Some(&alias))
                        {
                            self.problems.push(err.to_string());
                        }
                    }
                    // unbound inputs stay unregistered: either an external
                    // resource covers the name or validation flags it
                }

                if visibility.is_output() || visibility.is_internal() {
                    if let Err(err) = cache.register_field(&full_name, field, time_point, None) {
                        self.problems.push(err.to_string());
                    }
                    if self.graph.is_output_marked(&field_ref) {
                        // marked outputs stay alive to the end of the frame
                        // and must be readable for display
                        let mut marked = field.clone();
                        marked.bind_flags(field.get_bind_flags() | BindFlags::SHADER_RESOURCE);
                        if let Err(err) =
                            cache.register_field(&full_name, &marked, u32::MAX, None)
                        {
                            self.problems.push(err.to_string());
                        }
                    }
                }
            }
        }

        cache.allocate_resources(device, defaults)?;
        Ok(())
    }

    /// Collect every violation into one aggregated report instead of
    /// failing on the first.
    fn validate_graph(&mut self, cache: &ResourceCache) -> Result<(), CompileError> {
        let mut problems = std::mem::take(&mut self.problems);

        for pass_data in &self.execution_list {
            for field in pass_data.reflection.fields() {
                if !field.get_visibility().is_input() || field.is_optional() {
                    continue;
                }
                let field_ref = FieldRef::new(&pass_data.name, field.name());
                let bound = self.graph.incoming_edge(&field_ref).is_some()
                    || cache.get_resource(&field_ref.full_name()).is_some();
                if !bound {
                    problems.push(format!(
                        "Required input '{field_ref}' has no producer and no externally bound resource"
                    ));
                }
            }
        }

        for edge in self.graph.edges() {
            match (
                self.reflected_field(&edge.src),
                self.reflected_field(&edge.dst),
            ) {
                (Some(producer), Some(consumer)) => {
                    if let EdgeCompatibility::Fatal(reason) = check_edge(producer, consumer) {
                        problems.push(format!("Edge {} -> {}: {reason}", edge.src, edge.dst));
                    }
                }
                (None, _) => problems.push(format!(
                    "Edge {} -> {}: source field is not declared by its pass",
                    edge.src, edge.dst
                )),
                (_, None) => problems.push(format!(
                    "Edge {} -> {}: destination field is not declared by its pass",
                    edge.src, edge.dst
                )),
            }
        }

        // the graph rejects duplicate producers at edit time; re-check in
        // case edges were spliced in behind its back
        let mut producers: HashMap<&FieldRef, &FieldRef> = HashMap::new();
        for edge in self.graph.edges() {
            if let Some(first) = producers.insert(&edge.dst, &edge.src) {
                problems.push(format!(
                    "Destination '{}' has multiple producers ('{first}' and '{}')",
                    edge.dst, edge.src
                ));
            }
        }

        for output in self.graph.outputs() {
            match self.reflected_field(&output.field) {
                Some(field) if field.get_visibility().is_output() => {}
                Some(_) => problems.push(format!(
                    "Marked output '{}' is not an output field",
                    output.field
                )),
                None => problems.push(format!(
                    "Marked output '{}' does not reference an existing pass output",
                    output.field
                )),
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CompileError::Validation { problems })
        }
    }

    /// Undo every recorded mutation in reverse order, returning the graph
    /// to its exact pre-compile pass/edge set.
    fn restore_compilation_changes(&mut self) {
        while let Some(change) = self.changes.pop() {
            let result = match change {
                CompilationChange::AddedPass { name } => self.graph.remove_pass(&name),
                CompilationChange::AddedEdge { src, dst } => {
                    self.graph.remove_edge_refs(&src, &dst)
                }
                CompilationChange::RemovedEdge { src, dst } => self.graph.add_edge_refs(src, dst),
            };
            if let Err(err) = result {
                log::error!("Failed to restore a compilation change: {err}");
            }
        }
    }

    fn reflected_field(&self, field_ref: &FieldRef) -> Option<&Field> {
        self.execution_list
            .iter()
            .find(|p| p.name == field_ref.pass)?
            .reflection
            .field(&field_ref.field)
    }

    fn unique_pass_name(&self, edge: &Edge) -> String {
        let base = format!("{}-{}-resolved", edge.src.pass, edge.src.field);
        if self.graph.pass(&base).is_none() {
            return base;
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if self.graph.pass(&candidate).is_none() {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::traits::{AllocationResult, RenderContext};
    use crate::backend::types::{ResourceDescriptor, TextureFormat};
    use crate::render_graph::pass::{RenderData, RenderPass};
    use crate::render_graph::reflection::CompileData;

    #[derive(Default)]
    struct TestDevice {
        next: u64,
        created: Vec<ResourceDescriptor>,
    }

    impl RenderDevice for TestDevice {
        fn create_resource(
            &mut self,
            desc: &ResourceDescriptor,
        ) -> AllocationResult<ResourceHandle> {
            self.next += 1;
            self.created.push(desc.clone());
            Ok(ResourceHandle::new(self.next))
        }

        fn destroy_resource(&mut self, _handle: ResourceHandle) {}
    }

    struct NodePass {
        inputs: Vec<String>,
        outputs: Vec<String>,
        optional_inputs: bool,
    }

    impl NodePass {
        fn source(outputs: &[&str]) -> Self {
            Self {
                inputs: Vec::new(),
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                optional_inputs: false,
            }
        }

        fn node(inputs: &[&str], outputs: &[&str]) -> Self {
            Self {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                optional_inputs: false,
            }
        }
    }

    impl RenderPass for NodePass {
        fn reflect(&self, _compile_data: &CompileData) -> PassReflection {
            let mut reflection = PassReflection::new();
            for name in &self.inputs {
                let field = reflection.add_input(name, "");
                field.texture2d(0, 0, 1).format(TextureFormat::Rgba8Unorm);
                if self.optional_inputs {
                    field.optional();
                }
            }
            for name in &self.outputs {
                reflection
                    .add_output(name, "")
                    .texture2d(0, 0, 1)
                    .format(TextureFormat::Rgba8Unorm);
            }
            reflection
        }

        fn execute(&mut self, _ctx: &mut dyn RenderContext, _data: &mut RenderData) {}
    }

    fn compile_names(graph: &mut GraphDescription) -> Vec<String> {
        let exe = Compiler::compile(graph, &mut TestDevice::default(), Dependencies::default())
            .expect("compile failed");
        exe.pass_names().map(|s| s.to_string()).collect()
    }

    #[test]
    fn independent_passes_order_by_declaration() {
        let mut graph = GraphDescription::new();
        graph.add_pass("C", "Node", NodePass::source(&["out"])).unwrap();
        graph.add_pass("A", "Node", NodePass::source(&["out"])).unwrap();
        graph.add_pass("B", "Node", NodePass::source(&["out"])).unwrap();
        assert_eq!(compile_names(&mut graph), ["C", "A", "B"]);
        // unchanged graph, identical order
        assert_eq!(compile_names(&mut graph), ["C", "A", "B"]);
    }

    #[test]
    fn edges_override_declaration_order() {
        let mut graph = GraphDescription::new();
        graph
            .add_pass("sink", "Node", NodePass::node(&["in"], &[]))
            .unwrap();
        graph.add_pass("src", "Node", NodePass::source(&["out"])).unwrap();
        graph.add_edge("src.out", "sink.in").unwrap();
        assert_eq!(compile_names(&mut graph), ["src", "sink"]);
    }

    #[test]
    fn cycle_fails_and_names_the_passes_involved() {
        let mut graph = GraphDescription::new();
        graph
            .add_pass("C", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();
        graph
            .add_pass("D", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();
        graph.add_edge("C.out", "D.in").unwrap();
        graph.add_edge("D.out", "C.in").unwrap();
        let before = graph.structure();

        let err = Compiler::compile(&mut graph, &mut TestDevice::default(), Dependencies::default())
            .unwrap_err();
        match err {
            CompileError::Cycle { passes } => {
                assert_eq!(passes, vec!["C".to_string(), "D".to_string()]);
            }
            other => panic!("expected CycleError, got {other}"),
        }
        assert_eq!(graph.structure(), before);
    }

    #[test]
    fn cycle_report_excludes_downstream_passes() {
        let mut graph = GraphDescription::new();
        graph
            .add_pass("C", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();
        graph
            .add_pass("D", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();
        graph
            .add_pass("E", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();
        graph.add_edge("C.out", "D.in").unwrap();
        graph.add_edge("D.out", "C.in").unwrap();
        // E only consumes from the cycle, it is not part of it
        graph.add_edge("D.out", "E.in").unwrap();

        let err = Compiler::compile(&mut graph, &mut TestDevice::default(), Dependencies::default())
            .unwrap_err();
        match err {
            CompileError::Cycle { passes } => {
                assert_eq!(passes, vec!["C".to_string(), "D".to_string()]);
            }
            other => panic!("expected CycleError, got {other}"),
        }
    }

    struct MarkedOutputPass;

    impl RenderPass for MarkedOutputPass {
        fn reflect(&self, _compile_data: &CompileData) -> PassReflection {
            let mut reflection = PassReflection::new();
            reflection
                .add_output("color", "")
                .texture2d(0, 0, 1)
                .format(TextureFormat::Rgba8Unorm)
                .bind_flags(BindFlags::RENDER_TARGET);
            reflection
        }

        fn execute(&mut self, _ctx: &mut dyn RenderContext, _data: &mut RenderData) {}
    }

    #[test]
    fn marked_outputs_live_to_frame_end_and_become_readable() {
        let mut graph = GraphDescription::new();
        graph.add_pass("A", "Marked", MarkedOutputPass).unwrap();
        graph.mark_output("A.color").unwrap();

        let mut device = TestDevice::default();
        let exe = Compiler::compile(&mut graph, &mut device, Dependencies::default()).unwrap();
        assert_eq!(
            exe.resource_cache().lifetime("A.color"),
            Some((0, u32::MAX))
        );
        // RENDER_TARGET came from the pass; marking forces in readability
        let flags = device.created[0].bind_flags;
        assert!(flags.contains(BindFlags::RENDER_TARGET | BindFlags::SHADER_RESOURCE));
    }

    #[test]
    fn validation_aggregates_every_problem() {
        let mut graph = GraphDescription::new();
        graph
            .add_pass("A", "Node", NodePass::node(&["in_a"], &["out"]))
            .unwrap();
        graph
            .add_pass("B", "Node", NodePass::node(&["in_b"], &[]))
            .unwrap();
        graph.mark_output("A.nosuch").unwrap();

        let err = Compiler::compile(&mut graph, &mut TestDevice::default(), Dependencies::default())
            .unwrap_err();
        match err {
            CompileError::Validation { problems } => {
                assert_eq!(problems.len(), 3);
                assert!(problems.iter().any(|p| p.contains("A.in_a")));
                assert!(problems.iter().any(|p| p.contains("B.in_b")));
                assert!(problems.iter().any(|p| p.contains("A.nosuch")));
            }
            other => panic!("expected ValidationError, got {other}"),
        }
    }

    #[test]
    fn external_resource_satisfies_a_required_input() {
        let mut graph = GraphDescription::new();
        graph
            .add_pass("blit", "Node", NodePass::node(&["in"], &["out"]))
            .unwrap();

        let mut dependencies = Dependencies::default();
        dependencies
            .external_resources
            .insert("blit.in".to_string(), ResourceHandle::new(7));
        let exe = Compiler::compile(&mut graph, &mut TestDevice::default(), dependencies).unwrap();
        assert_eq!(exe.get_resource("blit.in"), Some(ResourceHandle::new(7)));
    }

    #[test]
    fn optional_inputs_do_not_fail_validation() {
        let mut graph = GraphDescription::new();
        let mut pass = NodePass::node(&["in"], &["out"]);
        pass.optional_inputs = true;
        graph.add_pass("A", "Node", pass).unwrap();
        assert_eq!(compile_names(&mut graph), ["A"]);
    }

    #[test]
    fn connected_inputs_alias_their_producer() {
        let mut graph = GraphDescription::new();
        graph.add_pass("A", "Node", NodePass::source(&["color"])).unwrap();
        graph
            .add_pass("B", "Node", NodePass::node(&["input"], &[]))
            .unwrap();
        graph.add_edge("A.color", "B.input").unwrap();

        let exe = Compiler::compile(&mut graph, &mut TestDevice::default(), Dependencies::default())
            .unwrap();
        let a = exe.get_resource("A.color").unwrap();
        assert_eq!(exe.get_resource("B.input"), Some(a));
        assert_eq!(exe.resource_cache().lifetime("A.color"), Some((0, 1)));
    }
}
