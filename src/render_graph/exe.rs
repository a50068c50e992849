//! The compiled, immutable pipeline
//!
//! Produced only by the compiler: the final ordered pass list (including
//! generated adapters) bound to its own resource cache, independent of the
//! editable graph's bookkeeping.

use glam::UVec2;

use crate::backend::traits::{RenderContext, ResourceHandle};
use crate::backend::types::TextureFormat;
use crate::render_graph::dictionary::Dictionary;
use crate::render_graph::pass::{HotReloadFlags, KeyEvent, MouseEvent, PassRef, PassUi, RenderData};
use crate::render_graph::resource_cache::ResourceCache;

/// Per-call execution environment supplied by the frame loop
pub struct ExecutionContext<'a> {
    pub render_ctx: &'a mut dyn RenderContext,
    /// Shared scratch state, scoped to this call by convention
    pub dictionary: &'a mut Dictionary,
    pub default_dims: UVec2,
    pub default_format: TextureFormat,
}

struct CompiledPass {
    name: String,
    pass: PassRef,
}

/// An ordered, resource-allocated pipeline run once per frame
pub struct Executable {
    execution_list: Vec<CompiledPass>,
    resource_cache: ResourceCache,
}

impl std::fmt::Debug for Executable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executable")
            .field("passes", &self.pass_names().collect::<Vec<_>>())
            .finish()
    }
}

impl Executable {
    pub(crate) fn new(resource_cache: ResourceCache) -> Self {
        Self {
            execution_list: Vec::new(),
            resource_cache,
        }
    }

    pub(crate) fn insert_pass(&mut self, name: &str, pass: PassRef) {
        self.execution_list.push(CompiledPass {
            name: name.to_string(),
            pass,
        });
    }

    /// Run every compiled pass, in resolved order, against a resource view
    /// scoped to its declared fields.
    ///
    /// Every pass runs every call. Disabling is a pass-internal no-op, not
    /// an engine-level skip, so the schedule and the lifetimes it was
    /// validated with stay in agreement.
    pub fn execute(&mut self, ctx: &mut ExecutionContext) {
        for compiled in &self.execution_list {
            log::trace!("Executing pass '{}'", compiled.name);
            let mut data = RenderData::new(
                &compiled.name,
                &self.resource_cache,
                ctx.dictionary,
                ctx.default_dims,
                ctx.default_format,
            );
            compiled.pass.borrow_mut().execute(ctx.render_ctx, &mut data);
        }
    }

    /// Read an internal resource by full name (debugging/display)
    pub fn get_resource(&self, name: &str) -> Option<ResourceHandle> {
        self.resource_cache.get_resource(name)
    }

    /// Bind (`Some`) or unbind (`None`) an external resource post-compile,
    /// e.g. rebinding the swap-chain image each frame, without recompiling.
    pub fn set_input(&mut self, name: &str, resource: Option<ResourceHandle>) {
        self.resource_cache.register_external_resource(name, resource);
    }

    pub fn render_ui(&mut self, ui: &mut dyn PassUi) {
        for compiled in &self.execution_list {
            ui.text(&compiled.name);
            compiled.pass.borrow_mut().render_ui(ui);
        }
    }

    pub fn render_overlay_ui(&mut self, ui: &mut dyn PassUi) {
        for compiled in &self.execution_list {
            compiled.pass.borrow_mut().render_overlay_ui(ui);
        }
    }

    /// Broadcast to every pass; true if any pass handled the event
    pub fn on_mouse_event(&mut self, event: &MouseEvent) -> bool {
        let mut handled = false;
        for compiled in &self.execution_list {
            handled |= compiled.pass.borrow_mut().on_mouse_event(event);
        }
        handled
    }

    /// Broadcast to every pass; true if any pass handled the event
    pub fn on_key_event(&mut self, event: &KeyEvent) -> bool {
        let mut handled = false;
        for compiled in &self.execution_list {
            handled |= compiled.pass.borrow_mut().on_key_event(event);
        }
        handled
    }

    pub fn on_hot_reload(&mut self, flags: HotReloadFlags) {
        for compiled in &self.execution_list {
            compiled.pass.borrow_mut().on_hot_reload(flags);
        }
    }

    /// Names of the compiled passes in execution order
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.execution_list.iter().map(|p| p.name.as_str())
    }

    pub fn pass_count(&self) -> usize {
        self.execution_list.len()
    }

    pub fn resource_cache(&self) -> &ResourceCache {
        &self.resource_cache
    }

    /// Recycle the cache into a subsequent compile so unchanged resources
    /// keep their handles.
    pub fn into_resource_cache(self) -> ResourceCache {
        self.resource_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_graph::pass::{make_pass, MouseEventKind, RenderPass};
    use crate::render_graph::reflection::{CompileData, PassReflection};
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;

    struct NullContext;

    impl RenderContext for NullContext {
        fn resolve_resource(&mut self, _src: ResourceHandle, _dst: ResourceHandle) {}
        fn blit(&mut self, _src: ResourceHandle, _dst: ResourceHandle) {}
    }

    struct CountingPass {
        executions: Rc<Cell<u32>>,
        handles_mouse: bool,
    }

    impl RenderPass for CountingPass {
        fn reflect(&self, _compile_data: &CompileData) -> PassReflection {
            PassReflection::new()
        }

        fn execute(&mut self, _ctx: &mut dyn RenderContext, _data: &mut RenderData) {
            self.executions.set(self.executions.get() + 1);
        }

        fn on_mouse_event(&mut self, _event: &MouseEvent) -> bool {
            self.handles_mouse
        }
    }

    fn exe_with_counters(handles: &[bool]) -> (Executable, Vec<Rc<Cell<u32>>>) {
        let mut exe = Executable::new(ResourceCache::new());
        let mut counters = Vec::new();
        for (i, &handles_mouse) in handles.iter().enumerate() {
            let executions = Rc::new(Cell::new(0));
            counters.push(executions.clone());
            exe.insert_pass(
                &format!("pass{i}"),
                make_pass(CountingPass {
                    executions,
                    handles_mouse,
                }),
            );
        }
        (exe, counters)
    }

    #[test]
    fn every_pass_runs_exactly_once_per_call() {
        let (mut exe, counters) = exe_with_counters(&[false, false, false]);
        let mut dictionary = Dictionary::new();
        let mut ctx = NullContext;
        for _ in 0..3 {
            exe.execute(&mut ExecutionContext {
                render_ctx: &mut ctx,
                dictionary: &mut dictionary,
                default_dims: UVec2::new(16, 16),
                default_format: TextureFormat::Rgba8Unorm,
            });
        }
        for counter in counters {
            assert_eq!(counter.get(), 3);
        }
    }

    #[test]
    fn event_results_or_combine_without_short_circuit() {
        let (mut exe, _) = exe_with_counters(&[false, true, false]);
        let event = MouseEvent {
            pos: Vec2::ZERO,
            kind: MouseEventKind::Move,
        };
        assert!(exe.on_mouse_event(&event));

        let (mut exe, _) = exe_with_counters(&[false, false]);
        assert!(!exe.on_mouse_event(&event));
        assert!(!exe.on_key_event(&KeyEvent {
            key: 13,
            pressed: true
        }));
    }

    #[test]
    fn set_input_rebinds_without_recompiling() {
        let (mut exe, _) = exe_with_counters(&[false]);
        assert_eq!(exe.get_resource("graph.backbuffer"), None);

        let handle = ResourceHandle::new(42);
        exe.set_input("graph.backbuffer", Some(handle));
        assert_eq!(exe.get_resource("graph.backbuffer"), Some(handle));

        exe.set_input("graph.backbuffer", None);
        assert_eq!(exe.get_resource("graph.backbuffer"), None);
    }
}
