//! Shared fixtures for the integration tests: a recording device, a
//! recording command context and a configurable counting pass.

use std::cell::Cell;
use std::rc::Rc;

use render_graph::{
    AllocationResult, CompileData, PassReflection, RenderContext, RenderData, RenderDevice,
    RenderPass, ResourceDescriptor, ResourceHandle, TextureFormat,
};

/// Hands out sequential handles and records every create/destroy
#[derive(Default)]
pub struct TestDevice {
    next: u64,
    pub created: Vec<ResourceDescriptor>,
    pub destroyed: Vec<ResourceHandle>,
}

impl RenderDevice for TestDevice {
    fn create_resource(&mut self, desc: &ResourceDescriptor) -> AllocationResult<ResourceHandle> {
        self.next += 1;
        self.created.push(desc.clone());
        Ok(ResourceHandle::new(self.next))
    }

    fn destroy_resource(&mut self, handle: ResourceHandle) {
        self.destroyed.push(handle);
    }
}

/// Records every resolve and blit issued during execution
#[derive(Default)]
pub struct TestContext {
    pub resolves: Vec<(ResourceHandle, ResourceHandle)>,
    pub blits: Vec<(ResourceHandle, ResourceHandle)>,
}

impl RenderContext for TestContext {
    fn resolve_resource(&mut self, src: ResourceHandle, dst: ResourceHandle) {
        self.resolves.push((src, dst));
    }

    fn blit(&mut self, src: ResourceHandle, dst: ResourceHandle) {
        self.blits.push((src, dst));
    }
}

/// One declared field: name, sample count (0 accepts any) and format
pub type FieldSpec = (&'static str, u32, TextureFormat);

/// Pass with a fixed reflection that counts its executions
pub struct CountingPass {
    inputs: Vec<FieldSpec>,
    outputs: Vec<FieldSpec>,
    pub executions: Rc<Cell<u32>>,
}

impl CountingPass {
    pub fn new(inputs: &[FieldSpec], outputs: &[FieldSpec]) -> Self {
        Self {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            executions: Rc::new(Cell::new(0)),
        }
    }
}

impl RenderPass for CountingPass {
    fn reflect(&self, _compile_data: &CompileData) -> PassReflection {
        let mut reflection = PassReflection::new();
        for (name, samples, format) in &self.inputs {
            reflection
                .add_input(name, "")
                .texture2d(0, 0, *samples)
                .format(*format);
        }
        for (name, samples, format) in &self.outputs {
            reflection
                .add_output(name, "")
                .texture2d(0, 0, *samples)
                .format(*format);
        }
        reflection
    }

    fn execute(&mut self, _ctx: &mut dyn RenderContext, _data: &mut RenderData) {
        self.executions.set(self.executions.get() + 1);
    }
}
