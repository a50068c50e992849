//! Automatically inserted bridging passes
//!
//! When a producer's output contract and a consumer's input requirement
//! disagree in a way a known pass can reconcile, the compiler splices one in
//! from this fixed catalogue. Anything outside the catalogue is left for
//! validation to report.

use crate::backend::traits::RenderContext;
use crate::backend::types::TextureFormat;
use crate::render_graph::pass::{make_pass, PassRef, RenderData, RenderPass};
use crate::render_graph::reflection::{CompileData, Field, PassReflection};

/// The catalogue of reconcilable producer/consumer mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Multi-sampled producer feeding a consumer that requires exactly one
    /// sample
    MsaaResolve,
}

/// Outcome of checking one edge's field pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeCompatibility {
    Compatible,
    /// A catalogue pass can bridge the mismatch
    Resolvable(AdapterKind),
    /// No adapter applies; reported during validation
    Fatal(String),
}

/// Decide whether a producer field can feed a consumer field directly,
/// through an adapter, or not at all.
pub fn check_edge(producer: &Field, consumer: &Field) -> EdgeCompatibility {
    if producer.kind() != consumer.kind() {
        return EdgeCompatibility::Fatal(format!(
            "resource kind mismatch ({:?} vs {:?})",
            producer.kind(),
            consumer.kind()
        ));
    }
    let producer_format = producer.get_format();
    let consumer_format = consumer.get_format();
    if !producer_format.is_unknown()
        && !consumer_format.is_unknown()
        && producer_format != consumer_format
    {
        return EdgeCompatibility::Fatal(format!(
            "format mismatch ({producer_format:?} vs {consumer_format:?})"
        ));
    }

    // zero sample count accepts anything
    let produced = producer.sample_count();
    let required = consumer.sample_count();
    if required == 0 || produced == 0 || produced == required {
        return EdgeCompatibility::Compatible;
    }
    if produced > 1 && required == 1 {
        return EdgeCompatibility::Resolvable(AdapterKind::MsaaResolve);
    }
    EdgeCompatibility::Fatal(format!(
        "sample count mismatch ({produced} produced, {required} required)"
    ))
}

/// A catalogue pass instantiated for one specific edge
pub struct AdapterPass {
    pub pass: PassRef,
    pub type_name: &'static str,
    /// Adapter-local input field name (receives the original producer)
    pub input: &'static str,
    /// Adapter-local output field name (feeds the original consumer)
    pub output: &'static str,
}

impl AdapterKind {
    /// Build the bridging pass for this mismatch, configured from the
    /// producer's field properties.
    pub fn instantiate(&self, producer: &Field) -> AdapterPass {
        match self {
            AdapterKind::MsaaResolve => AdapterPass {
                pass: make_pass(ResolvePass::new(producer.get_format())),
                type_name: ResolvePass::TYPE_NAME,
                input: ResolvePass::SRC,
                output: ResolvePass::DST,
            },
        }
    }
}

/// Resolves a multi-sampled texture into a single-sample one
pub struct ResolvePass {
    format: TextureFormat,
}

impl ResolvePass {
    pub const TYPE_NAME: &'static str = "ResolvePass";
    pub const SRC: &'static str = "src";
    pub const DST: &'static str = "dst";

    pub fn new(format: TextureFormat) -> Self {
        Self { format }
    }
}

impl RenderPass for ResolvePass {
    fn reflect(&self, _compile_data: &CompileData) -> PassReflection {
        let mut reflection = PassReflection::new();
        reflection
            .add_input(Self::SRC, "Multi-sampled source texture")
            .format(self.format)
            .texture2d(0, 0, 0);
        reflection
            .add_output(Self::DST, "Single-sample destination texture")
            .format(self.format)
            .texture2d(0, 0, 1);
        reflection
    }

    fn execute(&mut self, ctx: &mut dyn RenderContext, data: &mut RenderData) {
        let (Some(src), Some(dst)) = (
            data.get_resource(Self::SRC),
            data.get_resource(Self::DST),
        ) else {
            log::warn!(
                "ResolvePass '{}' is missing an input or output resource",
                data.pass_name()
            );
            return;
        };
        ctx.resolve_resource(src, dst);
    }
}
