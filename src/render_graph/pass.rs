//! Render pass capability and the per-pass resource view

use std::cell::RefCell;
use std::rc::Rc;

use glam::{UVec2, Vec2};

use crate::backend::traits::{RenderContext, ResourceHandle};
use crate::backend::types::TextureFormat;
use crate::render_graph::dictionary::Dictionary;
use crate::render_graph::reflection::{CompileData, PassReflection};
use crate::render_graph::resource_cache::ResourceCache;

/// Shared handle to a pass. The graph and any compiled executables share the
/// same pass objects; everything runs on one thread, so plain `Rc<RefCell>`.
pub type PassRef = Rc<RefCell<dyn RenderPass>>;

/// Mouse event delivered to passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub pos: Vec2,
    pub kind: MouseEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Move,
    ButtonDown,
    ButtonUp,
    Wheel,
}

/// Keyboard event delivered to passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u32,
    pub pressed: bool,
}

/// What changed in a hot-reload notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotReloadFlags(u32);

impl HotReloadFlags {
    pub const NONE: Self = Self(0);
    pub const SHADERS: Self = Self(1 << 0);
    pub const ASSETS: Self = Self(1 << 1);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for HotReloadFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Minimal widget sink a pass can draw its settings into.
///
/// The actual UI toolkit lives outside this crate; this trait is the seam.
pub trait PassUi {
    fn text(&mut self, text: &str);
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;
}

/// Per-pass resource view, valid for a single pass invocation.
///
/// Field names resolve against the executable's resource cache as
/// `"pass.field"`, so a pass can only reach the resources it declared.
pub struct RenderData<'a> {
    pass_name: &'a str,
    resources: &'a ResourceCache,
    dictionary: &'a mut Dictionary,
    default_dims: UVec2,
    default_format: TextureFormat,
}

impl<'a> RenderData<'a> {
    pub(crate) fn new(
        pass_name: &'a str,
        resources: &'a ResourceCache,
        dictionary: &'a mut Dictionary,
        default_dims: UVec2,
        default_format: TextureFormat,
    ) -> Self {
        Self {
            pass_name,
            resources,
            dictionary,
            default_dims,
            default_format,
        }
    }

    /// Look up one of this pass's declared fields. `None` means the field is
    /// unbound; whether that is fatal is the pass's call (optional inputs
    /// are legitimately absent).
    pub fn get_resource(&self, field: &str) -> Option<ResourceHandle> {
        self.resources
            .get_resource(&format!("{}.{}", self.pass_name, field))
    }

    pub fn pass_name(&self) -> &str {
        self.pass_name
    }

    pub fn dictionary(&mut self) -> &mut Dictionary {
        self.dictionary
    }

    pub fn default_dims(&self) -> UVec2 {
        self.default_dims
    }

    pub fn default_format(&self) -> TextureFormat {
        self.default_format
    }
}

/// The closed capability set every concrete pass implements.
///
/// The compiler and executable only ever talk to passes through this trait;
/// there is no runtime type inspection anywhere in the pipeline.
pub trait RenderPass {
    /// Declare this pass's resource contract. May depend on upstream fields
    /// propagated through [`CompileData::connected_resources`].
    fn reflect(&self, compile_data: &CompileData) -> PassReflection;

    /// Record this pass's work for the current frame
    fn execute(&mut self, ctx: &mut dyn RenderContext, data: &mut RenderData);

    fn render_ui(&mut self, _ui: &mut dyn PassUi) {}

    fn render_overlay_ui(&mut self, _ui: &mut dyn PassUi) {}

    /// Returns true if the pass handled the event
    fn on_mouse_event(&mut self, _event: &MouseEvent) -> bool {
        false
    }

    /// Returns true if the pass handled the event
    fn on_key_event(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    fn on_hot_reload(&mut self, _flags: HotReloadFlags) {}
}

/// Wrap a concrete pass for insertion into a graph
pub fn make_pass<P: RenderPass + 'static>(pass: P) -> PassRef {
    Rc::new(RefCell::new(pass))
}
