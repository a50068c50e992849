//! Render graph system
//!
//! A user-authored dataflow graph of passes ([`GraphDescription`]) is
//! compiled ([`Compiler`]) into an immutable, ordered, resource-allocated
//! pipeline ([`Executable`]) that runs once per frame. Compilation never
//! leaves generated artifacts behind in the editable graph.

pub mod auto_pass;
pub mod compiler;
pub mod dictionary;
pub mod exe;
pub mod graph;
pub mod pass;
pub mod reflection;
pub mod resource_cache;

pub use auto_pass::ResolvePass;
pub use compiler::{CompileError, Compiler, Dependencies};
pub use dictionary::Dictionary;
pub use exe::{Executable, ExecutionContext};
pub use graph::{Edge, FieldRef, GraphDescription, GraphStructure, GraphStructureError};
pub use pass::{
    make_pass, HotReloadFlags, KeyEvent, MouseEvent, MouseEventKind, PassRef, PassUi, RenderData,
    RenderPass,
};
pub use reflection::{CompileData, Field, FieldVisibility, PassReflection};
pub use resource_cache::ResourceCache;
