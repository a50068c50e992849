//! Pass reflection: the typed resource contract a pass declares
//!
//! Every pass describes its inputs, outputs and internal resources as a set
//! of [`Field`]s. The compiler consumes these to register resources, splice
//! adapter passes and validate the graph.

use glam::UVec2;

use crate::backend::types::{BindFlags, DefaultProperties, ResourceKind, TextureFormat};

/// Which side(s) of a pass a field sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldVisibility(u32);

impl FieldVisibility {
    pub const INPUT: Self = Self(1 << 0);
    pub const OUTPUT: Self = Self(1 << 1);
    pub const INTERNAL: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_input(&self) -> bool {
        self.contains(Self::INPUT)
    }

    pub fn is_output(&self) -> bool {
        self.contains(Self::OUTPUT)
    }

    pub fn is_internal(&self) -> bool {
        self.contains(Self::INTERNAL)
    }
}

impl std::ops::BitOr for FieldVisibility {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// One input, output or internal resource declared by a pass.
///
/// Unset properties (zero dimensions, zero sample count, `Unknown` format,
/// empty bind flags) are filled in later: dimensions and format from the
/// caller's [`DefaultProperties`], bind flags from the union of usages its
/// consumers actually require.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    description: String,
    kind: ResourceKind,
    width: u32,
    height: u32,
    depth: u32,
    sample_count: u32,
    format: TextureFormat,
    bind_flags: BindFlags,
    optional: bool,
    visibility: FieldVisibility,
}

impl Field {
    pub fn new(name: &str, description: &str, visibility: FieldVisibility) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: ResourceKind::Texture2D,
            width: 0,
            height: 0,
            depth: 1,
            sample_count: 1,
            format: TextureFormat::Unknown,
            bind_flags: BindFlags::NONE,
            optional: false,
            visibility,
        }
    }

    /// Declare a 2D texture. Zero width/height take the default dimensions,
    /// a zero sample count accepts any sample count.
    pub fn texture2d(&mut self, width: u32, height: u32, sample_count: u32) -> &mut Self {
        self.kind = ResourceKind::Texture2D;
        self.width = width;
        self.height = height;
        self.depth = 1;
        self.sample_count = sample_count;
        self
    }

    /// Declare a 3D texture
    pub fn texture3d(&mut self, width: u32, height: u32, depth: u32) -> &mut Self {
        self.kind = ResourceKind::Texture3D;
        self.width = width;
        self.height = height;
        self.depth = depth;
        self.sample_count = 1;
        self
    }

    /// Declare a raw buffer of `size` bytes
    pub fn raw_buffer(&mut self, size: u32) -> &mut Self {
        self.kind = ResourceKind::Buffer;
        self.width = size;
        self.height = 1;
        self.depth = 1;
        self.sample_count = 1;
        self
    }

    pub fn format(&mut self, format: TextureFormat) -> &mut Self {
        self.format = format;
        self
    }

    pub fn bind_flags(&mut self, flags: BindFlags) -> &mut Self {
        self.bind_flags = flags;
        self
    }

    /// Mark the field as optional; an unbound optional input is not a
    /// validation error.
    pub fn optional(&mut self) -> &mut Self {
        self.optional = true;
        self
    }

    pub fn visibility(&mut self, visibility: FieldVisibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn get_format(&self) -> TextureFormat {
        self.format
    }

    pub fn get_bind_flags(&self) -> BindFlags {
        self.bind_flags
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn get_visibility(&self) -> FieldVisibility {
        self.visibility
    }

    pub(crate) fn renamed(&self, name: &str) -> Field {
        let mut field = self.clone();
        field.name = name.to_string();
        field
    }

    /// Merge another field's requirements into this one, for two names
    /// aliasing a single physical resource.
    ///
    /// Kinds must match. Dimensions merge by maximum, zero meaning unset.
    /// Concrete formats and sample counts must match exactly; `Unknown`
    /// format and zero sample count defer to the other side. Bind flags and
    /// visibility are unioned. The result is optional only if both sides are.
    pub fn merge(&self, other: &Field) -> Result<Field, String> {
        if self.kind != other.kind {
            return Err(format!(
                "resource kind mismatch ({:?} vs {:?})",
                self.kind, other.kind
            ));
        }
        let format = match (self.format, other.format) {
            (TextureFormat::Unknown, f) => f,
            (f, TextureFormat::Unknown) => f,
            (a, b) if a == b => a,
            (a, b) => return Err(format!("format mismatch ({a:?} vs {b:?})")),
        };
        let sample_count = match (self.sample_count, other.sample_count) {
            (0, s) => s,
            (s, 0) => s,
            (a, b) if a == b => a,
            (a, b) => return Err(format!("sample count mismatch ({a} vs {b})")),
        };

        let mut merged = self.clone();
        merged.width = self.width.max(other.width);
        merged.height = self.height.max(other.height);
        merged.depth = self.depth.max(other.depth);
        merged.sample_count = sample_count;
        merged.format = format;
        merged.bind_flags = self.bind_flags | other.bind_flags;
        merged.optional = self.optional && other.optional;
        merged.visibility = self.visibility | other.visibility;
        Ok(merged)
    }
}

/// The full reflection contract of one pass: an ordered list of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReflection {
    fields: Vec<Field>,
}

impl PassReflection {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_field(&mut self, name: &str, description: &str, visibility: FieldVisibility) -> &mut Field {
        if let Some(index) = self.fields.iter().position(|f| f.name() == name) {
            log::warn!("Field '{name}' is declared more than once; merging declarations");
            return &mut self.fields[index];
        }
        let index = self.fields.len();
        self.fields.push(Field::new(name, description, visibility));
        &mut self.fields[index]
    }

    pub fn add_input(&mut self, name: &str, description: &str) -> &mut Field {
        self.add_field(name, description, FieldVisibility::INPUT)
    }

    pub fn add_output(&mut self, name: &str, description: &str) -> &mut Field {
        self.add_field(name, description, FieldVisibility::OUTPUT)
    }

    pub fn add_internal(&mut self, name: &str, description: &str) -> &mut Field {
        self.add_field(name, description, FieldVisibility::INTERNAL)
    }

    /// Pass-through field: consumed as an input and re-exposed as an output
    /// sharing the same physical resource.
    pub fn add_input_output(&mut self, name: &str, description: &str) -> &mut Field {
        self.add_field(
            name,
            description,
            FieldVisibility::INPUT | FieldVisibility::OUTPUT,
        )
    }

    pub(crate) fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything a pass may consult while reflecting
#[derive(Debug, Clone)]
pub struct CompileData {
    pub default_dims: UVec2,
    pub default_format: TextureFormat,
    /// Producer fields for this pass's bound inputs, renamed to the local
    /// input name, so reflection can propagate upstream dimensions/format.
    pub connected_resources: PassReflection,
}

impl CompileData {
    pub fn new(defaults: &DefaultProperties) -> Self {
        Self {
            default_dims: defaults.dims,
            default_format: defaults.format,
            connected_resources: PassReflection::new(),
        }
    }
}

impl Default for CompileData {
    fn default() -> Self {
        Self::new(&DefaultProperties::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_output(samples: u32) -> Field {
        let mut field = Field::new("color", "", FieldVisibility::OUTPUT);
        field
            .texture2d(0, 0, samples)
            .format(TextureFormat::Rgba16Float);
        field
    }

    #[test]
    fn merge_takes_maximum_dimensions() {
        let mut a = Field::new("a", "", FieldVisibility::OUTPUT);
        a.texture2d(256, 128, 1);
        let mut b = Field::new("b", "", FieldVisibility::INPUT);
        b.texture2d(64, 512, 1);

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.width(), 256);
        assert_eq!(merged.height(), 512);
        assert!(merged.get_visibility().is_input());
        assert!(merged.get_visibility().is_output());
    }

    #[test]
    fn merge_defers_unknown_format_and_any_sample_count() {
        let a = color_output(4);
        let mut b = Field::new("color", "", FieldVisibility::INPUT);
        b.texture2d(0, 0, 0);

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.get_format(), TextureFormat::Rgba16Float);
        assert_eq!(merged.sample_count(), 4);
    }

    #[test]
    fn merge_rejects_conflicting_formats() {
        let a = color_output(1);
        let mut b = Field::new("color", "", FieldVisibility::INPUT);
        b.texture2d(0, 0, 1).format(TextureFormat::R32Float);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn merge_rejects_conflicting_sample_counts() {
        let a = color_output(4);
        let mut b = Field::new("color", "", FieldVisibility::INPUT);
        b.texture2d(0, 0, 1);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn merge_rejects_kind_mismatch() {
        let a = color_output(1);
        let mut b = Field::new("color", "", FieldVisibility::INPUT);
        b.raw_buffer(1024);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn merged_field_is_required_if_either_side_is() {
        let mut a = color_output(1);
        a.optional();
        let mut b = Field::new("color", "", FieldVisibility::INPUT);
        b.texture2d(0, 0, 1);
        assert!(!a.merge(&b).unwrap().is_optional());

        let mut c = Field::new("color", "", FieldVisibility::INPUT);
        c.texture2d(0, 0, 1).optional();
        assert!(a.merge(&c).unwrap().is_optional());
    }

    #[test]
    fn reflection_keeps_declaration_order_and_finds_fields() {
        let mut reflection = PassReflection::new();
        reflection.add_input("src", "source");
        reflection.add_output("dst", "destination");
        reflection.add_internal("scratch", "");

        let names: Vec<_> = reflection.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["src", "dst", "scratch"]);
        assert!(reflection.field("dst").unwrap().get_visibility().is_output());
        assert!(reflection.field("missing").is_none());
    }
}
