//! Common types shared between the graph compiler and device backends

use glam::UVec2;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Not yet specified; resolved against default properties at allocation
    #[default]
    Unknown,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
    Depth24PlusStencil8,
    R32Float,
    Rg32Float,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TextureFormat::Unknown)
    }

    pub fn class(&self) -> FormatClass {
        if self.is_depth() {
            FormatClass::DepthStencil
        } else {
            FormatClass::Color
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Unknown => 0,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8
            | TextureFormat::R32Float => 4,
            TextureFormat::Rgba16Float | TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Broad format category, used when deciding whether two connected fields
/// can share or bridge a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    Color,
    DepthStencil,
}

/// Kind of resource a field describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceKind {
    #[default]
    Texture2D,
    Texture3D,
    /// Raw byte buffer; `width` carries the size in bytes
    Buffer,
}

/// Resource bind-usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindFlags(u32);

impl BindFlags {
    pub const NONE: Self = Self(0);
    pub const SHADER_RESOURCE: Self = Self(1 << 0);
    pub const RENDER_TARGET: Self = Self(1 << 1);
    pub const DEPTH_STENCIL: Self = Self(1 << 2);
    pub const UNORDERED_ACCESS: Self = Self(1 << 3);
    pub const COPY_SRC: Self = Self(1 << 4);
    pub const COPY_DST: Self = Self(1 << 5);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for BindFlags {
    fn default() -> Self {
        Self::NONE
    }
}

impl std::ops::BitOr for BindFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Channel mask for marked graph outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureChannelFlags(u32);

impl TextureChannelFlags {
    pub const NONE: Self = Self(0);
    pub const RED: Self = Self(1 << 0);
    pub const GREEN: Self = Self(1 << 1);
    pub const BLUE: Self = Self(1 << 2);
    pub const ALPHA: Self = Self(1 << 3);
    pub const RGB: Self = Self((1 << 0) | (1 << 1) | (1 << 2));
    pub const ALL: Self = Self((1 << 0) | (1 << 1) | (1 << 2) | (1 << 3));

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for TextureChannelFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Fully resolved description handed to the device when creating a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub label: Option<String>,
    pub kind: ResourceKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
    pub bind_flags: BindFlags,
}

impl Default for ResourceDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            kind: ResourceKind::Texture2D,
            width: 1,
            height: 1,
            depth: 1,
            sample_count: 1,
            format: TextureFormat::Rgba8Unorm,
            bind_flags: BindFlags::SHADER_RESOURCE,
        }
    }
}

/// Properties to fall back on when a field leaves dimensions or format unset,
/// supplied by the caller per compile/execute call (e.g. current output size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultProperties {
    pub dims: UVec2,
    pub format: TextureFormat,
}

impl Default for DefaultProperties {
    fn default() -> Self {
        Self {
            dims: UVec2::new(1280, 720),
            format: TextureFormat::Rgba8Unorm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_flags_union_and_contains() {
        let flags = BindFlags::SHADER_RESOURCE | BindFlags::RENDER_TARGET;
        assert!(flags.contains(BindFlags::SHADER_RESOURCE));
        assert!(flags.contains(BindFlags::RENDER_TARGET));
        assert!(!flags.contains(BindFlags::DEPTH_STENCIL));
        assert!(BindFlags::NONE.is_empty());
        assert!(flags.contains(BindFlags::NONE));
    }

    #[test]
    fn format_classes() {
        assert_eq!(TextureFormat::Rgba16Float.class(), FormatClass::Color);
        assert_eq!(
            TextureFormat::Depth32Float.class(),
            FormatClass::DepthStencil
        );
        assert!(TextureFormat::Unknown.is_unknown());
    }

    #[test]
    fn channel_flags_cover_rgb() {
        assert!(TextureChannelFlags::ALL.contains(TextureChannelFlags::RGB));
        assert!(!TextureChannelFlags::RGB.contains(TextureChannelFlags::ALPHA));
    }
}
