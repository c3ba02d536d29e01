// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Raw CLX2 register and parameter words.
//!
//! Each word is a `u32` newtype with accessor methods for its bit fields.
//! Decoding happens through these accessors only; nothing in the workspace
//! reinterprets parameter bytes structurally.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[inline]
fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 != 0
}

#[inline]
fn bits(word: u32, lo: u32, count: u32) -> u32 {
    (word >> lo) & ((1 << count) - 1)
}

/// The tag carried in a parameter control word's `para_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum ParaType {
    /// Terminates the list currently being input.
    EndOfList,
    /// Sets the user tile clip rectangle (ignored by the translator).
    UserTileClip,
    /// Reconfigures object list pointers mid-stream (unsupported, fatal).
    ObjListSet,
    /// A polygon or modifier-volume global parameter.
    PolyOrVol,
    /// A sprite global parameter.
    Sprite,
    /// A vertex parameter.
    Vertex,
}

impl ParaType {
    /// Decodes the 3-bit `para_type` field. Values 3 and 6 are reserved.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::EndOfList),
            1 => Some(Self::UserTileClip),
            2 => Some(Self::ObjListSet),
            4 => Some(Self::PolyOrVol),
            5 => Some(Self::Sprite),
            7 => Some(Self::Vertex),
            _ => None,
        }
    }
}

/// One of the five display lists a parameter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum ListKind {
    /// Opaque polygons.
    Opaque,
    /// Opaque modifier volumes.
    OpaqueModVol,
    /// Translucent polygons.
    Translucent,
    /// Translucent modifier volumes.
    TranslucentModVol,
    /// Alpha-tested ("punch through") polygons.
    PunchThrough,
}

impl ListKind {
    /// Number of display lists.
    pub const COUNT: usize = 5;

    /// All lists, in hardware numbering order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Opaque,
        Self::OpaqueModVol,
        Self::Translucent,
        Self::TranslucentModVol,
        Self::PunchThrough,
    ];

    /// Decodes the 3-bit `list_type` field.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Opaque),
            1 => Some(Self::OpaqueModVol),
            2 => Some(Self::Translucent),
            3 => Some(Self::TranslucentModVol),
            4 => Some(Self::PunchThrough),
            _ => None,
        }
    }

    /// Index of this list within per-context list arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this list carries modifier-volume geometry.
    #[inline]
    pub const fn is_mod_vol(self) -> bool {
        matches!(self, Self::OpaqueModVol | Self::TranslucentModVol)
    }

    /// Whether this list blends against the frame (translucent passes).
    #[inline]
    pub const fn is_translucent(self) -> bool {
        matches!(self, Self::Translucent | Self::TranslucentModVol)
    }

    /// Whether surfaces in this list are split per-triangle at commit time
    /// so they can be depth sorted individually.
    #[inline]
    pub const fn sorts_per_triangle(self) -> bool {
        matches!(self, Self::Translucent | Self::PunchThrough)
    }
}

/// The 32-bit parameter control word prefixed to every parameter.
///
/// Bits 0-3 (`uv_16bit`, `gouraud`, `offset`, `texture`) override the
/// matching bits in the global ISP/TSP words for the object they introduce.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(transparent)]
pub struct ParamControlWord(pub u32);

impl ParamControlWord {
    /// UVs are stored as two 16-bit halves instead of two floats.
    #[inline]
    pub fn uv_16bit(self) -> bool {
        bit(self.0, 0)
    }

    /// Gouraud shading is enabled for the object.
    #[inline]
    pub fn gouraud(self) -> bool {
        bit(self.0, 1)
    }

    /// Vertices carry an offset (specular) color.
    #[inline]
    pub fn offset(self) -> bool {
        bit(self.0, 2)
    }

    /// The object is textured.
    #[inline]
    pub fn texture(self) -> bool {
        bit(self.0, 3)
    }

    /// Vertex color encoding: 0 packed, 1 float, 2 intensity, 3 intensity
    /// reusing the previous face color.
    #[inline]
    pub fn col_type(self) -> u32 {
        bits(self.0, 4, 2)
    }

    /// The object carries two sets of shading parameters.
    #[inline]
    pub fn volume(self) -> bool {
        bit(self.0, 6)
    }

    /// Raw 3-bit destination list field.
    #[inline]
    pub fn list_type_raw(self) -> u32 {
        bits(self.0, 16, 3)
    }

    /// Decoded destination list, if the raw field names one.
    #[inline]
    pub fn list_type(self) -> Option<ListKind> {
        ListKind::from_raw(self.list_type_raw())
    }

    /// Raw 3-bit parameter tag field.
    #[inline]
    pub fn para_type_raw(self) -> u32 {
        bits(self.0, 24, 3)
    }

    /// Decoded parameter tag, if the raw field names one.
    #[inline]
    pub fn para_type(self) -> Option<ParaType> {
        ParaType::from_raw(self.para_type_raw())
    }

    /// This vertex terminates its triangle strip.
    #[inline]
    pub fn end_of_strip(self) -> bool {
        bit(self.0, 28)
    }
}

/// The image-synthesis-processor instruction word of a global parameter.
///
/// Encodes the depth, culling and write policy of the object, plus copies
/// of the texture/offset flags that the control word overrides.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(transparent)]
pub struct IspWord(pub u32);

impl IspWord {
    /// 3-bit depth compare mode (see the depth-func translation table).
    #[inline]
    pub fn depth_compare_mode(self) -> u32 {
        bits(self.0, 29, 3)
    }

    /// 2-bit culling mode (see the cull translation table).
    #[inline]
    pub fn culling_mode(self) -> u32 {
        bits(self.0, 27, 2)
    }

    /// Depth writes are disabled for the object.
    #[inline]
    pub fn z_write_disable(self) -> bool {
        bit(self.0, 26)
    }

    /// The object is textured (used by the background word, where no
    /// control word exists to override it).
    #[inline]
    pub fn texture(self) -> bool {
        bit(self.0, 25)
    }

    /// The object carries offset colors (background word only, as above).
    #[inline]
    pub fn offset(self) -> bool {
        bit(self.0, 24)
    }

    /// Gouraud shading flag.
    #[inline]
    pub fn gouraud(self) -> bool {
        bit(self.0, 23)
    }

    /// 16-bit UV flag.
    #[inline]
    pub fn uv_16bit(self) -> bool {
        bit(self.0, 22)
    }
}

/// The texture-shading-parameter instruction word of a global parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(transparent)]
pub struct TspWord(pub u32);

impl TspWord {
    /// 3-bit source blend factor selector.
    #[inline]
    pub fn src_alpha_instr(self) -> u32 {
        bits(self.0, 29, 3)
    }

    /// 3-bit destination blend factor selector.
    #[inline]
    pub fn dst_alpha_instr(self) -> u32 {
        bits(self.0, 26, 3)
    }

    /// Vertex alpha participates in blending.
    #[inline]
    pub fn use_alpha(self) -> bool {
        bit(self.0, 20)
    }

    /// Texture alpha is forced to 1.0.
    #[inline]
    pub fn ignore_tex_alpha(self) -> bool {
        bit(self.0, 19)
    }

    /// Mirror the texture in U each repeat.
    #[inline]
    pub fn flip_u(self) -> bool {
        bit(self.0, 18)
    }

    /// Mirror the texture in V each repeat.
    #[inline]
    pub fn flip_v(self) -> bool {
        bit(self.0, 17)
    }

    /// Clamp U to the edge texel.
    #[inline]
    pub fn clamp_u(self) -> bool {
        bit(self.0, 16)
    }

    /// Clamp V to the edge texel.
    #[inline]
    pub fn clamp_v(self) -> bool {
        bit(self.0, 15)
    }

    /// 2-bit filter mode; 0 is point sampling, everything else collapses
    /// to bilinear (trilinear is not carried).
    #[inline]
    pub fn filter_mode(self) -> u32 {
        bits(self.0, 13, 2)
    }

    /// 2-bit texture/shading instruction (decal, modulate, and their
    /// alpha-blended variants).
    #[inline]
    pub fn texture_shading_instr(self) -> u32 {
        bits(self.0, 6, 2)
    }

    /// Texture width exponent; width is `8 << texture_u_size`.
    #[inline]
    pub fn texture_u_size(self) -> u32 {
        bits(self.0, 3, 3)
    }

    /// Texture height exponent; height is `8 << texture_v_size`.
    #[inline]
    pub fn texture_v_size(self) -> u32 {
        bits(self.0, 0, 3)
    }
}

/// The texture control word of a global parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(transparent)]
pub struct TextureControlWord(pub u32);

impl TextureControlWord {
    /// The texture has a full mipmap chain in memory.
    #[inline]
    pub fn mip_mapped(self) -> bool {
        bit(self.0, 31)
    }

    /// The texture data is VQ compressed.
    #[inline]
    pub fn vq_compressed(self) -> bool {
        bit(self.0, 30)
    }

    /// 3-bit pixel format selector.
    #[inline]
    pub fn pixel_fmt(self) -> u32 {
        bits(self.0, 27, 3)
    }

    /// Scan order: 0 twiddled, 1 raster.
    #[inline]
    pub fn scan_order(self) -> u32 {
        bits(self.0, 26, 1)
    }

    /// Width comes from the stride register instead of the TSP exponent.
    #[inline]
    pub fn stride_select(self) -> bool {
        bit(self.0, 25)
    }

    /// 6-bit palette bank selector for paletted formats.
    #[inline]
    pub fn palette_selector(self) -> u32 {
        bits(self.0, 21, 6)
    }

    /// Texture start address in 8-byte units.
    #[inline]
    pub fn texture_addr(self) -> u32 {
        bits(self.0, 0, 21)
    }
}
