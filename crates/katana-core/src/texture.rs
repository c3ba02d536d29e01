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

//! Texture cache and decoder contracts.
//!
//! The translator does not own texture memory. The embedding emulator keeps
//! a cache of [`TextureCacheEntry`] records keyed by the `(tsp, tcw)`
//! register pair and hands them out through [`TextureLookup`]; the
//! translator decodes dirty entries through a [`TextureDecoder`] and
//! uploads them through the render backend, writing the resulting handle
//! and sampler state back into the entry.

use crate::error::DecodeError;
use crate::regs::{TextureControlWord, TspWord};
use crate::state::{FilterMode, WrapMode};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An opaque handle to a texture owned by the render backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct TextureHandle(pub u64);

/// Cache key for guest textures.
///
/// Known gap, carried deliberately: decoding also consults the latched
/// stride register and palette format, which are not part of the key. An
/// entry decoded under one palette format can be returned stale after the
/// palette registers change. Do not extend the key without guidance from
/// the cache owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct TextureKey {
    /// The texture-shading-parameter word.
    pub tsp: TspWord,
    /// The texture control word.
    pub tcw: TextureControlWord,
}

/// Storage layout of guest texture data, derived from the control word.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum TextureLayout {
    /// Morton-order ("twiddled") texels.
    #[default]
    Twiddled,
    /// Twiddled and VQ compressed.
    TwiddledVq,
    /// Raster scan order.
    Bitmap,
    /// 4-bit paletted, twiddled.
    Paletted4bpp,
    /// 8-bit paletted, twiddled.
    Paletted8bpp,
}

impl TextureLayout {
    /// Derives the layout from a texture control word.
    pub fn from_tcw(tcw: TextureControlWord) -> Self {
        match tcw.pixel_fmt() {
            5 => Self::Paletted4bpp,
            6 => Self::Paletted8bpp,
            _ if tcw.vq_compressed() => Self::TwiddledVq,
            _ if tcw.scan_order() != 0 => Self::Bitmap,
            _ => Self::Twiddled,
        }
    }
}

/// One guest texture tracked by the embedding cache.
///
/// The translator mutates only `handle`, `dirty`, `filter`, `wrap_u`,
/// `wrap_v`, `layout`, `width` and `height`; the source data and the
/// dirty-marking policy belong to the cache owner.
#[derive(Debug, Clone, Default)]
pub struct TextureCacheEntry {
    /// Live backend texture, or `None` if never uploaded.
    pub handle: Option<TextureHandle>,
    /// Guest memory behind this texture changed since the last upload.
    pub dirty: bool,

    /// Sampler filter chosen at last upload.
    pub filter: FilterMode,
    /// U wrap mode chosen at last upload.
    pub wrap_u: WrapMode,
    /// V wrap mode chosen at last upload.
    pub wrap_v: WrapMode,
    /// Storage layout decoded at last upload.
    pub layout: TextureLayout,
    /// Width in texels at last upload.
    pub width: u32,
    /// Height in texels at last upload.
    pub height: u32,

    /// Raw guest texture data (twiddled/compressed/paletted as per
    /// `layout`), snapshot by the cache owner.
    pub texture: Vec<u8>,
    /// Raw palette data for paletted layouts.
    pub palette: Vec<u8>,
}

/// The cache lookup the embedding emulator supplies.
pub trait TextureLookup {
    /// Returns the cache entry for `key`, creating it if necessary.
    ///
    /// The lookup always succeeds; a cache that cannot satisfy it has
    /// violated the contract and should panic.
    fn find_texture(&mut self, key: TextureKey) -> &mut TextureCacheEntry;
}

/// Decodes guest texture data into RGBA8 bytes.
pub trait TextureDecoder {
    /// Decodes `width * height` texels from `src` into `dst` as RGBA8.
    ///
    /// `stride` is a raster-pixel row pitch for [`TextureLayout::Bitmap`]
    /// sources, or 0 when the width is authoritative. `palette` and
    /// `palette_fmt` are consulted for paletted layouts only.
    #[allow(clippy::too_many_arguments)]
    fn decode(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        stride: u32,
        layout: TextureLayout,
        pixel_fmt: u32,
        palette: &[u8],
        palette_fmt: u32,
        dst: &mut [u8],
    ) -> Result<(), DecodeError>;
}

/// Byte offsets of the top mip level for VQ-compressed textures, indexed
/// by `log2(side) - 3` (sides 8 through 1024).
pub const VQ_MIPMAP_OFFSETS: [usize; 8] = [
    0x00006, 0x00016, 0x00056, 0x00156, 0x00556, 0x01556, 0x05556, 0x15556,
];

/// Byte offsets of the top mip level for 4-bit paletted textures.
pub const PALETTED_4BPP_MIPMAP_OFFSETS: [usize; 8] = [
    0x0000c, 0x0002c, 0x000ac, 0x002ac, 0x00aac, 0x02aac, 0x0aaac, 0x2aaac,
];

/// Byte offsets of the top mip level for 8-bit paletted textures.
pub const PALETTED_8BPP_MIPMAP_OFFSETS: [usize; 8] = [
    0x00018, 0x00058, 0x00158, 0x00558, 0x01558, 0x05558, 0x15558, 0x55558,
];

/// Byte offsets of the top mip level for non-paletted textures.
pub const NONPALETTED_MIPMAP_OFFSETS: [usize; 8] = [
    0x00030, 0x000b0, 0x002b0, 0x00ab0, 0x02ab0, 0x0aab0, 0x2aab0, 0xaaab0,
];

/// Byte offset of the highest-resolution mip level for a mipmapped
/// texture of the given layout and side length.
///
/// # Panics
/// Panics if `width` is not a power of two in `8..=1024`.
pub fn top_mip_offset(layout: TextureLayout, width: u32) -> usize {
    assert!(
        width.is_power_of_two() && (8..=1024).contains(&width),
        "mipmapped texture width {width} out of range"
    );
    let index = (width.trailing_zeros() - 3) as usize;
    match layout {
        TextureLayout::TwiddledVq => VQ_MIPMAP_OFFSETS[index],
        TextureLayout::Paletted4bpp => PALETTED_4BPP_MIPMAP_OFFSETS[index],
        TextureLayout::Paletted8bpp => PALETTED_8BPP_MIPMAP_OFFSETS[index],
        TextureLayout::Twiddled | TextureLayout::Bitmap => NONPALETTED_MIPMAP_OFFSETS[index],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_tcw() {
        assert_eq!(
            TextureLayout::from_tcw(TextureControlWord(5 << 27)),
            TextureLayout::Paletted4bpp
        );
        assert_eq!(
            TextureLayout::from_tcw(TextureControlWord(6 << 27)),
            TextureLayout::Paletted8bpp
        );
        assert_eq!(
            TextureLayout::from_tcw(TextureControlWord(1 << 30)),
            TextureLayout::TwiddledVq
        );
        assert_eq!(
            TextureLayout::from_tcw(TextureControlWord(1 << 26)),
            TextureLayout::Bitmap
        );
        assert_eq!(
            TextureLayout::from_tcw(TextureControlWord(0)),
            TextureLayout::Twiddled
        );
    }

    #[test]
    fn test_top_mip_offset_lookup() {
        assert_eq!(top_mip_offset(TextureLayout::TwiddledVq, 8), 0x6);
        assert_eq!(top_mip_offset(TextureLayout::Paletted4bpp, 1024), 0x2aaac);
        assert_eq!(top_mip_offset(TextureLayout::Paletted8bpp, 64), 0x558);
        assert_eq!(top_mip_offset(TextureLayout::Twiddled, 256), 0xaab0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_top_mip_offset_rejects_bad_width() {
        top_mip_offset(TextureLayout::Twiddled, 4);
    }
}
