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

//! Backend-neutral pipeline state enums.
//!
//! These are the vocabulary shared between the translator and a render
//! backend. Translation from the raw register fields lives in
//! `katana-render`; backends map these onto their own API's equivalents.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The comparison function used for depth testing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum DepthFunc {
    /// The test never passes.
    Never,
    /// The test passes if the new depth is less than the stored depth.
    Less,
    /// The test passes if the new depth equals the stored depth.
    Equal,
    /// The test passes if the new depth is less than or equal.
    LessEqual,
    /// The test passes if the new depth is greater than the stored depth.
    Greater,
    /// The test passes if the new depth differs from the stored depth.
    NotEqual,
    /// The test passes if the new depth is greater than or equal.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// Which face of a triangle to cull.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum CullFace {
    /// No culling is performed.
    #[default]
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    Back,
}

/// A factor in the fixed-function blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source color.
    SrcColor,
    /// The factor is `1.0 - src` per channel.
    OneMinusSrcColor,
    /// The factor is the destination color.
    DstColor,
    /// The factor is `1.0 - dst` per channel.
    OneMinusDstColor,
    /// The factor is the source alpha.
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
    /// The factor is the destination alpha.
    DstAlpha,
    /// The factor is `1.0 - dst.a`.
    OneMinusDstAlpha,
}

/// An enabled blend: the source and destination factors of `src * sf + dst * df`.
///
/// Surfaces that do not blend carry `None` instead of a `Blend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct Blend {
    /// Factor applied to the incoming fragment color.
    pub src: BlendFactor,
    /// Factor applied to the framebuffer color.
    pub dst: BlendFactor,
}

/// How the texture combines with the vertex color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum ShadeMode {
    /// Texture color replaces the vertex color.
    #[default]
    Decal,
    /// Texture color multiplies the vertex color.
    Modulate,
    /// Decal with texture alpha blending the two colors.
    DecalAlpha,
    /// Modulate with texture alpha blending the two colors.
    ModulateAlpha,
}

/// Texture sampling filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum FilterMode {
    /// Point sampling of the nearest texel.
    #[default]
    Nearest,
    /// Bilinear interpolation of the four nearest texels. Trilinear
    /// filtering also collapses to this.
    Bilinear,
}

/// How texture coordinates outside `[0, 1]` are handled, per axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum WrapMode {
    /// Coordinates wrap around.
    #[default]
    Repeat,
    /// Coordinates wrap, mirroring at each integer boundary.
    MirroredRepeat,
    /// Coordinates are clamped to the edge texel.
    ClampToEdge,
}
