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

//! Register-field to pipeline-state translation tables.
//!
//! Each function maps one masked register field onto the backend-neutral
//! enums of `katana-core`. The selector values are the hardware's; the
//! callers mask the fields, so every arm is reachable and the wildcards
//! cannot fire.

use katana_core::state::{BlendFactor, CullFace, DepthFunc, FilterMode, ShadeMode, WrapMode};

/// Maps the 3-bit ISP depth compare mode.
pub fn depth_func(raw: u32) -> DepthFunc {
    match raw & 7 {
        0 => DepthFunc::Never,
        1 => DepthFunc::Greater,
        2 => DepthFunc::Equal,
        3 => DepthFunc::GreaterEqual,
        4 => DepthFunc::Less,
        5 => DepthFunc::NotEqual,
        6 => DepthFunc::LessEqual,
        _ => DepthFunc::Always,
    }
}

/// Maps the 2-bit ISP culling mode. Small-culling modes both disable
/// culling; the cull-size threshold is not carried.
pub fn cull_face(raw: u32) -> CullFace {
    match raw & 3 {
        0 | 1 => CullFace::None,
        2 => CullFace::Back,
        _ => CullFace::Front,
    }
}

/// Maps the 3-bit TSP source blend instruction.
pub fn src_blend_factor(raw: u32) -> BlendFactor {
    match raw & 7 {
        0 => BlendFactor::Zero,
        1 => BlendFactor::One,
        2 => BlendFactor::DstColor,
        3 => BlendFactor::OneMinusDstColor,
        4 => BlendFactor::SrcAlpha,
        5 => BlendFactor::OneMinusSrcAlpha,
        6 => BlendFactor::DstAlpha,
        _ => BlendFactor::OneMinusDstAlpha,
    }
}

/// Maps the 3-bit TSP destination blend instruction.
///
/// The hardware mirrors the "other color" selectors here: selectors 2 and
/// 3 read the source color, where the source table reads the destination.
pub fn dst_blend_factor(raw: u32) -> BlendFactor {
    match raw & 7 {
        0 => BlendFactor::Zero,
        1 => BlendFactor::One,
        2 => BlendFactor::SrcColor,
        3 => BlendFactor::OneMinusSrcColor,
        4 => BlendFactor::SrcAlpha,
        5 => BlendFactor::OneMinusSrcAlpha,
        6 => BlendFactor::DstAlpha,
        _ => BlendFactor::OneMinusDstAlpha,
    }
}

/// Maps the 2-bit TSP texture/shading instruction.
pub fn shade_mode(raw: u32) -> ShadeMode {
    match raw & 3 {
        0 => ShadeMode::Decal,
        1 => ShadeMode::Modulate,
        2 => ShadeMode::DecalAlpha,
        _ => ShadeMode::ModulateAlpha,
    }
}

/// Maps the TSP filter mode: point sampling or bilinear. Trilinear
/// selectors collapse to bilinear.
pub fn filter_mode(raw: u32) -> FilterMode {
    if raw == 0 {
        FilterMode::Nearest
    } else {
        FilterMode::Bilinear
    }
}

/// Derives one axis's wrap mode from its clamp and flip flags. Clamping
/// wins over flipping.
pub fn wrap_mode(clamp: bool, flip: bool) -> WrapMode {
    if clamp {
        WrapMode::ClampToEdge
    } else if flip {
        WrapMode::MirroredRepeat
    } else {
        WrapMode::Repeat
    }
}
