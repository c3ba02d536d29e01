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

//! The render context: the output artifact of a display-list conversion.
//!
//! A [`RenderContext`] owns everything a backend needs to draw a frame:
//! the vertex pool, the triangle index pool, the surfaces (one pipeline
//! state each) and per-list arrays of surface indices in draw order. It
//! also keeps a diagnostic trail of every parsed parameter so external
//! tracers can replay a conversion.
//!
//! All pools are capacity bounded; exceeding a bound is a precondition
//! violation and panics (the stream comes from reproducible emulated
//! hardware, so an overflow is an upstream bug, not an input to recover
//! from).

use crate::color::PackedRgba;
use crate::math::{Vec2, Vec3};
use crate::regs::ListKind;
use crate::state::{Blend, CullFace, DepthFunc, ShadeMode};
use crate::texture::TextureHandle;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Maximum number of surfaces per context.
pub const MAX_SURFACES: usize = 0x10000;
/// Maximum number of vertices per context.
pub const MAX_VERTICES: usize = 0x10000;
/// Maximum number of triangle indices per context.
pub const MAX_INDICES: usize = 0x30000;
/// Maximum number of diagnostic parameter records per context.
pub const MAX_PARAMS: usize = 0x10000;

/// A single vertex as handed to the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(C)]
pub struct Vertex {
    /// Position. `z` is the inverse-w style depth the hardware works in
    /// (larger is closer).
    pub xyz: Vec3,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Packed base color.
    pub color: PackedRgba,
    /// Packed offset (specular) color.
    pub offset_color: PackedRgba,
}

/// The full pipeline state of a surface.
///
/// Equality over this record is what the index generator uses to merge
/// adjacent surfaces into a single draw, so every field that affects
/// rendering must live here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct SurfaceParams {
    /// Backend texture, or `None` for untextured surfaces.
    pub texture: Option<TextureHandle>,
    /// Depth writes enabled.
    pub depth_write: bool,
    /// Depth test function.
    pub depth_func: DepthFunc,
    /// Face culling mode.
    pub cull: CullFace,
    /// Blend factors, or `None` when blending is disabled.
    pub blend: Option<Blend>,
    /// Texture/vertex color combine mode.
    pub shade: ShadeMode,
    /// Vertex alpha is forced to 1.0.
    pub ignore_alpha: bool,
    /// Texture alpha is forced to 1.0.
    pub ignore_texture_alpha: bool,
    /// Vertices carry a meaningful offset color.
    pub offset_color: bool,
    /// Alpha test enabled (punch-through lists).
    pub alpha_test: bool,
    /// Alpha test reference value.
    pub alpha_ref: u8,
}

/// One draw unit: a pipeline state plus a contiguous element range.
///
/// Before index generation `first_vert`/`num_verts` index the vertex pool;
/// after it they index the triangle index pool.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct Surface {
    /// Pipeline state; surfaces with equal params merge into one draw.
    pub params: SurfaceParams,
    /// First element of the surface's range.
    pub first_vert: usize,
    /// Number of elements in the surface's range.
    pub num_verts: usize,
    /// Position of the surface's first triangle within its original
    /// triangle strip; selects the winding of emitted indices.
    pub strip_offset: usize,
}

/// Per-list surface bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct DisplayList {
    /// Indices into [`RenderContext::surfs`], in draw order.
    pub surfs: Vec<usize>,
    /// Number of surfaces committed to this list before sorting and
    /// merging; kept for diagnostics.
    pub num_orig_surfs: usize,
}

/// Diagnostic record of one parsed parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ParamTrace {
    /// Byte offset of the parameter in the captured stream.
    pub offset: usize,
    /// List in force after the parameter was handled.
    pub list: Option<ListKind>,
    /// Vertex type in force after the parameter was handled.
    pub vert_type: Option<u8>,
    /// Index of the most recently committed surface, if any.
    pub last_surf: Option<usize>,
    /// Index of the most recently committed vertex, if any.
    pub last_vert: Option<usize>,
}

/// The output artifact of a conversion, owned by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct RenderContext {
    /// Committed surfaces.
    pub surfs: Vec<Surface>,
    /// Committed vertices.
    pub verts: Vec<Vertex>,
    /// Triangle indices, filled by index generation.
    pub indices: Vec<u32>,
    /// Per-list surface index arrays, in hardware list order.
    pub lists: [DisplayList; ListKind::COUNT],
    /// Diagnostic trail, one record per parsed parameter.
    pub params: Vec<ParamTrace>,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

impl RenderContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all pools and lists for a fresh conversion.
    pub fn reset(&mut self) {
        self.surfs.clear();
        self.verts.clear();
        self.indices.clear();
        for list in &mut self.lists {
            list.surfs.clear();
            list.num_orig_surfs = 0;
        }
        self.params.clear();
        self.width = 0;
        self.height = 0;
    }

    /// Shorthand for the display list of `kind`.
    #[inline]
    pub fn list(&self, kind: ListKind) -> &DisplayList {
        &self.lists[kind.index()]
    }

    /// Mutable shorthand for the display list of `kind`.
    #[inline]
    pub fn list_mut(&mut self, kind: ListKind) -> &mut DisplayList {
        &mut self.lists[kind.index()]
    }

    /// Appends a committed surface.
    ///
    /// # Panics
    /// Panics if the surface pool is full.
    #[inline]
    pub fn push_surface(&mut self, surf: Surface) -> usize {
        assert!(
            self.surfs.len() < MAX_SURFACES,
            "render context surface pool overflow"
        );
        self.surfs.push(surf);
        self.surfs.len() - 1
    }

    /// Appends a committed vertex.
    ///
    /// # Panics
    /// Panics if the vertex pool is full.
    #[inline]
    pub fn push_vertex(&mut self, vert: Vertex) -> usize {
        assert!(
            self.verts.len() < MAX_VERTICES,
            "render context vertex pool overflow"
        );
        self.verts.push(vert);
        self.verts.len() - 1
    }

    /// Appends a triangle index.
    ///
    /// # Panics
    /// Panics if the index pool is full.
    #[inline]
    pub fn push_index(&mut self, index: u32) {
        assert!(
            self.indices.len() < MAX_INDICES,
            "render context index pool overflow"
        );
        self.indices.push(index);
    }

    /// Appends a diagnostic parameter record.
    ///
    /// # Panics
    /// Panics if the diagnostic trail is full.
    #[inline]
    pub fn push_param(&mut self, param: ParamTrace) {
        assert!(
            self.params.len() < MAX_PARAMS,
            "render context parameter trail overflow"
        );
        self.params.push(param);
    }
}
