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

//! The abstract render backend interface.
//!
//! This trait is the seam between the translator and the host's graphics
//! API. The translator creates and destroys textures while resolving a
//! stream, and streams a finished [`crate::context::RenderContext`]
//! through a begin/draw/end surface pass. A concrete implementation
//! (OpenGL, wgpu, a recording double for tests) lives outside this
//! workspace.

use crate::context::{Surface, Vertex};
use crate::error::ResourceError;
use crate::state::{FilterMode, WrapMode};
use crate::texture::TextureHandle;

/// Everything needed to create a backend texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Sampler filter for both minification and magnification.
    pub filter: FilterMode,
    /// U axis wrap mode.
    pub wrap_u: WrapMode,
    /// V axis wrap mode.
    pub wrap_v: WrapMode,
    /// The source carries a mip chain the backend may use.
    pub mipmaps: bool,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

/// The geometry pools a surface pass draws from.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePass<'a> {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// The vertex pool referenced by surface index ranges.
    pub verts: &'a [Vertex],
    /// The triangle index pool referenced by surface index ranges.
    pub indices: &'a [u32],
}

/// The abstract interface a host render backend implements.
pub trait RenderBackend {
    /// Creates a texture from decoded RGBA8 `data`.
    ///
    /// # Errors
    /// Returns a [`ResourceError`] if the backend cannot create the
    /// resource.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureHandle, ResourceError>;

    /// Destroys a texture previously returned by
    /// [`RenderBackend::create_texture`].
    ///
    /// # Errors
    /// Returns a [`ResourceError`] if the handle is unknown.
    fn destroy_texture(&mut self, handle: TextureHandle) -> Result<(), ResourceError>;

    /// Begins a surface pass, binding the context's geometry pools.
    fn begin_surfaces(&mut self, pass: &SurfacePass);

    /// Draws one surface. Called only between `begin_surfaces` and
    /// `end_surfaces`, with index ranges into the bound pools.
    fn draw_surface(&mut self, surf: &Surface);

    /// Ends the surface pass.
    fn end_surfaces(&mut self);
}
