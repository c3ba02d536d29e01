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

//! Memoized texture resolution.
//!
//! A surface that references a texture goes through the embedding cache:
//! a clean entry's handle is returned as-is; a dirty or missing one is
//! decoded from guest memory into the converter's scratch buffer and
//! uploaded through the backend, and the resulting handle plus sampler
//! state are written back into the entry.

use crate::convert::ConvertError;
use crate::translate;
use katana_core::backend::{RenderBackend, TextureDescriptor};
use katana_core::capture::TaContext;
use katana_core::regs::{TextureControlWord, TspWord};
use katana_core::texture::{
    top_mip_offset, TextureDecoder, TextureHandle, TextureKey, TextureLayout, TextureLookup,
};

/// Resolves `(tsp, tcw)` to a live backend texture handle.
///
/// # Errors
/// Propagates backend and decoder failures.
///
/// # Panics
/// Panics if a texture exceeds the decode scratch buffer or if a
/// mipmapped entry's source data ends before its top mip level; both
/// indicate corrupt cache contents.
pub fn resolve(
    ctx: &TaContext,
    backend: &mut dyn RenderBackend,
    textures: &mut dyn TextureLookup,
    decoder: &dyn TextureDecoder,
    scratch: &mut [u8],
    tsp: TspWord,
    tcw: TextureControlWord,
) -> Result<TextureHandle, ConvertError> {
    let entry = textures.find_texture(TextureKey { tsp, tcw });

    if let Some(handle) = entry.handle {
        if !entry.dirty {
            return Ok(handle);
        }
        // A dirty handle is stale guest data; drop it before re-uploading.
        backend.destroy_texture(handle)?;
        entry.handle = None;
    }

    let layout = TextureLayout::from_tcw(tcw);
    let mipmaps = tcw.mip_mapped() && !tcw.stride_select();
    let width = 8u32 << tsp.texture_u_size();
    let height = 8u32 << tsp.texture_v_size();
    let stride = if tcw.stride_select() {
        ctx.stride * 32
    } else {
        0
    };

    // Mipmapped textures store the chain smallest level first; skip to the
    // full-resolution level. Trilinear sampling is not carried, so the
    // smaller levels are never decoded.
    let src: &[u8] = if mipmaps {
        &entry.texture[top_mip_offset(layout, width)..]
    } else {
        &entry.texture
    };

    let decoded_len = (width * height * 4) as usize;
    assert!(
        decoded_len <= scratch.len(),
        "texture {width}x{height} exceeds the decode scratch buffer"
    );
    decoder.decode(
        src,
        width,
        height,
        stride,
        layout,
        tcw.pixel_fmt(),
        &entry.palette,
        ctx.palette_fmt,
        &mut scratch[..decoded_len],
    )?;

    let descriptor = TextureDescriptor {
        filter: translate::filter_mode(tsp.filter_mode()),
        wrap_u: translate::wrap_mode(tsp.clamp_u(), tsp.flip_u()),
        wrap_v: translate::wrap_mode(tsp.clamp_v(), tsp.flip_v()),
        mipmaps,
        width,
        height,
    };
    let handle = backend.create_texture(&descriptor, &scratch[..decoded_len])?;
    log::trace!(
        "uploaded texture {width}x{height} {layout:?} as {handle:?} (dirty replace: {})",
        entry.dirty
    );

    entry.handle = Some(handle);
    entry.dirty = false;
    entry.filter = descriptor.filter;
    entry.wrap_u = descriptor.wrap_u;
    entry.wrap_v = descriptor.wrap_v;
    entry.layout = layout;
    entry.width = width;
    entry.height = height;

    Ok(handle)
}
