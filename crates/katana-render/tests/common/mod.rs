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

//! Shared test doubles and stream-building helpers for the conversion
//! integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use katana_core::backend::{RenderBackend, SurfacePass, TextureDescriptor};
use katana_core::capture::TaContext;
use katana_core::context::Surface;
use katana_core::error::{DecodeError, ResourceError};
use katana_core::texture::{
    TextureCacheEntry, TextureDecoder, TextureHandle, TextureKey, TextureLayout, TextureLookup,
};

/// One recorded backend event.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    CreateTexture {
        descriptor: TextureDescriptor,
        data_len: usize,
    },
    DestroyTexture(TextureHandle),
    Begin {
        width: u32,
        height: u32,
        num_verts: usize,
        num_indices: usize,
    },
    Draw(Surface),
    End,
}

/// A backend double that records every call and vends sequential handles.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub events: Vec<BackendEvent>,
    next_handle: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BackendEvent::CreateTexture { .. }))
            .count()
    }

    pub fn draws(&self) -> Vec<Surface> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BackendEvent::Draw(surf) => Some(*surf),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureHandle, ResourceError> {
        self.next_handle += 1;
        self.events.push(BackendEvent::CreateTexture {
            descriptor: *descriptor,
            data_len: data.len(),
        });
        Ok(TextureHandle(self.next_handle))
    }

    fn destroy_texture(&mut self, handle: TextureHandle) -> Result<(), ResourceError> {
        self.events.push(BackendEvent::DestroyTexture(handle));
        Ok(())
    }

    fn begin_surfaces(&mut self, pass: &SurfacePass) {
        self.events.push(BackendEvent::Begin {
            width: pass.width,
            height: pass.height,
            num_verts: pass.verts.len(),
            num_indices: pass.indices.len(),
        });
    }

    fn draw_surface(&mut self, surf: &Surface) {
        self.events.push(BackendEvent::Draw(*surf));
    }

    fn end_surfaces(&mut self) {
        self.events.push(BackendEvent::End);
    }
}

/// An in-memory texture cache keyed like the real one.
#[derive(Debug, Default)]
pub struct MapTextureCache {
    pub entries: HashMap<TextureKey, TextureCacheEntry>,
}

impl MapTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds source data for a key so a conversion can decode it.
    pub fn seed(&mut self, key: TextureKey, texture: Vec<u8>) -> &mut TextureCacheEntry {
        let entry = self.entries.entry(key).or_default();
        entry.texture = texture;
        entry
    }
}

impl TextureLookup for MapTextureCache {
    fn find_texture(&mut self, key: TextureKey) -> &mut TextureCacheEntry {
        self.entries.entry(key).or_default()
    }
}

/// One recorded decoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeCall {
    pub src_len: usize,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub layout: TextureLayout,
    pub pixel_fmt: u32,
    pub palette_fmt: u32,
}

/// A decoder double that fills the output with a constant byte and
/// records what it was asked to do.
#[derive(Debug, Default)]
pub struct StubDecoder {
    pub calls: RefCell<Vec<DecodeCall>>,
}

impl TextureDecoder for StubDecoder {
    fn decode(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        stride: u32,
        layout: TextureLayout,
        pixel_fmt: u32,
        _palette: &[u8],
        palette_fmt: u32,
        dst: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.calls.borrow_mut().push(DecodeCall {
            src_len: src.len(),
            width,
            height,
            stride,
            layout,
            pixel_fmt,
            palette_fmt,
        });
        dst.fill(0xab);
        Ok(())
    }
}

// --- Parameter stream construction ---

pub const LIST_OPAQUE: u32 = 0;
pub const LIST_OPAQUE_MODVOL: u32 = 1;
pub const LIST_TRANSLUCENT: u32 = 2;
pub const LIST_PUNCH_THROUGH: u32 = 4;

/// Builds raw parameter streams word by word.
#[derive(Debug, Default)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    fn word(&mut self, word: u32) -> &mut Self {
        self.bytes.extend_from_slice(&word.to_le_bytes());
        self
    }

    fn float(&mut self, value: f32) -> &mut Self {
        self.word(value.to_bits())
    }

    fn pad(&mut self, words: usize) -> &mut Self {
        for _ in 0..words {
            self.word(0);
        }
        self
    }

    /// A packed-color polygon global parameter (poly type 0, vert type 0).
    pub fn poly0(&mut self, list: u32, isp: u32, tsp: u32, tcw: u32) -> &mut Self {
        self.word(4 << 24 | list << 16);
        self.word(isp).word(tsp).word(tcw);
        self.pad(4)
    }

    /// A textured packed-color polygon (poly type 0, vert type 3).
    pub fn poly0_textured(&mut self, list: u32, isp: u32, tsp: u32, tcw: u32) -> &mut Self {
        self.word(4 << 24 | list << 16 | 1 << 3);
        self.word(isp).word(tsp).word(tcw);
        self.pad(4)
    }

    /// A sprite global parameter (poly type 5).
    pub fn sprite_poly(
        &mut self,
        list: u32,
        isp: u32,
        tsp: u32,
        tcw: u32,
        base_color: u32,
        offset_color: u32,
    ) -> &mut Self {
        self.word(5 << 24 | list << 16);
        self.word(isp).word(tsp).word(tcw);
        self.word(base_color).word(offset_color);
        self.pad(2)
    }

    /// A type 0 vertex: position and packed base color.
    pub fn vert0(&mut self, xyz: [f32; 3], color: u32, end_of_strip: bool) -> &mut Self {
        self.word(7 << 24 | if end_of_strip { 1 << 28 } else { 0 });
        self.float(xyz[0]).float(xyz[1]).float(xyz[2]);
        self.pad(2);
        self.word(color);
        self.pad(1)
    }

    /// A sprite vertex: three full corners, the x/y of the fourth, and
    /// three packed 16-bit UV words.
    pub fn sprite_vert(
        &mut self,
        a: [f32; 3],
        b: [f32; 3],
        c: [f32; 3],
        d_xy: [f32; 2],
        uvs: [u32; 3],
        end_of_strip: bool,
    ) -> &mut Self {
        self.word(7 << 24 | if end_of_strip { 1 << 28 } else { 0 });
        for v in [a, b, c] {
            self.float(v[0]).float(v[1]).float(v[2]);
        }
        self.float(d_xy[0]).float(d_xy[1]);
        // The fourth corner's z slot stays unwritten.
        self.pad(1);
        for uv in uvs {
            self.word(uv);
        }
        self
    }

    /// A modifier volume vertex (64 bytes, skipped by the translator).
    pub fn modvol_vert(&mut self) -> &mut Self {
        self.word(7 << 24 | 1 << 28);
        self.pad(15)
    }

    pub fn end_of_list(&mut self) -> &mut Self {
        self.word(0);
        self.pad(7)
    }

    pub fn user_tile_clip(&mut self) -> &mut Self {
        self.word(1 << 24);
        self.pad(7)
    }

    pub fn obj_list_set(&mut self) -> &mut Self {
        self.word(2 << 24);
        self.pad(7)
    }
}

/// Packs a `(u, v)` float pair into a 16-bit UV stream word. Only the
/// high halves of the float bit patterns survive, as on hardware.
pub fn pack_uv16(u: f32, v: f32) -> u32 {
    (u.to_bits() & 0xffff_0000) | (v.to_bits() >> 16)
}

/// A context with an untextured background plane: three vertices at the
/// origin with the given packed color.
pub fn context_with_flat_background() -> TaContext {
    let mut bg = Vec::new();
    for _ in 0..3 {
        bg.extend_from_slice(&0f32.to_le_bytes());
        bg.extend_from_slice(&0f32.to_le_bytes());
        bg.extend_from_slice(&0f32.to_le_bytes());
        bg.extend_from_slice(&0xff10_2030u32.to_le_bytes());
    }
    TaContext {
        bg_vertices: bg,
        video_width: 640,
        video_height: 480,
        ..TaContext::default()
    }
}
