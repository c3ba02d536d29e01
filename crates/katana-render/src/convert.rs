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

//! The stream driver and parameter handlers.
//!
//! [`Converter::convert`] walks the captured parameter stream once, from
//! offset 0 to the end, dispatching on each parameter control word. Global
//! parameters open a staged surface; vertex parameters append staged
//! vertices and commit the surface when their end-of-strip bit is set.
//! Geometry the hardware computes implicitly (the background quad and the
//! fourth sprite corner) is synthesized here. After the walk, translucent
//! and punch-through lists are depth sorted (when the context asks for it)
//! and every list is lowered to triangle indices.

use crate::{index, sort, ta, texcache, translate};
use katana_core::capture::TaContext;
use katana_core::color::PackedRgba;
use katana_core::context::{ParamTrace, RenderContext, Surface, SurfaceParams, Vertex};
use katana_core::error::{DecodeError, ResourceError};
use katana_core::math::{Vec2, Vec3};
use katana_core::regs::{
    IspWord, ListKind, ParaType, ParamControlWord, TextureControlWord, TspWord,
};
use katana_core::state::{Blend, DepthFunc};
use katana_core::texture::{TextureDecoder, TextureHandle, TextureLookup};
use katana_core::RenderBackend;
use thiserror::Error;

/// Size of the decode scratch buffer: the largest texture the hardware
/// addresses, at four bytes per texel.
pub const TEXTURE_SCRATCH_BYTES: usize = 1024 * 1024 * 4;

/// A collaborator failure during conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The render backend failed a resource operation.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// The texture decoder rejected a texture.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Converts captured contexts into render contexts.
///
/// A converter owns the texture decode scratch and the sort scratch, so a
/// process that wants concurrent conversions simply creates one converter
/// per conversion in flight.
pub struct Converter {
    decode_scratch: Vec<u8>,
    staged_verts: Vec<Vertex>,
    sort_scratch: sort::SortScratch,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Creates a converter, allocating its scratch buffers.
    pub fn new() -> Self {
        Self {
            decode_scratch: vec![0; TEXTURE_SCRATCH_BYTES],
            staged_verts: Vec::new(),
            sort_scratch: sort::SortScratch::default(),
        }
    }

    /// Converts `ctx` into `rc`, resolving textures through `textures` and
    /// `decoder` and uploading them through `backend`.
    ///
    /// `rc` is reset first; on success it holds the complete frame. The
    /// caller streams it to a backend with [`crate::present::render`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] when the backend or the decoder fails.
    ///
    /// # Panics
    /// Panics on a malformed parameter stream; see the crate-level error
    /// policy.
    pub fn convert(
        &mut self,
        ctx: &TaContext,
        backend: &mut dyn RenderBackend,
        textures: &mut dyn TextureLookup,
        decoder: &dyn TextureDecoder,
        rc: &mut RenderContext,
    ) -> Result<(), ConvertError> {
        self.staged_verts.clear();
        let mut conversion = Conversion {
            ctx,
            rc,
            backend,
            textures,
            decoder,
            decode_scratch: &mut self.decode_scratch,
            staged_verts: &mut self.staged_verts,
            sort_scratch: &mut self.sort_scratch,
            last_pcw: None,
            list: None,
            vert_type: None,
            face_color: PackedRgba::TRANSPARENT,
            face_offset_color: PackedRgba::TRANSPARENT,
            sprite_color: PackedRgba::TRANSPARENT,
            sprite_offset_color: PackedRgba::TRANSPARENT,
            staged: None,
        };
        conversion.run()
    }
}

/// The transient state of one conversion.
struct Conversion<'a> {
    ctx: &'a TaContext,
    rc: &'a mut RenderContext,
    backend: &'a mut dyn RenderBackend,
    textures: &'a mut dyn TextureLookup,
    decoder: &'a dyn TextureDecoder,
    decode_scratch: &'a mut [u8],
    staged_verts: &'a mut Vec<Vertex>,
    sort_scratch: &'a mut sort::SortScratch,

    /// Control word of the last handled vertex parameter; its end-of-strip
    /// bit tells the next vertex whether a new strip began.
    last_pcw: Option<ParamControlWord>,
    /// List currently accepting surfaces.
    list: Option<ListKind>,
    /// Vertex encoding established by the last global parameter.
    vert_type: Option<u8>,

    face_color: PackedRgba,
    face_offset_color: PackedRgba,
    sprite_color: PackedRgba,
    sprite_offset_color: PackedRgba,

    /// Surface being built for the strip in progress.
    staged: Option<Surface>,
}

impl<'a> Conversion<'a> {
    fn run(&mut self) -> Result<(), ConvertError> {
        self.rc.reset();
        self.rc.width = self.ctx.video_width;
        self.rc.height = self.ctx.video_height;

        self.parse_background()?;

        let len = self.ctx.size();
        let mut offset = 0;
        while offset < len {
            assert!(offset + 4 <= len, "truncated control word at offset {offset}");
            let pcw = ParamControlWord(read_u32(&self.ctx.params, offset));

            if ta::list_type_adoptable(pcw, self.list) {
                self.list = pcw.list_type();
            }

            let para = pcw.para_type().unwrap_or_else(|| {
                panic!(
                    "reserved parameter type {} at offset {offset}",
                    pcw.para_type_raw()
                )
            });
            match para {
                ParaType::EndOfList => self.handle_end_of_list(),
                ParaType::UserTileClip => {}
                ParaType::ObjListSet => {
                    panic!("OBJ_LIST_SET at offset {offset}: mid-stream reconfiguration is not supported")
                }
                ParaType::PolyOrVol | ParaType::Sprite => self.handle_poly_param(offset)?,
                ParaType::Vertex => self.handle_vert_param(offset),
            }

            self.rc.push_param(ParamTrace {
                offset,
                list: self.list,
                vert_type: self.vert_type,
                last_surf: self.rc.surfs.len().checked_sub(1),
                last_vert: self.rc.verts.len().checked_sub(1),
            });

            let size = ta::param_size(pcw, self.vert_type);
            assert!(offset + size <= len, "truncated parameter at offset {offset}");
            offset += size;
        }

        if self.ctx.autosort {
            sort::sort_list(self.rc, ListKind::Translucent, self.sort_scratch);
            sort::sort_list(self.rc, ListKind::PunchThrough, self.sort_scratch);
        }

        for kind in ListKind::ALL {
            index::generate(self.rc, kind);
        }

        Ok(())
    }

    /// Synthesizes the opaque background quad from the latched background
    /// registers. Three vertices are supplied; the fourth is the
    /// parallelogram completion, with colors copied from the first.
    fn parse_background(&mut self) -> Result<(), ConvertError> {
        self.list = Some(ListKind::Opaque);
        let isp = self.ctx.bg_isp;

        let params = SurfaceParams {
            texture: if isp.texture() {
                Some(self.resolve_texture(self.ctx.bg_tsp, self.ctx.bg_tcw)?)
            } else {
                None
            },
            depth_write: !isp.z_write_disable(),
            depth_func: translate::depth_func(isp.depth_compare_mode()),
            cull: translate::cull_face(isp.culling_mode()),
            blend: None,
            ..SurfaceParams::default()
        };
        self.staged = Some(Surface {
            params,
            ..Surface::default()
        });
        self.staged_verts.clear();

        let mut offset = 0;
        let mut verts = [Vertex::default(); 4];
        for vert in verts.iter_mut().take(3) {
            offset = self.parse_background_vertex(offset, vert);
        }

        // The hardware only stores three corners of the plane; the strip's
        // final corner continues the parallelogram.
        let [va, vb, vc, _] = verts;
        verts[3].xyz = vb.xyz + (vb.xyz - va.xyz) + (vc.xyz - va.xyz);
        verts[3].uv = vb.uv + (vb.uv - va.uv) + (vc.uv - va.uv);
        verts[3].color = va.color;
        verts[3].offset_color = va.offset_color;

        for vert in verts {
            self.stage_vertex(vert);
        }
        self.commit_surface();

        self.list = None;
        Ok(())
    }

    /// Reads one tightly packed background vertex, returning the offset
    /// past it. UV presence follows the background ISP's texture flag,
    /// offset-color presence its offset flag.
    fn parse_background_vertex(&self, mut offset: usize, vert: &mut Vertex) -> usize {
        let data = &self.ctx.bg_vertices;
        vert.xyz = read_vec3(data, offset);
        offset += 12;

        if self.ctx.bg_isp.texture() {
            vert.uv = Vec2::new(read_f32(data, offset), read_f32(data, offset + 4));
            offset += 8;
        }

        vert.color = PackedRgba::from_argb(read_u32(data, offset));
        offset += 4;

        if self.ctx.bg_isp.offset() {
            vert.offset_color = PackedRgba::from_argb(read_u32(data, offset));
            offset += 4;
        }

        offset
    }

    /// Handles a global (polygon or sprite) parameter: latches face or
    /// sprite colors and opens a staged surface translated from the
    /// ISP/TSP words.
    fn handle_poly_param(&mut self, offset: usize) -> Result<(), ConvertError> {
        let data = &self.ctx.params[offset..];
        let pcw = ParamControlWord(read_u32(data, 0));

        self.last_pcw = None;
        self.vert_type = Some(ta::vert_type(pcw));

        let poly_type = ta::poly_type(pcw);
        if poly_type == 6 {
            log::debug!("skipping modifier volume global parameter at offset {offset}");
            return Ok(());
        }

        match poly_type {
            0 => {}
            1 => {
                self.face_color = read_float_color(data, 16);
            }
            2 => {
                self.face_color = read_float_color(data, 32);
                self.face_offset_color = read_float_color(data, 48);
            }
            5 => {
                self.sprite_color = PackedRgba::from_argb(read_u32(data, 16));
                self.sprite_offset_color = PackedRgba::from_argb(read_u32(data, 20));
            }
            other => panic!("unsupported polygon type {other} at offset {offset}"),
        }

        let isp = IspWord(read_u32(data, 4));
        let tsp = TspWord(read_u32(data, 8));
        let tcw = TextureControlWord(read_u32(data, 12));
        let list = self
            .list
            .unwrap_or_else(|| panic!("global parameter at offset {offset} without a valid list"));

        // Bits 0-3 of the control word override the matching ISP/TSP bits,
        // so texture and offset presence come from the control word here.
        let mut params = SurfaceParams {
            texture: None,
            depth_write: !isp.z_write_disable(),
            depth_func: translate::depth_func(isp.depth_compare_mode()),
            cull: translate::cull_face(isp.culling_mode()),
            blend: Some(Blend {
                src: translate::src_blend_factor(tsp.src_alpha_instr()),
                dst: translate::dst_blend_factor(tsp.dst_alpha_instr()),
            }),
            shade: translate::shade_mode(tsp.texture_shading_instr()),
            ignore_alpha: !tsp.use_alpha(),
            ignore_texture_alpha: tsp.ignore_tex_alpha(),
            offset_color: pcw.offset(),
            alpha_test: false,
            alpha_ref: 0,
        };

        // List-based overrides; later rules win.
        if !list.is_translucent() {
            params.blend = None;
        } else if self.ctx.autosort {
            params.depth_func = DepthFunc::LessEqual;
        }
        if list == ListKind::PunchThrough {
            params.alpha_test = true;
            params.alpha_ref = self.ctx.alpha_ref;
            params.depth_func = DepthFunc::GreaterEqual;
        }

        if pcw.texture() {
            params.texture = Some(self.resolve_texture(tsp, tcw)?);
        }

        self.staged = Some(Surface {
            params,
            ..Surface::default()
        });
        self.staged_verts.clear();
        Ok(())
    }

    /// Handles a vertex parameter: decodes one of the twelve vertex
    /// encodings, manages strip boundaries, and commits the staged surface
    /// on end-of-strip.
    fn handle_vert_param(&mut self, offset: usize) {
        let data = &self.ctx.params[offset..];
        let pcw = ParamControlWord(read_u32(data, 0));
        let vert_type = self
            .vert_type
            .unwrap_or_else(|| panic!("vertex parameter at offset {offset} before any global parameter"));

        if vert_type == 17 {
            log::debug!("skipping modifier volume vertex at offset {offset}");
            return;
        }

        // A vertex after an end-of-strip vertex starts a new strip that
        // inherits the previous surface's state wholesale.
        if self.last_pcw.is_some_and(ParamControlWord::end_of_strip) {
            self.reserve_inherited_surface();
        }
        self.last_pcw = Some(pcw);

        match vert_type {
            0..=8 => {
                let vert = self.decode_strip_vertex(vert_type, data);
                self.stage_vertex(vert);
            }
            15 | 16 => {
                if !self.synthesize_sprite(pcw, data) {
                    return;
                }
            }
            other => panic!("unsupported vertex type {other} at offset {offset}"),
        }

        if pcw.end_of_strip() {
            self.commit_surface();
        }
    }

    /// Decodes a strip vertex of types 0 through 8.
    fn decode_strip_vertex(&self, vert_type: u8, data: &[u8]) -> Vertex {
        let mut vert = Vertex {
            xyz: read_vec3(data, 4),
            ..Vertex::default()
        };
        match vert_type {
            0 => {
                vert.color = PackedRgba::from_argb(read_u32(data, 24));
            }
            1 => {
                vert.color = read_float_color(data, 16);
            }
            2 => {
                vert.color = PackedRgba::from_intensity(self.face_color, read_f32(data, 24));
            }
            3 => {
                vert.uv = Vec2::new(read_f32(data, 16), read_f32(data, 20));
                vert.color = PackedRgba::from_argb(read_u32(data, 24));
                vert.offset_color = PackedRgba::from_argb(read_u32(data, 28));
            }
            4 => {
                vert.uv = decode_uv16(read_u32(data, 16));
                vert.color = PackedRgba::from_argb(read_u32(data, 24));
                vert.offset_color = PackedRgba::from_argb(read_u32(data, 28));
            }
            5 => {
                vert.uv = Vec2::new(read_f32(data, 16), read_f32(data, 20));
                vert.color = read_float_color(data, 32);
                vert.offset_color = read_float_color(data, 48);
            }
            6 => {
                vert.uv = decode_uv16(read_u32(data, 16));
                vert.color = read_float_color(data, 32);
                vert.offset_color = read_float_color(data, 48);
            }
            7 => {
                vert.uv = Vec2::new(read_f32(data, 16), read_f32(data, 20));
                vert.color = PackedRgba::from_intensity(self.face_color, read_f32(data, 24));
                vert.offset_color =
                    PackedRgba::from_intensity(self.face_offset_color, read_f32(data, 28));
            }
            8 => {
                vert.uv = decode_uv16(read_u32(data, 16));
                vert.color = PackedRgba::from_intensity(self.face_color, read_f32(data, 24));
                vert.offset_color =
                    PackedRgba::from_intensity(self.face_offset_color, read_f32(data, 28));
            }
            _ => unreachable!("caller dispatches only strip vertex types"),
        }
        vert
    }

    /// Synthesizes the four vertices of a sprite quad.
    ///
    /// The stream supplies three complete corners clockwise plus the x/y
    /// of the fourth; z comes from the plane fit of the three, UV from
    /// parallelogram completion. Returns `false` (emitting nothing) when
    /// the quad is degenerate or edge-on to the view.
    fn synthesize_sprite(&mut self, pcw: ParamControlWord, data: &[u8]) -> bool {
        assert!(
            pcw.end_of_strip(),
            "sprite vertex without its end-of-strip bit"
        );

        // Four full corner slots precede the UV words; the fourth corner's
        // z slot is carried in the stream but never written by the front
        // end.
        let a_xyz = read_vec3(data, 4);
        let b_xyz = read_vec3(data, 16);
        let c_xyz = read_vec3(data, 28);
        let d_x = read_f32(data, 40);
        let d_y = read_f32(data, 44);
        let a_uv = decode_uv16(read_u32(data, 52));
        let b_uv = decode_uv16(read_u32(data, 56));
        let c_uv = decode_uv16(read_u32(data, 60));

        // Fit the sprite's plane to the three complete corners.
        let normal = (a_xyz - b_xyz).cross(c_xyz - b_xyz);
        if normal.length() == 0.0 || normal.z == 0.0 {
            log::warn!("dropping degenerate sprite quad");
            return false;
        }
        let d = normal.dot(b_xyz);
        let d_z = (d - normal.x * d_x - normal.y * d_y) / normal.z;
        let d_xyz = Vec3::new(d_x, d_y, d_z);
        let d_uv = b_uv + (a_uv - b_uv) + (c_uv - b_uv);

        // Emit as a strip: bottom-left, top-left, bottom-right, top-right.
        for (xyz, uv) in [
            (a_xyz, a_uv),
            (b_xyz, b_uv),
            (d_xyz, d_uv),
            (c_xyz, c_uv),
        ] {
            self.stage_vertex(Vertex {
                xyz,
                uv,
                color: self.sprite_color,
                offset_color: self.sprite_offset_color,
            });
        }
        true
    }

    /// Replaces the staged surface with a copy of the most recently
    /// committed surface's state, ready for a new vertex range. This is
    /// how consecutive strips sharing global state become separate
    /// surfaces.
    fn reserve_inherited_surface(&mut self) {
        let prev = self
            .rc
            .surfs
            .last()
            .expect("strip continuation without a committed surface");
        self.staged = Some(Surface {
            params: prev.params,
            ..Surface::default()
        });
        self.staged_verts.clear();
    }

    /// Appends a vertex to the staged strip.
    fn stage_vertex(&mut self, vert: Vertex) {
        assert!(
            self.staged.is_some(),
            "vertex outside of an open polygon or sprite"
        );
        self.staged_verts.push(vert);
    }

    /// Commits the staged surface and its vertices to the active list.
    ///
    /// Opaque lists take the strip as one surface. Translucent and
    /// punch-through lists are split into one surface per triangle, over
    /// overlapping vertex ranges, so they can be depth sorted
    /// individually.
    fn commit_surface(&mut self) {
        let list = self.list.expect("commit without an active list");
        let mut staged = self.staged.take().expect("commit without a staged surface");

        let first_vert = self.rc.verts.len();
        let num_verts = self.staged_verts.len();
        for vert in self.staged_verts.drain(..) {
            self.rc.push_vertex(vert);
        }
        staged.first_vert = first_vert;
        staged.num_verts = num_verts;

        if list.sorts_per_triangle() {
            for triangle in 0..num_verts.saturating_sub(2) {
                let surf = Surface {
                    strip_offset: triangle,
                    first_vert: first_vert + triangle,
                    num_verts: 3,
                    ..staged
                };
                let index = self.rc.push_surface(surf);
                self.rc.list_mut(list).surfs.push(index);
            }
        } else {
            let index = self.rc.push_surface(staged);
            self.rc.list_mut(list).surfs.push(index);
        }

        self.rc.list_mut(list).num_orig_surfs += 1;
    }

    /// Clears strip state at an end-of-list marker.
    fn handle_end_of_list(&mut self) {
        self.last_pcw = None;
        self.list = None;
        self.vert_type = None;
    }

    fn resolve_texture(
        &mut self,
        tsp: TspWord,
        tcw: TextureControlWord,
    ) -> Result<TextureHandle, ConvertError> {
        texcache::resolve(
            self.ctx,
            self.backend,
            self.textures,
            self.decoder,
            self.decode_scratch,
            tsp,
            tcw,
        )
    }
}

/// Decodes a 16-bit UV pair packed into one stream word.
///
/// Each half becomes the high bits of an IEEE-754 float word, low bits
/// zero; the first (low) half is V and the second (high) half is U.
#[inline]
pub fn decode_uv16(word: u32) -> Vec2 {
    Vec2::new(
        f32::from_bits(word & 0xffff_0000),
        f32::from_bits(word << 16),
    )
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    bytemuck::pod_read_unaligned(&data[offset..offset + 4])
}

#[inline]
fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(data, offset))
}

#[inline]
fn read_vec3(data: &[u8], offset: usize) -> Vec3 {
    Vec3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

/// Reads a float color stored as four words in alpha, red, green, blue
/// order, saturating to packed bytes.
#[inline]
fn read_float_color(data: &[u8], offset: usize) -> PackedRgba {
    PackedRgba::from_floats(
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
        read_f32(data, offset + 12),
        read_f32(data, offset),
    )
}
