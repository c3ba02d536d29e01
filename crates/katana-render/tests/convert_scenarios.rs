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

//! End-to-end conversion scenarios over hand-built parameter streams.

mod common;

use common::{
    context_with_flat_background, pack_uv16, MapTextureCache, RecordingBackend, StreamBuilder,
    StubDecoder, LIST_OPAQUE, LIST_OPAQUE_MODVOL, LIST_TRANSLUCENT,
};
use katana_core::capture::TaContext;
use katana_core::color::PackedRgba;
use katana_core::context::RenderContext;
use katana_core::regs::ListKind;
use katana_core::state::{Blend, BlendFactor, DepthFunc};
use katana_render::Converter;

const ISP_DEPTH_GREATER: u32 = 1 << 29;

fn run(ctx: &TaContext) -> RenderContext {
    let mut backend = RecordingBackend::new();
    let mut cache = MapTextureCache::new();
    let decoder = StubDecoder::default();
    let mut rc = RenderContext::new();
    Converter::new()
        .convert(ctx, &mut backend, &mut cache, &decoder, &mut rc)
        .expect("conversion failed");
    rc
}

/// Checks the structural invariants every converted context satisfies.
fn check_invariants(rc: &RenderContext) {
    let mut total_indices = 0;
    for kind in ListKind::ALL {
        let list = rc.list(kind);
        for &surf_index in &list.surfs {
            let surf = &rc.surfs[surf_index];
            assert_eq!(surf.num_verts % 3, 0, "index ranges are whole triangles");
            assert!(surf.first_vert + surf.num_verts <= rc.indices.len());
            total_indices += surf.num_verts;
        }
        for pair in list.surfs.windows(2) {
            assert_ne!(
                rc.surfs[pair[0]].params,
                rc.surfs[pair[1]].params,
                "adjacent surfaces with equal state must have merged"
            );
        }
    }
    assert_eq!(total_indices, rc.indices.len());
    for &index in &rc.indices {
        assert!((index as usize) < rc.verts.len());
    }
}

#[test]
fn test_empty_stream_synthesizes_background_quad() {
    let ctx = context_with_flat_background();
    let rc = run(&ctx);

    assert_eq!(rc.surfs.len(), 1);
    assert_eq!(rc.verts.len(), 4);
    assert_eq!(rc.indices.len(), 6);
    assert_eq!(rc.list(ListKind::Opaque).surfs.len(), 1);
    for kind in [
        ListKind::OpaqueModVol,
        ListKind::Translucent,
        ListKind::TranslucentModVol,
        ListKind::PunchThrough,
    ] {
        assert!(rc.list(kind).surfs.is_empty());
    }

    // Three coincident corners complete to a coincident fourth, all with
    // the first corner's color.
    let expected = PackedRgba::from_argb(0xff10_2030);
    for vert in &rc.verts {
        assert_eq!(vert.xyz.x, 0.0);
        assert_eq!(vert.xyz.y, 0.0);
        assert_eq!(vert.xyz.z, 0.0);
        assert_eq!(vert.color, expected);
    }

    let bg = &rc.surfs[0];
    assert!(bg.params.blend.is_none());
    assert!(bg.params.texture.is_none());
    assert_eq!((rc.width, rc.height), (640, 480));
    check_invariants(&rc);
}

#[test]
fn test_single_opaque_strip() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.poly0(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0);
    let colors = [0x1122_3344u32, 0x2233_4455, 0x3344_5566, 0x4433_2211];
    stream.vert0([0.0, 0.0, 1.0], colors[0], false);
    stream.vert0([1.0, 0.0, 1.0], colors[1], false);
    stream.vert0([0.0, 1.0, 1.0], colors[2], false);
    stream.vert0([1.0, 1.0, 1.0], colors[3], true);
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    // Background plus the strip, which does not merge with it.
    let opaque = rc.list(ListKind::Opaque);
    assert_eq!(opaque.surfs.len(), 2);
    assert_eq!(opaque.num_orig_surfs, 2);

    let strip = &rc.surfs[opaque.surfs[1]];
    assert_eq!(strip.params.depth_func, DepthFunc::Greater);
    assert!(strip.params.depth_write);
    assert!(strip.params.blend.is_none(), "opaque surfaces never blend");
    assert!(strip.params.ignore_alpha);

    // The strip's four vertices follow the background's.
    for (i, &color) in colors.iter().enumerate() {
        assert_eq!(rc.verts[4 + i].color, PackedRgba::from_argb(color));
    }

    // Two triangles, CCW alternation starting with a corner swap.
    assert_eq!(strip.first_vert, 6);
    assert_eq!(strip.num_verts, 6);
    assert_eq!(&rc.indices[6..], &[4, 6, 5, 5, 6, 7]);
    check_invariants(&rc);
}

#[test]
fn test_translucent_strip_sorts_back_to_front() {
    let mut ctx = context_with_flat_background();
    ctx.autosort = true;

    // use_alpha, src blend 4 (src alpha), dst blend 5 (one minus src alpha)
    let tsp = 4 << 29 | 5 << 26 | 1 << 20;
    let mut stream = StreamBuilder::new();
    stream.poly0(LIST_TRANSLUCENT, ISP_DEPTH_GREATER, tsp, 0);
    stream.vert0([0.0, 0.0, 5.0], 0x8000_0000, false);
    stream.vert0([1.0, 0.0, 5.0], 0x8000_0000, false);
    stream.vert0([0.0, 1.0, 5.0], 0x8000_0000, false);
    stream.vert0([1.0, 1.0, 1.0], 0x8000_0000, true);
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    // One strip committed as two per-triangle surfaces, re-merged into a
    // single draw after sorting.
    let translucent = rc.list(ListKind::Translucent);
    assert_eq!(translucent.num_orig_surfs, 1);
    assert_eq!(translucent.surfs.len(), 1);

    let surf = &rc.surfs[translucent.surfs[0]];
    assert_eq!(
        surf.params.depth_func,
        DepthFunc::LessEqual,
        "autosort forces the depth test"
    );
    assert_eq!(
        surf.params.blend,
        Some(Blend {
            src: BlendFactor::SrcAlpha,
            dst: BlendFactor::OneMinusSrcAlpha,
        })
    );

    // The far triangle (min z 1) comes first: back to front is ascending
    // z in this coordinate system. Strip vertices start at index 4.
    assert_eq!(surf.num_verts, 6);
    assert_eq!(&rc.indices[6..], &[5, 6, 7, 4, 6, 5]);
    check_invariants(&rc);
}

#[test]
fn test_sprite_synthesizes_fourth_corner() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.sprite_poly(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0, 0xffff_0000, 0xff00_ff00);
    stream.sprite_vert(
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 0.0],
        [pack_uv16(0.0, 0.0), pack_uv16(0.0, 1.0), pack_uv16(1.0, 1.0)],
        true,
    );
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    let opaque = rc.list(ListKind::Opaque);
    assert_eq!(opaque.surfs.len(), 2);
    let sprite = &rc.surfs[opaque.surfs[1]];
    assert_eq!(sprite.num_verts, 6);

    // Emitted as bottom-left, top-left, bottom-right, top-right, with the
    // missing corner on the quad's plane (z = 1 everywhere).
    let corners: Vec<_> = rc.verts[4..8]
        .iter()
        .map(|v| (v.xyz.x, v.xyz.y, v.xyz.z))
        .collect();
    assert_eq!(
        corners,
        vec![
            (0.0, 0.0, 1.0),
            (0.0, 1.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
        ]
    );

    // The synthesized corner's UV continues the parallelogram.
    let bottom_right = &rc.verts[6];
    assert_eq!((bottom_right.uv.x, bottom_right.uv.y), (1.0, 0.0));

    let color = PackedRgba::from_argb(0xffff_0000);
    let offset = PackedRgba::from_argb(0xff00_ff00);
    for vert in &rc.verts[4..8] {
        assert_eq!(vert.color, color);
        assert_eq!(vert.offset_color, offset);
    }
    check_invariants(&rc);
}

#[test]
fn test_degenerate_sprites_emit_nothing() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    // Collinear corners: no plane to fit.
    stream.sprite_poly(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0, 0xffff_ffff, 0);
    stream.sprite_vert(
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [2.0, 0.0, 1.0],
        [3.0, 0.0],
        [0, 0, 0],
        true,
    );
    // Edge-on quad: the plane never crosses the view ray.
    stream.sprite_poly(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0, 0xffff_ffff, 0);
    stream.sprite_vert(
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [0.0, 0.0],
        [0, 0, 0],
        true,
    );
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    // Only the background survives; the dropped sprites leave no
    // vertices behind either.
    assert_eq!(rc.surfs.len(), 1);
    assert_eq!(rc.verts.len(), 4);
    assert_eq!(rc.list(ListKind::Opaque).surfs.len(), 1);
    assert_eq!(rc.list(ListKind::Opaque).num_orig_surfs, 1);
    check_invariants(&rc);
}

#[test]
fn test_back_to_back_strips_share_state_and_merge() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.poly0(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0);
    stream.vert0([0.0, 0.0, 1.0], 0xff00_0000, false);
    stream.vert0([1.0, 0.0, 1.0], 0xff00_0000, false);
    stream.vert0([0.0, 1.0, 1.0], 0xff00_0000, true);
    // No new global parameter: the next strip inherits the state.
    stream.vert0([4.0, 0.0, 1.0], 0xff00_0000, false);
    stream.vert0([5.0, 0.0, 1.0], 0xff00_0000, false);
    stream.vert0([4.0, 1.0, 1.0], 0xff00_0000, true);
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    let opaque = rc.list(ListKind::Opaque);
    assert_eq!(opaque.num_orig_surfs, 3, "background plus two strips");
    assert_eq!(opaque.surfs.len(), 2, "the twin strips merge");

    let merged = &rc.surfs[opaque.surfs[1]];
    assert_eq!(merged.num_verts, 6, "one triangle from each strip");
    assert_eq!(&rc.indices[6..], &[4, 6, 5, 7, 9, 8]);
    check_invariants(&rc);
}

#[test]
fn test_modifier_volumes_are_skipped() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.poly0(LIST_OPAQUE_MODVOL, 0, 0, 0);
    stream.modvol_vert();
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    assert_eq!(rc.surfs.len(), 1, "only the background");
    assert!(rc.list(ListKind::OpaqueModVol).surfs.is_empty());
    assert_eq!(rc.params.len(), 3, "skipped parameters still leave a trail");
    check_invariants(&rc);
}

#[test]
fn test_user_tile_clip_is_ignored() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.user_tile_clip();
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);
    assert_eq!(rc.surfs.len(), 1);
    assert_eq!(rc.params.len(), 2);
}

#[test]
fn test_diagnostic_trail_records_every_parameter() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.poly0(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0);
    stream.vert0([0.0, 0.0, 1.0], 0, false);
    stream.vert0([1.0, 0.0, 1.0], 0, false);
    stream.vert0([0.0, 1.0, 1.0], 0, true);
    stream.end_of_list();
    ctx.params = stream.build();

    let rc = run(&ctx);

    assert_eq!(rc.params.len(), 5);
    let offsets: Vec<_> = rc.params.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0, 32, 64, 96, 128]);

    // While the strip is open the trail carries its list and vertex type.
    assert_eq!(rc.params[0].list, Some(ListKind::Opaque));
    assert_eq!(rc.params[0].vert_type, Some(0));
    // The end-of-list marker clears both.
    assert_eq!(rc.params[4].list, None);
    assert_eq!(rc.params[4].vert_type, None);
    // The strip's surface exists only once its last vertex committed it.
    assert_eq!(rc.params[2].last_surf, Some(0));
    assert_eq!(rc.params[3].last_surf, Some(1));
}

#[test]
fn test_converters_are_independent() {
    let ctx_a = {
        let mut ctx = context_with_flat_background();
        let mut stream = StreamBuilder::new();
        stream.poly0(LIST_OPAQUE, ISP_DEPTH_GREATER, 0, 0);
        stream.vert0([0.0, 0.0, 1.0], 0, false);
        stream.vert0([1.0, 0.0, 1.0], 0, false);
        stream.vert0([0.0, 1.0, 1.0], 0, true);
        stream.end_of_list();
        ctx.params = stream.build();
        ctx
    };
    let ctx_b = context_with_flat_background();

    let rc_a = run(&ctx_a);
    let rc_b = run(&ctx_b);

    assert_eq!(rc_a.surfs.len(), 2);
    assert_eq!(rc_b.surfs.len(), 1);

    // A converter is reusable: a second conversion starts clean.
    let mut converter = Converter::new();
    let mut backend = RecordingBackend::new();
    let mut cache = MapTextureCache::new();
    let decoder = StubDecoder::default();
    let mut rc = RenderContext::new();
    converter
        .convert(&ctx_a, &mut backend, &mut cache, &decoder, &mut rc)
        .expect("first conversion");
    converter
        .convert(&ctx_b, &mut backend, &mut cache, &decoder, &mut rc)
        .expect("second conversion");
    assert_eq!(rc.surfs.len(), 1);
    assert_eq!(rc.verts.len(), 4);
}

#[test]
#[should_panic(expected = "OBJ_LIST_SET")]
fn test_obj_list_set_is_fatal() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.obj_list_set();
    ctx.params = stream.build();
    run(&ctx);
}

#[test]
#[should_panic(expected = "end-of-strip")]
fn test_sprite_without_end_of_strip_is_fatal() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.sprite_poly(LIST_OPAQUE, 0, 0, 0, 0, 0);
    stream.sprite_vert(
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 0.0],
        [0, 0, 0],
        false,
    );
    ctx.params = stream.build();
    run(&ctx);
}

#[test]
#[should_panic(expected = "before any global parameter")]
fn test_vertex_before_global_parameter_is_fatal() {
    let mut ctx = context_with_flat_background();
    let mut stream = StreamBuilder::new();
    stream.vert0([0.0, 0.0, 1.0], 0, true);
    ctx.params = stream.build();
    run(&ctx);
}

#[test]
#[should_panic(expected = "unsupported polygon type")]
fn test_two_volume_polygons_are_fatal() {
    let mut ctx = context_with_flat_background();
    // A volume flag on a non-modifier list selects the unsupported
    // two-volume encodings.
    let mut params = (4u32 << 24 | 1 << 6).to_le_bytes().to_vec();
    params.extend_from_slice(&[0u8; 28]);
    ctx.params = params;
    run(&ctx);
}
