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

//! Triangle index generation.
//!
//! The hardware feeds triangle strips clockwise:
//!
//! ```text
//! 1----3----5
//! |\   |\   |
//! | \  | \  |
//! |  \ |  \ |
//! |   \|   \|
//! 0----2----4
//! ```
//!
//! This pass lowers each list to plain triangles with counter-clockwise
//! winding, and run-length merges adjacent surfaces whose pipeline state
//! is identical so they become a single draw. After it runs, a surface's
//! `first_vert`/`num_verts` range indexes the triangle index pool instead
//! of the vertex pool.

use katana_core::context::RenderContext;
use katana_core::regs::ListKind;

/// Lowers one list to merged, CCW-wound triangle indices.
pub fn generate(rc: &mut RenderContext, kind: ListKind) {
    let entries = std::mem::take(&mut rc.lists[kind.index()].surfs);
    let mut kept = Vec::with_capacity(entries.len());
    let mut merged = 0usize;

    let mut group_start = 0;
    while group_start < entries.len() {
        let root_index = entries[group_start];
        let root_params = rc.surfs[root_index].params;
        let first_index = rc.indices.len();

        // Emit the whole run of state-equal surfaces into one index range.
        let mut cursor = group_start;
        while cursor < entries.len() {
            let surf = rc.surfs[entries[cursor]];
            if cursor != group_start {
                if surf.params != root_params {
                    break;
                }
                merged += 1;
            }

            for triangle in 0..surf.num_verts.saturating_sub(2) {
                let strip_offset = surf.strip_offset + triangle;
                let vert = (surf.first_vert + triangle) as u32;
                // Odd strip positions already wind counter-clockwise; even
                // ones need their trailing corners swapped.
                if strip_offset & 1 == 1 {
                    rc.push_index(vert);
                    rc.push_index(vert + 1);
                    rc.push_index(vert + 2);
                } else {
                    rc.push_index(vert);
                    rc.push_index(vert + 2);
                    rc.push_index(vert + 1);
                }
            }
            cursor += 1;
        }

        let root = &mut rc.surfs[root_index];
        root.first_vert = first_index;
        root.num_verts = rc.indices.len() - first_index;
        kept.push(root_index);
        group_start = cursor;
    }

    if merged > 0 {
        log::trace!("merged {merged} surfaces in {kind:?}");
    }
    rc.lists[kind.index()].surfs = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use katana_core::context::{Surface, SurfaceParams, Vertex};

    fn push_strip(rc: &mut RenderContext, kind: ListKind, params: SurfaceParams, verts: usize) {
        let first_vert = rc.verts.len();
        for _ in 0..verts {
            rc.push_vertex(Vertex::default());
        }
        let index = rc.push_surface(Surface {
            params,
            first_vert,
            num_verts: verts,
            strip_offset: 0,
        });
        rc.list_mut(kind).surfs.push(index);
    }

    #[test]
    fn test_strip_lowers_to_alternating_windings() {
        let mut rc = RenderContext::new();
        push_strip(&mut rc, ListKind::Opaque, SurfaceParams::default(), 4);

        generate(&mut rc, ListKind::Opaque);

        assert_eq!(rc.indices, vec![0, 2, 1, 1, 2, 3]);
        let surf = rc.surfs[rc.list(ListKind::Opaque).surfs[0]];
        assert_eq!(surf.first_vert, 0);
        assert_eq!(surf.num_verts, 6);
    }

    #[test]
    fn test_adjacent_equal_state_surfaces_merge() {
        let mut rc = RenderContext::new();
        let params = SurfaceParams::default();
        push_strip(&mut rc, ListKind::Opaque, params, 3);
        push_strip(&mut rc, ListKind::Opaque, params, 4);

        generate(&mut rc, ListKind::Opaque);

        let list = rc.list(ListKind::Opaque);
        assert_eq!(list.surfs.len(), 1);
        let surf = rc.surfs[list.surfs[0]];
        assert_eq!(surf.num_verts, 9);
        assert_eq!(rc.indices.len(), 9);
        // Second strip's triangles index its own vertex range.
        assert_eq!(&rc.indices[3..], &[3, 5, 4, 4, 5, 6]);
    }

    #[test]
    fn test_state_change_breaks_the_run() {
        let mut rc = RenderContext::new();
        let opaque = SurfaceParams::default();
        let written = SurfaceParams {
            depth_write: true,
            ..SurfaceParams::default()
        };
        push_strip(&mut rc, ListKind::Opaque, opaque, 3);
        push_strip(&mut rc, ListKind::Opaque, written, 3);
        push_strip(&mut rc, ListKind::Opaque, written, 3);

        generate(&mut rc, ListKind::Opaque);

        let list = rc.list(ListKind::Opaque).surfs.clone();
        assert_eq!(list.len(), 2);
        assert_eq!(rc.surfs[list[0]].num_verts, 3);
        assert_eq!(rc.surfs[list[1]].num_verts, 6);
        // No adjacent pair with equal state survives.
        assert_ne!(rc.surfs[list[0]].params, rc.surfs[list[1]].params);
    }

    #[test]
    fn test_per_triangle_surfaces_preserve_strip_winding() {
        // Two overlapping single-triangle surfaces, as a translucent
        // commit produces them.
        let mut rc = RenderContext::new();
        for _ in 0..4 {
            rc.push_vertex(Vertex::default());
        }
        for triangle in 0..2 {
            let index = rc.push_surface(Surface {
                params: SurfaceParams::default(),
                first_vert: triangle,
                num_verts: 3,
                strip_offset: triangle,
            });
            rc.list_mut(ListKind::Translucent).surfs.push(index);
        }

        generate(&mut rc, ListKind::Translucent);

        // Triangle at strip offset 0 swaps its trailing corners; the one
        // at offset 1 does not.
        assert_eq!(rc.indices, vec![0, 2, 1, 1, 2, 3]);
        assert_eq!(rc.list(ListKind::Translucent).surfs.len(), 1);
    }
}
