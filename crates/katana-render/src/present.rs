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

//! Streams a finished render context to a backend.
//!
//! Lists draw in the hardware's fixed pass order: opaque, punch-through,
//! translucent. (Modifier volume lists carry no drawable surfaces.)

use katana_core::backend::{RenderBackend, SurfacePass};
use katana_core::context::RenderContext;
use katana_core::regs::ListKind;

const PASS_ORDER: [ListKind; 3] = [
    ListKind::Opaque,
    ListKind::PunchThrough,
    ListKind::Translucent,
];

/// Draws every surface of the context in pass order.
pub fn render(backend: &mut dyn RenderBackend, rc: &RenderContext) {
    render_until(backend, rc, None);
}

/// Draws surfaces in pass order, stopping after the surface with index
/// `end_surf` when one is given. Used by tracers to replay a context up
/// to a point of interest. The pass is always closed.
pub fn render_until(backend: &mut dyn RenderBackend, rc: &RenderContext, end_surf: Option<usize>) {
    backend.begin_surfaces(&SurfacePass {
        width: rc.width,
        height: rc.height,
        verts: &rc.verts,
        indices: &rc.indices,
    });

    'lists: for kind in PASS_ORDER {
        for &surf_index in &rc.lists[kind.index()].surfs {
            backend.draw_surface(&rc.surfs[surf_index]);
            if Some(surf_index) == end_surf {
                break 'lists;
            }
        }
    }

    backend.end_surfaces();
}
