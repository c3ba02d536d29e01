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

//! Back-to-front depth ordering of per-triangle surfaces.
//!
//! Translucent and punch-through lists are committed one surface per
//! triangle precisely so this pass can order them individually. Surfaces
//! sort ascending by the minimum depth of their three vertices; the sort
//! is a stable bottom-up merge so that equal-depth triangles keep their
//! submission order.

use katana_core::context::RenderContext;
use katana_core::regs::ListKind;

/// Reusable scratch for [`sort_list`], owned by the converter.
#[derive(Debug, Default)]
pub struct SortScratch {
    /// Per-surface minimum depth, indexed by surface index.
    minz: Vec<f32>,
    /// Merge buffer, same length as the list being sorted.
    tmp: Vec<usize>,
}

/// Stable-sorts a list's surfaces ascending by minimum vertex depth.
///
/// # Panics
/// Panics if any surface in the list is not a single triangle; only
/// per-triangle lists are sortable.
pub fn sort_list(rc: &mut RenderContext, kind: ListKind, scratch: &mut SortScratch) {
    scratch.minz.clear();
    scratch.minz.resize(rc.surfs.len(), 0.0);

    for &surf_index in &rc.lists[kind.index()].surfs {
        let surf = &rc.surfs[surf_index];
        assert_eq!(
            surf.num_verts, 3,
            "depth sort requires per-triangle surfaces"
        );
        let verts = &rc.verts[surf.first_vert..surf.first_vert + 3];
        scratch.minz[surf_index] = verts[0].xyz.z.min(verts[1].xyz.z).min(verts[2].xyz.z);
    }

    let list = &mut rc.lists[kind.index()];
    merge_sort_by_key(&mut list.surfs, &mut scratch.tmp, &scratch.minz);
    log::trace!(
        "depth sorted {} surfaces in {kind:?}",
        list.surfs.len()
    );
}

/// Bottom-up stable merge sort of `entries`, ordered by `key[entry]`.
fn merge_sort_by_key(entries: &mut [usize], tmp: &mut Vec<usize>, key: &[f32]) {
    let len = entries.len();
    tmp.clear();
    tmp.resize(len, 0);

    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(&entries[start..mid], &entries[mid..end], &mut tmp[start..end], key);
            start = end;
        }
        entries.copy_from_slice(tmp);
        width *= 2;
    }
}

fn merge(left: &[usize], right: &[usize], out: &mut [usize], key: &[f32]) {
    let (mut l, mut r) = (0, 0);
    for slot in out.iter_mut() {
        // Taking the left run on ties keeps the sort stable.
        let take_left =
            r >= right.len() || (l < left.len() && key[left[l]] <= key[right[r]]);
        if take_left {
            *slot = left[l];
            l += 1;
        } else {
            *slot = right[r];
            r += 1;
        }
    }
}
