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

//! The tile-accelerator front-end contract.
//!
//! The parameter stream is self-describing: the control word alone decides
//! which of the five polygon encodings and twelve vertex encodings follows,
//! and how many bytes the parameter occupies. This module is the single
//! place those rules live.

use katana_core::regs::{ListKind, ParaType, ParamControlWord};

/// Polygon parameter sub-type carried by a global parameter.
///
/// - 0: no extra payload
/// - 1: float face color
/// - 2: float face color and face offset color
/// - 3/4: two-volume encodings (unsupported downstream)
/// - 5: sprite (packed sprite color and offset color)
/// - 6: modifier volume (skipped downstream)
pub fn poly_type(pcw: ParamControlWord) -> u32 {
    if pcw.list_type().is_some_and(ListKind::is_mod_vol) {
        return 6;
    }
    if pcw.para_type() == Some(ParaType::Sprite) {
        return 5;
    }
    if pcw.volume() {
        return if pcw.col_type() == 2 { 4 } else { 3 };
    }
    match pcw.col_type() {
        // Intensity mode 1 carries a face color; with the offset flag it
        // carries the face offset color as well.
        2 if pcw.offset() => 2,
        2 => 1,
        // Packed, float, and intensity mode 2 (face color reused from the
        // previous object) need no extra payload.
        _ => 0,
    }
}

/// Vertex parameter sub-type that vertices of the current object use.
pub fn vert_type(pcw: ParamControlWord) -> u8 {
    if pcw.list_type().is_some_and(ListKind::is_mod_vol) {
        return 17;
    }
    if pcw.para_type() == Some(ParaType::Sprite) {
        return if pcw.texture() { 16 } else { 15 };
    }
    if pcw.texture() {
        let base = match pcw.col_type() {
            0 => 3,
            1 => 5,
            _ => 7,
        };
        base + if pcw.uv_16bit() { 1 } else { 0 }
    } else {
        match pcw.col_type() {
            0 => 0,
            1 => 1,
            _ => 2,
        }
    }
}

/// Byte stride of the parameter that starts with `pcw`.
///
/// Vertex parameter strides depend on the vertex type established by the
/// preceding global parameter, which the stream driver threads through.
///
/// # Panics
/// Panics on a vertex parameter before any global parameter establishes a
/// vertex type.
pub fn param_size(pcw: ParamControlWord, vert_type: Option<u8>) -> usize {
    match pcw.para_type() {
        Some(ParaType::Vertex) => {
            let vt = vert_type.expect("vertex parameter before any global parameter");
            match vt {
                5 | 6 | 15 | 16 | 17 => 64,
                _ => 32,
            }
        }
        Some(ParaType::PolyOrVol) | Some(ParaType::Sprite) => match poly_type(pcw) {
            2 | 4 => 64,
            _ => 32,
        },
        _ => 32,
    }
}

/// Whether the stream driver should adopt the control word's list type.
///
/// A new list is adopted only while no list is active, and only from a
/// global parameter; vertex and control parameters never switch lists.
pub fn list_type_adoptable(pcw: ParamControlWord, current: Option<ListKind>) -> bool {
    current.is_none()
        && matches!(
            pcw.para_type(),
            Some(ParaType::PolyOrVol) | Some(ParaType::Sprite)
        )
}
