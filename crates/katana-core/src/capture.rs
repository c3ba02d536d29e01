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

//! The captured tile-accelerator context a conversion consumes.

use crate::regs::{IspWord, TextureControlWord, TspWord};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A captured display-list context: the raw parameter stream plus the
/// register state the front-end latched when the render was kicked off.
///
/// Instances are produced by the TA front-end (or loaded from a trace) and
/// are read-only during conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct TaContext {
    /// The parameter stream: variable-length parameters, each prefixed by
    /// a 32-bit parameter control word.
    pub params: Vec<u8>,

    /// Background vertex data, tightly packed: three vertices of
    /// position, optional UV (when [`IspWord::texture`] is set on
    /// `bg_isp`), packed base color, and optional packed offset color
    /// (when [`IspWord::offset`] is set).
    pub bg_vertices: Vec<u8>,
    /// ISP word governing the background plane.
    pub bg_isp: IspWord,
    /// TSP word governing the background plane.
    pub bg_tsp: TspWord,
    /// Texture control word governing the background plane.
    pub bg_tcw: TextureControlWord,
    /// Latched `ISP_BACKGND_D` depth. Kept for capture fidelity; the
    /// supplied background vertex depths take precedence.
    pub bg_depth: f32,

    /// Latched palette entry format (`PAL_RAM_CTRL`).
    pub palette_fmt: u32,
    /// Latched stride width in 32-pixel units (`TEXT_CONTROL`).
    pub stride: u32,
    /// Punch-through alpha test reference value (`PT_ALPHA_REF`).
    pub alpha_ref: u8,
    /// Translucent lists were submitted for hardware depth sorting.
    pub autosort: bool,

    /// Output width in pixels.
    pub video_width: u32,
    /// Output height in pixels.
    pub video_height: u32,
}

impl TaContext {
    /// Size of the parameter stream in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.params.len()
    }
}
