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

//! Packed byte colors and the color conversions of the display-list formats.
//!
//! The tile accelerator expresses vertex colors three ways: a packed
//! `0xAARRGGBB` word, four floats, or a scalar intensity that modulates a
//! face color carried in the preceding global parameter. All three collapse
//! into [`PackedRgba`] here, with the exact saturation and fixed-point
//! behavior of the hardware path.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Saturating float to `u8` channel conversion.
///
/// The scale result is truncated toward zero, not rounded, then clamped to
/// `0..=255`. `ftou8(0.5)` is therefore `127`.
#[inline]
pub fn ftou8(x: f32) -> u8 {
    ((x * 255.0) as i32).clamp(0, 255) as u8
}

/// Fixed-point multiply of two `u8` channels.
///
/// Integer division by 255, not a shift.
#[inline]
pub fn fmul_u8(a: u8, b: u8) -> u8 {
    (u32::from(a) * u32::from(b) / 255) as u8
}

/// A packed RGBA color with one byte per channel.
///
/// `#[repr(C)]` keeps the channel order stable in vertex memory handed to
/// the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(C)]
pub struct PackedRgba {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
    /// The alpha (opacity) channel.
    pub a: u8,
}

impl PackedRgba {
    /// Transparent black, the reset value of all face and sprite colors.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Creates a color from explicit channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks a `0xAARRGGBB` parameter word.
    #[inline]
    pub const fn from_argb(word: u32) -> Self {
        Self {
            r: ((word & 0x00ff_0000) >> 16) as u8,
            g: ((word & 0x0000_ff00) >> 8) as u8,
            b: (word & 0x0000_00ff) as u8,
            a: ((word & 0xff00_0000) >> 24) as u8,
        }
    }

    /// Re-packs the color into a `0xAARRGGBB` word.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Converts a float color, saturating each channel to `0..=255`.
    #[inline]
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: ftou8(r),
            g: ftou8(g),
            b: ftou8(b),
            a: ftou8(a),
        }
    }

    /// Modulates a face color by a scalar intensity.
    ///
    /// The intensity is clamped to a byte first, then each color channel is
    /// scaled with the fixed-point multiply. Alpha is taken from the face
    /// color unmodulated.
    #[inline]
    pub fn from_intensity(face: Self, intensity: f32) -> Self {
        let i = ftou8(intensity);
        Self {
            r: fmul_u8(face.r, i),
            g: fmul_u8(face.g, i),
            b: fmul_u8(face.b, i),
            a: face.a,
        }
    }
}
