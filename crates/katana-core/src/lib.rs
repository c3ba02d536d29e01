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

//! # Katana Core
//!
//! Foundational crate for the Katana CLX2 display-list translator. It holds
//! the backend-agnostic data model (render context, surfaces, vertices),
//! the raw hardware register words, the pipeline-state enums shared with
//! render backends, and the contracts through which the translation core
//! reaches its collaborators (render backend, texture cache, texture
//! decoder).
//!
//! This crate defines the 'what' of a conversion; the 'how' lives in
//! `katana-render`, which walks a captured parameter stream and fills a
//! [`context::RenderContext`] using only the types and traits defined here.

#![warn(missing_docs)]

pub mod backend;
pub mod capture;
pub mod color;
pub mod context;
pub mod error;
pub mod math;
pub mod regs;
pub mod state;
pub mod texture;

pub use backend::{RenderBackend, SurfacePass, TextureDescriptor};
pub use capture::TaContext;
pub use color::PackedRgba;
pub use context::{DisplayList, RenderContext, Surface, SurfaceParams, Vertex};
pub use error::{DecodeError, ResourceError};
pub use regs::{IspWord, ListKind, ParaType, ParamControlWord, TextureControlWord, TspWord};
pub use state::{Blend, BlendFactor, CullFace, DepthFunc, FilterMode, ShadeMode, WrapMode};
pub use texture::{
    TextureCacheEntry, TextureDecoder, TextureHandle, TextureKey, TextureLayout, TextureLookup,
};
