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

//! # Katana Render
//!
//! The hot-path conversion pipeline: walks a captured CLX2 parameter
//! stream and fills a backend-neutral [`katana_core::RenderContext`] with
//! surfaces, vertices and counter-clockwise triangle indices.
//!
//! A conversion is a pure, single-threaded transformation. The
//! [`convert::Converter`] owns the texture decode scratch buffer and the
//! sort scratch arrays, so independent conversions only need independent
//! converters. Collaborators (render backend, texture cache, texture
//! decoder) are borrowed for the duration of a call.
//!
//! ## Error policy
//!
//! Failures of the collaborators surface as [`convert::ConvertError`].
//! Violations of the display-list protocol itself (capacity overflow, an
//! unsupported polygon or vertex type, `OBJ_LIST_SET` in the stream, a
//! sprite without its end-of-strip bit) panic: the stream comes from
//! reproducible emulated hardware, and no partial render beats silently
//! corrupt output.

#![warn(missing_docs)]

pub mod convert;
pub mod index;
pub mod present;
pub mod sort;
pub mod ta;
pub mod texcache;
pub mod translate;

pub use convert::{ConvertError, Converter};
pub use present::{render, render_until};
