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

//! Error types for collaborator failures.
//!
//! Only failures originating *outside* the translator (the backend, the
//! texture decoder) surface as errors. Violations of the display-list
//! protocol itself are preconditions and panic; see the crate-level
//! documentation of `katana-render`.

use crate::texture::TextureHandle;
use thiserror::Error;

/// A failure creating or destroying a backend resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The backend could not create a texture.
    #[error("texture creation failed: {reason}")]
    TextureCreation {
        /// Backend-specific description of the failure.
        reason: String,
    },
    /// A handle was passed to the backend that it does not know.
    #[error("unknown texture handle {0:?}")]
    UnknownHandle(TextureHandle),
}

/// A failure decoding guest texture data to RGBA bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The pixel format selector does not name a decodable format.
    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(u32),
    /// The output buffer cannot hold the decoded texture.
    #[error("decode output needs {needed} bytes, buffer has {available}")]
    OutputTooSmall {
        /// Bytes the decoded image requires.
        needed: usize,
        /// Bytes the destination buffer provides.
        available: usize,
    },
    /// The source slice ends before the texture data does.
    #[error("texture source truncated: need {needed} bytes, have {available}")]
    SourceTruncated {
        /// Bytes the encoded image requires.
        needed: usize,
        /// Bytes the source slice provides.
        available: usize,
    },
}
