//! Format classification.
//!
//! Maps file extensions to a coarse [`MediaKind`] used to pick a dispatch
//! strategy, and to MIME types for uploads and HTTP responses. Classification
//! only looks at the extension string; file contents are never inspected.
//!
//! # Example
//!
//! ```ignore
//! use formatshift_core::format::{classify, classify_file_name, MediaKind};
//!
//! assert_eq!(classify("PNG"), MediaKind::Image);
//! assert_eq!(classify(".mp4"), MediaKind::Video);
//! assert_eq!(classify_file_name("song.flac"), MediaKind::Audio);
//! assert_eq!(classify("xyz"), MediaKind::Unknown);
//! ```

mod kind;
mod mime;

pub use kind::{classify, classify_file_name, extension_of, file_stem, MediaKind};
pub use mime::mime_type;
