//! Read, write, and convert ID3v2 tags.
//!
//! ID3v2.2, ID3v2.3, and ID3v2.4 tags are decoded into a single in-memory model, and can be
//! re-encoded as any of the three versions. Frames that only exist in some versions are
//! converted where a counterpart exists, and dropped (with a [`Warning`](error::Warning)) where
//! one doesn't.
//!
//! # Examples
//!
//! ## Decoding a tag
//!
//! ```rust
//! # fn main() -> id3forge::error::Result<()> {
//! use id3forge::id3::v2::{Id3v2Tag, Id3v2Version};
//!
//! let bytes = b"ID3\x03\x00\x00\x00\x00\x00\x11TIT2\x00\x00\x00\x07\x00\x00\x00Hello\x00";
//! let tag = Id3v2Tag::decode(bytes)?;
//!
//! assert_eq!(tag.version(), Id3v2Version::V3);
//!
//! let title = tag.get_first("TIT2").unwrap();
//! assert_eq!(title.text_values(), ["Hello"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting between versions
//!
//! ```rust
//! # fn main() -> id3forge::error::Result<()> {
//! use id3forge::id3::v2::{Frame, Id3v2Tag, Id3v2Version};
//!
//! let mut tag = Id3v2Tag::new(Id3v2Version::V4);
//! tag.insert(Frame::text("TPE1", ["Artist"])?);
//!
//! // ID3v2.2 uses three character identifiers
//! let v22 = tag.with_version(Id3v2Version::V2);
//! let decoded = Id3v2Tag::decode(&v22.encode(None)?)?;
//! assert!(decoded.get_first("TP1").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Updating a file
//!
//! ```rust,no_run
//! # fn main() -> id3forge::error::Result<()> {
//! use id3forge::config::{ParseOptions, WriteOptions};
//! use id3forge::id3::v2::{Frame, read_from_path};
//!
//! let mut tag = read_from_path("test.mp3", ParseOptions::new())?;
//! tag.set(Frame::text("TIT2", ["New title"])?);
//! tag.save_to_path("test.mp3", WriteOptions::default())?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod error;
pub mod id3;
pub(crate) mod macros;
mod util;

pub use util::text::TextEncoding;

pub use util::io;
