//! ID3v2 items and utilities
//!
//! ## Important notes
//!
//! See:
//!
//! * [`Id3v2Tag`]
//! * [`Frame`]
//! * [`FrameSchema`]

mod frame;
pub(crate) mod header;
mod read;
mod restrictions;
pub(crate) mod tag;
pub mod util;
pub(crate) mod write;

// Exports

pub use header::{Id3v2TagFlags, Id3v2Version};

pub use tag::{DEFAULT_MAX_PADDING, DEFAULT_PADDING, Id3v2Tag};

pub use frame::field::{Field, FieldSpec, FieldValue};
pub use frame::flags::FrameFlags;
pub use frame::id::FrameId;
pub use frame::registry::{lookup, resolve, schemas};
pub use frame::schema::{FrameKind, FrameSchema, VersionSet};
pub use frame::Frame;

pub use read::{read_from, read_from_path};
pub use write::order::FrameOrder;

pub use restrictions::{
	ImageSizeRestrictions, TagRestrictions, TagSizeRestrictions, TextSizeRestrictions,
};
