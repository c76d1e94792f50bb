use super::field::{Field, FieldSpec};
use crate::id3::v2::Id3v2Version;

/// The set of ID3v2 versions a frame is defined in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionSet(u8);

impl VersionSet {
	/// Not valid in any version
	pub const NONE: Self = Self(0);
	/// ID3v2.2 only
	pub const V2: Self = Self(1 << 2);
	/// ID3v2.3 only
	pub const V3: Self = Self(1 << 3);
	/// ID3v2.4 only
	pub const V4: Self = Self(1 << 4);
	/// ID3v2.3 and ID3v2.4
	pub const V3_V4: Self = Self(Self::V3.0 | Self::V4.0);
	/// Every version
	pub const ALL: Self = Self(Self::V2.0 | Self::V3_V4.0);

	/// Whether `version` is in the set
	pub fn contains(self, version: Id3v2Version) -> bool {
		self.0 & (1 << version.major()) != 0
	}

	/// Whether the set is exactly ID3v2.2
	pub(crate) fn is_v2_only(self) -> bool {
		self == Self::V2
	}
}

/// The broad shape of a frame, used where frames get special treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
	/// A text information frame (encoding, followed by a list of strings)
	///
	/// Duplicates of these are merged into a single frame on write.
	Text,
	/// A URL link frame
	Url,
	/// An attached picture, `APIC` or `PIC`
	Picture,
	/// Everything else
	Other,
}

/// The declarative description of a frame type
///
/// Schemas are static: every frame references one, and they are never modified at runtime.
/// See [`lookup`](crate::id3::v2::lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSchema {
	pub(crate) id: &'static str,
	pub(crate) description: &'static str,
	pub(crate) fields: &'static [Field],
	pub(crate) versions: VersionSet,
	pub(crate) kind: FrameKind,
	pub(crate) allow_duplicates: bool,
	/// For ID3v2.2 schemas, the ID3v2.3/4 frame it is a counterpart of
	pub(crate) parent: Option<&'static str>,
	pub(crate) untested: bool,
	pub(crate) bozo: bool,
	pub(crate) nonstandard: bool,
	/// A fallback for unknown IDs
	pub(crate) generic: bool,
}

impl FrameSchema {
	pub(crate) const fn new(
		id: &'static str,
		description: &'static str,
		fields: &'static [Field],
	) -> Self {
		Self {
			id,
			description,
			fields,
			versions: VersionSet::V3_V4,
			kind: FrameKind::Other,
			allow_duplicates: false,
			parent: None,
			untested: false,
			bozo: false,
			nonstandard: false,
			generic: false,
		}
	}

	pub(crate) const fn text(id: &'static str, description: &'static str) -> Self {
		Self::new(id, description, TEXT_FIELDS).of_kind(FrameKind::Text)
	}

	pub(crate) const fn url(id: &'static str, description: &'static str) -> Self {
		Self::new(id, description, URL_FIELDS).of_kind(FrameKind::Url)
	}

	pub(crate) const fn credits(id: &'static str, description: &'static str) -> Self {
		Self::new(id, description, CREDITS_FIELDS)
	}

	pub(crate) const fn only(mut self, versions: VersionSet) -> Self {
		self.versions = versions;
		self
	}

	pub(crate) const fn of_kind(mut self, kind: FrameKind) -> Self {
		self.kind = kind;
		self
	}

	pub(crate) const fn duplicates(mut self) -> Self {
		self.allow_duplicates = true;
		self
	}

	pub(crate) const fn parent(mut self, parent: &'static str) -> Self {
		self.parent = Some(parent);
		self
	}

	pub(crate) const fn untested(mut self) -> Self {
		self.untested = true;
		self
	}

	pub(crate) const fn bozo(mut self) -> Self {
		self.bozo = true;
		self
	}

	pub(crate) const fn nonstandard(mut self) -> Self {
		self.nonstandard = true;
		self
	}

	const fn generic(mut self) -> Self {
		self.generic = true;
		self
	}

	/// The frame ID this schema describes
	///
	/// This is empty for the fallback schemas used by unknown frames.
	pub fn id(&self) -> &'static str {
		self.id
	}

	/// A human readable description of the frame
	pub fn description(&self) -> &'static str {
		self.description
	}

	/// The frame's fields, in the order they are stored
	pub fn fields(&self) -> &'static [Field] {
		self.fields
	}

	/// The versions the frame is defined in
	pub fn versions(&self) -> VersionSet {
		self.versions
	}

	/// The frame's [`FrameKind`]
	pub fn kind(&self) -> FrameKind {
		self.kind
	}

	/// Whether a tag may hold more than one frame with this ID
	pub fn allows_duplicates(&self) -> bool {
		self.allow_duplicates
	}

	/// For ID3v2.2 frames, the ID of the ID3v2.3/4 frame it corresponds to
	pub fn v22_parent(&self) -> Option<&'static str> {
		self.parent
	}

	/// Whether decoding of this frame type has seen little real world testing
	pub fn is_untested(&self) -> bool {
		self.untested
	}

	/// Whether other software is known to handle this frame type poorly
	pub fn is_discouraged(&self) -> bool {
		self.bozo
	}

	/// Whether this frame type is a vendor extension
	pub fn is_nonstandard(&self) -> bool {
		self.nonstandard
	}

	/// Whether this is one of the fallback schemas used for unknown IDs
	pub fn is_generic(&self) -> bool {
		self.generic
	}

	pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|f| f.name == name)
	}

	pub(crate) fn has_encoding(&self) -> bool {
		self.fields
			.iter()
			.any(|f| matches!(f.spec, FieldSpec::Encoding))
	}
}

pub(crate) const TEXT_FIELDS: &[Field] = &[
	Field::new("encoding", FieldSpec::Encoding),
	Field::new("text", FieldSpec::Sequence(&FieldSpec::EncodedString)),
];

pub(crate) const URL_FIELDS: &[Field] = &[Field::new("url", FieldSpec::Url)];

pub(crate) const CREDITS_FIELDS: &[Field] = &[
	Field::new("encoding", FieldSpec::Encoding),
	Field::new(
		"people",
		FieldSpec::Records(&[FieldSpec::EncodedString, FieldSpec::EncodedString]),
	),
];

pub(crate) const BINARY_FIELDS: &[Field] = &[Field::new("data", FieldSpec::Binary)];

/// Fallback for unknown `T*` frames
pub(crate) static GENERIC_TEXT: FrameSchema = FrameSchema::text("", "Unknown text frame")
	.only(VersionSet::ALL)
	.generic();

/// Fallback for unknown `W*` frames
pub(crate) static GENERIC_URL: FrameSchema = FrameSchema::url("", "Unknown URL frame")
	.only(VersionSet::ALL)
	.duplicates()
	.generic();

/// Fallback for all other unknown frames
pub(crate) static GENERIC_BINARY: FrameSchema =
	FrameSchema::new("", "Unknown frame", BINARY_FIELDS)
		.only(VersionSet::ALL)
		.duplicates()
		.generic();

/// Frames that failed to decode, holding their raw data
///
/// These are valid in no version, they can only be read.
pub(crate) static ERROR_FRAME: FrameSchema =
	FrameSchema::new("", "Undecodable frame", BINARY_FIELDS)
		.only(VersionSet::NONE)
		.duplicates();
