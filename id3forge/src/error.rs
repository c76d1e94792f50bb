//! Contains the errors and warnings that can arise within id3forge
//!
//! The primary error is [`Id3Error`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.
//!
//! Problems that do not prevent a tag from being read or written are reported as
//! [`Warning`]s instead. They are logged through the `log` facade as they occur and
//! also collected, see [`Id3v2Tag::warnings`](crate::id3::v2::Id3v2Tag::warnings).

use crate::id3::v2::{FrameId, Id3v2Version};
pub use crate::util::text::TextEncodingError;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, Id3Error>`
pub type Result<T> = std::result::Result<T, Id3Error>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	/// No ID3v2 tag was found at this location
	///
	/// This is not a failure of a tag, only its absence.
	NoTag,
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Errors that arise while reading/writing ID3v2 tags
	Id3v2(Id3v2Error),
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while encoding text
	TextEncode(TextEncodingError),
	/// An invalid [`FrameOrder`](crate::id3::v2::FrameOrder) pattern
	BadPattern(regex::Error),

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
}

/// The types of errors that can occur while interacting with ID3v2 tags
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Id3v2ErrorKind {
	// Header
	/// Arises when an invalid ID3v2 version or a non-zero revision is found
	BadId3v2Version(u8, u8),
	/// Arises when a compressed ID3v2.2 tag is encountered
	///
	/// At the time the ID3v2.2 specification was written, a compression scheme wasn't decided.
	/// As such, the tag can't be read.
	V2Compression,
	/// Arises when an ID3v2.2 tag has undefined flag bits set
	UnknownV2Flags(u8),
	/// Arises when an extended header has an invalid size
	BadExtendedHeaderSize,
	/// Arises when an ID3v2.4 extended header flag carries malformed data
	BadExtendedFlagData,
	/// Arises when a frame claims more data than the tag holds ([`ParsingMode::Strict`](crate::config::ParsingMode::Strict) only)
	BadFrameLength,

	// Frame
	/// Arises when a frame ID contains invalid characters (must be within `'A'..'Z'` or `'0'..'9'`)
	/// or if the ID is too short/long.
	BadFrameId(Vec<u8>),
	/// Ran out of data while decoding a field
	///
	/// This is kept apart from malformed values, as optional trailing fields are
	/// allowed to be missing.
	UnexpectedEnd,
	/// A syncsafe integer had a byte with its top bit set
	BadSyncsafeInteger,
	/// A frame's format flags contain undefined bits
	BadFrameFlags(u16),
	/// Encrypted frames are not supported
	EncryptedFrame,
	/// An ID3v2.4 frame is compressed, but has no data length indicator
	MissingDataLengthIndicator,
	/// A decompressed frame differs in size from its declared length
	DataLengthMismatch {
		/// The declared size
		expected: u32,
		/// The size after decompression
		actual: usize,
	},
	#[cfg(feature = "id3v2_compression_support")]
	/// Arises when a compressed frame is unable to be decompressed
	Decompression(String),
	#[cfg(not(feature = "id3v2_compression_support"))]
	/// Arises when a compressed frame is encountered, but support is disabled
	CompressedFrameEncountered,
	/// Arises when a text encoding byte is not in `0..=3`
	BadTextEncoding(u8),

	// Conversion
	/// The frame can not be represented in the target version
	IncompatibleFrame {
		/// The frame's ID
		id: String,
		/// The version the frame was being converted to
		version: Id3v2Version,
	},

	// Values
	/// A field validator rejected a value
	BadFieldValue {
		/// The field name
		field: &'static str,
		/// What was wrong with the value
		reason: &'static str,
	},
	/// The frame has no field with this name
	UnknownField(String),
	/// An attached picture uses an image format that has no equivalent in the target version
	UnsupportedImageFormat(String),
}

impl Display for Id3v2ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			// Header
			Self::BadId3v2Version(major, revision) => write!(
				f,
				"Found an invalid version (v{major}.{revision}), expected any major revision in: \
				 (2, 3, 4) with a revision of 0"
			),
			Self::V2Compression => write!(f, "Encountered a compressed ID3v2.2 tag"),
			Self::UnknownV2Flags(flags) => {
				write!(f, "Encountered unknown ID3v2.2 tag flags: {flags:#04x}")
			},
			Self::BadExtendedHeaderSize => {
				write!(f, "Found an extended header with an invalid size")
			},
			Self::BadExtendedFlagData => {
				write!(f, "Found malformed extended header flag data")
			},
			Self::BadFrameLength => write!(f, "Frame is larger than the remaining tag data"),

			// Frame
			Self::BadFrameId(frame_id) => write!(f, "Failed to parse a frame ID: 0x{frame_id:x?}"),
			Self::UnexpectedEnd => write!(f, "Unexpected end of frame data"),
			Self::BadSyncsafeInteger => {
				write!(f, "Encountered a syncsafe integer with its high bit set")
			},
			Self::BadFrameFlags(flags) => {
				write!(f, "Encountered unknown frame format flags: {flags:#06x}")
			},
			Self::EncryptedFrame => write!(f, "Encrypted frames are not supported"),
			Self::MissingDataLengthIndicator => write!(
				f,
				"Encountered a compressed frame without a data length indicator"
			),
			Self::DataLengthMismatch { expected, actual } => write!(
				f,
				"Frame data length mismatch (expected {expected} bytes, got {actual})"
			),
			#[cfg(feature = "id3v2_compression_support")]
			Self::Decompression(err) => write!(f, "Failed to decompress frame: {err}"),
			#[cfg(not(feature = "id3v2_compression_support"))]
			Self::CompressedFrameEncountered => write!(
				f,
				"Encountered a compressed ID3v2 frame, support is disabled"
			),
			Self::BadTextEncoding(encoding) => {
				write!(f, "Found invalid text encoding byte: {encoding}")
			},

			// Conversion
			Self::IncompatibleFrame { id, version } => {
				write!(f, "Frame `{id}` can not be represented in ID3v2.{}", version.major())
			},

			// Values
			Self::BadFieldValue { field, reason } => {
				write!(f, "Invalid value for field `{field}`: {reason}")
			},
			Self::UnknownField(field) => write!(f, "Frame has no field named `{field}`"),
			Self::UnsupportedImageFormat(format) => {
				write!(f, "Picture: no equivalent for image format \"{format}\"")
			},
		}
	}
}

/// An error that arises while interacting with an ID3v2 tag
#[derive(Clone, PartialEq, Eq)]
pub struct Id3v2Error {
	kind: Id3v2ErrorKind,
}

impl Id3v2Error {
	/// Create a new `Id3v2Error` from an [`Id3v2ErrorKind`]
	#[must_use]
	pub const fn new(kind: Id3v2ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`Id3v2ErrorKind`]
	pub fn kind(&self) -> &Id3v2ErrorKind {
		&self.kind
	}
}

impl Debug for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {:?}", self.kind)
	}
}

impl Display for Id3v2Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2: {}", self.kind)
	}
}

/// Errors that could occur within id3forge
pub struct Id3Error {
	pub(crate) kind: ErrorKind,
}

impl Id3Error {
	/// Create an `Id3Error` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::error::{ErrorKind, Id3Error};
	///
	/// let no_tag = Id3Error::new(ErrorKind::NoTag);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::error::{ErrorKind, Id3Error};
	///
	/// let no_tag = Id3Error::new(ErrorKind::NoTag);
	/// if let ErrorKind::NoTag = no_tag.kind() {
	/// 	println!("Nothing to read here");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Returns the [`Id3v2ErrorKind`], if this is an ID3v2 error
	pub fn id3v2_kind(&self) -> Option<&Id3v2ErrorKind> {
		match &self.kind {
			ErrorKind::Id3v2(err) => Some(err.kind()),
			_ => None,
		}
	}

	/// Whether this error signals the absence of a tag
	pub fn is_no_tag(&self) -> bool {
		matches!(self.kind, ErrorKind::NoTag)
	}

	/// Whether this error was caused by running out of data
	pub fn is_unexpected_end(&self) -> bool {
		matches!(self.id3v2_kind(), Some(Id3v2ErrorKind::UnexpectedEnd))
	}

	/// Whether this error was caused by an impossible version conversion
	pub fn is_incompatible_frame(&self) -> bool {
		matches!(
			self.id3v2_kind(),
			Some(Id3v2ErrorKind::IncompatibleFrame { .. })
		)
	}
}

impl std::error::Error for Id3Error {}

impl Debug for Id3Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<Id3v2ErrorKind> for Id3Error {
	fn from(input: Id3v2ErrorKind) -> Self {
		Self {
			kind: ErrorKind::Id3v2(Id3v2Error::new(input)),
		}
	}
}

impl From<Id3v2Error> for Id3Error {
	fn from(input: Id3v2Error) -> Self {
		Self {
			kind: ErrorKind::Id3v2(input),
		}
	}
}

impl From<TextEncodingError> for Id3Error {
	fn from(input: TextEncodingError) -> Self {
		Self {
			kind: ErrorKind::TextEncode(input),
		}
	}
}

impl From<regex::Error> for Id3Error {
	fn from(input: regex::Error) -> Self {
		Self {
			kind: ErrorKind::BadPattern(input),
		}
	}
}

impl From<std::io::Error> for Id3Error {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<std::string::FromUtf8Error> for Id3Error {
	fn from(_: std::string::FromUtf8Error) -> Self {
		Self {
			kind: ErrorKind::TextDecode("Expected a UTF-8 string"),
		}
	}
}

impl From<std::collections::TryReserveError> for Id3Error {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl From<std::convert::Infallible> for Id3Error {
	fn from(input: std::convert::Infallible) -> Self {
		match input {}
	}
}

impl Display for Id3Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),
			ErrorKind::BadPattern(ref err) => write!(f, "Frame order pattern: {err}"),

			ErrorKind::NoTag => write!(f, "Reading: No ID3v2 tag found"),
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::TextEncode(ref err) => write!(f, "Text encoding: {err}"),
			ErrorKind::Id3v2(ref id3v2_err) => write!(f, "{id3v2_err}"),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
		}
	}
}

/// A non-fatal problem encountered while reading or writing a tag
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Warning {
	/// The tag header has undefined flag bits set
	UnknownTagFlags(u8),
	/// A non-zero revision byte was accepted ([`ParsingMode::Relaxed`](crate::config::ParsingMode::Relaxed))
	UnknownRevision(u8),
	/// The extended header declares an unusual size
	ExtendedHeaderSize(u32),
	/// The ID3v2.4 extended header has a flag byte count other than 1
	ExtendedFlagCount(u8),
	/// A frame's status flags contain undefined bits
	UnknownFrameStatusFlags {
		/// The frame's ID
		id: FrameId,
		/// The full flag word
		flags: u16,
	},
	/// A frame type that is rarely seen in the wild was decoded
	UntestedFrame(FrameId),
	/// A frame type that other software is known to mishandle was written
	DiscouragedFrame(FrameId),
	/// Several frames with an ID that doesn't allow duplicates were collapsed into the last one
	DuplicateFrame(FrameId),
	/// A frame was dropped, as it can't be converted to the tag's version
	DroppedFrame {
		/// The frame's ID
		id: FrameId,
		/// The version being written
		version: Id3v2Version,
		/// Why the conversion failed
		reason: String,
	},
	/// A frame that failed to decode was not written back
	DroppedErrorFrame(FrameId),
	/// A frame's declared size runs past the end of the tag
	TruncatedFrame(FrameId),
	/// The tag stores plain 8-bit frame sizes instead of syncsafe ones
	PlainFrameSizes,
}

impl Display for Warning {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnknownTagFlags(flags) => write!(f, "Unknown tag flags: {flags:#04x}"),
			Self::UnknownRevision(revision) => write!(f, "Unknown tag revision: {revision}"),
			Self::ExtendedHeaderSize(size) => {
				write!(f, "Unexpected extended header size: {size}")
			},
			Self::ExtendedFlagCount(count) => {
				write!(f, "Unexpected extended flag byte count: {count}")
			},
			Self::UnknownFrameStatusFlags { id, flags } => {
				write!(f, "{id}: unknown frame status flags: {flags:#06x}")
			},
			Self::UntestedFrame(id) => write!(f, "{id}: untested frame type"),
			Self::DiscouragedFrame(id) => {
				write!(f, "{id}: frame type is not well supported by other software")
			},
			Self::DuplicateFrame(id) => {
				write!(f, "{id}: duplicate frames collapsed into the last one")
			},
			Self::DroppedFrame {
				id,
				version,
				reason,
			} => write!(
				f,
				"{id}: dropped while writing ID3v2.{}: {reason}",
				version.major()
			),
			Self::DroppedErrorFrame(id) => write!(f, "{id}: undecodable frame not written"),
			Self::TruncatedFrame(id) => write!(f, "{id}: frame runs past the end of the tag"),
			Self::PlainFrameSizes => write!(f, "Tag uses non-syncsafe frame sizes"),
		}
	}
}

/// Collects [`Warning`]s, logging each one as it arrives
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
	warnings: Vec<Warning>,
}

impl Diagnostics {
	pub(crate) fn warn(&mut self, warning: Warning) {
		log::warn!("{warning}");
		self.warnings.push(warning);
	}

	pub(crate) fn into_inner(self) -> Vec<Warning> {
		self.warnings
	}
}
