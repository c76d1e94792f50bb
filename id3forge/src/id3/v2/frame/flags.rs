use crate::error::Result;
use crate::id3::v2::Id3v2Version;
use crate::macros::id3v2_err;

const V3_TAG_ALTER: u16 = 0x8000;
const V3_FILE_ALTER: u16 = 0x4000;
const V3_READ_ONLY: u16 = 0x2000;
const V3_UNKNOWN_STATUS: u16 = 0x1F00;
const V3_COMPRESSION: u16 = 0x0080;
const V3_ENCRYPTION: u16 = 0x0040;
const V3_GROUPING: u16 = 0x0020;
const V3_UNKNOWN_FORMAT: u16 = 0x001F;

const V4_TAG_ALTER: u16 = 0x4000;
const V4_FILE_ALTER: u16 = 0x2000;
const V4_READ_ONLY: u16 = 0x1000;
const V4_UNKNOWN_STATUS: u16 = 0x8F00;
const V4_GROUPING: u16 = 0x0040;
const V4_COMPRESSION: u16 = 0x0008;
const V4_ENCRYPTION: u16 = 0x0004;
const V4_UNSYNCHRONISATION: u16 = 0x0002;
const V4_DATA_LENGTH_INDICATOR: u16 = 0x0001;
const V4_UNKNOWN_FORMAT: u16 = 0x00B0;

/// Various flags to describe the content of a frame
///
/// ID3v2.2 frames have no flags, and ID3v2.3 frames lack `unsynchronisation` and
/// `data_length_indicator`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameFlags {
	/// Discard the frame when the tag is altered and the frame isn't understood
	pub discard_on_tag_alter: bool,
	/// Discard the frame when the audio is altered and the frame isn't understood
	pub discard_on_file_alter: bool,
	/// Frame is intended to be read only
	pub read_only: bool,
	/// The group identifier the frame belongs to
	///
	/// All frames with the same group identifier byte belong to the same group.
	pub grouping_identity: Option<u8>,
	/// Frame is zlib compressed
	pub compression: bool,
	/// Frame is encrypted
	///
	/// Encrypted frames can't be decoded, and this flag is never written.
	pub encryption: bool,
	/// Frame is unsynchronised (ID3v2.4 only)
	///
	/// When writing, this follows the tag's own unsynchronisation flag.
	pub unsynchronisation: bool,
	/// Frame has a data length indicator (ID3v2.4 only)
	pub data_length_indicator: bool,
	/// The frame ID is not known, its body is kept as generic text, URL, or binary data
	pub unknown: bool,
}

impl FrameFlags {
	/// Parse a frame's flag word
	///
	/// Group identities are set to `Some(0)`, the real value follows the frame header.
	/// Returns the flags, along with any unrecognized status bits.
	///
	/// # Errors
	///
	/// The format byte has undefined bits set.
	pub(crate) fn parse(version: Id3v2Version, flags: u16) -> Result<(Self, u16)> {
		match version {
			Id3v2Version::V2 => Ok((Self::default(), 0)),
			Id3v2Version::V3 => {
				if flags & V3_UNKNOWN_FORMAT != 0 {
					id3v2_err!(BadFrameFlags(flags));
				}

				let parsed = FrameFlags {
					discard_on_tag_alter: flags & V3_TAG_ALTER != 0,
					discard_on_file_alter: flags & V3_FILE_ALTER != 0,
					read_only: flags & V3_READ_ONLY != 0,
					grouping_identity: (flags & V3_GROUPING != 0).then_some(0),
					compression: flags & V3_COMPRESSION != 0,
					encryption: flags & V3_ENCRYPTION != 0,
					..FrameFlags::default()
				};

				Ok((parsed, flags & V3_UNKNOWN_STATUS))
			},
			Id3v2Version::V4 => {
				if flags & V4_UNKNOWN_FORMAT != 0 {
					id3v2_err!(BadFrameFlags(flags));
				}

				let parsed = FrameFlags {
					discard_on_tag_alter: flags & V4_TAG_ALTER != 0,
					discard_on_file_alter: flags & V4_FILE_ALTER != 0,
					read_only: flags & V4_READ_ONLY != 0,
					grouping_identity: (flags & V4_GROUPING != 0).then_some(0),
					compression: flags & V4_COMPRESSION != 0,
					encryption: flags & V4_ENCRYPTION != 0,
					unsynchronisation: flags & V4_UNSYNCHRONISATION != 0,
					data_length_indicator: flags & V4_DATA_LENGTH_INDICATOR != 0,
					unknown: false,
				};

				Ok((parsed, flags & V4_UNKNOWN_STATUS))
			},
		}
	}

	/// Get the flag word for `version`
	///
	/// Encryption is never set, and neither is compression when support for it is disabled.
	pub(crate) fn as_bytes(&self, version: Id3v2Version) -> u16 {
		let compression = self.compression && cfg!(feature = "id3v2_compression_support");
		let mut flags = 0;

		match version {
			Id3v2Version::V2 => {},
			Id3v2Version::V3 => {
				let bits = [
					(self.discard_on_tag_alter, V3_TAG_ALTER),
					(self.discard_on_file_alter, V3_FILE_ALTER),
					(self.read_only, V3_READ_ONLY),
					(compression, V3_COMPRESSION),
					(self.grouping_identity.is_some(), V3_GROUPING),
				];

				for (set, bit) in bits {
					if set {
						flags |= bit;
					}
				}
			},
			Id3v2Version::V4 => {
				let bits = [
					(self.discard_on_tag_alter, V4_TAG_ALTER),
					(self.discard_on_file_alter, V4_FILE_ALTER),
					(self.read_only, V4_READ_ONLY),
					(self.grouping_identity.is_some(), V4_GROUPING),
					(compression, V4_COMPRESSION),
					(self.unsynchronisation, V4_UNSYNCHRONISATION),
					// Compressed frames always carry their decompressed size
					(
						self.data_length_indicator || compression,
						V4_DATA_LENGTH_INDICATOR,
					),
				];

				for (set, bit) in bits {
					if set {
						flags |= bit;
					}
				}
			},
		}

		flags
	}
}
