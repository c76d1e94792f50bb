use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Diagnostics, ErrorKind, Id3Error, Result, Warning};
use crate::id3::v2::restrictions::TagRestrictions;
use crate::id3::v2::util::synchsafe::decode_syncsafe;
use crate::macros::{err, id3v2_err};

use std::fmt::{Display, Formatter};
use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

/// The length of the tag header, and of the ID3v2.4 footer
pub(crate) const HEADER_LEN: usize = 10;

const V2_UNSYNCHRONISATION: u8 = 0x80;
const V2_COMPRESSION: u8 = 0x40;

const UNSYNCHRONISATION: u8 = 0x80;
const EXTENDED_HEADER: u8 = 0x40;
const EXPERIMENTAL: u8 = 0x20;
const FOOTER: u8 = 0x10;

const V3_EXT_CRC: u16 = 0x8000;

const V4_EXT_UPDATE: u8 = 0x40;
const V4_EXT_CRC: u8 = 0x20;
const V4_EXT_RESTRICTIONS: u8 = 0x10;

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

impl Id3v2Version {
	/// The major version number, as stored in the tag header
	pub fn major(self) -> u8 {
		match self {
			Self::V2 => 2,
			Self::V3 => 3,
			Self::V4 => 4,
		}
	}

	/// Get a version from its major version number
	pub fn from_major(major: u8) -> Option<Self> {
		match major {
			2 => Some(Self::V2),
			3 => Some(Self::V3),
			4 => Some(Self::V4),
			_ => None,
		}
	}
}

impl Display for Id3v2Version {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ID3v2.{}", self.major())
	}
}

/// Flags that apply to the entire tag
///
/// This includes the flags stored in the extended header.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Id3v2TagFlags {
	/// Whether or not all frames are unsynchronised
	///
	/// ID3v2.2 and ID3v2.3 apply this to the entire tag body. ID3v2.4 applies it to each frame
	/// individually, setting their [`FrameFlags::unsynchronisation`](crate::id3::v2::FrameFlags::unsynchronisation).
	pub unsynchronisation: bool,
	/// Whether the tag has an extended header (ID3v2.3 and ID3v2.4)
	///
	/// An extended header is also written whenever `crc_present`, `update` or `restrictions`
	/// call for one.
	pub extended_header: bool,
	/// Indicates if the tag is in an experimental stage (ID3v2.3 and ID3v2.4)
	pub experimental: bool,
	/// Indicates that the tag includes a footer (ID3v2.4 only)
	///
	/// A tag with a footer is never padded.
	pub footer: bool,
	/// Whether or not to include a CRC-32 of the frame data in the extended header
	///
	/// This is calculated when the tag is written.
	pub crc_present: bool,
	/// The tag is an update of an earlier tag in the same stream (ID3v2.4 only)
	pub update: bool,
	/// Restrictions on the tag, written in the extended header (ID3v2.4 only)
	pub restrictions: Option<TagRestrictions>,
}

impl Id3v2TagFlags {
	/// Whether these flags require an extended header for `version`
	pub(crate) fn needs_extended_header(&self, version: Id3v2Version) -> bool {
		match version {
			Id3v2Version::V2 => false,
			Id3v2Version::V3 => self.extended_header || self.crc_present,
			Id3v2Version::V4 => {
				self.extended_header
					|| self.crc_present
					|| self.update
					|| self.restrictions.is_some()
			},
		}
	}

	/// Get the header byte representation of the flags for `version`
	pub(crate) fn as_byte(&self, version: Id3v2Version) -> u8 {
		let mut byte = 0;

		// ID3v2.4 unsynchronises each frame, the flag only records that they all are
		if self.unsynchronisation {
			byte |= UNSYNCHRONISATION;
		}

		if version == Id3v2Version::V2 {
			return byte;
		}

		if self.needs_extended_header(version) {
			byte |= EXTENDED_HEADER;
		}

		if self.experimental {
			byte |= EXPERIMENTAL;
		}

		if version == Id3v2Version::V4 && self.footer {
			byte |= FOOTER;
		}

		byte
	}
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Id3v2Header {
	pub version: Id3v2Version,
	pub flags: Id3v2TagFlags,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub size: u32,
}

impl Id3v2Header {
	/// Parse a tag header
	///
	/// Short or mismatched input is [`ErrorKind::NoTag`], everything after the magic is
	/// validated.
	pub(crate) fn parse<R>(
		reader: &mut R,
		parse_options: ParseOptions,
		diagnostics: &mut Diagnostics,
	) -> Result<Self>
	where
		R: Read,
	{
		log::debug!("Parsing ID3v2 header");

		let mut header = [0; HEADER_LEN];
		if let Err(e) = reader.read_exact(&mut header) {
			if e.kind() == std::io::ErrorKind::UnexpectedEof {
				err!(NoTag);
			}

			return Err(e.into());
		}

		Self::from_bytes(&header, parse_options, diagnostics)
	}

	pub(crate) fn from_bytes(
		header: &[u8; HEADER_LEN],
		parse_options: ParseOptions,
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		if &header[..3] != b"ID3" {
			return Err(Id3Error::new(ErrorKind::NoTag));
		}

		let (major, revision) = (header[3], header[4]);
		let Some(version) = Id3v2Version::from_major(major) else {
			id3v2_err!(BadId3v2Version(major, revision));
		};

		if revision != 0 {
			if parse_options.parsing_mode != ParsingMode::Relaxed || revision == 0xFF {
				id3v2_err!(BadId3v2Version(major, revision));
			}

			diagnostics.warn(Warning::UnknownRevision(revision));
		}

		let raw_flags = header[5];
		let flags = match version {
			Id3v2Version::V2 => {
				// A compression scheme was never decided for ID3v2.2, so the tag can't be read
				if raw_flags & V2_COMPRESSION != 0 {
					id3v2_err!(V2Compression);
				}

				let unknown = raw_flags & !(V2_UNSYNCHRONISATION | V2_COMPRESSION);
				if unknown != 0 {
					id3v2_err!(UnknownV2Flags(unknown));
				}

				Id3v2TagFlags {
					unsynchronisation: raw_flags & V2_UNSYNCHRONISATION != 0,
					..Id3v2TagFlags::default()
				}
			},
			Id3v2Version::V3 | Id3v2Version::V4 => {
				let mut known = UNSYNCHRONISATION | EXTENDED_HEADER | EXPERIMENTAL;
				if version == Id3v2Version::V4 {
					known |= FOOTER;
				}

				let unknown = raw_flags & !known;
				if unknown != 0 {
					diagnostics.warn(Warning::UnknownTagFlags(unknown));
				}

				Id3v2TagFlags {
					unsynchronisation: raw_flags & UNSYNCHRONISATION != 0,
					extended_header: raw_flags & EXTENDED_HEADER != 0,
					experimental: raw_flags & EXPERIMENTAL != 0,
					footer: version == Id3v2Version::V4 && raw_flags & FOOTER != 0,
					..Id3v2TagFlags::default()
				}
			},
		};

		let size = decode_syncsafe(&header[6..])? as u32;

		log::debug!(
			"Found {version} tag, {size} bytes, flags: {raw_flags:#04x}"
		);

		Ok(Id3v2Header {
			version,
			flags,
			size,
		})
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u64 {
		let footer = if self.flags.footer { HEADER_LEN } else { 0 };
		u64::from(self.size) + (HEADER_LEN + footer) as u64
	}
}

/// The contents of an extended header
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExtendedHeader {
	/// The bytes taken up by the extended header
	pub len: usize,
	/// The padding size (ID3v2.3)
	pub padding_size: Option<u32>,
	pub crc: Option<u32>,
	pub update: bool,
	pub restrictions: Option<TagRestrictions>,
}

fn ext_bytes(data: &[u8], start: usize, len: usize) -> Result<&[u8]> {
	match data.get(start..start + len) {
		Some(bytes) => Ok(bytes),
		None => id3v2_err!(BadExtendedHeaderSize),
	}
}

impl ExtendedHeader {
	/// Parse an extended header from the front of the tag body
	///
	/// For ID3v2.3, `data` must already be resynchronised.
	pub(crate) fn parse(
		version: Id3v2Version,
		data: &[u8],
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		let extended = match version {
			Id3v2Version::V2 => Self::default(),
			Id3v2Version::V3 => Self::parse_v3(data, diagnostics)?,
			Id3v2Version::V4 => Self::parse_v4(data, diagnostics)?,
		};

		if extended.len > data.len() {
			id3v2_err!(BadExtendedHeaderSize);
		}

		log::debug!("Parsed {} byte extended header", extended.len);
		Ok(extended)
	}

	// Size (4), flags (2), padding size (4), [CRC (4)]
	//
	// The size doesn't include itself.
	fn parse_v3(data: &[u8], diagnostics: &mut Diagnostics) -> Result<Self> {
		let size = BigEndian::read_u32(ext_bytes(data, 0, 4)?);
		if size < 6 {
			id3v2_err!(BadExtendedHeaderSize);
		}

		if size != 6 && size != 10 {
			diagnostics.warn(Warning::ExtendedHeaderSize(size));
		}

		let flags = BigEndian::read_u16(ext_bytes(data, 4, 2)?);
		let padding_size = BigEndian::read_u32(ext_bytes(data, 6, 4)?);

		let crc = if flags & V3_EXT_CRC != 0 && size >= 10 {
			Some(BigEndian::read_u32(ext_bytes(data, 10, 4)?))
		} else {
			None
		};

		Ok(Self {
			len: 4 + size as usize,
			padding_size: Some(padding_size),
			crc,
			..Self::default()
		})
	}

	// Size (4, syncsafe), flag byte count (1), flags (1), flag data
	//
	// The size includes itself. Each flag's data is prefixed with its length.
	fn parse_v4(data: &[u8], diagnostics: &mut Diagnostics) -> Result<Self> {
		let size = decode_syncsafe(ext_bytes(data, 0, 4)?)? as u32;
		if size < 6 {
			diagnostics.warn(Warning::ExtendedHeaderSize(size));
		}

		let flag_count = ext_bytes(data, 4, 1)?[0];
		if flag_count != 1 {
			diagnostics.warn(Warning::ExtendedFlagCount(flag_count));
		}

		let mut pos = 5;
		let mut flags = 0;
		if flag_count > 0 {
			flags = ext_bytes(data, pos, 1)?[0];
			pos += usize::from(flag_count);
		}

		let mut extended = Self::default();

		for (flag, expected_len) in [(V4_EXT_UPDATE, 0), (V4_EXT_CRC, 5), (V4_EXT_RESTRICTIONS, 1)] {
			if flags & flag == 0 {
				continue;
			}

			let len = ext_bytes(data, pos, 1)?[0];
			if len & 0x80 != 0 || usize::from(len) != expected_len {
				id3v2_err!(BadExtendedFlagData);
			}

			let flag_data = ext_bytes(data, pos + 1, expected_len)?;
			pos += 1 + expected_len;

			match flag {
				V4_EXT_UPDATE => extended.update = true,
				V4_EXT_CRC => extended.crc = Some(decode_syncsafe(flag_data)? as u32),
				_ => extended.restrictions = Some(TagRestrictions::from_byte(flag_data[0])),
			}
		}

		extended.len = pos.max(size as usize);
		Ok(extended)
	}
}

#[cfg(test)]
mod tests {
	use super::{ExtendedHeader, Id3v2Header, Id3v2Version};
	use crate::config::{ParseOptions, ParsingMode};
	use crate::error::{Diagnostics, Id3v2ErrorKind, Warning};
	use crate::id3::v2::restrictions::TagSizeRestrictions;

	fn parse(header: [u8; 10], mode: ParsingMode) -> (crate::error::Result<Id3v2Header>, Vec<Warning>) {
		let mut diagnostics = Diagnostics::default();
		let result = Id3v2Header::from_bytes(
			&header,
			ParseOptions::new().parsing_mode(mode),
			&mut diagnostics,
		);
		(result, diagnostics.into_inner())
	}

	#[test_log::test]
	fn header_versions() {
		let (header, warnings) = parse(*b"ID3\x03\x00\x00\x00\x00\x02\x01", ParsingMode::BestAttempt);
		let header = header.unwrap();
		assert_eq!(header.version, Id3v2Version::V3);
		assert_eq!(header.size, 257);
		assert_eq!(header.full_tag_size(), 267);
		assert!(warnings.is_empty());

		let (header, _) = parse(*b"ID3\x05\x00\x00\x00\x00\x00\x00", ParsingMode::BestAttempt);
		assert_eq!(
			header.unwrap_err().id3v2_kind(),
			Some(&Id3v2ErrorKind::BadId3v2Version(5, 0))
		);

		let (header, _) = parse(*b"TAG\x03\x00\x00\x00\x00\x00\x00", ParsingMode::BestAttempt);
		assert!(header.unwrap_err().is_no_tag());
	}

	#[test_log::test]
	fn header_revision() {
		let (header, _) = parse(*b"ID3\x04\x01\x00\x00\x00\x00\x00", ParsingMode::BestAttempt);
		assert!(header.is_err());

		let (header, warnings) = parse(*b"ID3\x04\x01\x00\x00\x00\x00\x00", ParsingMode::Relaxed);
		assert!(header.is_ok());
		assert_eq!(warnings, [Warning::UnknownRevision(1)]);
	}

	#[test_log::test]
	fn header_flags() {
		let (header, _) = parse(*b"ID3\x02\x00\x40\x00\x00\x00\x00", ParsingMode::BestAttempt);
		assert_eq!(
			header.unwrap_err().id3v2_kind(),
			Some(&Id3v2ErrorKind::V2Compression)
		);

		let (header, _) = parse(*b"ID3\x02\x00\x20\x00\x00\x00\x00", ParsingMode::BestAttempt);
		assert_eq!(
			header.unwrap_err().id3v2_kind(),
			Some(&Id3v2ErrorKind::UnknownV2Flags(0x20))
		);

		let (header, warnings) = parse(*b"ID3\x04\x00\x91\x00\x00\x00\x00", ParsingMode::Strict);
		let header = header.unwrap();
		assert!(header.flags.unsynchronisation);
		assert!(header.flags.footer);
		assert_eq!(header.full_tag_size(), 20);
		assert_eq!(warnings, [Warning::UnknownTagFlags(0x01)]);

		// The footer bit means nothing in ID3v2.3
		let (header, warnings) = parse(*b"ID3\x03\x00\x10\x00\x00\x00\x00", ParsingMode::Strict);
		assert!(!header.unwrap().flags.footer);
		assert_eq!(warnings, [Warning::UnknownTagFlags(0x10)]);
	}

	#[test_log::test]
	fn bad_header_size() {
		let (header, _) = parse(*b"ID3\x03\x00\x00\x00\x00\x80\x00", ParsingMode::BestAttempt);
		assert_eq!(
			header.unwrap_err().id3v2_kind(),
			Some(&Id3v2ErrorKind::BadSyncsafeInteger)
		);
	}

	#[test_log::test]
	fn extended_header_v3() {
		let mut diagnostics = Diagnostics::default();
		let data = [
			0, 0, 0, 10, 0x80, 0, 0, 0, 0x01, 0x00, 0xDE, 0xAD, 0xBE, 0xEF, b'T',
		];

		let extended = ExtendedHeader::parse(Id3v2Version::V3, &data, &mut diagnostics).unwrap();
		assert_eq!(extended.len, 14);
		assert_eq!(extended.padding_size, Some(256));
		assert_eq!(extended.crc, Some(0xDEAD_BEEF));
		assert!(diagnostics.into_inner().is_empty());
	}

	#[test_log::test]
	fn extended_header_v4() {
		let mut diagnostics = Diagnostics::default();
		let data = [
			0, 0, 0, 15, 1, 0x70, // size, flag count, flags
			0, // update
			5, 0x0F, 0x7F, 0x7F, 0x7F, 0x7F, // CRC
			1, 0x40, // restrictions
		];

		let extended = ExtendedHeader::parse(Id3v2Version::V4, &data, &mut diagnostics).unwrap();
		assert_eq!(extended.len, 15);
		assert!(extended.update);
		assert_eq!(extended.crc, Some(0xFFFF_FFFF));
		assert_eq!(
			extended.restrictions.map(|r| r.size),
			Some(TagSizeRestrictions::S_64F_128K)
		);

		let bad_length = [0, 0, 0, 8, 1, 0x20, 0x85, 0];
		let err = ExtendedHeader::parse(Id3v2Version::V4, &bad_length, &mut diagnostics).unwrap_err();
		assert_eq!(err.id3v2_kind(), Some(&Id3v2ErrorKind::BadExtendedFlagData));
	}
}
