//! ID3v2.4 tag restrictions
//!
//! These are advisory, stored as a single byte in the extended header. id3forge keeps them
//! intact across a read and write, but does not enforce them.

/// Restrictions on the tag size
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TagSizeRestrictions {
	/// No more than 128 frames and 1 MB total tag size
	#[default]
	S_128F_1M,
	/// No more than 64 frames and 128 KB total tag size
	S_64F_128K,
	/// No more than 32 frames and 40 KB total tag size
	S_32F_40K,
	/// No more than 32 frames and 4 KB total tag size
	S_32F_4K,
}

/// Restrictions on text field sizes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextSizeRestrictions {
	/// No longer than 1024 characters
	C_1024,
	/// No longer than 128 characters
	C_128,
	/// No longer than 30 characters
	C_30,
}

/// Restrictions on all image sizes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ImageSizeRestrictions {
	/// All images are 256x256 or smaller
	P_256,
	/// All images are 64x64 or smaller
	P_64,
	/// All images are **exactly** 64x64
	P_64_64,
}

const SIZE_MASK: u8 = 0b1100_0000;
const TEXT_ENCODING: u8 = 0b0010_0000;
const TEXT_SIZE_MASK: u8 = 0b0001_1000;
const IMAGE_ENCODING: u8 = 0b0000_0100;
const IMAGE_SIZE_MASK: u8 = 0b0000_0011;

/// Restrictions on the content of an ID3v2.4 tag
///
/// See <https://id3.org/id3v2.4.0-structure> section 3.2, item d
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagRestrictions {
	/// Restriction on the size of the tag. See [`TagSizeRestrictions`]
	pub size: TagSizeRestrictions,
	/// Strings are only encoded with [`TextEncoding::Latin1`](crate::TextEncoding::Latin1) or [`TextEncoding::UTF8`](crate::TextEncoding::UTF8)
	pub text_encoding: bool,
	/// Restrictions on all text field sizes. See [`TextSizeRestrictions`]
	pub text_fields_size: Option<TextSizeRestrictions>,
	/// Images can only be `PNG` or `JPEG`
	pub image_encoding: bool,
	/// Restrictions on all image sizes. See [`ImageSizeRestrictions`]
	pub image_size: Option<ImageSizeRestrictions>,
}

impl TagRestrictions {
	/// Read a [`TagRestrictions`] from a byte
	pub fn from_byte(byte: u8) -> Self {
		let size = match (byte & SIZE_MASK) >> 6 {
			1 => TagSizeRestrictions::S_64F_128K,
			2 => TagSizeRestrictions::S_32F_40K,
			3 => TagSizeRestrictions::S_32F_4K,
			_ => TagSizeRestrictions::S_128F_1M,
		};

		let text_fields_size = match (byte & TEXT_SIZE_MASK) >> 3 {
			1 => Some(TextSizeRestrictions::C_1024),
			2 => Some(TextSizeRestrictions::C_128),
			3 => Some(TextSizeRestrictions::C_30),
			_ => None,
		};

		let image_size = match byte & IMAGE_SIZE_MASK {
			1 => Some(ImageSizeRestrictions::P_256),
			2 => Some(ImageSizeRestrictions::P_64),
			3 => Some(ImageSizeRestrictions::P_64_64),
			_ => None,
		};

		Self {
			size,
			text_encoding: byte & TEXT_ENCODING != 0,
			text_fields_size,
			image_encoding: byte & IMAGE_ENCODING != 0,
			image_size,
		}
	}

	/// Convert a [`TagRestrictions`] into a `u8`
	#[allow(clippy::trivially_copy_pass_by_ref)]
	pub fn as_byte(&self) -> u8 {
		let size: u8 = match self.size {
			TagSizeRestrictions::S_128F_1M => 0,
			TagSizeRestrictions::S_64F_128K => 1,
			TagSizeRestrictions::S_32F_40K => 2,
			TagSizeRestrictions::S_32F_4K => 3,
		};

		let text_size: u8 = match self.text_fields_size {
			None => 0,
			Some(TextSizeRestrictions::C_1024) => 1,
			Some(TextSizeRestrictions::C_128) => 2,
			Some(TextSizeRestrictions::C_30) => 3,
		};

		let image_size: u8 = match self.image_size {
			None => 0,
			Some(ImageSizeRestrictions::P_256) => 1,
			Some(ImageSizeRestrictions::P_64) => 2,
			Some(ImageSizeRestrictions::P_64_64) => 3,
		};

		let mut byte = (size << 6) | (text_size << 3) | image_size;
		if self.text_encoding {
			byte |= TEXT_ENCODING;
		}

		if self.image_encoding {
			byte |= IMAGE_ENCODING;
		}

		byte
	}
}
