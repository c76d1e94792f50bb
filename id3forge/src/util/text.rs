use crate::error::Result;
use crate::macros::err;

/// Errors that can occur while encoding text
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextEncodingError {
	encoding: TextEncoding,
	valid_up_to: usize,
}

impl TextEncodingError {
	/// The target text encoding
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// The character index in the provided string up to which the encoding was valid
	pub fn valid_up_to(&self) -> usize {
		self.valid_up_to
	}
}

impl core::fmt::Display for TextEncodingError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(
			f,
			"invalid {} sequence from index {}",
			self.encoding.name(),
			self.valid_up_to
		)
	}
}

impl core::error::Error for TextEncodingError {}

/// The text encoding for use in ID3v2 frames
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// The order encodings are tried in when a string can't be represented in the
	/// frame's selected encoding
	pub(crate) const PREFERRED: [TextEncoding; 2] = [TextEncoding::Latin1, TextEncoding::UTF16];

	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	/// The width of this encoding's string terminator
	pub fn terminator_len(self) -> usize {
		match self {
			Self::Latin1 | Self::UTF8 => 1,
			Self::UTF16 | Self::UTF16BE => 2,
		}
	}

	fn name(self) -> &'static str {
		match self {
			TextEncoding::Latin1 => "Latin-1",
			TextEncoding::UTF16 => "UTF-16",
			TextEncoding::UTF8 => "UTF-8",
			TextEncoding::UTF16BE => "UTF-16 BE",
		}
	}

	/// ID3v2.4 introduced two new text encodings.
	///
	/// When writing ID3v2.2 and ID3v2.3, we just substitute with UTF-16.
	pub(crate) fn to_id3v23(self) -> Self {
		match self {
			Self::UTF8 | Self::UTF16BE => {
				log::debug!(
					"Text encoding {:?} is not supported before ID3v2.4, substituting with UTF-16",
					self
				);
				Self::UTF16
			},
			_ => self,
		}
	}

	/// Encode `text`, failing if it contains characters the encoding can't represent
	pub(crate) fn encode(
		self,
		text: &str,
		terminated: bool,
	) -> std::result::Result<Vec<u8>, TextEncodingError> {
		match self {
			TextEncoding::Latin1 => {
				let mut out = latin1_encode(text).collect::<std::result::Result<Vec<u8>, _>>()?;
				if terminated {
					out.push(0)
				}

				Ok(out)
			},
			TextEncoding::UTF16 => Ok(utf16_encode(text, u16::to_le_bytes, true, terminated)),
			TextEncoding::UTF16BE => Ok(utf16_encode(text, u16::to_be_bytes, false, terminated)),
			TextEncoding::UTF8 => {
				let mut out = text.as_bytes().to_vec();

				if terminated {
					out.push(0);
				}

				Ok(out)
			},
		}
	}

	/// Decode an entire, unterminated, string
	pub(crate) fn decode(self, bytes: &[u8]) -> Result<String> {
		match self {
			TextEncoding::Latin1 => Ok(latin1_decode(bytes)),
			TextEncoding::UTF16 => {
				if bytes.len() % 2 != 0 {
					err!(TextDecode("UTF-16 string has an odd length"));
				}

				match bytes {
					[0xFE, 0xFF, rest @ ..] => utf16_decode_bytes(rest, u16::from_be_bytes),
					[0xFF, 0xFE, rest @ ..] => utf16_decode_bytes(rest, u16::from_le_bytes),
					_ => utf16_decode_bytes(bytes, u16::from_be_bytes),
				}
			},
			TextEncoding::UTF16BE => {
				if bytes.len() % 2 != 0 {
					err!(TextDecode("UTF-16 string has an odd length"));
				}

				utf16_decode_bytes(bytes, u16::from_be_bytes)
			},
			TextEncoding::UTF8 => Ok(String::from_utf8(bytes.to_vec())?),
		}
	}

	/// Decode a string ending at this encoding's terminator
	///
	/// Returns the string and whatever follows the terminator. A missing terminator means
	/// the string runs to the end of `data`.
	pub(crate) fn decode_terminated(self, data: &[u8]) -> Result<(String, &[u8])> {
		let (text, rest) = split_terminated(data, self.terminator_len());
		Ok((self.decode(text)?, rest))
	}
}

/// Split `data` at the first terminator of the given width
///
/// Two byte terminators are only searched for at even offsets.
pub(crate) fn split_terminated(data: &[u8], terminator_len: usize) -> (&[u8], &[u8]) {
	let position = if terminator_len == 1 {
		data.iter().position(|b| *b == 0)
	} else {
		data.chunks_exact(2)
			.position(|c| c == [0, 0])
			.map(|index| index * 2)
	};

	match position {
		Some(pos) => (&data[..pos], &data[pos + terminator_len..]),
		None => (data, &[]),
	}
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	bytes.iter().map(|c| *c as char).collect::<String>()
}

pub(crate) fn latin1_encode(
	s: &str,
) -> impl Iterator<Item = std::result::Result<u8, TextEncodingError>> {
	s.chars().enumerate().map(move |(index, c)| {
		if (c as u32) <= 255 {
			Ok(c as u8)
		} else {
			Err(TextEncodingError {
				encoding: TextEncoding::Latin1,
				valid_up_to: index, // All characters up to this point are single-byte
			})
		}
	})
}

pub(crate) fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Result<String> {
	let words: Vec<u16> = bytes
		.chunks_exact(2)
		.map(|c| endianness([c[0], c[1]]))
		.collect();

	match String::from_utf16(&words) {
		Ok(text) => Ok(text),
		Err(_) => err!(TextDecode("Given an invalid UTF-16 string")),
	}
}

fn utf16_encode(
	text: &str,
	endianness: fn(u16) -> [u8; 2],
	bom: bool,
	terminated: bool,
) -> Vec<u8> {
	let mut encoded = Vec::<u8>::new();

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	if terminated {
		encoded.extend_from_slice(&[0, 0]);
	}

	encoded
}
