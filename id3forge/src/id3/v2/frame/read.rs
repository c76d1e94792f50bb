use super::Frame;
use super::flags::FrameFlags;
use super::id::FrameId;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Diagnostics, Result, Warning};
use crate::id3::v2::Id3v2Version;
use crate::id3::v2::util::synchsafe::{decode_syncsafe, resynchronise};
use crate::macros::{id3v2_err, parse_mode_choice};

use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

pub(crate) enum ParsedFrame {
	Next(Frame),
	Eof,
}

/// Everything about the tag that affects how its frames are read
#[derive(Copy, Clone, Debug)]
pub(crate) struct FrameContext {
	pub(crate) version: Id3v2Version,
	pub(crate) parse_options: ParseOptions,
	/// ID3v2.4 tags are resynchronised frame by frame
	pub(crate) tag_unsynchronised: bool,
	/// ID3v2.4 frame sizes are plain integers (iTunes)
	pub(crate) plain_sizes: bool,
}

impl FrameContext {
	pub(crate) fn header_len(&self) -> usize {
		match self.version {
			Id3v2Version::V2 => 6,
			Id3v2Version::V3 | Id3v2Version::V4 => 10,
		}
	}
}

/// A raw frame header, before any flags are interpreted
pub(crate) struct RawFrameHeader<'a> {
	pub(crate) id: &'a [u8],
	pub(crate) size: Option<u32>,
	pub(crate) flags: u16,
}

impl<'a> RawFrameHeader<'a> {
	/// Split a frame header off the front of `data`
	///
	/// Returns `None` when the frame stream ends, either from running out of data or from reaching
	/// padding (or garbage) in place of a frame ID. The size is `None` when an ID3v2.4 size isn't
	/// a valid syncsafe integer.
	pub(crate) fn parse(data: &'a [u8], ctx: &FrameContext) -> Option<Self> {
		if data.len() < ctx.header_len() {
			return None;
		}

		let header = match ctx.version {
			Id3v2Version::V2 => RawFrameHeader {
				id: &data[..3],
				size: Some(BigEndian::read_u24(&data[3..6])),
				flags: 0,
			},
			Id3v2Version::V3 => RawFrameHeader {
				id: &data[..4],
				size: Some(BigEndian::read_u32(&data[4..8])),
				flags: BigEndian::read_u16(&data[8..10]),
			},
			Id3v2Version::V4 => RawFrameHeader {
				id: &data[..4],
				size: if ctx.plain_sizes {
					Some(BigEndian::read_u32(&data[4..8]))
				} else {
					decode_syncsafe(&data[4..8]).ok().map(|size| size as u32)
				},
				flags: BigEndian::read_u16(&data[8..10]),
			},
		};

		if !FrameId::is_valid(header.id) {
			log::trace!("End of frames, found {:02X?} in place of an ID", header.id);
			return None;
		}

		Some(header)
	}
}

impl ParsedFrame {
	/// Read the next frame from `data`, advancing it past the frame
	pub(crate) fn read<'a>(
		data: &mut &'a [u8],
		ctx: &FrameContext,
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		let parsing_mode = ctx.parse_options.parsing_mode;

		let current: &'a [u8] = *data;
		let Some(header) = RawFrameHeader::parse(current, ctx) else {
			return Ok(Self::Eof);
		};

		let id = FrameId::from_bytes(header.id)?;
		let size = match header.size {
			Some(size) => size,
			None => {
				parse_mode_choice!(
					parsing_mode,
					STRICT: id3v2_err!(BadSyncsafeInteger),
					DEFAULT: {
						log::warn!("{id}: frame size isn't syncsafe, reading it as a plain integer");
						BigEndian::read_u32(&current[4..8])
					}
				)
			},
		};

		let content = &current[ctx.header_len()..];

		let mut size = size as usize;
		if size > content.len() {
			parse_mode_choice!(
				parsing_mode,
				STRICT: id3v2_err!(BadFrameLength),
				RELAXED: {
					diagnostics.warn(Warning::TruncatedFrame(id.clone()));
					size = content.len();
				},
				DEFAULT: {
					diagnostics.warn(Warning::TruncatedFrame(id));
					*data = &[];
					return Ok(Self::Eof);
				}
			);
		}

		let (body, rest) = content.split_at(size);
		*data = rest;

		log::trace!("Reading frame {id} ({size} bytes, flags: {:#06x})", header.flags);

		match unpack_frame(id.clone(), header.flags, body, ctx, diagnostics) {
			Ok(frame) => Ok(Self::Next(frame)),
			Err(e) if parsing_mode == ParsingMode::Strict => Err(e),
			Err(e) => {
				log::debug!("{id}: failed to decode, keeping the raw data: {e}");
				Ok(Self::Next(Frame::error_frame(id, body.to_vec(), e)))
			},
		}
	}
}

// Undo all of the frame level transformations, and decode the body
fn unpack_frame(
	id: FrameId,
	raw_flags: u16,
	body: &[u8],
	ctx: &FrameContext,
	diagnostics: &mut Diagnostics,
) -> Result<Frame> {
	let (mut flags, unknown_status) = FrameFlags::parse(ctx.version, raw_flags)?;
	if unknown_status != 0 {
		diagnostics.warn(Warning::UnknownFrameStatusFlags {
			id: id.clone(),
			flags: unknown_status,
		});
	}

	if flags.encryption {
		id3v2_err!(EncryptedFrame);
	}

	let mut body = Cow::Borrowed(body);
	let mut data_length = None;

	// ID3v2.3 puts the decompressed size first, ID3v2.4 the group
	match ctx.version {
		Id3v2Version::V2 => {},
		Id3v2Version::V3 => {
			if flags.compression {
				let (len, rest) = split_prefix(&body, 4)?;
				data_length = Some(BigEndian::read_u32(len));
				body = Cow::Owned(rest.to_vec());
			}

			if let Some(group) = flags.grouping_identity.as_mut() {
				let (byte, rest) = split_prefix(&body, 1)?;
				*group = byte[0];
				body = Cow::Owned(rest.to_vec());
			}
		},
		Id3v2Version::V4 => {
			if let Some(group) = flags.grouping_identity.as_mut() {
				let (byte, rest) = split_prefix(&body, 1)?;
				*group = byte[0];
				body = Cow::Owned(rest.to_vec());
			}

			if flags.data_length_indicator {
				let (len, rest) = split_prefix(&body, 4)?;
				data_length = Some(decode_syncsafe(len)? as u32);
				body = Cow::Owned(rest.to_vec());
			}

			if flags.unsynchronisation || ctx.tag_unsynchronised {
				body = Cow::Owned(resynchronise(&body));
			}

			if flags.compression && data_length.is_none() {
				id3v2_err!(MissingDataLengthIndicator);
			}
		},
	}

	if flags.compression {
		body = Cow::Owned(decompress(&body, data_length.unwrap_or_default())?);
	}

	Frame::decode_body_with(id, flags, &body, diagnostics)
}

fn split_prefix(body: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
	if body.len() < len {
		id3v2_err!(BadFrameLength);
	}

	Ok(body.split_at(len))
}

#[cfg(feature = "id3v2_compression_support")]
fn decompress(data: &[u8], expected: u32) -> Result<Vec<u8>> {
	use crate::error::Id3v2ErrorKind;
	use crate::util::alloc::VecFallibleCapacity;
	use std::io::Read;

	let mut decompressed = Vec::try_with_capacity_stable(expected as usize)?;
	flate2::read::ZlibDecoder::new(data)
		.take(u64::from(expected) + 1)
		.read_to_end(&mut decompressed)
		.map_err(|e| Id3v2ErrorKind::Decompression(e.to_string()))?;

	if decompressed.len() != expected as usize {
		id3v2_err!(DataLengthMismatch {
			expected,
			actual: decompressed.len()
		});
	}

	Ok(decompressed)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn decompress(_: &[u8], _: u32) -> Result<Vec<u8>> {
	id3v2_err!(CompressedFrameEncountered)
}

#[cfg(test)]
mod tests {
	use super::{FrameContext, ParsedFrame};
	use crate::config::{ParseOptions, ParsingMode};
	use crate::error::{Diagnostics, Id3v2ErrorKind, Warning};
	use crate::id3::v2::Id3v2Version;

	fn ctx(version: Id3v2Version, parsing_mode: ParsingMode) -> FrameContext {
		FrameContext {
			version,
			parse_options: ParseOptions::new().parsing_mode(parsing_mode),
			tag_unsynchronised: false,
			plain_sizes: false,
		}
	}

	fn read_all(
		mut data: &[u8],
		ctx: &FrameContext,
	) -> (Vec<crate::id3::v2::Frame>, Vec<Warning>) {
		let mut diagnostics = Diagnostics::default();
		let mut frames = Vec::new();
		while let ParsedFrame::Next(frame) =
			ParsedFrame::read(&mut data, ctx, &mut diagnostics).unwrap()
		{
			frames.push(frame);
		}

		(frames, diagnostics.into_inner())
	}

	#[test_log::test]
	fn v22_frames() {
		let data = b"TT2\x00\x00\x06\x00Hello\x00\x00\x00\x00";
		let (frames, warnings) = read_all(data, &ctx(Id3v2Version::V2, ParsingMode::Strict));
		assert!(warnings.is_empty());
		assert_eq!(frames.len(), 1);
		assert_eq!(frames[0].id_str(), "TT2");
		assert_eq!(frames[0].text_values(), ["Hello"]);
	}

	#[test_log::test]
	fn v23_grouped_frame() {
		// Group identity follows the header
		let data = b"TIT2\x00\x00\x00\x04\x00\x20\x07\x00Hi";
		let (frames, _) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::Strict));
		assert_eq!(frames[0].flags.grouping_identity, Some(7));
		assert_eq!(frames[0].text_values(), ["Hi"]);
	}

	#[test_log::test]
	fn v24_unsynchronised_frame() {
		let data = b"PRIV\x00\x00\x00\x05\x00\x02a\x00\xFF\x00\xE0";
		let (frames, _) = read_all(data, &ctx(Id3v2Version::V4, ParsingMode::Strict));
		assert_eq!(frames[0].get("owner").and_then(|v| v.as_text()), Some("a"));
		assert_eq!(
			frames[0].get("data").and_then(|v| v.as_binary()),
			Some(&[0xFF, 0xE0][..])
		);
	}

	#[test_log::test]
	fn truncated_frames() {
		let data = b"TIT2\x00\x00\x00\x10\x00\x00\x00Short";

		let mut strict = &data[..];
		let err = ParsedFrame::read(
			&mut strict,
			&ctx(Id3v2Version::V3, ParsingMode::Strict),
			&mut Diagnostics::default(),
		)
		.err()
		.unwrap();
		assert_eq!(err.id3v2_kind(), Some(&Id3v2ErrorKind::BadFrameLength));

		let (frames, warnings) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::BestAttempt));
		assert!(frames.is_empty());
		assert!(matches!(warnings[..], [Warning::TruncatedFrame(_)]));

		let (frames, _) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::Relaxed));
		assert_eq!(frames[0].text_values(), ["Short"]);
	}

	#[test_log::test]
	fn error_frames() {
		let data = b"TIT2\x00\x00\x00\x03\x00\x00\x09ab";

		let (frames, _) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::BestAttempt));
		assert!(frames[0].is_error());
		assert_eq!(frames[0].raw_data(), Some(&b"\x09ab"[..]));

		let mut strict = &data[..];
		assert!(
			ParsedFrame::read(
				&mut strict,
				&ctx(Id3v2Version::V3, ParsingMode::Strict),
				&mut Diagnostics::default()
			)
			.is_err()
		);
	}

	#[test_log::test]
	fn encrypted_frame() {
		let data = b"TIT2\x00\x00\x00\x03\x00\x40\x01ab";
		let (frames, _) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::BestAttempt));
		assert_eq!(
			frames[0].error().and_then(|e| e.id3v2_kind()),
			Some(&Id3v2ErrorKind::EncryptedFrame)
		);
	}

	#[test_log::test]
	fn unknown_status_flags() {
		let data = b"TIT2\x00\x00\x00\x03\x01\x00\x00ab";
		let (frames, warnings) = read_all(data, &ctx(Id3v2Version::V3, ParsingMode::Strict));
		assert_eq!(frames.len(), 1);
		assert!(matches!(
			warnings[..],
			[Warning::UnknownFrameStatusFlags { flags: 0x0100, .. }]
		));
	}

	#[cfg(feature = "id3v2_compression_support")]
	#[test_log::test]
	fn compressed_frames() {
		use flate2::Compression;
		use flate2::write::ZlibEncoder;
		use std::io::Write;

		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(b"\x00Compressed").unwrap();
		let compressed = encoder.finish().unwrap();

		// ID3v2.3: decompressed size, then the zlib stream
		let mut v3 = b"TIT2".to_vec();
		v3.extend((compressed.len() as u32 + 4).to_be_bytes());
		v3.extend([0x00, 0x80]);
		v3.extend(11_u32.to_be_bytes());
		v3.extend(&compressed);

		let (frames, _) = read_all(&v3, &ctx(Id3v2Version::V3, ParsingMode::Strict));
		assert_eq!(frames[0].text_values(), ["Compressed"]);
		assert!(frames[0].flags.compression);

		// ID3v2.4 requires a data length indicator
		let mut v4 = b"TIT2".to_vec();
		v4.extend([0x00, 0x00, 0x00, compressed.len() as u8]);
		v4.extend([0x00, 0x08]);
		v4.extend(&compressed);

		let (frames, _) = read_all(&v4, &ctx(Id3v2Version::V4, ParsingMode::BestAttempt));
		assert_eq!(
			frames[0].error().and_then(|e| e.id3v2_kind()),
			Some(&Id3v2ErrorKind::MissingDataLengthIndicator)
		);

		// Wrong decompressed size
		let mut bad = b"TIT2".to_vec();
		bad.extend((compressed.len() as u32 + 4).to_be_bytes());
		bad.extend([0x00, 0x80]);
		bad.extend(99_u32.to_be_bytes());
		bad.extend(&compressed);

		let (frames, _) = read_all(&bad, &ctx(Id3v2Version::V3, ParsingMode::BestAttempt));
		assert_eq!(
			frames[0].error().and_then(|e| e.id3v2_kind()),
			Some(&Id3v2ErrorKind::DataLengthMismatch {
				expected: 99,
				actual: 11
			})
		);
	}
}
