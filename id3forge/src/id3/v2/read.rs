use super::frame::id::FrameId;
use super::frame::read::{FrameContext, ParsedFrame};
use super::header::{ExtendedHeader, HEADER_LEN, Id3v2Header, Id3v2Version};
use super::tag::Id3v2Tag;
use super::util::synchsafe::{UnsynchronizedStream, decode_syncsafe};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Diagnostics, Result, Warning};
use crate::util::alloc::VecFallibleCapacity;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

/// Read an ID3v2 tag from the current position of `reader`
///
/// # Errors
///
/// * There is no tag at the current position ([`ErrorKind::NoTag`](crate::error::ErrorKind::NoTag))
/// * The tag header is malformed
/// * With [`ParsingMode::Strict`], any frame fails to decode
///
/// # Examples
///
/// ```rust
/// use id3forge::config::ParseOptions;
/// use id3forge::id3::v2::read_from;
///
/// # fn main() -> id3forge::error::Result<()> {
/// let bytes = b"ID3\x03\x00\x00\x00\x00\x00\x10TIT2\x00\x00\x00\x06\x00\x00\x00Hello";
/// let tag = read_from(&mut &bytes[..], ParseOptions::new())?;
///
/// assert_eq!(tag.get_first("TIT2").unwrap().text_values(), ["Hello"]);
/// # Ok(()) }
/// ```
pub fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<Id3v2Tag>
where
	R: Read,
{
	let mut diagnostics = Diagnostics::default();
	let header = Id3v2Header::parse(reader, parse_options, &mut diagnostics)?;
	parse_id3v2(reader, header, parse_options, diagnostics)
}

/// Read an ID3v2 tag from the start of the file at `path`
///
/// # Errors
///
/// * `path` can't be opened
/// * See [`read_from`]
pub fn read_from_path(path: impl AsRef<Path>, parse_options: ParseOptions) -> Result<Id3v2Tag> {
	let mut reader = BufReader::new(File::open(path)?);
	read_from(&mut reader, parse_options)
}

pub(crate) fn parse_id3v2<R>(
	reader: &mut R,
	header: Id3v2Header,
	parse_options: ParseOptions,
	mut diagnostics: Diagnostics,
) -> Result<Id3v2Tag>
where
	R: Read,
{
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	let mut flags = header.flags;

	// ID3v2.4 unsynchronises each frame separately
	let resynchronise = flags.unsynchronisation && header.version != Id3v2Version::V4;

	let mut body = Vec::try_with_capacity_stable(header.size as usize)?;
	let mut raw = reader.by_ref().take(u64::from(header.size));
	let remaining = if resynchronise {
		log::trace!("Resynchronising tag body");

		let mut stream = UnsynchronizedStream::new(raw);
		stream.read_to_end(&mut body)?;
		stream.into_inner().limit()
	} else {
		raw.read_to_end(&mut body)?;
		raw.limit()
	};

	if remaining > 0 {
		if parse_options.parsing_mode == ParsingMode::Strict {
			return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
		}

		log::warn!("Tag body is {remaining} bytes short, reading what remains");
	}

	if header.flags.footer {
		let mut footer = [0; HEADER_LEN];
		if reader.read_exact(&mut footer).is_err() || &footer[..3] != b"3DI" {
			log::debug!("Tag footer is missing or malformed, ignoring");
		}
	}

	let mut extended = ExtendedHeader::default();
	if flags.extended_header && header.version != Id3v2Version::V2 {
		extended = ExtendedHeader::parse(header.version, &body, &mut diagnostics)?;
		flags.crc_present = extended.crc.is_some();
		flags.update = extended.update;
		flags.restrictions = extended.restrictions;
	}

	let frame_data = &body[extended.len..];

	let mut plain_sizes = false;
	if header.version == Id3v2Version::V4 && parse_options.detect_itunes_frame_sizes {
		plain_sizes = uses_plain_frame_sizes(frame_data);
		if plain_sizes {
			diagnostics.warn(Warning::PlainFrameSizes);
		}
	}

	let ctx = FrameContext {
		version: header.version,
		parse_options,
		tag_unsynchronised: flags.unsynchronisation,
		plain_sizes,
	};

	let mut tag = Id3v2Tag::new(header.version);
	*tag.flags_mut() = flags;

	let mut remaining = frame_data;
	while let ParsedFrame::Next(frame) = ParsedFrame::read(&mut remaining, &ctx, &mut diagnostics)? {
		tag.insert(frame);
	}

	log::debug!(
		"Read {} frames, {} bytes of padding",
		tag.len(),
		remaining.len()
	);

	tag.size = header.full_tag_size();
	tag.extended_padding_size = extended.padding_size;
	tag.crc = extended.crc;
	tag.warnings = diagnostics.into_inner();

	Ok(tag)
}

// Some versions of iTunes wrote ID3v2.4 frame sizes as plain integers. Walk the frames
// assuming each interpretation, and pick whichever gets further.
fn uses_plain_frame_sizes(frame_data: &[u8]) -> bool {
	let syncsafe = count_frames(frame_data, true);
	let plain = count_frames(frame_data, false);

	log::debug!("Frame size detection: {syncsafe} syncsafe, {plain} plain");
	plain > syncsafe
}

fn count_frames(mut data: &[u8], syncsafe: bool) -> usize {
	let mut count = 0;

	while data.len() >= 10 && FrameId::is_valid(&data[..4]) {
		// Undefined flag bits are a sign of a misaligned header
		if data[8] & 0x8F != 0 || data[9] & 0xB0 != 0 {
			break;
		}

		let size = if syncsafe {
			match decode_syncsafe(&data[4..8]) {
				Ok(size) => size as usize,
				Err(_) => break,
			}
		} else {
			BigEndian::read_u32(&data[4..8]) as usize
		};

		let Some(rest) = data.get(10 + size..) else {
			break;
		};

		count += 1;
		data = rest;
	}

	count
}
