#![allow(missing_docs)]

mod conversion;
mod files;
mod frames;
mod read;

use id3forge::config::{ParseOptions, ParsingMode};
use id3forge::id3::v2::{Frame, FrameFlags, FrameId, Id3v2Tag, Id3v2Version};

use std::fs::File;
use std::io::{Seek as _, Write as _};

/// Decode a frame body, panicking on failure
pub fn decode(id: &'static str, data: &[u8]) -> Frame {
	Frame::decode_body(FrameId::new(id).unwrap(), FrameFlags::default(), data).unwrap()
}

/// Encode and decode `tag` in strict mode
pub fn re_read(tag: &Id3v2Tag) -> Id3v2Tag {
	let bytes = tag.encode(None).unwrap();
	Id3v2Tag::decode_with_options(&bytes, ParseOptions::new().parsing_mode(ParsingMode::Strict))
		.unwrap()
}

/// Build a complete tag of `version` around already encoded frames
pub fn tag_bytes(version: Id3v2Version, flags: u8, frames: &[u8]) -> Vec<u8> {
	let size = frames.len() as u32;
	let mut bytes = vec![b'I', b'D', b'3', version.major(), 0, flags];
	bytes.extend([
		((size >> 21) & 0x7F) as u8,
		((size >> 14) & 0x7F) as u8,
		((size >> 7) & 0x7F) as u8,
		(size & 0x7F) as u8,
	]);
	bytes.extend(frames);
	bytes
}

/// Create a new temporary file holding `content`
pub fn temp_file(content: &[u8]) -> File {
	let mut file = tempfile::tempfile().unwrap();
	file.write_all(content).unwrap();
	file.rewind().unwrap();

	file
}
