use crate::tag_bytes;

use id3forge::config::{ParseOptions, ParsingMode};
use id3forge::error::{Id3v2ErrorKind, Warning};
use id3forge::id3::v2::{Id3v2Tag, Id3v2Version};

// TIT2 claims 20 bytes, only 7 are present
const TRUNCATED: &[u8] = b"TIT2\x00\x00\x00\x14\x00\x00\x00Hello\x00";

fn decode(bytes: &[u8], parsing_mode: ParsingMode) -> id3forge::error::Result<Id3v2Tag> {
	Id3v2Tag::decode_with_options(bytes, ParseOptions::new().parsing_mode(parsing_mode))
}

#[test_log::test]
fn truncated_frame() {
	let bytes = tag_bytes(Id3v2Version::V3, 0, TRUNCATED);

	let err = decode(&bytes, ParsingMode::Strict).unwrap_err();
	assert!(matches!(err.id3v2_kind(), Some(Id3v2ErrorKind::BadFrameLength)));

	let tag = decode(&bytes, ParsingMode::BestAttempt).unwrap();
	assert!(tag.is_empty());
	assert!(matches!(tag.warnings(), [Warning::TruncatedFrame(id)] if id.as_str() == "TIT2"));

	let tag = decode(&bytes, ParsingMode::Relaxed).unwrap();
	assert_eq!(tag.get_first("TIT2").unwrap().text_values(), ["Hello"]);
	assert!(matches!(tag.warnings(), [Warning::TruncatedFrame(_)]));
}

#[test_log::test]
fn bad_frames_become_error_frames() {
	let frames = b"\
	TIT2\x00\x00\x00\x04\x00\x00\x09Foo\
	TPE1\x00\x00\x00\x04\x00\x00\x00Bar";
	let bytes = tag_bytes(Id3v2Version::V3, 0, frames);

	assert!(decode(&bytes, ParsingMode::Strict).is_err());

	let tag = decode(&bytes, ParsingMode::BestAttempt).unwrap();
	assert_eq!(tag.len(), 2);

	let broken = tag.get_first("TIT2").unwrap();
	assert!(broken.is_error());
	assert!(matches!(
		broken.error().and_then(|e| e.id3v2_kind()),
		Some(Id3v2ErrorKind::BadTextEncoding(9))
	));
	assert_eq!(broken.raw_data(), Some(&b"\x09Foo"[..]));

	assert_eq!(tag.get_first("TPE1").unwrap().text_values(), ["Bar"]);
}

#[test_log::test]
fn padded_tag_size() {
	let mut frames = b"TALB\x00\x00\x00\x06\x00\x00\x00Album".to_vec();
	frames.extend([0; 64]);

	let tag = decode(&tag_bytes(Id3v2Version::V3, 0, &frames), ParsingMode::Strict).unwrap();
	assert_eq!(tag.len(), 1);
	assert_eq!(tag.size(), 10 + frames.len() as u64);
}

#[test_log::test]
fn itunes_frame_sizes() {
	let mut body = vec![0_u8];
	body.extend([b'a'; 255]);

	// A 256 byte frame, with a plain size
	let mut frames = b"TIT2\x00\x00\x01\x00\x00\x00".to_vec();
	frames.extend(&body);
	frames.extend(b"TPE1\x00\x00\x00\x04\x00\x00\x00Bar");
	let bytes = tag_bytes(Id3v2Version::V4, 0, &frames);

	let options = ParseOptions::new().detect_itunes_frame_sizes(true);
	let tag = Id3v2Tag::decode_with_options(&bytes, options).unwrap();
	assert_eq!(tag.warnings(), [Warning::PlainFrameSizes]);
	assert_eq!(tag.len(), 2);
	assert_eq!(tag.get_first("TIT2").unwrap().text_values()[0].len(), 255);
	assert_eq!(tag.get_first("TPE1").unwrap().text_values(), ["Bar"]);

	// Written back with syncsafe sizes
	let fixed = Id3v2Tag::decode(&tag.encode(None).unwrap()).unwrap();
	assert!(fixed.warnings().is_empty());
	assert_eq!(fixed.get("TPE1").count(), 1);
}

#[test_log::test]
fn unsynchronised_v23_tag() {
	// PRIV frame holding 0xFF 0xE0, unsynchronised
	let frames = b"PRIV\x00\x00\x00\x04\x00\x00a\x00\xff\x00\xe0";
	let tag = decode(&tag_bytes(Id3v2Version::V3, 0x80, frames), ParsingMode::Strict).unwrap();

	let frame = tag.get_first("PRIV").unwrap();
	assert_eq!(
		frame.get("data").and_then(|v| v.as_binary()),
		Some(&[0xFF, 0xE0][..])
	);
}

#[test_log::test]
fn unknown_frames_survive() {
	let frames = b"XYZW\x00\x00\x00\x03\x00\x00\x01\x02\x03";
	let tag = decode(&tag_bytes(Id3v2Version::V4, 0, frames), ParsingMode::Strict).unwrap();

	let frame = tag.get_first("XYZW").unwrap();
	assert!(frame.is_unknown());

	let mut written = tag.clone();
	written.padding_max = 0;
	assert_eq!(
		written.encode(None).unwrap(),
		tag_bytes(Id3v2Version::V4, 0, frames)
	);
}

#[test_log::test]
#[cfg(feature = "id3v2_compression_support")]
fn compressed_frames() {
	use id3forge::id3::v2::Frame;

	for version in [Id3v2Version::V3, Id3v2Version::V4] {
		let text = "la ".repeat(100);

		let mut frame = Frame::text("TIT2", [text.as_str()]).unwrap();
		frame.flags.compression = true;

		let mut tag = Id3v2Tag::new(version);
		tag.padding_max = 0;
		tag.insert(frame);

		let bytes = tag.encode(None).unwrap();
		assert!(bytes.len() < text.len());

		let decoded = decode(&bytes, ParsingMode::Strict).unwrap();
		let frame = decoded.get_first("TIT2").unwrap();
		assert!(frame.flags.compression);
		assert_eq!(frame.text_values(), [text.as_str()]);
	}
}
