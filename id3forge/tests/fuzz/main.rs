#![allow(missing_docs)]

use id3forge::config::{ParseOptions, ParsingMode};
use id3forge::id3::v2::{Frame, Id3v2Tag, Id3v2Version};

use std::thread;
use std::time::Instant;

mod mutations;
mod sizes;

const MODES: [ParsingMode; 3] = [
	ParsingMode::Strict,
	ParsingMode::BestAttempt,
	ParsingMode::Relaxed,
];

/// A tag touching most of the reader: extended header, several frame types, padding
pub fn sample_tag(version: Id3v2Version) -> Vec<u8> {
	let mut tag = Id3v2Tag::new(version);
	tag.padding_default = 16;
	tag.flags_mut().crc_present = version != Id3v2Version::V2;

	tag.insert(Frame::text("TIT2", ["Title", "Second"]).unwrap());
	tag.insert(
		Frame::new("COMM")
			.unwrap()
			.with("lang", "eng")
			.unwrap()
			.with("desc", "")
			.unwrap()
			.with("text", "\u{2713}")
			.unwrap(),
	);
	tag.insert(
		Frame::new("APIC")
			.unwrap()
			.with("mime", "image/png")
			.unwrap()
			.with("type", 3_u8)
			.unwrap()
			.with("desc", "")
			.unwrap()
			.with("data", vec![0xFF_u8, 0xE0, 0x89, b'P', b'N', b'G'])
			.unwrap(),
	);
	tag.insert(Frame::new("PCNT").unwrap().with("count", 7_u32).unwrap());

	tag.encode(None).unwrap()
}

/// Decode `data` in every parsing mode, re-encoding anything that was read
///
/// Only panics are failures.
pub fn decode_everything(data: &[u8]) {
	for mode in MODES {
		let options = ParseOptions::new()
			.parsing_mode(mode)
			.detect_itunes_frame_sizes(true);

		if let Ok(tag) = Id3v2Tag::decode_with_options(data, options) {
			let _ = tag.encode(None);
			for version in [Id3v2Version::V2, Id3v2Version::V3, Id3v2Version::V4] {
				let _ = tag.with_version(version).encode(Some(data.len() as u64));
			}
		}
	}
}

/// Run `f` on another thread, failing if it takes too long (usually from a huge allocation)
pub fn oom_test<F>(f: F)
where
	F: FnOnce() + Send + 'static,
{
	let instant = Instant::now();
	let thread = thread::spawn(f);

	while instant.elapsed().as_secs() < 3 {
		if thread.is_finished() {
			assert!(thread.join().is_ok());
			return;
		}
	}

	panic!("Failed to run test");
}
