#![no_main]

use id3forge::config::{ParseOptions, ParsingMode};
use id3forge::id3::v2::Id3v2Tag;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	for mode in [ParsingMode::Strict, ParsingMode::BestAttempt, ParsingMode::Relaxed] {
		let options = ParseOptions::new()
			.parsing_mode(mode)
			.detect_itunes_frame_sizes(true);
		let _ = Id3v2Tag::decode_with_options(data, options);
	}
});
