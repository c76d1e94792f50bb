#![no_main]

use id3forge::id3::v2::{Id3v2Tag, Id3v2Version};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	let Ok(tag) = Id3v2Tag::decode(data) else {
		return;
	};

	for version in [Id3v2Version::V2, Id3v2Version::V3, Id3v2Version::V4] {
		let Ok(bytes) = tag.with_version(version).encode(None) else {
			continue;
		};

		// Anything written must read back
		if let Err(e) = Id3v2Tag::decode(&bytes) {
			panic!("Failed to read back a {version} tag: {e}");
		}
	}
});
