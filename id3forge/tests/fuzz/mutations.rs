use crate::{decode_everything, sample_tag};

use id3forge::id3::v2::Id3v2Version;

const INTERESTING: [u8; 6] = [0x00, 0x01, 0x7F, 0x80, 0xE0, 0xFF];

fn mutate_every_byte(version: Id3v2Version) {
	let original = sample_tag(version);

	for position in 0..original.len() {
		for value in INTERESTING {
			let mut data = original.clone();
			data[position] = value;
			decode_everything(&data);
		}
	}
}

#[test_log::test]
fn mutated_v22() {
	mutate_every_byte(Id3v2Version::V2);
}

#[test_log::test]
fn mutated_v23() {
	mutate_every_byte(Id3v2Version::V3);
}

#[test_log::test]
fn mutated_v24() {
	mutate_every_byte(Id3v2Version::V4);
}

#[test_log::test]
fn truncated() {
	for version in [Id3v2Version::V2, Id3v2Version::V3, Id3v2Version::V4] {
		let original = sample_tag(version);
		for len in 0..original.len() {
			decode_everything(&original[..len]);
		}
	}
}

#[test_log::test]
fn empty_frames() {
	// Every known ID with an empty body
	for schema in id3forge::id3::v2::schemas() {
		let id = schema.id().as_bytes();
		let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x0A".to_vec();
		if id.len() == 3 {
			data[3] = 2;
			data[9] = 6;
			data.extend(id);
			data.extend([0, 0, 0]);
		} else {
			data.extend(id);
			data.extend([0; 6]);
		}

		decode_everything(&data);
	}
}
