use crate::temp_file;

use id3forge::config::{ParseOptions, WriteOptions};
use id3forge::id3::find_id3v2;
use id3forge::id3::v2::{Frame, Id3v2Tag, Id3v2Version, read_from, read_from_path};

use std::io::{Read as _, Seek as _, Write as _};

use tempfile::NamedTempFile;

const AUDIO: &[u8] = b"\xff\xfb\x90\x64\x00\x00\x00\x00audio data";

fn tag() -> Id3v2Tag {
	let mut tag = Id3v2Tag::new(Id3v2Version::V4);
	tag.insert(Frame::text("TIT2", ["Title"]).unwrap());
	tag.insert(Frame::text("TPE1", ["Artist"]).unwrap());
	tag
}

fn named_file(content: &[u8]) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(content).unwrap();
	file.flush().unwrap();
	file
}

fn save_and_read(in_place: bool) {
	let file = named_file(AUDIO);

	let tag = tag();
	tag.save_to_path(file.path(), WriteOptions::new().in_place(in_place))
		.unwrap();

	let content = std::fs::read(file.path()).unwrap();
	assert!(content.ends_with(AUDIO));

	let read = read_from_path(file.path(), ParseOptions::new()).unwrap();
	assert_eq!(read.get_first("TIT2").unwrap().text_values(), ["Title"]);
	assert_eq!(read.size() + AUDIO.len() as u64, content.len() as u64);

	// Replacing the tag reuses its space
	let mut smaller = read.clone();
	smaller.remove("TPE1");
	smaller
		.save_to_path(file.path(), WriteOptions::new().in_place(in_place))
		.unwrap();

	let replaced = std::fs::read(file.path()).unwrap();
	assert_eq!(replaced.len(), content.len());
	assert!(replaced.ends_with(AUDIO));

	let read = read_from_path(file.path(), ParseOptions::new()).unwrap();
	assert_eq!(read.len(), 1);

	assert!(Id3v2Tag::remove_from_path(file.path()).unwrap());
	assert_eq!(std::fs::read(file.path()).unwrap(), AUDIO);
	assert!(!Id3v2Tag::remove_from_path(file.path()).unwrap());
}

#[test_log::test]
fn save_in_place() {
	save_and_read(true);
}

#[test_log::test]
fn save_through_temp_file() {
	save_and_read(false);
}

#[test_log::test]
fn growing_tag() {
	let mut file = temp_file(AUDIO);

	let mut tag = tag();
	tag.padding_max = 0;
	tag.save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let first_len = find_id3v2(&mut file).unwrap();

	let private = Frame::new("PRIV")
		.unwrap()
		.with("owner", "owner")
		.unwrap()
		.with("data", vec![0_u8; 4096])
		.unwrap();
	tag.insert(private);
	tag.save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let second_len = find_id3v2(&mut file).unwrap();
	assert!(second_len > first_len + 4096);

	file.rewind().unwrap();
	let mut content = Vec::new();
	file.read_to_end(&mut content).unwrap();

	assert_eq!(content.len() as u64, second_len + AUDIO.len() as u64);
	assert!(content.ends_with(AUDIO));

	file.rewind().unwrap();
	let read = read_from(&mut file, ParseOptions::new()).unwrap();
	assert_eq!(read.len(), 3);
}

#[test_log::test]
fn no_tag() {
	let file = named_file(AUDIO);

	let err = read_from_path(file.path(), ParseOptions::new()).unwrap_err();
	assert!(err.is_no_tag());

	let mut file = temp_file(b"");
	assert!(find_id3v2(&mut file).unwrap_err().is_no_tag());
	assert!(!Id3v2Tag::remove_from(&mut file).unwrap());
}

#[test_log::test]
fn find_leaves_position() {
	let mut file = temp_file(AUDIO);
	tag().save_to(&mut file, WriteOptions::default()).unwrap();

	file.rewind().unwrap();
	let len = find_id3v2(&mut file).unwrap();
	assert_eq!(file.stream_position().unwrap(), 0);

	let mut tag = tag();
	tag.flags_mut().footer = true;
	tag.save_to(&mut file, WriteOptions::default()).unwrap();

	// Footer, and no padding
	file.rewind().unwrap();
	let with_footer = find_id3v2(&mut file).unwrap();
	assert!(with_footer < len);
	assert_eq!(with_footer, tag.encode(None).unwrap().len() as u64);
}
