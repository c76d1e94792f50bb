use crate::decode;

use id3forge::TextEncoding;
use id3forge::id3::v2::{FieldValue, Frame, FrameFlags, FrameId, Id3v2Version};

fn text(value: &FieldValue) -> &str {
	value.as_text().unwrap()
}

#[test_log::test]
fn parse_apic() {
	let frame = decode(
		"APIC",
		b"\
	\x00\
	m\x00\
	\x01\
	d\x00\
	\x00",
	);

	assert_eq!(frame.encoding(), Some(TextEncoding::Latin1));
	assert_eq!(frame.get("mime").map(text), Some("m"));
	assert_eq!(frame.get("type"), Some(&FieldValue::Int(1)));
	assert_eq!(frame.get("desc").map(text), Some("d"));
	assert_eq!(frame.get("data"), Some(&FieldValue::Binary(vec![0])));
}

#[test_log::test]
fn parse_apic_utf16_bom() {
	let frame = decode(
		"APIC",
		b"\
	\x01\x69\x6d\x61\x67\x65\
	\x2f\x6a\x70\x65\x67\x00\x00\xfe\xff\x00\x63\x00\x6f\x00\x76\x00\
	\x65\x00\x72\x00\x2e\x00\x6a\x00\x70\x00\x67\x00\x00\xff\xd8\xff",
	);

	assert_eq!(frame.encoding(), Some(TextEncoding::UTF16));
	assert_eq!(frame.get("mime").map(text), Some("image/jpeg"));
	assert_eq!(frame.get("type"), Some(&FieldValue::Int(0)));
	assert_eq!(frame.get("desc").map(text), Some("cover.jpg"));
	assert_eq!(
		frame.get("data").and_then(FieldValue::as_binary),
		Some(&b"\xff\xd8\xff"[..])
	);
}

#[test_log::test]
fn parse_pic_v22() {
	let frame = decode(
		"PIC",
		b"\
	\x00\
	JPG\
	\x01\
	d\x00\
	\x00",
	);

	assert_eq!(frame.get("format").map(text), Some("JPG"));
	assert_eq!(frame.get("type"), Some(&FieldValue::Int(1)));
	assert_eq!(frame.get("desc").map(text), Some("d"));
	assert!(frame.is_valid_for(Id3v2Version::V2));
	assert!(!frame.is_valid_for(Id3v2Version::V3));
}

#[test_log::test]
fn render_apic() {
	let mut frame = Frame::new("APIC")
		.unwrap()
		.with("encoding", TextEncoding::UTF8)
		.unwrap()
		.with("mime", "image/png")
		.unwrap()
		.with("type", 4_u8)
		.unwrap()
		.with("desc", "Description")
		.unwrap()
		.with("data", b"PNG data".to_vec())
		.unwrap();

	assert_eq!(
		frame.encode_body(Id3v2Version::V4).unwrap(),
		b"\
	\x03\
	image/png\x00\
	\x04\
	Description\x00\
	PNG data"
	);
}

#[test_log::test]
fn parse_geob() {
	let frame = decode(
		"GEOB",
		b"\
	\x00\
	m\x00\
	f\x00\
	d\x00\
	\x00",
	);

	assert_eq!(frame.get("mime").map(text), Some("m"));
	assert_eq!(frame.get("filename").map(text), Some("f"));
	assert_eq!(frame.get("desc").map(text), Some("d"));
}

#[test_log::test]
fn render_geob() {
	let mut frame = Frame::new("GEOB")
		.unwrap()
		.with("encoding", TextEncoding::Latin1)
		.unwrap()
		.with("mime", "application/octet-stream")
		.unwrap()
		.with("filename", "test.bin")
		.unwrap()
		.with("desc", "Description")
		.unwrap()
		.with("data", vec![0x01_u8; 3])
		.unwrap();

	assert_eq!(
		frame.encode_body(Id3v2Version::V4).unwrap(),
		b"\
	\x00\
	application/octet-stream\x00\
	test.bin\x00\
	Description\x00\
	\x01\x01\x01"
	);
}

#[test_log::test]
fn popm() {
	let data = b"\
	email@example.com\x00\
	\x02\
	\x00\x00\x00\x03";

	let mut frame = decode("POPM", data);
	assert_eq!(frame.get("email").map(text), Some("email@example.com"));
	assert_eq!(frame.get("rating"), Some(&FieldValue::Int(2)));
	assert_eq!(frame.get("count"), Some(&FieldValue::Int(3)));

	assert_eq!(frame.encode_body(Id3v2Version::V4).unwrap(), data);

	// The counter can't be left out
	assert!(
		Frame::decode_body(
			FrameId::new("POPM").unwrap(),
			FrameFlags::default(),
			b"email@example.com\x00\x02"
		)
		.is_err()
	);
}

#[test_log::test]
fn relative_volume_adjustment() {
	// Master volume, -10/512 dB, 16 bit peak
	let data = b"\
	desc\x00\
	\x01\xff\xf6\x10\x01\x00";

	let mut frame = decode("RVA2", data);
	assert_eq!(frame.get("desc").map(text), Some("desc"));
	assert_eq!(
		frame.get("adjustment"),
		Some(&FieldValue::Records(vec![vec![
			FieldValue::Int(1),
			FieldValue::SignedInt(-10),
			FieldValue::Int(256),
		]]))
	);

	assert_eq!(frame.encode_body(Id3v2Version::V4).unwrap(), data);
}

#[test_log::test]
fn audio_seek_point_index() {
	let frame = decode(
		"ASPI",
		b"\
	\x00\x00\x00\x0a\
	\x00\x00\x01\x00\
	\x00\x02\
	\x08\
	\x05\x06",
	);
	assert_eq!(
		frame.get("fractions"),
		Some(&FieldValue::List(vec![FieldValue::Int(5), FieldValue::Int(6)]))
	);

	// Anything but 8 bits is stored as 16 bits
	let frame = decode(
		"ASPI",
		b"\
	\x00\x00\x00\x0a\
	\x00\x00\x01\x00\
	\x00\x02\
	\x10\
	\x00\x05\x01\x00",
	);
	assert_eq!(
		frame.get("fractions"),
		Some(&FieldValue::List(vec![FieldValue::Int(5), FieldValue::Int(256)]))
	);
}

#[test_log::test]
fn unique_file_identifier() {
	let frame = decode("UFID", b"owner\x00\x01\x02");
	assert_eq!(frame.get("owner").map(text), Some("owner"));
	assert_eq!(frame.get("data"), Some(&FieldValue::Binary(vec![1, 2])));

	let frame = decode("UFID", b"\x00");
	assert_eq!(frame.get("owner").map(text), Some(""));
	assert_eq!(frame.get("data"), Some(&FieldValue::Binary(Vec::new())));
}

#[test_log::test]
fn url_link_frames() {
	let mut frame = decode("WOAR", b"http://example.com");
	assert_eq!(frame.get("url").map(text), Some("http://example.com"));
	assert_eq!(
		frame.encode_body(Id3v2Version::V4).unwrap(),
		b"http://example.com\x00"
	);

	// A leading null is skipped
	let frame = decode("WOAR", b"\x00http://example.com");
	assert_eq!(frame.get("url").map(text), Some("http://example.com"));

	let mut frame = Frame::new("WXXX")
		.unwrap()
		.with("desc", "foo")
		.unwrap()
		.with("url", "http://example.com")
		.unwrap();
	let data = frame.encode_body(Id3v2Version::V4).unwrap();
	assert_eq!(data, b"\x00foo\x00http://example.com\x00");

	let frame = decode("WXXX", &data);
	assert_eq!(frame.get("desc").map(text), Some("foo"));
	assert_eq!(frame.get("url").map(text), Some("http://example.com"));
}

#[test_log::test]
fn comments() {
	let frame = decode("COMM", b"\x03deuBeschreibung\x00Kommentar");
	assert_eq!(frame.encoding(), Some(TextEncoding::UTF8));
	assert_eq!(frame.get("lang").map(text), Some("deu"));
	assert_eq!(frame.get("desc").map(text), Some("Beschreibung"));
	assert_eq!(frame.get("text").map(text), Some("Kommentar"));

	let mut frame = Frame::new("COMM")
		.unwrap()
		.with("lang", "eng")
		.unwrap()
		.with("desc", "")
		.unwrap()
		.with("text", "Text")
		.unwrap();
	assert_eq!(
		frame.encode_body(Id3v2Version::V3).unwrap(),
		b"\x00eng\x00Text\x00"
	);

	// Language codes are exactly 3 characters
	assert!(frame.set("lang", "en").is_err());
	assert_eq!(frame.get("lang").map(text), Some("eng"));
}

#[test_log::test]
fn user_text() {
	let frame = decode("TXXX", b"\x00MusicBrainz Album Id\x00992dc19a\x00");
	assert_eq!(frame.get("desc").map(text), Some("MusicBrainz Album Id"));
	assert_eq!(frame.get("value").map(text), Some("992dc19a"));
}

#[test_log::test]
fn text_values() {
	let frame = decode("TPE1", b"\x00Foo\x00Bar\x00");
	assert_eq!(frame.text_values(), ["Foo", "Bar"]);

	let frame = decode("TPE1", b"\x00");
	assert!(frame.text_values().is_empty());
}

#[test_log::test]
fn utf16_delimiter() {
	let mut frame = Frame::text("TIT2", ["Foo", "Bar"]).unwrap();
	frame.set_encoding(Some(TextEncoding::UTF16));

	let data = frame.encode_body(Id3v2Version::V4).unwrap();
	let multi_bom_le_data = b"\x01\
	\xff\xfeF\0o\0o\0\0\0\
	\xff\xfeB\0a\0r\0\0\0";
	assert_eq!(data, multi_bom_le_data);

	assert_eq!(decode("TIT2", &data).text_values(), ["Foo", "Bar"]);

	let multi_bom_be_data = b"\x01\
	\xfe\xff\0F\0o\0o\0\0\
	\xfe\xff\0B\0a\0r";
	assert_eq!(decode("TIT2", multi_bom_be_data).text_values(), ["Foo", "Bar"]);

	// No BOM is read as big endian
	let no_bom_data = b"\x01\0F\0o\0o";
	assert_eq!(decode("TIT2", no_bom_data).text_values(), ["Foo"]);
}

#[test_log::test]
fn utf16be_delimiter() {
	let mut frame = Frame::text("TIT2", ["Foo", "Bar"]).unwrap();
	frame.set_encoding(Some(TextEncoding::UTF16BE));

	let data = frame.encode_body(Id3v2Version::V4).unwrap();
	assert_eq!(data, b"\x02\0F\0o\0o\0\0\0B\0a\0r\0\0");
	assert_eq!(decode("TIT2", &data).text_values(), ["Foo", "Bar"]);
}

#[test_log::test]
fn downgrade_utf8_for_v23() {
	let mut frame = Frame::text("TPE1", ["Foo"]).unwrap();
	frame.set_encoding(Some(TextEncoding::UTF8));

	let v4 = frame.clone().encode_body(Id3v2Version::V4).unwrap();
	assert_eq!(v4, b"\x03Foo\x00");

	let v3 = frame.encode_body(Id3v2Version::V3).unwrap();
	assert_eq!(v3.len(), 1 + 2 + 6 + 2);
	assert_eq!(frame.encoding(), Some(TextEncoding::UTF16));

	let decoded = decode("TPE1", &v3);
	assert_eq!(decoded.text_values(), ["Foo"]);
}

#[test_log::test]
fn encoding_picked_on_write() {
	let mut frame = Frame::text("TIT2", ["caf\u{e9}"]).unwrap();
	assert_eq!(frame.encoding(), None);

	assert_eq!(
		frame.encode_body(Id3v2Version::V4).unwrap(),
		b"\x00caf\xe9\x00"
	);
	assert_eq!(frame.encoding(), Some(TextEncoding::Latin1));

	// Not representable in Latin-1
	let mut frame = Frame::text("TIT2", ["\u{2713}"]).unwrap();
	assert_eq!(
		frame.encode_body(Id3v2Version::V3).unwrap(),
		b"\x01\xff\xfe\x13\x27\x00\x00"
	);
	assert_eq!(frame.encoding(), Some(TextEncoding::UTF16));
}

#[test_log::test]
fn credits_list() {
	let mut frame = Frame::new("TIPL")
		.unwrap()
		.with(
			"people",
			FieldValue::Records(vec![vec![
				FieldValue::from("producer"),
				FieldValue::from("Name"),
			]]),
		)
		.unwrap();

	let data = frame.encode_body(Id3v2Version::V4).unwrap();
	assert_eq!(data, b"\x00producer\x00Name\x00");
	assert_eq!(decode("TIPL", &data), frame);
}

#[test_log::test]
fn unknown_frames() {
	let mut frame = decode("XYZW", b"\x01\x02\x03");
	assert!(frame.is_unknown());
	assert!(frame.schema().is_generic());
	assert_eq!(frame.encode_body(Id3v2Version::V4).unwrap(), b"\x01\x02\x03");

	// Unknown text and URL frames keep their layout
	let frame = decode("TZZZ", b"\x00Foo");
	assert!(frame.is_unknown());
	assert_eq!(frame.text_values(), ["Foo"]);

	let frame = decode("WZZZ", b"http://example.com");
	assert_eq!(frame.get("url").map(text), Some("http://example.com"));
}

#[test_log::test]
fn bad_encoding() {
	let result = Frame::decode_body(
		FrameId::new("TIT2").unwrap(),
		FrameFlags::default(),
		b"\x09Foo",
	);
	assert!(result.is_err());
}
