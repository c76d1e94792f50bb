use crate::{re_read, tag_bytes};

use id3forge::error::Warning;
use id3forge::id3::v2::{FieldValue, Frame, FrameOrder, Id3v2Tag, Id3v2Version};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn picture(mime: &str, data: &[u8]) -> Frame {
	Frame::new("APIC")
		.unwrap()
		.with("mime", mime)
		.unwrap()
		.with("type", 3_u8)
		.unwrap()
		.with("desc", "")
		.unwrap()
		.with("data", data)
		.unwrap()
}

#[test_log::test]
fn v24_to_v22() {
	let mut tag = Id3v2Tag::new(Id3v2Version::V4);
	tag.insert(Frame::text("TPE1", ["Artist"]).unwrap());
	tag.insert(Frame::text("TDRC", ["2024-01-01"]).unwrap());
	tag.insert(picture("image/png", PNG));
	tag.insert(Frame::url("WOAR", "http://example.com").unwrap());

	let (bytes, warnings) = tag
		.with_version(Id3v2Version::V2)
		.encode_with_warnings(None)
		.unwrap();

	assert!(matches!(
		&warnings[..],
		[Warning::DroppedFrame { id, version: Id3v2Version::V2, .. }] if id.as_str() == "TDRC"
	));

	let decoded = Id3v2Tag::decode(&bytes).unwrap();
	assert_eq!(decoded.version(), Id3v2Version::V2);
	assert_eq!(decoded.len(), 3);

	assert_eq!(decoded.get_first("TP1").unwrap().text_values(), ["Artist"]);
	assert_eq!(
		decoded.get_first("WAR").unwrap().get("url"),
		Some(&FieldValue::from("http://example.com"))
	);

	let picture = decoded.get_first("PIC").unwrap();
	assert_eq!(picture.get("format"), Some(&FieldValue::from("PNG")));
	assert_eq!(picture.get("type"), Some(&FieldValue::Int(3)));
	assert_eq!(picture.get("data"), Some(&FieldValue::from(PNG)));
}

#[test_log::test]
fn v22_to_v24() {
	let frames = b"\
	TT2\x00\x00\x07\x00Title\x00\
	TYE\x00\x00\x06\x002024\x00\
	PIC\x00\x00\x09\x00JPG\x03\x00\xff\xd8\xff";
	let bytes = tag_bytes(Id3v2Version::V2, 0, frames);

	let tag = Id3v2Tag::decode(&bytes).unwrap();
	assert_eq!(tag.version(), Id3v2Version::V2);
	assert_eq!(tag.len(), 3);

	// TYER only exists in ID3v2.3
	let v3 = re_read(&tag.with_version(Id3v2Version::V3));
	assert_eq!(v3.get_first("TYER").unwrap().text_values(), ["2024"]);

	let (bytes, warnings) = tag
		.with_version(Id3v2Version::V4)
		.encode_with_warnings(None)
		.unwrap();
	assert!(matches!(
		&warnings[..],
		[Warning::DroppedFrame { id, .. }] if id.as_str() == "TYE"
	));

	let v4 = Id3v2Tag::decode(&bytes).unwrap();
	assert_eq!(v4.get_first("TIT2").unwrap().text_values(), ["Title"]);

	let picture = v4.get_first("APIC").unwrap();
	assert_eq!(picture.get("mime"), Some(&FieldValue::from("image/jpeg")));
	assert_eq!(picture.get("data"), Some(&FieldValue::from(&b"\xff\xd8\xff"[..])));
}

#[test_log::test]
fn picture_formats() {
	// Sniffed from the image data
	let frames = b"PIC\x00\x00\x16\x00XYZ\x00\x00\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
	let tag = Id3v2Tag::decode(&tag_bytes(Id3v2Version::V2, 0, frames)).unwrap();

	let v3 = re_read(&tag.with_version(Id3v2Version::V3));
	let apic = v3.get_first("APIC").unwrap();
	assert_eq!(apic.get("mime"), Some(&FieldValue::from("image/png")));

	// ID3v2.2 can only name PNG and JPEG images
	let mut tag = Id3v2Tag::new(Id3v2Version::V2);
	tag.insert(picture("image/webp", b"RIFF\0\0\0\0WEBP"));
	tag.insert(picture("image/jpg", b"\xff\xd8\xff"));

	let (bytes, warnings) = tag.encode_with_warnings(None).unwrap();
	assert!(matches!(
		&warnings[..],
		[Warning::DroppedFrame { id, .. }] if id.as_str() == "APIC"
	));

	let decoded = Id3v2Tag::decode(&bytes).unwrap();
	let pictures = decoded.get("PIC").collect::<Vec<_>>();
	assert_eq!(pictures.len(), 1);
	assert_eq!(pictures[0].get("format"), Some(&FieldValue::from("JPG")));
}

#[test_log::test]
fn v23_to_v24_keeps_shared_frames() {
	let mut tag = Id3v2Tag::new(Id3v2Version::V3);
	tag.insert(Frame::text("TIT2", ["Title"]).unwrap());
	tag.insert(Frame::text("TYER", ["2024"]).unwrap());
	tag.insert(Frame::text("TSOP", ["Artist, The"]).unwrap());

	// TSOP was only added in ID3v2.4
	let (_, warnings) = tag.encode_with_warnings(None).unwrap();
	assert_eq!(warnings.len(), 1);

	let (bytes, warnings) = tag
		.with_version(Id3v2Version::V4)
		.encode_with_warnings(None)
		.unwrap();
	assert_eq!(warnings.len(), 1);

	let v4 = Id3v2Tag::decode(&bytes).unwrap();
	assert!(v4.get_first("TIT2").is_some());
	assert!(v4.get_first("TSOP").is_some());
	assert!(v4.get_first("TYER").is_none());
}

#[test_log::test]
fn order_survives_conversion() {
	let mut tag = Id3v2Tag::new(Id3v2Version::V4);
	tag.padding_max = 0;
	tag.insert(Frame::text("TALB", ["Album"]).unwrap());
	tag.insert(Frame::text("TIT2", ["Title"]).unwrap());
	tag.insert(Frame::text("TPE1", ["Artist"]).unwrap());

	// ID3v2.2 frames are placed by their ID3v2.3/4 name
	let order = FrameOrder::new(["TIT2", "TPE1"]).unwrap();
	let (bytes, _) = tag
		.with_version(Id3v2Version::V2)
		.encode_with_order(None, &order)
		.unwrap();

	let decoded = Id3v2Tag::decode(&bytes).unwrap();
	let ids = decoded.frames().map(Frame::id_str).collect::<Vec<_>>();
	assert_eq!(ids, ["TT2", "TP1", "TAL"]);
}
