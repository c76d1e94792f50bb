mod frame;
pub(crate) mod order;

use super::frame::Frame;
use super::frame::schema::FrameKind;
use super::header::HEADER_LEN;
use super::tag::Id3v2Tag;
use super::util::synchsafe::{encode_syncsafe, unsynchronise};
use super::{Id3v2TagFlags, Id3v2Version};
use crate::error::{Diagnostics, Result, Warning};
use crate::id3::v2::FieldValue;
use crate::macros::try_vec;
use order::FrameOrder;

use std::collections::HashMap;
use std::ops::Not;
use std::sync::OnceLock;

use byteorder::{BigEndian, WriteBytesExt};

const V3_EXT_CRC: u16 = 0x8000;

const V4_EXT_UPDATE: u8 = 0x40;
const V4_EXT_CRC: u8 = 0x20;
const V4_EXT_RESTRICTIONS: u8 = 0x10;

fn crc_32_table() -> &'static [u32; 256] {
	static INSTANCE: OnceLock<[u32; 256]> = OnceLock::new();
	INSTANCE.get_or_init(|| {
		let mut table = [0; 256];

		for n in 0..256 {
			table[n as usize] = (0..8).fold(n as u32, |acc, _| match acc & 1 {
				1 => 0xEDB8_8320 ^ (acc >> 1),
				_ => acc >> 1,
			});
		}

		table
	})
}

pub(crate) fn crc_32(content: &[u8]) -> u32 {
	content
		.iter()
		.fold(!0, |crc, octet| {
			(crc >> 8) ^ crc_32_table()[((crc ^ u32::from(*octet)) & 0xFF) as usize]
		})
		.not()
}

/// The padding policy for a single encode
#[derive(Copy, Clone, Debug)]
pub(crate) struct Padding {
	pub(crate) size_hint: Option<u64>,
	pub(crate) default: u32,
	pub(crate) max: u32,
}

impl Padding {
	/// The number of padding bytes to follow `tag_len` bytes of header and frames
	fn amount(self, tag_len: u64) -> u64 {
		if self.max == 0 {
			return 0;
		}

		if let Some(hint) = self.size_hint {
			if tag_len <= hint && hint - tag_len <= u64::from(self.max) {
				return hint - tag_len;
			}
		}

		u64::from(self.default)
	}
}

/// Encode `tag` as a complete ID3v2 tag of its own version
pub(crate) fn create_tag(
	tag: &Id3v2Tag,
	order: &FrameOrder,
	padding: Padding,
	diagnostics: &mut Diagnostics,
) -> Result<Vec<u8>> {
	let version = tag.version();
	let flags = *tag.flags();

	log::debug!("Encoding {version} tag with {} frames", tag.len());

	let mut frames = prepare_frames(tag, diagnostics);
	order.sort(&mut frames);

	let unsynchronise_frames = flags.unsynchronisation && version == Id3v2Version::V4;

	let mut frame_data = Vec::new();
	for frame in &mut frames {
		let encoded = frame::encode_frame(frame, version, unsynchronise_frames, diagnostics)?;
		frame_data.extend(encoded);
	}

	// CRC-32 is over the frames as stored, ID3v2.3 computes it before unsynchronisation
	let v3_crc = crc_32(&frame_data);

	// ID3v2.2 and ID3v2.3 unsynchronise everything after the header
	let unsynchronise_tag = flags.unsynchronisation && version != Id3v2Version::V4;

	let has_extended_header = flags.needs_extended_header(version);
	let footer = flags.footer && version == Id3v2Version::V4;

	let extended_len = if has_extended_header {
		extended_header_len(version, &flags)
	} else {
		0
	};

	let frames_len = if unsynchronise_tag {
		unsynchronise(&frame_data).len()
	} else {
		frame_data.len()
	};

	let unpadded_len = (HEADER_LEN + extended_len + frames_len) as u64;
	let padding_len = if footer {
		log::trace!("Footer requested, not padding tag");
		0
	} else {
		padding.amount(unpadded_len)
	};

	log::trace!("Padding tag with {padding_len} bytes");

	let padding_bytes = try_vec![0; padding_len as usize];

	let mut body = if has_extended_header {
		let crc = match version {
			Id3v2Version::V3 => v3_crc,
			_ => {
				let mut padded = frame_data.clone();
				padded.extend(&padding_bytes);
				crc_32(&padded)
			},
		};

		create_extended_header(version, &flags, padding_len as u32, crc)?
	} else {
		Vec::new()
	};

	body.extend(frame_data);

	if unsynchronise_tag {
		log::trace!("Unsynchronising tag body");
		body = unsynchronise(&body);
	}

	body.extend(padding_bytes);

	let body_len = body.len() as u64;

	let mut header = Vec::with_capacity(HEADER_LEN);
	header.extend(b"ID3");
	header.extend([version.major(), 0, flags.as_byte(version)]);
	header.extend(encode_syncsafe(body_len, 4)?);

	let mut encoded = header.clone();
	encoded.extend(body);

	if footer {
		// The footer is the header, with the identifier reversed
		encoded.extend(b"3DI");
		encoded.extend(&header[3..]);
	}

	Ok(encoded)
}

// Merge duplicates, then convert every frame to the tag's version
fn prepare_frames(tag: &Id3v2Tag, diagnostics: &mut Diagnostics) -> Vec<Frame> {
	let version = tag.version();

	let mut groups: Vec<Vec<&Frame>> = Vec::new();
	let mut positions = HashMap::new();
	for frame in tag.frames() {
		if frame.is_error() {
			diagnostics.warn(Warning::DroppedErrorFrame(frame.id().clone()));
			continue;
		}

		let index = *positions.entry(frame.id().clone()).or_insert_with(|| {
			groups.push(Vec::new());
			groups.len() - 1
		});
		groups[index].push(frame);
	}

	let mut prepared = Vec::with_capacity(tag.len());
	for group in groups {
		for frame in merge_duplicates(group, diagnostics) {
			let id = frame.id().clone();
			match frame.to_version(version) {
				Ok(frame) => prepared.push(frame),
				Err(e) => diagnostics.warn(Warning::DroppedFrame {
					id,
					version,
					reason: e.to_string(),
				}),
			}
		}
	}

	prepared
}

fn merge_duplicates(group: Vec<&Frame>, diagnostics: &mut Diagnostics) -> Vec<Frame> {
	let [first, rest @ ..] = &group[..] else {
		return Vec::new();
	};

	if rest.is_empty() || first.schema().allows_duplicates() {
		return group.into_iter().cloned().collect();
	}

	if first.schema().kind() == FrameKind::Text {
		log::debug!("Merging {} {} frames", group.len(), first.id());
		diagnostics.warn(Warning::DuplicateFrame(first.id().clone()));

		let encoding = first.encoding();
		let same_encoding = rest.iter().all(|f| f.encoding() == encoding);

		let mut values = Vec::new();
		for frame in &group {
			if let Some(FieldValue::List(text)) = frame.get("text") {
				values.extend(text.iter().cloned());
			}
		}

		let mut merged = (*first).clone();
		merged.set_encoding(if same_encoding { encoding } else { None });
		if let Err(e) = merged.set("text", FieldValue::List(values)) {
			log::warn!("{}: failed to merge duplicates: {e}", first.id());
		}

		return vec![merged];
	}

	diagnostics.warn(Warning::DuplicateFrame(first.id().clone()));
	group.last().map(|f| vec![(*f).clone()]).unwrap_or_default()
}

fn extended_header_len(version: Id3v2Version, flags: &Id3v2TagFlags) -> usize {
	match version {
		Id3v2Version::V2 => 0,
		Id3v2Version::V3 => {
			if flags.crc_present {
				14
			} else {
				10
			}
		},
		Id3v2Version::V4 => {
			let mut len = 6;
			if flags.update {
				len += 1;
			}

			if flags.crc_present {
				len += 6;
			}

			if flags.restrictions.is_some() {
				len += 2;
			}

			len
		},
	}
}

fn create_extended_header(
	version: Id3v2Version,
	flags: &Id3v2TagFlags,
	padding_len: u32,
	crc: u32,
) -> Result<Vec<u8>> {
	let mut extended = Vec::with_capacity(extended_header_len(version, flags));

	match version {
		Id3v2Version::V2 => {},
		// Size (excluding itself), flags, padding size, [CRC]
		Id3v2Version::V3 => {
			if flags.crc_present {
				extended.write_u32::<BigEndian>(10)?;
				extended.write_u16::<BigEndian>(V3_EXT_CRC)?;
				extended.write_u32::<BigEndian>(padding_len)?;
				extended.write_u32::<BigEndian>(crc)?;
			} else {
				extended.write_u32::<BigEndian>(6)?;
				extended.write_u16::<BigEndian>(0)?;
				extended.write_u32::<BigEndian>(padding_len)?;
			}
		},
		// Size (including itself), flag byte count, flags, flag data
		Id3v2Version::V4 => {
			let len = extended_header_len(version, flags);
			extended.extend(encode_syncsafe(len as u64, 4)?);
			extended.push(1);

			let mut ext_flags = 0;
			if flags.update {
				ext_flags |= V4_EXT_UPDATE;
			}

			if flags.crc_present {
				ext_flags |= V4_EXT_CRC;
			}

			if flags.restrictions.is_some() {
				ext_flags |= V4_EXT_RESTRICTIONS;
			}

			extended.push(ext_flags);

			if flags.update {
				extended.push(0);
			}

			if flags.crc_present {
				// 35 bit syncsafe integer
				extended.push(5);
				extended.extend(encode_syncsafe(u64::from(crc), 5)?);
			}

			if let Some(restrictions) = flags.restrictions {
				extended.push(1);
				extended.push(restrictions.as_byte());
			}
		},
	}

	Ok(extended)
}
