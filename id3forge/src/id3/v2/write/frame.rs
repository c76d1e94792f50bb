use crate::error::{Diagnostics, Result, Warning};
use crate::id3::v2::Id3v2Version;
use crate::id3::v2::frame::Frame;
use crate::id3::v2::util::synchsafe::{SynchsafeInteger, unsynchronise};
use crate::macros::err;

use byteorder::{BigEndian, WriteBytesExt};

/// Encode a complete frame (header, prefixes, body) for `version`
///
/// For ID3v2.4, `unsynchronise` applies the transform to the frame itself. Earlier versions
/// unsynchronise the whole tag afterwards.
pub(super) fn encode_frame(
	frame: &mut Frame,
	version: Id3v2Version,
	unsynchronise_frame: bool,
	diagnostics: &mut Diagnostics,
) -> Result<Vec<u8>> {
	if frame.schema().is_discouraged() {
		diagnostics.warn(Warning::DiscouragedFrame(frame.id().clone()));
	}

	let body = frame.encode_body(version)?;

	let mut flags = frame.flags;
	flags.encryption = false;
	flags.compression &= cfg!(feature = "id3v2_compression_support") && version != Id3v2Version::V2;
	if version == Id3v2Version::V4 {
		flags.unsynchronisation = unsynchronise_frame;
	} else {
		flags.unsynchronisation = false;
		flags.data_length_indicator = false;
	}

	let data_length = body.len() as u32;
	let body = if flags.compression { compress(&body)? } else { body };

	let mut content = Vec::with_capacity(body.len() + 5);
	match version {
		Id3v2Version::V2 => {},
		Id3v2Version::V3 => {
			if flags.compression {
				content.write_u32::<BigEndian>(data_length)?;
			}

			if let Some(group) = flags.grouping_identity {
				content.push(group);
			}
		},
		Id3v2Version::V4 => {
			if let Some(group) = flags.grouping_identity {
				content.push(group);
			}

			if flags.data_length_indicator || flags.compression {
				content.write_u32::<BigEndian>(data_length.synch()?)?;
			}
		},
	}

	if flags.unsynchronisation {
		content.extend(unsynchronise(&body));
	} else {
		content.extend(body);
	}

	let id = frame.id().as_str().as_bytes();
	let mut encoded = Vec::with_capacity(content.len() + 10);
	encoded.extend(id);

	match version {
		Id3v2Version::V2 => {
			if content.len() > 0x00FF_FFFF {
				err!(TooMuchData);
			}

			encoded.write_u24::<BigEndian>(content.len() as u32)?;
		},
		Id3v2Version::V3 => {
			let Ok(size) = u32::try_from(content.len()) else {
				err!(TooMuchData);
			};

			encoded.write_u32::<BigEndian>(size)?;
			encoded.write_u16::<BigEndian>(flags.as_bytes(version))?;
		},
		Id3v2Version::V4 => {
			let Ok(size) = u32::try_from(content.len()) else {
				err!(TooMuchData);
			};

			encoded.write_u32::<BigEndian>(size.synch()?)?;
			encoded.write_u16::<BigEndian>(flags.as_bytes(version))?;
		},
	}

	log::trace!(
		"Encoded {} ({} bytes, flags: {:#06x})",
		frame.id(),
		content.len(),
		flags.as_bytes(version)
	);

	encoded.extend(content);
	Ok(encoded)
}

#[cfg(feature = "id3v2_compression_support")]
fn compress(data: &[u8]) -> Result<Vec<u8>> {
	use flate2::Compression;
	use flate2::write::ZlibEncoder;
	use std::io::Write;

	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data)?;
	Ok(encoder.finish()?)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn compress(data: &[u8]) -> Result<Vec<u8>> {
	Ok(data.to_vec())
}
