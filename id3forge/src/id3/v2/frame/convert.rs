use super::field::FieldValue;
use super::id::FrameId;
use super::registry;
use super::schema::{FrameKind, FrameSchema};
use super::Frame;
use crate::error::Result;
use crate::id3::v2::Id3v2Version;
use crate::macros::id3v2_err;

impl Frame {
	/// Convert the frame for use in a tag of `target`
	///
	/// Frames already valid for `target` are returned unchanged. Otherwise, the frame is moved to
	/// its ID3v2.2 counterpart (or back) where one exists, copying field values by name.
	///
	/// # Errors
	///
	/// * The frame has no counterpart in `target` ([`Id3v2ErrorKind::IncompatibleFrame`](crate::error::Id3v2ErrorKind::IncompatibleFrame))
	/// * A picture's image format can't be expressed in the other version
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::{Frame, Id3v2Version};
	///
	/// # fn main() -> id3forge::error::Result<()> {
	/// let title = Frame::text("TIT2", ["Title"])?;
	///
	/// let v22 = title.to_version(Id3v2Version::V2)?;
	/// assert_eq!(v22.id_str(), "TT2");
	/// assert_eq!(v22.text_values(), ["Title"]);
	/// # Ok(()) }
	/// ```
	pub fn to_version(self, target: Id3v2Version) -> Result<Frame> {
		if self.is_valid_for(target) {
			return Ok(self);
		}

		if !self.is_error() && !self.schema.generic {
			if target == Id3v2Version::V2 {
				if let Some(sibling) = registry::v22_sibling(self.schema.id) {
					return self.reproject(sibling);
				}
			}

			if self.schema.versions.is_v2_only() {
				let parent = self.schema.parent.and_then(registry::lookup);
				if let Some(parent) = parent.filter(|p| p.versions.contains(target)) {
					return self.reproject(parent);
				}
			}
		}

		id3v2_err!(IncompatibleFrame {
			id: self.id.to_string(),
			version: target,
		})
	}

	fn reproject(self, target: &'static FrameSchema) -> Result<Frame> {
		log::trace!("Converting {} to {}", self.id, target.id);

		let mut converted = Frame::with_schema(FrameId::from_static(target.id), target);
		converted.flags = self.flags;

		for (index, field) in target.fields.iter().enumerate() {
			converted.values[index] = self.get(field.name).cloned();
		}

		if self.schema.kind == FrameKind::Picture && target.kind == FrameKind::Picture {
			convert_image_format(&self, &mut converted)?;
		}

		Ok(converted)
	}
}

// `APIC` stores a MIME type, `PIC` a three character image format
fn convert_image_format(source: &Frame, target: &mut Frame) -> Result<()> {
	if let Some(FieldValue::Text(format)) = source.get("format") {
		let mime = match format.to_ascii_uppercase().as_str() {
			"PNG" => String::from("image/png"),
			"JPG" => String::from("image/jpeg"),
			_ => match source.get("data").and_then(FieldValue::as_binary).and_then(sniff_image) {
				Some(kind) => format!("image/{kind}"),
				None => id3v2_err!(UnsupportedImageFormat(format.clone())),
			},
		};

		return target.set("mime", mime);
	}

	if let Some(FieldValue::Text(mime)) = source.get("mime") {
		let format = match mime.to_ascii_lowercase().as_str() {
			"image/png" => "PNG",
			"image/jpeg" | "image/jpg" => "JPG",
			_ => id3v2_err!(UnsupportedImageFormat(mime.clone())),
		};

		return target.set("format", format);
	}

	Ok(())
}

fn sniff_image(data: &[u8]) -> Option<&'static str> {
	match data {
		[0x89, b'P', b'N', b'G', ..] => Some("png"),
		[0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
		[b'G', b'I', b'F', b'8', ..] => Some("gif"),
		[b'B', b'M', ..] => Some("bmp"),
		[b'I', b'I', b'*', 0, ..] | [b'M', b'M', 0, b'*', ..] => Some("tiff"),
		_ => None,
	}
}
