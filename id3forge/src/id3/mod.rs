//! ID3 specific items
//!
//! Only ID3v2 is supported, see [`v2`].

pub mod v2;

use crate::config::{ParseOptions, ParsingMode};
use crate::error::{Diagnostics, Result};
use v2::header::Id3v2Header;

use std::io::{Read, Seek, SeekFrom};

/// Check for an ID3v2 tag at the current position of `data`
///
/// Returns the total size of the tag (header, body, and footer). The position of `data` is left
/// unchanged.
///
/// # Errors
///
/// * There is no tag at the current position ([`ErrorKind::NoTag`](crate::error::ErrorKind::NoTag))
/// * The tag header is malformed
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::find_id3v2;
/// use std::io::Cursor;
///
/// # fn main() -> id3forge::error::Result<()> {
/// let mut file = Cursor::new(b"ID3\x04\x00\x00\x00\x00\x01\x00".to_vec());
/// assert_eq!(find_id3v2(&mut file)?, 138);
///
/// let mut file = Cursor::new(b"RIFF".to_vec());
/// assert!(find_id3v2(&mut file).unwrap_err().is_no_tag());
/// # Ok(()) }
/// ```
pub fn find_id3v2<R>(data: &mut R) -> Result<u64>
where
	R: Read + Seek,
{
	log::debug!("Searching for an ID3v2 tag");

	let start = data.stream_position()?;

	// Any tag that can be read should be found, and replaced when writing
	let parse_options = ParseOptions::new().parsing_mode(ParsingMode::Relaxed);
	let header = Id3v2Header::parse(data, parse_options, &mut Diagnostics::default());

	data.seek(SeekFrom::Start(start))?;

	let header = header?;
	log::debug!("Found {} tag, {} bytes", header.version, header.full_tag_size());

	Ok(header.full_tag_size())
}
