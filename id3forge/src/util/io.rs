//! Various traits for reading and writing to file-like objects, and the region splicing
//! used to put a re-encoded tag back into its file

use crate::error::{Id3Error, Result};

use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

const SHIFT_CHUNK_SIZE: usize = 64 * 1024;

/// Provides a method to truncate an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to
/// file saving methods such as [`Id3v2Tag::save_to`](crate::id3::v2::Id3v2Tag::save_to).
///
/// Take great care in implementing this for downstream types, as id3forge will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
pub trait Truncate {
	/// The error type of the truncation operation
	type Error: Into<Id3Error>;

	/// Truncate a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being truncated, which may not always be fallible.
	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error>;
}

impl Truncate for File {
	type Error = std::io::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.set_len(new_len)
	}
}

impl Truncate for Vec<u8> {
	type Error = std::convert::Infallible;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for Cursor<T>
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.get_mut().truncate(new_len)
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	type Error = <T as Truncate>::Error;

	fn truncate(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		(**self).truncate(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait.
pub trait Length {
	/// The error type of the length operation
	type Error: Into<Id3Error>;

	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::result::Result<u64, Self::Error>;
}

impl Length for File {
	type Error = std::io::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for &mut T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Truncate`], and [`Length`] traits.
///
/// Take great care in implementing this for downstream types, as id3forge will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Truncate + Length
where
	<Self as Truncate>::Error: Into<Id3Error>,
	<Self as Length>::Error: Into<Id3Error>,
{
}

impl<T> FileLike for T
where
	T: Read + Write + Seek + Truncate + Length,
	<T as Truncate>::Error: Into<Id3Error>,
	<T as Length>::Error: Into<Id3Error>,
{
}

fn out_of_bounds() -> Id3Error {
	std::io::Error::new(
		std::io::ErrorKind::InvalidInput,
		"region extends past the end of the file",
	)
	.into()
}

/// Replace `length` bytes at `offset` with `data`, inside the file itself
///
/// The file grows or shrinks as needed. Bytes outside of the region are preserved.
///
/// # Errors
///
/// * The region extends past the end of the file
/// * `file` fails to read, write, seek, or truncate
pub fn replace_region<F>(file: &mut F, offset: u64, length: u64, data: &[u8]) -> Result<()>
where
	F: FileLike,
	Id3Error: From<<F as Truncate>::Error>,
	Id3Error: From<<F as Length>::Error>,
{
	let file_len = Length::len(file)?;
	let region_end = offset.checked_add(length).ok_or_else(out_of_bounds)?;
	if region_end > file_len {
		return Err(out_of_bounds());
	}

	let new_len = data.len() as u64;

	if new_len == length {
		log::trace!("Overwriting {length} bytes at {offset}");
		file.seek(SeekFrom::Start(offset))?;
		file.write_all(data)?;
		return Ok(());
	}

	if region_end == file_len {
		log::trace!("Region reaches the end of the file, truncating and appending");
		file.seek(SeekFrom::Start(offset))?;
		file.write_all(data)?;
		file.truncate(offset + new_len)?;
		return Ok(());
	}

	let tail_len = file_len - region_end;
	let mut chunk = vec![0; SHIFT_CHUNK_SIZE];

	if new_len > length {
		let shift = new_len - length;
		log::trace!("Shifting {tail_len} bytes forward by {shift}");

		// Walk backwards, so nothing is overwritten before it is moved
		let mut remaining = tail_len;
		while remaining > 0 {
			let size = remaining.min(SHIFT_CHUNK_SIZE as u64);
			let src = region_end + remaining - size;
			let buf = &mut chunk[..size as usize];

			file.seek(SeekFrom::Start(src))?;
			file.read_exact(buf)?;
			file.seek(SeekFrom::Start(src + shift))?;
			file.write_all(buf)?;

			remaining -= size;
		}

		file.seek(SeekFrom::Start(offset))?;
		file.write_all(data)?;
	} else {
		let shift = length - new_len;
		log::trace!("Shifting {tail_len} bytes backward by {shift}");

		let mut moved = 0;
		while moved < tail_len {
			let size = (tail_len - moved).min(SHIFT_CHUNK_SIZE as u64);
			let src = region_end + moved;
			let buf = &mut chunk[..size as usize];

			file.seek(SeekFrom::Start(src))?;
			file.read_exact(buf)?;
			file.seek(SeekFrom::Start(src - shift))?;
			file.write_all(buf)?;

			moved += size;
		}

		file.seek(SeekFrom::Start(offset))?;
		file.write_all(data)?;
		file.truncate(file_len - shift)?;
	}

	file.flush()?;
	Ok(())
}

/// Replace `length` bytes at `offset` in the file at `path` with `data`
///
/// When the region keeps its size, or extends to the end of the file, the file is modified
/// directly. Otherwise, `in_place` decides between shifting the rest of the file within itself
/// (see [`replace_region`]), or writing a complete copy to a temporary file in the same
/// directory that is then renamed over the original.
///
/// # Errors
///
/// * `path` does not exist or can't be written
/// * The region extends past the end of the file
/// * The temporary file can't be created or persisted
pub fn replace_region_in_path(
	path: impl AsRef<Path>,
	offset: u64,
	length: u64,
	data: &[u8],
	in_place: bool,
) -> Result<()> {
	let path = path.as_ref();
	let mut file = OpenOptions::new().read(true).write(true).open(path)?;

	let file_len = Length::len(&file)?;
	let region_end = offset.checked_add(length).ok_or_else(out_of_bounds)?;
	if region_end > file_len {
		return Err(out_of_bounds());
	}

	if in_place || data.len() as u64 == length || region_end == file_len {
		return replace_region(&mut file, offset, length, data);
	}

	let directory = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	log::debug!(
		"Rewriting {} through a temporary file in {}",
		path.display(),
		directory.display()
	);

	let mut temp = tempfile::NamedTempFile::new_in(directory)?;

	file.seek(SeekFrom::Start(0))?;
	std::io::copy(&mut (&mut file).take(offset), temp.as_file_mut())?;
	temp.write_all(data)?;
	file.seek(SeekFrom::Start(region_end))?;
	std::io::copy(&mut file, temp.as_file_mut())?;
	temp.as_file_mut().flush()?;

	let permissions = file.metadata()?.permissions();
	std::fs::set_permissions(temp.path(), permissions)?;

	drop(file);
	temp.persist(path).map_err(|e| e.error)?;

	Ok(())
}
