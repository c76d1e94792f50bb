//! Syncsafe integers and the unsynchronisation scheme
//!
//! ID3v2 must never produce a byte sequence that an MPEG decoder could mistake for a frame
//! sync (`0xFF` followed by a byte with its top three bits set). Integers in headers avoid this by
//! using only 7 bits per byte ("syncsafe"), and arbitrary data can be "unsynchronised" by
//! inserting a `0x00` after every `0xFF` that would be a problem.

use crate::error::Result;
use crate::macros::{err, id3v2_err};

use std::io::Read;

/// A reader for unsynchronised content, removing every `0x00` that follows a `0xFF`
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::util::synchsafe::UnsynchronizedStream;
/// use std::io::{Cursor, Read};
///
/// # fn main() -> id3forge::error::Result<()> {
/// // The content has two `0xFF 0x00` pairs, which will be removed
/// let content = [0xFF, 0x00, 0x1A, 0xFF, 0x00, 0x15];
///
/// let mut reader = UnsynchronizedStream::new(Cursor::new(content));
///
/// let mut resynchronised = Vec::new();
/// reader.read_to_end(&mut resynchronised)?;
///
/// assert_eq!(resynchronised, [0xFF, 0x1A, 0xFF, 0x15]);
/// # Ok(()) }
/// ```
pub struct UnsynchronizedStream<R> {
	reader: R,
	// Same buffer size as `BufReader`
	buf: Box<[u8; 8 * 1024]>,
	bytes_available: usize,
	pos: usize,
	after_ff: bool,
}

impl<R> UnsynchronizedStream<R> {
	/// Create a new [`UnsynchronizedStream`]
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			buf: Box::new([0; 8 * 1024]),
			bytes_available: 0,
			pos: 0,
			after_ff: false,
		}
	}

	/// Extract the reader, discarding the [`UnsynchronizedStream`]
	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: Read> Read for UnsynchronizedStream<R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let mut written = 0;
		while written < buf.len() {
			if self.pos >= self.bytes_available {
				self.bytes_available = self.reader.read(&mut self.buf[..])?;
				self.pos = 0;

				if self.bytes_available == 0 {
					break;
				}
			}

			let byte = self.buf[self.pos];
			self.pos += 1;

			if self.after_ff {
				self.after_ff = false;
				if byte == 0 {
					continue;
				}
			}

			buf[written] = byte;
			written += 1;
			self.after_ff = byte == 0xFF;
		}

		Ok(written)
	}
}

/// Apply the unsynchronisation scheme to `data`
///
/// A `0x00` is inserted after every `0xFF` that is followed by `0x00` or a byte `>= 0xE0`, and
/// after a trailing `0xFF`.
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::util::synchsafe::unsynchronise;
///
/// assert_eq!(unsynchronise(&[0xFF, 0xE0, 0xFF, 0x12, 0xFF]), [0xFF, 0x00, 0xE0, 0xFF, 0x12, 0xFF, 0x00]);
/// ```
pub fn unsynchronise(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len() + data.len() / 64);

	for (index, byte) in data.iter().copied().enumerate() {
		out.push(byte);

		if byte == 0xFF {
			match data.get(index + 1) {
				Some(next) if *next != 0 && *next < 0xE0 => {},
				_ => out.push(0),
			}
		}
	}

	out
}

/// Reverse [`unsynchronise`], removing every `0x00` that follows a `0xFF`
pub fn resynchronise(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len());
	let mut after_ff = false;

	for byte in data.iter().copied() {
		if after_ff && byte == 0 {
			after_ff = false;
			continue;
		}

		out.push(byte);
		after_ff = byte == 0xFF;
	}

	out
}

/// Decode a big-endian syncsafe integer of up to 8 bytes
///
/// # Errors
///
/// * Any byte has its top bit set
/// * `bytes` is longer than 8 bytes
pub fn decode_syncsafe(bytes: &[u8]) -> Result<u64> {
	if bytes.len() > 8 {
		err!(TooMuchData);
	}

	let mut value = 0_u64;
	for byte in bytes {
		if byte & 0x80 != 0 {
			id3v2_err!(BadSyncsafeInteger);
		}

		value = (value << 7) | u64::from(*byte);
	}

	Ok(value)
}

/// Encode `value` as a big-endian syncsafe integer `width` bytes wide
///
/// # Errors
///
/// `value` doesn't fit in `7 * width` bits
pub fn encode_syncsafe(value: u64, width: usize) -> Result<Vec<u8>> {
	if width > 8 || value >> (7 * width) != 0 {
		err!(TooMuchData);
	}

	Ok((0..width)
		.rev()
		.map(|index| ((value >> (7 * index)) & 0x7F) as u8)
		.collect())
}

/// An integer that can be converted to and from synchsafe variants
pub trait SynchsafeInteger: Sized {
	/// The integer type that this can be widened to for use in [`SynchsafeInteger::widening_synch`]
	type WideningType;

	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in <`INTEGER_TYPE::BITS - size_of::<INTEGER_TYPE>()`> bits
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::util::synchsafe::SynchsafeInteger;
	///
	/// # fn main() -> id3forge::error::Result<()> {
	/// // Maximum value we can represent in a synchsafe u32
	/// let synch_number = 0xFFF_FFFF_u32.synch()?;
	///
	/// // Each byte should have 7 set bits and an MSB of 0
	/// assert_eq!(synch_number, 0b01111111_01111111_01111111_01111111_u32);
	/// # Ok(()) }
	/// ```
	fn synch(self) -> Result<Self>;

	/// Create a synchsafe integer, widening to the next available integer type
	///
	/// This never fails, as every value fits once the type is widened.
	fn widening_synch(self) -> Self::WideningType;

	/// Unsynchronise a syncsafe integer
	///
	/// The top bit of each byte is ignored.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::util::synchsafe::SynchsafeInteger;
	///
	/// assert_eq!(0x7F7F_7F7F_u32.unsynch(), 0xFFF_FFFF);
	/// ```
	fn unsynch(self) -> Self;
}

// Spread the low 7 bits of every byte group in `n` across `bytes` output bytes
fn spread(n: u64, bytes: u32) -> u64 {
	(0..bytes).fold(0, |acc, i| acc | (((n >> (7 * i)) & 0x7F) << (8 * i)))
}

fn gather(n: u64, bytes: u32) -> u64 {
	(0..bytes).fold(0, |acc, i| acc | (((n >> (8 * i)) & 0x7F) << (7 * i)))
}

macro_rules! impl_synchsafe {
	($($ty:ty => $widening_ty:ty),+ $(,)?) => {
		$(
			#[allow(trivial_numeric_casts)]
			impl SynchsafeInteger for $ty {
				type WideningType = $widening_ty;

				fn synch(self) -> Result<Self> {
					const BYTES: u32 = <$ty>::BITS / 8;
					// 7 bits are available per byte, shave off 1 bit per byte
					const MAXIMUM_INTEGER: $ty = <$ty>::MAX >> BYTES;

					if self > MAXIMUM_INTEGER {
						err!(TooMuchData);
					}

					Ok(spread(u64::from(self), BYTES) as $ty)
				}

				fn widening_synch(self) -> Self::WideningType {
					spread(u64::from(self), <$ty>::BITS / 8 + 1) as $widening_ty
				}

				fn unsynch(self) -> Self {
					gather(u64::from(self), <$ty>::BITS / 8) as $ty
				}
			}
		)+
	};
}

impl_synchsafe!(u8 => u16, u16 => u32, u32 => u64);
