use crate::error::Result;
use crate::macros::err;

/// Upper bound for any buffer sized from a value read out of a tag (16 MiB)
///
/// Tag and frame sizes come straight from the input. A damaged header must not be able to
/// request an arbitrary amount of memory.
pub(crate) const ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

/// Backs [`try_vec!`](crate::macros::try_vec), use the macro instead
pub(crate) fn fallible_vec_from_element<T>(element: T, len: usize) -> Result<Vec<T>>
where
	T: Clone,
{
	let mut buf = Vec::try_with_capacity_stable(len)?;
	buf.resize(len, element);
	Ok(buf)
}

/// Capacity reservation that fails instead of aborting
pub(crate) trait VecFallibleCapacity<T>: Sized {
	/// Reserve room for `capacity` elements
	///
	/// Fails with [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData) above
	/// [`ALLOCATION_LIMIT`], or when the allocator refuses.
	fn try_with_capacity_stable(capacity: usize) -> Result<Self>;
}

impl<T> VecFallibleCapacity<T> for Vec<T> {
	fn try_with_capacity_stable(capacity: usize) -> Result<Self> {
		if capacity > ALLOCATION_LIMIT {
			err!(TooMuchData);
		}

		let mut buf = Vec::new();
		buf.try_reserve_exact(capacity)?;
		Ok(buf)
	}
}
