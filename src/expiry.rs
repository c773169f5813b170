//! Expiry buffering for server-declared token lifetimes.
//!
//! The platform reports lifetimes as `expires_in` seconds (normally `7200`). Callers spread
//! across hosts see skewed clocks and network latency, so the local validity window is shortened
//! by a tiered buffer. Longer lifetimes absorb larger buffers; very short lifetimes keep their
//! full value so a token is never considered expired before it is issued.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::_prelude::*;

/// `(exclusive lower bound, buffer)` pairs evaluated top-down; the first bound exceeded wins.
const TIERS: [(i64, i64); 6] = [(3600, 1200), (1800, 600), (900, 300), (300, 60), (60, 20), (0, 0)];

/// Raised when the platform declares a lifetime of zero or fewer seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("The expires_in value must be positive, got {seconds}.")]
pub struct InvalidTtl {
	/// Raw value reported by the platform.
	pub seconds: i64,
}

/// Maps a raw server TTL to the shortened local TTL, both in seconds.
pub fn buffered_ttl(raw_seconds: i64) -> Result<i64, InvalidTtl> {
	TIERS
		.iter()
		.find(|(bound, _)| raw_seconds > *bound)
		.map(|(_, buffer)| raw_seconds - buffer)
		.ok_or(InvalidTtl { seconds: raw_seconds })
}

/// Computes the buffered validity deadline for a token issued at `now`.
///
/// Lifetimes that overflow the calendar saturate at the latest representable instant.
pub fn valid_until(now: OffsetDateTime, raw_seconds: i64) -> Result<OffsetDateTime, InvalidTtl> {
	let ttl = buffered_ttl(raw_seconds)?;

	Ok(now
		.checked_add(Duration::seconds(ttl))
		.unwrap_or_else(|| PrimitiveDateTime::MAX.assume_offset(now.offset())))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn long_lifetimes_lose_twenty_minutes() {
		assert_eq!(buffered_ttl(7200), Ok(6000));
		assert_eq!(buffered_ttl(3601), Ok(2401));
		assert_eq!(buffered_ttl(i64::MAX), Ok(i64::MAX - 1200));
	}

	#[test]
	fn tier_boundaries_select_the_lower_tier() {
		assert_eq!(buffered_ttl(3600), Ok(3000));
		assert_eq!(buffered_ttl(1801), Ok(1201));
		assert_eq!(buffered_ttl(1800), Ok(1500));
		assert_eq!(buffered_ttl(901), Ok(601));
		assert_eq!(buffered_ttl(900), Ok(840));
		assert_eq!(buffered_ttl(301), Ok(241));
		assert_eq!(buffered_ttl(300), Ok(280));
		assert_eq!(buffered_ttl(61), Ok(41));
		assert_eq!(buffered_ttl(60), Ok(60));
		assert_eq!(buffered_ttl(1), Ok(1));
	}

	#[test]
	fn non_positive_lifetimes_are_rejected() {
		assert_eq!(buffered_ttl(0), Err(InvalidTtl { seconds: 0 }));
		assert_eq!(buffered_ttl(-5), Err(InvalidTtl { seconds: -5 }));
		assert_eq!(buffered_ttl(i64::MIN), Err(InvalidTtl { seconds: i64::MIN }));
	}

	#[test]
	fn valid_until_adds_the_buffered_ttl() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		assert_eq!(valid_until(now, 7200), Ok(macros::datetime!(2025-01-01 01:40 UTC)));
		assert!(valid_until(now, 0).is_err());
		assert_eq!(
			valid_until(now, i64::MAX),
			Ok(PrimitiveDateTime::MAX.assume_utc()),
			"Overflowing lifetimes should saturate."
		);
	}
}
