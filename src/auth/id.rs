//! Strongly typed platform identifiers (application and end-user).
//!
//! Both identifiers travel as query parameters, so they are restricted to printable ASCII and a
//! per-kind length ceiling well above anything the platform issues (`wx` + 16 hex digits for
//! applications, 28 characters for open ids).

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! platform_id {
	($name:ident, $kind:literal, $max:expr, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Longest accepted identifier, in bytes.
			pub const MAX_LEN: usize = $max;

			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, Self::MAX_LEN, &value)?;

				Ok(Self(value))
			}

			/// Raw identifier as sent on the wire.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

/// Reason an identifier was refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// Nothing was supplied.
	#[error("The {kind} is empty.")]
	Empty {
		/// Wire name of the identifier (`appid`, `openid`).
		kind: &'static str,
	},
	/// A character outside printable ASCII, whitespace included.
	#[error("The {kind} contains {character:?} at byte {index}.")]
	InvalidCharacter {
		/// Wire name of the identifier.
		kind: &'static str,
		/// Offending character.
		character: char,
		/// Byte offset of the character.
		index: usize,
	},
	/// Longer than the kind allows.
	#[error("The {kind} is {actual} bytes long; at most {max} are accepted.")]
	TooLong {
		/// Wire name of the identifier.
		kind: &'static str,
		/// Supplied length.
		actual: usize,
		/// Ceiling for this kind.
		max: usize,
	},
}

platform_id! { AppId, "appid", 32, "Official Account application identifier (`appid`)." }
platform_id! { OpenId, "openid", 64, "Per-application end-user identifier (`openid`)." }

fn check(kind: &'static str, max: usize, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some((index, character)) = value.char_indices().find(|(_, c)| !c.is_ascii_graphic()) {
		return Err(IdentifierError::InvalidCharacter { kind, character, index });
	}
	if value.len() > max {
		return Err(IdentifierError::TooLong { kind, actual: value.len(), max });
	}

	Ok(())
}
