//! Scope sets granted to per-user OAuth tokens.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Scope requesting only the user's `openid` (silent authorization).
pub const SCOPE_BASE: &str = "snsapi_base";
/// Scope requesting the user's public profile (explicit consent).
pub const SCOPE_USERINFO: &str = "snsapi_userinfo";

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace or the `,` delimiter.
	#[error("Scope contains whitespace or a delimiter: {scope}.")]
	InvalidCharacter {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted so equality and hashing do not depend on the order the
/// platform lists them in. The platform joins scopes with `,`, see [`ScopeSet::from_csv`].
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(|c| c.is_whitespace() || c == ',') {
				return Err(ScopeValidationError::InvalidCharacter { scope: owned });
			}

			set.insert(owned);
		}

		Ok(Self(Arc::from(set.into_iter().collect::<Vec<_>>())))
	}

	/// Parses the platform's comma-separated `scope` field, skipping blank segments.
	pub fn from_csv(raw: &str) -> Result<Self, ScopeValidationError> {
		Self::new(raw.split(',').map(str::trim).filter(|segment| !segment.is_empty()))
	}

	/// Joins the scopes with `,` as the authorize endpoint expects.
	pub fn to_csv(&self) -> String {
		self.0.join(",")
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_csv())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_csv(s)
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for scope in self.0.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn csv_parsing_normalizes_order_and_duplicates() {
		let lhs = ScopeSet::from_csv("snsapi_userinfo,snsapi_base,snsapi_base")
			.expect("Left-hand scope list should parse.");
		let rhs = ScopeSet::new([SCOPE_BASE, SCOPE_USERINFO])
			.expect("Right-hand scope set should be valid.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.to_csv(), "snsapi_base,snsapi_userinfo");
		assert!(lhs.contains(SCOPE_USERINFO));
	}

	#[test]
	fn blank_csv_segments_are_skipped() {
		assert!(ScopeSet::from_csv("").expect("Empty field should parse.").is_empty());

		let scopes = ScopeSet::from_csv(" snsapi_base , ,").expect("Padded list should parse.");

		assert_eq!(scopes.iter().collect::<Vec<_>>(), vec![SCOPE_BASE]);
	}

	#[test]
	fn invalid_scopes_error() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["contains space"]),
			Err(ScopeValidationError::InvalidCharacter { .. })
		));
		assert!(ScopeSet::new(["a,b"]).is_err());
	}

	#[test]
	fn serde_uses_a_sequence() {
		let scopes = ScopeSet::new([SCOPE_USERINFO]).expect("Scope fixture should be valid.");
		let payload = serde_json::to_string(&scopes).expect("Scope set should serialize.");

		assert_eq!(payload, "[\"snsapi_userinfo\"]");
		assert_eq!(
			serde_json::from_str::<ScopeSet>(&payload).expect("Scope set should deserialize."),
			scopes
		);
		assert!(serde_json::from_str::<ScopeSet>("[\"\"]").is_err());
	}
}
