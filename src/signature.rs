//! MD5 parameter signatures used by payment callbacks.
//!
//! The canonical string sorts the parameters by key, skips the reserved `sign` entry and every
//! empty value, joins the rest as `k1=v1&k2=v2`, and appends `&key=<secret>`. The signature is
//! the uppercase hex MD5 digest of that string.

// std
use std::collections::HashMap;
// crates.io
use subtle::ConstantTimeEq;
// self
use crate::error::SignatureError;

/// Reserved parameter carrying the signature.
pub const SIGNATURE_KEY: &str = "sign";
/// Length of a hex-encoded MD5 digest.
pub const SIGNATURE_HEX_LEN: usize = 32;

/// Builds the string that gets hashed.
pub fn canonical_string(params: &HashMap<String, String>, secret: &str) -> String {
	let mut pairs = params
		.iter()
		.filter(|(key, value)| key.as_str() != SIGNATURE_KEY && !value.is_empty())
		.collect::<Vec<_>>();

	pairs.sort_unstable_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

	let mut canonical = String::new();

	for (key, value) in pairs {
		canonical.push_str(key);
		canonical.push('=');
		canonical.push_str(value);
		canonical.push('&');
	}

	canonical.push_str("key=");
	canonical.push_str(secret);

	canonical
}

/// Computes the uppercase hex MD5 signature of `params`.
pub fn sign(params: &HashMap<String, String>, secret: &str) -> String {
	format!("{:X}", md5::compute(canonical_string(params, secret)))
}

/// Inserts (or replaces) the `sign` entry.
pub fn set_signature(params: &mut HashMap<String, String>, secret: &str) {
	let signature = sign(params, secret);

	params.insert(SIGNATURE_KEY.to_owned(), signature);
}

/// Verifies the claimed `sign` entry against a recomputed signature in constant time.
pub fn verify(params: &HashMap<String, String>, secret: &str) -> Result<(), SignatureError> {
	let claimed = params.get(SIGNATURE_KEY).map(String::as_str).unwrap_or_default();

	if claimed.len() != SIGNATURE_HEX_LEN {
		return Err(SignatureError::Malformed {
			actual: claimed.len(),
			expected: SIGNATURE_HEX_LEN,
		});
	}

	let computed = sign(params, secret);

	if bool::from(computed.as_bytes().ct_eq(claimed.as_bytes())) {
		Ok(())
	} else {
		Err(SignatureError::Bad)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn canonical_string_sorts_and_skips_empty_and_sign() {
		let input = params(&[("b", "2"), ("a", "1"), ("empty", ""), ("sign", "XYZ")]);

		assert_eq!(canonical_string(&input, "SECRET"), "a=1&b=2&key=SECRET");
		assert_eq!(canonical_string(&HashMap::new(), "SECRET"), "key=SECRET");
	}

	#[test]
	fn sign_is_uppercase_md5_hex() {
		let signature = sign(&params(&[("a", "1"), ("b", "2")]), "SECRET");

		assert_eq!(signature, format!("{:X}", md5::compute("a=1&b=2&key=SECRET")));
		assert_eq!(signature.len(), SIGNATURE_HEX_LEN);
		assert!(signature.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
	}

	#[test]
	fn sign_matches_published_pay_vector() {
		let input = params(&[
			("appid", "wxd930ea5d5a258f4f"),
			("mch_id", "10000100"),
			("device_info", "1000"),
			("body", "test"),
			("nonce_str", "ibuaiVcKdpRxkhJA"),
		]);

		assert_eq!(sign(&input, "192006250b4c09247ec02edce69f6a2d"), "9A0A8659F005D6984697E2CA0A9CF3B7");
	}

	#[test]
	fn sign_ignores_insertion_order() {
		let forward = [("appid", "wx1"), ("body", "test"), ("mch_id", "1000"), ("nonce_str", "n")];
		let expected = sign(&params(&forward), "SECRET");

		for shift in 1..forward.len() {
			let mut rotated = forward;

			rotated.rotate_left(shift);

			assert_eq!(sign(&params(&rotated), "SECRET"), expected);
		}

		let mut reversed = forward;

		reversed.reverse();

		assert_eq!(sign(&params(&reversed), "SECRET"), expected);
	}

	#[test]
	fn set_then_verify_succeeds() {
		let mut input = params(&[("out_trade_no", "T1"), ("total_fee", "100")]);

		set_signature(&mut input, "SECRET");

		assert_eq!(verify(&input, "SECRET"), Ok(()));
		assert_eq!(verify(&input, "OTHER"), Err(SignatureError::Bad));
	}

	#[test]
	fn flipped_character_is_bad() {
		let mut input = params(&[("a", "1")]);

		set_signature(&mut input, "SECRET");

		let flipped = input[SIGNATURE_KEY]
			.chars()
			.enumerate()
			.map(|(i, c)| if i == 0 { if c == 'A' { 'B' } else { 'A' } } else { c })
			.collect::<String>();

		input.insert(SIGNATURE_KEY.into(), flipped);

		assert_eq!(verify(&input, "SECRET"), Err(SignatureError::Bad));
	}

	#[test]
	fn wrong_length_or_missing_is_malformed() {
		let mut input = params(&[("a", "1")]);

		assert_eq!(
			verify(&input, "SECRET"),
			Err(SignatureError::Malformed { actual: 0, expected: SIGNATURE_HEX_LEN })
		);

		set_signature(&mut input, "SECRET");

		let truncated = input[SIGNATURE_KEY][..31].to_owned();

		input.insert(SIGNATURE_KEY.into(), truncated);

		assert_eq!(
			verify(&input, "SECRET"),
			Err(SignatureError::Malformed { actual: 31, expected: SIGNATURE_HEX_LEN })
		);
	}

	#[test]
	fn lowercase_claim_is_bad() {
		let mut input = params(&[("a", "1")]);

		set_signature(&mut input, "SECRET");

		let lowered = input[SIGNATURE_KEY].to_ascii_lowercase();

		input.insert(SIGNATURE_KEY.into(), lowered);

		assert_eq!(verify(&input, "SECRET"), Err(SignatureError::Bad));
	}
}
