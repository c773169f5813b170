//! User profile returned by `sns/userinfo`.

// self
use crate::{_prelude::*, error::ConfigError};

/// Language of the localized fields in [`UserInfo`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
	/// Simplified Chinese.
	#[default]
	ZhCn,
	/// Traditional Chinese.
	ZhTw,
	/// English.
	En,
}
impl Language {
	/// Value of the `lang` query parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ZhCn => "zh_CN",
			Self::ZhTw => "zh_TW",
			Self::En => "en",
		}
	}
}
impl Display for Language {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Language {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"" | "zh_CN" => Ok(Self::ZhCn),
			"zh_TW" => Ok(Self::ZhTw),
			"en" => Ok(Self::En),
			other => Err(ConfigError::invalid_input(format!(
				"lang must be one of zh_CN, zh_TW, en; got {other:?}"
			))),
		}
	}
}

/// Public profile returned by `sns/userinfo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
	/// User identifier scoped to the application.
	pub openid: String,
	/// Display name.
	#[serde(default)]
	pub nickname: String,
	/// `1` male, `2` female, `0` unknown.
	#[serde(default)]
	pub sex: i64,
	/// City.
	#[serde(default)]
	pub city: String,
	/// Province.
	#[serde(default)]
	pub province: String,
	/// Country.
	#[serde(default)]
	pub country: String,
	/// Avatar URL; empty when the user has none.
	#[serde(rename = "headimgurl", default)]
	pub head_image_url: String,
	/// Privilege list, such as `chinaunicom`.
	#[serde(default)]
	pub privilege: Vec<String>,
	/// Identifier shared across applications bound to the same open platform account.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unionid: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn language_parses_empty_as_default() {
		assert_eq!("".parse::<Language>().expect("Empty lang should parse."), Language::ZhCn);
		assert_eq!("zh_TW".parse::<Language>().expect("zh_TW should parse."), Language::ZhTw);
		assert!("fr".parse::<Language>().is_err());
		assert_eq!(Language::En.to_string(), "en");
	}
}
