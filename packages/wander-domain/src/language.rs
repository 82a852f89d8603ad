use std::{borrow::Borrow, fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_script::{Script, UnicodeScript};

static LANGUAGE_CODE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").ok());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid language code {0:?}.")]
pub struct InvalidLanguageCode(pub String);

/// Lowercase ISO 639 code with optional subtags, e.g. `en`, `ja`, `zh-hant`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);
impl LanguageCode {
	/// Lenient parse: trims, lowercases and accepts `_` as a subtag separator.
	pub fn parse(raw: &str) -> Option<Self> {
		let code = raw.trim().to_ascii_lowercase().replace('_', "-");

		if LANGUAGE_CODE.as_ref().is_some_and(|re| re.is_match(&code)) {
			Some(Self(code))
		} else {
			None
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl TryFrom<String> for LanguageCode {
	type Error = InvalidLanguageCode;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value).ok_or(InvalidLanguageCode(value))
	}
}

impl TryFrom<&str> for LanguageCode {
	type Error = InvalidLanguageCode;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value).ok_or_else(|| InvalidLanguageCode(value.to_string()))
	}
}

impl From<LanguageCode> for String {
	fn from(value: LanguageCode) -> Self {
		value.0
	}
}

impl Borrow<str> for LanguageCode {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for LanguageCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Best-effort language guess for a short phrase.
///
/// Scripts that identify a language on their own (kana, hangul, han) decide first, since
/// statistical detection is unreliable on two or three characters. Everything else goes
/// through `whatlang` and is only accepted when the detector reports a reliable result.
pub fn detect_language(text: &str) -> Option<LanguageCode> {
	if let Some(code) = detect_by_script(text) {
		return LanguageCode::parse(code);
	}

	let info = whatlang::detect(text)?;

	if !info.is_reliable() {
		return None;
	}

	LanguageCode::parse(iso_639_1(info.lang().code()))
}

fn detect_by_script(text: &str) -> Option<&'static str> {
	let mut kana = 0_usize;
	let mut hangul = 0_usize;
	let mut han = 0_usize;

	for ch in text.chars() {
		match ch.script() {
			Script::Hiragana | Script::Katakana => kana += 1,
			Script::Hangul => hangul += 1,
			Script::Han => han += 1,
			_ => {},
		}
	}

	if kana > 0 {
		Some("ja")
	} else if hangul > 0 {
		Some("ko")
	} else if han > 0 {
		Some("zh")
	} else {
		None
	}
}

// whatlang reports ISO 639-3; catalogs key synonyms by ISO 639-1 where one exists.
fn iso_639_1(code: &'static str) -> &'static str {
	match code {
		"eng" => "en",
		"cmn" => "zh",
		"jpn" => "ja",
		"kor" => "ko",
		"fra" => "fr",
		"spa" => "es",
		"deu" => "de",
		"ita" => "it",
		"por" => "pt",
		"nld" => "nl",
		"rus" => "ru",
		"ukr" => "uk",
		"pol" => "pl",
		"tur" => "tr",
		"swe" => "sv",
		"dan" => "da",
		"nob" => "nb",
		"fin" => "fi",
		"ces" => "cs",
		"hun" => "hu",
		"ell" => "el",
		"heb" => "he",
		"ara" => "ar",
		"hin" => "hi",
		"tha" => "th",
		"vie" => "vi",
		"ind" => "id",
		other => other,
	}
}
