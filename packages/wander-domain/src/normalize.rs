use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Text after the fold applied to both synonyms and query phrases.
///
/// Construction is the only way to obtain one, so an index built from `NormalizedText` and a
/// lookup performed with `NormalizedText` always agree on the fold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedText(String);
impl NormalizedText {
	pub fn new(raw: &str) -> Self {
		Self(normalize(raw))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for NormalizedText {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// NFKC, lowercase, invisible characters dropped, whitespace trimmed and collapsed to single
/// spaces. Idempotent.
pub fn normalize(input: &str) -> String {
	let folded: String = input
		.nfkc()
		.flat_map(char::to_lowercase)
		.nfkc()
		.filter(|ch| !is_invisible(*ch))
		.map(|ch| if ch.is_control() { ' ' } else { ch })
		.collect();
	let mut out = String::with_capacity(folded.len());

	for word in folded.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(word);
	}

	out
}

fn is_invisible(ch: char) -> bool {
	matches!(
		ch,
		'\u{00AD}' // soft hyphen
			| '\u{034F}' // combining grapheme joiner
			| '\u{061C}' // arabic letter mark
			| '\u{180E}' // mongolian vowel separator
			| '\u{200B}' // zero width space
			| '\u{200C}' // zero width non-joiner
			| '\u{200D}' // zero width joiner
			| '\u{2060}' // word joiner
			| '\u{FEFF}' // zero width no-break space
	)
}

#[cfg(test)]
mod tests {
	use super::{NormalizedText, normalize};

	#[test]
	fn lowercases_and_trims() {
		assert_eq!(normalize("  Heritage "), "heritage");
	}

	#[test]
	fn collapses_inner_whitespace() {
		assert_eq!(normalize("hot \t  spring\nresort"), "hot spring resort");
	}

	#[test]
	fn folds_fullwidth_latin() {
		assert_eq!(normalize("ＢＥＡＣＨ"), "beach");
	}

	#[test]
	fn folds_halfwidth_katakana() {
		assert_eq!(normalize("ﾋﾞｰﾁ"), "ビーチ");
	}

	#[test]
	fn drops_zero_width_characters() {
		assert_eq!(normalize("bea\u{200B}ch"), "beach");
	}

	#[test]
	fn keeps_cjk_untouched() {
		assert_eq!(normalize("溫泉"), "溫泉");
		assert_eq!(normalize("静かな"), "静かな");
	}

	#[test]
	fn is_idempotent() {
		for raw in ["Ｆａｍｉｌｙ-Friendly", "  İstanbul  ", "ﾌｧﾐﾘｰ向け", "Ｃａｆé"] {
			let once = normalize(raw);

			assert_eq!(normalize(&once), once, "normalize is not idempotent for {raw:?}");
		}
	}

	#[test]
	fn whitespace_only_is_empty() {
		assert!(NormalizedText::new(" \u{3000}\t").is_empty());
	}
}
