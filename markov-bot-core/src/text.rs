//! Text helpers shared by the analyzers and the post handler.

/// Substitutions applied by [`preprocess`], tried in this order at every position.
const REPLACEMENTS: &[(&str, &str)] = &[
	("!", "！"),
	("?", "？"),
	("，", "、"),
	("．", "。"),
	("。", "。\n"),
	("&lt;", "<"),
	("&gt;", ">"),
	("&amp;", "&"),
	("&nbsp;", ""),
];

/// Normalizes a raw post before it reaches the morphological analyzer.
///
/// - Posts containing a link are dropped (an empty string is returned)
/// - Half-width `!`/`?` become full-width, `，`/`．` become `、`/`。`
/// - A line break follows every `。`, so each sentence ends up on its own line
/// - The HTML entities `&lt;`, `&gt;`, `&amp;` are unescaped, `&nbsp;` is removed
///
/// Replacements are done in a single pass: replaced text is never scanned again.
pub fn preprocess(text: &str) -> String {
	if text.contains("http://") || text.contains("https://") {
		return String::new();
	}

	let mut out = String::with_capacity(text.len());
	let mut rest = text;
	'scan: while let Some(c) = rest.chars().next() {
		for (from, to) in REPLACEMENTS {
			if let Some(after) = rest.strip_prefix(from) {
				out.push_str(to);
				rest = after;
				continue 'scan;
			}
		}
		out.push(c);
		rest = &rest[c.len_utf8()..];
	}
	out
}

/// Returns `true` for a non-empty run of ASCII letters.
fn is_ascii_word(token: &str) -> bool {
	!token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Joins generated tokens into the text to publish.
///
/// Tokens are concatenated as they are, except that two consecutive ASCII
/// words get a single space between them.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
	let mut out = String::new();
	let mut prev: Option<&str> = None;
	for token in tokens {
		let token = token.as_ref();
		if prev.is_some_and(is_ascii_word) && is_ascii_word(token) {
			out.push(' ');
		}
		out.push_str(token);
		prev = Some(token);
	}
	out
}
