use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::text::preprocess;

/// Splits raw text into sentences of tokens.
///
/// The chain never sees raw text: every post goes through an analyzer first and
/// each returned sentence is added to the chain as one source.
pub trait Analyzer {
	/// Analyzes `text` into sentences, each a list of tokens.
	fn analyze(&self, text: &str) -> Result<Vec<Vec<String>>>;
}

/// Analyzer for space-separated languages.
///
/// Every non-blank line is a sentence, and tokens are separated by whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceAnalyzer;

impl Analyzer for WhitespaceAnalyzer {
	fn analyze(&self, text: &str) -> Result<Vec<Vec<String>>> {
		Ok(text
			.lines()
			.map(|line| line.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
			.filter(|tokens| !tokens.is_empty())
			.collect())
	}
}

/// Analyzer delegating to the MeCab command line tool.
///
/// The text is [`preprocess`]ed, then piped to `mecab -Owakati` using the
/// dictionary named `dic_type` under `mecab-config --dicdir`. Each output line
/// is one sentence.
#[derive(Clone, Debug)]
pub struct MecabAnalyzer {
	dic_type: String,
}

impl MecabAnalyzer {
	/// Dictionary used when none is configured.
	pub const DEFAULT_DICTIONARY: &'static str = "mecab-ipadic-neologd";

	pub fn new(dic_type: impl Into<String>) -> Self {
		Self { dic_type: dic_type.into() }
	}

	fn dictionary_dir(&self) -> Result<PathBuf> {
		let output = Command::new("mecab-config")
			.arg("--dicdir")
			.output()
			.map_err(|err| Error::Analyze(format!("run mecab-config: {err}")))?;
		if !output.status.success() {
			return Err(Error::Analyze(format!("mecab-config exited with {}", output.status)));
		}
		let dir = String::from_utf8_lossy(&output.stdout);
		Ok(PathBuf::from(dir.trim_end_matches('\n')).join(&self.dic_type))
	}
}

impl Default for MecabAnalyzer {
	fn default() -> Self {
		Self::new(Self::DEFAULT_DICTIONARY)
	}
}

impl Analyzer for MecabAnalyzer {
	fn analyze(&self, text: &str) -> Result<Vec<Vec<String>>> {
		let preprocessed = preprocess(text);
		let dic_dir = self.dictionary_dir()?;

		let mut child = Command::new("mecab")
			.arg("-d")
			.arg(&dic_dir)
			.arg("-Owakati")
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.spawn()
			.map_err(|err| Error::Analyze(format!("run mecab: {err}")))?;

		// Dropping stdin closes the pipe so mecab sees the end of input.
		{
			let mut stdin = child
				.stdin
				.take()
				.ok_or_else(|| Error::Analyze("open stdin pipe".to_owned()))?;
			stdin
				.write_all(preprocessed.as_bytes())
				.map_err(|err| Error::Analyze(format!("write to stdin: {err}")))?;
		}

		let output = child
			.wait_with_output()
			.map_err(|err| Error::Analyze(format!("run mecab: {err}")))?;
		if !output.status.success() {
			return Err(Error::Analyze(format!("mecab exited with {}", output.status)));
		}

		Ok(parse_wakati(&String::from_utf8_lossy(&output.stdout)))
	}
}

/// Parses `-Owakati` output: one sentence per line, tokens separated by spaces.
fn parse_wakati(output: &str) -> Vec<Vec<String>> {
	output
		.split('\n')
		.filter(|line| !line.is_empty())
		.map(|line| {
			line.split(' ')
				.filter(|token| !token.is_empty())
				.map(str::to_owned)
				.collect()
		})
		.collect()
}
