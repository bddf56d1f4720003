//! The single error type returned across the public surface of this crate

use std::borrow::Cow;

/// `schema_invalid`: the only error category this crate returns.
///
/// Carries a human-readable message and, where available, the byte offset
/// in the input text that the problem was detected at. The enclosing
/// registry is expected to turn this into an HTTP 4xx verbatim.
#[derive(thiserror::Error)]
pub struct SchemaError {
	inner: Box<ErrorInner>,
}

struct ErrorInner {
	message: Cow<'static, str>,
	offset: Option<usize>,
}

impl SchemaError {
	pub(crate) fn new(s: &'static str) -> Self {
		Self { inner: Box::new(ErrorInner { message: Cow::Borrowed(s), offset: None }) }
	}

	/// If you need a dynamic string use `SchemaError::msg(format_args!(...))`
	pub(crate) fn msg(s: std::fmt::Arguments<'_>) -> Self {
		Self::display(s)
	}

	pub(crate) fn display(s: impl std::fmt::Display) -> Self {
		Self { inner: Box::new(ErrorInner { message: Cow::Owned(s.to_string()), offset: None }) }
	}

	pub(crate) fn at_offset(s: impl std::fmt::Display, offset: usize) -> Self {
		Self {
			inner: Box::new(ErrorInner { message: Cow::Owned(s.to_string()), offset: Some(offset) }),
		}
	}

	/// Build from a `serde_json` parse failure, recovering a byte offset
	/// from its (1-indexed) line/column by scanning `text`.
	pub(crate) fn serde_json(text: &str, e: serde_json::Error) -> Self {
		let offset = line_col_to_byte_offset(text, e.line(), e.column());
		Self::at_offset(e, offset)
	}

	/// The byte offset in the original input text that the error pertains
	/// to, if one could be determined.
	pub fn offset(&self) -> Option<usize> {
		self.inner.offset
	}
}

fn line_col_to_byte_offset(text: &str, line: usize, column: usize) -> usize {
	let mut offset = 0;
	for (idx, l) in text.split('\n').enumerate() {
		if idx + 1 == line {
			return offset + column.saturating_sub(1).min(l.len());
		}
		offset += l.len() + 1;
	}
	text.len()
}

impl std::fmt::Debug for SchemaError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.inner.message)?;
		if let Some(offset) = self.inner.offset {
			write!(f, " (at byte offset {offset})")?;
		}
		Ok(())
	}
}

impl std::fmt::Display for SchemaError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(&self.inner.message, f)?;
		if let Some(offset) = self.inner.offset {
			write!(f, " (at byte offset {offset})")?;
		}
		Ok(())
	}
}
