//! Duration strings used by the OAuth2 client lifespan attributes.

// std
use std::sync::LazyLock;
// crates.io
use regex::Regex;
// self
use crate::_prelude::*;

static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([0-9]+(ns|us|ms|s|m|h))*$").expect("lifespan grammar must compile")
});

/// Parse a lifespan such as `1h30m`; the empty string stands for "unset".
pub fn parse(field: &'static str, value: &str) -> Result<Duration> {
	if !GRAMMAR.is_match(value) {
		return Err(Error::validation(
			field,
			format!("{value:?} is not a sequence of <digits><ns|us|ms|s|m|h>."),
		));
	}
	if value.is_empty() {
		return Ok(Duration::ZERO);
	}

	humantime::parse_duration(value)
		.map_err(|err| Error::validation(field, format!("{value:?} is not a duration: {err}.")))
}

/// Whether two lifespans denote the same duration, e.g. `60m` and `1h`.
///
/// Unset and empty values are equal to each other; unparsable values only match themselves.
pub fn equivalent(left: Option<&str>, right: Option<&str>) -> bool {
	let left = left.filter(|v| !v.is_empty());
	let right = right.filter(|v| !v.is_empty());

	match (left, right) {
		(None, None) => true,
		(Some(left), Some(right)) if left == right => true,
		(Some(left), Some(right)) => match (parse("lifespan", left), parse("lifespan", right)) {
			(Ok(left), Ok(right)) => left == right,
			_ => false,
		},
		_ => false,
	}
}

/// Drop empty lifespans so they are never sent to the remote API.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
	value.as_ref().filter(|v| !v.is_empty()).cloned()
}
