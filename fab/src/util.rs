//! This module implements small token-level helpers shared by the section
//! readers, without enough context to warrant modules of their own.

use crate::errors::FabError;

/// Returns the first `"`-delimited substring of a value, i.e. the text
/// between the first pair of quote characters. Returns None if the value
/// has fewer than two quotes.
pub fn first_quoted(value: &str) -> Option<&str> {
  let open = value.find('"')?;
  let rest = &value[open+1..];
  let close = rest.find('"')?;
  return Some(&rest[..close]);
}

/// Strips the first quoted substring out of a value, as PROPERTIES and SETS
/// values require. A value with no quoted substring is a format error.
pub fn strip_quotes(value: &str) -> Result<String, FabError> {
  return first_quoted(value)
    .map(String::from)
    .ok_or_else(|| FabError::MalformedKeyword {
      line: value.to_string(),
      line_no: None
    });
}

/// Parses a token as a real number, with a line number for diagnostics.
pub(crate) fn parse_real(token: &str, line_no: usize) -> Result<f64, FabError> {
  return token.parse::<f64>().map_err(|_| FabError::BadNumber {
    token: token.to_string(),
    line_no: Some(line_no)
  });
}

/// Parses a token as an unsigned integer (record ids, declared counts).
pub(crate) fn parse_uint(token: &str, line_no: usize) -> Result<u64, FabError> {
  return token.parse::<u64>().map_err(|_| FabError::BadNumber {
    token: token.to_string(),
    line_no: Some(line_no)
  });
}
