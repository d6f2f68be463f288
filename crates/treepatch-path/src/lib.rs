//! Dot/bracket path expressions.
//!
//! This crate parses path expressions such as `"a.b[0].c"` into an ordered
//! sequence of typed steps ([`Step::Key`] / [`Step::Index`]) and formats them
//! back. It is the normalization boundary for every path form the patch
//! engine accepts: expression strings, explicit step sequences, and JSON
//! arrays of keys.
//!
//! # Example
//!
//! ```
//! use treepatch_path::{parse, Step};
//!
//! let path = parse("list[0].name").unwrap();
//! assert_eq!(
//!     path.steps(),
//!     &[Step::key("list"), Step::index(0), Step::key("name")]
//! );
//!
//! // Format back to the canonical expression form
//! assert_eq!(path.to_string(), "list[0].name");
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, Step};

/// Errors raised while resolving a path expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The expression string was empty.
    #[error("empty path expression")]
    Empty,
    /// A field name between separators was empty, e.g. `"a..b"`.
    #[error("empty field name in path expression")]
    EmptyKey,
    /// A `[` without `]`, or a stray `]`.
    #[error("unmatched bracket in path expression")]
    UnmatchedBracket,
    /// Bracket content was not a non-negative integer.
    #[error("bracket index must be a non-negative integer")]
    BadIndex,
    /// A step in an explicit key sequence was neither a string nor a
    /// non-negative integer.
    #[error("path step must be a string or non-negative integer")]
    BadStep,
}

/// Parse a dot/bracket path expression into a [`Path`].
///
/// Fields are dot-separated; each field may carry trailing `[index]` groups.
///
/// ```
/// use treepatch_path::{parse, path};
///
/// assert_eq!(parse("x.y").unwrap(), path!("x", "y"));
/// assert_eq!(parse("list[0]").unwrap(), path!("list", 0));
/// assert_eq!(parse("a.b[2].c").unwrap(), path!("a", "b", 2, "c"));
/// ```
pub fn parse(expr: &str) -> Result<Path, PathError> {
    if expr.is_empty() {
        return Err(PathError::Empty);
    }
    let mut steps = Vec::new();
    for field in expr.split('.') {
        let (name, mut brackets) = match field.find('[') {
            Some(pos) => (&field[..pos], &field[pos..]),
            None => (field, ""),
        };
        if name.contains(']') {
            return Err(PathError::UnmatchedBracket);
        }
        if name.is_empty() && brackets.is_empty() {
            return Err(PathError::EmptyKey);
        }
        if !name.is_empty() {
            steps.push(Step::Key(name.to_owned()));
        }
        while !brackets.is_empty() {
            if !brackets.starts_with('[') {
                return Err(PathError::UnmatchedBracket);
            }
            let close = brackets.find(']').ok_or(PathError::UnmatchedBracket)?;
            let digits = &brackets[1..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PathError::BadIndex);
            }
            let index: usize = digits.parse().map_err(|_| PathError::BadIndex)?;
            steps.push(Step::Index(index));
            brackets = &brackets[close + 1..];
        }
    }
    Ok(Path::from_steps(steps))
}
