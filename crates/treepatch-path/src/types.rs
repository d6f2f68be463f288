//! Typed path steps and the `Path` sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::PathError;

/// A single step in a path.
///
/// Either a field name into a mapping node or an index into a sequence node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Mapping field access: `{"key": value}`
    Key(String),
    /// Sequence index access: `[index]`
    Index(usize),
}

impl Step {
    /// Create a key step.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Step::Key(k.into())
    }

    /// Create an index step.
    #[inline]
    pub fn index(i: usize) -> Self {
        Step::Index(i)
    }

    /// Get the field name if this is a key step.
    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(k) => Some(k),
            Step::Index(_) => None,
        }
    }

    /// Get the index if this is an index step.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Step::Key(_) => None,
            Step::Index(i) => Some(*i),
        }
    }
}

impl From<String> for Step {
    fn from(s: String) -> Self {
        Step::Key(s)
    }
}

impl From<&str> for Step {
    fn from(s: &str) -> Self {
        Step::Key(s.to_owned())
    }
}

impl From<usize> for Step {
    fn from(i: usize) -> Self {
        Step::Index(i)
    }
}

/// An ordered sequence of steps identifying a location in a nested state tree.
///
/// A `Path` is built from a dot/bracket expression (see [`crate::parse`]),
/// from explicit steps, or with the [`path!`](crate::path) macro. The empty
/// path addresses the whole tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Step>);

impl Path {
    /// Create an empty (root) path.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of steps.
    #[inline]
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    /// Append a key step and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Step::Key(k.into()));
        self
    }

    /// Append an index step and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Step::Index(i));
        self
    }

    /// Push a step onto the path.
    #[inline]
    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// The steps of this path.
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// True for the root path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first step, if any.
    #[inline]
    pub fn first(&self) -> Option<&Step> {
        self.0.first()
    }

    /// The last step, if any.
    #[inline]
    pub fn last(&self) -> Option<&Step> {
        self.0.last()
    }

    /// Iterate over the steps.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.0.iter()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(k) => write!(f, "{k}"),
            Step::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.0 {
            match step {
                Step::Key(k) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                Step::Index(i) => write!(f, "[{i}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Path(steps)
    }
}

impl FromIterator<Step> for Path {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// The explicit-sequence input form: a JSON array whose elements are strings
/// (field names) or non-negative integers (indices).
impl TryFrom<&serde_json::Value> for Path {
    type Error = PathError;

    fn try_from(value: &serde_json::Value) -> Result<Self, PathError> {
        let arr = value.as_array().ok_or(PathError::BadStep)?;
        let mut steps = Vec::with_capacity(arr.len());
        for item in arr {
            match item {
                serde_json::Value::String(s) => steps.push(Step::Key(s.clone())),
                serde_json::Value::Number(n) => {
                    let idx = n.as_u64().ok_or(PathError::BadIndex)?;
                    steps.push(Step::Index(idx as usize));
                }
                _ => return Err(PathError::BadStep),
            }
        }
        Ok(Path(steps))
    }
}

/// Construct a [`Path`] from a sequence of steps.
///
/// String literals become key steps, integers become index steps.
///
/// # Examples
///
/// ```
/// use treepatch_path::path;
///
/// let p = path!("items", 0, "name");
/// assert_eq!(p.to_string(), "items[0].name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($step:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Step::from($step));
        )+
        p
    }};
}
