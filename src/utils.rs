use std::{ops::Deref, sync::OnceLock};

use anyhow::{bail, Error};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default date layout accepted by `"format": "date"` filters (`yyyy-MM-dd`).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Restricted JSONPath grammar accepted for field paths.
///
/// Dot child access, numeric index, wildcard and a single level filter
/// expression, e.g. `$.vc.credentialSubject.account[*].id` or
/// `$.friends[?(@name == 'Bob')]`.
const JSON_PATH_PATTERN: &str = r#"^\$((\.[\w-]+)|(\[[0-9]+\])|(\[\*\])|(\[\?\(@[\w-]+\s?(==|!=|<|<=|>|>=)\s?(['"])?[\w-]+(['"])?\)\]))+$"#;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct NonEmptyVec<T: Clone>(Vec<T>);

impl<T: Clone> NonEmptyVec<T> {
    pub fn new(t: T) -> Self {
        Self(vec![t])
    }

    pub fn maybe_new(v: Vec<T>) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn push(&mut self, t: T) {
        self.0.push(t)
    }
}

impl<T: Clone> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<NonEmptyVec<T>, Error> {
        if v.is_empty() {
            bail!("cannot create a NonEmptyVec from an empty Vec")
        }
        Ok(NonEmptyVec(v))
    }
}

impl<T: Clone> From<NonEmptyVec<T>> for Vec<T> {
    fn from(NonEmptyVec(v): NonEmptyVec<T>) -> Vec<T> {
        v
    }
}

impl<T: Clone> AsRef<[T]> for NonEmptyVec<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T: Clone> Deref for NonEmptyVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

/// Returns true if `value` parses as a calendar date laid out as `format`
/// (a `chrono` format string, see [DEFAULT_DATE_FORMAT]).
pub fn is_valid_date(value: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(value, format).is_ok()
}

/// Returns true if `path` belongs to the restricted JSONPath grammar supported
/// for constraint field paths.
///
/// Recursive descent (`..`) and nested filter expressions are rejected.
pub fn is_valid_json_path(path: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

    PATTERN
        .get_or_init(|| Regex::new(JSON_PATH_PATTERN).ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(path))
}
