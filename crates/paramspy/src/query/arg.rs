//! Positional assertion arguments.

use crate::wildcard::ANY_PARAM;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// One positional argument of an assertion such as `with(category_ids, [1, 2])`.
///
/// [`Arg::Any`] is the `ANY_PARAM` sentinel. Converting the string
/// `"ANY_PARAM"` into an `Arg` yields `Any`, and `Any` renders back to that
/// string when it flows into a built query.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Any,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Arg>),
    Options(BTreeMap<String, Arg>),
}

impl Arg {
    /// Build an option map argument, e.g. `Arg::options([("page", 2), ("per_page", 15)])`.
    pub fn options<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        Arg::Options(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Arg::Any)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Arg::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value of an integer or float argument.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Integer(value) => Some(*value as f64),
            Arg::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&BTreeMap<String, Arg>> {
        match self {
            Arg::Options(options) => Some(options),
            _ => None,
        }
    }

    /// Render the argument the way it appears inside a query parameter.
    pub fn render(&self) -> String {
        match self {
            Arg::Any => ANY_PARAM.to_string(),
            Arg::Text(value) => value.clone(),
            Arg::Integer(value) => value.to_string(),
            Arg::Float(value) => format!("{value:?}"),
            Arg::Bool(value) => value.to_string(),
            Arg::List(values) => {
                let rendered: Vec<String> = values.iter().map(Arg::render).collect();
                format!("({})", rendered.join(" OR "))
            }
            Arg::Options(options) => {
                let rendered: Vec<String> = options
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.render()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        if value == ANY_PARAM {
            Arg::Any
        } else {
            Arg::Text(value.to_string())
        }
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::from(value.as_str())
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::from(value.as_str())
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Integer(value.into())
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Integer(value)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for Arg {
    fn from(values: [T; N]) -> Self {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Arg>> for Arg {
    fn from(options: BTreeMap<String, Arg>) -> Self {
        Arg::Options(options)
    }
}

/// Wire shape of an argument in expectation files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawArg {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RawArg>),
    Options(BTreeMap<String, RawArg>),
}

impl From<RawArg> for Arg {
    fn from(raw: RawArg) -> Self {
        match raw {
            RawArg::Bool(value) => Arg::Bool(value),
            RawArg::Integer(value) => Arg::Integer(value),
            RawArg::Float(value) => Arg::Float(value),
            RawArg::Text(value) => Arg::from(value),
            RawArg::List(values) => Arg::List(values.into_iter().map(Arg::from).collect()),
            RawArg::Options(options) => {
                Arg::Options(options.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Arg {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawArg::deserialize(deserializer).map(Arg::from)
    }
}

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```
/// use paramspy::{args, Arg, ANY_PARAM};
///
/// let args = args!["category_ids", [1, 2]];
/// assert_eq!(args[0], Arg::Text("category_ids".into()));
/// assert!(args!["name", ANY_PARAM][1].is_any());
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}
