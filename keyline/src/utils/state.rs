use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use crate::errors::InvalidValueSnafu;
use crate::errors::{Error, ShapeMismatchSnafu};

/// A live value, or a sparse fragment of one, that keyframes carry and tracks write.
///
/// Interpolation recurses structurally: scalars and tuple components blend numerically, records
/// blend key by key, booleans and texts switch at the end of a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    Scalar(f64),
    Boolean(bool),
    Text(String),
    /// A fixed-length numeric tuple (e.g. an RGBA color).
    Tuple(Vec<f64>),
    /// A mapping of named fields, possibly nested.
    Record(BTreeMap<String, State>),
}

impl Default for State {
    fn default() -> Self {
        State::Record(BTreeMap::new())
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Scalar(value) => write!(f, "{}", value),
            State::Boolean(b) => write!(f, "{}", b),
            State::Text(s) => write!(f, "\"{}\"", s),
            State::Tuple(values) => {
                let elements = values
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "[{}]", elements)
            }
            State::Record(fields) => {
                let entries = fields
                    .iter()
                    .map(|(key, value)| format!("\"{}\": {}", key, value))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{{{}}}", entries)
            }
        }
    }
}

// **********************************************
// Serde
// **********************************************

#[cfg(feature = "serde")]
impl serde::Serialize for State {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            State::Scalar(value) => serializer.serialize_f64(*value),
            State::Boolean(b) => serializer.serialize_bool(*b),
            State::Text(s) => serializer.serialize_str(s),
            State::Tuple(values) => serializer.collect_seq(values),
            State::Record(fields) => serializer.collect_map(fields),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for State {
    fn deserialize<D>(de: D) -> Result<State, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let value = <serde_json::Value as serde::Deserialize>::deserialize(de)?;
        State::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<serde_json::Value> for State {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => InvalidValueSnafu {
                info: "null cannot be animated",
            }
            .fail(),
            serde_json::Value::Bool(b) => Ok(State::Boolean(b)),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(value) => Ok(State::Scalar(value)),
                None => InvalidValueSnafu {
                    info: format!("{} is not representable as f64", n),
                }
                .fail(),
            },
            serde_json::Value::String(s) => Ok(State::Text(s)),
            serde_json::Value::Array(list) => list
                .into_iter()
                .map(|item| {
                    item.as_f64().ok_or_else(|| {
                        InvalidValueSnafu {
                            info: format!("tuple component {} is not a number", item),
                        }
                        .build()
                    })
                })
                .collect::<Result<Vec<f64>, Error>>()
                .map(State::Tuple),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| Ok((key, State::try_from(value)?)))
                .collect::<Result<BTreeMap<String, State>, Error>>()
                .map(State::Record),
        }
    }
}

// **********************************************
// Extractors: get the value inside State.
// **********************************************
impl State {
    /// A short description of the value shape, used in mismatch reports.
    pub fn shape(&self) -> String {
        match self {
            State::Scalar(_) => String::from("scalar"),
            State::Boolean(_) => String::from("boolean"),
            State::Text(_) => String::from("text"),
            State::Tuple(values) => format!("tuple({})", values.len()),
            State::Record(_) => String::from("record"),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, State::Record(_))
    }

    /// Extracts the float value if it is a scalar.
    pub fn as_float(&self) -> f64 {
        match *self {
            State::Scalar(value) => value,
            State::Boolean(b) => f64::from(b),
            _ => 0.0,
        }
    }

    /// Extracts the boolean value if it is a boolean.
    pub fn as_bool(&self) -> bool {
        match self {
            State::Scalar(value) => *value > 0.0,
            State::Boolean(b) => *b,
            State::Text(s) => !s.is_empty(),
            State::Tuple(values) => !values.is_empty(),
            State::Record(fields) => !fields.is_empty(),
        }
    }

    /// Extracts the &str of this value if it is a text.
    pub fn as_str(&self) -> &str {
        match self {
            State::Text(ref s) => s,
            _ => "",
        }
    }

    /// Extracts the tuple components if it is a tuple.
    pub fn as_tuple(&self) -> &[f64] {
        match self {
            State::Tuple(values) => values,
            _ => &[],
        }
    }

    /// Returns the field `key` if this is a record holding it.
    pub fn get(&self, key: &str) -> Option<&State> {
        match self {
            State::Record(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Iterates the field names if this is a record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let fields = match self {
            State::Record(fields) => Some(fields),
            _ => None,
        };
        fields.into_iter().flat_map(|f| f.keys().map(String::as_str))
    }
}

// **********************************************
// Structure: shapes, projection, merge and interpolation.
// **********************************************
impl State {
    /// Verifies that `other` may be interpolated with this value, reporting the first conflict
    /// found under `key`. Records only compare the fields they share.
    pub fn check_shape(&self, other: &State, key: &str) -> Result<(), Error> {
        match (self, other) {
            (State::Scalar(_), State::Scalar(_))
            | (State::Boolean(_), State::Boolean(_))
            | (State::Text(_), State::Text(_)) => Ok(()),
            (State::Tuple(a), State::Tuple(b)) if a.len() == b.len() => Ok(()),
            (State::Record(a), State::Record(b)) => {
                for (field, value) in a {
                    if let Some(theirs) = b.get(field) {
                        value.check_shape(theirs, &join_key(key, field))?;
                    }
                }
                Ok(())
            }
            _ => ShapeMismatchSnafu {
                key,
                expected: self.shape(),
                found: other.shape(),
            }
            .fail(),
        }
    }

    /// Projects this value onto the fields present in `template`.
    ///
    /// Used to capture "the current values of every key about to be animated": a record template
    /// picks matching fields recursively, any other template takes the whole value.
    pub fn pick(&self, template: &State) -> Option<State> {
        match (self, template) {
            (State::Record(fields), State::Record(wanted)) => Some(State::Record(
                wanted
                    .iter()
                    .filter_map(|(key, sub)| {
                        fields
                            .get(key)
                            .and_then(|value| value.pick(sub))
                            .map(|value| (key.clone(), value))
                    })
                    .collect(),
            )),
            (State::Record(_), _) => None,
            (value, _) => Some(value.clone()),
        }
    }

    /// Writes `patch` into this value: records merge field by field, anything else is replaced.
    ///
    /// # Errors
    /// A field whose current shape conflicts with the patch is left untouched and reported.
    pub fn merge(&mut self, patch: &State) -> Result<(), Error> {
        self.merge_at(patch, "")
    }

    fn merge_at(&mut self, patch: &State, key: &str) -> Result<(), Error> {
        match (&mut *self, patch) {
            (State::Record(fields), State::Record(incoming)) => {
                for (field, value) in incoming {
                    let path = join_key(key, field);
                    match fields.get_mut(field) {
                        Some(current) => current.merge_at(value, &path)?,
                        None => {
                            fields.insert(field.clone(), value.clone());
                        }
                    }
                }
                Ok(())
            }
            (current, incoming) => {
                current.check_shape(incoming, key)?;
                *current = incoming.clone();
                Ok(())
            }
        }
    }

    /// Interpolates from this value toward `to` by `progress` (already eased).
    ///
    /// Shapes are expected to match (tracks reject mismatches at insertion): on a mismatch the
    /// value steps like a boolean would.
    pub fn lerp(&self, to: &State, progress: f64) -> State {
        match (self, to) {
            (State::Scalar(a), State::Scalar(b)) => State::Scalar(a + (b - a) * progress),
            (State::Tuple(a), State::Tuple(b)) if a.len() == b.len() => State::Tuple(
                a.iter()
                    .zip(b.iter())
                    .map(|(a, b)| a + (b - a) * progress)
                    .collect(),
            ),
            (State::Record(a), State::Record(b)) => {
                let mut fields = a.clone();
                for (key, target) in b {
                    let value = match a.get(key) {
                        Some(from) => from.lerp(target, progress),
                        None => target.clone(),
                    };
                    fields.insert(key.clone(), value);
                }
                State::Record(fields)
            }
            (from, target) => match progress >= 1.0 {
                true => target.clone(),
                false => from.clone(),
            },
        }
    }
}

fn join_key(parent: &str, field: &str) -> String {
    match parent.is_empty() {
        true => field.to_string(),
        false => format!("{}.{}", parent, field),
    }
}

// **********************************************
// Converters: set a value inside State.
// **********************************************

macro_rules! impl_from_converter {
    ($variant:ident : $T:ty) => {
        impl From<$T> for State {
            #[inline]
            fn from(val: $T) -> State {
                State::$variant(val.into())
            }
        }
    };
}

impl_from_converter!(Text: String);
impl_from_converter!(Text: &str);
impl_from_converter!(Scalar: u8);
impl_from_converter!(Scalar: u16);
impl_from_converter!(Scalar: u32);
impl_from_converter!(Scalar: i8);
impl_from_converter!(Scalar: i16);
impl_from_converter!(Scalar: i32);
impl_from_converter!(Scalar: f32);
impl_from_converter!(Scalar: f64);
impl_from_converter!(Boolean: bool);
impl_from_converter!(Tuple: Vec<f64>);
impl_from_converter!(Record: BTreeMap<String, State>);

impl<const N: usize> From<[f64; N]> for State {
    /// Convert a numeric array to `State::Tuple`.
    fn from(values: [f64; N]) -> Self {
        State::Tuple(values.to_vec())
    }
}

impl<K: Into<String>, V: Into<State>> FromIterator<(K, V)> for State {
    /// Create a `State::Record` by collecting an iterator of named fields.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        State::Record(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
