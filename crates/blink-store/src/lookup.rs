use blink_types::Value;

use crate::store::Entries;

/// What a successful `get` or `pull` produced.
///
/// An exact query (or a fallback default) yields a single [`Lookup::Value`].
/// A wildcard query with at least one match yields [`Lookup::Matches`] in
/// store insertion order. A wildcard query with no matches never yields an
/// empty `Matches`: it yields nothing, or the caller's default.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Value(Value),
    Matches(Entries),
}

impl Lookup {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Lookup::Value(v) => Some(v),
            Lookup::Matches(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Value(v) => Some(v),
            Lookup::Matches(_) => None,
        }
    }

    pub fn as_matches(&self) -> Option<&Entries> {
        match self {
            Lookup::Matches(m) => Some(m),
            Lookup::Value(_) => None,
        }
    }

    pub fn into_matches(self) -> Option<Entries> {
        match self {
            Lookup::Matches(m) => Some(m),
            Lookup::Value(_) => None,
        }
    }

    /// Number of values carried: 1 for a single value, else the match count.
    pub fn len(&self) -> usize {
        match self {
            Lookup::Value(_) => 1,
            Lookup::Matches(m) => m.len(),
        }
    }

    /// Always `false`; an empty `Matches` is never constructed by the store.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Value> for Lookup {
    fn from(value: Value) -> Self {
        Lookup::Value(value)
    }
}
