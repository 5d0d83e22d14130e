use std::fmt::{Display, Formatter, Result as FmtResult};

/// A declared input slot.
///
/// Definitions come from a declaration string such as `appname,type:Text`.
/// The `index` is the slot's position in that string and decides which
/// comma-separated field of an input line feeds the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefinition {
    /// Token name, unique within a configuration.
    pub name: String,
    /// Value used when an input line leaves the slot empty. May be empty.
    pub default_value: String,
    /// Zero-based position in the declaration string.
    pub index: usize,
}

/// The value a token takes for one input line.
///
/// `raw` is the field exactly as typed (whitespace preserved) and backs the
/// `{$name:friendly}` placeholder form. `clean` is the sanitized identifier
/// form used by conditions and by the bare `{$name}` placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValue {
    pub raw: String,
    pub clean: String,
}

impl TokenValue {
    pub fn new(raw: impl Into<String>, clean: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            clean: clean.into(),
        }
    }

    /// A value whose raw and clean forms are the same string.
    pub fn uniform(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            raw: value.clone(),
            clean: value,
        }
    }

    /// Returns true if the clean form is empty.
    pub fn is_empty(&self) -> bool {
        self.clean.is_empty()
    }
}

impl Display for TokenValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.clean)
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::uniform(value)
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        TokenValue::uniform(value)
    }
}

impl From<(&str, &str)> for TokenValue {
    fn from((raw, clean): (&str, &str)) -> Self {
        TokenValue::new(raw, clean)
    }
}

/// Resolved tokens for a single input line, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: Vec<(String, TokenValue)>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `name`, keeping its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: TokenValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TokenValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// The clean value of `name`, if the token is present.
    pub fn clean(&self, name: &str) -> Option<&str> {
        self.get(name).map(|value| value.clean.as_str())
    }

    /// The raw value of `name`, if the token is present.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.get(name).map(|value| value.raw.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TokenValue)> for TokenMap {
    fn from_iter<T: IntoIterator<Item = (String, TokenValue)>>(iter: T) -> Self {
        let mut map = TokenMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}
