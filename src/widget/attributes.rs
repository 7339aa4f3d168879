use std::collections::BTreeMap;
use std::str::FromStr;

/// HTML-like attributes of a widget.
///
/// ## Example
/// ```rust
/// use widgetvisor::Attributes;
///
/// let attrs = Attributes::new()
///     .with("machine-id", "3")
///     .with("period", "day");
/// assert_eq!(attrs.parse::<u32>("machine-id"), Some(Ok(3)));
/// assert!(attrs.parse::<u32>("period").is_some_and(|r| r.is_err()));
/// assert_eq!(attrs.parse::<u32>("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[inline]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parses an attribute; `None` if absent.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(str::parse)
    }

    /// Sets (`Some`) or removes (`None`) an attribute; returns the previous value.
    pub(crate) fn apply(&mut self, name: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) => self.values.insert(name.to_string(), v),
            None => self.values.remove(name),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
