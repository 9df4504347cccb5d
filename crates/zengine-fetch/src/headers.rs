use std::collections::BTreeMap;

use http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};

/// Plain `name → value` header mapping, the only header shape that can
/// cross the frame boundary.
pub type PlainHeaders = BTreeMap<String, String>;

/// A header name or value that HTTP does not allow.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("invalid header name {name:?}")]
    Name {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },

    #[error("invalid value for header {name:?}")]
    Value {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Ordered, case-insensitive header multi-map over [`http::HeaderMap`].
///
/// Repeated names keep one value each, in insertion order;
/// [`get`](Self::get) and [`to_plain`](Self::to_plain) join them with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, appending repeated names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name.as_ref(), value.as_ref())?;
        }
        Ok(headers)
    }

    /// Add a value, keeping any existing values for `name`.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = parse_pair(name, value)?;
        self.map.append(name, value);
        Ok(())
    }

    /// Replace every value for `name` with `value`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = parse_pair(name, value)?;
        self.map.insert(name, value);
        Ok(())
    }

    /// All values for `name`, comma-joined.
    pub fn get(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.map.get_all(name.trim()).iter().map(value_str).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name.trim())
    }

    pub fn delete(&mut self, name: &str) {
        self.map.remove(name.trim());
    }

    /// One entry per value; values for the same name are adjacent.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .iter()
            .map(|(name, value)| (name.as_str(), value_str(value)))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Collapse into a plain mapping, merging repeated names with `", "` in
    /// encounter order.
    pub fn to_plain(&self) -> PlainHeaders {
        self.map
            .keys()
            .map(|name| {
                let values: Vec<&str> = self.map.get_all(name).iter().map(value_str).collect();
                (name.as_str().to_string(), values.join(", "))
            })
            .collect()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.map
    }

    pub fn into_map(self) -> HeaderMap {
        self.map
    }
}

fn parse_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HeaderError> {
    let name = name.trim();
    let header_name = HeaderName::try_from(name).map_err(|source| HeaderError::Name {
        name: name.to_string(),
        source,
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|source| HeaderError::Value {
        name: name.to_string(),
        source,
    })?;
    Ok((header_name, header_value))
}

/// Values enter through `&str`, so they are UTF-8 unless the map came from
/// elsewhere; those read as empty.
fn value_str(value: &HeaderValue) -> &str {
    std::str::from_utf8(value.as_bytes()).unwrap_or_default()
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Self { map }
    }
}

impl TryFrom<&PlainHeaders> for Headers {
    type Error = HeaderError;

    fn try_from(plain: &PlainHeaders) -> Result<Self, Self::Error> {
        Self::from_pairs(plain)
    }
}
