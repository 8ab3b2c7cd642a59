//! The attribute column of a feature line.

use std::str::FromStr;

use serde::ser::SerializeMap as _;
use serde::Serialize;
use serde::Serializer;

/// The delimiter between attribute pairs.
pub const PAIR_DELIMITER: char = ';';

/// The separator between the key and the value of a pair.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// The value of an attribute column that carries no attributes.
pub const EMPTY: &str = ".";

/// The (lowercased) key of the id attribute.
pub const ID_KEY: &str = "id";

/// The (lowercased) key of the parent attribute.
pub const PARENT_KEY: &str = "parent";

/// An error related to the parsing of [`Attributes`].
#[derive(Debug)]
pub enum ParseError {
    /// A pair did not split into exactly one key and one value.
    MalformedPair(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedPair(pair) => write!(
                f,
                "malformed attribute pair: expected exactly one `{KEY_VALUE_SEPARATOR}`, found \
                 \"{pair}\""
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// The attributes of a feature.
///
/// Keys are lowercased when they are inserted; values are kept verbatim.
/// Inserting an existing key replaces its value in place, so the pairs keep
/// the order in which their keys were first seen.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Inserts a pair, lowercasing the key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        let value = value.into();

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    /// Gets the value for `key`, compared case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use genegroup::record::Attributes;
    ///
    /// let attributes = "ID=gene-A;Name=BRCA2".parse::<Attributes>()?;
    /// assert_eq!(attributes.get("name"), Some("BRCA2"));
    /// assert_eq!(attributes.get("NAME"), Some("BRCA2"));
    /// assert_eq!(attributes.get("note"), None);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets the value of the `ID` attribute.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_KEY)
    }

    /// Gets the value of the `Parent` attribute.
    pub fn parent(&self) -> Option<&str> {
        self.get(PARENT_KEY)
    }

    /// Returns an iterator over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Gets the number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Attributes {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut attributes = Attributes::default();

        if s == EMPTY {
            return Ok(attributes);
        }

        // A single trailing delimiter is tolerated. Any other empty pair is
        // malformed.
        let pairs = s.strip_suffix(PAIR_DELIMITER).unwrap_or(s);

        for pair in pairs.split(PAIR_DELIMITER) {
            let mut parts = pair.split(KEY_VALUE_SEPARATOR);

            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => attributes.insert(key, value),
                _ => return Err(ParseError::MalformedPair(pair.into())),
            }
        }

        Ok(attributes)
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{EMPTY}");
        }

        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PAIR_DELIMITER}")?;
            }

            write!(f, "{key}{KEY_VALUE_SEPARATOR}{value}")?;
        }

        Ok(())
    }
}

impl Serialize for Attributes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_and_parent() -> Result<(), Box<dyn std::error::Error>> {
        let attributes = "ID=foo;Parent=bar".parse::<Attributes>()?;
        assert_eq!(attributes.id(), Some("foo"));
        assert_eq!(attributes.parent(), Some("bar"));

        let attributes = "ID=foo".parse::<Attributes>()?;
        assert_eq!(attributes.id(), Some("foo"));
        assert_eq!(attributes.parent(), None);

        Ok(())
    }

    #[test]
    fn keys_are_lowercased_and_values_kept() -> Result<(), Box<dyn std::error::Error>> {
        let attributes = "ID=Gene-A;Name=BRCA2;DBXREF=GeneID:675".parse::<Attributes>()?;

        let pairs = attributes.iter().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![("id", "Gene-A"), ("name", "BRCA2"), ("dbxref", "GeneID:675")]
        );

        Ok(())
    }

    #[test]
    fn repeated_keys_replace_in_place() -> Result<(), Box<dyn std::error::Error>> {
        let attributes = "Name=a;ID=x;name=b".parse::<Attributes>()?;
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.to_string(), "name=b;id=x");
        Ok(())
    }

    #[test]
    fn empty_columns_and_trailing_delimiters() -> Result<(), Box<dyn std::error::Error>> {
        assert!(".".parse::<Attributes>()?.is_empty());

        assert_eq!(Attributes::default().to_string(), ".");

        let attributes = "ID=foo;".parse::<Attributes>()?;
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.id(), Some("foo"));

        Ok(())
    }

    #[test]
    fn pairs_need_exactly_one_separator() {
        let err = "ID=foo;Note".parse::<Attributes>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed attribute pair: expected exactly one `=`, found \"Note\""
        );

        for column in ["ID=a;;Name=b", "ID=a;;", ";", ""] {
            let err = column.parse::<Attributes>().unwrap_err();
            assert!(matches!(err, ParseError::MalformedPair(pair) if pair.is_empty()));
        }

        let err = "ID=foo=bar".parse::<Attributes>().unwrap_err();
        assert!(matches!(err, ParseError::MalformedPair(pair) if pair == "ID=foo=bar"));
    }

    #[test]
    fn display() -> Result<(), Box<dyn std::error::Error>> {
        let attributes = "ID=cds-B1;Parent=rna-B".parse::<Attributes>()?;
        assert_eq!(attributes.to_string(), "id=cds-B1;parent=rna-B");
        Ok(())
    }
}
