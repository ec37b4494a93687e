//! Result records assembled from one table row.

use std::collections::BTreeMap;
use std::fmt;

/// Field names understood by the search framework's output printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Link,
    Name,
    Size,
    Seeds,
    Leech,
    DescLink,
    EngineUrl,
}

impl Field {
    /// All fields, in output-line order.
    pub const ALL: [Self; 7] = [
        Self::Link,
        Self::Name,
        Self::Size,
        Self::Seeds,
        Self::Leech,
        Self::EngineUrl,
        Self::DescLink,
    ];

    /// Returns the key the framework uses for this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Name => "name",
            Self::Size => "size",
            Self::Seeds => "seeds",
            Self::Leech => "leech",
            Self::DescLink => "desc_link",
            Self::EngineUrl => "engine_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search hit. Fields the page did not provide are absent, not empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRecord {
    fields: BTreeMap<Field, String>,
}

impl ResultRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field; a second write replaces the first.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Returns a field value if present.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Returns `true` when no field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of populated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates populated fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Absolute download URL of the torrent file.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.get(Field::Link)
    }

    /// Torrent title.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(Field::Name)
    }

    /// Size as shown on the page, e.g. `1024.5 MB`.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.get(Field::Size)
    }

    /// Seeder count.
    #[must_use]
    pub fn seeds(&self) -> Option<&str> {
        self.get(Field::Seeds)
    }

    /// Leecher count.
    #[must_use]
    pub fn leech(&self) -> Option<&str> {
        self.get(Field::Leech)
    }

    /// Absolute URL of the torrent's details page.
    #[must_use]
    pub fn desc_link(&self) -> Option<&str> {
        self.get(Field::DescLink)
    }

    /// Site the record came from, without a trailing slash.
    #[must_use]
    pub fn engine_url(&self) -> Option<&str> {
        self.get(Field::EngineUrl)
    }
}
