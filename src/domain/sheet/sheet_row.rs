// ============================================================
// SHEET ROW
// ============================================================
// One data row of a named range, keyed by the range's header row

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single data row keyed by header name.
///
/// Field order follows the header row. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    fields: Vec<(String, String)>,
}

impl SheetRow {
    /// Build a row from a header row and a (possibly short) value row.
    ///
    /// Missing trailing cells become empty strings; cells past the header
    /// width are dropped.
    pub fn from_cells(headers: &[String], cells: &[String]) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = cells.get(i).cloned().unwrap_or_default();
                (header.clone(), value)
            })
            .collect();

        Self { fields }
    }

    /// Value for `key`, or `""` when the header is absent.
    ///
    /// Duplicate headers resolve to the right-most column.
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
impl SheetRow {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SheetRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Convert raw range values into keyed rows. The first row is the header.
pub fn rows_from_values(values: &[Vec<String>]) -> Vec<SheetRow> {
    let Some((headers, body)) = values.split_first() else {
        return Vec::new();
    };

    body.iter()
        .map(|cells| SheetRow::from_cells(headers, cells))
        .collect()
}
