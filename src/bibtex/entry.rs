//! BibTeX entry data structures

/// A single BibTeX field (name-value pair)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A parsed BibTeX entry
///
/// Fields keep the order and spelling they had in the source file. Lookups
/// ignore case, as BibTeX does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry type as written, lowercased (`article`, `inproceedings`, ...)
    pub entry_type: String,
    /// Citation key
    pub key: String,
    fields: Vec<Field>,
}

impl Entry {
    /// Create a new entry without fields
    pub fn new(entry_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// All fields in source order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get a field value by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].value.as_str())
    }

    /// Set a field, overwriting an existing value in place or appending a new field
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(i) => self.fields[i].value = value,
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Get the DOI field, trimmed; blank values count as missing
    pub fn doi(&self) -> Option<&str> {
        self.get("doi").map(str::trim).filter(|doi| !doi.is_empty())
    }

    pub fn pmcid(&self) -> Option<&str> {
        self.get("pmcid")
    }

    pub fn pmid(&self) -> Option<&str> {
        self.get("pmid")
    }

    pub fn month(&self) -> Option<&str> {
        self.get("month")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_field_access_is_case_insensitive() {
        let mut entry = Entry::new("Article", "Smith2024");
        entry.set("DOI", "10.1000/xyz");
        entry.set("Title", "A Great Paper");

        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.doi(), Some("10.1000/xyz"));
        assert_eq!(entry.get("title"), Some("A Great Paper"));
        assert_eq!(entry.pmid(), None);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut entry = Entry::new("article", "key");
        entry.set("pmid", "1");
        entry.set("title", "T");
        entry.set("PMID", "2");

        assert_eq!(entry.fields().len(), 2);
        assert_eq!(entry.fields()[0].name, "pmid");
        assert_eq!(entry.fields()[0].value, "2");
    }

    #[test]
    fn test_blank_doi_is_missing() {
        let mut entry = Entry::new("misc", "key");
        entry.set("doi", "   ");
        assert_eq!(entry.doi(), None);
    }
}
