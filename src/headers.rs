use std::collections::HashMap;

/// Header multimap. Keys are lowercased; each key keeps its values in the
/// order they were added, so repeated lines (e.g. several `Cookie:` lines)
/// can be read back in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    pub fn new() -> Self {
        Headers {
            fields: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let values = self.fields.entry(key).or_default();
        values.push(value.into().trim().into());
    }

    /// Adds a raw `Key: value` line. Returns false if there's no colon.
    pub fn add_line(&mut self, line: &str) -> bool {
        match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.add(key.trim(), value);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Vec<String>> {
        self.fields.get(&key.to_lowercase())
    }

    pub fn get_first(&self, key: &str) -> Option<&String> {
        self.get(key).and_then(|v| v.first())
    }

    pub fn remove(&mut self, key: &str) {
        self.fields.remove(&key.to_lowercase());
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let values = self.fields.entry(key).or_default();
        values.clear();
        values.push(value.into().trim().into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields.iter()
    }

    pub fn serialize(&self) -> String {
        let mut serialized = String::new();
        for (key, values) in self.fields.iter() {
            for value in values {
                serialized.push_str(&format!("{}: {}\r\n", key, value));
            }
        }

        serialized
    }
}
