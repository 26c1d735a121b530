//! Codec for the blank-line-delimited `KEY::value` record format.

/// One record block from a log file.
///
/// Fields are an ordered sequence of `(key, value)` pairs; keys may repeat
/// (the clock log interleaves `B_IN`/`B_OUT` pairs). The optional label is a
/// bare line with no `::` separator, used by the clock log as its date
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    label: Option<String>,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            fields: Vec::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Append a field. Repeated keys are kept in order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// First value recorded under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All fields in file order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize as a line block terminated by a blank line.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        if let Some(label) = &self.label {
            out.push_str(label);
            out.push('\n');
        }
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push_str("::");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Decode raw log text into records.
///
/// Decoding is lenient: lines without a `::` separator set the record label
/// (last one wins) instead of failing, unknown keys are preserved for the
/// consumer to ignore, and an accumulation with no fields yields no record,
/// so trailing blank lines never produce a phantom entry.
pub fn decode(raw: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
        } else if let Some((key, value)) = line.split_once("::") {
            current.push(key, value);
        } else {
            current.label = Some(line.to_string());
        }
    }
    if !current.is_empty() {
        records.push(current);
    }

    records
}

/// Serialize a string list as a single comma-joined field value.
///
/// Literal backslashes and commas inside items are backslash-escaped so that
/// [`split_list`] is an exact inverse.
pub fn join_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.replace('\\', "\\\\").replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma-joined field value, honoring backslash escapes.
///
/// An empty value yields an empty list; a trailing empty segment is dropped.
pub fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        items.push(current);
    }

    items
}
