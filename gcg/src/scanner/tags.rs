//! Struct tag decoding.

/// A decoded Go struct tag such as `json:"id" gopher:"-"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructTag(pub String);

impl StructTag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value associated with `key`, following the conventional
    /// space-separated `key:"value"` layout.
    ///
    /// Scanning stops at the first malformed pair, like Go's
    /// `StructTag.Lookup`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut rest = self.0.as_str();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            let name_len = rest
                .char_indices()
                .find(|(_, c)| *c <= ' ' || *c == ':' || *c == '"' || *c == '\u{7f}')
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            if name_len == 0 || !rest[name_len..].starts_with(":\"") {
                return None;
            }
            let name = &rest[..name_len];
            rest = &rest[name_len + 1..];

            // Find the closing quote, honoring backslash escapes.
            let bytes = rest.as_bytes();
            let mut i = 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            let quoted = &rest[..=i];
            rest = &rest[i + 1..];

            if name == key {
                return super::parser::unquote(quoted);
            }
        }
    }

    /// Comma-separated options stored under `key`.
    pub fn options(&self, key: &str) -> Vec<String> {
        self.lookup(key)
            .map(|value| value.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default()
    }
}
