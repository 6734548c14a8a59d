//! Naming convention conversion for generated file and column names.
//!
//! | Input | Output |
//! |-------|--------|
//! | `AppVersionDomain` | `app_version_domain` |
//! | `OrderID` | `order_id` |
//! | `SMS` | `sms` |

use crate::config::DEFAULT_INITIALISMS;

/// Converts capitalized-word identifiers to snake case, keeping known
/// initialisms together as one word.
#[derive(Debug, Clone)]
pub struct NameTransformer {
    initialisms: Vec<String>,
}

impl Default for NameTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_INITIALISMS.iter().map(|s| s.to_string()).collect())
    }
}

impl NameTransformer {
    pub fn new(initialisms: Vec<String>) -> Self {
        Self { initialisms }
    }

    /// Convert `AppVersionDomain` to `app_version_domain`.
    ///
    /// Each initialism found in the input is first collapsed to a single
    /// capitalized word (`ID` -> `Id`), then an underscore is emitted before
    /// every uppercase character except the first.
    ///
    /// # Examples
    ///
    /// ```
    /// use gcg::naming::NameTransformer;
    ///
    /// let names = NameTransformer::default();
    /// assert_eq!(names.to_snake("OrderID"), "order_id");
    /// assert_eq!(names.to_snake("DownloadURL"), "download_url");
    /// ```
    pub fn to_snake(&self, ident: &str) -> String {
        let mut collapsed = ident.to_string();
        for initialism in &self.initialisms {
            if collapsed.contains(initialism.as_str()) {
                collapsed = collapsed.replace(initialism.as_str(), &collapse(initialism));
            }
        }

        let mut result = String::with_capacity(collapsed.len() + 4);
        for (i, c) in collapsed.chars().enumerate() {
            if c.is_uppercase() {
                if i > 0 {
                    result.push('_');
                }
                result.extend(c.to_lowercase());
            } else {
                result.push(c);
            }
        }
        result
    }
}

/// `HTTP` -> `Http`
fn collapse(initialism: &str) -> String {
    let mut chars = initialism.chars();
    match chars.next() {
        Some(first) => std::iter::once(first).chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
