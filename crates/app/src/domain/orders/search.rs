//! Order Search
//!
//! Free text expands into an exact searchable id match or a case-insensitive substring match
//! on the customer's name, phone and address and on the store names of the order's vendors.

/// Bound parameters for the order search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// `ILIKE` pattern with wildcards in the search text escaped.
    pub pattern: String,

    /// The search text as a searchable id, or `0` when it is not an integer.
    pub searchable_order_id: i64,
}

impl SearchFilter {
    /// Build the filter for `text`. Blank text means no filter.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        Some(Self {
            pattern: format!("%{}%", escape_like(text)),
            searchable_order_id: text.parse().unwrap_or(0),
        })
    }
}

/// Escape `LIKE` wildcards so they match literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}
