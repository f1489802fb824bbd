//! OData query-string encoding and key predicates.
//!
//! `$filter` text reaches the server verbatim apart from `%`, `&` and `#`.

use serde::{Deserialize, Serialize};

/// Logical query options for collection requests.
///
/// Every option is independent; unset options are left out of the query
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub select: Option<Vec<String>>,
    pub expand: Option<String>,
    pub orderby: Option<String>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    #[serde(default)]
    pub count: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    pub fn top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// Keep only `$select` and `$expand` (single-record reads)
    pub fn select_expand_only(&self) -> Self {
        Self {
            select: self.select.clone(),
            expand: self.expand.clone(),
            ..Self::default()
        }
    }

    /// Keep only `$filter`, `$select`, `$top` and `$skip` (navigation reads)
    pub fn navigation_only(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            select: self.select.clone(),
            top: self.top,
            skip: self.skip,
            ..Self::default()
        }
    }

    /// Serialize to an OData query string, without the leading `?`.
    ///
    /// Parameters always appear in the order `$filter, $select, $expand,
    /// $orderby, $top, $skip, $count`.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(ref filter) = self.filter {
            params.push(format!("$filter={}", escape_filter(filter)));
        }

        if let Some(ref select) = self.select {
            params.push(format!("$select={}", join_select(select)));
        }

        if let Some(ref expand) = self.expand {
            params.push(format!("$expand={}", urlencoding::encode(expand)));
        }

        if let Some(ref orderby) = self.orderby {
            params.push(format!("$orderby={}", urlencoding::encode(orderby)));
        }

        if let Some(top) = self.top {
            params.push(format!("$top={}", top));
        }

        if let Some(skip) = self.skip {
            params.push(format!("$skip={}", skip));
        }

        if self.count {
            params.push("$count=true".to_string());
        }

        params.join("&")
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Percent-encode `%`, `&` and `#`, in that order, and nothing else
pub fn escape_filter(filter: &str) -> String {
    filter
        .replace('%', "%25")
        .replace('&', "%26")
        .replace('#', "%23")
}

fn join_select(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| f.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a primary key as an OData key predicate body.
///
/// Numeric keys stay bare (`123`); anything else is single-quoted
/// (`'abc-uuid'`). Embedded single quotes are not escaped.
pub fn format_key(key: &str) -> String {
    if is_numeric_key(key) {
        key.to_string()
    } else {
        format!("'{}'", key)
    }
}

fn is_numeric_key(key: &str) -> bool {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return false;
    }
    // f64's parser also accepts "inf" and "NaN", which are not key literals
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return false;
    }
    trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}
