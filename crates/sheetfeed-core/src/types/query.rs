//! Structured list feed queries.

use serde::{Deserialize, Serialize};

/// A service-side query on the list feed.
///
/// `sq` is a structured query of the form `[column][operator][value]` where
/// the operators are `()`, `=`/`==`, `<>`/`!=`, `and`/`&&` and `or`/`||`.
/// `order_by` is either `position` (the default) or `column:<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Structured query
    pub sq: Option<String>,
    /// Ordering
    pub order_by: Option<String>,
    /// Descending order when true
    pub reverse: bool,
}

impl ListQuery {
    /// Builds a query from optional parts.
    ///
    /// Returns `None` when no part is set: an empty query is no query.
    /// Empty strings count as unset.
    pub fn from_parts(sq: Option<&str>, order_by: Option<&str>, reverse: bool) -> Option<Self> {
        let sq = sq.filter(|s| !s.is_empty()).map(str::to_string);
        let order_by = order_by.filter(|s| !s.is_empty()).map(str::to_string);
        if sq.is_none() && order_by.is_none() && !reverse {
            return None;
        }
        Some(Self {
            sq,
            order_by,
            reverse,
        })
    }

    /// URL query parameters for this query.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(sq) = &self.sq {
            params.push(("sq", sq.clone()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("orderby", order_by.clone()));
        }
        if self.reverse {
            params.push(("reverse", "true".to_string()));
        }
        params
    }
}

/// Caller-facing row query used by [`Worksheet::get_rows`](crate::Worksheet::get_rows).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    /// Structured query, see [`ListQuery`]
    pub query: Option<String>,
    /// Ordering, see [`ListQuery`]
    pub order_by: Option<String>,
    /// Descending order
    pub reverse: bool,
}

impl RowQuery {
    /// An empty query: every row in sheet order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Sets the structured query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the ordering.
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Sets descending order.
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// The list query this resolves to.
    pub fn to_list_query(&self) -> Option<ListQuery> {
        ListQuery::from_parts(self.query.as_deref(), self.order_by.as_deref(), self.reverse)
    }
}
