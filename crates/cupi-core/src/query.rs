//! URL construction for list calls and created-object id parsing
//!
//! List URLs look like
//! `{base}{collection}?query=(Field is Value)&sort=(Field asc)&pageNumber=1&rowsPerPage=20`.
//! Clause values are percent-encoded after the first `=`; paging always
//! comes last.

use std::fmt;

use crate::config::VMREST_PREFIX;

/// Page size used when neither the caller, the resource nor the config picks one
pub const DEFAULT_ROWS_PER_PAGE: u32 = 100;

/// Comparison operators understood by the `query=` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Is,
    StartsWith,
    IsNull,
    IsNotNull,
}

impl QueryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperator::Is => "is",
            QueryOperator::StartsWith => "startswith",
            QueryOperator::IsNull => "isnull",
            QueryOperator::IsNotNull => "isnotnull",
        }
    }
}

/// Sort direction for the `sort=` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One filter/sort clause in raw `key=value` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClause(String);

impl QueryClause {
    /// `query=(Field op Value)`
    pub fn filter(field: &str, op: QueryOperator, value: &str) -> Self {
        match op {
            QueryOperator::IsNull | QueryOperator::IsNotNull => {
                Self(format!("query=({} {})", field, op.as_str()))
            }
            _ => Self(format!("query=({} {} {})", field, op.as_str(), value)),
        }
    }

    /// `sort=(Field asc|desc)`
    pub fn sort(field: &str, order: SortOrder) -> Self {
        Self(format!("sort=({} {})", field, order.as_str()))
    }

    /// Any other clause, passed through as written (e.g. `templateObjectId=...`)
    pub fn raw(clause: impl Into<String>) -> Self {
        Self(clause.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The clause with its value percent-encoded
    pub fn encoded(&self) -> String {
        match self.0.split_once('=') {
            Some((key, value)) => format!("{}={}", key, urlencoding::encode(value)),
            None => urlencoding::encode(&self.0).into_owned(),
        }
    }
}

impl fmt::Display for QueryClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filters, sorting and paging for a list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number
    pub page_number: u32,
    /// Page size; `None` defers to the resource/config default
    pub rows_per_page: Option<u32>,
    clauses: Vec<QueryClause>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListQuery {
    /// First page, default size, no clauses
    pub fn new() -> Self {
        Self {
            page_number: 1,
            rows_per_page: None,
            clauses: Vec::new(),
        }
    }

    pub fn page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn rows(mut self, rows_per_page: u32) -> Self {
        self.rows_per_page = Some(rows_per_page);
        self
    }

    pub fn filter(mut self, field: &str, op: QueryOperator, value: &str) -> Self {
        self.clauses.push(QueryClause::filter(field, op, value));
        self
    }

    /// Shorthand for `filter(field, QueryOperator::Is, value)`
    pub fn where_is(self, field: &str, value: &str) -> Self {
        self.filter(field, QueryOperator::Is, value)
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.clauses.push(QueryClause::sort(field, order));
        self
    }

    pub fn clause(mut self, clause: QueryClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[QueryClause] {
        &self.clauses
    }

    /// Build the full list URL. `default_rows` applies when the query has no
    /// page size of its own.
    pub fn to_url(&self, base_url: &str, collection: &str, default_rows: u32) -> String {
        let mut params: Vec<String> = self.clauses.iter().map(QueryClause::encoded).collect();
        params.push(format!("pageNumber={}", self.page_number.max(1)));
        params.push(format!(
            "rowsPerPage={}",
            self.rows_per_page.unwrap_or(default_rows).max(1)
        ));
        append_params(&format!("{}{}", base_url, collection), &params)
    }
}

/// Append `params` to `url` with `?` or `&` as appropriate
pub fn append_params(url: &str, params: &[String]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, params.join("&"))
}

/// Parse the new object's id out of a create response.
///
/// The server answers a POST with the path of the new object, e.g.
/// `/vmrest/handlers/callhandlers/<id>`. The known prefix is stripped; if the
/// body does not start with it, the last path segment is used.
pub fn extract_object_id(response_text: &str, collection: &str) -> String {
    let text = response_text.trim();
    let prefix = format!("{}{}/", VMREST_PREFIX, collection.trim_matches('/'));
    if let Some(id) = text.strip_prefix(&prefix) {
        return id.trim().to_string();
    }
    text.rsplit('/').next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cuc:8443/vmrest/";

    #[test]
    fn test_default_paging_only() {
        let url = ListQuery::new().to_url(BASE, "handlers/callhandlers", 20);
        assert_eq!(
            url,
            "https://cuc:8443/vmrest/handlers/callhandlers?pageNumber=1&rowsPerPage=20"
        );
    }

    #[test]
    fn test_clauses_are_encoded_before_paging() {
        let url = ListQuery::new()
            .where_is("DisplayName", "Sales")
            .sort("DisplayName", SortOrder::Desc)
            .page(2)
            .rows(5)
            .to_url(BASE, "tenants", 100);
        assert_eq!(
            url,
            "https://cuc:8443/vmrest/tenants?query=%28DisplayName%20is%20Sales%29\
             &sort=%28DisplayName%20desc%29&pageNumber=2&rowsPerPage=5"
        );
    }

    #[test]
    fn test_null_operators_have_no_value() {
        let clause = QueryClause::filter("Extension", QueryOperator::IsNull, "ignored");
        assert_eq!(clause.as_str(), "query=(Extension isnull)");
    }

    #[test]
    fn test_append_params_existing_query() {
        let url = append_params(
            "https://cuc/vmrest/handlers/callhandlers?templateObjectId=abc",
            &["x=1".to_string()],
        );
        assert_eq!(url, "https://cuc/vmrest/handlers/callhandlers?templateObjectId=abc&x=1");
        assert_eq!(append_params("https://cuc", &[]), "https://cuc");
    }

    #[test]
    fn test_extract_object_id() {
        let guid = "5fa3C9b2-1d2e-4f00-9abc-0123456789AB";
        let body = format!("/vmrest/handlers/callhandlers/{}", guid);
        assert_eq!(extract_object_id(&body, "handlers/callhandlers"), guid);

        let with_whitespace = format!("/vmrest/tenants/{}\r\n", guid);
        assert_eq!(extract_object_id(&with_whitespace, "tenants"), guid);

        let unexpected = format!("/vmrest/other/{}", guid);
        assert_eq!(extract_object_id(&unexpected, "tenants"), guid);
    }
}
