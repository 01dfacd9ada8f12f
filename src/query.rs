use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Hard per-page maximum accepted by the list endpoints. Larger requested
/// limits are ignored rather than sent.
pub const MAX_QUERY_LIMIT: u32 = 50;

/// Query parameters accepted by the Get Users and Get Roles endpoints.
/// See https://developers.onelogin.com/api-docs/1/getting-started/using-query-parameters
///
/// ```
/// use onelogin::QueryOptions;
///
/// let opts = QueryOptions::new()
///     .fields(&["id", "email"])
///     .filter("email", "*@onelogin.com")
///     .sort("email", true)
///     .limit(30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    fields: Vec<String>,
    search: BTreeMap<String, String>,
    limit: Option<u32>,
    sort: Option<String>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the fields returned for each resource.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Set the page size. Values above [`MAX_QUERY_LIMIT`] are ignored.
    pub fn limit(mut self, limit: u32) -> Self {
        if limit <= MAX_QUERY_LIMIT {
            self.limit = Some(limit);
        }
        self
    }

    /// Add a per-field search filter. Values support wildcards:
    /// `email=*@onelogin.com` matches any email on that domain.
    pub fn filter(mut self, field: &str, value: &str) -> Self {
        self.search.insert(field.to_string(), value.to_string());
        self
    }

    /// Sort on a field. The ascending/descending `+`/`-` prefix is added
    /// here; pass the bare field name.
    pub fn sort(mut self, field: &str, ascending: bool) -> Self {
        let prefix = if ascending { '+' } else { '-' };
        self.sort = Some(format!("{}{}", prefix, field));
        self
    }

    /// Only resources created at or after this instant.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Only resources created at or before this instant.
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Translate the options into query-string key/value pairs.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.fields.is_empty() {
            params.push(("fields".to_string(), self.fields.join(",")));
        }
        for (field, value) in &self.search {
            params.push((field.clone(), value.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        if let Some(since) = self.since {
            params.push((
                "since".to_string(),
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(until) = self.until {
            params.push((
                "until".to_string(),
                until.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }

        params
    }
}
