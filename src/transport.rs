use crate::error::Result;
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;

/// Request headers as key/value pairs.
pub type Headers = Vec<(&'static str, String)>;

/// Build the header set common to every API call.
pub fn api_headers(authorization: String) -> Headers {
    vec![
        ("Authorization", authorization),
        ("Content-Type", "application/json".to_string()),
    ]
}

/// Executes one HTTP exchange and hands back the decoded JSON body.
///
/// The OneLogin API reports failures through the `{status: {error, ...}}`
/// envelope rather than the HTTP status code, so implementations must not
/// treat a non-2xx status as an error by themselves.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<Value>,
    ) -> Result<Value>;
}

/// Blocking HTTP transport backed by a reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send()?;
        tracing::debug!("HTTP status: {}", response.status());

        let text = response.text()?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(value)
    }
}

/// Append query parameters to a URL, percent-encoding keys and values.
pub fn with_query(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let mut out = String::from(url);
    for (i, (key, value)) in params.iter().enumerate() {
        out.push(if i == 0 && !url.contains('?') { '?' } else { '&' });
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_empty() {
        assert_eq!(with_query("https://x/y", &[]), "https://x/y");
    }

    #[test]
    fn test_with_query_appends_and_encodes() {
        let params = vec![
            ("limit".to_string(), "30".to_string()),
            ("email".to_string(), "*@onelogin.com".to_string()),
        ];
        assert_eq!(
            with_query("https://x/y", &params),
            "https://x/y?limit=30&email=%2A%40onelogin.com"
        );
    }

    #[test]
    fn test_with_query_extends_existing_query() {
        let params = vec![("after_cursor".to_string(), "abc".to_string())];
        assert_eq!(
            with_query("https://x/y?limit=30", &params),
            "https://x/y?limit=30&after_cursor=abc"
        );
    }

    #[test]
    fn test_api_headers() {
        let headers = api_headers("bearer:tok".to_string());
        assert_eq!(headers[0], ("Authorization", "bearer:tok".to_string()));
        assert_eq!(headers[1], ("Content-Type", "application/json".to_string()));
    }
}
