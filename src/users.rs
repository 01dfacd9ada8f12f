use crate::error::Result;
use crate::models::{Envelope, User};
use crate::query::QueryOptions;
use crate::service::Service;
use crate::transport::with_query;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// See https://developers.onelogin.com/api-docs/1/users/get-users
pub const GET_USERS_URI_PATH: &str = "api/1/users";

/// Partial update for PUT `api/1/users/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub custom_attributes: HashMap<String, String>,
}

/// Cursor state for walking the paginated user list.
///
/// `next` returns `Ok(None)` once the cursor stops changing, so callers
/// can loop until stabilization without treating the end of the list as
/// an error. Cursors are opaque strings; an empty cursor means "no more".
#[derive(Debug, Clone)]
pub struct UserPager {
    url: String,
    sent_cursor: String,
    next_cursor: String,
}

impl UserPager {
    /// The cursor the next page will be requested with, if any.
    pub fn after_cursor(&self) -> Option<&str> {
        if self.next_cursor.is_empty() {
            None
        } else {
            Some(&self.next_cursor)
        }
    }
}

impl Service {
    /// First page of users matching the query options, plus the pager for
    /// the remaining pages.
    pub fn get_users(
        &mut self,
        options: Option<&QueryOptions>,
    ) -> Result<(Vec<User>, UserPager)> {
        self.init_check()?;

        let mut url = self.url(GET_USERS_URI_PATH);
        if let Some(options) = options {
            url = with_query(&url, &options.to_query_params());
        }

        let envelope: Envelope<Vec<User>> = self.api_request(Method::GET, &url, None)?;
        envelope.status.check()?;

        let next_cursor = envelope
            .pagination
            .and_then(|p| p.after_cursor)
            .unwrap_or_default();
        let users = envelope.data.unwrap_or_default();
        tracing::debug!("fetched {} users", users.len());

        Ok((
            users,
            UserPager {
                url,
                sent_cursor: String::new(),
                next_cursor,
            },
        ))
    }

    /// Next page of users. `Ok(None)` when the cursor has not advanced
    /// since the last page; no request is made in that case.
    pub fn next_users(&mut self, pager: &mut UserPager) -> Result<Option<Vec<User>>> {
        self.init_check()?;

        if pager.sent_cursor == pager.next_cursor {
            return Ok(None);
        }

        let cursor = pager.next_cursor.clone();
        let url = with_query(&pager.url, &[("after_cursor".to_string(), cursor.clone())]);

        let envelope: Envelope<Vec<User>> = self.api_request(Method::GET, &url, None)?;
        envelope.status.check()?;

        pager.sent_cursor = cursor;
        pager.next_cursor = envelope
            .pagination
            .and_then(|p| p.after_cursor)
            .unwrap_or_default();

        Ok(Some(envelope.data.unwrap_or_default()))
    }

    /// One user by id, `None` when the service returns an empty data set.
    pub fn get_user_by_id(&mut self, id: i64) -> Result<Option<User>> {
        self.init_check()?;

        let url = self.url(&format!("{}/{}", GET_USERS_URI_PATH, id));
        let envelope: Envelope<Vec<User>> = self.api_request(Method::GET, &url, None)?;
        envelope.status.check()?;
        Ok(envelope.data.unwrap_or_default().into_iter().next())
    }

    /// Apply a partial update to a user; returns the updated resource when
    /// the service echoes it back.
    pub fn update_user_by_id(
        &mut self,
        id: i64,
        update: &UpdateUserRequest,
    ) -> Result<Option<User>> {
        self.init_check()?;

        let url = self.url(&format!("{}/{}", GET_USERS_URI_PATH, id));
        let body = serde_json::to_value(update)?;
        let envelope: Envelope<Vec<User>> = self.api_request(Method::PUT, &url, Some(body))?;
        envelope.status.check()?;
        Ok(envelope.data.unwrap_or_default().into_iter().next())
    }

    /// Set custom attribute values on a user.
    pub fn set_custom_attributes(
        &mut self,
        id: i64,
        attributes: &HashMap<String, String>,
    ) -> Result<()> {
        self.init_check()?;

        let url = self.url(&format!("{}/{}/set_custom_attributes", GET_USERS_URI_PATH, id));
        let body = json!({ "custom_attributes": attributes });
        let envelope: Envelope<Value> = self.api_request(Method::PUT, &url, Some(body))?;
        envelope.status.check()
    }
}
