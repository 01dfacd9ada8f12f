use crate::error::Result;
use crate::models::{Envelope, Role};
use crate::service::Service;
use reqwest::Method;

/// See https://developers.onelogin.com/api-docs/1/roles/get-roles
pub const GET_ROLES_URI_PATH: &str = "api/1/roles";

impl Service {
    /// All roles, fetched from the service. [`Service::get_roles`] layers
    /// the cache on top of this.
    pub fn list_roles(&mut self) -> Result<Vec<Role>> {
        self.init_check()?;

        let url = self.url(GET_ROLES_URI_PATH);
        let envelope: Envelope<Vec<Role>> = self.api_request(Method::GET, &url, None)?;
        envelope.status.check()?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// One role by id, `None` when the service returns an empty data set.
    pub fn get_role_by_id(&mut self, id: i64) -> Result<Option<Role>> {
        self.init_check()?;

        let url = self.url(&format!("{}/{}", GET_ROLES_URI_PATH, id));
        let envelope: Envelope<Vec<Role>> = self.api_request(Method::GET, &url, None)?;
        envelope.status.check()?;
        Ok(envelope.data.unwrap_or_default().into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OneLoginError;
    use crate::models::Credentials;
    use crate::transport::MockTransport;
    use chrono::Utc;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            subdomain: "acme".to_string(),
            shard: "us".to_string(),
        }
    }

    fn expect_token(transport: &mut MockTransport) {
        transport
            .expect_request()
            .withf(|_, url, _, _| url.ends_with("auth/oauth2/v2/token"))
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "access_token": "tok",
                    "created_at": Utc::now().to_rfc3339(),
                    "expires_in": 3600,
                }))
            });
    }

    #[test]
    fn test_list_roles() {
        let mut transport = MockTransport::new();
        expect_token(&mut transport);
        transport
            .expect_request()
            .withf(|_, url, _, _| url == "https://api.us.onelogin.com/api/1/roles")
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "status": {"type": "success", "message": "success", "error": false, "code": 200},
                    "data": [{"id": 1, "name": "admin"}, {"id": 2, "name": "auditor"}],
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));
        let roles = service.list_roles().unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].name, "admin");
    }

    #[test]
    fn test_get_role_by_id_missing() {
        let mut transport = MockTransport::new();
        expect_token(&mut transport);
        transport
            .expect_request()
            .withf(|_, url, _, _| url == "https://api.us.onelogin.com/api/1/roles/404")
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "status": {"type": "success", "message": "success", "error": false, "code": 200},
                    "data": [],
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));
        assert!(service.get_role_by_id(404).unwrap().is_none());
    }

    #[test]
    fn test_list_roles_envelope_error_is_authoritative() {
        let mut transport = MockTransport::new();
        expect_token(&mut transport);
        transport
            .expect_request()
            .withf(|_, url, _, _| url.ends_with("api/1/roles"))
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "status": {"type": "Unauthorized", "message": "token revoked", "error": true, "code": 401},
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));
        let err = service.list_roles().unwrap_err();
        assert!(matches!(err, OneLoginError::Upstream { code: 401, .. }));
    }
}
