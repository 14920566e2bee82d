use crate::{
    error::Error, reqwest::ClientFactory, AdminClient, ClientRecord, KeycloakAdminClientConfig,
    MASTER_REALM,
};
use async_trait::async_trait;
use keycloak::{
    types::{CredentialRepresentation, RealmRepresentation, UserRepresentation},
    KeycloakAdmin, KeycloakAdminToken, KeycloakError, KeycloakTokenSupplier,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

struct Session {
    admin: KeycloakAdmin,
    token: String,
}

#[derive(Clone)]
pub struct KeycloakAdminClient {
    client: reqwest::Client,
    url: Url,
    realm: String,
    admin_username: String,
    admin_password: String,
    session: Option<Arc<Session>>,
}

impl KeycloakAdminClient {
    pub fn new(config: KeycloakAdminClientConfig) -> Result<Self, Error> {
        let mut client = ClientFactory::new();

        if config.tls_insecure {
            client = client.make_insecure();
        }

        client = client.add_ca_certs(config.tls_ca_certificates.0);

        if config.url.cannot_be_a_base() {
            return Err(Error::Internal(format!(
                "Not a valid base URL: {}",
                config.url
            )));
        }

        Ok(Self {
            client: client.build()?,
            url: config.url,
            realm: MASTER_REALM.into(),
            admin_username: config.admin_username,
            admin_password: config.admin_password,
            session: None,
        })
    }

    /// The base URL, in the form the `keycloak` crate appends its paths to.
    fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    fn session(&self) -> Result<&Session, Error> {
        self.session.as_deref().ok_or(Error::NotAuthorized)
    }

    fn admin(&self) -> Result<&KeycloakAdmin, Error> {
        Ok(&self.session()?.admin)
    }

    /// Build the URL of an admin endpoint of the active realm.
    ///
    /// Each segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal(format!("Not a valid base URL: {}", self.url)))?
            .pop_if_empty()
            .extend(["admin", "realms", self.realm.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, Error> {
        let token = &self.session()?.token;
        let url = self.endpoint(segments)?;
        log::debug!("{method} {url}");
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::from_response(response).await)
        }
    }
}

fn authentication_error(err: KeycloakError) -> Error {
    match err {
        // invalid grants are reported as bad request by some versions
        KeycloakError::HttpFailure { status, .. }
            if status == StatusCode::UNAUTHORIZED.as_u16()
                || status == StatusCode::BAD_REQUEST.as_u16() =>
        {
            Error::NotAuthorized
        }
        err => err.into(),
    }
}

fn realm_error(realm: &str, err: KeycloakError) -> Error {
    match err {
        KeycloakError::HttpFailure { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            Error::NotFound(format!("Realm '{realm}'"))
        }
        err => err.into(),
    }
}

#[async_trait]
impl AdminClient for KeycloakAdminClient {
    async fn authenticate(&mut self) -> Result<(), Error> {
        let url = self.base_url().to_string();

        let token = KeycloakAdminToken::acquire(
            &url,
            &self.admin_username,
            &self.admin_password,
            &self.client,
        )
        .await
        .map_err(authentication_error)?;

        let access_token = token.get(&url).await?;
        let admin = KeycloakAdmin::new(&url, token, self.client.clone());

        self.session = Some(Arc::new(Session {
            admin,
            token: access_token,
        }));

        Ok(())
    }

    fn realm(&self) -> &str {
        &self.realm
    }

    fn set_realm(&mut self, realm: &str) {
        self.realm = realm.into();
    }

    async fn realm_get(&self, realm: &str) -> Result<RealmRepresentation, Error> {
        self.admin()?
            .realm_get(realm)
            .await
            .map_err(|err| realm_error(realm, err))
    }

    async fn realm_keys_get(&self, realm: &str) -> Result<Value, Error> {
        let keys = self.admin()?.realm_keys_get(realm).await?;
        Ok(serde_json::to_value(keys)?)
    }

    async fn clients_get(&self) -> Result<Vec<ClientRecord>, Error> {
        Ok(Self::send(self.request(Method::GET, &["clients"])?)
            .await?
            .json()
            .await?)
    }

    async fn client_create(&self, client: &ClientRecord) -> Result<(), Error> {
        Self::send(self.request(Method::POST, &["clients"])?.json(client)).await?;
        Ok(())
    }

    async fn client_update(&self, id: &str, client: &ClientRecord) -> Result<(), Error> {
        Self::send(self.request(Method::PUT, &["clients", id])?.json(client)).await?;
        Ok(())
    }

    async fn users_get(&self, username: &str) -> Result<Vec<UserRepresentation>, Error> {
        Ok(self
            .admin()?
            .realm_users_get(
                &self.realm,
                None,
                None,
                None,
                None,
                Some(true),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                Some(username.to_string()),
            )
            .await?)
    }

    async fn user_create(&self, user: &UserRepresentation) -> Result<Option<String>, Error> {
        self.admin()?
            .realm_users_post(&self.realm, user.clone())
            .await?;
        // the ID is only reported through the location header, callers look the user up
        Ok(None)
    }

    async fn user_delete(&self, id: &str) -> Result<(), Error> {
        self.admin()?
            .realm_users_with_id_delete(&self.realm, id)
            .await?;
        Ok(())
    }

    async fn user_reset_password(
        &self,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), Error> {
        self.admin()?
            .realm_users_with_id_reset_password_put(&self.realm, id, credential.clone())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(url: &str) -> KeycloakAdminClientConfig {
        KeycloakAdminClientConfig {
            url: Url::parse(url).unwrap(),
            admin_username: "admin".into(),
            admin_password: "secret".into(),
            tls_insecure: false,
            tls_ca_certificates: Default::default(),
        }
    }

    fn http_failure(status: u16) -> KeycloakError {
        KeycloakError::HttpFailure {
            status,
            body: None,
            text: String::new(),
        }
    }

    #[test]
    fn test_authentication_error() {
        assert!(authentication_error(http_failure(401)).is_not_authorized());
        assert!(authentication_error(http_failure(400)).is_not_authorized());
        assert_eq!(authentication_error(http_failure(503)).status(), Some(503));
    }

    #[test]
    fn test_realm_error() {
        assert!(matches!(
            realm_error("horizon", http_failure(404)),
            Error::NotFound(what) if what == "Realm 'horizon'"
        ));
        assert!(realm_error("horizon", http_failure(401)).is_not_authorized());
        assert_eq!(realm_error("horizon", http_failure(500)).status(), Some(500));
    }

    #[test]
    fn test_new() {
        let client = KeycloakAdminClient::new(config("http://localhost:8080/auth/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/auth");
        assert_eq!(client.realm(), MASTER_REALM);
    }

    #[test]
    fn test_endpoint() {
        let mut client = KeycloakAdminClient::new(config("http://localhost:8080/auth")).unwrap();
        client.set_realm("horizon");
        assert_eq!(
            client.endpoint(&["clients"]).unwrap().as_str(),
            "http://localhost:8080/auth/admin/realms/horizon/clients"
        );

        // trailing slashes don't produce empty segments
        let mut client = KeycloakAdminClient::new(config("http://localhost:8080/auth/")).unwrap();
        client.set_realm("horizon");
        assert_eq!(
            client.endpoint(&["clients", "1234"]).unwrap().as_str(),
            "http://localhost:8080/auth/admin/realms/horizon/clients/1234"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let mut client = KeycloakAdminClient::new(config("http://localhost:8080")).unwrap();
        client.set_realm("my realm");
        assert_eq!(
            client.endpoint(&["clients", "a/b"]).unwrap().as_str(),
            "http://localhost:8080/admin/realms/my%20realm/clients/a%2Fb"
        );
    }

    #[test]
    fn test_request_requires_session() {
        let client = KeycloakAdminClient::new(config("http://localhost:8080/auth")).unwrap();
        let err = client.request(Method::GET, &["clients"]).err().unwrap();
        assert!(err.is_not_authorized());
        assert!(client.admin().err().unwrap().is_not_authorized());
    }

    #[tokio::test]
    async fn test_calls_require_session() {
        let client = KeycloakAdminClient::new(config("http://localhost:8080/auth")).unwrap();
        assert!(client.realm_get("horizon").await.unwrap_err().is_not_authorized());
        assert!(client.clients_get().await.unwrap_err().is_not_authorized());
        assert!(client.users_get("admin").await.unwrap_err().is_not_authorized());
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            KeycloakAdminClient::new(config("mailto:admin@example.com")),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn test_missing_ca_certificate() {
        let mut config = config("http://localhost:8080/auth");
        config.tls_ca_certificates = vec!["/does/not/exist.pem".to_string()].into();
        assert!(matches!(
            KeycloakAdminClient::new(config),
            Err(Error::Io(_))
        ));
    }
}
