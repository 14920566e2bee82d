//! Access to the Keycloak admin API.
//!
//! The [`AdminClient`] trait is the seam between the setup workflow and the identity provider.
//! [`client::KeycloakAdminClient`] talks to a real server, [`mock::KeycloakAdminMock`] keeps
//! everything in memory.

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod reqwest;

use async_trait::async_trait;
use keycloak::types::{CredentialRepresentation, RealmRepresentation, UserRepresentation};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

pub use error::Error;

/// The realm every admin session starts out in.
pub const MASTER_REALM: &str = "master";

/// The client used for acquiring admin tokens.
pub const ADMIN_CLIENT_ID: &str = "admin-cli";

/// A client registration, as the provider represents it.
///
/// Kept as a raw JSON object, so that fields we don't know about survive updates and exports.
pub type ClientRecord = Map<String, Value>;

/// A resolved realm, including its key material.
#[derive(Clone, Debug)]
pub struct Realm {
    pub name: String,
    pub representation: RealmRepresentation,
    pub keys: Value,
}

#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Acquire a token for the admin user, using a password grant.
    async fn authenticate(&mut self) -> Result<(), Error>;

    /// The realm that realm scoped calls are sent to.
    fn realm(&self) -> &str;

    /// Switch the realm that realm scoped calls are sent to.
    fn set_realm(&mut self, realm: &str);

    async fn realm_get(&self, realm: &str) -> Result<RealmRepresentation, Error>;
    async fn realm_keys_get(&self, realm: &str) -> Result<Value, Error>;

    async fn clients_get(&self) -> Result<Vec<ClientRecord>, Error>;
    async fn client_create(&self, client: &ClientRecord) -> Result<(), Error>;
    async fn client_update(&self, id: &str, client: &ClientRecord) -> Result<(), Error>;

    /// Find users by username.
    ///
    /// The provider may return partial matches, callers need to compare the names themselves.
    async fn users_get(&self, username: &str) -> Result<Vec<UserRepresentation>, Error>;
    /// Create a user, returning its ID if the provider reported it.
    async fn user_create(&self, user: &UserRepresentation) -> Result<Option<String>, Error>;
    async fn user_delete(&self, id: &str) -> Result<(), Error>;
    async fn user_reset_password(
        &self,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), Error>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeycloakAdminClientConfig {
    /// Base URL of the server, including any context path (like `/auth`).
    pub url: Url,

    pub admin_username: String,
    pub admin_password: String,

    #[serde(default)]
    pub tls_insecure: bool,

    #[serde(default)]
    pub tls_ca_certificates: config::CommaSeparatedVec,
}

/// Get the `clientId` of a client record.
pub fn client_id(client: &ClientRecord) -> Option<&str> {
    client.get("clientId").and_then(Value::as_str)
}

/// Get the provider assigned `id` of a client record.
pub fn client_internal_id(client: &ClientRecord) -> Option<&str> {
    client.get("id").and_then(Value::as_str)
}
