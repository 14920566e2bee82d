use crate::{
    client_id, client_internal_id, error::Error, AdminClient, ClientRecord, MASTER_REALM,
};
use async_trait::async_trait;
use keycloak::types::{CredentialRepresentation, RealmRepresentation, UserRepresentation};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Clone, Debug, Default)]
pub struct MockRealm {
    pub representation: RealmRepresentation,
    pub keys: Value,
    pub clients: Vec<ClientRecord>,
    pub users: Vec<MockUser>,
}

#[derive(Clone, Debug)]
pub struct MockUser {
    pub representation: UserRepresentation,
    pub password: Option<String>,
}

impl MockUser {
    pub fn id(&self) -> Option<&str> {
        self.representation.id.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.representation.username.as_deref()
    }
}

#[derive(Debug, Default)]
struct MockState {
    realms: HashMap<String, MockRealm>,
    /// Number of authentication attempts which will still fail.
    auth_failures: u32,
    auth_attempts: u32,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("00000000-0000-0000-0000-{:012x}", self.next_id)
    }

    fn realm_mut(&mut self, realm: &str) -> Result<&mut MockRealm, Error> {
        self.realms
            .get_mut(realm)
            .ok_or_else(|| Error::NotFound(format!("Realm '{realm}'")))
    }
}

/// An in-memory stand-in for the admin API.
///
/// Clones share the same state, so a test can keep a handle for inspecting the outcome.
#[derive(Clone, Debug)]
pub struct KeycloakAdminMock {
    state: Arc<Mutex<MockState>>,
    realm: String,
    authenticated: bool,
}

impl Default for KeycloakAdminMock {
    fn default() -> Self {
        Self::new()
    }
}

impl KeycloakAdminMock {
    pub fn new() -> Self {
        Self {
            state: Default::default(),
            realm: MASTER_REALM.into(),
            authenticated: false,
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>, Error> {
        self.state
            .lock()
            .map_err(|err| Error::Internal(format!("Mock state poisoned: {err}")))
    }

    fn ensure_authenticated(&self) -> Result<(), Error> {
        match self.authenticated {
            true => Ok(()),
            false => Err(Error::NotAuthorized),
        }
    }

    /// Add an empty realm, with a single RSA signing key.
    pub fn with_realm(self, name: &str) -> Self {
        if let Ok(mut state) = self.state() {
            let realm = MockRealm {
                representation: RealmRepresentation {
                    id: Some(name.into()),
                    realm: Some(name.into()),
                    enabled: Some(true),
                    ..Default::default()
                },
                keys: json!({
                    "active": { "RS256": format!("{name}-kid") },
                    "keys": [{
                        "kid": format!("{name}-kid"),
                        "algorithm": "RS256",
                        "type": "RSA",
                        "use": "SIG",
                    }],
                }),
                ..Default::default()
            };
            state.realms.insert(name.into(), realm);
        }
        self
    }

    /// Add a client to an existing realm, assigning an ID if it has none.
    pub fn with_client(self, realm: &str, mut client: ClientRecord) -> Self {
        if let Ok(mut state) = self.state() {
            if !client.contains_key("id") {
                let id = state.next_id();
                client.insert("id".into(), id.into());
            }
            if let Ok(realm) = state.realm_mut(realm) {
                realm.clients.push(client);
            }
        }
        self
    }

    /// Add a user to an existing realm.
    pub fn with_user(self, realm: &str, username: &str, password: &str) -> Self {
        if let Ok(mut state) = self.state() {
            let id = state.next_id();
            if let Ok(realm) = state.realm_mut(realm) {
                realm.users.push(MockUser {
                    representation: UserRepresentation {
                        id: Some(id),
                        username: Some(username.into()),
                        enabled: Some(true),
                        ..Default::default()
                    },
                    password: Some(password.into()),
                });
            }
        }
        self
    }

    /// Let the next `count` authentication attempts fail.
    pub fn fail_authentication(self, count: u32) -> Self {
        if let Ok(mut state) = self.state() {
            state.auth_failures = count;
        }
        self
    }

    pub fn auth_attempts(&self) -> u32 {
        self.state().map(|state| state.auth_attempts).unwrap_or_default()
    }

    pub fn clients(&self, realm: &str) -> Vec<ClientRecord> {
        self.state()
            .ok()
            .and_then(|state| state.realms.get(realm).map(|r| r.clients.clone()))
            .unwrap_or_default()
    }

    pub fn users(&self, realm: &str) -> Vec<MockUser> {
        self.state()
            .ok()
            .and_then(|state| state.realms.get(realm).map(|r| r.users.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl AdminClient for KeycloakAdminMock {
    async fn authenticate(&mut self) -> Result<(), Error> {
        let mut state = self.state()?;
        state.auth_attempts += 1;
        if state.auth_failures > 0 {
            state.auth_failures -= 1;
            return Err(Error::Http {
                status: 503,
                text: format!("Unavailable (attempt {})", state.auth_attempts),
            });
        }
        drop(state);

        self.authenticated = true;
        Ok(())
    }

    fn realm(&self) -> &str {
        &self.realm
    }

    fn set_realm(&mut self, realm: &str) {
        self.realm = realm.into();
    }

    async fn realm_get(&self, realm: &str) -> Result<RealmRepresentation, Error> {
        self.ensure_authenticated()?;
        Ok(self.state()?.realm_mut(realm)?.representation.clone())
    }

    async fn realm_keys_get(&self, realm: &str) -> Result<Value, Error> {
        self.ensure_authenticated()?;
        Ok(self.state()?.realm_mut(realm)?.keys.clone())
    }

    async fn clients_get(&self) -> Result<Vec<ClientRecord>, Error> {
        self.ensure_authenticated()?;
        Ok(self.state()?.realm_mut(&self.realm)?.clients.clone())
    }

    async fn client_create(&self, client: &ClientRecord) -> Result<(), Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let id = state.next_id();
        let realm = state.realm_mut(&self.realm)?;

        if realm
            .clients
            .iter()
            .any(|c| client_id(c).is_some() && client_id(c) == client_id(client))
        {
            return Err(Error::Http {
                status: 409,
                text: "Client already exists".into(),
            });
        }

        let mut client = client.clone();
        client.insert("id".into(), id.clone().into());
        client
            .entry("secret")
            .or_insert_with(|| format!("secret-{id}").into());
        realm.clients.push(client);

        Ok(())
    }

    async fn client_update(&self, id: &str, client: &ClientRecord) -> Result<(), Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let realm = state.realm_mut(&self.realm)?;

        let existing = realm
            .clients
            .iter_mut()
            .find(|c| client_internal_id(c) == Some(id))
            .ok_or_else(|| Error::NotFound(format!("Client '{id}'")))?;

        let secret = existing.get("secret").cloned();
        *existing = client.clone();
        existing.insert("id".into(), id.into());
        if let Some(secret) = secret {
            existing.entry("secret").or_insert(secret);
        }

        Ok(())
    }

    async fn users_get(&self, username: &str) -> Result<Vec<UserRepresentation>, Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let realm = state.realm_mut(&self.realm)?;

        // like the real thing, this also reports partial matches
        Ok(realm
            .users
            .iter()
            .filter(|user| {
                user.username()
                    .map(|name| name.contains(username))
                    .unwrap_or_default()
            })
            .map(|user| user.representation.clone())
            .collect())
    }

    async fn user_create(&self, user: &UserRepresentation) -> Result<Option<String>, Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let id = state.next_id();
        let realm = state.realm_mut(&self.realm)?;

        if realm
            .users
            .iter()
            .any(|u| u.username().is_some() && u.username() == user.username.as_deref())
        {
            return Err(Error::Http {
                status: 409,
                text: "User exists with same username".into(),
            });
        }

        let mut representation = user.clone();
        representation.id = Some(id.clone());
        realm.users.push(MockUser {
            representation,
            password: None,
        });

        Ok(Some(id))
    }

    async fn user_delete(&self, id: &str) -> Result<(), Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let realm = state.realm_mut(&self.realm)?;

        let len = realm.users.len();
        realm.users.retain(|user| user.id() != Some(id));
        match realm.users.len() < len {
            true => Ok(()),
            false => Err(Error::NotFound(format!("User '{id}'"))),
        }
    }

    async fn user_reset_password(
        &self,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), Error> {
        self.ensure_authenticated()?;
        let mut state = self.state()?;
        let realm = state.realm_mut(&self.realm)?;

        let user = realm
            .users
            .iter_mut()
            .find(|user| user.id() == Some(id))
            .ok_or_else(|| Error::NotFound(format!("User '{id}'")))?;

        if credential.temporary == Some(true) {
            user.representation.required_actions = Some(vec!["UPDATE_PASSWORD".into()]);
        }
        user.password = credential.value.clone();

        Ok(())
    }
}
