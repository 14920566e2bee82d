use crate::retry::RetryPolicy;
use horizon_admin_client::{config::CommaSeparatedVec, ClientRecord, KeycloakAdminClientConfig};
use anyhow::anyhow;
use serde::Deserialize;
use serde_json::Value;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Path of Gerrit, below the domain.
pub const GERRIT_PATH: &str = "gerrit";

/// Context path of Keycloak, below the platform URL.
pub const KEYCLOAK_PATH: &str = "auth";

mod defaults {
    use std::{path::PathBuf, time::Duration};

    #[inline]
    pub fn realm() -> String {
        "horizon".into()
    }

    #[inline]
    pub fn client_id() -> String {
        "gerrit".into()
    }

    #[inline]
    pub fn first_name() -> String {
        "Gerrit".into()
    }

    #[inline]
    pub fn last_name() -> String {
        "Gerrit".into()
    }

    #[inline]
    pub fn email() -> String {
        "gerrit@gerrit".into()
    }

    #[inline]
    pub fn output_file() -> PathBuf {
        "client-gerrit.json".into()
    }

    #[inline]
    pub fn retry_max_attempts() -> u32 {
        crate::retry::DEFAULT_MAX_ATTEMPTS
    }

    #[inline]
    pub fn retry_interval() -> Duration {
        crate::retry::DEFAULT_INTERVAL
    }
}

/// Settings, as provided by the environment.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub platform_url: Url,
    pub keycloak_username: String,
    pub keycloak_password: String,

    pub domain: Url,

    pub gerrit_admin_username: String,
    pub gerrit_admin_password: String,

    #[serde(default = "defaults::realm")]
    pub keycloak_realm: String,

    #[serde(default = "defaults::client_id")]
    pub gerrit_client_id: String,

    #[serde(default = "defaults::first_name")]
    pub gerrit_admin_first_name: String,
    #[serde(default = "defaults::last_name")]
    pub gerrit_admin_last_name: String,
    #[serde(default = "defaults::email")]
    pub gerrit_admin_email: String,

    #[serde(default = "defaults::output_file")]
    pub output_file: PathBuf,

    #[serde(default = "defaults::retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "defaults::retry_interval", with = "humantime_serde")]
    pub retry_interval: Duration,

    #[serde(default)]
    pub tls_insecure: bool,
    #[serde(default)]
    pub tls_ca_certificates: CommaSeparatedVec,
}

/// The user Gerrit gets administered with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Everything a setup run needs, fixed for the duration of the run.
#[derive(Clone, Debug)]
pub struct SetupConfig {
    pub keycloak: KeycloakAdminClientConfig,
    pub realm: String,
    /// Desired attributes of the client.
    pub client: ClientRecord,
    pub admin_user: AdminUser,
    pub output_file: PathBuf,
    pub retry: RetryPolicy,
}

impl SetupConfig {
    /// The `clientId` of the desired client.
    pub fn client_id(&self) -> &str {
        horizon_admin_client::client_id(&self.client).unwrap_or_default()
    }
}

/// Append path segments to a base URL.
fn append(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("Not a valid base URL: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build the desired attributes of the Gerrit client.
pub fn gerrit_client(client_id: &str, domain: &Url) -> anyhow::Result<ClientRecord> {
    let gerrit_url = append(domain, &[GERRIT_PATH])?;
    let redirect_url = append(&gerrit_url, &["*"])?;

    let mut client = ClientRecord::new();
    client.insert("clientId".into(), client_id.into());
    client.insert("adminUrl".into(), gerrit_url.as_str().into());
    client.insert(
        "redirectUris".into(),
        Value::Array(vec![redirect_url.as_str().into()]),
    );
    client.insert("protocol".into(), "openid-connect".into());
    client.insert("publicClient".into(), false.into());
    Ok(client)
}

impl TryFrom<Config> for SetupConfig {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let url = append(&config.platform_url, &[KEYCLOAK_PATH])?;

        Ok(Self {
            keycloak: KeycloakAdminClientConfig {
                url,
                admin_username: config.keycloak_username,
                admin_password: config.keycloak_password,
                tls_insecure: config.tls_insecure,
                tls_ca_certificates: config.tls_ca_certificates,
            },
            realm: config.keycloak_realm,
            client: gerrit_client(&config.gerrit_client_id, &config.domain)?,
            admin_user: AdminUser {
                username: config.gerrit_admin_username,
                password: config.gerrit_admin_password,
                first_name: config.gerrit_admin_first_name,
                last_name: config.gerrit_admin_last_name,
                email: config.gerrit_admin_email,
            },
            output_file: config.output_file,
            retry: RetryPolicy::new(config.retry_max_attempts, config.retry_interval),
        })
    }
}
