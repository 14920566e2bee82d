use horizon_admin_client::{mock::KeycloakAdminMock, KeycloakAdminClientConfig};
use horizon_gerrit_setup::{
    config::{gerrit_client, AdminUser},
    retry::RetryPolicy,
    SetupConfig,
};
use log::LevelFilter;
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const REALM: &str = "horizon";

pub fn init() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}

pub fn setup_config(password: &str, output_file: PathBuf) -> SetupConfig {
    SetupConfig {
        keycloak: KeycloakAdminClientConfig {
            url: Url::parse("http://localhost:8080/auth").unwrap(),
            admin_username: "admin".into(),
            admin_password: "admin123456".into(),
            tls_insecure: false,
            tls_ca_certificates: Default::default(),
        },
        realm: REALM.into(),
        client: gerrit_client(
            "gerrit",
            &Url::parse("https://dev.horizon.example").unwrap(),
        )
        .unwrap(),
        admin_user: AdminUser {
            username: "gerrit-admin".into(),
            password: password.into(),
            first_name: "Gerrit".into(),
            last_name: "Gerrit".into(),
            email: "gerrit@gerrit".into(),
        },
        output_file,
        retry: RetryPolicy::new(3, Duration::ZERO),
    }
}

pub fn mock() -> KeycloakAdminMock {
    KeycloakAdminMock::new().with_realm(REALM)
}

pub fn temp_file() -> PathBuf {
    std::env::temp_dir().join(format!("client-gerrit-{}.json", uuid::Uuid::new_v4()))
}
