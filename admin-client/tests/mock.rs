use horizon_admin_client::{mock::KeycloakAdminMock, AdminClient, ClientRecord, Error};
use keycloak::types::UserRepresentation;
use serde_json::json;

fn client(client_id: &str) -> ClientRecord {
    let mut client = ClientRecord::new();
    client.insert("clientId".into(), json!(client_id));
    client
}

async fn authenticated() -> KeycloakAdminMock {
    let mut mock = KeycloakAdminMock::new().with_realm("horizon");
    mock.authenticate().await.unwrap();
    mock.set_realm("horizon");
    mock
}

#[tokio::test]
async fn test_requires_authentication() {
    let mock = KeycloakAdminMock::new().with_realm("horizon");

    let err = mock.realm_get("horizon").await.unwrap_err();

    assert!(err.is_not_authorized());
}

#[tokio::test]
async fn test_scoped_to_realm() {
    let mut mock = KeycloakAdminMock::new()
        .with_realm("horizon")
        .with_client("horizon", client("gerrit"));
    mock.authenticate().await.unwrap();

    // still in the master realm
    assert!(matches!(
        mock.clients_get().await.unwrap_err(),
        Error::NotFound(_)
    ));

    mock.set_realm("horizon");
    assert_eq!(mock.clients_get().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_client() {
    let mock = authenticated().await;

    mock.client_create(&client("gerrit")).await.unwrap();
    let err = mock.client_create(&client("gerrit")).await.unwrap_err();

    assert!(matches!(err, Error::Http { status: 409, .. }));
    assert_eq!(mock.clients("horizon").len(), 1);
}

#[tokio::test]
async fn test_duplicate_user() {
    let mock = authenticated().await;
    let user = UserRepresentation {
        username: Some("gerrit-admin".into()),
        ..Default::default()
    };

    let id = mock.user_create(&user).await.unwrap();
    assert!(id.is_some());

    let err = mock.user_create(&user).await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 409, .. }));
}

#[tokio::test]
async fn test_user_search_is_partial() {
    let mock = KeycloakAdminMock::new()
        .with_realm("horizon")
        .with_user("horizon", "gerrit-admin", "p1")
        .with_user("horizon", "gerrit-admin-old", "p2");
    let mut mock = mock;
    mock.authenticate().await.unwrap();
    mock.set_realm("horizon");

    assert_eq!(mock.users_get("gerrit-admin").await.unwrap().len(), 2);
    assert_eq!(mock.users_get("gerrit-admin-old").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_authentication_failures() {
    let mut mock = KeycloakAdminMock::new().fail_authentication(2);

    assert!(mock.authenticate().await.is_err());
    assert!(mock.authenticate().await.is_err());
    assert!(mock.authenticate().await.is_ok());
    assert_eq!(mock.auth_attempts(), 3);
}
