use super::client::find_client;
use horizon_admin_client::{AdminClient, ClientRecord, Error};
use std::path::Path;

/// Write the current state of the client to a file, replacing any existing one.
pub async fn export_client<C: AdminClient>(
    client: &C,
    id: &str,
    path: &Path,
) -> Result<ClientRecord, Error> {
    let record = find_client(client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Client '{id}'")))?;

    log::info!("dumping {id} client data into {}", path.display());
    tokio::fs::write(path, serde_json::to_vec(&record)?).await?;

    Ok(record)
}

#[cfg(test)]
mod test {
    use super::*;
    use horizon_admin_client::mock::KeycloakAdminMock;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("client-{}.json", uuid::Uuid::new_v4()))
    }

    async fn mock() -> KeycloakAdminMock {
        let client = match json!({ "id": "c1", "clientId": "gerrit", "secret": "s3cr3t" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let mut mock = KeycloakAdminMock::new()
            .with_realm("horizon")
            .with_client("horizon", client);
        mock.authenticate().await.unwrap();
        mock.set_realm("horizon");
        mock
    }

    #[tokio::test]
    async fn test_export() {
        let mock = mock().await;
        let path = temp_file();
        tokio::fs::write(&path, b"stale").await.unwrap();

        export_client(&mock, "gerrit", &path).await.unwrap();

        let content: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(
            content,
            json!({ "id": "c1", "clientId": "gerrit", "secret": "s3cr3t" })
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_client() {
        let mock = mock().await;
        let path = temp_file();

        let err = export_client(&mock, "other", &path).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_failure() {
        let mock = mock().await;
        let path = temp_file().join("missing-dir").join("client.json");

        let err = export_client(&mock, "gerrit", &path).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
