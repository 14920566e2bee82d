use crate::merge::merged;
use horizon_admin_client::{client_id, client_internal_id, AdminClient, ClientRecord, Error};

/// Find the first client with a matching `clientId`.
pub async fn find_client<C: AdminClient>(
    client: &C,
    id: &str,
) -> Result<Option<ClientRecord>, Error> {
    Ok(client
        .clients_get()
        .await?
        .into_iter()
        .find(|c| client_id(c) == Some(id)))
}

/// Create the client, or update an existing one, and return what the server now has.
pub async fn register_client<C: AdminClient>(
    client: &C,
    desired: &ClientRecord,
) -> Result<ClientRecord, Error> {
    let id = client_id(desired)
        .ok_or_else(|| Error::Internal("Desired client is missing the 'clientId'".into()))?;

    match find_client(client, id).await? {
        Some(existing) => {
            log::info!("updating {id} client");
            let internal_id = client_internal_id(&existing)
                .ok_or_else(|| Error::Internal(format!("Client '{id}' has no ID")))?
                .to_string();
            client
                .client_update(&internal_id, &merged(&existing, desired))
                .await?;
        }
        None => {
            log::info!("creating {id} client");
            client.client_create(desired).await?;
        }
    }

    find_client(client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Client '{id}'")))
}
