use horizon_admin_client::{AdminClient, Error, Realm};

/// Look up the realm, including its keys, and scope all further calls to it.
pub async fn resolve_realm<C: AdminClient>(client: &mut C, name: &str) -> Result<Realm, Error> {
    let representation = client.realm_get(name).await?;
    let name = representation
        .realm
        .clone()
        .unwrap_or_else(|| name.to_string());

    let keys = client.realm_keys_get(&name).await?;

    client.set_realm(&name);
    log::info!("using realm {name}");

    Ok(Realm {
        name,
        representation,
        keys,
    })
}
