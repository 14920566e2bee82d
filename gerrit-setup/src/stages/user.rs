use crate::config::AdminUser;
use horizon_admin_client::{AdminClient, Error};
use keycloak::types::{CredentialRepresentation, UserRepresentation};

/// Find a user by its exact username.
pub async fn find_user<C: AdminClient>(
    client: &C,
    username: &str,
) -> Result<Option<UserRepresentation>, Error> {
    Ok(client
        .users_get(username)
        .await?
        .into_iter()
        .find(|user| user.username.as_deref() == Some(username)))
}

/// Replace the admin user with a fresh instance, returning the ID of the new user.
///
/// There is no update path: an existing user gets deleted, so that the password is always the
/// configured one.
pub async fn provision_user<C: AdminClient>(client: &C, user: &AdminUser) -> Result<String, Error> {
    let username = &user.username;

    if let Some(existing) = find_user(client, username).await? {
        let id = existing
            .id
            .ok_or_else(|| Error::Internal(format!("User '{username}' has no ID")))?;
        log::info!("deleting old instance of {username} user");
        client.user_delete(&id).await?;
    }

    log::info!("creating {username} user");
    let representation = UserRepresentation {
        username: Some(username.clone()),
        enabled: Some(true),
        required_actions: Some(vec![]),
        first_name: Some(user.first_name.clone()),
        last_name: Some(user.last_name.clone()),
        email: Some(user.email.clone()),
        ..Default::default()
    };

    let id = match client.user_create(&representation).await? {
        Some(id) => id,
        None => find_user(client, username)
            .await?
            .and_then(|user| user.id)
            .ok_or_else(|| Error::NotFound(format!("User '{username}'")))?,
    };

    client
        .user_reset_password(
            &id,
            &CredentialRepresentation {
                type_: Some("password".into()),
                value: Some(user.password.clone()),
                temporary: Some(false),
                ..Default::default()
            },
        )
        .await?;

    Ok(id)
}
