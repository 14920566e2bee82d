use crate::retry::RetryPolicy;
use horizon_admin_client::{AdminClient, Error};

/// Authenticate once, as the admin user.
pub async fn authenticate<C: AdminClient>(client: &mut C) -> Result<(), Error> {
    client.authenticate().await?;
    log::debug!("Authenticated as admin");
    Ok(())
}

/// Wait until the server lets us authenticate, leaving the client authenticated.
///
/// On giving up, the error of the last attempt is returned.
pub async fn wait_for_keycloak<C: AdminClient>(
    client: &mut C,
    url: &str,
    policy: &RetryPolicy,
) -> Result<(), Error> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match authenticate(client).await {
            Ok(()) => return Ok(()),
            Err(err) => match policy.delay_after(attempt) {
                Some(delay) => {
                    log::info!("waiting for {url}... {err}");
                    tokio::time::sleep(delay).await;
                }
                None => {
                    log::warn!("Giving up on {url} after {attempt} attempts");
                    return Err(err);
                }
            },
        }
    }
}
