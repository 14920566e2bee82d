use crate::{
    config::SetupConfig,
    stages::{
        client::register_client, export::export_client, probe::wait_for_keycloak,
        realm::resolve_realm, user::provision_user,
    },
};
use horizon_admin_client::{client_internal_id, AdminClient, Error};
use std::{fmt, path::PathBuf, process::ExitCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Realm,
    Client,
    User,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Probe => "probe",
            Self::Realm => "realm",
            Self::Client => "client",
            Self::User => "user",
            Self::Export => "export",
        })
    }
}

/// A failed setup run, along with the stage that failed.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct WorkflowError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

trait InStage {
    type Output;
    fn in_stage(self, stage: Stage) -> Result<Self::Output, WorkflowError>;
}

impl<T> InStage for Result<T, Error> {
    type Output = T;

    fn in_stage(self, stage: Stage) -> Result<T, WorkflowError> {
        self.map_err(|source| WorkflowError { stage, source })
    }
}

/// The outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub realm: String,
    pub client_id: String,
    pub client_internal_id: Option<String>,
    pub user_id: String,
    pub output_file: PathBuf,
}

/// Run all stages, in order, stopping at the first failure.
///
/// Nothing gets rolled back. As the client and user stages are idempotent, a failed run can
/// simply be started again.
pub async fn run<C: AdminClient>(
    client: &mut C,
    config: &SetupConfig,
) -> Result<Summary, WorkflowError> {
    wait_for_keycloak(client, config.keycloak.url.as_str(), &config.retry)
        .await
        .in_stage(Stage::Probe)?;

    let realm = resolve_realm(client, &config.realm)
        .await
        .in_stage(Stage::Realm)?;

    let registered = register_client(client, &config.client)
        .await
        .in_stage(Stage::Client)?;

    let user_id = provision_user(client, &config.admin_user)
        .await
        .in_stage(Stage::User)?;

    let client_id = config.client_id();
    let exported = export_client(client, client_id, &config.output_file)
        .await
        .in_stage(Stage::Export)?;

    log::debug!(
        "Registered client: {:?}, exported client: {:?}",
        client_internal_id(&registered),
        client_internal_id(&exported)
    );

    Ok(Summary {
        realm: realm.name,
        client_id: client_id.to_string(),
        client_internal_id: client_internal_id(&exported).map(String::from),
        user_id,
        output_file: config.output_file.clone(),
    })
}

/// Log the outcome of a run, exactly once, and map it to the exit code of the process.
pub fn report(result: &Result<Summary, WorkflowError>) -> ExitCode {
    match result {
        Ok(summary) => {
            log::info!(
                "Realm {} configured for client {} (user: {}), written to {}",
                summary.realm,
                summary.client_id,
                summary.user_id,
                summary.output_file.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_message() {
        let err = WorkflowError {
            stage: Stage::Realm,
            source: Error::NotFound("Realm 'horizon'".into()),
        };
        assert_eq!(err.to_string(), "realm failed: Realm 'horizon' not found");
    }

    #[test]
    fn test_report() {
        let summary = Summary {
            realm: "horizon".into(),
            client_id: "gerrit".into(),
            client_internal_id: Some("1234".into()),
            user_id: "5678".into(),
            output_file: "client-gerrit.json".into(),
        };
        assert_eq!(report(&Ok(summary)), ExitCode::SUCCESS);

        let err = WorkflowError {
            stage: Stage::Export,
            source: Error::Internal("disk full".into()),
        };
        assert_eq!(report(&Err(err)), ExitCode::FAILURE);
    }
}
