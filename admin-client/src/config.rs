use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

pub trait ConfigFromEnv<'de>: Sized + Deserialize<'de> {
    fn from_env() -> Result<Self, config::ConfigError> {
        Self::from(config::Environment::default())
    }

    fn from(env: config::Environment) -> Result<Self, config::ConfigError>;

    fn from_set<K, V>(set: HashMap<K, V>) -> Result<Self, config::ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let set = set.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::from(config::Environment::default().source(Some(set)))
    }
}

impl<'de, T: Deserialize<'de> + Sized> ConfigFromEnv<'de> for T {
    fn from(env: config::Environment) -> Result<T, config::ConfigError> {
        // values are kept as strings, secrets must not be parsed as numbers
        let env = env.separator("__");

        let cfg = config::Config::builder().add_source(env);
        cfg.build()?.try_deserialize()
    }
}

/// A list of values, provided as a single comma separated string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommaSeparatedVec(pub Vec<String>);

impl<'de> Deserialize<'de> for CommaSeparatedVec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        ))
    }
}

impl From<Vec<String>> for CommaSeparatedVec {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}
