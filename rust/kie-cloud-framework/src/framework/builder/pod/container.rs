use std::collections::BTreeMap;

use stackable_operator::k8s_openapi::api::core::v1::EnvVar;

type EnvVarName = String;

/// Environment variables with literal values, ordered by name
///
/// Used as template parameters, as APB extra vars and as container environment of the KieApp
/// components.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvVarSet(BTreeMap<EnvVarName, EnvVar>);

impl EnvVarSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_env_var(&self, env_var_name: impl Into<EnvVarName>) -> Option<&EnvVar> {
        self.0.get(&env_var_name.into())
    }

    pub fn get_value(&self, env_var_name: impl Into<EnvVarName>) -> Option<&str> {
        self.get_env_var(env_var_name)
            .and_then(|env_var| env_var.value.as_deref())
    }

    pub fn contains(&self, env_var_name: impl Into<EnvVarName>) -> bool {
        self.0.contains_key(&env_var_name.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add_env_var(mut self, env_var: EnvVar) -> Self {
        self.0.insert(env_var.name.clone(), env_var);

        self
    }

    /// Adds the given variables; variables of `env_var_set` override existing ones
    pub fn merge(mut self, mut env_var_set: EnvVarSet) -> Self {
        self.0.append(&mut env_var_set.0);

        self
    }

    pub fn with_values<I, K, V>(self, env_vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<EnvVarName>,
        V: Into<String>,
    {
        env_vars
            .into_iter()
            .fold(self, |extended_env_vars, (name, value)| {
                extended_env_vars.with_value(name, value)
            })
    }

    pub fn with_value(mut self, name: impl Into<EnvVarName>, value: impl Into<String>) -> Self {
        let name: EnvVarName = name.into();

        self.0.insert(
            name.clone(),
            EnvVar {
                name,
                value: Some(value.into()),
                value_from: None,
            },
        );

        self
    }

    /// Name-value pairs in the order of the names
    ///
    /// Variables without a literal value yield an empty string.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, env_var)| {
            (
                name.as_str(),
                env_var.value.as_deref().unwrap_or_default(),
            )
        })
    }
}

impl From<EnvVarSet> for Vec<EnvVar> {
    fn from(value: EnvVarSet) -> Self {
        value.0.values().cloned().collect()
    }
}

impl From<Vec<EnvVar>> for EnvVarSet {
    fn from(value: Vec<EnvVar>) -> Self {
        value
            .into_iter()
            .fold(EnvVarSet::new(), |env_var_set, env_var| {
                env_var_set.add_env_var(env_var)
            })
    }
}
