//! Deployment settings
//!
//! Settings builders translate named options into a flat map of variables. The names of the
//! variables depend on the backend the settings are provisioned with, see [`mapping`].

use snafu::{Snafu, ensure};
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::framework::builder::pod::container::EnvVarSet;

pub mod backend;
pub mod controller;
pub mod kie_server;
pub mod ldap;
pub mod mapping;
pub mod smart_router;
pub mod sso;
pub mod template;
pub mod workbench;

use backend::{Backend, Component};
use mapping::{Mapping, SettingOption};
use template::Template;

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("option {option} is not supported for {backend}"))]
    Unsupported {
        option: SettingOption,
        backend: Backend,
    },

    #[snafu(display("{component} settings are not supported for {backend}"))]
    UnsupportedComponent {
        component: Component,
        backend: Backend,
    },

    #[snafu(display("option {option} takes {expected} values but {actual} were given"))]
    ValueCount {
        option: SettingOption,
        expected: usize,
        actual: usize,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The backend cannot express the requested configuration
    ///
    /// Callers can skip such configurations instead of failing.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::Unsupported { .. } | Error::UnsupportedComponent { .. }
        )
    }
}

/// Variables for a deployment, ready to be provisioned
#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentSettings {
    backend: Backend,
    template: Template,
    component: Component,
    env: EnvVarSet,
}

impl DeploymentSettings {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn env(&self) -> &EnvVarSet {
        &self.env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.env.get_value(key)
    }

    pub fn into_env(self) -> EnvVarSet {
        self.env
    }
}

/// Generic settings builder
///
/// The component specific builders wrap this builder and expose typed options.
#[derive(Clone, Debug)]
pub struct SettingsBuilder {
    backend: Backend,
    template: Template,
    component: Component,
    env: EnvVarSet,
}

impl SettingsBuilder {
    /// Creates a builder if the backend supports settings for the component
    pub fn new(backend: Backend, template: Template, component: Component) -> Result<Self> {
        ensure!(
            backend.capabilities().supports_settings(component),
            UnsupportedComponentSnafu { component, backend }
        );

        Ok(Self {
            backend,
            template,
            component,
            env: EnvVarSet::new(),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Stores the values of an option under the keys of the backend
    pub fn set(self, option: SettingOption, values: &[&str]) -> Result<Self> {
        let mapping = option.mapping(self.backend);
        self.apply(option, mapping, values)
    }

    /// Stores the values of an option for the KIE Server at `index` of a scenario with several
    /// KIE Servers, see [`SettingOption::kie_server_mapping`]
    pub fn set_for_kie_server(
        self,
        index: usize,
        option: SettingOption,
        values: &[&str],
    ) -> Result<Self> {
        let mapping = option.kie_server_mapping(self.backend, index);
        self.apply(option, mapping, values)
    }

    fn apply(mut self, option: SettingOption, mapping: Mapping, values: &[&str]) -> Result<Self> {
        match mapping {
            Mapping::Keys(keys) => {
                ensure!(
                    keys.len() == values.len(),
                    ValueCountSnafu {
                        option,
                        expected: keys.len(),
                        actual: values.len()
                    }
                );
                self.env = self
                    .env
                    .with_values(keys.iter().copied().zip(values.iter().copied()));
                Ok(self)
            }
            Mapping::Ignored => {
                tracing::warn!(
                    %option,
                    backend = %self.backend,
                    "The option is configured by the backend itself and therefore skipped."
                );
                Ok(self)
            }
            Mapping::Unsupported => UnsupportedSnafu {
                option,
                backend: self.backend,
            }
            .fail(),
        }
    }

    /// Stores a variable which does not correspond to an option, e.g. a default of a backend
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.env = self.env.with_value(key, value);
        self
    }

    /// Adds variables which are given by the caller, e.g. LDAP settings
    pub fn with_env(mut self, env: EnvVarSet) -> Self {
        self.env = self.env.merge(env);
        self
    }

    /// Freezes the current variables
    ///
    /// Building does not consume the builder, so that further variants can be derived.
    pub fn build(&self) -> DeploymentSettings {
        DeploymentSettings {
            backend: self.backend,
            template: self.template,
            component: self.component,
            env: self.env.clone(),
        }
    }
}

/// Implements the builder methods shared by all component specific builders
macro_rules! delegate_settings_builder {
    ($name:ident) => {
        impl $name {
            pub fn backend(&self) -> $crate::settings::backend::Backend {
                self.builder.backend()
            }

            pub fn build(&self) -> $crate::settings::DeploymentSettings {
                self.builder.build()
            }

            /// Adds raw variables, e.g. produced by [`crate::settings::ldap::LdapSettings`]
            pub fn with_env(
                mut self,
                env: $crate::framework::builder::pod::container::EnvVarSet,
            ) -> Self {
                self.builder = self.builder.with_env(env);
                self
            }

            fn set(
                mut self,
                option: $crate::settings::mapping::SettingOption,
                values: &[&str],
            ) -> $crate::settings::Result<Self> {
                self.builder = self.builder.set(option, values)?;
                Ok(self)
            }
        }
    };
}
pub(crate) use delegate_settings_builder;

#[cfg(test)]
mod tests {
    use super::{ErrorDiscriminants, SettingsBuilder};
    use crate::settings::{
        backend::{Backend, Component},
        mapping::SettingOption,
        template::Template,
    };

    fn builder(backend: Backend) -> SettingsBuilder {
        SettingsBuilder::new(backend, Template::KieServer, Component::KieServer)
            .expect("should support kie-server settings")
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = builder(Backend::Template)
            .set(SettingOption::KieServerUser, &["yoda", "usetheforce123@"])
            .expect("should be supported");

        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn test_set_pair_of_keys_keeps_other_keys() {
        let before = builder(Backend::Template)
            .set(SettingOption::ApplicationName, &["myapp"])
            .expect("should be supported");
        let after = before
            .clone()
            .set(SettingOption::ControllerUser, &["controller", "secret"])
            .expect("should be supported");

        let settings = after.build();
        assert_eq!(Some("controller"), settings.get("KIE_SERVER_CONTROLLER_USER"));
        assert_eq!(Some("secret"), settings.get("KIE_SERVER_CONTROLLER_PWD"));
        assert_eq!(Some("myapp"), settings.get("APPLICATION_NAME"));
        assert_eq!(before.build().env().len() + 2, settings.env().len());
    }

    #[test]
    fn test_set_for_kie_server() {
        let builder = SettingsBuilder::new(
            Backend::Template,
            Template::ClusteredConsoleSmartRouterTwoKieServersTwoDatabases,
            Component::KieServer,
        )
        .expect("should support kie-server settings");

        let settings = builder
            .clone()
            .set_for_kie_server(0, SettingOption::KieServerHostnameHttp, &["one.example.com"])
            .and_then(|builder| {
                builder.set_for_kie_server(
                    1,
                    SettingOption::KieServerHostnameHttp,
                    &["two.example.com"],
                )
            })
            .expect("should be supported")
            .build();
        assert_eq!(Some("one.example.com"), settings.get("KIE_SERVER1_HOSTNAME_HTTP"));
        assert_eq!(Some("two.example.com"), settings.get("KIE_SERVER2_HOSTNAME_HTTP"));
        assert!(!settings.env().contains("KIE_SERVER_HOSTNAME_HTTP"));

        let error = builder
            .set_for_kie_server(1, SettingOption::ContainerDeployment, &["two"])
            .map(|_| ())
            .expect_err("should be shared by all KIE Servers");
        assert!(error.is_unsupported());
    }

    #[test]
    fn test_unsupported_option() {
        let result = builder(Backend::Apb).set(SettingOption::ApplicationName, &["myapp"]);

        let error = result.expect_err("should not be supported for APB");
        assert!(error.is_unsupported());
        assert_eq!(
            "option application-name is not supported for APB",
            error.to_string()
        );
    }

    #[test]
    fn test_ignored_option_stores_nothing() {
        let settings = builder(Backend::Apb)
            .set(
                SettingOption::KieServerHostnameHttp,
                &["kieserver.example.com"],
            )
            .expect("should be skipped")
            .build();

        assert!(settings.env().is_empty());
    }

    #[test]
    fn test_value_count() {
        assert_eq!(
            Err(ErrorDiscriminants::ValueCount),
            builder(Backend::Template)
                .set(SettingOption::AdminUser, &["admin"])
                .map(|_| ())
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_unsupported_component() {
        assert_eq!(
            Err(ErrorDiscriminants::UnsupportedComponent),
            SettingsBuilder::new(Backend::Operator, Template::Controller, Component::Controller)
                .map(|_| ())
                .map_err(ErrorDiscriminants::from)
        );
    }
}
