use super::{
    DeploymentSettings, Result, SettingsBuilder,
    backend::{Backend, Component},
    delegate_settings_builder,
    mapping::SettingOption,
    template::Template,
};
use crate::config::Credentials;

/// Settings of a standalone controller managing KIE Servers
///
/// Only OpenShift templates provide a standalone controller.
#[derive(Clone, Debug)]
pub struct ControllerSettingsBuilder {
    builder: SettingsBuilder,
}

delegate_settings_builder!(ControllerSettingsBuilder);

impl ControllerSettingsBuilder {
    pub fn new(backend: Backend, credentials: &Credentials) -> Result<Self> {
        let builder = SettingsBuilder::new(backend, Template::Controller, Component::Controller)?
            .set(
                SettingOption::AdminUser,
                &[&credentials.workbench_user, &credentials.workbench_password],
            )?
            .set(
                SettingOption::ControllerUser,
                &[
                    &credentials.controller_user,
                    &credentials.controller_password,
                ],
            )?;

        Ok(Self { builder })
    }

    pub fn with_application_name(self, name: &str) -> Result<Self> {
        self.set(SettingOption::ApplicationName, &[name])
    }

    pub fn with_controller_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::ControllerUser, &[user, password])
    }

    pub fn with_kie_server_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::KieServerUser, &[user, password])
    }

    pub fn with_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::ControllerHostnameHttp, &[hostname])
    }
}

impl From<ControllerSettingsBuilder> for DeploymentSettings {
    fn from(value: ControllerSettingsBuilder) -> Self {
        value.build()
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerSettingsBuilder;
    use crate::{
        config::tests::test_config,
        settings::{ErrorDiscriminants, backend::Backend, template::Template},
    };

    #[test]
    fn test_template_settings() {
        let config = test_config(&[]);
        let settings = ControllerSettingsBuilder::new(Backend::Template, &config.credentials)
            .and_then(|builder| builder.with_hostname("controller.example.com"))
            .expect("should be supported")
            .build();

        assert_eq!(Template::Controller, settings.template());
        assert_eq!(
            vec![
                ("CONTROLLER_HOSTNAME_HTTP", "controller.example.com"),
                ("KIE_ADMIN_PWD", "adminUser1!"),
                ("KIE_ADMIN_USER", "adminUser"),
                ("KIE_SERVER_CONTROLLER_PWD", "controllerUser1!"),
                ("KIE_SERVER_CONTROLLER_USER", "controllerUser"),
            ],
            settings.env().values().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_not_available_for_other_backends() {
        let config = test_config(&[]);

        for backend in [Backend::Apb, Backend::Operator] {
            assert_eq!(
                Err(ErrorDiscriminants::UnsupportedComponent),
                ControllerSettingsBuilder::new(backend, &config.credentials)
                    .map(|_| ())
                    .map_err(ErrorDiscriminants::from)
            );
        }
    }
}
