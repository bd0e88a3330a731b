use super::{
    DeploymentSettings, Result, SettingsBuilder,
    backend::{Backend, Component},
    delegate_settings_builder,
    mapping::SettingOption,
    template::Template,
};
use crate::{config::Credentials, framework::types::common::Port};

/// Settings of a Smart Router balancing requests between KIE Servers
#[derive(Clone, Debug)]
pub struct SmartRouterSettingsBuilder {
    builder: SettingsBuilder,
}

delegate_settings_builder!(SmartRouterSettingsBuilder);

impl SmartRouterSettingsBuilder {
    pub fn new(backend: Backend, credentials: &Credentials) -> Result<Self> {
        let template = Template::SmartRouter;
        let builder = SettingsBuilder::new(backend, template, Component::SmartRouter)?;

        let builder = match backend {
            Backend::Template => builder.set(
                SettingOption::ControllerUser,
                &[
                    &credentials.controller_user,
                    &credentials.controller_password,
                ],
            )?,
            Backend::Apb => {
                let builder = match template.apb_plan_id() {
                    Some(plan_id) => builder.with_value("_apb_plan_id", plan_id),
                    None => builder,
                };
                builder.set(
                    SettingOption::ControllerUser,
                    &[
                        &credentials.controller_user,
                        &credentials.controller_password,
                    ],
                )?
            }
            Backend::Operator => builder,
        };

        Ok(Self { builder })
    }

    pub fn with_application_name(self, name: &str) -> Result<Self> {
        self.set(SettingOption::ApplicationName, &[name])
    }

    pub fn with_controller_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::ControllerUser, &[user, password])
    }

    pub fn with_smart_router_id(self, id: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterId, &[id])
    }

    pub fn with_smart_router_name(self, name: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterName, &[name])
    }

    /// Host and port the Smart Router announces to the KIE Servers
    pub fn with_smart_router_config(self, host: &str, port: Port) -> Result<Self> {
        self.set(
            SettingOption::SmartRouterConnection,
            &[host, &port.to_string()],
        )
    }

    pub fn with_controller_connection(self, host: &str, port: Port) -> Result<Self> {
        self.set(
            SettingOption::ControllerConnection,
            &[host, &port.to_string()],
        )
    }

    pub fn with_controller_service(self, service: &str) -> Result<Self> {
        self.set(SettingOption::ControllerService, &[service])
    }

    /// URL under which the Smart Router is reachable from outside of the cluster
    pub fn with_smart_router_external_url(self, url: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterExternalUrl, &[url])
    }

    pub fn with_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterHostnameHttp, &[hostname])
    }

    pub fn with_secured_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterHostnameHttps, &[hostname])
    }
}

impl From<SmartRouterSettingsBuilder> for DeploymentSettings {
    fn from(value: SmartRouterSettingsBuilder) -> Self {
        value.build()
    }
}
