use super::{
    DeploymentSettings, Result, SettingsBuilder,
    backend::{Backend, Component},
    delegate_settings_builder,
    mapping::SettingOption,
    template::Template,
};
use crate::config::Credentials;

/// Settings of a Workbench (Business Central)
#[derive(Clone, Debug)]
pub struct WorkbenchSettingsBuilder {
    builder: SettingsBuilder,
}

delegate_settings_builder!(WorkbenchSettingsBuilder);

impl WorkbenchSettingsBuilder {
    pub fn new(backend: Backend, credentials: &Credentials) -> Result<Self> {
        let template = Template::Workbench;
        let builder = SettingsBuilder::new(backend, template, Component::Workbench)?;

        let builder = match backend {
            Backend::Template => builder
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
                )?,
            Backend::Apb => {
                let builder = match template.apb_plan_id() {
                    Some(plan_id) => builder.with_value("_apb_plan_id", plan_id),
                    None => builder,
                };
                builder
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
                    )?
                    .set(
                        SettingOption::KieServerUser,
                        &[
                            &credentials.kie_server_user,
                            &credentials.kie_server_password,
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

    pub fn with_admin_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::AdminUser, &[user, password])
    }

    pub fn with_controller_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::ControllerUser, &[user, password])
    }

    pub fn with_kie_server_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::KieServerUser, &[user, password])
    }

    /// User of the Maven repository embedded in the Workbench
    pub fn with_maven_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::WorkbenchMavenUser, &[user, password])
    }

    /// Directory with git hooks which are applied to the Workbench repositories
    pub fn with_git_hooks_dir(self, dir: &str) -> Result<Self> {
        self.set(SettingOption::GitHooksDir, &[dir])
    }

    pub fn with_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::WorkbenchHostnameHttp, &[hostname])
    }

    pub fn with_secured_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::WorkbenchHostnameHttps, &[hostname])
    }
}

impl From<WorkbenchSettingsBuilder> for DeploymentSettings {
    fn from(value: WorkbenchSettingsBuilder) -> Self {
        value.build()
    }
}
