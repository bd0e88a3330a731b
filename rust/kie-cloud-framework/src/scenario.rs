//! Deployment scenarios
//!
//! A [`ScenarioBuilder`] combines the settings of the components with the options which apply to
//! the whole scenario, e.g. LDAP or SSO. The built [`Scenario`] is provisioned into a new namespace
//! and provides a [`Deployment`] for each of its components.

use std::{collections::HashSet, str::FromStr, sync::Arc};

use futures::future::try_join_all;
use snafu::{ResultExt, Snafu, ensure};
use stackable_operator::kube::api::ObjectMeta;
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::{
    config::{Credentials, FrameworkConfig},
    crd::{merge_env, v2},
    deployment::{self, Context, Deployment, cluster, wait},
    framework::{ApplicationName, NamespaceName, builder::pod::container::EnvVarSet},
    settings::{
        self, DeploymentSettings, SettingsBuilder,
        backend::{Backend, Component},
        ldap::{self, LdapSettings},
        mapping::SettingOption,
        sso::{self, SsoSettings},
    },
};

pub mod kind;
pub mod provision;

/// Mode of the KIE Servers deployed with templates
const DEFAULT_KIE_SERVER_MODE: &str = "DEVELOPMENT";

use kind::ScenarioKind;
use provision::{Plan, Provisioner};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("the scenario {kind} is not supported for {backend}"))]
    UnsupportedScenario {
        kind: ScenarioKind,
        backend: Backend,
    },

    #[snafu(display("{feature} is not supported for {backend}"))]
    UnsupportedFeature {
        feature: &'static str,
        backend: Backend,
    },

    #[snafu(display("failed to apply the option {option}"))]
    ApplyOption {
        source: settings::Error,
        option: SettingOption,
    },

    #[snafu(display("settings for {settings_backend} cannot be deployed with {backend}"))]
    BackendMismatch {
        settings_backend: Backend,
        backend: Backend,
    },

    #[snafu(display("the scenario {kind} has no further {component}"))]
    UnexpectedComponent {
        kind: ScenarioKind,
        component: Component,
    },

    #[snafu(display("the hostname of {component} #{index} has been already set"))]
    HostnameAlreadySet { component: Component, index: usize },

    #[snafu(display("SSL is enabled. It is not possible to configure http hostname."))]
    SslEnabled {},

    #[snafu(display("SSL is disabled. It is not possible to configure https hostname."))]
    SslDisabled {},

    #[snafu(display("failed to convert the LDAP settings"))]
    ConvertLdapSettings { source: ldap::Error },

    #[snafu(display("failed to build the service name"))]
    BuildServiceName { source: deployment::Error },

    #[snafu(display("failed to build the namespace name {name:?}"))]
    BuildNamespaceName {
        source: crate::framework::Error,
        name: String,
    },

    #[snafu(display("failed to create the namespace {namespace}"))]
    CreateNamespace {
        source: cluster::Error,
        namespace: NamespaceName,
    },

    #[snafu(display("failed to provision the scenario {kind}"))]
    Provision {
        source: provision::Error,
        kind: ScenarioKind,
    },

    #[snafu(display("failed to wait until {service} is deployed"))]
    WaitForDeployment {
        source: wait::Error,
        service: String,
    },

    #[snafu(display("failed to wait until {service} is scaled"))]
    WaitForScale {
        source: deployment::Error,
        service: String,
    },

    #[snafu(display("the scenario is not deployed"))]
    NotDeployed {},

    #[snafu(display("failed to delete the namespace {namespace}"))]
    DeleteNamespace {
        source: cluster::Error,
        namespace: NamespaceName,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The backend cannot deploy the requested configuration
    ///
    /// Callers can skip such scenarios instead of failing.
    pub fn is_unsupported(&self) -> bool {
        match self {
            Error::UnsupportedScenario { .. } | Error::UnsupportedFeature { .. } => true,
            Error::ApplyOption { source, .. } => source.is_unsupported(),
            _ => false,
        }
    }
}

/// Four random hexadecimal characters
fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(4);
    suffix
}

/// Builder of a [`Scenario`]
///
/// Options which apply to several components are collected separately and merged into the
/// component settings when the scenario is built.
#[derive(Clone, Debug)]
pub struct ScenarioBuilder {
    kind: ScenarioKind,
    backend: Backend,
    application: ApplicationName,
    namespace_prefix: Option<String>,
    credentials: Credentials,
    https_secret: String,

    workbench: Option<DeploymentSettings>,
    kie_servers: Vec<DeploymentSettings>,
    smart_router: Option<DeploymentSettings>,

    common_env: EnvVarSet,
    workbench_env: EnvVarSet,
    kie_server_env: EnvVarSet,
    /// Route hostnames of each KIE Server
    kie_server_hostname_envs: Vec<EnvVarSet>,

    auth: v2::Auth,
    sso: bool,
    disable_ssl: Option<bool>,
    hostnames_set: HashSet<(Component, usize)>,
}

impl ScenarioBuilder {
    pub fn new(kind: ScenarioKind, backend: Backend, config: &FrameworkConfig) -> Result<Self> {
        ensure!(
            kind.is_supported_by(backend),
            UnsupportedScenarioSnafu { kind, backend }
        );

        Ok(Self {
            kind,
            backend,
            application: config.application_name.clone(),
            namespace_prefix: config.namespace_prefix.clone(),
            credentials: config.credentials.clone(),
            https_secret: config.https_secret.clone(),
            workbench: None,
            kie_servers: Vec::new(),
            smart_router: None,
            common_env: EnvVarSet::new(),
            workbench_env: EnvVarSet::new(),
            kie_server_env: EnvVarSet::new(),
            kie_server_hostname_envs: vec![EnvVarSet::new(); kind.kie_servers()],
            auth: v2::Auth::default(),
            sso: false,
            disable_ssl: None,
            hostnames_set: HashSet::new(),
        })
    }

    pub fn with_workbench_settings(mut self, settings: DeploymentSettings) -> Result<Self> {
        self.check_settings(&settings, Component::Workbench, self.kind.has_workbench())?;
        self.workbench = Some(settings);
        Ok(self)
    }

    /// Adds the settings of the next KIE Server
    ///
    /// The settings are applied to the KIE Servers in the order in which they are added. Templates
    /// and APBs take one set of KIE Server parameters for all servers, so the servers of these
    /// backends must share the same settings.
    pub fn with_kie_server_settings(mut self, settings: DeploymentSettings) -> Result<Self> {
        let has_room = self.kie_servers.len() < self.kind.kie_servers();
        self.check_settings(&settings, Component::KieServer, has_room)?;
        if self.backend != Backend::Operator {
            self.ensure_feature(
                "different settings per KIE Server",
                self.kie_servers
                    .iter()
                    .all(|other| other.env() == settings.env()),
            )?;
        }
        self.kie_servers.push(settings);
        Ok(self)
    }

    pub fn with_smart_router_settings(mut self, settings: DeploymentSettings) -> Result<Self> {
        self.check_settings(&settings, Component::SmartRouter, self.kind.has_smart_router())?;
        self.smart_router = Some(settings);
        Ok(self)
    }

    fn check_settings(
        &self,
        settings: &DeploymentSettings,
        component: Component,
        has_room: bool,
    ) -> Result<()> {
        ensure!(
            settings.backend() == self.backend,
            BackendMismatchSnafu {
                settings_backend: settings.backend(),
                backend: self.backend,
            }
        );
        ensure!(
            settings.component() == component && has_room,
            UnexpectedComponentSnafu {
                kind: self.kind,
                component: settings.component(),
            }
        );
        Ok(())
    }

    pub fn with_ldap_settings(mut self, ldap_settings: &LdapSettings) -> Result<Self> {
        self.ensure_feature("LDAP", self.backend.capabilities().ldap)?;

        match self.backend {
            Backend::Operator => {
                self.auth.ldap = Some(ldap_settings.to_crd().context(ConvertLdapSettingsSnafu)?);
            }
            Backend::Template | Backend::Apb => {
                self.common_env = self
                    .common_env
                    .merge(ldap_settings.env_vars(self.backend));
            }
        }
        Ok(self)
    }

    /// Registers the Workbench and the KIE Servers as clients of the given SSO realm
    pub fn deploy_sso(mut self, sso_settings: &SsoSettings) -> Result<Self> {
        self.ensure_feature("SSO", self.backend.capabilities().sso)?;

        match self.backend {
            Backend::Operator => self.auth.sso = Some(sso_settings.to_crd()),
            Backend::Template | Backend::Apb => {
                self.common_env = self
                    .common_env
                    .merge(sso_settings.env_vars(self.backend, self.kind.kie_servers()));
            }
        }
        self.sso = true;
        Ok(self)
    }

    /// Maven repository the KIE Servers fetch their KJARs from
    pub fn with_external_maven_repo(mut self, url: &str, user: &str, password: &str) -> Result<Self> {
        self.ensure_feature(
            "an external Maven repository",
            self.backend.capabilities().external_maven_repo,
        )?;

        let env = self
            .option_env(Component::KieServer, SettingOption::MavenRepoUrl, &[url])?
            .merge(self.option_env(
                Component::KieServer,
                SettingOption::MavenRepoUser,
                &[user, password],
            )?);
        self.kie_server_env = self.kie_server_env.merge(env);
        Ok(self)
    }

    pub fn with_http_workbench_hostname(self, hostname: &str) -> Result<Self> {
        self.with_hostname(Component::Workbench, 0, false, hostname)
    }

    pub fn with_https_workbench_hostname(self, hostname: &str) -> Result<Self> {
        self.with_hostname(Component::Workbench, 0, true, hostname)
    }

    /// Sets the HTTP hostname of the first KIE Server
    pub fn with_http_kie_server_hostname(self, hostname: &str) -> Result<Self> {
        self.with_http_kie_server_hostname_at(0, hostname)
    }

    /// Sets the HTTPS hostname of the first KIE Server
    pub fn with_https_kie_server_hostname(self, hostname: &str) -> Result<Self> {
        self.with_https_kie_server_hostname_at(0, hostname)
    }

    pub fn with_http_kie_server_hostname_at(self, index: usize, hostname: &str) -> Result<Self> {
        self.with_hostname(Component::KieServer, index, false, hostname)
    }

    pub fn with_https_kie_server_hostname_at(self, index: usize, hostname: &str) -> Result<Self> {
        self.with_hostname(Component::KieServer, index, true, hostname)
    }

    /// Sets the hostname of the route of a component
    ///
    /// The operator creates either secure or insecure routes for all components, depending on
    /// whether SSL is disabled. The first hostname decides and each component takes only one
    /// hostname.
    fn with_hostname(
        mut self,
        component: Component,
        index: usize,
        secure: bool,
        hostname: &str,
    ) -> Result<Self> {
        self.ensure_feature(
            "a route hostname",
            self.backend.capabilities().route_hostnames,
        )?;
        let is_workbench = component == Component::Workbench;
        let exists = if is_workbench {
            self.kind.has_workbench()
        } else {
            index < self.kind.kie_servers()
        };
        ensure!(
            exists,
            UnexpectedComponentSnafu {
                kind: self.kind,
                component
            }
        );

        if self.backend == Backend::Operator {
            ensure!(
                !self.hostnames_set.contains(&(component, index)),
                HostnameAlreadySetSnafu { component, index }
            );
            match (secure, self.disable_ssl) {
                (false, Some(false)) => return SslEnabledSnafu.fail(),
                (true, Some(true)) => return SslDisabledSnafu.fail(),
                _ => {}
            }
        }

        let option = match (is_workbench, secure) {
            (true, false) => SettingOption::WorkbenchHostnameHttp,
            (true, true) => SettingOption::WorkbenchHostnameHttps,
            (false, false) => SettingOption::KieServerHostnameHttp,
            (false, true) => SettingOption::KieServerHostnameHttps,
        };

        if self.backend == Backend::Operator {
            self.disable_ssl.get_or_insert(!secure);
        }
        if is_workbench {
            let env = self.option_env(component, option, &[hostname])?;
            self.workbench_env = self.workbench_env.merge(env);
        } else {
            let env = self.kie_server_option_env(index, option, &[hostname])?;
            if let Some(hostname_env) = self.kie_server_hostname_envs.get_mut(index) {
                *hostname_env = std::mem::take(hostname_env).merge(env);
            }
        }
        self.hostnames_set.insert((component, index));
        Ok(self)
    }

    /// Directory of the Git hooks of the Workbench repositories
    pub fn with_git_hooks_dir(mut self, dir: &str) -> Result<Self> {
        ensure!(
            self.kind.has_workbench(),
            UnexpectedComponentSnafu {
                kind: self.kind,
                component: Component::Workbench,
            }
        );

        let env = self.option_env(Component::Workbench, SettingOption::GitHooksDir, &[dir])?;
        self.workbench_env = self.workbench_env.merge(env);
        Ok(self)
    }

    /// Sets the same KIE Server id on all KIE Servers
    pub fn with_kie_server_id(mut self, kie_server_id: &str) -> Result<Self> {
        let env = self.option_env(
            Component::KieServer,
            SettingOption::KieServerId,
            &[kie_server_id],
        )?;
        self.kie_server_env = self.kie_server_env.merge(env);
        Ok(self)
    }

    fn ensure_feature(&self, feature: &'static str, supported: bool) -> Result<()> {
        ensure!(
            supported,
            UnsupportedFeatureSnafu {
                feature,
                backend: self.backend,
            }
        );
        Ok(())
    }

    /// Variables of a single option, named as the backend expects them for the component
    fn option_env(
        &self,
        component: Component,
        option: SettingOption,
        values: &[&str],
    ) -> Result<EnvVarSet> {
        let settings = SettingsBuilder::new(self.backend, self.kind.template(), component)
            .and_then(|builder| builder.set(option, values))
            .context(ApplyOptionSnafu { option })?
            .build();
        Ok(settings.into_env())
    }

    /// Variables of an option for the KIE Server at `index`
    ///
    /// Scenarios with several KIE Servers name these variables per server.
    fn kie_server_option_env(
        &self,
        index: usize,
        option: SettingOption,
        values: &[&str],
    ) -> Result<EnvVarSet> {
        if self.kind.kie_servers() == 1 {
            return self.option_env(Component::KieServer, option, values);
        }

        let settings =
            SettingsBuilder::new(self.backend, self.kind.template(), Component::KieServer)
                .and_then(|builder| builder.set_for_kie_server(index, option, values))
                .context(ApplyOptionSnafu { option })?
                .build();
        Ok(settings.into_env())
    }

    /// Users and KIE Server defaults which templates and APBs always receive
    fn default_env(&self) -> Result<EnvVarSet> {
        let credentials = &self.credentials;
        let mut env = self
            .option_env(
                Component::KieServer,
                SettingOption::KieServerUser,
                &[
                    &credentials.kie_server_user,
                    &credentials.kie_server_password,
                ],
            )?
            .merge(self.option_env(
                Component::KieServer,
                SettingOption::AdminUser,
                &[&credentials.workbench_user, &credentials.workbench_password],
            )?);
        if self.kind.has_workbench() {
            env = env.merge(self.option_env(
                Component::KieServer,
                SettingOption::ControllerUser,
                &[
                    &credentials.controller_user,
                    &credentials.controller_password,
                ],
            )?);
        }
        if self.backend == Backend::Template {
            env = env
                .merge(self.option_env(
                    Component::KieServer,
                    SettingOption::KieServerHttpsSecret,
                    &[&self.https_secret],
                )?)
                .merge(self.option_env(
                    Component::KieServer,
                    SettingOption::KieServerMode,
                    &[DEFAULT_KIE_SERVER_MODE],
                )?);
        }
        Ok(env)
    }

    pub fn build(&self) -> Result<Scenario> {
        let plan = match self.backend {
            Backend::Template => {
                let application_name = self.option_env(
                    Component::KieServer,
                    SettingOption::ApplicationName,
                    &[self.application.as_ref()],
                )?;
                Plan::Template {
                    template: self.kind.template(),
                    parameters: application_name.merge(self.merged_env()?),
                }
            }
            Backend::Apb => {
                // The plan of the scenario replaces the plans of the component settings.
                let extra_vars = self.merged_env()?;
                let extra_vars = match self.kind.template().apb_plan_id() {
                    Some(plan_id) => extra_vars.with_value("_apb_plan_id", plan_id),
                    None => extra_vars,
                };
                Plan::Apb { extra_vars }
            }
            Backend::Operator => Plan::Operator {
                kie_app: Box::new(self.kie_app()?),
            },
        };

        Ok(Scenario {
            kind: self.kind,
            backend: self.backend,
            application: self.application.clone(),
            namespace_prefix: self.namespace_prefix.clone(),
            plan,
            context: None,
            namespace: None,
            deployments: Vec::new(),
        })
    }

    /// All variables as one set for templates and APBs
    ///
    /// Component settings override the defaults. KIE Server settings are shared by all servers,
    /// only their hostnames are set per server.
    fn merged_env(&self) -> Result<EnvVarSet> {
        let all_servers_configured =
            self.kie_servers.is_empty() || self.kie_servers.len() == self.kind.kie_servers();
        self.ensure_feature("settings for only some of the KIE Servers", all_servers_configured)?;

        let workbench_env = self
            .workbench
            .iter()
            .map(|settings| settings.env().clone())
            .chain(std::iter::once(self.workbench_env.clone()))
            .filter(|_| self.kind.has_workbench());
        let kie_server_env = self
            .kie_servers
            .iter()
            .map(|settings| settings.env().clone())
            .chain(std::iter::once(self.kie_server_env.clone()))
            .chain(self.kie_server_hostname_envs.iter().cloned());
        let smart_router_env = self.smart_router.iter().map(|settings| settings.env().clone());

        Ok(std::iter::once(self.common_env.clone())
            .chain(workbench_env)
            .chain(kie_server_env)
            .chain(smart_router_env)
            .fold(self.default_env()?, EnvVarSet::merge))
    }

    /// The KieApp which describes the scenario to the operator
    fn kie_app(&self) -> Result<v2::KieApp> {
        let credentials = &self.credentials;
        let auth_env = EnvVarSet::new()
            .with_value("KIE_ADMIN_USER", &credentials.workbench_user)
            .with_value("KIE_SERVER_USER", &credentials.kie_server_user)
            .with_value("KIE_SERVER_CONTROLLER_USER", &credentials.controller_user)
            .with_value("KIE_MAVEN_USER", &credentials.workbench_user);

        let console = self.kind.has_workbench().then(|| {
            let mut console = v2::Console {
                env: auth_env.clone().into(),
                sso_client: self.sso.then(sso::workbench_client),
                ..v2::Console::default()
            };
            if let Some(settings) = &self.workbench {
                merge_env(&mut console.env, settings.env().clone());
            }
            merge_env(&mut console.env, self.workbench_env.clone());
            console
        });

        let servers = (0..self.kind.kie_servers())
            .map(|index| {
                let name = deployment::service_name(&self.application, Component::KieServer, index)
                    .context(BuildServiceNameSnafu)?;
                let mut server = v2::Server {
                    name: Some(name.to_string()),
                    env: auth_env.clone().into(),
                    sso_client: self.sso.then(|| sso::kie_server_client(index)),
                    ..v2::Server::default()
                };
                if let Some(settings) = self.kie_servers.get(index) {
                    merge_env(&mut server.env, settings.env().clone());
                }
                merge_env(&mut server.env, self.kie_server_env.clone());
                if let Some(hostname_env) = self.kie_server_hostname_envs.get(index) {
                    merge_env(&mut server.env, hostname_env.clone());
                }
                Ok(server)
            })
            .collect::<Result<Vec<_>>>()?;

        let smart_router = self.kind.has_smart_router().then(|| v2::SmartRouter {
            env: self
                .smart_router
                .as_ref()
                .map(|settings| settings.env().clone())
                .unwrap_or_default()
                .into(),
            ..v2::SmartRouter::default()
        });

        Ok(v2::KieApp {
            metadata: ObjectMeta {
                name: Some(self.application.to_string()),
                ..ObjectMeta::default()
            },
            spec: v2::KieAppSpec {
                environment: self.kind.operator_environment().map(str::to_owned),
                common_config: Some(v2::CommonConfig {
                    admin_password: Some(credentials.workbench_password.clone()),
                    server_password: Some(credentials.kie_server_password.clone()),
                    controller_password: Some(credentials.controller_password.clone()),
                    maven_password: Some(credentials.workbench_password.clone()),
                    disable_ssl: self.disable_ssl,
                    ..v2::CommonConfig::default()
                }),
                objects: v2::Objects {
                    console,
                    servers,
                    smart_router,
                    process_migration: None,
                },
                auth: (self.auth != v2::Auth::default()).then(|| self.auth.clone()),
                ..v2::KieAppSpec::default()
            },
            status: None,
        })
    }
}

/// A deployable topology of KIE components
pub struct Scenario {
    kind: ScenarioKind,
    backend: Backend,
    application: ApplicationName,
    namespace_prefix: Option<String>,
    plan: Plan,

    context: Option<Arc<Context>>,
    namespace: Option<NamespaceName>,
    deployments: Vec<Deployment>,
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The namespace the scenario is deployed into, if it is deployed
    pub fn namespace(&self) -> Option<&NamespaceName> {
        self.namespace.as_ref()
    }

    /// All deployments; empty until the scenario is deployed
    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn deployments_mut(&mut self) -> &mut [Deployment] {
        &mut self.deployments
    }

    pub fn workbench_deployment(&self) -> Option<&Deployment> {
        self.deployments_of(Component::Workbench).next()
    }

    /// The KIE Servers in the order of their settings
    pub fn kie_server_deployments(&self) -> Vec<&Deployment> {
        self.deployments_of(Component::KieServer).collect()
    }

    pub fn smart_router_deployments(&self) -> Vec<&Deployment> {
        self.deployments_of(Component::SmartRouter).collect()
    }

    fn deployments_of(&self, component: Component) -> impl Iterator<Item = &Deployment> {
        self.deployments
            .iter()
            .filter(move |deployment| deployment.component() == component)
    }

    /// Provisions the scenario into a new namespace and waits until all deployments are ready
    pub async fn deploy(&mut self, provisioner: &Provisioner) -> Result<()> {
        let context = provisioner.context().clone();
        let namespace = self.new_namespace_name()?;
        tracing::info!(
            %namespace,
            scenario = %self.kind,
            backend = %self.backend,
            "Deploying scenario"
        );

        context
            .cluster
            .create_namespace(&namespace)
            .await
            .context(CreateNamespaceSnafu {
                namespace: namespace.clone(),
            })?;
        self.namespace = Some(namespace.clone());
        self.context = Some(context.clone());

        provisioner
            .provision(&namespace, &self.plan)
            .await
            .context(ProvisionSnafu { kind: self.kind })?;

        self.deployments = self
            .kind
            .components()
            .into_iter()
            .map(|(component, index)| {
                let service = deployment::service_name(&self.application, component, index)
                    .context(BuildServiceNameSnafu)?;
                Ok(Deployment::new(
                    context.clone(),
                    self.backend,
                    component,
                    self.application.clone(),
                    namespace.clone(),
                    service,
                ))
            })
            .collect::<Result<_>>()?;

        let timeouts = &context.timeouts;
        try_join_all(self.deployments.iter().map(|deployment| async move {
            wait::wait_for(
                &format!("the deployment of {}", deployment.service_name()),
                *timeouts.reconciliation,
                *timeouts.poll_interval,
                move || async move {
                    deployment
                        .is_ready()
                        .await
                        .map(|ready| ready.then_some(()))
                },
            )
            .await
            .context(WaitForDeploymentSnafu {
                service: deployment.service_name().to_string(),
            })
        }))
        .await?;

        try_join_all(self.deployments.iter_mut().map(|deployment| async move {
            let service = deployment.service_name().to_string();
            deployment
                .wait_for_scale()
                .await
                .context(WaitForScaleSnafu { service })
        }))
        .await?;

        tracing::info!(%namespace, scenario = %self.kind, "Scenario deployed");
        Ok(())
    }

    /// Deletes the namespace of the scenario including all its resources
    pub async fn undeploy(&mut self) -> Result<()> {
        let (Some(context), Some(namespace)) = (&self.context, &self.namespace) else {
            return NotDeployedSnafu.fail();
        };

        tracing::info!(%namespace, scenario = %self.kind, "Undeploying scenario");
        context
            .cluster
            .delete_namespace(namespace)
            .await
            .context(DeleteNamespaceSnafu {
                namespace: namespace.clone(),
            })?;

        self.context = None;
        self.namespace = None;
        self.deployments.clear();
        Ok(())
    }

    fn new_namespace_name(&self) -> Result<NamespaceName> {
        let name = match &self.namespace_prefix {
            Some(prefix) => format!("{prefix}-{}", random_suffix()),
            None => random_suffix(),
        };
        NamespaceName::from_str(&name).context(BuildNamespaceNameSnafu { name: &name })
    }
}

/// Deletes the namespace of a scenario which was deployed earlier, e.g. by another process
pub async fn undeploy_namespace(context: &Context, namespace: &NamespaceName) -> Result<()> {
    context
        .cluster
        .delete_namespace(namespace)
        .await
        .context(DeleteNamespaceSnafu {
            namespace: namespace.clone(),
        })
}

/// Creates the deployment handle of a component in an existing namespace
pub fn existing_deployment(
    context: Arc<Context>,
    backend: Backend,
    component: Component,
    index: usize,
    application: &ApplicationName,
    namespace: NamespaceName,
) -> Result<Deployment> {
    let service =
        deployment::service_name(application, component, index).context(BuildServiceNameSnafu)?;
    Ok(Deployment::new(
        context,
        backend,
        component,
        application.clone(),
        namespace,
        service,
    ))
}
