use super::{
    DeploymentSettings, Result, SettingsBuilder,
    backend::{Backend, Component},
    delegate_settings_builder,
    mapping::SettingOption,
    template::Template,
};
use crate::{config::Credentials, framework::types::common::Port};

/// Database the APB image provisions for the KIE Server
const APB_KIE_SERVER_DB_TYPE: &str = "postgresql";
const APB_IMAGE_STREAM_TAG: &str = "1.0";

/// Settings of a KIE Server
#[derive(Clone, Debug)]
pub struct KieServerSettingsBuilder {
    builder: SettingsBuilder,
}

delegate_settings_builder!(KieServerSettingsBuilder);

impl KieServerSettingsBuilder {
    /// KIE Server from a prebuilt image
    pub fn new(backend: Backend, credentials: &Credentials) -> Result<Self> {
        Self::with_template(backend, Template::KieServer, credentials)
    }

    /// KIE Server built from sources with S2I, exposed via HTTPS
    pub fn s2i(backend: Backend, credentials: &Credentials) -> Result<Self> {
        Self::with_template(backend, Template::KieServerHttpsS2I, credentials)
    }

    fn with_template(
        backend: Backend,
        template: Template,
        credentials: &Credentials,
    ) -> Result<Self> {
        let builder = SettingsBuilder::new(backend, template, Component::KieServer)?;

        let builder = match backend {
            Backend::Template => builder.set(
                SettingOption::KieServerUser,
                &[
                    &credentials.kie_server_user,
                    &credentials.kie_server_password,
                ],
            )?,
            Backend::Apb => {
                let builder = match template.apb_plan_id() {
                    Some(plan_id) => builder.with_value("_apb_plan_id", plan_id),
                    None => builder,
                };
                builder
                    .with_value("apb_kieserver_db_type", APB_KIE_SERVER_DB_TYPE)
                    .with_value("apb_image_stream_tag", APB_IMAGE_STREAM_TAG)
                    .set(
                        SettingOption::KieServerUser,
                        &[
                            &credentials.kie_server_user,
                            &credentials.kie_server_password,
                        ],
                    )?
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
            }
            // The users of operator managed deployments are configured in the KieApp.
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

    pub fn with_kie_server_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::KieServerUser, &[user, password])
    }

    pub fn with_controller_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::ControllerUser, &[user, password])
    }

    /// Protocol used to connect to the controller, e.g. "ws" for web sockets
    pub fn with_controller_protocol(self, protocol: &str) -> Result<Self> {
        self.set(SettingOption::ControllerProtocol, &[protocol])
    }

    pub fn with_controller_service(self, service: &str) -> Result<Self> {
        self.set(SettingOption::ControllerService, &[service])
    }

    pub fn with_controller_connection(self, host: &str, port: Port) -> Result<Self> {
        self.set(
            SettingOption::ControllerConnection,
            &[host, &port.to_string()],
        )
    }

    pub fn with_smart_router_service(self, service: &str) -> Result<Self> {
        self.set(SettingOption::SmartRouterService, &[service])
    }

    pub fn with_smart_router_connection(self, host: &str, port: Port) -> Result<Self> {
        self.set(
            SettingOption::SmartRouterConnection,
            &[host, &port.to_string()],
        )
    }

    /// KJARs to deploy, e.g. "container=org.kie:definitions:1.0|container2=org.kie:other:1.0"
    pub fn with_container_deployment(self, container_deployment: &str) -> Result<Self> {
        self.set(SettingOption::ContainerDeployment, &[container_deployment])
    }

    /// Git repository the S2I build takes the sources from
    pub fn with_source_location(
        self,
        repository_url: &str,
        reference: &str,
        context_dir: &str,
    ) -> Result<Self> {
        self.set(
            SettingOption::SourceLocation,
            &[repository_url, reference, context_dir],
        )
    }

    /// Git repository of a multi module build; the artifacts are taken from `artifact_dir`
    pub fn with_source_location_and_artifact_dir(
        self,
        repository_url: &str,
        reference: &str,
        context_dir: &str,
        artifact_dir: &str,
    ) -> Result<Self> {
        self.with_source_location(repository_url, reference, context_dir)?
            .set(SettingOption::ArtifactDir, &[artifact_dir])
    }

    pub fn with_maven_repo_url(self, url: &str) -> Result<Self> {
        self.set(SettingOption::MavenRepoUrl, &[url])
    }

    pub fn with_maven_repo_user(self, user: &str, password: &str) -> Result<Self> {
        self.set(SettingOption::MavenRepoUser, &[user, password])
    }

    pub fn with_kie_server_sync_deploy(self, sync_deploy: bool) -> Result<Self> {
        self.set(
            SettingOption::KieServerSyncDeploy,
            &[&sync_deploy.to_string()],
        )
    }

    pub fn with_drools_server_filter_classes(self, filter_classes: bool) -> Result<Self> {
        self.set(
            SettingOption::DroolsServerFilterClasses,
            &[&filter_classes.to_string()],
        )
    }

    /// Secret containing the keystore of the HTTPS endpoint
    pub fn with_kie_server_secret(self, secret_name: &str) -> Result<Self> {
        self.set(SettingOption::KieServerHttpsSecret, &[secret_name])
    }

    pub fn with_kie_server_id(self, id: &str) -> Result<Self> {
        self.set(SettingOption::KieServerId, &[id])
    }

    /// "development" or "production"
    pub fn with_kie_server_mode(self, mode: &str) -> Result<Self> {
        self.set(SettingOption::KieServerMode, &[mode])
    }

    pub fn with_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::KieServerHostnameHttp, &[hostname])
    }

    pub fn with_secured_hostname(self, hostname: &str) -> Result<Self> {
        self.set(SettingOption::KieServerHostnameHttps, &[hostname])
    }
}

impl From<KieServerSettingsBuilder> for DeploymentSettings {
    fn from(value: KieServerSettingsBuilder) -> Self {
        value.build()
    }
}

#[cfg(test)]
mod tests {
    use super::KieServerSettingsBuilder;
    use crate::{
        config::tests::test_config,
        framework::types::common::Port,
        settings::{ErrorDiscriminants, backend::Backend, template::Template},
    };

    #[test]
    fn test_template_defaults() {
        let config = test_config(&[]);
        let settings = KieServerSettingsBuilder::new(Backend::Template, &config.credentials)
            .expect("should be supported")
            .build();

        assert_eq!(Template::KieServer, settings.template());
        assert_eq!(
            vec![
                ("KIE_SERVER_PWD", "usetheforce123@"),
                ("KIE_SERVER_USER", "yoda")
            ],
            settings.env().values().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_template_options() {
        let config = test_config(&[]);
        let settings = KieServerSettingsBuilder::s2i(Backend::Template, &config.credentials)
            .and_then(|builder| builder.with_application_name("myapp"))
            .and_then(|builder| builder.with_controller_connection("controller", Port(8080)))
            .and_then(|builder| {
                builder.with_source_location_and_artifact_dir(
                    "https://github.com/jboss-container-images/rhpam-7-openshift-image",
                    "main",
                    "quickstarts/library-process",
                    "library/target",
                )
            })
            .and_then(|builder| builder.with_kie_server_sync_deploy(true))
            .and_then(|builder| builder.with_secured_hostname("secure-kieserver.example.com"))
            .expect("should be supported")
            .build();

        assert_eq!(Template::KieServerHttpsS2I, settings.template());
        assert_eq!(Some("myapp"), settings.get("APPLICATION_NAME"));
        assert_eq!(Some("controller"), settings.get("KIE_SERVER_CONTROLLER_HOST"));
        assert_eq!(Some("8080"), settings.get("KIE_SERVER_CONTROLLER_PORT"));
        assert_eq!(Some("main"), settings.get("SOURCE_REPOSITORY_REF"));
        assert_eq!(
            Some("quickstarts/library-process"),
            settings.get("CONTEXT_DIR")
        );
        assert_eq!(Some("library/target"), settings.get("ARTIFACT_DIR"));
        assert_eq!(Some("true"), settings.get("KIE_SERVER_SYNC_DEPLOY"));
        assert_eq!(
            Some("secure-kieserver.example.com"),
            settings.get("KIE_SERVER_HOSTNAME_HTTPS")
        );
    }

    #[test]
    fn test_apb_defaults_and_options() {
        let config = test_config(&[]);
        let builder = KieServerSettingsBuilder::s2i(Backend::Apb, &config.credentials)
            .expect("should be supported");

        let settings = builder
            .clone()
            .with_maven_repo_user("maven", "secret")
            .and_then(|builder| builder.with_hostname("ignored.example.com"))
            .expect("should be supported")
            .build();

        assert_eq!(Some("immutable-kie"), settings.get("_apb_plan_id"));
        assert_eq!(Some("postgresql"), settings.get("apb_kieserver_db_type"));
        assert_eq!(Some("1.0"), settings.get("apb_image_stream_tag"));
        assert_eq!(Some("yoda"), settings.get("apb_kieserver_user"));
        assert_eq!(Some("adminUser"), settings.get("apb_kie_admin_user"));
        assert_eq!(Some("maven"), settings.get("apb_maven_repo_user"));
        assert_eq!(Some("secret"), settings.get("apb_maven_repo_pwd"));
        // The plain HTTP hostname is skipped.
        assert_eq!(builder.build().env().len() + 2, settings.env().len());

        for result in [
            builder.clone().with_application_name("myapp"),
            builder.clone().with_kie_server_sync_deploy(true),
            builder.clone().with_drools_server_filter_classes(false),
            builder.clone().with_kie_server_secret("kieserver-secret"),
        ] {
            assert_eq!(
                Err(ErrorDiscriminants::Unsupported),
                result.map(|_| ()).map_err(ErrorDiscriminants::from)
            );
        }
    }

    #[test]
    fn test_operator_options() {
        let config = test_config(&[]);
        let settings = KieServerSettingsBuilder::new(Backend::Operator, &config.credentials)
            .and_then(|builder| builder.with_kie_server_id("kieserver-1"))
            .and_then(|builder| builder.with_maven_repo_url("http://nexus/repository"))
            .and_then(|builder| builder.with_hostname("kieserver.example.com"))
            .expect("should be supported")
            .build();

        assert_eq!(
            vec![
                ("EXTERNAL_MAVEN_REPO_URL", "http://nexus/repository"),
                ("HOSTNAME_HTTP", "kieserver.example.com"),
                ("KIE_SERVER_ID", "kieserver-1"),
            ],
            settings.env().values().collect::<Vec<_>>()
        );
    }
}
