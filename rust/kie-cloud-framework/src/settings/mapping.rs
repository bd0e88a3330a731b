//! Translation of setting options into the variable names of the backends
//!
//! The variable names are fixed by the templates, the APB image and the KIE images. They must
//! match exactly.

use strum::{Display, EnumIter};

use super::backend::Backend;

/// How an option is expressed by a backend
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mapping {
    /// The option values are stored under these keys, in the given order.
    Keys(&'static [&'static str]),

    /// The backend configures this on its own; the option is skipped with a warning.
    Ignored,

    /// The backend cannot express the option.
    Unsupported,
}

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum SettingOption {
    AdminUser,
    ApplicationName,
    KieServerUser,
    ControllerUser,
    ControllerProtocol,
    ControllerService,
    ControllerConnection,
    SmartRouterService,
    SmartRouterConnection,
    ContainerDeployment,
    SourceLocation,
    ArtifactDir,
    MavenRepoUrl,
    MavenRepoUser,
    KieServerSyncDeploy,
    DroolsServerFilterClasses,
    KieServerHttpsSecret,
    KieServerId,
    KieServerMode,
    KieServerHostnameHttp,
    KieServerHostnameHttps,
    WorkbenchHostnameHttp,
    WorkbenchHostnameHttps,
    WorkbenchMavenUser,
    GitHooksDir,
    SmartRouterId,
    SmartRouterName,
    SmartRouterExternalUrl,
    SmartRouterHostnameHttp,
    SmartRouterHostnameHttps,
    ControllerHostnameHttp,
}

impl SettingOption {
    pub fn mapping(&self, backend: Backend) -> Mapping {
        match backend {
            Backend::Template => self.template_mapping(),
            Backend::Apb => self.apb_mapping(),
            Backend::Operator => self.operator_mapping(),
        }
    }

    /// Keys of an option for one KIE Server of a scenario with several KIE Servers
    ///
    /// The templates of such scenarios take a route hostname per KIE Server. All other KIE Server
    /// options are shared by the servers and cannot be set for a single one.
    pub fn kie_server_mapping(&self, backend: Backend, index: usize) -> Mapping {
        match (backend, self, index) {
            (Backend::Template, SettingOption::KieServerHostnameHttp, 0) => {
                Mapping::Keys(&["KIE_SERVER1_HOSTNAME_HTTP"])
            }
            (Backend::Template, SettingOption::KieServerHostnameHttps, 0) => {
                Mapping::Keys(&["KIE_SERVER1_HOSTNAME_HTTPS"])
            }
            (Backend::Template, SettingOption::KieServerHostnameHttp, 1) => {
                Mapping::Keys(&["KIE_SERVER2_HOSTNAME_HTTP"])
            }
            (Backend::Template, SettingOption::KieServerHostnameHttps, 1) => {
                Mapping::Keys(&["KIE_SERVER2_HOSTNAME_HTTPS"])
            }
            // Every server of a KieApp has its own environment.
            (Backend::Operator, _, _) => self.mapping(backend),
            _ => match self.mapping(backend) {
                Mapping::Ignored => Mapping::Ignored,
                _ => Mapping::Unsupported,
            },
        }
    }

    /// Parameters of the OpenShift templates
    fn template_mapping(&self) -> Mapping {
        Mapping::Keys(match self {
            SettingOption::AdminUser => &["KIE_ADMIN_USER", "KIE_ADMIN_PWD"],
            SettingOption::ApplicationName => &["APPLICATION_NAME"],
            SettingOption::KieServerUser => &["KIE_SERVER_USER", "KIE_SERVER_PWD"],
            SettingOption::ControllerUser => {
                &["KIE_SERVER_CONTROLLER_USER", "KIE_SERVER_CONTROLLER_PWD"]
            }
            SettingOption::ControllerProtocol => &["KIE_SERVER_CONTROLLER_PROTOCOL"],
            SettingOption::ControllerService => &["KIE_SERVER_CONTROLLER_SERVICE"],
            SettingOption::ControllerConnection => {
                &["KIE_SERVER_CONTROLLER_HOST", "KIE_SERVER_CONTROLLER_PORT"]
            }
            SettingOption::SmartRouterService => &["KIE_SERVER_ROUTER_SERVICE"],
            SettingOption::SmartRouterConnection => {
                &["KIE_SERVER_ROUTER_HOST", "KIE_SERVER_ROUTER_PORT"]
            }
            SettingOption::ContainerDeployment => &["KIE_SERVER_CONTAINER_DEPLOYMENT"],
            SettingOption::SourceLocation => {
                &["SOURCE_REPOSITORY_URL", "SOURCE_REPOSITORY_REF", "CONTEXT_DIR"]
            }
            SettingOption::ArtifactDir => &["ARTIFACT_DIR"],
            SettingOption::MavenRepoUrl => &["MAVEN_REPO_URL"],
            SettingOption::MavenRepoUser => &["MAVEN_REPO_USERNAME", "MAVEN_REPO_PASSWORD"],
            SettingOption::KieServerSyncDeploy => &["KIE_SERVER_SYNC_DEPLOY"],
            SettingOption::DroolsServerFilterClasses => &["DROOLS_SERVER_FILTER_CLASSES"],
            SettingOption::KieServerHttpsSecret => &["KIE_SERVER_HTTPS_SECRET"],
            SettingOption::KieServerId => &["KIE_SERVER_ID"],
            SettingOption::KieServerMode => &["KIE_SERVER_MODE"],
            SettingOption::KieServerHostnameHttp => &["KIE_SERVER_HOSTNAME_HTTP"],
            SettingOption::KieServerHostnameHttps => &["KIE_SERVER_HOSTNAME_HTTPS"],
            SettingOption::WorkbenchHostnameHttp => &["BUSINESS_CENTRAL_HOSTNAME_HTTP"],
            SettingOption::WorkbenchHostnameHttps => &["BUSINESS_CENTRAL_HOSTNAME_HTTPS"],
            SettingOption::WorkbenchMavenUser => &["KIE_MAVEN_USER", "KIE_MAVEN_PWD"],
            SettingOption::GitHooksDir => &["GIT_HOOKS_DIR"],
            SettingOption::SmartRouterId => &["KIE_SERVER_ROUTER_ID"],
            SettingOption::SmartRouterName => &["KIE_SERVER_ROUTER_NAME"],
            SettingOption::SmartRouterExternalUrl => &["KIE_SERVER_ROUTER_URL_EXTERNAL"],
            SettingOption::SmartRouterHostnameHttp => &["SMART_ROUTER_HOSTNAME_HTTP"],
            SettingOption::SmartRouterHostnameHttps => &["SMART_ROUTER_HOSTNAME_HTTPS"],
            SettingOption::ControllerHostnameHttp => &["CONTROLLER_HOSTNAME_HTTP"],
        })
    }

    /// Extra vars of the APB image
    fn apb_mapping(&self) -> Mapping {
        match self {
            SettingOption::AdminUser => {
                Mapping::Keys(&["apb_kie_admin_user", "apb_kie_admin_pwd"])
            }
            SettingOption::KieServerUser => {
                Mapping::Keys(&["apb_kieserver_user", "apb_kieserver_pwd"])
            }
            SettingOption::ControllerUser => {
                Mapping::Keys(&["apb_controller_user", "apb_controller_pwd"])
            }
            SettingOption::ControllerProtocol => Mapping::Keys(&["apb_controller_protocol"]),
            SettingOption::ControllerService => Mapping::Keys(&["apb_controller_svc"]),
            SettingOption::ControllerConnection => {
                Mapping::Keys(&["apb_controller_host", "apb_controller_port"])
            }
            SettingOption::SmartRouterService => Mapping::Keys(&["apb_router_svc"]),
            SettingOption::SmartRouterConnection => {
                Mapping::Keys(&["apb_router_host", "apb_router_port"])
            }
            SettingOption::ContainerDeployment => {
                Mapping::Keys(&["apb_kieserver_container_deployment"])
            }
            SettingOption::SourceLocation => Mapping::Keys(&[
                "apb_kieserver_source_url",
                "apb_kieserver_source_ref",
                "apb_kieserver_source_context",
            ]),
            SettingOption::ArtifactDir => Mapping::Keys(&["apb_kieserver_artifact_dir"]),
            SettingOption::MavenRepoUrl => Mapping::Keys(&["apb_maven_repo_url"]),
            SettingOption::MavenRepoUser => {
                Mapping::Keys(&["apb_maven_repo_user", "apb_maven_repo_pwd"])
            }
            SettingOption::KieServerHostnameHttps => Mapping::Keys(&["apb_kieserver_hostname"]),
            SettingOption::WorkbenchHostnameHttps => {
                Mapping::Keys(&["apb_businesscentral_hostname"])
            }
            SettingOption::WorkbenchMavenUser => Mapping::Keys(&[
                "apb_businesscentral_maven_repo_user",
                "apb_businesscentral_maven_repo_pwd",
            ]),
            SettingOption::GitHooksDir => Mapping::Keys(&["apb_git_hooks_dir"]),
            SettingOption::SmartRouterHostnameHttps => {
                Mapping::Keys(&["apb_smartrouter_hostname"])
            }
            // The APB image creates plain HTTP routes with generated hostnames.
            SettingOption::KieServerHostnameHttp
            | SettingOption::WorkbenchHostnameHttp
            | SettingOption::SmartRouterHostnameHttp => Mapping::Ignored,
            SettingOption::ApplicationName
            | SettingOption::KieServerSyncDeploy
            | SettingOption::DroolsServerFilterClasses
            | SettingOption::KieServerHttpsSecret
            | SettingOption::KieServerId
            | SettingOption::KieServerMode
            | SettingOption::SmartRouterId
            | SettingOption::SmartRouterName
            | SettingOption::SmartRouterExternalUrl
            | SettingOption::ControllerHostnameHttp => Mapping::Unsupported,
        }
    }

    /// Environment variables of the KIE images, attached to the KieApp components
    fn operator_mapping(&self) -> Mapping {
        match self {
            SettingOption::MavenRepoUrl => Mapping::Keys(&["EXTERNAL_MAVEN_REPO_URL"]),
            SettingOption::MavenRepoUser => Mapping::Keys(&[
                "EXTERNAL_MAVEN_REPO_USERNAME",
                "EXTERNAL_MAVEN_REPO_PASSWORD",
            ]),
            SettingOption::KieServerHostnameHttp
            | SettingOption::WorkbenchHostnameHttp
            | SettingOption::SmartRouterHostnameHttp => Mapping::Keys(&["HOSTNAME_HTTP"]),
            SettingOption::KieServerHostnameHttps
            | SettingOption::WorkbenchHostnameHttps
            | SettingOption::SmartRouterHostnameHttps => Mapping::Keys(&["HOSTNAME_HTTPS"]),
            // The operator derives these from the KieApp itself.
            SettingOption::ApplicationName
            | SettingOption::SourceLocation
            | SettingOption::ArtifactDir
            | SettingOption::KieServerHttpsSecret
            | SettingOption::ControllerHostnameHttp => Mapping::Unsupported,
            _ => self.template_mapping(),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::{Mapping, SettingOption};
    use crate::settings::backend::Backend;

    #[test]
    fn test_template_supports_every_option() {
        for option in SettingOption::iter() {
            assert!(
                matches!(option.mapping(Backend::Template), Mapping::Keys(_)),
                "{option}"
            );
        }
    }

    #[test]
    fn test_apb_mapping() {
        assert_eq!(
            Mapping::Keys(&["apb_kieserver_user", "apb_kieserver_pwd"]),
            SettingOption::KieServerUser.mapping(Backend::Apb)
        );
        assert_eq!(
            Mapping::Ignored,
            SettingOption::KieServerHostnameHttp.mapping(Backend::Apb)
        );
        assert_eq!(
            Mapping::Unsupported,
            SettingOption::ApplicationName.mapping(Backend::Apb)
        );
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(
            Mapping::Keys(&["HOSTNAME_HTTPS"]),
            SettingOption::WorkbenchHostnameHttps.mapping(Backend::Operator)
        );
        assert_eq!(
            Mapping::Keys(&["KIE_SERVER_ID"]),
            SettingOption::KieServerId.mapping(Backend::Operator)
        );
        assert_eq!(
            Mapping::Unsupported,
            SettingOption::SourceLocation.mapping(Backend::Operator)
        );
    }

    #[test]
    fn test_kie_server_mapping() {
        assert_eq!(
            Mapping::Keys(&["KIE_SERVER1_HOSTNAME_HTTPS"]),
            SettingOption::KieServerHostnameHttps.kie_server_mapping(Backend::Template, 0)
        );
        assert_eq!(
            Mapping::Keys(&["KIE_SERVER2_HOSTNAME_HTTP"]),
            SettingOption::KieServerHostnameHttp.kie_server_mapping(Backend::Template, 1)
        );
        assert_eq!(
            Mapping::Unsupported,
            SettingOption::KieServerHostnameHttp.kie_server_mapping(Backend::Template, 2)
        );
        assert_eq!(
            Mapping::Unsupported,
            SettingOption::ContainerDeployment.kie_server_mapping(Backend::Template, 0)
        );
        assert_eq!(
            Mapping::Unsupported,
            SettingOption::KieServerHostnameHttps.kie_server_mapping(Backend::Apb, 1)
        );
        assert_eq!(
            Mapping::Ignored,
            SettingOption::KieServerHostnameHttp.kie_server_mapping(Backend::Apb, 1)
        );
        assert_eq!(
            Mapping::Keys(&["HOSTNAME_HTTP"]),
            SettingOption::KieServerHostnameHttp.kie_server_mapping(Backend::Operator, 1)
        );
    }

    #[test]
    fn test_keys_of_an_option_have_the_same_arity_for_all_backends() {
        for option in SettingOption::iter() {
            let Mapping::Keys(template_keys) = option.mapping(Backend::Template) else {
                unreachable!("every option is supported by templates");
            };
            for backend in [Backend::Apb, Backend::Operator] {
                if let Mapping::Keys(keys) = option.mapping(backend) {
                    assert_eq!(template_keys.len(), keys.len(), "{option} for {backend}");
                }
            }
        }
    }
}
