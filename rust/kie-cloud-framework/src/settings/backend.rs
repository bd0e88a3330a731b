use strum::{Display, EnumIter, EnumString};

/// Provisioning backends
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum Backend {
    /// OpenShift templates processed with the command line client
    #[strum(serialize = "Template")]
    Template,

    /// Ansible Playbook Bundle, configured with extra vars
    #[strum(serialize = "APB")]
    Apb,

    /// KIE operator, configured with a KieApp custom resource
    #[strum(serialize = "Operator")]
    Operator,
}

/// Deployable KIE components
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq, clap::ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Component {
    KieServer,
    Workbench,
    SmartRouter,
    Controller,
    ProcessMigration,
}

/// What a backend is able to configure
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Capabilities {
    /// Components which can be configured with settings builders
    pub settings_components: &'static [Component],
    pub ldap: bool,
    pub sso: bool,
    pub external_maven_repo: bool,
    pub route_hostnames: bool,
    /// Components whose replicas can be changed after the deployment
    pub scalable_components: &'static [Component],
}

const TEMPLATE_CAPABILITIES: Capabilities = Capabilities {
    settings_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
        Component::Controller,
    ],
    ldap: true,
    sso: true,
    external_maven_repo: true,
    route_hostnames: true,
    scalable_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
        Component::Controller,
        Component::ProcessMigration,
    ],
};

const APB_CAPABILITIES: Capabilities = Capabilities {
    settings_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
    ],
    ldap: true,
    sso: true,
    external_maven_repo: true,
    route_hostnames: true,
    scalable_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
    ],
};

const OPERATOR_CAPABILITIES: Capabilities = Capabilities {
    settings_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
    ],
    ldap: true,
    sso: true,
    external_maven_repo: true,
    route_hostnames: true,
    // The operator does not expose the replicas of the process migration.
    scalable_components: &[
        Component::KieServer,
        Component::Workbench,
        Component::SmartRouter,
    ],
};

impl Backend {
    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            Backend::Template => &TEMPLATE_CAPABILITIES,
            Backend::Apb => &APB_CAPABILITIES,
            Backend::Operator => &OPERATOR_CAPABILITIES,
        }
    }
}

impl Capabilities {
    pub fn supports_settings(&self, component: Component) -> bool {
        self.settings_components.contains(&component)
    }

    pub fn supports_scaling(&self, component: Component) -> bool {
        self.scalable_components.contains(&component)
    }
}
