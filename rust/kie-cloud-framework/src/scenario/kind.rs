use strum::{Display, EnumIter, EnumString};

use crate::settings::{
    backend::{Backend, Component},
    template::Template,
};

/// Topologies which can be deployed as a whole
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq, clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ScenarioKind {
    /// Workbench and one KIE Server without persistent storage
    WorkbenchKieServer,

    /// Workbench with a persistent repository and one KIE Server
    WorkbenchKieServerPersistent,

    /// A single KIE Server
    KieServer,

    /// Clustered monitoring console, Smart Router and two KIE Servers with their own databases
    ClusteredWorkbenchSmartRouterTwoKieServers,
}

impl ScenarioKind {
    /// The template which deploys the whole scenario, also used to select the APB plan
    pub fn template(&self) -> Template {
        match self {
            ScenarioKind::WorkbenchKieServer => Template::WorkbenchKieServer,
            ScenarioKind::WorkbenchKieServerPersistent => Template::WorkbenchKieServerPersistent,
            ScenarioKind::KieServer => Template::KieServer,
            ScenarioKind::ClusteredWorkbenchSmartRouterTwoKieServers => {
                Template::ClusteredConsoleSmartRouterTwoKieServersTwoDatabases
            }
        }
    }

    /// The environment of the KIE operator, if the operator can deploy this scenario
    pub fn operator_environment(&self) -> Option<&'static str> {
        match self {
            ScenarioKind::WorkbenchKieServer | ScenarioKind::KieServer => Some("rhpam-trial"),
            ScenarioKind::WorkbenchKieServerPersistent => Some("rhpam-authoring"),
            ScenarioKind::ClusteredWorkbenchSmartRouterTwoKieServers => None,
        }
    }

    pub fn is_supported_by(&self, backend: Backend) -> bool {
        match backend {
            Backend::Template | Backend::Apb => true,
            Backend::Operator => self.operator_environment().is_some(),
        }
    }

    pub fn has_workbench(&self) -> bool {
        !matches!(self, ScenarioKind::KieServer)
    }

    pub fn has_smart_router(&self) -> bool {
        matches!(self, ScenarioKind::ClusteredWorkbenchSmartRouterTwoKieServers)
    }

    pub fn kie_servers(&self) -> usize {
        match self {
            ScenarioKind::ClusteredWorkbenchSmartRouterTwoKieServers => 2,
            _ => 1,
        }
    }

    /// The deployed components with their position among components of the same kind
    pub fn components(&self) -> Vec<(Component, usize)> {
        let workbench = self
            .has_workbench()
            .then_some((Component::Workbench, 0));
        let smart_router = self
            .has_smart_router()
            .then_some((Component::SmartRouter, 0));
        let kie_servers = (0..self.kie_servers()).map(|index| (Component::KieServer, index));

        workbench
            .into_iter()
            .chain(smart_router)
            .chain(kie_servers)
            .collect()
    }
}
