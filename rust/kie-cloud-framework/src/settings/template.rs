use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Deployment descriptions the settings are applied to
///
/// For the template backend, each variant names an OpenShift template whose URL is configured
/// under the property key of the variant. The APB backend selects the matching plan of the APB
/// image instead, and the operator backend uses the variant only to identify the component.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, IntoStaticStr, Ord, PartialEq,
    PartialOrd,
)]
pub enum Template {
    #[strum(serialize = "kie.app.template.workbench.kie-server")]
    WorkbenchKieServer,
    #[strum(serialize = "kie.app.template.workbench.kie-server.persistent")]
    WorkbenchKieServerPersistent,
    #[strum(serialize = "kie.app.template.kie-server")]
    KieServer,
    #[strum(serialize = "kie.app.template.kie-server-https-s2i")]
    KieServerHttpsS2I,
    #[strum(serialize = "kie.app.template.workbench")]
    Workbench,
    #[strum(serialize = "kie.app.template.workbench-monitoring")]
    Console,
    #[strum(serialize = "kie.app.template.smartrouter")]
    SmartRouter,
    #[strum(serialize = "kie.app.template.controller")]
    Controller,
    #[strum(
        serialize = "kie.app.template.clustered-workbench-monitoring.smartrouter.two-kieservers.two-databases"
    )]
    ClusteredConsoleSmartRouterTwoKieServersTwoDatabases,
}

impl Template {
    /// Key of the property which contains the URL of the template
    pub fn property_key(&self) -> &'static str {
        self.into()
    }

    /// The plan of the APB image which deploys the same topology
    pub fn apb_plan_id(&self) -> Option<&'static str> {
        match self {
            Template::WorkbenchKieServer => Some("trial"),
            Template::WorkbenchKieServerPersistent | Template::Workbench => Some("authoring"),
            Template::KieServer | Template::KieServerHttpsS2I => Some("immutable-kie"),
            Template::Console | Template::SmartRouter => Some("immutable-mon"),
            Template::ClusteredConsoleSmartRouterTwoKieServersTwoDatabases => Some("managed"),
            Template::Controller => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::Template;

    #[test]
    fn test_property_keys_round_trip() {
        for template in Template::iter() {
            assert_eq!(
                Ok(template),
                Template::from_str(template.property_key()),
                "{template:?}"
            );
        }
        assert!(Template::from_str("kie.app.template.unknown").is_err());
    }

    #[test]
    fn test_apb_plans() {
        assert_eq!(Some("immutable-kie"), Template::KieServerHttpsS2I.apb_plan_id());
        assert_eq!(None, Template::Controller.apb_plan_id());
    }
}
