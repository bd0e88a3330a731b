//! Replicas of the components inside a KieApp specification

use snafu::{OptionExt, Snafu, ensure};
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::{crd::v2, framework::ServerName, settings::backend::Component};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display(
        "Server with name {name} not found. Available server names are: {}",
        available.join(", ")
    ))]
    ServerNotFound { name: String, available: Vec<String> },

    #[snafu(display("the KieApp does not contain a {component}"))]
    ComponentNotFound { component: Component },

    #[snafu(display("the replicas of the {component} cannot be set in the KieApp"))]
    ReplicasNotSupported { component: Component },

    #[snafu(display("the replicas must not be negative, got {replicas}"))]
    NegativeReplicas { replicas: i32 },

    #[snafu(display(
        "the target replicas of {name} are unknown, neither the KieApp nor the DeploymentConfig \
         define them"
    ))]
    UnknownReplicas { name: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

fn server_not_found(objects: &v2::Objects, name: &ServerName) -> Error {
    Error::ServerNotFound {
        name: name.to_string(),
        available: objects.server_names(),
    }
}

/// Sets the replicas of the component in the objects of a KieApp
///
/// KIE Servers are located by their name, the console and the Smart Router are singletons.
pub fn set_replicas(
    objects: &mut v2::Objects,
    component: Component,
    server: &ServerName,
    replicas: i32,
) -> Result<()> {
    ensure!(replicas >= 0, NegativeReplicasSnafu { replicas });

    let target = match component {
        Component::KieServer => {
            if objects.server(server).is_none() {
                return Err(server_not_found(objects, server));
            }
            objects
                .server_mut(server)
                .map(|server| &mut server.replicas)
        }
        Component::Workbench => objects
            .console
            .as_mut()
            .map(|console| &mut console.replicas),
        Component::SmartRouter => objects
            .smart_router
            .as_mut()
            .map(|smart_router| &mut smart_router.replicas),
        Component::Controller | Component::ProcessMigration => {
            return ReplicasNotSupportedSnafu { component }.fail();
        }
    };

    *target.context(ComponentNotFoundSnafu { component })? = Some(replicas);

    Ok(())
}

/// Replicas of the component as defined in the objects of a KieApp
///
/// Returns `None` if the entry does not define replicas. A KIE Server name which is not part of
/// the objects is an error.
pub fn replicas(
    objects: &v2::Objects,
    component: Component,
    server: &ServerName,
) -> Result<Option<i32>> {
    Ok(match component {
        Component::KieServer => {
            objects
                .server(server)
                .ok_or_else(|| server_not_found(objects, server))?
                .replicas
        }
        Component::Workbench => objects.console.as_ref().and_then(|console| console.replicas),
        Component::SmartRouter => objects
            .smart_router
            .as_ref()
            .and_then(|smart_router| smart_router.replicas),
        Component::Controller | Component::ProcessMigration => None,
    })
}

/// The number of Pods a deployment is expected to run
///
/// The specification applied by the operator takes precedence, because it includes the defaults
/// of the operator. The live DeploymentConfig is used as long as the applied specification does
/// not define the replicas.
pub fn resolve_target_replicas(
    applied: Option<&v2::KieAppSpec>,
    component: Component,
    server: &ServerName,
    live_replicas: Option<i32>,
) -> Result<i32> {
    let applied_replicas = match applied {
        Some(applied) => replicas(&applied.objects, component, server)?,
        None => None,
    };

    applied_replicas
        .or(live_replicas)
        .context(UnknownReplicasSnafu {
            name: server.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ErrorDiscriminants, replicas, resolve_target_replicas, set_replicas};
    use crate::{crd::v2, framework::ServerName, settings::backend::Component};

    fn objects() -> v2::Objects {
        serde_json::from_value(json!({
            "console": { "replicas": 1 },
            "servers": [
                { "name": "server-A", "replicas": 2 },
                { "name": "server-B" }
            ]
        }))
        .expect("should be valid objects")
    }

    #[test]
    fn test_set_replicas() {
        let mut objects = objects();

        set_replicas(
            &mut objects,
            Component::KieServer,
            &ServerName::from_str_unsafe("server-b"),
            3,
        )
        .map_err(ErrorDiscriminants::from)
        .expect_err("server names are case sensitive");

        set_replicas(
            &mut objects,
            Component::Workbench,
            &ServerName::from_str_unsafe("ignored"),
            0,
        )
        .expect("should find the console");
        assert_eq!(Some(0), objects.console.as_ref().and_then(|c| c.replicas));

        assert_eq!(
            Err(ErrorDiscriminants::ComponentNotFound),
            set_replicas(
                &mut objects,
                Component::SmartRouter,
                &ServerName::from_str_unsafe("ignored"),
                1
            )
            .map_err(ErrorDiscriminants::from)
        );
        assert_eq!(
            Err(ErrorDiscriminants::NegativeReplicas),
            set_replicas(
                &mut objects,
                Component::Workbench,
                &ServerName::from_str_unsafe("ignored"),
                -1
            )
            .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_unknown_server_names_the_available_servers() {
        let mut objects = serde_json::from_value::<v2::Objects>(json!({
            "servers": [{ "name": "server-a" }, { "name": "server-b" }]
        }))
        .expect("should be valid objects");

        let error = set_replicas(
            &mut objects,
            Component::KieServer,
            &ServerName::from_str_unsafe("server-x"),
            2,
        )
        .expect_err("server-x does not exist");

        assert_eq!(
            "Server with name server-x not found. Available server names are: server-a, server-b",
            error.to_string()
        );
        assert_eq!(
            Err(ErrorDiscriminants::ServerNotFound),
            replicas(
                &objects,
                Component::KieServer,
                &ServerName::from_str_unsafe("server-x")
            )
            .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_target_replicas_prefer_the_applied_specification() {
        let applied = v2::KieAppSpec {
            objects: serde_json::from_value(json!({
                "servers": [
                    { "name": "myapp-kieserver", "replicas": 2 },
                    { "name": "myapp-kieserver-2" }
                ]
            }))
            .expect("should be valid objects"),
            ..v2::KieAppSpec::default()
        };
        let server = ServerName::from_str_unsafe("myapp-kieserver");
        let second_server = ServerName::from_str_unsafe("myapp-kieserver-2");

        assert_eq!(
            Ok(2),
            resolve_target_replicas(Some(&applied), Component::KieServer, &server, Some(1))
                .map_err(ErrorDiscriminants::from)
        );
        // The applied specification does not define the replicas yet.
        assert_eq!(
            Ok(1),
            resolve_target_replicas(
                Some(&applied),
                Component::KieServer,
                &second_server,
                Some(1)
            )
            .map_err(ErrorDiscriminants::from)
        );
        // The operator did not report an applied specification yet.
        assert_eq!(
            Ok(1),
            resolve_target_replicas(None, Component::KieServer, &server, Some(1))
                .map_err(ErrorDiscriminants::from)
        );
        assert_eq!(
            Err(ErrorDiscriminants::UnknownReplicas),
            resolve_target_replicas(None, Component::KieServer, &server, None)
                .map_err(ErrorDiscriminants::from)
        );
    }
}
