//! Minimal models of the OpenShift resources the deployments are observed through
//!
//! Only the fields which are read are modeled. These resources are never replaced as a whole,
//! but patched, so that the omitted fields are preserved.

use serde::{Deserialize, Serialize};
use stackable_operator::kube::CustomResource;

/// An OpenShift route exposing a service
#[derive(Clone, CustomResource, Debug, Default, Deserialize, PartialEq, Serialize)]
#[kube(
    group = "route.openshift.io",
    version = "v1",
    kind = "Route",
    namespaced,
    schema = "disabled",
    crates(
        kube_core = "stackable_operator::kube::core",
        k8s_openapi = "stackable_operator::k8s_openapi",
        schemars = "stackable_operator::schemars"
    )
)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(default)]
    pub host: Option<String>,

    pub to: RouteTargetReference,

    /// Routes with a TLS configuration serve HTTPS.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    #[serde(default)]
    pub kind: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(default)]
    pub termination: Option<String>,
}

/// An OpenShift DeploymentConfig
#[derive(Clone, CustomResource, Debug, Default, Deserialize, PartialEq, Serialize)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    schema = "disabled",
    crates(
        kube_core = "stackable_operator::kube::core",
        k8s_openapi = "stackable_operator::k8s_openapi",
        schemars = "stackable_operator::schemars"
    )
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(default)]
    pub replicas: Option<i32>,
}

impl Route {
    pub fn is_secure(&self) -> bool {
        self.spec.tls.is_some()
    }

    pub fn targets(&self, service: &str) -> bool {
        self.spec.to.name == service
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DeploymentConfig, Route};

    #[test]
    fn test_deserialize_route() {
        let route: Route = serde_json::from_value(json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "secure-myapp-kieserver" },
            "spec": {
                "host": "secure-myapp-kieserver-kie-3f2a.apps.example.com",
                "to": { "kind": "Service", "name": "myapp-kieserver", "weight": 100 },
                "tls": { "termination": "passthrough" }
            }
        }))
        .expect("should be a valid Route");

        assert!(route.is_secure());
        assert!(route.targets("myapp-kieserver"));
        assert!(!route.targets("myapp-rhpamcentr"));
    }

    #[test]
    fn test_deserialize_deployment_config_ignores_unknown_fields() {
        let deployment_config: DeploymentConfig = serde_json::from_value(json!({
            "apiVersion": "apps.openshift.io/v1",
            "kind": "DeploymentConfig",
            "metadata": { "name": "myapp-kieserver" },
            "spec": {
                "replicas": 2,
                "selector": { "deploymentConfig": "myapp-kieserver" },
                "template": { "spec": { "containers": [] } }
            }
        }))
        .expect("should be a valid DeploymentConfig");

        assert_eq!(Some(2), deployment_config.spec.replicas);
    }
}
