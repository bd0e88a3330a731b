//! Access to the cluster the deployments live in
//!
//! [`ClusterApi`] abstracts the few Kubernetes and OpenShift operations the deployments need, so
//! that the scale and wait logic can be exercised against an in-memory cluster.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use snafu::Snafu;
use stackable_operator::{
    k8s_openapi::{
        NamespaceResourceScope,
        api::core::v1::{Namespace, Pod},
    },
    kube::{
        self, Api, Resource,
        api::{DeleteParams, ListParams, ObjectMeta, Patch, PatchParams, PostParams},
    },
};
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::{
    crd::{
        openshift::{DeploymentConfig, Route},
        v2,
    },
    framework::{
        ApplicationName, HasObjectName, IsLabelValue, NamespaceName, ServiceName, WorkloadName,
        kvp::label::deployment_config_selector,
    },
};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("{kind} {name:?} was modified concurrently"))]
    Conflict { kind: &'static str, name: String },

    #[snafu(display("failed to access {kind} {name:?}"))]
    KubeApi {
        source: kube::Error,
        kind: &'static str,
        name: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    fn from_kube(source: kube::Error, kind: &'static str, name: &str) -> Self {
        match source {
            kube::Error::Api(response) if response.code == 409 => Error::Conflict {
                kind,
                name: name.to_owned(),
            },
            source => Error::KubeApi {
                source,
                kind,
                name: name.to_owned(),
            },
        }
    }
}

/// Operations on the resources of KIE deployments
///
/// All operations except the namespace handling are scoped to the given namespace.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn create_namespace(&self, namespace: &NamespaceName) -> Result<()>;

    async fn delete_namespace(&self, namespace: &NamespaceName) -> Result<()>;

    async fn get_kie_app(
        &self,
        namespace: &NamespaceName,
        name: &ApplicationName,
    ) -> Result<Option<v2::KieApp>>;

    async fn create_kie_app(
        &self,
        namespace: &NamespaceName,
        kie_app: &v2::KieApp,
    ) -> Result<v2::KieApp>;

    /// Replaces the KieApp if its resource version still matches, fails with
    /// [`Error::Conflict`] otherwise
    async fn replace_kie_app(
        &self,
        namespace: &NamespaceName,
        kie_app: &v2::KieApp,
    ) -> Result<v2::KieApp>;

    async fn get_deployment_config(
        &self,
        namespace: &NamespaceName,
        name: &WorkloadName,
    ) -> Result<Option<DeploymentConfig>>;

    /// Sets the replicas of a DeploymentConfig if its resource version still matches, fails with
    /// [`Error::Conflict`] otherwise
    async fn scale_deployment_config(
        &self,
        namespace: &NamespaceName,
        name: &WorkloadName,
        replicas: i32,
        resource_version: Option<String>,
    ) -> Result<()>;

    async fn service_exists(&self, namespace: &NamespaceName, name: &ServiceName) -> Result<bool>;

    /// Pods created by the given DeploymentConfig
    async fn list_pods(&self, namespace: &NamespaceName, workload: &WorkloadName)
    -> Result<Vec<Pod>>;

    async fn get_pod(&self, namespace: &NamespaceName, name: &str) -> Result<Option<Pod>>;

    async fn create_pod(&self, namespace: &NamespaceName, pod: &Pod) -> Result<()>;

    async fn delete_pod(&self, namespace: &NamespaceName, name: &str) -> Result<()>;

    /// Routes of the namespace, optionally restricted by a label selector
    async fn list_routes(
        &self,
        namespace: &NamespaceName,
        label_selector: Option<&str>,
    ) -> Result<Vec<Route>>;

    /// Adds annotations to a route; annotations with the value `None` are removed
    async fn annotate_route(
        &self,
        namespace: &NamespaceName,
        name: &str,
        annotations: BTreeMap<String, Option<String>>,
    ) -> Result<()>;
}

/// [`ClusterApi`] backed by the Kubernetes API server
pub struct KubeCluster {
    client: kube::Client,
}

impl KubeCluster {
    pub fn new(client: &stackable_operator::client::Client) -> Self {
        Self {
            client: client.as_kube_client(),
        }
    }

    fn namespaced<K>(&self, namespace: &NamespaceName) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &namespace.to_object_name())
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn create_namespace(&self, namespace: &NamespaceName) -> Result<()> {
        let name = namespace.to_object_name();
        let new_namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };

        Api::<Namespace>::all(self.client.clone())
            .create(&PostParams::default(), &new_namespace)
            .await
            .map_err(|source| Error::from_kube(source, "Namespace", &name))?;

        Ok(())
    }

    async fn delete_namespace(&self, namespace: &NamespaceName) -> Result<()> {
        let name = namespace.to_object_name();

        Api::<Namespace>::all(self.client.clone())
            .delete(&name, &DeleteParams::background())
            .await
            .map_err(|source| Error::from_kube(source, "Namespace", &name))?;

        Ok(())
    }

    async fn get_kie_app(
        &self,
        namespace: &NamespaceName,
        name: &ApplicationName,
    ) -> Result<Option<v2::KieApp>> {
        let name = name.to_object_name();

        self.namespaced::<v2::KieApp>(namespace)
            .get_opt(&name)
            .await
            .map_err(|source| Error::from_kube(source, "KieApp", &name))
    }

    async fn create_kie_app(
        &self,
        namespace: &NamespaceName,
        kie_app: &v2::KieApp,
    ) -> Result<v2::KieApp> {
        let name = kie_app.metadata.name.clone().unwrap_or_default();

        self.namespaced::<v2::KieApp>(namespace)
            .create(&PostParams::default(), kie_app)
            .await
            .map_err(|source| Error::from_kube(source, "KieApp", &name))
    }

    async fn replace_kie_app(
        &self,
        namespace: &NamespaceName,
        kie_app: &v2::KieApp,
    ) -> Result<v2::KieApp> {
        let name = kie_app.metadata.name.clone().unwrap_or_default();

        // The resource version contained in the metadata makes the replacement conditional.
        self.namespaced::<v2::KieApp>(namespace)
            .replace(&name, &PostParams::default(), kie_app)
            .await
            .map_err(|source| Error::from_kube(source, "KieApp", &name))
    }

    async fn get_deployment_config(
        &self,
        namespace: &NamespaceName,
        name: &WorkloadName,
    ) -> Result<Option<DeploymentConfig>> {
        let name = name.to_object_name();

        self.namespaced::<DeploymentConfig>(namespace)
            .get_opt(&name)
            .await
            .map_err(|source| Error::from_kube(source, "DeploymentConfig", &name))
    }

    async fn scale_deployment_config(
        &self,
        namespace: &NamespaceName,
        name: &WorkloadName,
        replicas: i32,
        resource_version: Option<String>,
    ) -> Result<()> {
        let name = name.to_object_name();
        let patch = json!({
            "metadata": { "resourceVersion": resource_version },
            "spec": { "replicas": replicas },
        });

        self.namespaced::<DeploymentConfig>(namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|source| Error::from_kube(source, "DeploymentConfig", &name))?;

        Ok(())
    }

    async fn service_exists(&self, namespace: &NamespaceName, name: &ServiceName) -> Result<bool> {
        let name = name.to_object_name();

        let service = self
            .namespaced::<stackable_operator::k8s_openapi::api::core::v1::Service>(namespace)
            .get_opt(&name)
            .await
            .map_err(|source| Error::from_kube(source, "Service", &name))?;

        Ok(service.is_some())
    }

    async fn list_pods(
        &self,
        namespace: &NamespaceName,
        workload: &WorkloadName,
    ) -> Result<Vec<Pod>> {
        let selector = deployment_config_selector(workload);

        let pods = self
            .namespaced::<Pod>(namespace)
            .list(&ListParams::default().labels(&selector))
            .await
            .map_err(|source| Error::from_kube(source, "Pod", &workload.to_label_value()))?;

        Ok(pods.items)
    }

    async fn get_pod(&self, namespace: &NamespaceName, name: &str) -> Result<Option<Pod>> {
        self.namespaced::<Pod>(namespace)
            .get_opt(name)
            .await
            .map_err(|source| Error::from_kube(source, "Pod", name))
    }

    async fn create_pod(&self, namespace: &NamespaceName, pod: &Pod) -> Result<()> {
        let name = pod.metadata.name.clone().unwrap_or_default();

        self.namespaced::<Pod>(namespace)
            .create(&PostParams::default(), pod)
            .await
            .map_err(|source| Error::from_kube(source, "Pod", &name))?;

        Ok(())
    }

    async fn delete_pod(&self, namespace: &NamespaceName, name: &str) -> Result<()> {
        self.namespaced::<Pod>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|source| Error::from_kube(source, "Pod", name))?;

        Ok(())
    }

    async fn list_routes(
        &self,
        namespace: &NamespaceName,
        label_selector: Option<&str>,
    ) -> Result<Vec<Route>> {
        let list_params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };

        let routes = self
            .namespaced::<Route>(namespace)
            .list(&list_params)
            .await
            .map_err(|source| {
                Error::from_kube(source, "Route", label_selector.unwrap_or_default())
            })?;

        Ok(routes.items)
    }

    async fn annotate_route(
        &self,
        namespace: &NamespaceName,
        name: &str,
        annotations: BTreeMap<String, Option<String>>,
    ) -> Result<()> {
        let patch = json!({ "metadata": { "annotations": annotations } });

        self.namespaced::<Route>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|source| Error::from_kube(source, "Route", name))?;

        Ok(())
    }
}
