//! Handles on the deployed KIE components
//!
//! A [`Deployment`] scales a component and waits until the requested number of Pods is ready
//! and its routes serve requests. Plain deployments are scaled via their DeploymentConfig,
//! operator managed deployments via the KieApp.

use std::{str::FromStr, sync::Arc, time::Duration};

use snafu::{OptionExt, ResultExt, Snafu};
use stackable_operator::k8s_openapi::api::core::v1::Pod;
use strum::{Display, EnumDiscriminants, IntoStaticStr};

use crate::{
    config::{FrameworkConfig, Timeouts},
    framework::{
        ApplicationName, NamespaceName, ServerName, ServiceName, WorkloadName,
        kvp::label::service_selector, types::common::Protocol,
    },
    settings::backend::{Backend, Component},
};

pub mod cluster;
pub mod router;
pub mod scale;
pub mod wait;

use cluster::ClusterApi;
use router::{HttpClient, wait_for_router};

/// Attempts to write a change before concurrent modifications are reported as an error
const MAX_CONFLICT_RETRIES: usize = 5;

const HAPROXY_ROUTER_TIMEOUT: &str = "haproxy.router.openshift.io/timeout";
const HAPROXY_ROUTER_BALANCE: &str = "haproxy.router.openshift.io/balance";

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("scaling the {component} is not supported for {backend}"))]
    ScaleNotSupported {
        component: Component,
        backend: Backend,
    },

    #[snafu(display("failed to build the service name of the {component}"))]
    BuildServiceName {
        source: crate::framework::Error,
        component: Component,
    },

    #[snafu(display("failed to check the readiness of {service}"))]
    CheckReadiness {
        source: cluster::Error,
        service: ServiceName,
    },

    #[snafu(display("failed to get the KieApp"))]
    GetKieApp { source: cluster::Error },

    #[snafu(display("the KieApp {name} does not exist"))]
    KieAppNotFound { name: ApplicationName },

    #[snafu(display("the KieApp {name} was not reconciled by the operator yet"))]
    KieAppNotReconciled { name: ApplicationName },

    #[snafu(display("failed to replace the KieApp"))]
    ReplaceKieApp { source: cluster::Error },

    #[snafu(display("failed to locate the replicas of {service}"))]
    LocateReplicas {
        source: scale::Error,
        service: ServiceName,
    },

    #[snafu(display("failed to get the DeploymentConfig {workload}"))]
    GetDeploymentConfig {
        source: cluster::Error,
        workload: WorkloadName,
    },

    #[snafu(display("the DeploymentConfig {workload} does not exist"))]
    DeploymentConfigNotFound { workload: WorkloadName },

    #[snafu(display("failed to scale the DeploymentConfig {workload}"))]
    ScaleDeploymentConfig {
        source: cluster::Error,
        workload: WorkloadName,
    },

    #[snafu(display("{service} was modified concurrently {attempts} times, giving up"))]
    ConflictRetriesExhausted {
        service: ServiceName,
        attempts: usize,
    },

    #[snafu(display("failed to wait for the Pods of {workload}"))]
    WaitForPods {
        source: wait::Error,
        workload: WorkloadName,
    },

    #[snafu(display("failed to wait for the routes of {service}"))]
    WaitForRoutes {
        source: router::Error,
        service: ServiceName,
    },

    #[snafu(display("failed to list the Pods of {workload}"))]
    ListPods {
        source: cluster::Error,
        workload: WorkloadName,
    },

    #[snafu(display("failed to delete the Pod {name}"))]
    DeletePod { source: cluster::Error, name: String },

    #[snafu(display("failed to list the routes of {service}"))]
    ListRoutes {
        source: cluster::Error,
        service: ServiceName,
    },

    #[snafu(display("failed to annotate the route {name}"))]
    AnnotateRoute { source: cluster::Error, name: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Shared dependencies of the deployments
pub struct Context {
    pub cluster: Arc<dyn ClusterApi>,
    pub http_client: Arc<dyn HttpClient>,
    pub timeouts: Timeouts,
    pub default_domain_suffix: String,
}

impl Context {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        http_client: Arc<dyn HttpClient>,
        config: &FrameworkConfig,
    ) -> Self {
        Self {
            cluster,
            http_client,
            timeouts: config.timeouts.clone(),
            default_domain_suffix: config.default_domain_suffix.clone(),
        }
    }
}

/// Observed phase of a scale operation
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum DeploymentState {
    Unknown,
    Scaling,
    Ready,
    ScaledToZero,
}

/// A running Pod of a deployment
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    pub name: String,
    pub namespace: NamespaceName,
}

/// Name of the service of a component
///
/// `index` distinguishes multiple KIE Servers: the first one is `{application}-kieserver`, the
/// following ones `{application}-kieserver-2` and so on. It is ignored for the other components.
pub fn service_name(
    application: &ApplicationName,
    component: Component,
    index: usize,
) -> Result<ServiceName> {
    let name = match component {
        Component::KieServer if index == 0 => format!("{application}-kieserver"),
        Component::KieServer => format!("{application}-kieserver-{}", index + 1),
        Component::Workbench => format!("{application}-rhpamcentr"),
        Component::SmartRouter => format!("{application}-smartrouter"),
        Component::Controller => format!("{application}-controller"),
        Component::ProcessMigration => format!("{application}-process-migration"),
    };

    ServiceName::from_str(&name).context(BuildServiceNameSnafu { component })
}

/// A deployed KIE component
#[derive(Clone)]
pub struct Deployment {
    context: Arc<Context>,
    backend: Backend,
    component: Component,
    application: ApplicationName,
    namespace: NamespaceName,
    service: ServiceName,
    state: DeploymentState,
}

impl Deployment {
    pub fn new(
        context: Arc<Context>,
        backend: Backend,
        component: Component,
        application: ApplicationName,
        namespace: NamespaceName,
        service: ServiceName,
    ) -> Self {
        Self {
            context,
            backend,
            component,
            application,
            namespace,
            service,
            state: DeploymentState::Unknown,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }

    pub fn service_name(&self) -> &ServiceName {
        &self.service
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// The DeploymentConfig running the Pods of this deployment
    pub fn workload_name(&self) -> WorkloadName {
        WorkloadName::from(&self.service)
    }

    /// The entry of this deployment in the servers of the KieApp
    pub fn server_name(&self) -> ServerName {
        ServerName::from(self.service.clone())
    }

    /// The service and the DeploymentConfig exist
    pub async fn is_ready(&self) -> Result<bool> {
        let cluster = &self.context.cluster;

        let service_exists = cluster
            .service_exists(&self.namespace, &self.service)
            .await
            .context(CheckReadinessSnafu {
                service: self.service.clone(),
            })?;
        if !service_exists {
            return Ok(false);
        }

        let deployment_config = cluster
            .get_deployment_config(&self.namespace, &self.workload_name())
            .await
            .context(CheckReadinessSnafu {
                service: self.service.clone(),
            })?;

        Ok(deployment_config.is_some())
    }

    /// Requests the given number of Pods
    ///
    /// Deployments which are not ready yet are left untouched. Use
    /// [`Deployment::wait_for_scale`] to wait until the Pods are available.
    pub async fn scale(&mut self, replicas: i32) -> Result<()> {
        snafu::ensure!(
            self.backend
                .capabilities()
                .supports_scaling(self.component),
            ScaleNotSupportedSnafu {
                component: self.component,
                backend: self.backend,
            }
        );

        if !self.is_ready().await? {
            tracing::warn!(
                service = %self.service,
                namespace = %self.namespace,
                "The deployment is not ready, therefore it is not scaled."
            );
            self.state = DeploymentState::Unknown;
            return Ok(());
        }

        tracing::info!(
            service = %self.service,
            namespace = %self.namespace,
            replicas,
            "Scaling deployment"
        );
        self.state = DeploymentState::Scaling;

        match self.backend {
            Backend::Operator => self.scale_kie_app(replicas).await,
            Backend::Template | Backend::Apb => self.scale_deployment_config(replicas).await,
        }
    }

    /// Writes the replicas into the KieApp, based on the specification applied by the operator
    async fn scale_kie_app(&self, replicas: i32) -> Result<()> {
        let cluster = &self.context.cluster;
        let server = self.server_name();

        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let mut kie_app = cluster
                .get_kie_app(&self.namespace, &self.application)
                .await
                .context(GetKieAppSnafu)?
                .context(KieAppNotFoundSnafu {
                    name: self.application.clone(),
                })?;

            // The applied specification contains the defaults of the operator, e.g. the server
            // names, which are not necessarily part of the submitted specification.
            let mut spec = kie_app
                .applied_spec()
                .cloned()
                .context(KieAppNotReconciledSnafu {
                    name: self.application.clone(),
                })?;
            scale::set_replicas(&mut spec.objects, self.component, &server, replicas).context(
                LocateReplicasSnafu {
                    service: self.service.clone(),
                },
            )?;
            kie_app.spec = spec;

            match cluster.replace_kie_app(&self.namespace, &kie_app).await {
                Ok(_) => return Ok(()),
                Err(error) if error.is_conflict() => {
                    tracing::info!(
                        kie_app = %self.application,
                        attempt,
                        "The KieApp was modified concurrently, retrying"
                    );
                }
                Err(error) => return Err(error).context(ReplaceKieAppSnafu),
            }
        }

        ConflictRetriesExhaustedSnafu {
            service: self.service.clone(),
            attempts: MAX_CONFLICT_RETRIES,
        }
        .fail()
    }

    async fn scale_deployment_config(&self, replicas: i32) -> Result<()> {
        let cluster = &self.context.cluster;
        let workload = self.workload_name();

        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let deployment_config = cluster
                .get_deployment_config(&self.namespace, &workload)
                .await
                .context(GetDeploymentConfigSnafu {
                    workload: workload.clone(),
                })?
                .context(DeploymentConfigNotFoundSnafu {
                    workload: workload.clone(),
                })?;

            match cluster
                .scale_deployment_config(
                    &self.namespace,
                    &workload,
                    replicas,
                    deployment_config.metadata.resource_version,
                )
                .await
            {
                Ok(()) => return Ok(()),
                Err(error) if error.is_conflict() => {
                    tracing::info!(
                        %workload,
                        attempt,
                        "The DeploymentConfig was modified concurrently, retrying"
                    );
                }
                Err(error) => {
                    return Err(error).context(ScaleDeploymentConfigSnafu {
                        workload: workload.clone(),
                    });
                }
            }
        }

        ConflictRetriesExhaustedSnafu {
            service: self.service.clone(),
            attempts: MAX_CONFLICT_RETRIES,
        }
        .fail()
    }

    /// The number of Pods this deployment is expected to run
    pub async fn target_replicas(&self) -> Result<i32> {
        let cluster = &self.context.cluster;
        let workload = self.workload_name();

        let applied = match self.backend {
            Backend::Operator => cluster
                .get_kie_app(&self.namespace, &self.application)
                .await
                .context(GetKieAppSnafu)?
                .and_then(|kie_app| kie_app.applied_spec().cloned()),
            Backend::Template | Backend::Apb => None,
        };
        let live_replicas = cluster
            .get_deployment_config(&self.namespace, &workload)
            .await
            .context(GetDeploymentConfigSnafu {
                workload: workload.clone(),
            })?
            .and_then(|deployment_config| deployment_config.spec.replicas);

        scale::resolve_target_replicas(
            applied.as_ref(),
            self.component,
            &self.server_name(),
            live_replicas,
        )
        .context(LocateReplicasSnafu {
            service: self.service.clone(),
        })
    }

    /// Waits until exactly the target number of Pods is ready and running and, unless the
    /// deployment is scaled to zero, its routes serve requests
    pub async fn wait_for_scale(&mut self) -> Result<DeploymentState> {
        let target = self.target_replicas().await?;
        let workload = self.workload_name();
        self.state = DeploymentState::Scaling;

        let timeout = match self.backend {
            Backend::Operator => *self.context.timeouts.operator_start_to_ready,
            Backend::Template | Backend::Apb => *self.context.timeouts.pods_start_to_ready,
        };
        let cluster = &self.context.cluster;
        let namespace = &self.namespace;
        let expected_pods = usize::try_from(target).unwrap_or_default();

        wait::wait_for(
            &format!("{target} ready Pods of the DeploymentConfig {workload}"),
            timeout,
            *self.context.timeouts.poll_interval,
            || {
                let workload = workload.clone();
                async move {
                    let pods = cluster.list_pods(namespace, &workload).await?;
                    let ready_pods = pods.iter().filter(|pod| is_ready_and_running(pod)).count();
                    Ok::<_, cluster::Error>((ready_pods == expected_pods).then_some(()))
                }
            },
        )
        .await
        .context(WaitForPodsSnafu {
            workload: workload.clone(),
        })?;

        if target == 0 {
            self.state = DeploymentState::ScaledToZero;
            return Ok(self.state);
        }

        for url in self.route_urls().await? {
            wait_for_router(
                self.context.http_client.as_ref(),
                &url,
                *self.context.timeouts.router,
            )
            .await
            .context(WaitForRoutesSnafu {
                service: self.service.clone(),
            })?;
        }

        self.state = DeploymentState::Ready;
        Ok(self.state)
    }

    /// URLs of all routes leading to the service
    async fn route_urls(&self) -> Result<Vec<String>> {
        let routes = self
            .context
            .cluster
            .list_routes(&self.namespace, None)
            .await
            .context(ListRoutesSnafu {
                service: self.service.clone(),
            })?;

        Ok(routes
            .iter()
            .filter(|route| route.targets(self.service.as_ref()))
            .filter_map(|route| {
                let protocol = if route.is_secure() {
                    Protocol::Https
                } else {
                    Protocol::Http
                };
                route
                    .spec
                    .host
                    .as_ref()
                    .map(|host| format!("{protocol}://{host}:{}", protocol.port()))
            })
            .collect())
    }

    /// URL of the route exposing the service with the given protocol
    ///
    /// If the service does not exist yet, the URL is derived from the default routing subdomain.
    pub async fn route_url(&self, protocol: Protocol) -> Result<Option<String>> {
        let cluster = &self.context.cluster;

        let service_exists = cluster
            .service_exists(&self.namespace, &self.service)
            .await
            .context(CheckReadinessSnafu {
                service: self.service.clone(),
            })?;

        let host = if service_exists {
            let routes = cluster
                .list_routes(&self.namespace, None)
                .await
                .context(ListRoutesSnafu {
                    service: self.service.clone(),
                })?;
            let route = routes.iter().find(|route| {
                route.is_secure() == protocol.is_secure() && route.targets(self.service.as_ref())
            });

            match route.and_then(|route| route.spec.host.clone()) {
                Some(host) => host,
                None => {
                    let route_names = routes
                        .iter()
                        .filter_map(|route| route.metadata.name.as_deref())
                        .collect::<Vec<_>>()
                        .join(", ");
                    tracing::warn!(
                        %protocol,
                        service = %self.service,
                        available_routes = %route_names,
                        "Route leading to the service not found"
                    );
                    return Ok(None);
                }
            }
        } else {
            format!(
                "{}-{}{}",
                self.service, self.namespace, self.context.default_domain_suffix
            )
        };

        Ok(Some(format!("{protocol}://{host}:{}", protocol.port())))
    }

    pub async fn insecure_url(&self) -> Result<Option<String>> {
        self.route_url(Protocol::Http).await
    }

    pub async fn secure_url(&self) -> Result<Option<String>> {
        self.route_url(Protocol::Https).await
    }

    pub async fn websocket_url(&self) -> Result<Option<String>> {
        self.route_url(Protocol::Ws).await
    }

    /// The insecure URL if there is one, the secure URL otherwise
    pub async fn url(&self) -> Result<Option<String>> {
        match self.insecure_url().await? {
            Some(url) => Ok(Some(url)),
            None => self.secure_url().await,
        }
    }

    /// The Pods of the deployment; empty if the deployment is not ready
    pub async fn instances(&self) -> Result<Vec<Instance>> {
        if !self.is_ready().await? {
            return Ok(Vec::new());
        }

        let workload = self.workload_name();
        let pods = self
            .context
            .cluster
            .list_pods(&self.namespace, &workload)
            .await
            .context(ListPodsSnafu {
                workload: workload.clone(),
            })?;

        Ok(pods
            .into_iter()
            .filter_map(|pod| pod.metadata.name)
            .map(|name| Instance {
                name,
                namespace: self.namespace.clone(),
            })
            .collect())
    }

    /// Deletes the Pods of the given instances, the DeploymentConfig replaces them
    pub async fn delete_instances(&self, instances: &[Instance]) -> Result<()> {
        for instance in instances {
            self.context
                .cluster
                .delete_pod(&instance.namespace, &instance.name)
                .await
                .context(DeletePodSnafu {
                    name: instance.name.clone(),
                })?;
        }

        Ok(())
    }

    /// Sets the timeout of the OpenShift router for all routes of the service
    pub async fn set_router_timeout(&self, timeout: Duration) -> Result<()> {
        self.annotate_routes(
            HAPROXY_ROUTER_TIMEOUT,
            Some(format!("{}s", timeout.as_secs())),
        )
        .await
    }

    pub async fn reset_router_timeout(&self) -> Result<()> {
        self.annotate_routes(HAPROXY_ROUTER_TIMEOUT, None).await
    }

    /// Sets the load balancing algorithm of the OpenShift router, e.g. "roundrobin"
    pub async fn set_router_balance(&self, balance: &str) -> Result<()> {
        self.annotate_routes(HAPROXY_ROUTER_BALANCE, Some(balance.to_owned()))
            .await
    }

    async fn annotate_routes(&self, key: &str, value: Option<String>) -> Result<()> {
        let cluster = &self.context.cluster;

        let routes = cluster
            .list_routes(&self.namespace, Some(&service_selector(&self.service)))
            .await
            .context(ListRoutesSnafu {
                service: self.service.clone(),
            })?;

        for name in routes.iter().filter_map(|route| route.metadata.name.as_deref()) {
            cluster
                .annotate_route(
                    &self.namespace,
                    name,
                    [(key.to_owned(), value.clone())].into(),
                )
                .await
                .context(AnnotateRouteSnafu { name })?;
        }

        Ok(())
    }
}

/// The Pod runs and passes its readiness probe
fn is_ready_and_running(pod: &Pod) -> bool {
    let Some(status) = &pod.status else {
        return false;
    };

    pod.metadata.deletion_timestamp.is_none()
        && status.phase.as_deref() == Some("Running")
        && status.conditions.iter().flatten().any(|condition| {
            condition.type_ == "Ready" && condition.status == "True"
        })
}

#[cfg(test)]
pub mod tests {
    use std::{str::FromStr, sync::Arc, time::Duration};

    use serde_json::json;

    use super::{
        Context, Deployment, DeploymentState, ErrorDiscriminants, cluster::tests::InMemoryCluster,
        router::tests::StartingRouter, service_name,
    };
    use crate::{
        config::tests::test_config,
        crd::v2,
        framework::{ApplicationName, NamespaceName},
        settings::backend::{Backend, Component},
    };

    pub fn test_context(cluster: Arc<InMemoryCluster>, router: Arc<StartingRouter>) -> Arc<Context> {
        Arc::new(Context::new(
            cluster,
            router,
            &test_config(&["--default-domain-suffix", ".apps.example.com"]),
        ))
    }

    fn deployment(
        cluster: &Arc<InMemoryCluster>,
        router: &Arc<StartingRouter>,
        backend: Backend,
        component: Component,
        index: usize,
    ) -> Deployment {
        let application = ApplicationName::from_str_unsafe("myapp");
        let service =
            service_name(&application, component, index).expect("should be a valid name");
        Deployment::new(
            test_context(cluster.clone(), router.clone()),
            backend,
            component,
            application,
            NamespaceName::from_str_unsafe("kie-3f2a"),
            service,
        )
    }

    /// A KieApp with two KIE Servers as reconciled by the operator
    fn reconciled_kie_app(applied_replicas: Option<i32>) -> v2::KieApp {
        let mut kie_app: v2::KieApp = serde_json::from_value(json!({
            "apiVersion": "app.kiegroup.org/v2",
            "kind": "KieApp",
            "metadata": { "name": "myapp" },
            "spec": {
                "environment": "rhpam-trial",
                "objects": {
                    "servers": [{ "name": "myapp-kieserver" }, { "name": "myapp-kieserver-2" }]
                }
            },
        }))
        .expect("should be a valid KieApp");

        let mut applied = kie_app.spec.clone();
        for server in &mut applied.objects.servers {
            server.replicas = applied_replicas;
        }
        applied.objects.console = Some(v2::Console {
            replicas: Some(1),
            ..v2::Console::default()
        });
        kie_app.status = Some(v2::KieAppStatus {
            applied: Some(applied),
            conditions: Vec::new(),
        });
        kie_app
    }

    #[test]
    fn test_service_names() {
        let application = ApplicationName::from_str("myapp").expect("should be valid");

        let names = [
            (Component::KieServer, 0, "myapp-kieserver"),
            (Component::KieServer, 1, "myapp-kieserver-2"),
            (Component::Workbench, 0, "myapp-rhpamcentr"),
            (Component::SmartRouter, 0, "myapp-smartrouter"),
            (Component::ProcessMigration, 0, "myapp-process-migration"),
        ];
        for (component, index, expected) in names {
            assert_eq!(
                expected,
                service_name(&application, component, index)
                    .expect("should be valid")
                    .to_string()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_deployment_config() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_route("myapp-kieserver", "myapp-kieserver", "kieserver.example.com", false)
                .with_route(
                    "secure-myapp-kieserver",
                    "myapp-kieserver",
                    "secure-kieserver.example.com",
                    true,
                )
                .with_conflicts(2),
        );
        let router = Arc::new(StartingRouter::new(2));
        let mut deployment =
            deployment(&cluster, &router, Backend::Template, Component::KieServer, 0);

        deployment.scale(3).await.expect("should be scaled");
        assert_eq!(DeploymentState::Scaling, deployment.state());
        assert_eq!(Some(3), cluster.deployment_config_replicas("myapp-kieserver"));

        assert_eq!(
            DeploymentState::Ready,
            deployment
                .wait_for_scale()
                .await
                .expect("should become ready")
        );
        assert_eq!(
            vec![
                "http://kieserver.example.com:80".to_owned(),
                "https://secure-kieserver.example.com:443".to_owned()
            ],
            router.requested_urls()
        );
        assert_eq!(3, deployment.instances().await.expect("should list").len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_to_zero_skips_the_routes() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-rhpamcentr", 1)
                .with_route("myapp-rhpamcentr", "myapp-rhpamcentr", "rhpamcentr.example.com", false),
        );
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment =
            deployment(&cluster, &router, Backend::Template, Component::Workbench, 0);

        deployment.scale(0).await.expect("should be scaled");

        assert_eq!(
            DeploymentState::ScaledToZero,
            deployment
                .wait_for_scale()
                .await
                .expect("should be scaled to zero")
        );
        assert!(router.requested_urls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_of_a_deployment_which_is_not_ready() {
        let cluster = Arc::new(InMemoryCluster::default());
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment = deployment(&cluster, &router, Backend::Apb, Component::KieServer, 0);

        deployment.scale(2).await.expect("should be skipped");

        assert_eq!(DeploymentState::Unknown, deployment.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_scale_timeout() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .without_reactions(),
        );
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment =
            deployment(&cluster, &router, Backend::Template, Component::KieServer, 0);

        deployment.scale(2).await.expect("should be scaled");

        assert_eq!(
            Err(ErrorDiscriminants::WaitForPods),
            deployment
                .wait_for_scale()
                .await
                .map_err(ErrorDiscriminants::from)
        );
        assert_eq!(DeploymentState::Scaling, deployment.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_kie_app() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_workload("myapp-kieserver-2", 1)
                .with_kie_app(reconciled_kie_app(Some(1)))
                .with_conflicts(1),
        );
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment =
            deployment(&cluster, &router, Backend::Operator, Component::KieServer, 1);

        deployment.scale(2).await.expect("should be scaled");

        let kie_app = cluster.kie_app("myapp").expect("should exist");
        let replicas = kie_app
            .spec
            .objects
            .servers
            .iter()
            .map(|server| server.replicas)
            .collect::<Vec<_>>();
        assert_eq!(vec![Some(1), Some(2)], replicas);
        // The defaults applied by the operator are written back.
        assert_eq!(
            Some(1),
            kie_app.spec.objects.console.and_then(|console| console.replicas)
        );
        assert_eq!(1, cluster.kie_app_replacements());

        assert_eq!(
            DeploymentState::Ready,
            deployment
                .wait_for_scale()
                .await
                .expect("should become ready")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_kie_app_gives_up_after_repeated_conflicts() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_kie_app(reconciled_kie_app(Some(1)))
                .with_conflicts(usize::MAX),
        );
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment =
            deployment(&cluster, &router, Backend::Operator, Component::KieServer, 0);

        assert_eq!(
            Err(ErrorDiscriminants::ConflictRetriesExhausted),
            deployment
                .scale(2)
                .await
                .map_err(ErrorDiscriminants::from)
        );
        assert_eq!(0, cluster.kie_app_replacements());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_unknown_server() {
        let mut kie_app = reconciled_kie_app(Some(1));
        if let Some(applied) = kie_app
            .status
            .as_mut()
            .and_then(|status| status.applied.as_mut())
        {
            applied.objects.servers.truncate(1);
        }
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver-2", 1)
                .with_kie_app(kie_app),
        );
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment =
            deployment(&cluster, &router, Backend::Operator, Component::KieServer, 1);

        let error = deployment.scale(2).await.expect_err("should not be found");

        assert_eq!(
            ErrorDiscriminants::LocateReplicas,
            ErrorDiscriminants::from(&error)
        );
        let source = snafu::ErrorCompat::iter_chain(&error)
            .nth(1)
            .map(ToString::to_string);
        assert_eq!(
            Some(
                "Server with name myapp-kieserver-2 not found. Available server names are: \
                 myapp-kieserver"
                    .to_owned()
            ),
            source
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_migration_cannot_be_scaled_by_the_operator() {
        let cluster = Arc::new(InMemoryCluster::default());
        let router = Arc::new(StartingRouter::new(0));
        let mut deployment = deployment(
            &cluster,
            &router,
            Backend::Operator,
            Component::ProcessMigration,
            0,
        );

        assert_eq!(
            Err(ErrorDiscriminants::ScaleNotSupported),
            deployment
                .scale(1)
                .await
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_replicas() {
        let router = Arc::new(StartingRouter::new(0));

        // The applied specification takes precedence over the DeploymentConfig.
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_kie_app(reconciled_kie_app(Some(3))),
        );
        let kie_server = deployment(&cluster, &router, Backend::Operator, Component::KieServer, 0);
        assert_eq!(
            Ok(3),
            kie_server
                .target_replicas()
                .await
                .map_err(ErrorDiscriminants::from)
        );

        // Without an applied specification, the DeploymentConfig is used.
        let mut kie_app = reconciled_kie_app(None);
        kie_app.status = None;
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_kie_app(kie_app),
        );
        let kie_server = deployment(&cluster, &router, Backend::Operator, Component::KieServer, 0);
        assert_eq!(
            Ok(1),
            kie_server
                .target_replicas()
                .await
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_urls() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_route("myapp-kieserver", "myapp-kieserver", "kieserver.example.com", false),
        );
        let router = Arc::new(StartingRouter::new(0));

        let kie_server = deployment(&cluster, &router, Backend::Template, Component::KieServer, 0);
        assert_eq!(
            Some("http://kieserver.example.com:80".to_owned()),
            kie_server.insecure_url().await.expect("should be listed")
        );
        assert_eq!(
            Some("ws://kieserver.example.com:80".to_owned()),
            kie_server.websocket_url().await.expect("should be listed")
        );
        assert_eq!(
            None,
            kie_server.secure_url().await.expect("should be listed")
        );

        // Without a service, the URL is derived from the default routing subdomain.
        let smart_router =
            deployment(&cluster, &router, Backend::Template, Component::SmartRouter, 0);
        assert_eq!(
            Some("https://myapp-smartrouter-kie-3f2a.apps.example.com:443".to_owned()),
            smart_router.secure_url().await.expect("should be derived")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_router_annotations() {
        let cluster = Arc::new(
            InMemoryCluster::default()
                .with_workload("myapp-kieserver", 1)
                .with_route("myapp-kieserver", "myapp-kieserver", "kieserver.example.com", false)
                .with_route("myapp-rhpamcentr", "myapp-rhpamcentr", "rhpamcentr.example.com", false),
        );
        let router = Arc::new(StartingRouter::new(0));
        let deployment = deployment(&cluster, &router, Backend::Template, Component::KieServer, 0);

        deployment
            .set_router_timeout(Duration::from_secs(60))
            .await
            .expect("should be annotated");
        deployment
            .set_router_balance("roundrobin")
            .await
            .expect("should be annotated");
        assert_eq!(
            vec![
                ("haproxy.router.openshift.io/balance", "roundrobin"),
                ("haproxy.router.openshift.io/timeout", "60s"),
            ],
            cluster
                .route_annotations("myapp-kieserver")
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect::<Vec<_>>()
        );
        assert!(cluster.route_annotations("myapp-rhpamcentr").is_empty());

        deployment
            .reset_router_timeout()
            .await
            .expect("should be annotated");
        assert_eq!(
            1,
            cluster.route_annotations("myapp-kieserver").len()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_instances() {
        let cluster = Arc::new(InMemoryCluster::default().with_workload("myapp-kieserver", 2));
        let router = Arc::new(StartingRouter::new(0));
        let deployment = deployment(&cluster, &router, Backend::Template, Component::KieServer, 0);

        let instances = deployment.instances().await.expect("should be listed");
        deployment
            .delete_instances(&instances[..1])
            .await
            .expect("should be deleted");

        assert_eq!(vec!["myapp-kieserver-1-1".to_owned()], cluster.pod_names());
    }
}
