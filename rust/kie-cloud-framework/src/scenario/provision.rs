//! Provisioning of scenarios
//!
//! Templates are processed with the OpenShift command line client, APB plans run as a Pod and
//! KieApps are handed over to the KIE operator.

use std::{path::PathBuf, process::Stdio, sync::Arc};

use async_trait::async_trait;
use serde_json::{Value, json};
use snafu::{ResultExt, Snafu, ensure};
use stackable_operator::{
    k8s_openapi::api::core::v1::{Container, Pod, PodSpec},
    kube::api::ObjectMeta,
};
use strum::{EnumDiscriminants, IntoStaticStr};
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    config::FrameworkConfig,
    crd::v2,
    deployment::{Context, cluster, wait},
    framework::{
        HasObjectName, NamespaceName, builder::pod::container::EnvVarSet,
        controller_utils::get_application_name,
    },
    settings::template::Template,
};

const APB_CONTAINER_NAME: &str = "apb";
const APB_SUCCEEDED_PHASE: &str = "Succeeded";
const APB_FAILED_PHASE: &str = "Failed";

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to resolve the URL of the template"))]
    ResolveTemplateUrl { source: crate::config::Error },

    #[snafu(display("failed to run \"oc {command}\""))]
    RunCommand {
        source: std::io::Error,
        command: &'static str,
    },

    #[snafu(display("the template parameter {key} must not contain line breaks"))]
    MultilineParameter { key: String },

    #[snafu(display("failed to pass the input to \"oc {command}\""))]
    WriteInput {
        source: std::io::Error,
        command: &'static str,
    },

    #[snafu(display("\"oc {command}\" failed with {status}: {stderr}"))]
    CommandFailed {
        command: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[snafu(display("failed to serialize the extra vars of the APB"))]
    SerializeExtraVars { source: serde_json::Error },

    #[snafu(display("failed to create the APB Pod {name}"))]
    CreateApbPod { source: cluster::Error, name: String },

    #[snafu(display("failed to wait for the APB Pod {name}"))]
    WaitForApbPod { source: wait::Error, name: String },

    #[snafu(display("the APB Pod {name} failed, see its log for details"))]
    ApbFailed { name: String },

    #[snafu(display("failed to get the name of the KieApp"))]
    GetApplicationName {
        source: crate::framework::controller_utils::Error,
    },

    #[snafu(display("failed to create the KieApp"))]
    CreateKieApp { source: cluster::Error },

    #[snafu(display("failed to wait until the operator reconciled the KieApp {name}"))]
    WaitForReconciliation { source: wait::Error, name: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// What a backend deploys for a scenario
#[derive(Clone, Debug, PartialEq)]
pub enum Plan {
    /// Process the template with the given parameters and create the resulting resources
    Template {
        template: Template,
        parameters: EnvVarSet,
    },

    /// Run the APB image with the given extra vars
    Apb { extra_vars: EnvVarSet },

    /// Submit the KieApp to the operator
    Operator { kie_app: Box<v2::KieApp> },
}

/// The parts of the OpenShift command line client used for templates
#[async_trait]
pub trait OpenShiftCli: Send + Sync {
    /// Processes the template locally and returns the resources as YAML
    async fn process_template(&self, url: &str, parameters: &EnvVarSet) -> Result<String>;

    async fn create_resources(&self, namespace: &NamespaceName, resources: &str) -> Result<()>;
}

/// [`OpenShiftCli`] backed by the `oc` binary, logged in with the current kubeconfig
pub struct OcBinary {
    path: PathBuf,
}

impl OcBinary {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Runs `oc` and returns its standard output
    ///
    /// Only the subcommand is part of errors and logs.
    async fn run(
        &self,
        command: &'static str,
        args: &[String],
        input: Option<&str>,
    ) -> Result<String> {
        tracing::debug!(oc = %self.path.display(), command, "Running the OpenShift client");

        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context(RunCommandSnafu { command })?;

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin
                .write_all(input.as_bytes())
                .await
                .context(WriteInputSnafu { command })?;
        }

        let output = child
            .wait_with_output()
            .await
            .context(RunCommandSnafu { command })?;
        ensure!(
            output.status.success(),
            CommandFailedSnafu {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            }
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OpenShiftCli for OcBinary {
    async fn process_template(&self, url: &str, parameters: &EnvVarSet) -> Result<String> {
        let param_file = param_file(parameters)?;
        self.run("process", &process_template_args(url), Some(&param_file))
            .await
    }

    async fn create_resources(&self, namespace: &NamespaceName, resources: &str) -> Result<()> {
        let args = [
            "create".to_owned(),
            "-n".to_owned(),
            namespace.to_object_name(),
            "-f".to_owned(),
            "-".to_owned(),
        ];
        let output = self.run("create", &args, Some(resources)).await?;
        tracing::info!(%namespace, output = output.trim(), "Resources created");
        Ok(())
    }
}

/// Arguments of `oc process`; local files are passed as paths
///
/// The parameters are read from standard input, see [`param_file`].
fn process_template_args(url: &str) -> Vec<String> {
    let location = url.strip_prefix("file://").unwrap_or(url);

    [
        "process",
        "-f",
        location,
        "--local",
        "--ignore-unknown-parameters=true",
        "--param-file=-",
        "-o",
        "yaml",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Template parameters as `KEY=VALUE` lines, the format of `oc process --param-file`
///
/// The parameters contain passwords and must not show up in the process list.
fn param_file(parameters: &EnvVarSet) -> Result<String> {
    parameters
        .values()
        .map(|(key, value)| {
            ensure!(
                !value.contains(['\n', '\r']),
                MultilineParameterSnafu { key }
            );
            Ok(format!("{key}={value}\n"))
        })
        .collect()
}

/// The Pod which runs the provision action of the APB image
fn apb_pod(name: &str, image: &str, extra_vars: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            ..ObjectMeta::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: APB_CONTAINER_NAME.to_owned(),
                image: Some(image.to_owned()),
                args: Some(vec![
                    "provision".to_owned(),
                    "--extra-vars".to_owned(),
                    extra_vars.to_owned(),
                ]),
                ..Container::default()
            }],
            restart_policy: Some("Never".to_owned()),
            ..PodSpec::default()
        }),
        status: None,
    }
}

/// Deploys the plans of scenarios into a namespace
pub struct Provisioner {
    context: Arc<Context>,
    cli: Arc<dyn OpenShiftCli>,
    config: FrameworkConfig,
}

impl Provisioner {
    pub fn new(context: Arc<Context>, cli: Arc<dyn OpenShiftCli>, config: &FrameworkConfig) -> Self {
        Self {
            context,
            cli,
            config: config.clone(),
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub async fn provision(&self, namespace: &NamespaceName, plan: &Plan) -> Result<()> {
        match plan {
            Plan::Template {
                template,
                parameters,
            } => self.process_template(namespace, *template, parameters).await,
            Plan::Apb { extra_vars } => self.run_apb(namespace, extra_vars).await,
            Plan::Operator { kie_app } => self.create_kie_app(namespace, kie_app).await,
        }
    }

    async fn process_template(
        &self,
        namespace: &NamespaceName,
        template: Template,
        parameters: &EnvVarSet,
    ) -> Result<()> {
        let url = self
            .config
            .template_url(template)
            .context(ResolveTemplateUrlSnafu)?;
        tracing::info!(%namespace, %template, url, "Processing template");

        let resources = self.cli.process_template(url, parameters).await?;
        self.cli.create_resources(namespace, &resources).await
    }

    async fn run_apb(&self, namespace: &NamespaceName, extra_vars: &EnvVarSet) -> Result<()> {
        let namespace_value = namespace.to_object_name();
        let mut vars = extra_vars
            .values()
            .map(|(key, value)| (key.to_owned(), Value::from(value)))
            .collect::<serde_json::Map<_, _>>();
        vars.insert("namespace".to_owned(), json!(namespace_value));
        vars.insert("cluster".to_owned(), json!("openshift"));
        vars.insert("image_stream_namespace".to_owned(), json!(namespace_value));
        let extra_vars = serde_json::to_string(&vars).context(SerializeExtraVarsSnafu)?;

        let name = format!("apb-provision-{}", super::random_suffix());
        tracing::info!(
            %namespace,
            pod = %name,
            plan = vars.get("_apb_plan_id").and_then(Value::as_str),
            "Running APB"
        );

        let cluster = &self.context.cluster;
        cluster
            .create_pod(namespace, &apb_pod(&name, &self.config.apb_image, &extra_vars))
            .await
            .context(CreateApbPodSnafu { name: name.clone() })?;

        let pod_name = name.as_str();
        let phase = wait::wait_for(
            &format!("the APB Pod {name} to finish"),
            *self.context.timeouts.pods_start_to_ready,
            *self.context.timeouts.poll_interval,
            move || async move {
                let pod = cluster.get_pod(namespace, pod_name).await?;
                let phase = pod
                    .and_then(|pod| pod.status)
                    .and_then(|status| status.phase)
                    .filter(|phase| phase == APB_SUCCEEDED_PHASE || phase == APB_FAILED_PHASE);
                Ok::<_, cluster::Error>(phase)
            },
        )
        .await
        .context(WaitForApbPodSnafu { name: name.clone() })?;

        ensure!(phase == APB_SUCCEEDED_PHASE, ApbFailedSnafu { name });
        Ok(())
    }

    async fn create_kie_app(&self, namespace: &NamespaceName, kie_app: &v2::KieApp) -> Result<()> {
        let application = get_application_name(kie_app).context(GetApplicationNameSnafu)?;
        tracing::info!(
            %namespace,
            kie_app = %application,
            environment = kie_app.spec.environment.as_deref(),
            "Creating KieApp"
        );

        let cluster = &self.context.cluster;
        cluster
            .create_kie_app(namespace, kie_app)
            .await
            .context(CreateKieAppSnafu)?;

        let application = &application;
        wait::wait_for(
            &format!("the status of the KieApp {application}"),
            *self.context.timeouts.reconciliation,
            *self.context.timeouts.poll_interval,
            move || async move {
                let kie_app = cluster.get_kie_app(namespace, application).await?;
                Ok::<_, cluster::Error>(kie_app.and_then(|kie_app| kie_app.status).map(|_| ()))
            },
        )
        .await
        .context(WaitForReconciliationSnafu {
            name: application.to_string(),
        })
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{
        ErrorDiscriminants, OpenShiftCli, Result, apb_pod, param_file, process_template_args,
    };
    use crate::{
        deployment::cluster::tests::InMemoryCluster,
        framework::{HasObjectName, NamespaceName, builder::pod::container::EnvVarSet},
    };

    /// Records the processed templates and creates the given workloads instead of the resources
    pub struct FakeOpenShiftCli {
        cluster: Arc<InMemoryCluster>,
        workloads: Vec<(String, i32)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeOpenShiftCli {
        pub fn new(cluster: Arc<InMemoryCluster>, workloads: &[(&str, i32)]) -> Self {
            Self {
                cluster,
                workloads: workloads
                    .iter()
                    .map(|(name, replicas)| ((*name).to_owned(), *replicas))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("should not be poisoned").clone()
        }
    }

    #[async_trait]
    impl OpenShiftCli for FakeOpenShiftCli {
        async fn process_template(&self, url: &str, parameters: &EnvVarSet) -> Result<String> {
            self.calls
                .lock()
                .expect("should not be poisoned")
                .push(format!("process {url} ({} parameters)", parameters.len()));
            Ok("kind: List\nitems: []\n".to_owned())
        }

        async fn create_resources(
            &self,
            namespace: &NamespaceName,
            _resources: &str,
        ) -> Result<()> {
            self.calls
                .lock()
                .expect("should not be poisoned")
                .push(format!("create -n {}", namespace.to_object_name()));
            for (name, replicas) in &self.workloads {
                self.cluster.add_workload(name, *replicas);
            }
            Ok(())
        }
    }

    #[test]
    fn test_process_template_args() {
        assert_eq!(
            vec![
                "process",
                "-f",
                "/tmp/rhpam-kieserver.yaml",
                "--local",
                "--ignore-unknown-parameters=true",
                "--param-file=-",
                "-o",
                "yaml"
            ],
            process_template_args("file:///tmp/rhpam-kieserver.yaml")
        );
        assert_eq!(
            "https://example.com/rhpam-kieserver.yaml",
            process_template_args("https://example.com/rhpam-kieserver.yaml")[2]
        );
    }

    #[test]
    fn test_parameters_are_passed_on_standard_input() {
        let parameters = EnvVarSet::new()
            .with_value("KIE_SERVER_PWD", "usetheforce123@")
            .with_value("APPLICATION_NAME", "myapp");

        assert_eq!(
            "APPLICATION_NAME=myapp\nKIE_SERVER_PWD=usetheforce123@\n",
            param_file(&parameters).expect("should be valid parameters")
        );
        assert!(
            process_template_args("https://example.com/rhpam-kieserver.yaml")
                .iter()
                .all(|arg| !arg.contains("usetheforce123@"))
        );
        assert_eq!(
            Ok(String::new()),
            param_file(&EnvVarSet::new()).map_err(ErrorDiscriminants::from)
        );
        assert_eq!(
            Err(ErrorDiscriminants::MultilineParameter),
            param_file(&EnvVarSet::new().with_value("GIT_HOOKS_DIR", "/opt\n/hooks"))
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_apb_pod() {
        let pod = apb_pod("apb-provision-1a2b", "rhpam-apb:latest", "{\"cluster\":\"openshift\"}");

        let spec = pod.spec.expect("should have a spec");
        assert_eq!(Some("Never".to_owned()), spec.restart_policy);
        assert_eq!(
            Some(vec![
                "provision".to_owned(),
                "--extra-vars".to_owned(),
                "{\"cluster\":\"openshift\"}".to_owned()
            ]),
            spec.containers[0].args
        );
    }
}
