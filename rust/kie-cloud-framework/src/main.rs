use std::sync::Arc;

use clap::Parser as _;
use crd::{KieApp, KieAppVersion};
use deployment::{
    Context,
    cluster::KubeCluster,
    router::{self, ReqwestClient},
};
use framework::NamespaceName;
use scenario::{
    ScenarioBuilder,
    kind::ScenarioKind,
    provision::{OcBinary, Provisioner},
};
use settings::{
    backend::{Backend, Component},
    ldap::LdapSettings,
    sso::SsoSettings,
};
use snafu::{ResultExt as _, Snafu};
use stackable_operator::{
    YamlSchema as _, cli::CommonOptions, shared::yaml::SerializeOptions, telemetry::Tracing,
};
use strum::{EnumDiscriminants, IntoStaticStr};

mod config;
mod crd;
mod deployment;
mod framework;
mod scenario;
mod settings;

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const FIELD_MANAGER: &str = "kie-cloud-framework";

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to initialize tracing subscribers"))]
    InitTracing {
        source: stackable_operator::telemetry::tracing::Error,
    },

    #[snafu(display("failed to merge CRD versions"))]
    MergeCrd {
        source: stackable_operator::kube::core::crd::MergeError,
    },

    #[snafu(display("failed to serialize CRD"))]
    SerializeCrd {
        source: stackable_operator::shared::yaml::Error,
    },

    #[snafu(display("failed to create Kubernetes client"))]
    CreateClient {
        source: stackable_operator::client::Error,
    },

    #[snafu(display("failed to create HTTP client"))]
    CreateHttpClient { source: router::Error },

    #[snafu(display("failed to build the scenario {kind}"))]
    BuildScenario {
        source: scenario::Error,
        kind: ScenarioKind,
    },

    #[snafu(display("failed to deploy the scenario {kind}"))]
    DeployScenario {
        source: scenario::Error,
        kind: ScenarioKind,
    },

    #[snafu(display("failed to locate the {component} deployment"))]
    LocateDeployment {
        source: scenario::Error,
        component: Component,
    },

    #[snafu(display("failed to scale the {component} deployment"))]
    ScaleDeployment {
        source: deployment::Error,
        component: Component,
    },

    #[snafu(display("failed to wait for the {component} deployment"))]
    WaitForScale {
        source: deployment::Error,
        component: Component,
    },

    #[snafu(display("failed to undeploy the namespace {namespace}"))]
    Undeploy {
        source: scenario::Error,
        namespace: NamespaceName,
    },
}

#[derive(clap::Parser)]
#[clap(about, author)]
struct Opts {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the CustomResourceDefinition of the KieApp
    Crd,

    /// Deploy a scenario into a new namespace and wait until all components are ready
    Deploy(DeployArgs),

    /// Scale a deployed component and wait until the Pods are ready
    Scale(ScaleArgs),

    /// Wait until a deployed component runs its target number of Pods
    WaitForScale(ComponentArgs),

    /// Delete the namespace of a deployed scenario
    Undeploy(UndeployArgs),
}

#[derive(clap::Args)]
struct RunOptions {
    #[command(flatten)]
    common: CommonOptions,

    #[command(flatten)]
    config: config::FrameworkConfig,

    #[arg(long, value_enum, env = "KIE_BACKEND", default_value = "template")]
    backend: Backend,
}

#[derive(clap::Args)]
struct DeployArgs {
    #[command(flatten)]
    run: RunOptions,

    #[arg(long, value_enum)]
    scenario: ScenarioKind,

    /// Id of all KIE Servers
    #[arg(long)]
    kie_server_id: Option<String>,

    /// Directory of the Git hooks of the Workbench repositories
    #[arg(long)]
    git_hooks_dir: Option<String>,

    #[arg(long, requires_all = ["maven_repo_user", "maven_repo_password"])]
    maven_repo_url: Option<String>,

    #[arg(long, env = "MAVEN_REPO_USER")]
    maven_repo_user: Option<String>,

    #[arg(long, env = "MAVEN_REPO_PASSWORD")]
    maven_repo_password: Option<String>,

    #[arg(long)]
    workbench_hostname_http: Option<String>,

    #[arg(long)]
    workbench_hostname_https: Option<String>,

    /// HTTP hostname of a KIE Server; repeat it for the further KIE Servers
    #[arg(long)]
    kie_server_hostname_http: Vec<String>,

    /// HTTPS hostname of a KIE Server; repeat it for the further KIE Servers
    #[arg(long)]
    kie_server_hostname_https: Vec<String>,

    #[command(flatten)]
    ldap: LdapArgs,

    /// URL of an existing SSO server the components are registered with
    #[arg(long, requires_all = ["sso_realm", "sso_user", "sso_password"])]
    sso_url: Option<String>,

    #[arg(long)]
    sso_realm: Option<String>,

    #[arg(long, env = "SSO_USER")]
    sso_user: Option<String>,

    #[arg(long, env = "SSO_PASSWORD")]
    sso_password: Option<String>,

    #[arg(long)]
    sso_disable_ssl_cert_validation: bool,
}

#[derive(clap::Args, Debug)]
struct LdapArgs {
    /// LDAP server the users are authenticated against, e.g. "ldap://ldap.example.com:389"
    #[arg(long)]
    ldap_url: Option<String>,

    #[arg(long, requires = "ldap_url")]
    ldap_bind_dn: Option<String>,

    #[arg(long, env = "LDAP_BIND_CREDENTIAL", requires = "ldap_url")]
    ldap_bind_credential: Option<String>,

    #[arg(long, requires = "ldap_url")]
    ldap_base_ctx_dn: Option<String>,

    #[arg(long, requires = "ldap_url")]
    ldap_base_filter: Option<String>,

    #[arg(long, requires = "ldap_url")]
    ldap_roles_ctx_dn: Option<String>,

    #[arg(long, requires = "ldap_url")]
    ldap_role_filter: Option<String>,
}

impl LdapArgs {
    fn settings(&self) -> Option<LdapSettings> {
        let url = self.ldap_url.as_ref()?;

        let mut builder = LdapSettings::builder().with_url(url);
        if let Some(bind_dn) = &self.ldap_bind_dn {
            builder = builder.with_bind_dn(bind_dn);
        }
        if let Some(bind_credential) = &self.ldap_bind_credential {
            builder = builder.with_bind_credential(bind_credential);
        }
        if let Some(base_ctx_dn) = &self.ldap_base_ctx_dn {
            builder = builder.with_base_ctx_dn(base_ctx_dn);
        }
        if let Some(base_filter) = &self.ldap_base_filter {
            builder = builder.with_base_filter(base_filter);
        }
        if let Some(roles_ctx_dn) = &self.ldap_roles_ctx_dn {
            builder = builder.with_roles_ctx_dn(roles_ctx_dn);
        }
        if let Some(role_filter) = &self.ldap_role_filter {
            builder = builder.with_role_filter(role_filter);
        }
        Some(builder.build())
    }
}

#[derive(clap::Args)]
struct ComponentArgs {
    #[command(flatten)]
    run: RunOptions,

    #[arg(long)]
    namespace: NamespaceName,

    #[arg(long, value_enum, default_value = "kie-server")]
    component: Component,

    /// Position of the KIE Server, starting with 0
    #[arg(long, default_value_t = 0)]
    index: usize,
}

#[derive(clap::Args)]
struct ScaleArgs {
    #[command(flatten)]
    target: ComponentArgs,

    #[arg(long)]
    replicas: i32,
}

#[derive(clap::Args)]
struct UndeployArgs {
    #[command(flatten)]
    run: RunOptions,

    #[arg(long)]
    namespace: NamespaceName,
}

#[tokio::main]
#[snafu::report]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    match opts.cmd {
        Command::Crd => {
            KieApp::merged_crd(KieAppVersion::V2)
                .context(MergeCrdSnafu)?
                .print_yaml_schema(built_info::PKG_VERSION, SerializeOptions::default())
                .context(SerializeCrdSnafu)?;
        }
        Command::Deploy(args) => deploy(args).await?,
        Command::Scale(args) => scale(args).await?,
        Command::WaitForScale(args) => wait_for_scale(args).await?,
        Command::Undeploy(args) => undeploy(args).await?,
    }

    Ok(())
}

impl RunOptions {
    /// Initializes tracing and connects to the cluster
    ///
    /// The returned guard must be kept until the command is finished.
    async fn init(self) -> Result<(Tracing, Arc<Context>, config::FrameworkConfig, Backend)> {
        let RunOptions {
            common:
                CommonOptions {
                    telemetry,
                    cluster_info,
                },
            config,
            backend,
        } = self;

        let tracing_guard = Tracing::pre_configured(built_info::PKG_NAME, telemetry)
            .init()
            .context(InitTracingSnafu)?;

        tracing::info!(
            built_info.pkg_version = built_info::PKG_VERSION,
            built_info.git_version = built_info::GIT_VERSION,
            built_info.target = built_info::TARGET,
            built_info.built_time_utc = built_info::BUILT_TIME_UTC,
            built_info.rustc_version = built_info::RUSTC_VERSION,
            %backend,
            "Starting {description}",
            description = built_info::PKG_DESCRIPTION
        );

        let client = stackable_operator::client::initialize_operator(
            Some(FIELD_MANAGER.to_owned()),
            &cluster_info,
        )
        .await
        .context(CreateClientSnafu)?;
        let http_client = ReqwestClient::new().context(CreateHttpClientSnafu)?;

        let context = Arc::new(Context::new(
            Arc::new(KubeCluster::new(&client)),
            Arc::new(http_client),
            &config,
        ));

        Ok((tracing_guard, context, config, backend))
    }
}

async fn deploy(args: DeployArgs) -> Result<()> {
    let (_tracing_guard, context, config, backend) = args.run.init().await?;
    let kind = args.scenario;

    let mut builder = ScenarioBuilder::new(kind, backend, &config);
    if let Some(kie_server_id) = &args.kie_server_id {
        builder = builder.and_then(|builder| builder.with_kie_server_id(kie_server_id));
    }
    if let Some(dir) = &args.git_hooks_dir {
        builder = builder.and_then(|builder| builder.with_git_hooks_dir(dir));
    }
    if let (Some(url), Some(user), Some(password)) = (
        &args.maven_repo_url,
        &args.maven_repo_user,
        &args.maven_repo_password,
    ) {
        builder = builder.and_then(|builder| builder.with_external_maven_repo(url, user, password));
    }
    if let Some(hostname) = &args.workbench_hostname_http {
        builder = builder.and_then(|builder| builder.with_http_workbench_hostname(hostname));
    }
    if let Some(hostname) = &args.workbench_hostname_https {
        builder = builder.and_then(|builder| builder.with_https_workbench_hostname(hostname));
    }
    for (index, hostname) in args.kie_server_hostname_http.iter().enumerate() {
        builder = builder
            .and_then(|builder| builder.with_http_kie_server_hostname_at(index, hostname));
    }
    for (index, hostname) in args.kie_server_hostname_https.iter().enumerate() {
        builder = builder
            .and_then(|builder| builder.with_https_kie_server_hostname_at(index, hostname));
    }
    if let Some(ldap_settings) = args.ldap.settings() {
        builder = builder.and_then(|builder| builder.with_ldap_settings(&ldap_settings));
    }
    if let (Some(url), Some(realm), Some(user), Some(password)) = (
        &args.sso_url,
        &args.sso_realm,
        &args.sso_user,
        &args.sso_password,
    ) {
        let sso_settings = SsoSettings {
            url: url.clone(),
            realm: realm.clone(),
            user: user.clone(),
            password: password.clone(),
            disable_ssl_cert_validation: args.sso_disable_ssl_cert_validation,
        };
        builder = builder.and_then(|builder| builder.deploy_sso(&sso_settings));
    }
    let mut scenario = builder
        .and_then(|builder| builder.build())
        .context(BuildScenarioSnafu { kind })?;

    let provisioner = Provisioner::new(
        context,
        Arc::new(OcBinary::new(config.oc_binary.clone())),
        &config,
    );
    scenario
        .deploy(&provisioner)
        .await
        .context(DeployScenarioSnafu { kind })?;

    if let Some(namespace) = scenario.namespace() {
        println!("{namespace}");
    }
    Ok(())
}

async fn scale(args: ScaleArgs) -> Result<()> {
    let ScaleArgs { target, replicas } = args;
    let component = target.component;
    let (_tracing_guard, mut deployment) = target.into_deployment().await?;

    deployment
        .scale(replicas)
        .await
        .context(ScaleDeploymentSnafu { component })?;
    let state = deployment
        .wait_for_scale()
        .await
        .context(WaitForScaleSnafu { component })?;

    println!("{state}");
    Ok(())
}

async fn wait_for_scale(args: ComponentArgs) -> Result<()> {
    let component = args.component;
    let (_tracing_guard, mut deployment) = args.into_deployment().await?;

    let state = deployment
        .wait_for_scale()
        .await
        .context(WaitForScaleSnafu { component })?;

    println!("{state}");
    Ok(())
}

impl ComponentArgs {
    async fn into_deployment(self) -> Result<(Tracing, deployment::Deployment)> {
        let ComponentArgs {
            run,
            namespace,
            component,
            index,
        } = self;
        let (tracing_guard, context, config, backend) = run.init().await?;

        let deployment = scenario::existing_deployment(
            context,
            backend,
            component,
            index,
            &config.application_name,
            namespace,
        )
        .context(LocateDeploymentSnafu { component })?;

        Ok((tracing_guard, deployment))
    }
}

async fn undeploy(args: UndeployArgs) -> Result<()> {
    let UndeployArgs { run, namespace } = args;
    let (_tracing_guard, context, _, _) = run.init().await?;

    scenario::undeploy_namespace(&context, &namespace)
        .await
        .context(UndeploySnafu { namespace })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::LdapArgs;
    use crate::settings::backend::Backend;

    #[derive(clap::Parser)]
    struct TestOpts {
        #[command(flatten)]
        ldap: LdapArgs,
    }

    fn parse(args: &[&str]) -> Result<LdapArgs, clap::Error> {
        TestOpts::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .map(|opts| opts.ldap)
    }

    #[test]
    fn test_ldap_options_require_the_url() {
        let error = parse(&["--ldap-bind-dn", "uid=admin,ou=users,ou=example,ou=com"])
            .expect_err("should require the LDAP URL");
        assert_eq!(
            clap::error::ErrorKind::MissingRequiredArgument,
            error.kind()
        );

        assert!(
            parse(&[])
                .expect("should be valid arguments")
                .settings()
                .is_none()
        );

        let env = parse(&[
            "--ldap-url",
            "ldap://ldap.example.com:389",
            "--ldap-role-filter",
            "(memberOf={1})",
        ])
        .expect("should be valid arguments")
        .settings()
        .expect("should configure LDAP")
        .env_vars(Backend::Template);
        assert_eq!(
            Some("ldap://ldap.example.com:389"),
            env.get_value("AUTH_LDAP_URL")
        );
        assert_eq!(
            Some("(memberOf={1})"),
            env.get_value("AUTH_LDAP_ROLE_FILTER")
        );
    }
}
