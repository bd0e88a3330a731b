//! Configuration of the framework
//!
//! Every value can be given as command line argument or as environment variable.

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use snafu::{OptionExt, ResultExt, Snafu};
use stackable_operator::time::Duration;
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::{framework::ApplicationName, settings::template::Template};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("template URL must be given as <property-key>=<url>, got {value:?}"))]
    MissingTemplateUrlSeparator { value: String },

    #[snafu(display("unknown template property key {key:?}"))]
    UnknownTemplate {
        source: strum::ParseError,
        key: String,
    },

    #[snafu(display("no URL configured for the template {template}"))]
    MissingTemplateUrl { template: Template },
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(clap::Args, Clone, Debug)]
pub struct FrameworkConfig {
    /// Name of the KIE application, used as prefix of all service names
    #[arg(long, env = "KIE_APP_NAME", default_value = "myapp")]
    pub application_name: ApplicationName,

    /// Prefix of the generated project names
    #[arg(long, env = "OPENSHIFT_NAMESPACE_PREFIX")]
    pub namespace_prefix: Option<String>,

    /// Suffix of route hostnames generated by the OpenShift router, e.g. ".apps.example.com"
    #[arg(long, env = "DEFAULT_DOMAIN_SUFFIX", default_value = ".apps.example.com")]
    pub default_domain_suffix: String,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Secret with the keystores of the HTTPS endpoints, provided by the templates
    #[arg(long, env = "KIE_APP_SECRET", default_value = "kie-app-secret")]
    pub https_secret: String,

    #[command(flatten)]
    pub timeouts: Timeouts,

    /// URL of an OpenShift template, e.g.
    /// "kie.app.template.kie-server=https://example.com/rhpam-kieserver.yaml"
    #[arg(long = "template-url", value_parser = parse_template_url)]
    pub template_urls: Vec<(Template, String)>,

    /// Path of the OpenShift command line client used to process templates
    #[arg(long, env = "OC_BINARY", default_value = "oc")]
    pub oc_binary: PathBuf,

    /// Image of the Ansible Playbook Bundle
    #[arg(
        long,
        env = "APB_IMAGE",
        default_value = "registry.redhat.io/rhpam-7/rhpam-apb:latest"
    )]
    pub apb_image: String,
}

/// Users of the deployed KIE components
#[derive(clap::Args, Clone, Debug)]
pub struct Credentials {
    #[arg(long, env = "KIE_SERVER_USER", default_value = "yoda")]
    pub kie_server_user: String,

    #[arg(long, env = "KIE_SERVER_PWD", default_value = "usetheforce123@")]
    pub kie_server_password: String,

    #[arg(long, env = "WORKBENCH_USER", default_value = "adminUser")]
    pub workbench_user: String,

    #[arg(long, env = "WORKBENCH_PWD", default_value = "adminUser1!")]
    pub workbench_password: String,

    #[arg(long, env = "CONTROLLER_USER", default_value = "controllerUser")]
    pub controller_user: String,

    #[arg(long, env = "CONTROLLER_PWD", default_value = "controllerUser1!")]
    pub controller_password: String,

    #[arg(long, env = "MAVEN_USER", default_value = "mavenUser")]
    pub maven_user: String,

    #[arg(long, env = "MAVEN_PWD", default_value = "mavenUser1!")]
    pub maven_password: String,
}

#[derive(clap::Args, Clone, Debug)]
pub struct Timeouts {
    /// Time to wait until the Pods of a deployment are ready
    #[arg(long, env = "PODS_START_TO_READY_TIMEOUT", default_value = "10m")]
    pub pods_start_to_ready: Duration,

    /// Time to wait until the Pods of an operator managed deployment are ready
    #[arg(long, env = "OPERATOR_START_TO_READY_TIMEOUT", default_value = "20m")]
    pub operator_start_to_ready: Duration,

    /// Time to wait until the operator reconciled a KieApp or the provisioned resources exist
    #[arg(long, env = "RECONCILIATION_TIMEOUT", default_value = "1m")]
    pub reconciliation: Duration,

    /// Time to wait until a route serves requests
    #[arg(long, env = "ROUTER_TIMEOUT", default_value = "5s")]
    pub router: Duration,

    /// Interval between two checks
    #[arg(long, env = "POLL_INTERVAL", default_value = "1s")]
    pub poll_interval: Duration,
}

impl FrameworkConfig {
    /// URL of the given template
    pub fn template_url(&self, template: Template) -> Result<&str> {
        self.template_urls()
            .get(&template)
            .copied()
            .context(MissingTemplateUrlSnafu { template })
    }

    /// Configured template URLs; later arguments override earlier ones
    pub fn template_urls(&self) -> BTreeMap<Template, &str> {
        self.template_urls
            .iter()
            .map(|(template, url)| (*template, url.as_str()))
            .collect()
    }
}

fn parse_template_url(value: &str) -> Result<(Template, String)> {
    let (key, url) = value
        .split_once('=')
        .context(MissingTemplateUrlSeparatorSnafu { value })?;
    let template = Template::from_str(key).context(UnknownTemplateSnafu { key })?;

    Ok((template, url.to_owned()))
}

#[cfg(test)]
pub mod tests {
    use clap::Parser;

    use super::{ErrorDiscriminants, FrameworkConfig, parse_template_url};
    use crate::settings::template::Template;

    #[derive(clap::Parser)]
    struct TestOpts {
        #[command(flatten)]
        config: FrameworkConfig,
    }

    /// Configuration with the default values and the given additional arguments
    pub fn test_config(args: &[&str]) -> FrameworkConfig {
        TestOpts::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .expect("should be valid arguments")
            .config
    }

    #[test]
    fn test_defaults() {
        let config = test_config(&[]);

        assert_eq!("myapp", config.application_name.to_string());
        assert_eq!("yoda", config.credentials.kie_server_user);
        assert_eq!(
            std::time::Duration::from_secs(600),
            *config.timeouts.pods_start_to_ready
        );
        assert_eq!(
            std::time::Duration::from_secs(5),
            *config.timeouts.router
        );
    }

    #[test]
    fn test_template_urls() {
        let config = test_config(&[
            "--template-url",
            "kie.app.template.kie-server=https://example.com/old.yaml",
            "--template-url",
            "kie.app.template.kie-server=https://example.com/kieserver.yaml",
        ]);

        assert_eq!(
            Ok("https://example.com/kieserver.yaml"),
            config
                .template_url(Template::KieServer)
                .map_err(ErrorDiscriminants::from)
        );
        assert_eq!(
            Err(ErrorDiscriminants::MissingTemplateUrl),
            config
                .template_url(Template::Workbench)
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_parse_template_url() {
        assert_eq!(
            Err(ErrorDiscriminants::MissingTemplateUrlSeparator),
            parse_template_url("kie.app.template.kie-server").map_err(ErrorDiscriminants::from)
        );
        assert_eq!(
            Err(ErrorDiscriminants::UnknownTemplate),
            parse_template_url("kie.app.template.unknown=https://example.com")
                .map_err(ErrorDiscriminants::from)
        );
    }
}
