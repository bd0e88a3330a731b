//! Model of the KieApp custom resource managed by the KIE operator
//!
//! The structure mirrors the schema of the external operator. Empty lists and absent values are
//! omitted on serialization, so that only the configured parts are submitted.

use serde::{Deserialize, Serialize};
use stackable_operator::{
    k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements},
    kube::CustomResource,
    schemars::{self, JsonSchema},
    versioned::versioned,
};

use crate::framework::{ServerName, builder::pod::container::EnvVarSet};

pub mod openshift;

#[versioned(version(name = "v2"))]
pub mod versioned {

    /// A KIE application (Workbench, KIE Servers, Smart Router, ...) deployed by the KIE operator
    #[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[versioned(k8s(
        group = "app.kiegroup.org",
        kind = "KieApp",
        plural = "kieapps",
        shortname = "kieapp",
        status = "v2::KieAppStatus",
        namespaced,
        crates(
            kube_core = "stackable_operator::kube::core",
            k8s_openapi = "stackable_operator::k8s_openapi",
            schemars = "stackable_operator::schemars"
        )
    ))]
    #[serde(rename_all = "camelCase")]
    pub struct KieAppSpec {
        /// Environment template, e.g. `rhpam-authoring` or `rhpam-production`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub environment: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub common_config: Option<CommonConfig>,

        #[serde(default, skip_serializing_if = "Objects::is_empty")]
        pub objects: Objects,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub auth: Option<Auth>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub image_registry: Option<ImageRegistry>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub upgrades: Option<Upgrades>,

        /// Product version
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub use_image_tags: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CommonConfig {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub admin_user: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub admin_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_cluster_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub application_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub controller_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub db_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub image_tag: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub key_store_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub maven_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub server_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub disable_ssl: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Objects {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub console: Option<Console>,

        /// KIE Servers, addressed by their unique names
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub servers: Vec<Server>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub smart_router: Option<SmartRouter>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub process_migration: Option<ProcessMigration>,
    }

    /// Workbench or monitoring console
    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Console {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub env: Vec<EnvVar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub keystore_secret: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub replicas: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub sso_client: Option<SsoClient>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub resources: Option<ResourceRequirements>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub route_hostname: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Server {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub env: Vec<EnvVar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub keystore_secret: Option<String>,
        /// Number of KIE Server deployments created from this entry
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub deployments: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub replicas: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub sso_client: Option<SsoClient>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub resources: Option<ResourceRequirements>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub build: Option<Build>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub jms: Option<Jms>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SmartRouter {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub env: Vec<EnvVar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub keystore_secret: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub replicas: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub resources: Option<ResourceRequirements>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProcessMigration {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub image: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub image_tag: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub database: Option<ProcessMigrationDatabase>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProcessMigrationDatabase {
        /// `h2`, `mysql`, `postgresql` or `external`
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        pub database_type: Option<String>,
    }

    /// S2I build of a KIE Server image
    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Build {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub artifact_dir: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub git_source: Option<GitSource>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub kie_server_container_deployment: Option<String>,
        #[serde(default, rename = "mavenMirrorURL", skip_serializing_if = "Option::is_none")]
        pub maven_mirror_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub extension_image_stream_tag: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub extension_image_stream_tag_namespace: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub extension_image_install_dir: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GitSource {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub reference: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub context_dir: Option<String>,
    }

    /// JMS integration of a KIE Server with AMQ
    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Jms {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub enable_integration: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_secret_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_truststore_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_truststore_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_keystore_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_keystore_password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub executor: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_executor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub executor_transacted: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_request: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_response: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub enable_signal: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_signal: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub enable_audit: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_audit: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub audit_transacted: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amq_queues: Option<String>,
        #[serde(default, rename = "amqEnableSSL", skip_serializing_if = "Option::is_none")]
        pub amq_enable_ssl: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Auth {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ldap: Option<Ldap>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub sso: Option<Sso>,
    }

    /// LDAP login module of the Workbench and the KIE Servers
    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Ldap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub url: Option<String>,
        #[serde(default, rename = "bindDN", skip_serializing_if = "Option::is_none")]
        pub bind_dn: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub bind_credential: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub jaas_security_domain: Option<String>,
        #[serde(default, rename = "baseCtxDN", skip_serializing_if = "Option::is_none")]
        pub base_ctx_dn: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub base_filter: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub search_scope: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub search_time_limit: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub distinguished_name_attribute: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub parse_username: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub username_begin_string: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub username_end_string: Option<String>,
        #[serde(default, rename = "roleAttributeID", skip_serializing_if = "Option::is_none")]
        pub role_attribute_id: Option<String>,
        #[serde(default, rename = "rolesCtxDN", skip_serializing_if = "Option::is_none")]
        pub roles_ctx_dn: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub role_filter: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub role_recursion: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub default_role: Option<String>,
        #[serde(default, rename = "roleNameAttributeID", skip_serializing_if = "Option::is_none")]
        pub role_name_attribute_id: Option<String>,
        #[serde(default, rename = "parseRoleNameFromDN", skip_serializing_if = "Option::is_none")]
        pub parse_role_name_from_dn: Option<bool>,
        #[serde(default, rename = "roleAttributeIsDN", skip_serializing_if = "Option::is_none")]
        pub role_attribute_is_dn: Option<bool>,
        #[serde(
            default,
            rename = "referralUserAttributeIDToCheck",
            skip_serializing_if = "Option::is_none"
        )]
        pub referral_user_attribute_id_to_check: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Sso {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub realm: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub admin_user: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub admin_password: Option<String>,
        #[serde(
            default,
            rename = "disableSSLCertValidation",
            skip_serializing_if = "Option::is_none"
        )]
        pub disable_ssl_cert_validation: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SsoClient {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub secret: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageRegistry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub registry: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub insecure: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Upgrades {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub enabled: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub minor: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct KieAppStatus {
        /// Specification as applied by the operator, including the generated defaults
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub applied: Option<KieAppSpec>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub conditions: Vec<Condition>,
    }

    #[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Condition {
        /// `Deployed`, `Provisioning` or `Failed`
        #[serde(rename = "type")]
        pub condition_type: String,
        pub status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_transition_time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }
}

impl v2::Objects {
    pub fn is_empty(&self) -> bool {
        self.console.is_none()
            && self.servers.is_empty()
            && self.smart_router.is_none()
            && self.process_migration.is_none()
    }

    /// Finds the server entry with the given name
    pub fn server(&self, name: &ServerName) -> Option<&v2::Server> {
        self.servers
            .iter()
            .find(|server| server.name.as_deref() == Some(name.as_ref()))
    }

    pub fn server_mut(&mut self, name: &ServerName) -> Option<&mut v2::Server> {
        self.servers
            .iter_mut()
            .find(|server| server.name.as_deref() == Some(name.as_ref()))
    }

    /// Names of all server entries in the order of their definition
    pub fn server_names(&self) -> Vec<String> {
        self.servers
            .iter()
            .filter_map(|server| server.name.clone())
            .collect()
    }
}

impl v2::KieApp {
    /// The last applied specification, if the operator already reconciled this KieApp
    pub fn applied_spec(&self) -> Option<&v2::KieAppSpec> {
        self.status
            .as_ref()
            .and_then(|status| status.applied.as_ref())
    }

    pub fn is_deployed(&self) -> bool {
        self.status.as_ref().is_some_and(|status| {
            status
                .conditions
                .last()
                .is_some_and(|condition| condition.condition_type == "Deployed")
        })
    }
}

/// Appends the given variables to a container environment
///
/// Variables already defined with the same name are overridden.
pub fn merge_env(env: &mut Vec<EnvVar>, additional_env: EnvVarSet) {
    let merged = EnvVarSet::from(std::mem::take(env)).merge(additional_env);
    *env = merged.into();
}
