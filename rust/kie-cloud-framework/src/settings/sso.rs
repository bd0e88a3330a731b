//! Single sign-on with Red Hat SSO
//!
//! The Workbench and the KIE Servers are registered as clients of an existing realm.

use super::backend::Backend;
use crate::{crd::v2, framework::builder::pod::container::EnvVarSet};

pub const WORKBENCH_SSO_CLIENT: &str = "workbench-client";
pub const WORKBENCH_SSO_SECRET: &str = "workbench-secret";
pub const KIE_SERVER_SSO_CLIENT: &str = "kie-server-client";
pub const KIE_SERVER_SSO_SECRET: &str = "kie-server-secret";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SsoSettings {
    /// URL of the SSO server including the context path, e.g. "https://sso.example.com/auth"
    pub url: String,
    pub realm: String,
    pub user: String,
    pub password: String,
    pub disable_ssl_cert_validation: bool,
}

impl SsoSettings {
    /// Variables of the templates or the APB image
    ///
    /// Templates with several KIE Servers register a client per server. Operator managed
    /// deployments are configured with [`SsoSettings::to_crd`] and [`kie_server_client`] instead.
    pub fn env_vars(&self, backend: Backend, kie_servers: usize) -> EnvVarSet {
        let keys = match backend {
            Backend::Template | Backend::Operator => [
                "SSO_URL",
                "SSO_REALM",
                "SSO_USERNAME",
                "SSO_PASSWORD",
                "SSO_DISABLE_SSL_CERTIFICATE_VALIDATION",
                "BUSINESS_CENTRAL_SSO_CLIENT",
                "BUSINESS_CENTRAL_SSO_SECRET",
            ],
            Backend::Apb => [
                "apb_sso_url",
                "apb_sso_realm",
                "apb_sso_user",
                "apb_sso_pwd",
                "apb_sso_disable_ssl_cert_validation",
                "apb_sso_businesscentral_client",
                "apb_sso_businesscentral_client_secret",
            ],
        };
        let disable_ssl_cert_validation = self.disable_ssl_cert_validation.to_string();
        let values: [&str; 7] = [
            &self.url,
            &self.realm,
            &self.user,
            &self.password,
            &disable_ssl_cert_validation,
            WORKBENCH_SSO_CLIENT,
            WORKBENCH_SSO_SECRET,
        ];

        let kie_server_clients = match backend {
            Backend::Apb => vec![
                ("apb_kieserver_sso_client".to_owned(), KIE_SERVER_SSO_CLIENT.to_owned()),
                (
                    "apb_kieserver_sso_client_secret".to_owned(),
                    KIE_SERVER_SSO_SECRET.to_owned(),
                ),
            ],
            Backend::Template | Backend::Operator if kie_servers > 1 => (1..=kie_servers)
                .flat_map(|n| {
                    [
                        (format!("KIE_SERVER{n}_SSO_CLIENT"), format!("kie-server{n}-client")),
                        (format!("KIE_SERVER{n}_SSO_SECRET"), format!("kie-server{n}-secret")),
                    ]
                })
                .collect(),
            Backend::Template | Backend::Operator => vec![
                ("KIE_SERVER_SSO_CLIENT".to_owned(), KIE_SERVER_SSO_CLIENT.to_owned()),
                ("KIE_SERVER_SSO_SECRET".to_owned(), KIE_SERVER_SSO_SECRET.to_owned()),
            ],
        };

        EnvVarSet::new()
            .with_values(keys.into_iter().zip(values))
            .with_values(kie_server_clients)
    }

    /// SSO section of the KieApp
    pub fn to_crd(&self) -> v2::Sso {
        v2::Sso {
            url: Some(self.url.clone()),
            realm: Some(self.realm.clone()),
            admin_user: Some(self.user.clone()),
            admin_password: Some(self.password.clone()),
            disable_ssl_cert_validation: Some(self.disable_ssl_cert_validation),
        }
    }
}

pub fn workbench_client() -> v2::SsoClient {
    v2::SsoClient {
        name: Some(WORKBENCH_SSO_CLIENT.to_owned()),
        secret: Some(WORKBENCH_SSO_SECRET.to_owned()),
    }
}

/// Client of the KIE Server at the given position in the KieApp
pub fn kie_server_client(index: usize) -> v2::SsoClient {
    v2::SsoClient {
        name: Some(format!("kie-server-{index}-client")),
        secret: Some(format!("kie-server-{index}-secret")),
    }
}
