//! LDAP login module of the Workbench and the KIE Servers

use std::{num::ParseIntError, str::ParseBoolError};

use snafu::{ResultExt, Snafu};
use strum::{EnumDiscriminants, IntoStaticStr};

use super::backend::Backend;
use crate::{crd::v2, framework::builder::pod::container::EnvVarSet};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("LDAP setting {key} must be a boolean, got {value:?}"))]
    ParseBool {
        source: ParseBoolError,
        key: &'static str,
        value: String,
    },

    #[snafu(display("LDAP setting {key} must be a number, got {value:?}"))]
    ParseNumber {
        source: ParseIntError,
        key: &'static str,
        value: String,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// LDAP settings
///
/// The values are kept as given; empty values are treated as not set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LdapSettings {
    pub url: Option<String>,
    pub bind_dn: Option<String>,
    pub bind_credential: Option<String>,
    pub jaas_security_domain: Option<String>,
    pub base_ctx_dn: Option<String>,
    pub base_filter: Option<String>,
    pub search_scope: Option<String>,
    pub search_time_limit: Option<String>,
    pub distinguished_name_attribute: Option<String>,
    pub parse_username: Option<String>,
    pub username_begin_string: Option<String>,
    pub username_end_string: Option<String>,
    pub role_attribute_id: Option<String>,
    pub roles_ctx_dn: Option<String>,
    pub role_filter: Option<String>,
    pub role_recursion: Option<String>,
    pub default_role: Option<String>,
    pub role_name_attribute_id: Option<String>,
    pub parse_role_name_from_dn: Option<String>,
    pub role_attribute_is_dn: Option<String>,
    pub referral_user_attribute_id_to_check: Option<String>,
}

impl LdapSettings {
    pub fn builder() -> LdapSettingsBuilder {
        LdapSettingsBuilder::default()
    }

    /// Variables of the backend; values which are not set or empty are omitted
    ///
    /// The operator passes the settings in the KieApp, see [`LdapSettings::to_crd`]. The KIE
    /// images read the same variables as the templates.
    pub fn env_vars(&self, backend: Backend) -> EnvVarSet {
        self.entries()
            .into_iter()
            .filter_map(|(template_key, apb_key, value)| {
                let value = value.filter(|value| !value.is_empty())?;
                let key = match backend {
                    Backend::Template | Backend::Operator => template_key,
                    Backend::Apb => apb_key,
                };
                Some((key, value))
            })
            .fold(EnvVarSet::new(), |env, (key, value)| env.with_value(key, value))
    }

    /// LDAP section of the KieApp
    pub fn to_crd(&self) -> Result<v2::Ldap> {
        Ok(v2::Ldap {
            url: non_empty(&self.url),
            bind_dn: non_empty(&self.bind_dn),
            bind_credential: non_empty(&self.bind_credential),
            jaas_security_domain: non_empty(&self.jaas_security_domain),
            base_ctx_dn: non_empty(&self.base_ctx_dn),
            base_filter: non_empty(&self.base_filter),
            search_scope: non_empty(&self.search_scope),
            search_time_limit: parse_number("searchTimeLimit", &self.search_time_limit)?,
            distinguished_name_attribute: non_empty(&self.distinguished_name_attribute),
            parse_username: parse_bool("parseUsername", &self.parse_username)?,
            username_begin_string: non_empty(&self.username_begin_string),
            username_end_string: non_empty(&self.username_end_string),
            role_attribute_id: non_empty(&self.role_attribute_id),
            roles_ctx_dn: non_empty(&self.roles_ctx_dn),
            role_filter: non_empty(&self.role_filter),
            role_recursion: parse_number("roleRecursion", &self.role_recursion)?,
            default_role: non_empty(&self.default_role),
            role_name_attribute_id: non_empty(&self.role_name_attribute_id),
            parse_role_name_from_dn: parse_bool(
                "parseRoleNameFromDN",
                &self.parse_role_name_from_dn,
            )?,
            role_attribute_is_dn: parse_bool("roleAttributeIsDN", &self.role_attribute_is_dn)?,
            referral_user_attribute_id_to_check: non_empty(
                &self.referral_user_attribute_id_to_check,
            ),
        })
    }

    fn entries(&self) -> [(&'static str, &'static str, Option<&str>); 21] {
        [
            ("AUTH_LDAP_URL", "apb_auth_ldap_url", self.url.as_deref()),
            (
                "AUTH_LDAP_BIND_DN",
                "apb_auth_ldap_bind_dn",
                self.bind_dn.as_deref(),
            ),
            (
                "AUTH_LDAP_BIND_CREDENTIAL",
                "apb_auth_ldap_bind_credential",
                self.bind_credential.as_deref(),
            ),
            (
                "AUTH_LDAP_JAAS_SECURITY_DOMAIN",
                "apb_auth_ldap_jaas_security_domain",
                self.jaas_security_domain.as_deref(),
            ),
            (
                "AUTH_LDAP_BASE_CTX_DN",
                "apb_auth_ldap_base_ctx_dn",
                self.base_ctx_dn.as_deref(),
            ),
            (
                "AUTH_LDAP_BASE_FILTER",
                "apb_auth_ldap_base_filter",
                self.base_filter.as_deref(),
            ),
            (
                "AUTH_LDAP_SEARCH_SCOPE",
                "apb_auth_ldap_search_scope",
                self.search_scope.as_deref(),
            ),
            (
                "AUTH_LDAP_SEARCH_TIME_LIMIT",
                "apb_auth_ldap_search_time_limit",
                self.search_time_limit.as_deref(),
            ),
            (
                "AUTH_LDAP_DISTINGUISHED_NAME_ATTRIBUTE",
                "apb_auth_ldap_distinguished_name_attribute",
                self.distinguished_name_attribute.as_deref(),
            ),
            (
                "AUTH_LDAP_PARSE_USERNAME",
                "apb_auth_ldap_parse_username",
                self.parse_username.as_deref(),
            ),
            (
                "AUTH_LDAP_USERNAME_BEGIN_STRING",
                "apb_auth_ldap_username_begin_string",
                self.username_begin_string.as_deref(),
            ),
            (
                "AUTH_LDAP_USERNAME_END_STRING",
                "apb_auth_ldap_username_end_string",
                self.username_end_string.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLE_ATTRIBUTE_ID",
                "apb_auth_ldap_role_attribute_id",
                self.role_attribute_id.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLES_CTX_DN",
                "apb_auth_ldap_roles_ctx_dn",
                self.roles_ctx_dn.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLE_FILTER",
                "apb_auth_ldap_role_filter",
                self.role_filter.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLE_RECURSION",
                "apb_auth_ldap_role_recursion",
                self.role_recursion.as_deref(),
            ),
            (
                "AUTH_LDAP_DEFAULT_ROLE",
                "apb_auth_ldap_default_role",
                self.default_role.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLE_NAME_ATTRIBUTE_ID",
                "apb_auth_ldap_role_name_attribute_id",
                self.role_name_attribute_id.as_deref(),
            ),
            (
                "AUTH_LDAP_PARSE_ROLE_NAME_FROM_DN",
                "apb_auth_ldap_parse_role_name_from_dn",
                self.parse_role_name_from_dn.as_deref(),
            ),
            (
                "AUTH_LDAP_ROLE_ATTRIBUTE_IS_DN",
                "apb_auth_ldap_role_attribute_is_dn",
                self.role_attribute_is_dn.as_deref(),
            ),
            (
                "AUTH_LDAP_REFERRAL_USER_ATTRIBUTE_ID_TO_CHECK",
                "apb_auth_ldap_referral_user_attribute_id_to_check",
                self.referral_user_attribute_id_to_check.as_deref(),
            ),
        ]
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn parse_bool(key: &'static str, value: &Option<String>) -> Result<Option<bool>> {
    non_empty(value)
        .map(|value| value.parse().context(ParseBoolSnafu { key, value }))
        .transpose()
}

fn parse_number(key: &'static str, value: &Option<String>) -> Result<Option<i64>> {
    non_empty(value)
        .map(|value| value.parse().context(ParseNumberSnafu { key, value }))
        .transpose()
}

/// Builder for [`LdapSettings`]
#[derive(Clone, Debug, Default)]
pub struct LdapSettingsBuilder {
    settings: LdapSettings,
}

macro_rules! ldap_setters {
    ($($setter:ident => $field:ident),* $(,)?) => {
        impl LdapSettingsBuilder {
            $(
                pub fn $setter(mut self, value: impl Into<String>) -> Self {
                    self.settings.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

ldap_setters!(
    with_url => url,
    with_bind_dn => bind_dn,
    with_bind_credential => bind_credential,
    with_jaas_security_domain => jaas_security_domain,
    with_base_ctx_dn => base_ctx_dn,
    with_base_filter => base_filter,
    with_search_scope => search_scope,
    with_search_time_limit => search_time_limit,
    with_distinguished_name_attribute => distinguished_name_attribute,
    with_parse_username => parse_username,
    with_username_begin_string => username_begin_string,
    with_username_end_string => username_end_string,
    with_role_attribute_id => role_attribute_id,
    with_roles_ctx_dn => roles_ctx_dn,
    with_role_filter => role_filter,
    with_role_recursion => role_recursion,
    with_default_role => default_role,
    with_role_name_attribute_id => role_name_attribute_id,
    with_parse_role_name_from_dn => parse_role_name_from_dn,
    with_role_attribute_is_dn => role_attribute_is_dn,
    with_referral_user_attribute_id_to_check => referral_user_attribute_id_to_check,
);

impl LdapSettingsBuilder {
    pub fn build(&self) -> LdapSettings {
        self.settings.clone()
    }
}
