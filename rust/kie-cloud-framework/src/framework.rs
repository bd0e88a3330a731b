// Type-safe wrappers that cannot throw errors
// The point is, to move the validation "upwards".

use std::{fmt::Display, str::FromStr};

use kvp::label::MAX_LABEL_VALUE_LENGTH;
use snafu::{ResultExt, Snafu, ensure};
use stackable_operator::kvp::LabelValue;
use strum::{EnumDiscriminants, IntoStaticStr};

pub mod builder;
pub mod controller_utils;
pub mod kvp;
pub mod types;

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("maximum length exceeded"))]
    LengthExceeded { length: usize, max_length: usize },

    #[snafu(display("object name not RFC 1123 compliant"))]
    InvalidObjectName {
        source: stackable_operator::validation::Errors,
    },

    #[snafu(display("failed to use as label"))]
    InvalidLabelValue {
        source: stackable_operator::kvp::LabelValueError,
    },
}

/// Has a name that can be used as a DNS subdomain name as defined in RFC 1123.
/// Most resource types, e.g. a Pod, require such a compliant name.
pub trait HasObjectName {
    fn to_object_name(&self) -> String;
}

/// Is a valid label value as defined in RFC 1123.
pub trait IsLabelValue {
    fn to_label_value(&self) -> String;
}

/// Restricted string type with attributes like maximum length.
macro_rules! attributed_string_type {
    ($name:ident, $description:literal, $example:literal $(, $attribute:tt)*) => {
        #[doc = concat!($description, ", e.g. \"", $example, "\"")]
        #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name(String);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {

                $(attributed_string_type!(@from_str $name, s, $attribute);)*

                Ok(Self(s.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(test)]
        impl $name {
            #[allow(dead_code)]
            pub fn from_str_unsafe(s: &str) -> Self {
                FromStr::from_str(s).expect("should be a valid {name}")
            }

            // A dead_code warning is emitted if there is no unit test that calls this function.
            pub fn test_example() {
                Self::from_str_unsafe($example);
            }
        }

        $(attributed_string_type!(@trait_impl $name, $attribute);)*
    };
    (@from_str $name:ident, $s:expr, (max_length = $max_length:expr)) => {
        let length = $s.len() as usize;
        ensure!(
            length <= $name::MAX_LENGTH,
            LengthExceededSnafu {
                length,
                max_length: $name::MAX_LENGTH,
            }
        );
    };
    (@from_str $name:ident, $s:expr, is_object_name) => {
        stackable_operator::validation::is_lowercase_rfc_1123_subdomain($s).context(InvalidObjectNameSnafu)?;
    };
    (@from_str $name:ident, $s:expr, is_valid_label_value) => {
        LabelValue::from_str($s).context(InvalidLabelValueSnafu)?;
    };
    (@trait_impl $name:ident, (max_length = $max_length:expr)) => {
        impl $name {
            // type arithmetic would be better
            pub const MAX_LENGTH: usize = $max_length;
        }
    };
    (@trait_impl $name:ident, is_object_name) => {
        impl HasObjectName for $name {
            fn to_object_name(&self) -> String {
                self.0.clone()
            }
        }
    };
    (@trait_impl $name:ident, is_valid_label_value) => {
        impl IsLabelValue for $name {
            fn to_label_value(&self) -> String {
                self.0.clone()
            }
        }
    };
}

attributed_string_type! {
    ApplicationName,
    "The name of a KIE application, used as the KieApp name and as prefix of the service names",
    "myapp",
    // Suffixes like "-kieserver-2" are added to produce service names. OpenShift also restricts
    // route hostnames, which contain the service name and the namespace.
    (max_length = 30),
    is_object_name,
    is_valid_label_value
}
attributed_string_type! {
    ServiceName,
    "The name of a Service exposing a KIE component",
    "myapp-kieserver",
    (max_length = MAX_LABEL_VALUE_LENGTH),
    is_object_name,
    is_valid_label_value
}
attributed_string_type! {
    ServerName,
    "The name of a server entry in the KieApp objects",
    "myapp-kieserver-2",
    (max_length = MAX_LABEL_VALUE_LENGTH),
    is_object_name,
    is_valid_label_value
}
attributed_string_type! {
    WorkloadName,
    "The name of a DeploymentConfig",
    "myapp-rhpamcentr",
    (max_length = MAX_LABEL_VALUE_LENGTH),
    is_object_name,
    is_valid_label_value
}
attributed_string_type! {
    NamespaceName,
    "The name of a Namespace or OpenShift project",
    "kie-3f2a",
    (max_length = MAX_LABEL_VALUE_LENGTH),
    is_object_name,
    is_valid_label_value
}

impl From<ServiceName> for ServerName {
    fn from(value: ServiceName) -> Self {
        // Both types share the same restrictions.
        ServerName(value.0)
    }
}

impl From<&ServiceName> for WorkloadName {
    fn from(value: &ServiceName) -> Self {
        // The DeploymentConfig of a KIE component is named after its service.
        WorkloadName(value.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{
        ApplicationName, ErrorDiscriminants, NamespaceName, ServerName, ServiceName, WorkloadName,
    };
    use crate::framework::{HasObjectName, IsLabelValue};

    #[test]
    fn test_attributed_string_type_examples() {
        ApplicationName::test_example();
        ServiceName::test_example();
        ServerName::test_example();
        WorkloadName::test_example();
        NamespaceName::test_example();
    }

    #[test]
    fn test_attributed_string_type_fmt() {
        assert_eq!(
            "myapp-kieserver".to_owned(),
            format!("{}", ServiceName::from_str_unsafe("myapp-kieserver"))
        );
    }

    #[test]
    fn test_attributed_string_type_max_length() {
        assert_eq!(30, ApplicationName::MAX_LENGTH);

        assert!(ApplicationName::from_str(&"a".repeat(ApplicationName::MAX_LENGTH)).is_ok());
        assert_eq!(
            Err(ErrorDiscriminants::LengthExceeded),
            ApplicationName::from_str(&"a".repeat(ApplicationName::MAX_LENGTH + 1))
                .map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_attributed_string_type_is_object_name() {
        assert_eq!(
            "myapp-kieserver",
            ServiceName::from_str_unsafe("myapp-kieserver").to_object_name()
        );
        // A valid object name contains only lowercase characters.
        assert_eq!(
            Err(ErrorDiscriminants::InvalidObjectName),
            ServiceName::from_str("MyApp-KieServer").map_err(ErrorDiscriminants::from)
        );
    }

    #[test]
    fn test_attributed_string_type_is_valid_label_value() {
        assert_eq!(
            "myapp-rhpamcentr",
            WorkloadName::from_str_unsafe("myapp-rhpamcentr").to_label_value()
        );
    }

    #[test]
    fn test_conversions_between_names() {
        let service_name = ServiceName::from_str_unsafe("myapp-kieserver");

        assert_eq!(
            WorkloadName::from_str_unsafe("myapp-kieserver"),
            WorkloadName::from(&service_name)
        );
        assert_eq!(
            ServerName::from_str_unsafe("myapp-kieserver"),
            ServerName::from(service_name)
        );
    }
}
