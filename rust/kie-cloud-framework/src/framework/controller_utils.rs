//! Helper functions to read the identity of custom resources

use std::str::FromStr;

use snafu::{OptionExt, ResultExt, Snafu};
use stackable_operator::kube::runtime::reflector::Lookup;
use strum::{EnumDiscriminants, IntoStaticStr};

use crate::framework::ApplicationName;

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to get the application name"))]
    GetApplicationName {},

    #[snafu(display("failed to set the application name"))]
    ParseApplicationName { source: crate::framework::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Get the application name from the given KieApp
pub fn get_application_name(kie_app: &impl Lookup) -> Result<ApplicationName> {
    let raw_application_name = kie_app.name().context(GetApplicationNameSnafu)?;
    let application_name =
        ApplicationName::from_str(&raw_application_name).context(ParseApplicationNameSnafu)?;

    Ok(application_name)
}

#[cfg(test)]
mod tests {
    use stackable_operator::kube::runtime::reflector::Lookup;

    use super::{ErrorDiscriminants, get_application_name};
    use crate::framework::ApplicationName;

    #[derive(Debug, Default)]
    struct TestResource {
        name: Option<&'static str>,
    }

    impl Lookup for TestResource {
        type DynamicType = ();

        fn kind(_dyntype: &Self::DynamicType) -> std::borrow::Cow<'_, str> {
            "".into()
        }

        fn group(_dyntype: &Self::DynamicType) -> std::borrow::Cow<'_, str> {
            todo!()
        }

        fn version(_dyntype: &Self::DynamicType) -> std::borrow::Cow<'_, str> {
            todo!()
        }

        fn plural(_dyntype: &Self::DynamicType) -> std::borrow::Cow<'_, str> {
            todo!()
        }

        fn name(&self) -> Option<std::borrow::Cow<'_, str>> {
            self.name.map(std::borrow::Cow::Borrowed)
        }

        fn namespace(&self) -> Option<std::borrow::Cow<'_, str>> {
            None
        }

        fn resource_version(&self) -> Option<std::borrow::Cow<'_, str>> {
            todo!()
        }

        fn uid(&self) -> Option<std::borrow::Cow<'_, str>> {
            todo!()
        }
    }

    #[test]
    fn test_get_application_name() {
        assert_eq!(
            ApplicationName::from_str_unsafe("myapp"),
            get_application_name(&TestResource {
                name: Some("myapp"),
            })
            .expect("should contain a valid application name")
        );

        assert_eq!(
            Err(ErrorDiscriminants::GetApplicationName),
            get_application_name(&TestResource::default()).map_err(ErrorDiscriminants::from)
        );

        assert_eq!(
            Err(ErrorDiscriminants::ParseApplicationName),
            get_application_name(&TestResource {
                name: Some("my app"),
            })
            .map_err(ErrorDiscriminants::from)
        );
    }
}
