//! Common types that do not belong (yet) to a more specific module
use snafu::{ResultExt, Snafu};
use strum::{Display, EnumDiscriminants, IntoStaticStr};

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to convert to port number"))]
    ConvertToPortNumber { source: std::num::TryFromIntError },

    #[snafu(display("failed to parse port number"))]
    ParsePortNumber { source: std::num::ParseIntError },
}

/// A port number
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Port(pub u16);

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u16> for Port {
    fn from(value: u16) -> Self {
        Port(value)
    }
}

impl TryFrom<i32> for Port {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(Port(
            u16::try_from(value).context(ConvertToPortNumberSnafu)?,
        ))
    }
}

impl std::str::FromStr for Port {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Port(s.parse().context(ParsePortNumberSnafu)?))
    }
}

/// Protocols under which a route exposes a service
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
    Ws,
}

impl Protocol {
    /// The port the OpenShift router listens on for this protocol
    pub fn port(&self) -> Port {
        match self {
            Protocol::Http | Protocol::Ws => Port(80),
            Protocol::Https => Port(443),
        }
    }

    /// Routes with TLS termination serve HTTPS, all others plain HTTP and web sockets.
    pub fn is_secure(&self) -> bool {
        matches!(self, Protocol::Https)
    }
}
