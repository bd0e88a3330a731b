use crate::framework::IsLabelValue;

pub const MAX_LABEL_VALUE_LENGTH: usize = 63;

/// Label set by OpenShift on every Pod of a DeploymentConfig
pub const DEPLOYMENT_CONFIG_LABEL: &str = "deploymentconfig";

/// Label set by the templates and the operator on the routes of a service
pub const SERVICE_LABEL: &str = "service";

/// Label selector for the Pods of the given DeploymentConfig
pub fn deployment_config_selector(workload: &impl IsLabelValue) -> String {
    format!("{DEPLOYMENT_CONFIG_LABEL}={}", workload.to_label_value())
}

/// Label selector for the routes of the given service
pub fn service_selector(service: &impl IsLabelValue) -> String {
    format!("{SERVICE_LABEL}={}", service.to_label_value())
}
