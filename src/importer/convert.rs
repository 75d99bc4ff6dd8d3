//! Conversion of raw resources into the universal format.
//!
//! Dialect types are mapped onto a small dot-namespaced vocabulary
//! (`compute.instance`, `storage.bucket`, ...). Types without a mapping keep
//! their original name under the source dialect, e.g.
//! `terraform.aws_lambda_permission`.

use crate::error::ImportError;
use crate::importer::types::{
    Dialect, ImportOptions, RawResource, UniversalDocument, UniversalResource,
};
use chrono::{SecondsFormat, Utc};

/// Version of the universal document layout.
pub const UNIVERSAL_FORMAT_VERSION: &str = "1.0";

/// Name used when a resource carries none.
pub const UNNAMED_RESOURCE: &str = "unnamed-resource";

/// Length of the generated id suffix for unnamed resources.
const ID_SUFFIX_LEN: usize = 9;

const TERRAFORM_TYPES: &[(&str, &str)] = &[
    ("aws_instance", "compute.instance"),
    ("aws_lambda_function", "compute.function"),
    ("aws_ecs_service", "container.service"),
    ("aws_eks_cluster", "container.cluster"),
    ("aws_s3_bucket", "storage.bucket"),
    ("aws_ebs_volume", "storage.volume"),
    ("aws_db_instance", "database.instance"),
    ("aws_dynamodb_table", "database.table"),
    ("aws_vpc", "network.vpc"),
    ("aws_subnet", "network.subnet"),
    ("aws_security_group", "network.firewall"),
    ("aws_lb", "network.load_balancer"),
    ("aws_route53_record", "dns.record"),
    ("aws_iam_role", "identity.role"),
    ("azurerm_virtual_machine", "compute.instance"),
    ("azurerm_linux_virtual_machine", "compute.instance"),
    ("azurerm_function_app", "compute.function"),
    ("azurerm_kubernetes_cluster", "container.cluster"),
    ("azurerm_storage_account", "storage.bucket"),
    ("azurerm_mssql_database", "database.instance"),
    ("azurerm_virtual_network", "network.vpc"),
    ("azurerm_subnet", "network.subnet"),
    ("azurerm_network_security_group", "network.firewall"),
    ("azurerm_resource_group", "management.resource_group"),
    ("google_compute_instance", "compute.instance"),
    ("google_cloudfunctions_function", "compute.function"),
    ("google_container_cluster", "container.cluster"),
    ("google_storage_bucket", "storage.bucket"),
    ("google_sql_database_instance", "database.instance"),
    ("google_compute_network", "network.vpc"),
    ("google_compute_subnetwork", "network.subnet"),
    ("google_compute_firewall", "network.firewall"),
    ("kubernetes_deployment", "container.deployment"),
    ("kubernetes_service", "network.service"),
];

const CLOUDFORMATION_TYPES: &[(&str, &str)] = &[
    ("AWS::EC2::Instance", "compute.instance"),
    ("AWS::Lambda::Function", "compute.function"),
    ("AWS::ECS::Service", "container.service"),
    ("AWS::EKS::Cluster", "container.cluster"),
    ("AWS::S3::Bucket", "storage.bucket"),
    ("AWS::EC2::Volume", "storage.volume"),
    ("AWS::RDS::DBInstance", "database.instance"),
    ("AWS::DynamoDB::Table", "database.table"),
    ("AWS::EC2::VPC", "network.vpc"),
    ("AWS::EC2::Subnet", "network.subnet"),
    ("AWS::EC2::SecurityGroup", "network.firewall"),
    ("AWS::ElasticLoadBalancingV2::LoadBalancer", "network.load_balancer"),
    ("AWS::Route53::RecordSet", "dns.record"),
    ("AWS::IAM::Role", "identity.role"),
];

const ARM_TYPES: &[(&str, &str)] = &[
    ("Microsoft.Compute/virtualMachines", "compute.instance"),
    ("Microsoft.Web/sites", "compute.app_service"),
    ("Microsoft.ContainerService/managedClusters", "container.cluster"),
    ("Microsoft.Storage/storageAccounts", "storage.bucket"),
    ("Microsoft.Compute/disks", "storage.volume"),
    ("Microsoft.Sql/servers/databases", "database.instance"),
    ("Microsoft.Network/virtualNetworks", "network.vpc"),
    ("Microsoft.Network/virtualNetworks/subnets", "network.subnet"),
    ("Microsoft.Network/networkSecurityGroups", "network.firewall"),
    ("Microsoft.Network/loadBalancers", "network.load_balancer"),
    ("Microsoft.Network/dnsZones/A", "dns.record"),
];

const KUBERNETES_KINDS: &[(&str, &str)] = &[
    ("Deployment", "container.deployment"),
    ("StatefulSet", "container.statefulset"),
    ("DaemonSet", "container.daemonset"),
    ("Pod", "container.pod"),
    ("Job", "container.job"),
    ("CronJob", "container.cronjob"),
    ("Service", "network.service"),
    ("Ingress", "network.ingress"),
    ("NetworkPolicy", "network.firewall"),
    ("ConfigMap", "config.map"),
    ("Secret", "config.secret"),
    ("PersistentVolumeClaim", "storage.volume"),
    ("Namespace", "management.namespace"),
    ("ServiceAccount", "identity.service_account"),
];

fn mapping_table(dialect: Dialect) -> &'static [(&'static str, &'static str)] {
    match dialect {
        Dialect::Terraform => TERRAFORM_TYPES,
        Dialect::CloudFormation => CLOUDFORMATION_TYPES,
        Dialect::Arm => ARM_TYPES,
        Dialect::Kubernetes => KUBERNETES_KINDS,
    }
}

/// Map a dialect type onto the universal vocabulary.
pub fn universal_type(dialect: Dialect, original_type: &str) -> String {
    mapping_table(dialect)
        .iter()
        .find(|(from, _)| *from == original_type)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| format!("{}.{}", dialect, original_type))
}

/// Convert one resource. `position` is the resource's index in its source
/// and only matters for unnamed resources.
pub fn to_universal(resource: &RawResource, position: usize) -> UniversalResource {
    let dialect = resource.dialect();
    let original_type = resource.resource_type().unwrap_or("unknown");

    let id = match resource.name() {
        Some(name) => format!("{}-{}", original_type, name),
        None => format!(
            "{}-{}",
            original_type,
            stable_suffix(dialect, original_type, position)
        ),
    };

    UniversalResource {
        id,
        resource_type: universal_type(dialect, original_type),
        name: resource.name().unwrap_or(UNNAMED_RESOURCE).to_string(),
        properties: resource.properties().clone(),
        dependencies: resource.dependencies().to_vec(),
    }
}

/// Id suffix for unnamed resources: stable across runs for the same source.
fn stable_suffix(dialect: Dialect, original_type: &str, position: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(dialect.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(original_type.as_bytes());
    hasher.update(b"\0");
    hasher.update(&(position as u64).to_le_bytes());

    let hex = hasher.finalize().to_hex();
    hex.as_str()[..ID_SUFFIX_LEN].to_string()
}

/// Build the universal document for a set of resources.
pub fn build_document(
    resources: &[RawResource],
    source: Dialect,
    options: &ImportOptions,
) -> UniversalDocument {
    UniversalDocument {
        version: UNIVERSAL_FORMAT_VERSION.to_string(),
        source,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        context: (!options.is_empty()).then(|| options.clone()),
        resources: resources
            .iter()
            .enumerate()
            .map(|(position, resource)| to_universal(resource, position))
            .collect(),
    }
}

/// Convert resources to the universal format, serialized as pretty JSON.
pub fn convert(
    resources: &[RawResource],
    source: Dialect,
    options: &ImportOptions,
) -> Result<String, ImportError> {
    let document = build_document(resources, source, options);
    serde_json::to_string_pretty(&document).map_err(|e| ImportError::Conversion(e.to_string()))
}
