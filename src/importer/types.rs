//! Data model of the import pipeline.
//!
//! - [`ImportConfiguration`] - a typed import request
//! - [`ImportRequest`] - the untyped wire shape of a request
//! - [`RawResource`] - one parsed resource, shaped by its source dialect
//! - [`UniversalResource`] - a resource in the normalized format
//! - [`ImportResult`] - the outcome handed back to callers

use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The infrastructure description formats the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Terraform,
    CloudFormation,
    Arm,
    Kubernetes,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Terraform,
        Dialect::CloudFormation,
        Dialect::Arm,
        Dialect::Kubernetes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::CloudFormation => "cloudformation",
            Self::Arm => "arm",
            Self::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terraform" => Ok(Self::Terraform),
            "cloudformation" => Ok(Self::CloudFormation),
            "arm" => Ok(Self::Arm),
            "kubernetes" => Ok(Self::Kubernetes),
            _ => Err(ImportError::UnsupportedType(s.to_string())),
        }
    }
}

/// What the caller wants done with the parsed resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    #[default]
    Import,
    Convert,
    Deploy,
}

impl ImportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Convert => "convert",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportAction {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "import" => Ok(Self::Import),
            "convert" => Ok(Self::Convert),
            "deploy" => Ok(Self::Deploy),
            _ => Err(ImportError::UnsupportedAction(s.to_string())),
        }
    }
}

/// Per-dialect hints supplied alongside the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    /// Default namespace for Kubernetes manifests that do not set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

impl ImportOptions {
    pub fn is_empty(&self) -> bool {
        self.workspace.is_none()
            && self.region.is_none()
            && self.subscription.is_none()
            && self.namespace.is_none()
            && self.resource_group.is_none()
    }
}

/// A typed import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfiguration {
    #[serde(rename = "type")]
    pub dialect: Dialect,
    pub source: String,
    #[serde(default)]
    pub action: ImportAction,
    #[serde(default)]
    pub options: ImportOptions,
}

impl ImportConfiguration {
    pub fn new(dialect: Dialect, source: impl Into<String>) -> Self {
        Self {
            dialect,
            source: source.into(),
            action: ImportAction::default(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_action(mut self, action: ImportAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

/// An import request as it arrives over the wire, before the type and
/// action strings have been checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(rename = "type")]
    pub import_type: String,
    pub source: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub options: ImportOptions,
}

impl TryFrom<ImportRequest> for ImportConfiguration {
    type Error = ImportError;

    fn try_from(request: ImportRequest) -> Result<Self, Self::Error> {
        let dialect = request.import_type.parse::<Dialect>()?;
        let action = match request.action.as_deref() {
            Some(action) => action.parse::<ImportAction>()?,
            None => ImportAction::default(),
        };

        Ok(Self {
            dialect,
            source: request.source,
            action,
            options: request.options,
        })
    }
}

// ============================================================================
// Raw resources
// ============================================================================

/// A `resource "<type>" "<name>" { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct TerraformResource {
    pub resource_type: String,
    pub name: String,
    /// Block body: attributes and nested blocks.
    pub config: Map<String, Value>,
    /// Addresses listed in `depends_on`.
    pub depends_on: Vec<String>,
}

/// An entry of a CloudFormation template's `Resources` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudFormationResource {
    pub logical_id: String,
    pub resource_type: Option<String>,
    pub properties: Map<String, Value>,
    pub depends_on: Vec<String>,
}

/// An element of an ARM template's `resources` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmResource {
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub api_version: Option<String>,
    pub location: Option<String>,
    pub properties: Map<String, Value>,
    pub depends_on: Vec<String>,
}

/// One document of a Kubernetes manifest stream.
#[derive(Debug, Clone, PartialEq)]
pub struct KubernetesManifest {
    pub api_version: Option<String>,
    pub kind: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
    /// `spec`, or `data` for objects that carry no spec.
    pub spec: Map<String, Value>,
}

/// A parsed resource in the shape of its source dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResource {
    Terraform(TerraformResource),
    CloudFormation(CloudFormationResource),
    Arm(ArmResource),
    Kubernetes(KubernetesManifest),
}

impl RawResource {
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Terraform(_) => Dialect::Terraform,
            Self::CloudFormation(_) => Dialect::CloudFormation,
            Self::Arm(_) => Dialect::Arm,
            Self::Kubernetes(_) => Dialect::Kubernetes,
        }
    }

    /// The dialect-specific type (`aws_instance`, `AWS::S3::Bucket`,
    /// `Microsoft.Compute/virtualMachines`, `Deployment`).
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            Self::Terraform(r) => Some(r.resource_type.as_str()),
            Self::CloudFormation(r) => r.resource_type.as_deref(),
            Self::Arm(r) => r.resource_type.as_deref(),
            Self::Kubernetes(r) => Some(r.kind.as_str()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Self::Terraform(r) => Some(r.name.as_str()),
            Self::CloudFormation(r) => Some(r.logical_id.as_str()),
            Self::Arm(r) => r.name.as_deref(),
            Self::Kubernetes(r) => r.name.as_deref(),
        };
        name.filter(|n| !n.is_empty())
    }

    pub fn properties(&self) -> &Map<String, Value> {
        match self {
            Self::Terraform(r) => &r.config,
            Self::CloudFormation(r) => &r.properties,
            Self::Arm(r) => &r.properties,
            Self::Kubernetes(r) => &r.spec,
        }
    }

    /// Kubernetes manifests never declare dependencies.
    pub fn dependencies(&self) -> &[String] {
        match self {
            Self::Terraform(r) => &r.depends_on,
            Self::CloudFormation(r) => &r.depends_on,
            Self::Arm(r) => &r.depends_on,
            Self::Kubernetes(_) => &[],
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// A resource in the normalized, dialect-independent format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub properties: Map<String, Value>,
    pub dependencies: Vec<String>,
}

/// The document produced by the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalDocument {
    pub version: String,
    pub source: Dialect,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ImportOptions>,
    pub resources: Vec<UniversalResource>,
}

/// Outcome of one import call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub resource_count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
}

impl ImportResult {
    /// A failed result carrying a single error and no partial data.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            resource_count: 0,
            warnings: Vec::new(),
            errors: vec![error.into()],
            converted_config: None,
            deployment_id: None,
        }
    }
}
