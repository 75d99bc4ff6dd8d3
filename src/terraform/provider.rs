use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static PROVIDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*provider\s+"([^"]+)""#).unwrap());

/// Cloud a Terraform configuration targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 3] = [Self::Aws, Self::Azure, Self::Gcp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
        }
    }

    /// Local name of the Terraform provider (`provider "<name>"`)
    pub fn terraform_name(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azurerm",
            Self::Gcp => "google",
        }
    }

    pub fn registry_source(&self) -> &'static str {
        match self {
            Self::Aws => "hashicorp/aws",
            Self::Azure => "hashicorp/azurerm",
            Self::Gcp => "hashicorp/google",
        }
    }

    pub fn version_constraint(&self) -> &'static str {
        match self {
            Self::Aws => "~> 5.0",
            Self::Azure => "~> 3.0",
            Self::Gcp => "~> 5.0",
        }
    }

    fn from_terraform_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.terraform_name() == name)
    }

    /// Provider named by the first `provider "…"` block in `code`.
    pub fn from_code(code: &str) -> Option<Self> {
        PROVIDER_NAME
            .captures_iter(code)
            .find_map(|caps| Self::from_terraform_name(&caps[1]))
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "azure" | "azurerm" => Ok(Self::Azure),
            "gcp" | "google" => Ok(Self::Gcp),
            other => Err(format!(
                "Unknown cloud provider '{}' (expected aws, azure or gcp)",
                other
            )),
        }
    }
}

/// Contents of `versions.tf` pinning the provider plugin.
pub fn render_versions_tf(provider: CloudProvider) -> String {
    format!(
        r#"terraform {{
  required_providers {{
    {name} = {{
      source  = "{source}"
      version = "{version}"
    }}
  }}
}}
"#,
        name = provider.terraform_name(),
        source = provider.registry_source(),
        version = provider.version_constraint(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        let code = r#"
provider "google" {
  project = "demo"
}
"#;
        assert_eq!(CloudProvider::from_code(code), Some(CloudProvider::Gcp));
        assert_eq!(
            CloudProvider::from_code(r#"provider "azurerm" {}"#),
            Some(CloudProvider::Azure)
        );
        assert_eq!(CloudProvider::from_code(r#"provider "random" {}"#), None);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("AWS".parse::<CloudProvider>(), Ok(CloudProvider::Aws));
        assert_eq!("azurerm".parse::<CloudProvider>(), Ok(CloudProvider::Azure));
        assert_eq!("google".parse::<CloudProvider>(), Ok(CloudProvider::Gcp));
        assert!("oracle".parse::<CloudProvider>().is_err());
    }

    #[test]
    fn test_versions_tf_parses_as_hcl() {
        for provider in CloudProvider::ALL {
            let rendered = render_versions_tf(provider);
            let body: hcl::Body = hcl::from_str(&rendered).unwrap();
            assert_eq!(body.blocks().count(), 1);
            assert!(rendered.contains(provider.registry_source()));
        }
    }
}
