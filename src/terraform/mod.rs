//! Terraform plan executor.
//!
//! Each call to [`TerraformExecutor::execute_terraform`] gets its own
//! workspace directory named after the deployment id, runs `init`,
//! `validate` and `plan`, and reports the parsed plan. Deployments are
//! never applied.

pub mod code_check;
pub mod executor;
pub mod plan;
pub mod provider;
pub mod workspace;

pub use code_check::check_code;
pub use executor::{TerraformConfig, TerraformExecutionResult, TerraformExecutor};
pub use plan::{ChangeAction, PlanSummary, PlannedChange, parse_plan_output};
pub use provider::CloudProvider;
pub use workspace::validate_deployment_id;
