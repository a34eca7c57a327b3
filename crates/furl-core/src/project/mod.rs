//! Project configuration: work tree discovery, furl.toml, and the naming
//! rules that turn a project plus environment into a namespace and release.

pub mod deploy_params;
pub mod git;
pub mod parser;
pub mod schema;
pub mod slug;
pub mod store;
pub mod template;

pub use deploy_params::{helm_release, kubernetes_namespace};
pub use git::{discover_work_tree, open_work_tree};
pub use parser::{parse_project_toml, parse_project_toml_str};
pub use schema::{DeployConfig, ProjectConfig};
pub use store::{DEFAULT_CONFIG_FILE, ProjectConfigStore};
