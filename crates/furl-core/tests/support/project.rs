//! Git work trees with a furl.toml for project-derived targets.

use std::path::Path;

use git2::Repository;

pub fn init_project(root: &Path, furl_toml: &str) {
    std::fs::create_dir_all(root).expect("create project dir");
    Repository::init(root).expect("git init");
    std::fs::write(root.join("furl.toml"), furl_toml).expect("write furl.toml");
}
