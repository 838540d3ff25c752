#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

pub fn tdiary_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tdiary").unwrap();
    cmd.env_remove("TDIARY_ROOT");
    cmd.env_remove("TDIARY_LOG");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}

/// Command running inside an initialized journal at `root`.
pub fn tdiary_in(root: &Path) -> Command {
    let mut cmd = tdiary_cmd();
    cmd.current_dir(root);
    cmd
}

pub fn init_journal(root: &Path) {
    tdiary_cmd().arg("init").arg(root).assert().success();
}
