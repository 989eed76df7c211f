#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write_executable(path: &PathBuf, content: &str) -> std::io::Result<()> {
    fs::write(path, content)?;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

// alpha: in sync, github remote with two open issues.
// beta: two uncommitted entries, three commits behind until pulled.
// gamma: no upstream, no remote.
const FAKE_GIT: &str = r#"#!/usr/bin/env bash
set -euo pipefail

repo=""
args=()
while [[ $# -gt 0 ]]; do
  case "$1" in
    -C)
      repo="$2"; shift 2;;
    *)
      args+=("$1"); shift;;
  esac
done

reponame="$(basename "$repo")"
cmd="${args[0]:-}"

case "$cmd" in
  symbolic-ref)
    echo "main"
    ;;
  status)
    if [[ "$reponame" == "beta" ]]; then
      printf ' M src/lib.rs\n?? notes.txt\n'
    fi
    ;;
  rev-parse)
    if [[ "$reponame" == "gamma" ]]; then
      echo "fatal: no upstream configured for branch 'main'" >&2
      exit 128
    fi
    echo "origin/main"
    ;;
  rev-list)
    if [[ "$reponame" == "beta" && ! -e "$repo/.pulled" ]]; then
      printf '0\t3\n'
    else
      printf '0\t0\n'
    fi
    ;;
  log)
    printf 'abc123\x1fInitial commit\x1fDev\x1f%s\n' "$(date +%s)"
    ;;
  remote)
    case "$reponame" in
      alpha) echo "git@github.com:acme/alpha.git";;
      beta) echo "https://github.com/acme/beta";;
      *) echo "error: No such remote 'origin'" >&2; exit 2;;
    esac
    ;;
  fetch)
    touch "$repo/.fetched"
    ;;
  pull)
    touch "$repo/.pulled"
    printf 'Updating abc123..def456\nFast-forward\n src/lib.rs | 2 +-\n 1 file changed, 1 insertion(+), 1 deletion(-)\n'
    ;;
  *)
    exit 1
    ;;
esac
"#;

const FAKE_GH: &str = r#"#!/usr/bin/env bash
set -euo pipefail
if [[ "$*" == *"--repo acme/alpha"* ]]; then
  echo '[{"number":1},{"number":2}]'
else
  echo '[]'
fi
"#;

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let root = tmp.path().join("repos");
        for name in ["alpha", "beta", "gamma"] {
            fs::create_dir_all(root.join(name).join(".git"))?;
        }
        fs::create_dir_all(root.join("not-a-repo"))?;

        let fakebin = tmp.path().join("fakebin");
        fs::create_dir_all(&fakebin)?;
        write_executable(&fakebin.join("git"), FAKE_GIT)?;
        write_executable(&fakebin.join("gh"), FAKE_GH)?;
        Ok(Self { tmp })
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("repos")
    }

    fn repo(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    fn command(&self) -> Result<Command, Box<dyn std::error::Error>> {
        let fakebin = self.tmp.path().join("fakebin");
        let old_path = std::env::var("PATH").unwrap_or_default();
        let mut cmd = Command::cargo_bin("repodash")?;
        cmd.env("PATH", format!("{}:{old_path}", fakebin.display()))
            .env("HOME", self.tmp.path())
            .arg("--root")
            .arg(self.root());
        Ok(cmd)
    }
}

fn stdout_json(output: &std::process::Output) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

fn repo_entry<'a>(json: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    json["repos"]
        .as_array()
        .and_then(|repos| repos.iter().find(|r| r["name"] == name))
        .unwrap_or_else(|| panic!("no entry for {name}"))
}

#[test]
fn status_json_reports_every_repo() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let output = ws.command()?.args(["status", "--output", "json"]).output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    let names: Vec<_> = json["repos"]
        .as_array()
        .map(|repos| repos.iter().filter_map(|r| r["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["alpha", "beta", "gamma"]);
    assert!(json["taken_at"].is_string());

    let alpha = repo_entry(&json, "alpha");
    assert_eq!(alpha["branch"], "main");
    assert_eq!(alpha["remote_identity"], "acme/alpha");
    assert_eq!(alpha["open_issues"], 2);
    assert_eq!(alpha["last_commit"]["relative"], "just now");

    let beta = repo_entry(&json, "beta");
    assert_eq!(beta["uncommitted"], 2);
    assert_eq!(beta["behind"], 3);
    assert_eq!(beta["open_issues"], 0);

    let gamma = repo_entry(&json, "gamma");
    assert!(gamma["upstream"].is_null());
    assert!(gamma["remote_url"].is_null());
    assert!(gamma["open_issues"].is_null());
    assert!(gamma["error"].is_null());
    Ok(())
}

#[test]
fn status_without_issues_leaves_counts_unknown() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let output = ws
        .command()?
        .args(["status", "--output", "json", "--no-issues", "--concurrency", "1"])
        .output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert!(repo_entry(&json, "alpha")["open_issues"].is_null());
    Ok(())
}

#[test]
fn status_table_can_hide_clean_repos() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    ws.command()?
        .args(["status", "--tab-style", "ascii"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("↓3"));

    ws.command()?
        .args(["status", "--hide-clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beta"))
        .stdout(predicate::str::contains("alpha").not());
    Ok(())
}

#[test]
fn status_on_missing_root_warns_and_prints_empty_table() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    fs::remove_dir_all(ws.root())?;
    ws.command()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"))
        .stderr(predicate::str::contains("warning"));
    Ok(())
}

#[test]
fn dirty_pull_needs_confirmation_then_runs_with_yes() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let pulled = ws.repo("beta").join(".pulled");

    let output = ws.command()?.args(["pull", "beta", "--output", "json"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output)?;
    assert_eq!(json["outcome"], "needs_confirmation");
    assert_eq!(json["uncommitted"], 2);
    assert_eq!(json["behind"], 3);
    assert!(!pulled.exists());

    ws.command()?
        .args(["pull", "beta", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file changed"));
    assert!(pulled.exists());
    Ok(())
}

#[test]
fn pull_with_nothing_behind_does_not_run_git_pull() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    ws.command()?
        .args(["pull", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date"));
    assert!(!ws.repo("alpha").join(".pulled").exists());
    Ok(())
}

#[test]
fn fetch_runs_on_dirty_repo_without_confirmation() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let output = ws.command()?.args(["fetch", "beta", "--output", "json"]).output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert_eq!(json["op"], "fetch");
    assert_eq!(json["outcome"], "succeeded");
    assert!(ws.repo("beta").join(".fetched").exists());
    Ok(())
}

#[test]
fn mutations_reject_bad_names() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    ws.command()?
        .args(["fetch", "../beta"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid repository name"));
    ws.command()?
        .args(["pull", "not-a-repo", "--yes"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn missing_explicit_config_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let missing: &Path = &ws.tmp.path().join("nope.toml");
    ws.command()?
        .arg("--config")
        .arg(missing)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
    Ok(())
}

#[test]
fn config_file_settings_apply() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new()?;
    let config = ws.tmp.path().join("config.toml");
    fs::write(&config, "sort = \"recent\"\n\n[issues]\nenabled = false\n")?;
    let output = ws
        .command()?
        .arg("--config")
        .arg(&config)
        .args(["status", "--output", "json"])
        .output()?;
    assert!(output.status.success());
    let json = stdout_json(&output)?;
    assert!(repo_entry(&json, "alpha")["open_issues"].is_null());
    Ok(())
}
