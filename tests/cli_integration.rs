//! End-to-end tests of the `linkage` binary.
//!
//! Each test runs in its own temp directory with HOME and XDG_CONFIG_HOME
//! pointed inside it, so no user config leaks in.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const SAMPLE: &str = include_str!("fixtures/sample_catalog.json");

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        dir.child("catalog.json").write_str(SAMPLE).unwrap();
        Self { dir }
    }

    /// `linkage` with the sample catalog, isolated from user config.
    fn linkage(&self) -> Command {
        let mut cmd = self.bare();
        cmd.arg("--catalog").arg("catalog.json");
        cmd
    }

    /// `linkage` without a catalog flag.
    fn bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("linkage").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env_remove("LINKAGE_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--cwd")
            .arg(self.dir.path());
        cmd
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.linkage().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "linkage {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

// =============================================================================
// Catalog browsing
// =============================================================================

#[test]
fn help_describes_tool() {
    Command::cargo_bin("linkage")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configurator"));
}

#[test]
fn systems_shows_hierarchy() {
    let project = Project::new();
    let out = project.stdout(&["systems"]);
    assert_eq!(
        out,
        "HVAC (sys.hvac)\n  Air Handlers (sys.ahu)\n  Plants (sys.plant)\n"
    );
}

#[test]
fn templates_filtered_by_system_type() {
    let project = Project::new();
    project
        .linkage()
        .args(["templates", "--system-type", "sys.plant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tpl.chw"))
        .stdout(predicate::str::contains("tpl.vav").not());
}

#[test]
fn templates_as_json() {
    let project = Project::new();
    let out = project.stdout(&["templates", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["path"], "tpl.vav");
    assert_eq!(value[0]["option_count"], 3);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn resolve_renders_tree() {
    let project = Project::new();
    let out = project.stdout(&["resolve", "1"]);
    insta::assert_snapshot!(out.trim_end(), @r"
1 [dropdown] Supply fan
  2 [dropdown] Fan arrangement
    3 [final] Blow-through
    4 [final] Draw-through
  5 [dropdown] Fan speed
    6 [final] Constant
    7 [final] Variable
");
}

#[test]
fn resolve_marks_cycles_and_hidden_nodes() {
    let project = Project::new();
    let out = project.stdout(&["resolve", "--template", "tpl.vav"]);

    assert!(out.starts_with("tpl.vav VAV Multi-Zone\n"));
    assert!(out.contains("      cyc.a (cycle)\n"));
    assert!(out.contains("fin.c [real] Damper setpoint = \"v1\" (hidden)"));
    assert!(!out.contains("missing.option"));
}

#[test]
fn resolve_json() {
    let project = Project::new();
    let out = project.stdout(&["resolve", "1", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["path"], "1");
    assert_eq!(value["children"].as_array().unwrap().len(), 2);
    assert_eq!(value["children"][1]["children"][0]["path"], "6");
}

#[test]
fn resolve_unknown_root_fails() {
    let project = Project::new();
    project
        .linkage()
        .args(["resolve", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown root option: nope"));
}

#[test]
fn resolve_uses_configured_default_root() {
    let project = Project::new();
    project
        .dir
        .child("linkage.toml")
        .write_str("catalog = \"catalog.json\"\ndefault_root = \"5\"\n")
        .unwrap();

    project
        .bare()
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("5 [dropdown] Fan speed\n"));
}

// =============================================================================
// Catalog errors
// =============================================================================

#[test]
fn missing_catalog_is_reported() {
    let project = Project::new();
    project
        .bare()
        .arg("systems")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No catalog given"));
}

#[test]
fn malformed_catalog_is_reported() {
    let project = Project::new();
    project
        .dir
        .child("bad.json")
        .write_str(r#"{"options":[{"modelicaPath":"a","name":"A","type":"final"},{"modelicaPath":"a","name":"A2","type":"final"}]}"#)
        .unwrap();

    project
        .bare()
        .args(["--catalog", "bad.json", "systems"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate path 'a'"));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn export_csv_to_stdout() {
    let project = Project::new();
    let out = project.stdout(&["export-csv"]);

    assert!(out.starts_with("modelicaPath,name,type,group,options\r\n"));
    assert!(out.contains(r#""1","Supply fan","dropdown","Fans","[\"2\",\"5\"]""#));
    assert_eq!(out.split("\r\n").count(), 13);
}

#[test]
fn export_csv_to_file_with_lf() {
    let project = Project::new();
    project
        .linkage()
        .args(["export-csv", "--output", "out/options.csv", "--line-ending", "lf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 12 options"));

    let written = std::fs::read_to_string(project.dir.path().join("out/options.csv")).unwrap();
    assert!(!written.contains('\r'));
    assert_eq!(written.lines().count(), 13);
}

// =============================================================================
// Configuration sets
// =============================================================================

fn new_configuration(project: &Project, extra: &[&str]) -> String {
    let mut args = vec!["select", "set.json", "new", "--template", "tpl.vav"];
    args.extend_from_slice(extra);
    project.stdout(&args).trim().to_string()
}

#[test]
fn select_workflow() {
    let project = Project::new();
    let id = new_configuration(&project, &["--system-type", "sys.ahu", "--name", "AHU-1"]);
    project.dir.child("set.json").assert(predicate::path::exists());

    project
        .linkage()
        .args(["select", "set.json", "set", &id, "7", "true"])
        .assert()
        .success();
    project
        .linkage()
        .args(["select", "set.json", "set", &id, "2", "Blow-through"])
        .assert()
        .success();

    let list = project.stdout(&["select", "set.json", "list", "--json"]);
    let list: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["name"], "AHU-1");
    assert_eq!(list[0]["selections"], 2);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(project.dir.path().join("set.json")).unwrap())
            .unwrap();
    assert_eq!(saved["kind"], "linkage.configuration-set");
    assert_eq!(saved["configurations"][0]["selections"]["7"], true);
    assert_eq!(saved["configurations"][0]["selections"]["2"], "Blow-through");
}

#[test]
fn quiet_new_still_prints_id() {
    let project = Project::new();
    let id = project.stdout(&["--quiet", "select", "set.json", "new", "--template", "tpl.vav"]);
    let id = id.trim();

    assert_eq!(id.len(), 36);
    let list = project.stdout(&["select", "set.json", "list", "--json"]);
    let list: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(list[0]["id"], id);
}

#[test]
fn select_rejects_unresolvable_option() {
    let project = Project::new();
    let id = new_configuration(&project, &[]);

    project
        .linkage()
        .args(["select", "set.json", "set", &id, "missing.option", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not resolvable"));
}

#[test]
fn locked_configuration_rejects_edits() {
    let project = Project::new();
    let id = new_configuration(&project, &[]);

    project
        .linkage()
        .args(["select", "set.json", "lock", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Locked"));

    project
        .linkage()
        .args(["select", "set.json", "set", &id, "7", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is locked"));
}

#[test]
fn select_unknown_template() {
    let project = Project::new();
    project
        .linkage()
        .args(["select", "set.json", "new", "--template", "tpl.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown template: tpl.nope"));
    project.dir.child("set.json").assert(predicate::path::missing());
}

#[test]
fn sequence_and_document() {
    let project = Project::new();
    let id = new_configuration(&project, &["--system-type", "sys.ahu"]);
    project
        .linkage()
        .args(["select", "set.json", "set", &id, "5", "7"])
        .assert()
        .success();

    let sequence = project.stdout(&["sequence", "set.json"]);
    let sequence: serde_json::Value = serde_json::from_str(&sequence).unwrap();
    assert_eq!(sequence["5"], serde_json::json!(["7"]));
    assert_eq!(sequence["sys.ahu"], serde_json::json!(["tpl.vav"]));

    let document = project.stdout(&["document", "set.json", &id]);
    let document: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert_eq!(document["kind"], "linkage.configuration-document");
    assert_eq!(document["configuration"]["id"], id.as_str());
    assert_eq!(document["template"]["path"], "tpl.vav");
}

#[test]
fn document_unknown_configuration() {
    let project = Project::new();
    new_configuration(&project, &[]);

    project
        .linkage()
        .args(["document", "set.json", "00000000-0000-4000-8000-000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// =============================================================================
// Tool config
// =============================================================================

#[test]
fn config_set_then_get() {
    let project = Project::new();
    project
        .bare()
        .args(["config", "set", "export.line_ending", "lf"])
        .assert()
        .success();

    project.dir.child("linkage.toml").assert(predicate::path::exists());
    project
        .bare()
        .args(["config", "get", "export.line_ending"])
        .assert()
        .success()
        .stdout("lf\n");
}

#[test]
fn config_list_shows_defaults() {
    let project = Project::new();
    project
        .bare()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export.line_ending = crlf"))
        .stdout(predicate::str::contains("catalog = (not set)"));
}

#[test]
fn config_rejects_unknown_key() {
    let project = Project::new();
    project
        .bare()
        .args(["config", "set", "trunk", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("linkage")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linkage"));
}
