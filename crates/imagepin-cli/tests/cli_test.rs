use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn imagepin() -> assert_cmd::Command {
    cargo_bin_cmd!("imagepin")
}

const TEMPLATE: &str = "// @optionalParam image string gcr.io/p/app:old Image to run\n{\n  image: \"gcr.io/p/app:old\",\n  replicas: 1,\n}\n";

fn write_template(tmp: &TempDir, name: &str) -> std::path::PathBuf {
    let path = tmp.path().join(name);
    std::fs::write(&path, TEMPLATE).unwrap();
    path
}

// ── Help / Version ──

#[test]
fn shows_help() {
    imagepin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pin it in a deployment template"));
}

#[test]
fn shows_version() {
    imagepin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imagepin"));
}

// ── Patch Command ──

#[test]
fn patch_rewrites_template() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "--template", "app.jsonnet", "--set", "image=gcr.io/p/app:new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Made 2 replacement(s)"));

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "// @optionalParam image string gcr.io/p/app:new Image to run\n{\n  image: \"gcr.io/p/app:new\",\n  replicas: 1,\n}\n"
    );
}

#[test]
fn patch_uses_template_from_config() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "deploy.jsonnet");
    std::fs::write(
        tmp.path().join("imagepin.toml"),
        "[template]\npath = \"deploy.jsonnet\"\n",
    )
    .unwrap();

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "--set", "replicas=3"])
        .assert()
        .success();

    assert!(
        std::fs::read_to_string(&path)
            .unwrap()
            .contains("  replicas: 3,\n")
    );
}

#[test]
fn patch_dry_run_leaves_file_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args([
            "patch",
            "-t",
            "app.jsonnet",
            "-s",
            "image=gcr.io/p/app:new",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would make 2 replacement(s)"))
        .stdout(predicate::str::contains("+   image: \"gcr.io/p/app:new\","));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
}

#[test]
fn patch_no_match_fails_and_keeps_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "-t", "app.jsonnet", "--set", "imgae=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no replacements made"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
}

#[test]
fn patch_rejects_value_with_comma_and_keeps_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "-t", "app.jsonnet", "--set", "image=a,b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be pinned"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
}

#[test]
fn patch_rejects_empty_comment_marker() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args([
            "patch",
            "-t",
            "app.jsonnet",
            "--set",
            "image=app:new",
            "--comment-marker",
            "",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--comment-marker"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
}

#[test]
fn patch_partial_coverage_warns_by_default() {
    let tmp = TempDir::new().unwrap();
    let path = write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args([
            "patch",
            "-t",
            "app.jsonnet",
            "--set",
            "image=gcr.io/p/app:new",
            "--set",
            "unused=z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: no line matched unused"));

    assert!(
        std::fs::read_to_string(&path)
            .unwrap()
            .contains("gcr.io/p/app:new")
    );
}

#[test]
fn patch_partial_coverage_fails_when_strict() {
    let tmp = TempDir::new().unwrap();
    write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args([
            "patch",
            "-t",
            "app.jsonnet",
            "--set",
            "image=gcr.io/p/app:new",
            "--set",
            "unused=z",
            "--strict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unused"));
}

#[test]
fn patch_second_run_is_up_to_date() {
    let tmp = TempDir::new().unwrap();
    write_template(&tmp, "app.jsonnet");
    let args = ["patch", "-t", "app.jsonnet", "--set", "image=gcr.io/p/app:new"];

    imagepin().current_dir(tmp.path()).args(args).assert().success();

    imagepin()
        .current_dir(tmp.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

#[test]
fn patch_rejects_malformed_set() {
    let tmp = TempDir::new().unwrap();
    write_template(&tmp, "app.jsonnet");

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "-t", "app.jsonnet", "--set", "image"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn patch_requires_set() {
    imagepin()
        .args(["patch", "-t", "app.jsonnet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--set"));
}

#[test]
fn patch_missing_template_fails() {
    let tmp = TempDir::new().unwrap();

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "-t", "missing.jsonnet", "--set", "image=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read template"));
}

#[test]
fn patch_custom_comment_marker() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("values.yaml");
    std::fs::write(&path, "# @param image string app:old\nimage: app:old\n").unwrap();

    imagepin()
        .current_dir(tmp.path())
        .args([
            "patch",
            "-t",
            "values.yaml",
            "--set",
            "image=app:new",
            "--comment-marker",
            "#",
        ])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# @param image string app:new\nimage: app:new\n"
    );
}

// ── Build / Update (no GCP) ──

#[test]
fn build_fails_without_gcp_project_id() {
    let tmp = TempDir::new().unwrap();

    imagepin()
        .current_dir(tmp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gcp_project_id"));
}

#[test]
fn update_fails_without_gcp_project_id() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("imagepin.toml"), "[project]\n").unwrap();

    imagepin()
        .current_dir(tmp.path())
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gcp_project_id"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("imagepin.toml"), "[template\n").unwrap();

    imagepin()
        .current_dir(tmp.path())
        .args(["patch", "--set", "image=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("imagepin.toml"));
}
