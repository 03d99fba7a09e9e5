use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn shelf(root: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("shelf"));
    cmd.env_remove("SHELF_PACKAGER")
        .env_remove("RUST_LOG")
        .env("SHELF_HOME", root);
    cmd
}

/// Write a project folder with a descriptor and a prebuilt primary artifact.
fn create_project(folder: &Path, descriptor: &str, project: &str) {
    fs::create_dir_all(folder.join("outputs")).unwrap();
    fs::write(folder.join("shelf.json"), descriptor).unwrap();
    fs::write(
        folder.join("outputs").join(format!("{}.jar", project)),
        format!("{} classes", project),
    )
    .unwrap();
}

#[test]
fn test_end_to_end_publish() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    let project = work_dir.path().join("my-project");
    create_project(
        &project,
        r#"{"publisher": "me", "project": "my-project", "version": "1"}"#,
        "my-project",
    );
    fs::write(
        project.join("outputs/my-project.sources.jar"),
        "my-project sources",
    )
    .unwrap();

    shelf(root)
        .arg("publish")
        .arg(&project)
        .assert()
        .success()
        .stdout("Packaging me/my-project@1...\nPublishing me/my-project@1...\n");

    let entry = root.join("me/my-project/versions/1");
    assert_eq!(
        fs::read_to_string(entry.join("my-project.jar")).unwrap(),
        "my-project classes"
    );
    assert!(entry.join("my-project.sources.jar").exists());
    assert!(entry.join("shelf.json").exists());
    // no entry point, no launcher
    assert!(!root.join("bin").exists());
    assert!(!root.join("my-project.cmd").exists());
}

#[test]
fn test_publish_same_version_twice_fails() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();
    let project = work_dir.path();

    create_project(
        project,
        r#"{"publisher": "me", "project": "my-project", "version": "1"}"#,
        "my-project",
    );

    shelf(root).arg("publish").arg(project).assert().success();
    let published = fs::read(root.join("me/my-project/versions/1/my-project.jar")).unwrap();

    fs::write(project.join("outputs/my-project.jar"), "different classes").unwrap();
    shelf(root)
        .arg("publish")
        .arg(project)
        .assert()
        .failure()
        .code(1)
        .stdout("Packaging me/my-project@1...\n")
        .stderr(predicate::str::contains(
            "ERROR: This package (me/my-project@1) can't be published because a package with that signature already exists.",
        ));

    assert_eq!(
        fs::read(root.join("me/my-project/versions/1/my-project.jar")).unwrap(),
        published
    );
}

#[test]
fn test_publish_missing_dependency_fails_before_writing() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    create_project(
        work_dir.path(),
        r#"{
            "publisher": "me",
            "project": "a",
            "version": "1",
            "dependencies": [{"publisher": "me", "project": "b", "version": "5"}]
        }"#,
        "a",
    );

    shelf(root)
        .arg("publish")
        .arg(work_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "ERROR: Dependency me/b@5 of me/a@1 is not published in the repository",
        ));

    assert!(!root.join("me/a").exists());
}

#[cfg(unix)]
#[test]
fn test_publish_with_packager_and_launcher() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    let b = work_dir.path().join("b");
    create_project(
        &b,
        r#"{"publisher": "me", "project": "b", "version": "5"}"#,
        "b",
    );
    shelf(root).arg("publish").arg(&b).assert().success();

    let a = work_dir.path().join("a");
    fs::create_dir_all(&a).unwrap();
    fs::write(
        a.join("shelf.json"),
        r#"{
            "publisher": "me",
            "project": "a",
            "version": "1",
            "entry_point": "com.example.Main",
            "shortcut_name": "run-a",
            "dependencies": [{"publisher": "me", "project": "b", "version": "5"}]
        }"#,
    )
    .unwrap();

    shelf(root)
        .arg("publish")
        .arg(&a)
        .arg("--packager")
        .arg("printf '%s' \"$SHELF_CLASSPATH\" > \"$SHELF_OUTPUT_DIR/$SHELF_PROJECT.jar\"")
        .assert()
        .success()
        .stdout("Packaging me/a@1...\nPublishing me/a@1...\n");

    // the packager saw b's published artifact as its compile classpath
    assert_eq!(
        fs::read_to_string(root.join("me/a/versions/1/a.jar")).unwrap(),
        root.join("me/b/versions/5/b.jar").display().to_string()
    );

    let launcher = fs::read_to_string(root.join("bin/run-a")).unwrap();
    assert!(launcher.starts_with("#!/bin/sh\nSHELF_DIR=\"$(cd \"$(dirname \"$0\")/..\" && pwd)\"\n"));
    assert!(launcher.contains(
        "exec java -classpath \"$SHELF_DIR/me/a/versions/1/a.jar:$SHELF_DIR/me/b/versions/5/b.jar\" com.example.Main \"$@\""
    ));
    assert!(!root.join("a").exists());

    // the launcher directory is not mistaken for a publisher
    shelf(root)
        .arg("list")
        .assert()
        .success()
        .stdout("me/a@1\nme/b@5\n");
}

#[test]
fn test_failing_packager_publishes_nothing() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    create_project(
        work_dir.path(),
        r#"{"publisher": "me", "project": "a", "version": "1"}"#,
        "a",
    );

    shelf(root)
        .arg("publish")
        .arg(work_dir.path())
        .arg("--packager")
        .arg("exit 3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed with exit code 3"));

    assert!(!root.join("me").exists());
}

#[test]
fn test_list_and_dependents() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    let lib_v1 = work_dir.path().join("lib1");
    create_project(
        &lib_v1,
        r#"{"publisher": "me", "project": "my-project", "version": "1"}"#,
        "my-project",
    );
    let other = work_dir.path().join("other");
    create_project(
        &other,
        r#"{
            "publisher": "me",
            "project": "other-project",
            "version": "10",
            "dependencies": [{"publisher": "me", "project": "my-project", "version": "1"}]
        }"#,
        "other-project",
    );
    let lib_v2 = work_dir.path().join("lib2");
    create_project(
        &lib_v2,
        r#"{"publisher": "me", "project": "my-project", "version": "2"}"#,
        "my-project",
    );

    shelf(root).arg("publish").arg(&lib_v1).assert().success();
    shelf(root).arg("publish").arg(&other).assert().success();
    shelf(root)
        .arg("publish")
        .arg(&lib_v2)
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "The following projects should be updated to use me/my-project@2:\n  me/other-project@10\n",
        ));

    shelf(root)
        .arg("list")
        .assert()
        .success()
        .stdout("me/my-project@1\nme/my-project@2\nme/other-project@10\n");

    shelf(root)
        .arg("dependents")
        .arg("me/my-project@2")
        .assert()
        .success()
        .stdout("me/other-project@10\n");

    shelf(root)
        .arg("dependents")
        .arg("me/other-project@10")
        .assert()
        .success()
        .stdout("No projects depend on another version of me/other-project.\n");
}

#[test]
fn test_classpath_command() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    let root = root_dir.path();

    let c = work_dir.path().join("c");
    create_project(
        &c,
        r#"{"publisher": "me", "project": "c", "version": "7"}"#,
        "c",
    );
    shelf(root).arg("publish").arg(&c).assert().success();

    let a = work_dir.path().join("a");
    create_project(
        &a,
        r#"{
            "publisher": "me",
            "project": "a",
            "version": "1",
            "dependencies": [{"publisher": "me", "project": "c", "version": "7"}]
        }"#,
        "a",
    );

    shelf(root)
        .arg("classpath")
        .arg(&a)
        .assert()
        .success()
        .stdout(format!(
            "{}\n{}\n",
            a.join("outputs").display(),
            root.join("me").join("c").join("versions").join("7").join("c.jar").display()
        ));
}

#[test]
fn test_list_empty_repository() {
    let root_dir = tempdir().unwrap();

    shelf(root_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("No packages published.\n");
}

#[test]
fn test_invalid_descriptor_is_reported() {
    let root_dir = tempdir().unwrap();
    let work_dir = tempdir().unwrap();
    fs::write(work_dir.path().join("shelf.json"), r#"{"publisher": "me"}"#).unwrap();

    shelf(root_dir.path())
        .arg("publish")
        .arg(work_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("ERROR: Failed to parse"));
}
