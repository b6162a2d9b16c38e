use assert_cmd::Command;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = bookshelf().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["serve", "migrate", "check"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn check_succeeds_with_memory_backend() {
    let output = bookshelf()
        .args(["--backend", "memory", "check"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("database reachable"));
}

#[test]
fn migrate_is_a_no_op_in_memory() {
    let output = bookshelf()
        .args(["--backend", "memory", "migrate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("applied 0 migration(s)"));
}

#[test]
fn unknown_environment_is_rejected() {
    bookshelf()
        .env("BOOKSHELF_ENV", "qa")
        .arg("check")
        .assert()
        .failure();
}
