use std::path::Path;
use std::process::{Command, Output};

const NAVTREE: &str = "docs/html/group__general.js";

/// Copy a fixture into a scratch directory so builds never touch the tree.
fn project(fixture: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&Path::new("tests/fixtures").join(fixture), dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn navdex(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_navdex"))
        .current_dir(dir)
        .env_remove("NAVDEX_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn build(dir: &Path) {
    let out = navdex(dir, &["build"]);
    assert!(out.status.success(), "build failed: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn build_then_check_passes() {
    let dir = project("general");
    build(dir.path());
    assert!(dir.path().join(".navdex.index").exists(), "index not created");

    let check = navdex(dir.path(), &["check"]);
    assert_eq!(check.status.code(), Some(0), "{}", stdout(&check));
    assert!(stdout(&check).contains("All 1 sources fresh"));
}

#[test]
fn lookup_returns_every_overload() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["lookup", "TgBot::EventBroadcaster", "onCommand"]);
    assert!(out.status.success());
    let anchors: Vec<String> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(
        anchors,
        vec![
            "class_tg_bot_1_1_event_broadcaster.html#ad8e56ab49dbe9b4960d454f8b408bf13",
            "class_tg_bot_1_1_event_broadcaster.html#a13e4a906203fe43a950f1420b68c7583",
        ]
    );
}

#[test]
fn lookup_accepts_short_scope_names() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["lookup", "Api", "getUpdates", "--json"]);
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        parsed["anchors"],
        serde_json::json!(["class_tg_bot_1_1_api.html#a79187c21ea38f8a81a21c2a78ae217bd"])
    );
}

#[test]
fn lookup_miss_is_empty_and_succeeds() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["lookup", "TgBot::Bot", "sendMessage"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());

    let out = navdex(dir.path(), &["lookup", "TgBot::Nope", "getApi"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn scopes_and_entries_keep_declaration_order() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["scopes", "--json"]);
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["TgBot::Api", "TgBot::Bot", "TgBot::EventBroadcaster", "TgBot::TgException"]
    );

    let out = navdex(dir.path(), &["entries", "TgBot::Api"]);
    let first = stdout(&out).lines().next().unwrap().to_string();
    assert!(first.starts_with("Api "), "constructor should come first: {first}");
}

#[test]
fn search_data_is_excluded_by_config() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["status", "--json"]);
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed["sources"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["scopes"], 4);
    assert_eq!(parsed["entries"], 138);
}

#[test]
fn edited_navtree_is_stale() {
    let dir = project("general");
    build(dir.path());

    let path = dir.path().join(NAVTREE);
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.replace("\"getToken\"", "\"getBotToken\"")).unwrap();

    let check = navdex(dir.path(), &["check"]);
    assert_eq!(check.status.code(), Some(1));
    assert!(stdout(&check).contains("group__general.js"));
}

#[test]
fn deleted_navtree_is_missing() {
    let dir = project("general");
    build(dir.path());
    std::fs::remove_file(dir.path().join(NAVTREE)).unwrap();

    let check = navdex(dir.path(), &["check"]);
    assert_eq!(check.status.code(), Some(2));
}

#[test]
fn query_without_index_is_an_error() {
    let dir = project("general");
    let out = navdex(dir.path(), &["lookup", "Api", "getMe"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn exported_json_matches_lookups() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["export", "--format", "json"]);
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let scopes = parsed["scopes"].as_array().unwrap();
    let exception = scopes
        .iter()
        .find(|s| s["name"] == "TgBot::TgException")
        .unwrap();
    assert_eq!(exception["document"], "class_tg_bot_1_1_tg_exception.html");
    assert_eq!(exception["entries"][0]["name"], "TgException");

    let bad = navdex(dir.path(), &["export", "--format", "yaml"]);
    assert_eq!(bad.status.code(), Some(3));
}

#[test]
fn find_lists_every_overload_with_its_scope() {
    let dir = project("general");
    build(dir.path());

    let out = navdex(dir.path(), &["find", "onCommand", "--json"]);
    assert!(out.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {
                "anchor": "class_tg_bot_1_1_event_broadcaster.html#ad8e56ab49dbe9b4960d454f8b408bf13",
                "scope": "TgBot::EventBroadcaster"
            },
            {
                "anchor": "class_tg_bot_1_1_event_broadcaster.html#a13e4a906203fe43a950f1420b68c7583",
                "scope": "TgBot::EventBroadcaster"
            }
        ])
    );

    let miss = navdex(dir.path(), &["find", "sendTelepathy", "--json"]);
    assert!(miss.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&miss.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn raw_doxygen_output_builds_with_default_config() {
    let dir = project("doxygen");
    build(dir.path());

    let out = navdex(dir.path(), &["status", "--json"]);
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let sources: Vec<&str> = parsed["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        sources,
        vec!["html/class_tg_bot_1_1_api.js", "html/group__general.js", "html/navtreedata.js"]
    );

    let out = navdex(dir.path(), &["scopes", "--json"]);
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names[0], "TgBot::Api");
    assert!(!names.contains(&"class_tg_bot_1_1_api"), "{names:?}");
    assert!(names.contains(&"Classes"), "{names:?}");

    for scope in ["Api", "TgBot::Api"] {
        let out = navdex(dir.path(), &["lookup", scope, "close"]);
        assert_eq!(stdout(&out).trim(), "class_tg_bot_1_1_api.html#aeb39b4a7389c71108f7e9eda0fad1af7");
    }
}
