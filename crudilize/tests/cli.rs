use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "id": { "type": "integer", "minimum": 7, "maximum": 7 },
    "email": { "type": "string", "format": "email" }
  },
  "required": ["id", "email"],
  "additionalProperties": false
}"#;

fn crudilize() -> Command {
    let mut cmd = Command::cargo_bin("crudilize").unwrap();
    cmd.env_remove("CRUDILIZE_TEMPLATE").env_remove("RUST_LOG");
    cmd
}

fn write_template(dir: &Path, source: &str) -> PathBuf {
    let path: PathBuf = dir.join("api.tpl");
    fs::write(&path, source).unwrap();
    path
}

mod arguments {
    use super::*;

    #[test]
    fn missing_slug_prints_usage() {
        crudilize()
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn invalid_slug_is_rejected() {
        crudilize()
            .arg("9lives")
            .write_stdin(SCHEMA)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("9lives"));
    }

    #[test]
    fn help_mentions_cache() {
        crudilize()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--rebuild-cache"))
            .stdout(predicate::str::contains(".compiled.json"));
    }
}

mod streams {
    use super::*;

    #[test]
    fn reads_stdin_and_writes_stdout() {
        let dir = TempDir::new().unwrap();
        let template: PathBuf = write_template(dir.path(), "${slug}\n${schema}\n");
        crudilize()
            .arg("user")
            .arg("--template")
            .arg(&template)
            .write_stdin(SCHEMA)
            .assert()
            .success()
            .stdout(format!("user\n{SCHEMA}\n"));
    }

    #[test]
    fn template_from_environment() {
        let dir = TempDir::new().unwrap();
        let template: PathBuf = write_template(dir.path(), "env ${slugPascal}");
        crudilize()
            .arg("line_item")
            .env("CRUDILIZE_TEMPLATE", &template)
            .write_stdin(SCHEMA)
            .assert()
            .success()
            .stdout("env LineItem");
    }

    #[test]
    fn bundled_template_is_used_by_default() {
        crudilize()
            .arg("user")
            .write_stdin(SCHEMA)
            .assert()
            .success()
            .stdout(predicate::str::contains("exampleUser"))
            .stdout(predicate::str::contains("\"id\":7"));
    }

    #[test]
    fn file_input_and_output() {
        let dir = TempDir::new().unwrap();
        let template: PathBuf = write_template(dir.path(), "<%- exampleModel %>");
        let input: PathBuf = dir.path().join("user.json");
        let output: PathBuf = dir.path().join("user.js");
        fs::write(&input, SCHEMA).unwrap();

        crudilize()
            .args(["user", "--seed", "11", "-t"])
            .arg(&template)
            .arg("--in")
            .arg(&input)
            .arg("--out")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let written: String = fs::read_to_string(&output).unwrap();
        assert!(written.contains("&quot;id&quot;:7"), "{written}");
        assert!(!written.contains('"'));
        assert!(written.contains("@example."));
    }

    #[test]
    fn seed_makes_output_reproducible() {
        let run = || {
            crudilize()
                .args(["user", "--seed", "5"])
                .write_stdin(SCHEMA)
                .output()
                .unwrap()
                .stdout
        };
        assert_eq!(run(), run());
    }
}

mod cache {
    use super::*;

    #[test]
    fn second_run_reuses_stale_artifact() {
        let dir = TempDir::new().unwrap();
        let template: PathBuf = write_template(dir.path(), "first ${slug}");
        let render = |extra: &[&str]| {
            crudilize()
                .arg("user")
                .arg("-t")
                .arg(&template)
                .args(extra)
                .write_stdin(SCHEMA)
                .assert()
                .success()
        };

        render(&[]).stdout("first user");
        assert!(dir.path().join("api.tpl.compiled.json").exists());

        write_template(dir.path(), "second ${slug}");
        render(&[]).stdout("first user");
        render(&["--rebuild-cache"]).stdout("second user");
        render(&[]).stdout("second user");
    }

    #[test]
    fn corrupt_artifact_is_reported() {
        let dir = TempDir::new().unwrap();
        let template: PathBuf = write_template(dir.path(), "${slug}");
        fs::write(dir.path().join("api.tpl.compiled.json"), "not json").unwrap();
        crudilize()
            .arg("user")
            .arg("-t")
            .arg(&template)
            .write_stdin(SCHEMA)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--rebuild-cache"));
    }
}

mod failures {
    use super::*;

    #[test]
    fn malformed_json_exits_1() {
        crudilize()
            .arg("user")
            .write_stdin("{\"type\": ")
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::starts_with("error: input is not valid JSON"));
    }

    #[test]
    fn invalid_schema_lists_the_path() {
        crudilize()
            .arg("user")
            .write_stdin(r#"{"type": "object", "required": "id"}"#)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid schema"))
            .stderr(predicate::str::contains("/required"));
    }

    #[test]
    fn missing_input_file_names_it() {
        let dir = TempDir::new().unwrap();
        crudilize()
            .arg("user")
            .arg("--in")
            .arg(dir.path().join("nowhere.json"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("nowhere.json"));
    }

    #[test]
    fn failure_keeps_existing_output() {
        let dir = TempDir::new().unwrap();
        let output: PathBuf = dir.path().join("out.js");
        fs::write(&output, "keep me").unwrap();
        crudilize()
            .arg("user")
            .arg("--out")
            .arg(&output)
            .write_stdin("[")
            .assert()
            .code(1);
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");
    }
}
