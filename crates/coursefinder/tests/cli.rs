use assert_fs::prelude::*;

use predicates::prelude::*;
use predicates::str::contains;
use serial_test::serial;
use assert_cmd::Command;

const CATALOG: &str = "\
Title,Link,Duration,Lessons,Description
Intro to Python,https://example.com/python,4 hours,12,Learn the basics of Python
Advanced Machine Learning,,10 hours,,
Cooking Basics,https://example.com/cooking,,8,Knife skills and sauces
";

/// Command for the `coursefinder` binary using the offline backend and an isolated config.
fn coursefinder_cmd(temp: &assert_fs::TempDir) -> Command {
  let config = temp.child("config.json");
  if !config.exists() {
    config.write_str("{}").unwrap();
  }

  let mut cmd = Command::cargo_bin("coursefinder").expect("binary exists");
  cmd.current_dir(temp.path());
  cmd.env("NO_COLOR", "1");
  cmd.env_remove("COURSEFINDER_CORPUS");
  cmd.env_remove("COURSEFINDER_TOP_K");
  cmd.env_remove("COURSEFINDER_BACKEND");
  cmd.env_remove("RUST_LOG");
  cmd.args(["--backend", "hash", "--config"]).arg(config.path());
  cmd
}

fn catalog(temp: &assert_fs::TempDir) -> assert_fs::fixture::ChildPath {
  let file = temp.child("courses.csv");
  file.write_str(CATALOG).unwrap();
  file
}

#[test]
#[serial]
fn test_search_pretty_output() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["search", "Python", "programming", "--corpus"])
    .arg(file.path())
    .assert()
    .success()
    .stdout(
      contains("Top Course Recommendations:")
        .and(contains("1. Intro to Python"))
        .and(contains("Link: https://example.com/python"))
        .and(contains("Relevance Score: 0.50")),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_search_fills_placeholders() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["search", "machine", "learning", "-k", "1", "--corpus"])
    .arg(file.path())
    .assert()
    .success()
    .stdout(
      contains("1. Advanced Machine Learning")
        .and(contains("Link: #"))
        .and(contains("Lessons: N/A"))
        .and(contains("Description: No description available"))
        .and(contains("Intro to Python").not()),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_search_json_output() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  let output = coursefinder_cmd(&temp)
    .args(["search", "python", "--format", "json", "-k", "2", "--corpus"])
    .arg(file.path())
    .output()
    .unwrap();
  assert!(output.status.success());

  let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let results = results.as_array().unwrap();
  assert_eq!(results.len(), 2);
  assert_eq!(results[0]["rank"], 1);
  assert_eq!(results[0]["index"], 0);
  assert_eq!(results[0]["title"], "Intro to Python");
  assert_eq!(results[0]["lessons"], "12");
  assert!(results[0]["score"].as_f64().unwrap() > results[1]["score"].as_f64().unwrap());

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_corpus_from_environment() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .env("COURSEFINDER_CORPUS", file.path())
    .args(["courses"])
    .assert()
    .success()
    .stdout(contains("0  Intro to Python").and(contains("2  Cooking Basics")));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_courses_empty_catalog() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = temp.child("empty.csv");
  file.write_str("Title,Link\n").unwrap();

  coursefinder_cmd(&temp)
    .args(["courses", "--corpus"])
    .arg(file.path())
    .assert()
    .success()
    .stdout(contains("The course catalog is empty."));

  coursefinder_cmd(&temp)
    .args(["search", "anything", "--corpus"])
    .arg(file.path())
    .assert()
    .success()
    .stdout(contains("No courses found for: anything"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_missing_title_column_fails() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = temp.child("bad.csv");
  file.write_str("Name,Link\nIntro to Python,#\n").unwrap();

  coursefinder_cmd(&temp)
    .args(["search", "python", "--corpus"])
    .arg(file.path())
    .assert()
    .failure()
    .stderr(contains("missing required 'Title' column"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_missing_catalog_file_fails() {
  let temp = assert_fs::TempDir::new().unwrap();

  coursefinder_cmd(&temp)
    .args(["courses", "--corpus", "does_not_exist.csv"])
    .assert()
    .failure()
    .stderr(contains("Failed to load course data from does_not_exist.csv"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_zero_top_k_rejected() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["search", "python", "-k", "0", "--corpus"])
    .arg(file.path())
    .assert()
    .failure()
    .stderr(contains("top_k must be at least 1"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_search_requires_a_query() {
  let temp = assert_fs::TempDir::new().unwrap();

  coursefinder_cmd(&temp).args(["search"]).assert().failure();

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_invalid_config_file_fails() {
  let temp = assert_fs::TempDir::new().unwrap();
  temp.child("config.json").write_str("{ not json").unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["courses", "--corpus"])
    .arg(file.path())
    .assert()
    .failure()
    .stderr(contains("Invalid configuration in"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_top_k_from_config_file() {
  let temp = assert_fs::TempDir::new().unwrap();
  temp.child("config.json").write_str(r#"{ "top_k": 1 }"#).unwrap();
  let file = catalog(&temp);

  let output = coursefinder_cmd(&temp)
    .args(["search", "python cooking", "--format", "json", "--corpus"])
    .arg(file.path())
    .output()
    .unwrap();
  assert!(output.status.success());

  let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(results.as_array().unwrap().len(), 1);

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_flags_override_invalid_file_and_env_values() {
  let temp = assert_fs::TempDir::new().unwrap();
  temp.child("config.json").write_str(r#"{ "top_k": 0 }"#).unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .env("COURSEFINDER_TOP_K", "abc")
    .args(["search", "python", "-k", "1", "--corpus"])
    .arg(file.path())
    .assert()
    .success()
    .stdout(contains("1. Intro to Python").and(contains("Cooking Basics").not()));

  coursefinder_cmd(&temp)
    .args(["search", "python", "--corpus"])
    .arg(file.path())
    .assert()
    .failure()
    .stderr(contains("top_k must be at least 1"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_interactive_session() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["interactive", "-k", "1", "--corpus"])
    .arg(file.path())
    .write_stdin("\npython\nquit\ncooking\n")
    .assert()
    .success()
    .stdout(
      contains("What course are you looking for?")
        .and(contains("1. Intro to Python"))
        .and(contains("Cooking Basics").not()),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_interactive_ends_on_eof() {
  let temp = assert_fs::TempDir::new().unwrap();
  let file = catalog(&temp);

  coursefinder_cmd(&temp)
    .args(["interactive", "--corpus"])
    .arg(file.path())
    .write_stdin("cooking\n")
    .assert()
    .success()
    .stdout(contains("1. Cooking Basics"));

  temp.close().unwrap();
}
