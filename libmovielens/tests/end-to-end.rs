/// This is a set of integration tests which run against the `movie-ratings` payload binary living
/// in `libmovielens/src/bin/movie-ratings.rs`.
extern crate uuid;

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use uuid::Uuid;

const TEST_BIN_NAME: &str = "movie-ratings";

const RATINGS_CSV: &str = "userId,movieId,rating,timestamp\n\
                           1,1,3,964982703\n\
                           2,1,4,964981247\n\
                           3,1,5,964982224\n\
                           1,2,2,964983815\n";

const MOVIES_CSV: &str = "movieId,title,genres\n\
                          1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                          2,Jumanji (1995),Adventure|Children|Fantasy\n\
                          9,Sudden Death (1995),Action\n";

// This can't be a one-liner because cargo sometimes runs integration tests from
// `target/debug/deps`.
fn get_bin_path() -> PathBuf {
    let mut path = env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push(TEST_BIN_NAME);
    path
}

fn scratch_dir() -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("movie-ratings-e2e-{}", Uuid::new_v4()));
    fs::create_dir_all(&path).unwrap();
    path
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(get_bin_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

fn run_local(args: &[&str]) -> Output {
    Command::new(get_bin_path())
        .arg("run")
        .args(args)
        .stderr(Stdio::null())
        .output()
        .unwrap()
}

#[test]
fn run_sanity_check() {
    let output = Command::new(get_bin_path())
        .arg("sanity-check")
        .output()
        .unwrap();
    let output_str = String::from_utf8(output.stdout).unwrap();

    assert_eq!("sanity located\n", output_str);
}

#[test]
fn run_map_valid_ratings() {
    let json_input = r#"{"start":0,"text":"userId,movieId,rating,timestamp\n1,1,4.0,0\n1,2,2.5,0\n"}"#;
    let expected_output =
        r#"{"partitions":{"0":[{"key":1,"value":4.0},{"key":2,"value":2.5}]}}"#;

    let output = run_with_stdin(&["map", "--job", "average", "--source", "ratings"], json_input);
    let output_str = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(expected_output, output_str);
}

#[test]
fn run_map_tags_join_inputs() {
    let json_input = r#"{"start":0,"text":"movieId,title,genres\n1,Toy Story (1995),Comedy\n"}"#;
    let expected_output =
        r#"{"partitions":{"0":[{"key":1,"value":{"title":"Toy Story (1995)"}}]}}"#;

    let output = run_with_stdin(&["map", "--job", "join", "--source", "titles"], json_input);
    let output_str = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(expected_output, output_str);
}

#[test]
fn run_map_malformed_rating() {
    let json_input = r#"{"start":1,"text":"1,1,four,0\n"}"#;

    let output = run_with_stdin(&["map", "--job", "average", "--source", "ratings"], json_input);

    assert_eq!(false, output.status.success());
}

#[test]
fn run_map_average_job_rejects_titles() {
    let json_input = r#"{"start":0,"text":"1,Toy Story (1995),Comedy\n"}"#;

    let output = run_with_stdin(&["map", "--job", "average", "--source", "titles"], json_input);

    assert_eq!(false, output.status.success());
}

#[test]
fn run_map_invalid_input() {
    let output = run_with_stdin(&["map", "--job", "average", "--source", "ratings"], "foo");

    assert_eq!(false, output.status.success());
}

#[test]
fn run_reduce_valid_input() {
    let json_input = r#"[{"key":1,"values":[3.0,4.0,5.0]},{"key":2,"values":[2.0]}]"#;
    let expected_output = r#"[{"key":1,"values":[{"movie_id":1,"average":4.0}]},{"key":2,"values":[{"movie_id":2,"average":2.0}]}]"#;

    let output = run_with_stdin(&["reduce", "--job", "average"], json_input);
    let output_str = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(expected_output, output_str);
}

#[test]
fn run_reduce_invalid_input() {
    let output = run_with_stdin(&["reduce", "--job", "join"], "foo");

    assert_eq!(false, output.status.success());
}

#[test]
fn run_local_average_job() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", RATINGS_CSV);
    let out = dir.join("out");

    let output = run_local(&[
        "average",
        ratings.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let result = fs::read_to_string(out.join("part-r-00000")).unwrap();
    assert_eq!("1\t4.0\n2\t2.0\n", result);
    assert!(out.join("_SUCCESS").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_local_average_job_with_partitions() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", RATINGS_CSV);
    let out = dir.join("out");

    let output = run_local(&[
        "average",
        ratings.to_str().unwrap(),
        out.to_str().unwrap(),
        "--partitions",
        "2",
    ]);

    assert!(output.status.success());
    let mut lines: Vec<String> = Vec::new();
    for partition in &["part-r-00000", "part-r-00001"] {
        let contents = fs::read_to_string(out.join(partition)).unwrap();
        lines.extend(contents.lines().map(str::to_owned));
    }
    lines.sort();
    assert_eq!(vec!["1\t4.0", "2\t2.0"], lines);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_local_aborts_on_overflowing_average() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", "1,5,1e308,0\n2,5,1e308,0\n");
    let out = dir.join("out");

    let output = run_local(&[
        "average",
        ratings.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);

    assert_eq!(false, output.status.success());
    assert!(!out.exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_local_join_job() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", RATINGS_CSV);
    let movies = write_file(&dir, "movies.csv", MOVIES_CSV);
    let out = dir.join("out");

    let output = run_local(&[
        "join",
        ratings.to_str().unwrap(),
        movies.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let result = fs::read_to_string(out.join("part-r-00000")).unwrap();
    assert_eq!("1\tToy Story (1995)\t4.0\n2\tJumanji (1995)\t2.0\n", result);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_local_refuses_existing_output() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", RATINGS_CSV);
    let out = dir.join("out");
    fs::create_dir_all(&out).unwrap();

    let output = run_local(&[
        "average",
        ratings.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);

    assert_eq!(false, output.status.success());
    assert!(!out.join("part-r-00000").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_local_aborts_on_malformed_movie_id() {
    let dir = scratch_dir();
    let ratings = write_file(&dir, "ratings.csv", "1,1,3,0\n1,x,2,0\n");
    let out = dir.join("out");

    let output = run_local(&[
        "average",
        ratings.to_str().unwrap(),
        out.to_str().unwrap(),
    ]);

    assert_eq!(false, output.status.success());
    assert!(!out.exists());
    fs::remove_dir_all(&dir).unwrap();
}
