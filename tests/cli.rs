use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn subburn(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("subburn").unwrap();
    cmd.current_dir(workdir.path());
    cmd
}

#[test]
fn test_wrong_argument_count_fails_with_usage() {
    let workdir = TempDir::new().unwrap();

    subburn(&workdir)
        .arg("only-one")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_input_directory_fails() {
    let workdir = TempDir::new().unwrap();

    subburn(&workdir)
        .args(["does-not-exist", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_input_file_is_not_a_directory() {
    let workdir = TempDir::new().unwrap();
    workdir.child("movie.mp4").touch().unwrap();

    subburn(&workdir)
        .args(["movie.mp4", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_no_matches_is_success() {
    let workdir = TempDir::new().unwrap();
    workdir.child("input/alone.mp4").touch().unwrap();
    workdir.child("input/other.srt").touch().unwrap();

    subburn(&workdir)
        .args(["input", "output/burned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching video/subtitle pairs"));

    workdir.child("output/burned").assert(predicate::path::is_dir());
}

#[cfg(unix)]
mod with_fake_encoder {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_FFMPEG: &str = r#"#!/bin/sh
for last in "$@"; do :; done
case "$last" in
  *broken*) echo "Invalid data found when processing input" >&2; exit 1;;
esac
echo "  Duration: 00:00:04.00, start: 0.000000, bitrate: 1 kb/s" >&2
printf 'frame=1 time=00:00:02.00 bitrate=N/A\r' >&2
: > "$last"
exit 0
"#;

    fn install_fake_encoder(workdir: &TempDir) {
        install_fake_encoder_with(workdir, "");
    }

    fn install_fake_encoder_with(workdir: &TempDir, extra_config: &str) {
        let script = workdir.child("fake-ffmpeg.sh");
        script.write_str(FAKE_FFMPEG).unwrap();
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        workdir
            .child("subburn.toml")
            .write_str(&format!(
                "{}\n[media]\nbinary_path = \"{}\"\n",
                extra_config,
                script.path().display()
            ))
            .unwrap();
    }

    /// Three pairs, one per batch, with the operator prompted between batches
    fn three_single_batches(workdir: &TempDir) -> Command {
        install_fake_encoder_with(workdir, "[batch]\nbatch_size = 1\n");
        for name in ["one", "two", "three"] {
            workdir.child(format!("input/{}.mp4", name)).touch().unwrap();
            workdir.child(format!("input/{}.srt", name)).touch().unwrap();
        }

        let mut cmd = subburn(workdir);
        cmd.args(["--config", "subburn.toml", "input", "output"]);
        cmd
    }

    #[test]
    fn test_single_pair_produces_output() {
        let workdir = TempDir::new().unwrap();
        install_fake_encoder(&workdir);
        workdir.child("input/movie.mp4").touch().unwrap();
        workdir.child("input/Movie.srt").touch().unwrap();

        subburn(&workdir)
            .args(["--config", "subburn.toml", "--yes", "input", "output"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Total:     1"))
            .stdout(predicate::str::contains("Succeeded: 1"))
            .stdout(predicate::str::contains("Failed:    0"));

        workdir.child("output/movie_output.mp4").assert(predicate::path::exists());
    }

    #[test]
    fn test_failed_item_is_listed() {
        let workdir = TempDir::new().unwrap();
        install_fake_encoder(&workdir);
        for name in ["alpha", "broken", "gamma"] {
            workdir.child(format!("input/{}.mkv", name)).touch().unwrap();
            workdir.child(format!("input/{}.srt", name)).touch().unwrap();
        }

        subburn(&workdir)
            .args(["--config", "subburn.toml", "--yes", "input", "output"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Total:     3"))
            .stdout(predicate::str::contains("Succeeded: 2"))
            .stdout(predicate::str::contains("Failed:    1"))
            .stdout(predicate::str::contains("- broken.mkv: Encoder failed: broken.mkv failed with exit code 1"));

        workdir.child("output/alpha_output.mp4").assert(predicate::path::exists());
        workdir.child("output/broken_output.mp4").assert(predicate::path::missing());
    }

    #[test]
    fn test_piped_acknowledgments_run_every_batch() {
        let workdir = TempDir::new().unwrap();

        three_single_batches(&workdir)
            .write_stdin("\n\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Press Enter to start batch 3/3"))
            .stdout(predicate::str::contains("Batches:   3/3"))
            .stdout(predicate::str::contains("Succeeded: 3"))
            .stdout(predicate::str::contains("Stopped early").not());
    }

    #[test]
    fn test_quit_answer_halts_run() {
        let workdir = TempDir::new().unwrap();

        three_single_batches(&workdir)
            .write_stdin("q\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Batches:   1/3"))
            .stdout(predicate::str::contains("Stopped early: 2 pairs not started"));
    }

    #[test]
    fn test_closed_stdin_halts_run() {
        let workdir = TempDir::new().unwrap();

        three_single_batches(&workdir)
            .write_stdin("")
            .assert()
            .success()
            .stdout(predicate::str::contains("Batches:   1/3"))
            .stdout(predicate::str::contains("Stopped early: 2 pairs not started"));
    }
}
