//! Process-level tests using shell scripts in place of Demucs.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use vocalswap_core::{ensure_stems, StemSeparator, VocalSwapError};
use vocalswap_separate::{DemucsSeparator, SeparationError, SeparatorConfig};

/// Writes both stems the way Demucs lays them out.
const FAKE_DEMUCS: &str = r#"#!/bin/sh
model="$2"
root="$5"
for last; do :; done
base=$(basename "$last")
base="${base%.*}"
ext=wav
case " $* " in *" --mp3 "*) ext=mp3 ;; esac
mkdir -p "$root/$model/$base"
echo "separating $last" >&2
: > "$root/$model/$base/vocals.$ext"
: > "$root/$model/$base/no_vocals.$ext"
echo run >> "$root/calls.log"
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn separator(dir: &Path, executable: PathBuf) -> DemucsSeparator {
    DemucsSeparator::with_config(
        SeparatorConfig::default()
            .executable(executable)
            .output_root(dir.join("separated"))
            .timeout(Duration::from_secs(10)),
    )
}

fn input(dir: &Path) -> PathBuf {
    let path = dir.join("My Song.mp3");
    fs::write(&path, b"not really audio").unwrap();
    path
}

#[test]
fn test_successful_run_produces_stems() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", FAKE_DEMUCS);
    let separator = separator(dir.path(), exe);

    let paths = separator.run(&input(dir.path())).unwrap();
    assert_eq!(
        paths.vocals,
        dir.path().join("separated/mdx_extra/My Song/vocals.wav")
    );
    assert!(paths.vocals.is_file());
    assert!(paths.instrumental.is_file());
}

#[test]
fn test_mp3_stems() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", FAKE_DEMUCS);
    let separator = DemucsSeparator::with_config(
        SeparatorConfig::default()
            .executable(exe)
            .output_root(dir.path().join("separated"))
            .stem_format(vocalswap_core::AudioFormat::Mp3),
    );

    let paths = separator.run(&input(dir.path())).unwrap();
    assert!(paths.vocals.ends_with("vocals.mp3"));
    assert!(paths.vocals.is_file());
}

#[test]
fn test_ensure_stems_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", FAKE_DEMUCS);
    let separator = separator(dir.path(), exe);
    let song = input(dir.path());

    let first = ensure_stems(&separator, &song).unwrap();
    let second = ensure_stems(&separator, &song).unwrap();

    assert!(first.separated);
    assert!(!second.separated);
    assert_eq!(first.paths, second.paths);

    let calls = fs::read_to_string(dir.path().join("separated/calls.log")).unwrap();
    assert_eq!(calls.lines().count(), 1);
}

#[test]
fn test_non_zero_exit_carries_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(
        dir.path(),
        "demucs",
        "#!/bin/sh\necho 'RuntimeError: model not found' >&2\nexit 3\n",
    );
    let err = separator(dir.path(), exe).run(&input(dir.path())).unwrap_err();

    match err {
        SeparationError::ProcessFailed { exit_code, stderr } => {
            assert_eq!(exit_code, 3);
            assert!(stderr.contains("model not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_clean_exit_without_stems() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", "#!/bin/sh\nexit 0\n");
    let err = separator(dir.path(), exe).run(&input(dir.path())).unwrap_err();
    assert!(matches!(err, SeparationError::OutputMissing { .. }));
    assert_eq!(err.code(), "SEP_005");
}

#[test]
fn test_timeout_kills_process() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", "#!/bin/sh\nsleep 30\n");
    let separator = DemucsSeparator::with_config(
        SeparatorConfig::default()
            .executable(exe)
            .output_root(dir.path().join("separated"))
            .timeout(Duration::from_millis(300)),
    );

    let err = separator.run(&input(dir.path())).unwrap_err();
    assert!(matches!(err, SeparationError::Timeout { .. }));
}

#[test]
fn test_failure_maps_to_separation_failed_at_seam() {
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "demucs", "#!/bin/sh\nexit 1\n");
    let separator = separator(dir.path(), exe);

    let err = separator.separate(&input(dir.path())).unwrap_err();
    assert!(matches!(err, VocalSwapError::SeparationFailed { .. }));
}
