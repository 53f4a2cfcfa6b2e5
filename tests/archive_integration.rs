use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use globus_helper::archive::{ArchiveOutcome, guard_archive};
use globus_helper::config::Env;
use globus_helper::{
    CollisionPolicy, SilentReporter, TransferError, TransferOptions, plan_with_env,
};

const RAW: &str = "Actigraph/A1/S01_Actigraphy/v0/S01 RAW.csv";

fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let mut zw = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    zw.add_directory("Actigraph/", options).unwrap();
    for (name, body) in files {
        zw.start_file(*name, options).unwrap();
        zw.write_all(body.as_bytes()).unwrap();
    }
    zw.finish().unwrap();
}

fn append_files<W: Write>(builder: &mut tar::Builder<W>, files: &[(&str, &str)]) {
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body.as_bytes()).unwrap();
    }
}

fn write_tar(path: &Path, files: &[(&str, &str)]) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    append_files(&mut builder, files);
    builder.finish().unwrap();
}

fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
    let enc = flate2::write::GzEncoder::new(File::create(path).unwrap(), flate2::Compression::default());
    let mut builder = tar::Builder::new(enc);
    append_files(&mut builder, files);
    builder.into_inner().unwrap().finish().unwrap();
}

fn dump_dir(tmp: &tempfile::TempDir) -> PathBuf {
    let dir = tmp.path().join("ne-dump");
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn opts(base: &Path, dry_run: bool) -> TransferOptions {
    TransferOptions {
        base_path: Some(base.to_path_buf()),
        dry_run,
        handle_zip: Some(true),
        collision: CollisionPolicy::Overwrite,
    }
}

#[test]
fn missing_dump_dir_means_no_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = guard_archive(&tmp.path().join("ne-dump"), false, &SilentReporter).unwrap();
    assert_eq!(outcome, ArchiveOutcome::NoArchive);
}

#[test]
fn refuses_when_tree_already_present() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    fs::create_dir_all(dump.join("Actigraph")).unwrap();
    write_zip(&dump.join("dump.zip"), &[(RAW, "x")]);

    let err = guard_archive(&dump, false, &SilentReporter).unwrap_err();
    assert!(matches!(err, TransferError::ArchiveTreePopulated { .. }));
}

#[test]
fn refuses_more_than_one_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_zip(&dump.join("a.zip"), &[(RAW, "x")]);
    write_tar_gz(&dump.join("b.tgz"), &[(RAW, "y")]);

    let err = guard_archive(&dump, true, &SilentReporter).unwrap_err();
    assert_eq!(err.exit_code(), 4);
    match err {
        TransferError::MultipleArchives { archives, .. } => {
            assert_eq!(archives, vec!["a.zip".to_string(), "b.tgz".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dry_run_previews_without_extracting() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_zip(&dump.join("dump.zip"), &[(RAW, "x")]);

    match guard_archive(&dump, true, &SilentReporter).unwrap() {
        ArchiveOutcome::Previewed { lines, .. } => {
            assert_eq!(lines[0], "Actigraph/");
            assert_eq!(lines.last().map(String::as_str), Some("        S01 RAW.csv"));
        }
        other => panic!("expected preview, got {other:?}"),
    }
    assert!(!dump.join("Actigraph").exists());

    // the preview leaves the tree unextracted, so the source check still fails
    let err = plan_with_env(&opts(tmp.path(), true), &Env::default(), &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, TransferError::SourceNotFound(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(!dump.join("Actigraph").exists());
}

#[test]
fn apply_extracts_zip_then_plans() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_zip(&dump.join("dump.zip"), &[(RAW, "1,2\n")]);

    let pairs = plan_with_env(&opts(tmp.path(), false), &Env::default(), &SilentReporter).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(dump.join(RAW).is_file());
    assert!(dump.join("dump.zip").is_file(), "archive is left in place");
    assert_eq!(fs::read_to_string(&pairs[0].destination).unwrap(), "1,2\n");
    assert!(pairs[0].destination.ends_with("sub-S01/accel/ses-1/sub-S01_ses-1_accel.csv"));
}

#[test]
fn apply_extracts_tar_gz_then_plans() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_tar_gz(
        &dump.join("dump.tar.gz"),
        &[(RAW, "a"), ("Actigraph/A3/S02_Actigraphy/v5/S02 RAW.csv", "b")],
    );

    let pairs = plan_with_env(&opts(tmp.path(), false), &Env::default(), &SilentReporter).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs[1].destination.ends_with("sub-S02/accel/ses-3/sub-S02_ses-3_accel.csv"));
}

#[test]
fn plain_tar_previews_then_extracts() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_tar(&dump.join("dump.TAR"), &[("Actigraph/S03_Actigraphy/V3/S03 RAW.csv", "t")]);

    match guard_archive(&dump, true, &SilentReporter).unwrap() {
        ArchiveOutcome::Previewed { lines, .. } => assert_eq!(
            lines,
            vec!["Actigraph/", "  S03_Actigraphy/", "    V3/", "      S03 RAW.csv"]
        ),
        other => panic!("expected preview, got {other:?}"),
    }

    let pairs = plan_with_env(&opts(tmp.path(), false), &Env::default(), &SilentReporter).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].destination.ends_with("sub-S03/accel/ses-2/sub-S03_ses-2_accel.csv"));
    assert_eq!(fs::read_to_string(&pairs[0].destination).unwrap(), "t");
}

#[test]
fn env_switch_enables_archive_handling() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    write_zip(&dump.join("dump.zip"), &[(RAW, "x")]);

    let env = Env::from_pairs([("ACTIGRAPHY_HANDLE_ZIP", "yes")]);
    let mut o = opts(tmp.path(), false);
    o.handle_zip = None;
    let pairs = plan_with_env(&o, &env, &SilentReporter).unwrap();
    assert_eq!(pairs.len(), 1);
}

#[test]
fn unreadable_archive_aborts_before_extraction() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    fs::write(dump.join("dump.zip"), b"definitely not a zip").unwrap();

    let err = plan_with_env(&opts(tmp.path(), false), &Env::default(), &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, TransferError::ArchiveUnreadable { .. }));
    assert!(!dump.join("Actigraph").exists());
    assert!(!tmp.path().join("act-int-test").exists());
}

#[test]
fn unreadable_archive_is_fatal_on_dry_run() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    fs::write(dump.join("dump.tar.gz"), b"not gzip at all").unwrap();

    let err = guard_archive(&dump, true, &SilentReporter).unwrap_err();
    assert!(matches!(err, TransferError::ArchiveUnreadable { .. }));
    let err = plan_with_env(&opts(tmp.path(), true), &Env::default(), &SilentReporter)
        .unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(!dump.join("Actigraph").exists());
}

#[test]
fn populated_tree_is_refused_even_without_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    let src = dump.join(RAW);
    fs::create_dir_all(src.parent().unwrap()).unwrap();
    fs::write(&src, "x").unwrap();

    let err = plan_with_env(&opts(tmp.path(), true), &Env::default(), &SilentReporter)
        .unwrap_err();
    match err {
        TransferError::ArchiveTreePopulated { subdirs, .. } => assert_eq!(subdirs, vec!["Actigraph"]),
        other => panic!("unexpected error: {other}"),
    }

    let mut o = opts(tmp.path(), true);
    o.handle_zip = Some(false);
    assert_eq!(plan_with_env(&o, &Env::default(), &SilentReporter).unwrap().len(), 1);
}

#[test]
fn empty_dump_dir_passes_guard_then_fails_source_check() {
    let tmp = tempfile::tempdir().unwrap();
    let dump = dump_dir(&tmp);
    fs::write(dump.join("README.txt"), "not an archive").unwrap();

    assert_eq!(guard_archive(&dump, true, &SilentReporter).unwrap(), ArchiveOutcome::NoArchive);
    let err = plan_with_env(&opts(tmp.path(), true), &Env::default(), &SilentReporter)
        .unwrap_err();
    assert!(matches!(err, TransferError::SourceNotFound(_)));
}
