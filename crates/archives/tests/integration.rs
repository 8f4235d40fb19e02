use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use archives::{
    acquire_and_verify_all, count_files, descriptor, extract, sha256_file, verify_integrity,
    AcquireError, CountFilter, DatasetName,
};
use flate2::write::GzEncoder;
use flate2::Compression;

fn write_zip(path: &Path, files: &[(String, String)]) {
    let mut zw = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, body) in files {
        zw.start_file(name.as_str(), zip::write::SimpleFileOptions::default())
            .unwrap();
        zw.write_all(body.as_bytes()).unwrap();
    }
    zw.finish().unwrap();
}

fn write_tar_gz(path: &Path, files: &[(String, String)]) {
    let enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, name.as_str(), body.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

fn numbered(n: usize, prefix: &str, ext: &str) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("{prefix}test_file_{i}{ext}"), format!("content_{i}")))
        .collect()
}

#[test]
fn test_extract_zip_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("test.zip");
    let out = tmp.path().join("extracted");
    write_zip(&archive, &numbered(5, "", ".txt"));

    let written = extract(&archive, &out).unwrap();

    assert_eq!(written, 5);
    assert_eq!(count_files(&out, CountFilter::All), 5);
    for i in 0..5 {
        let body = fs::read_to_string(out.join(format!("test_file_{i}.txt"))).unwrap();
        assert_eq!(body, format!("content_{i}"));
    }
}

#[test]
fn test_extract_tar_gz_archive_nested() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("test.tar.gz");
    let out = tmp.path().join("extracted");
    write_tar_gz(&archive, &numbered(5, "EMG/deep/", ".npy"));

    extract(&archive, &out).unwrap();

    assert_eq!(count_files(&out, CountFilter::All), 5);
    let body = fs::read_to_string(out.join("EMG/deep/test_file_3.npy")).unwrap();
    assert_eq!(body, "content_3");
}

#[test]
fn test_tar_member_escaping_destination_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("evil.tar.gz");

    let enc = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    let mut header = tar::Header::new_gnu();
    let name = b"../evil.txt";
    header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
    header.set_size(4);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    builder.append(&header, &b"evil"[..]).unwrap();
    builder.into_inner().unwrap().finish().unwrap();

    let out = tmp.path().join("nested/out");
    let err = extract(&archive, &out).unwrap_err();

    assert!(matches!(err, AcquireError::UnsafeEntry { .. }));
    assert!(!tmp.path().join("nested/evil.txt").exists());
}

#[test]
fn test_integrity_detects_single_byte_mutation() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("blob.bin");
    let mut bytes: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &bytes).unwrap();

    let digest = sha256_file(&path).unwrap();
    assert!(verify_integrity(&path, &digest).unwrap());
    assert!(verify_integrity(&path, &digest.to_uppercase()).unwrap());

    bytes[4242] ^= 0x01;
    fs::write(&path, &bytes).unwrap();
    assert!(!verify_integrity(&path, &digest).unwrap());
}

#[test]
fn test_acquire_reports_present_datasets_only() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    let processed = tmp.path().join("processed");
    fs::create_dir_all(&raw).unwrap();

    // EOG expects 3400 ± 1 files; a short archive must be reported, not raised.
    let eog = descriptor(DatasetName::Eog);
    write_tar_gz(&raw.join(eog.file_name()), &numbered(12, "EOG/", ".npy"));

    let report = acquire_and_verify_all(&raw, &processed).unwrap();

    assert_eq!(report.results.len(), 1);
    let check = &report.results[&DatasetName::Eog];
    assert!(!check.success);
    assert_eq!(check.actual, 12);
    assert!(!report.all_succeeded());
    assert_eq!(report.failed(), vec![DatasetName::Eog]);
    assert_eq!(report.missing(), vec![DatasetName::Eeg, DatasetName::Emg]);
    assert!(processed.join("EOG/EOG/test_file_0.npy").exists());
}

#[test]
fn test_acquire_eeg_counts_only_mat_files() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    let processed = tmp.path().join("processed");
    fs::create_dir_all(&raw).unwrap();

    let mut files = numbered(4513, "EEG/", ".mat");
    files.push(("EEG/readme.txt".into(), "ignored".into()));
    write_zip(&raw.join(descriptor(DatasetName::Eeg).file_name()), &files);

    let report = acquire_and_verify_all(&raw, &processed).unwrap();

    let check = &report.results[&DatasetName::Eeg];
    assert!(check.success);
    assert_eq!(check.actual, 4513);
    assert!(report.all_succeeded());
}

#[test]
fn test_acquire_with_no_archives_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let report = acquire_and_verify_all(tmp.path(), &tmp.path().join("processed")).unwrap();
    assert!(report.results.is_empty());
    assert!(report.all_succeeded());
}

#[test]
fn test_corrupt_archive_aborts_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join(descriptor(DatasetName::Eeg).file_name()), b"definitely not a zip").unwrap();

    let err = acquire_and_verify_all(&raw, &tmp.path().join("processed")).unwrap_err();
    assert!(matches!(err, AcquireError::Archive { .. }));
}
