use chrono::{DateTime, TimeZone, Utc};
use merkled_core::filter::SystemFileFilter;
use merkled_core::hasher::{ByteSource, FileHasher, RawFile};
use merkled_core::progress::Progress;
use merkled_core::{hash_files, Digest, SealError};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).unwrap()
}

fn random_files(n: usize, seed: u64) -> Vec<RawFile> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let len = rng.gen_range(0..4096);
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            RawFile::from_bytes(&format!("dir{}/file-{i:03}.bin", i % 4), data, t0())
        })
        .collect()
}

#[test]
fn digest_depends_only_on_content() {
    let a = RawFile::from_bytes("x/one.txt", b"same".to_vec(), t0());
    let mut b = RawFile::from_bytes("y/two.txt", b"same".to_vec(), Utc::now());
    b.name = "other".into();
    let out = hash_files(vec![a, b]).unwrap();
    assert_eq!(out[0].hash, out[1].hash);
    assert_eq!(out[0].hash, Digest::of(b"same"));
}

#[test]
fn output_is_sorted_by_relative_path() {
    let mut files = random_files(40, 7);
    files.reverse();
    let out = hash_files(files).unwrap();
    let paths: Vec<&str> = out.iter().map(|f| f.relative_path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert_eq!(out.len(), 40);
}

#[test]
fn worker_count_does_not_change_the_result() {
    let one = FileHasher::default().with_threads(Some(1)).hash_files(random_files(64, 3)).unwrap();
    let many = FileHasher::default().with_threads(Some(8)).hash_files(random_files(64, 3)).unwrap();
    assert_eq!(one, many);
}

#[test]
fn system_files_are_skipped() {
    let files = vec![
        RawFile::from_bytes("a.txt", b"a".to_vec(), t0()),
        RawFile::from_bytes(".DS_Store", b"junk".to_vec(), t0()),
        RawFile::from_bytes("pics/Thumbs.db", b"junk".to_vec(), t0()),
        RawFile::from_bytes(".git/config", b"junk".to_vec(), t0()),
    ];
    let out = hash_files(files.clone()).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].relative_path, "a.txt");
    assert_eq!(out[0].path, "a.txt");

    let all = FileHasher::new(SystemFileFilter::none()).hash_files(files).unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn unreadable_file_fails_the_batch() {
    let mut files = random_files(10, 9);
    files.push(RawFile {
        name: "gone.bin".into(),
        relative_path: "gone.bin".into(),
        size: 3,
        last_modified: t0(),
        source: ByteSource::Path("/nonexistent/merkled/gone.bin".into()),
    });
    let err = hash_files(files).unwrap_err();
    match err {
        SealError::Io { path, .. } => assert_eq!(path, "gone.bin"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn size_mismatch_is_an_io_error() {
    let mut f = RawFile::from_bytes("a.txt", b"abc".to_vec(), t0());
    f.size = 10;
    assert!(matches!(hash_files(vec![f]), Err(SealError::Io { .. })));
}

#[test]
fn duplicate_relative_paths_are_rejected() {
    let files = vec![
        RawFile::from_bytes("a.txt", b"1".to_vec(), t0()),
        RawFile::from_bytes("a.txt", b"2".to_vec(), t0()),
    ];
    assert!(matches!(hash_files(files), Err(SealError::DuplicatePath(p)) if p == "a.txt"));
}

#[test]
fn last_modified_is_millisecond_utc() {
    let t = DateTime::parse_from_rfc3339("2023-02-03T04:05:06.789Z").unwrap().with_timezone(&Utc);
    let out = hash_files(vec![RawFile::from_bytes("a", vec![1], t)]).unwrap();
    assert_eq!(out[0].last_modified, "2023-02-03T04:05:06.789Z");
}

#[test]
fn progress_counts_every_hashed_byte() {
    let files = random_files(12, 11);
    let bytes: u64 = files.iter().map(|f| f.size).sum();
    let progress = Progress::disabled();
    FileHasher::default().with_progress(progress.clone()).hash_files(files).unwrap();
    assert_eq!(progress.files_done(), 12);
    assert_eq!(progress.bytes_done(), bytes);
}
