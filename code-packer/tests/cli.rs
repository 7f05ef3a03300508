use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{create_dir_all, read_to_string, write};
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;

fn abc_tree(root: &Path) {
    create_dir_all(root.join("sub")).unwrap();
    write(root.join("a.txt"), "A").unwrap();
    write(root.join("sub/b.txt"), "B").unwrap();
    write(root.join("sub/c.txt"), "C").unwrap();
}

fn packer(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("code-packer").expect("Binary exists");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn packs_working_directory_into_two_bundles() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .arg("2")
        .assert()
        .success()
        .stdout("Created 2 files.\n");

    assert_eq!(
        read_to_string(tmp.path().join("package_1.txt")).unwrap(),
        "\n===== FILE: a.txt =====\nA\n===== FILE: sub/b.txt =====\nB"
    );
    assert_eq!(
        read_to_string(tmp.path().join("package_2.txt")).unwrap(),
        "\n===== FILE: sub/c.txt =====\nC"
    );
}

#[test]
fn empty_directory_reports_nothing_to_pack() {
    let tmp = tempdir().unwrap();

    packer(tmp.path())
        .arg("3")
        .assert()
        .success()
        .stdout("No files to pack.\n");

    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn asking_for_more_bundles_than_files_creates_one_per_file() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .arg("5")
        .assert()
        .success()
        .stdout("Created 3 files.\n");
    assert!(!tmp.path().join("package_4.txt").exists());
}

#[test]
fn running_twice_gives_identical_bundles() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path()).arg("2").assert().success();
    let first = read_to_string(tmp.path().join("package_1.txt")).unwrap();
    packer(tmp.path())
        .arg("2")
        .assert()
        .success()
        .stdout("Created 2 files.\n");
    let second = read_to_string(tmp.path().join("package_1.txt")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn root_exclude_and_output_dir_flags_are_honoured() {
    let tmp = tempdir().unwrap();
    let tree = tmp.path().join("tree");
    let out = tmp.path().join("out");
    create_dir_all(&out).unwrap();
    abc_tree(&tree);

    packer(tmp.path())
        .args(["1", "--root", "tree", "--output-dir", "out", "--exclude", "b.txt"])
        .assert()
        .success()
        .stdout("Created 1 files.\n");

    let bundle = read_to_string(out.join("package_1.txt")).unwrap();
    assert!(bundle.contains("===== FILE: a.txt ====="));
    assert!(bundle.contains("===== FILE: sub/c.txt ====="));
    assert!(!bundle.contains("b.txt"));
}

#[test]
fn config_file_sets_prefix() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());
    let config = tmp.path().join("packer.yaml");
    write(&config, "collect:\n  exclude: [packer.yaml]\nwrite:\n  prefix: part\n").unwrap();

    packer(tmp.path())
        .args(["3", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout("Created 3 files.\n");

    assert!(tmp.path().join("part_3.txt").exists());
    assert!(!tmp.path().join("package_1.txt").exists());
}

#[test]
fn missing_count_prints_usage_and_exits_with_one() {
    let tmp = tempdir().unwrap();

    packer(tmp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: code-packer"));
}

#[test]
fn extra_argument_prints_usage_and_exits_with_one() {
    let tmp = tempdir().unwrap();

    packer(tmp.path())
        .args(["2", "3"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: code-packer"));
}

#[test]
fn non_integer_count_fails_with_a_diagnostic() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .arg("many")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("invalid value"));
    assert!(!tmp.path().join("package_1.txt").exists());
}

#[test]
fn zero_count_is_rejected() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'0'"));
    assert!(!tmp.path().join("package_1.txt").exists());
}

#[test]
fn negative_count_is_rejected_as_a_bad_value() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .arg("-3")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("invalid value '-3'"));
    assert!(!tmp.path().join("package_1.txt").exists());
}

#[test]
fn prefix_with_a_path_separator_is_refused() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());
    create_dir_all(tmp.path().join("out")).unwrap();
    write(
        tmp.path().join("c.yaml"),
        "collect:\n  exclude: [c.yaml]\nwrite:\n  prefix: out/part\n",
    )
    .unwrap();

    packer(tmp.path())
        .args(["1", "--config", "c.yaml"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("write.prefix"));
    assert!(!tmp.path().join("out/part_1.txt").exists());
}

#[test]
fn unwritable_output_dir_fails_the_run() {
    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());

    packer(tmp.path())
        .args(["1", "--output-dir", "missing/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Packing failed"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_and_bundle_events() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use code_packer::cli::{run, Cli};

    let tmp = tempdir().unwrap();
    abc_tree(tmp.path());
    let cli = Cli {
        count: NonZeroUsize::new(2).unwrap(),
        root: Some(tmp.path().to_path_buf()),
        output_dir: None,
        config: None,
        exclude: Vec::new(),
    };

    let report = run(cli).await.expect("run should succeed");
    assert_eq!(report.bundles_written(), 2);

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
    assert!(
        event_msgs.iter().any(|msg| msg.contains("Wrote bundle")),
        "Expected a 'Wrote bundle' trace event, got: {:?}",
        event_msgs
    );
}
