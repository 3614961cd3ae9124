//! Resuming work from a saved state or checkpoint.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use stepline::builder::{BuildError, IndexedBuilder, MachineBuilder};
use stepline::checkpoint::{Checkpoint, CheckpointError};
use stepline::core::{data_fn, from_fn, DataStep, Step};
use stepline::state_enum;

state_enum! {
    enum Release {
        Build,
        Test,
        Publish,
        Released,
    }
}

#[derive(Default)]
struct Journal {
    entries: Vec<&'static str>,
}

fn entry(state: Release, label: &'static str) -> Arc<dyn Step<Release, Journal>> {
    Arc::new(from_fn(state, move |journal: &mut Journal| {
        journal.entries.push(label);
        true
    }))
}

fn release() -> MachineBuilder<Release, Journal> {
    MachineBuilder::new()
        .add_shared(entry(Release::Build, "build"))
        .add_shared(entry(Release::Test, "test"))
        .add_shared(entry(Release::Publish, "publish"))
        .set_end_state(Release::Released)
}

#[tokio::test]
async fn saved_state_resumes_on_a_fresh_machine() {
    let builder = release();
    let mut journal = Journal::default();

    let saved = {
        let mut machine = builder.build(Release::Build, &mut journal).unwrap();
        assert!(machine.advance().await);
        *machine.state()
    };
    assert_eq!(saved, Release::Test);

    let mut machine = builder.build(saved, &mut journal).unwrap();
    assert_eq!(machine.run().await, 2);
    drop(machine);

    assert_eq!(journal.entries, vec!["build", "test", "publish"]);
}

#[tokio::test]
async fn resuming_after_failure_skips_completed_steps() {
    let flaky_ready = Arc::new(AtomicBool::new(false));
    let flaky_runs = Arc::new(AtomicUsize::new(0));

    let ready = flaky_ready.clone();
    let runs = flaky_runs.clone();
    let builder = MachineBuilder::new()
        .add_shared(entry(Release::Build, "build"))
        .add_step(from_fn(Release::Test, move |journal: &mut Journal| {
            runs.fetch_add(1, Ordering::SeqCst);
            let passed = ready.load(Ordering::SeqCst);
            if passed {
                journal.entries.push("test");
            }
            passed
        }))
        .add_shared(entry(Release::Publish, "publish"))
        .set_end_state(Release::Released);

    let mut journal = Journal::default();
    let saved = {
        let mut machine = builder.build(Release::Build, &mut journal).unwrap();
        assert_eq!(machine.run().await, 1);
        *machine.state()
    };
    assert_eq!(saved, Release::Test);

    flaky_ready.store(true, Ordering::SeqCst);
    let mut machine = builder.build(saved, &mut journal).unwrap();
    while machine.advance().await {}
    drop(machine);

    assert_eq!(journal.entries, vec!["build", "test", "publish"]);
    assert_eq!(flaky_runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn machine_at_end_state_does_nothing() {
    let builder = release();
    let mut journal = Journal::default();

    let mut machine = builder.build(Release::Released, &mut journal).unwrap();
    assert!(!machine.advance().await);
    assert!(!machine.advance().await);
    assert_eq!(*machine.state(), Release::Released);
    drop(machine);

    assert!(journal.entries.is_empty());
}

#[tokio::test]
async fn json_checkpoint_restores_position_and_history() {
    let builder = release();
    let mut journal = Journal::default();

    let json = {
        let mut machine = builder.build(Release::Build, &mut journal).unwrap();
        machine.advance().await;
        machine.advance().await;
        machine.checkpoint().to_json().unwrap()
    };

    let checkpoint = Checkpoint::<Release>::from_json(&json).unwrap();
    assert_eq!(checkpoint.state, Release::Publish);
    assert_eq!(checkpoint.history.len(), 2);

    let mut machine = builder.resume(&checkpoint, &mut journal).unwrap();
    assert!(machine.advance().await);
    assert!(!machine.advance().await);

    let path: Vec<Release> = machine.history().get_path().into_iter().copied().collect();
    assert_eq!(
        path,
        vec![
            Release::Build,
            Release::Test,
            Release::Publish,
            Release::Released
        ]
    );
    assert_eq!(machine.data().entries, vec!["build", "test", "publish"]);
}

#[tokio::test]
async fn binary_checkpoint_resumes_indexed_machine() {
    let counted: Vec<Arc<dyn DataStep<u32>>> = (0..4)
        .map(|_| {
            Arc::new(data_fn(|n: &mut u32| {
                *n += 1;
                true
            })) as Arc<dyn DataStep<u32>>
        })
        .collect();
    let builder = IndexedBuilder::new().add_steps(counted);
    let mut total = 0u32;

    let bytes = {
        let mut machine = builder.build(&mut total).unwrap();
        machine.advance().await;
        machine.checkpoint().to_bytes().unwrap()
    };

    let checkpoint = Checkpoint::<usize>::from_bytes(&bytes).unwrap();
    let mut machine = builder.resume(&checkpoint, &mut total).unwrap();
    assert_eq!(*machine.state(), 1);
    assert_eq!(machine.run().await, 3);
    drop(machine);

    assert_eq!(total, 4);
}

#[test]
fn checkpoint_from_newer_format_is_rejected() {
    let builder = release();
    let mut journal = Journal::default();

    let mut checkpoint = builder
        .build(Release::Build, &mut journal)
        .unwrap()
        .checkpoint();
    checkpoint.version = 99;
    let json = serde_json::to_string(&checkpoint).unwrap();

    assert!(matches!(
        Checkpoint::<Release>::from_json(&json),
        Err(CheckpointError::UnsupportedVersion { found: 99, .. })
    ));
    assert!(matches!(
        builder.resume(&checkpoint, &mut journal),
        Err(BuildError::Checkpoint(CheckpointError::UnsupportedVersion { .. }))
    ));
}
