use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
use rigging_di::{Apply, Cleanup, Container, Provide, ResolveError};

type Journal = Arc<Mutex<Vec<String>>>;

fn note(journal: &Journal, entry: impl Into<String>) {
    journal.lock().push(entry.into());
}

struct Pool;
struct Cache {
    _pool: Arc<Pool>,
}
struct Session;

fn container(journal: &Journal) -> Container {
    let pool_journal = journal.clone();
    let cache_journal = journal.clone();

    Container::builder()
        .provide(Provide::with_cleanup(move || {
            let journal = pool_journal.clone();
            (Pool, Cleanup::new(move || note(&journal, "pool")))
        }))
        .provide(Provide::fallible_with_cleanup(move |pool: Arc<Pool>| {
            let journal = cache_journal.clone();
            Ok::<_, std::io::Error>((Cache { _pool: pool }, Cleanup::new(move || note(&journal, "cache"))))
        }))
        .build()
        .unwrap()
}

#[test]
fn cleanup_runs_dependents_first() {
    let journal = Journal::default();
    let container = container(&journal);

    container.extract::<Cache>().unwrap();
    container.cleanup();

    assert_eq!(*journal.lock(), vec!["cache", "pool"]);
}

#[test]
fn cleanup_is_idempotent() {
    let journal = Journal::default();
    let container = container(&journal);

    container.extract::<Cache>().unwrap();
    container.cleanup();
    container.cleanup();

    assert_eq!(journal.lock().len(), 2);
}

#[test]
fn dropping_the_last_clone_cleans_up() {
    let journal = Journal::default();
    let container = container(&journal);
    let clone = container.clone();

    clone.extract::<Cache>().unwrap();
    drop(container);
    assert!(journal.lock().is_empty());

    drop(clone);
    assert_eq!(*journal.lock(), vec!["cache", "pool"]);
}

#[test]
fn unproduced_keys_are_not_cleaned_up() {
    let journal = Journal::default();
    let container = container(&journal);

    container.extract::<Pool>().unwrap();
    container.cleanup();

    assert_eq!(*journal.lock(), vec!["pool"]);
}

#[test]
fn every_prototype_instance_is_cleaned_up() {
    let cleaned = Arc::new(AtomicUsize::new(0));
    let counter = cleaned.clone();

    let container = Container::builder()
        .provide(
            Provide::with_cleanup(move || {
                let counter = counter.clone();
                (Session, Cleanup::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }))
            })
            .prototype(),
        )
        .build()
        .unwrap();

    for _ in 0..3 {
        container.extract::<Session>().unwrap();
    }
    assert_eq!(container.history().len(), 3);

    container.cleanup();
    assert_eq!(cleaned.load(Ordering::SeqCst), 3);
}

#[test]
fn modifier_runs_once_after_first_production() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();

    let container = Container::builder()
        .instance(String::from("warm"))
        .provide(Provide::new(|| AtomicBool::new(false)).prototype())
        .apply(Apply::new(move |flag: Arc<AtomicBool>, mode: Arc<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            flag.store(*mode == "warm", Ordering::SeqCst);
        }))
        .build()
        .unwrap();

    let first = container.extract::<AtomicBool>().unwrap();
    let second = container.extract::<AtomicBool>().unwrap();

    assert!(first.load(Ordering::SeqCst));
    assert!(!second.load(Ordering::SeqCst));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_modifier_discards_the_instance() {
    let journal = Journal::default();
    let pool_journal = journal.clone();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let container = Container::builder()
        .provide(Provide::with_cleanup(move || {
            let journal = pool_journal.clone();
            (Pool, Cleanup::new(move || note(&journal, "pool")))
        }))
        .apply(Apply::new(move |_: Arc<Pool>| -> Result<(), String> {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err("migration failed".into()),
                _ => Ok(()),
            }
        }))
        .build()
        .unwrap();

    let error = container.extract::<Pool>().err().unwrap();
    assert!(matches!(error.root_cause(), ResolveError::ConstructorFailed(e) if e.to_string() == "migration failed"));
    assert_eq!(error.key_chain().len(), 2);
    assert_eq!(*journal.lock(), vec!["pool"]);
    assert!(container.history().is_empty());

    container.extract::<Pool>().unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(container.history().len(), 1);
}
