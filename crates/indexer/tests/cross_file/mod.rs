use std::sync::Arc;

use cdom_diagnostics::DiagnosticCode;
use cdom_indexer::{Indexer, IndexerConfig, SharedIndex, SourceInput};
use cdom_semantic::{BindingKey, CrossFileIndex, Namespace};

use crate::common::{codes, fixture_input};

fn indexer() -> Indexer {
    Indexer::new(IndexerConfig::default()).unwrap()
}

#[test]
fn test_main_alone_misses_library_names() {
    let run = indexer().check_files(&[fixture_input("index/main.c")]).unwrap();
    assert_eq!(
        codes(&run.outcomes[0]),
        vec![
            DiagnosticCode::FunctionResolutionFailure,
            DiagnosticCode::FunctionResolutionFailure
        ]
    );
}

#[test]
fn test_indexed_library_resolves_main() {
    let indexer = indexer();
    let inputs = [fixture_input("index/util.c"), fixture_input("index/main.c")];
    indexer.index_files(&inputs).unwrap();

    let run = indexer.check_files(&inputs).unwrap();
    assert!(run.outcomes[0].diagnostics.is_empty());
    assert_eq!(codes(&run.outcomes[1]), vec![DiagnosticCode::FunctionResolutionFailure]);
    assert!(run.outcomes[1].diagnostics[0].message.contains("subtract"));
}

#[test]
fn test_fixture_names_are_published() {
    let indexer = indexer();
    indexer
        .index_files(&[fixture_input("index/util.c"), fixture_input("index/main.c")])
        .unwrap();
    let snapshot = indexer.index().snapshot();

    let counter = BindingKey::new(Namespace::Ordinary, "counter");
    assert_eq!(snapshot.find_definitions(&counter)[0].file_path, "index/util.c");
    assert_eq!(snapshot.find_declarations(&counter)[0].file_path, "index/main.c");
    assert_eq!(snapshot.find_definitions(&BindingKey::new(Namespace::Tag, "point")).len(), 1);
    assert!(snapshot
        .find_definitions(&BindingKey::new(Namespace::Ordinary, "value"))
        .is_empty());
}

#[test]
fn test_readers_keep_their_snapshot_while_another_indexer_publishes() {
    let shared = Arc::new(SharedIndex::new());
    let reader = Indexer::with_index(IndexerConfig::default(), Arc::clone(&shared)).unwrap();
    let writer = Indexer::with_index(IndexerConfig::default(), Arc::clone(&shared)).unwrap();

    let held = shared.snapshot();
    writer.index_files(&[fixture_input("index/util.c")]).unwrap();

    let key = BindingKey::new(Namespace::Ordinary, "twice");
    assert!(held.find_definitions(&key).is_empty());
    assert_eq!(reader.index().snapshot().find_definitions(&key).len(), 1);
}

#[test]
fn test_cancellation_mid_batch_leaves_index_untouched() {
    let indexer = indexer();
    indexer.index_files(&[fixture_input("index/util.c")]).unwrap();
    let before = indexer.index().snapshot();

    indexer.cancellation_token().cancel();
    let result = indexer.index_files(&[
        fixture_input("index/main.c"),
        SourceInput::new("other.c", "int other = 1;"),
    ]);
    assert!(result.is_err());

    let after = indexer.index().snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(after.file("index/main.c").is_none());
}

#[test]
fn test_parallel_run_matches_sequential_run() {
    let inputs: Vec<SourceInput> = (0..16)
        .map(|i| {
            SourceInput::new(
                format!("unit{i}.c"),
                format!("int shared_{i} = {i};\nint read_{i}(void) {{ return shared_{i} + missing_{i}; }}\n"),
            )
        })
        .collect();
    let diagnostics_with = |jobs: usize| {
        let indexer = Indexer::new(IndexerConfig {
            jobs,
            ..IndexerConfig::default()
        })
        .unwrap();
        indexer
            .index_files(&inputs)
            .unwrap()
            .outcomes
            .iter()
            .map(|outcome| (outcome.path.clone(), codes(outcome)))
            .collect::<Vec<_>>()
    };
    assert_eq!(diagnostics_with(1), diagnostics_with(4));
}
