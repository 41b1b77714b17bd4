use cdom_parser::Language;
use cdom_semantic::{report_problems, BindingKey, CrossFileIndex, IndexedKind, IndexedName, Type};
use chumsky::span::SimpleSpan;

use crate::{bind_snippet, parse_snippet};

/// An index holding one function and one struct defined in `lib.c`
struct LibraryIndex {
    entries: Vec<IndexedName>,
}

impl LibraryIndex {
    fn new() -> Self {
        Self {
            entries: vec![
                IndexedName {
                    file_path: "lib.c".into(),
                    name: "helper".into(),
                    qualified_name: "helper".into(),
                    kind: IndexedKind::Function,
                    ty: Type::function(Type::INT, vec![Type::INT], false),
                    span: SimpleSpan::from(4..10),
                    is_definition: true,
                },
                IndexedName {
                    file_path: "lib.c".into(),
                    name: "shared_count".into(),
                    qualified_name: "shared_count".into(),
                    kind: IndexedKind::Variable,
                    ty: Type::INT,
                    span: SimpleSpan::from(30..42),
                    is_definition: true,
                },
            ],
        }
    }
}

impl CrossFileIndex for LibraryIndex {
    fn find_definitions(&self, key: &BindingKey) -> Vec<IndexedName> {
        self.entries
            .iter()
            .filter(|entry| entry.is_definition && entry.key() == *key)
            .cloned()
            .collect()
    }

    fn find_declarations(&self, key: &BindingKey) -> Vec<IndexedName> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_definition && entry.key() == *key)
            .cloned()
            .collect()
    }
}

const USER: &str = r#"
int use(void) {
    return helper(shared_count) + missing(2);
}"#;

#[test]
fn test_names_from_other_files_resolve() {
    let index = LibraryIndex::new();
    let (unit, model) = bind_snippet(Language::C, USER, Some(&index));
    let problems = model.problems();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].1.name, "missing");

    let diagnostics = report_problems(&unit, &model);
    assert_eq!(diagnostics.len(), 1);
    assert!(model.imported("helper").is_some());
    assert!(model.imported("shared_count").is_some());
}

#[test]
fn test_without_index_every_external_name_fails() {
    let unit = parse_snippet(Language::C, USER, "user.c");
    let model = cdom_semantic::bind_unit(&unit, None);
    let names: Vec<&str> = model.problems().iter().map(|(_, p)| p.name.as_str()).collect();
    assert_eq!(names, vec!["helper", "shared_count", "missing"]);
}

#[test]
fn test_imported_functions_are_argument_checked() {
    let index = LibraryIndex::new();
    let (_, model) = bind_snippet(Language::C, "int bad(void) { return helper(1, 2); }", Some(&index));
    let problems = model.problems();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].1.kind, cdom_semantic::ProblemKind::InvalidArguments);
}

#[test]
fn test_local_declarations_shadow_the_index() {
    let index = LibraryIndex::new();
    let (_, model) = bind_snippet(
        Language::C,
        "static int helper(int a, int b);\nint f(void) { return helper(1, 2); }",
        Some(&index),
    );
    assert!(model.problems().is_empty());
    assert!(model.imported("helper").is_none());
}
