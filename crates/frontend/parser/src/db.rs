use std::sync::Arc;

use crate::{parse_translation_unit, CancellationToken, Language, ParseError, ParsedUnit, ParserOptions};

#[salsa::db]
#[derive(Clone, Default)]
pub struct ParserDatabaseImpl {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for ParserDatabaseImpl {}

// Most basic database: gives access to parsed translation units.
#[salsa::db]
pub trait ParserDb: salsa::Database {}

#[salsa::db]
impl ParserDb for ParserDatabaseImpl {}

/// Trait for upcasting a reference to a base trait object.
pub trait Upcast<T: ?Sized> {
    fn upcast(&self) -> &T;
    fn upcast_mut(&mut self) -> &mut T;
}

#[salsa::input(debug)]
pub struct SourceFile {
    #[returns(ref)]
    pub text: String,
    #[returns(ref)]
    pub file_path: String,
    pub language: Language,
}

/// Parses a source file with default options for its language
#[salsa::tracked(returns(ref), no_eq)]
pub fn parse_file(db: &dyn ParserDb, file: SourceFile) -> Result<Arc<ParsedUnit>, ParseError> {
    let options = ParserOptions::for_language(file.language(db));
    parse_translation_unit(
        file.text(db),
        file.file_path(db),
        &options,
        &CancellationToken::new(),
    )
    .map(Arc::new)
}
