use std::sync::Arc;

use cdom_diagnostics::Diagnostic;
use cdom_parser::{parse_file, ParseError, ParserDb, SourceFile, Upcast};

use crate::binder::bind_unit;
use crate::problem_reporter::report_problems;
use crate::model::SemanticModel;

/// Database trait for semantic analysis, extending the parser database
#[salsa::db]
pub trait SemanticDb: ParserDb + Upcast<dyn ParserDb> {}

/// Concrete database implementation for semantic analysis
#[salsa::db]
#[derive(Clone, Default)]
pub struct SemanticDatabaseImpl {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for SemanticDatabaseImpl {}

#[salsa::db]
impl ParserDb for SemanticDatabaseImpl {}

impl Upcast<dyn ParserDb> for SemanticDatabaseImpl {
    fn upcast(&self) -> &(dyn ParserDb + 'static) {
        self
    }
    fn upcast_mut(&mut self) -> &mut (dyn ParserDb + 'static) {
        self
    }
}

#[salsa::db]
impl SemanticDb for SemanticDatabaseImpl {}

/// Binds a source file on its own, without a cross-file index
#[salsa::tracked(returns(ref), no_eq)]
pub fn semantic_model(db: &dyn SemanticDb, file: SourceFile) -> Result<Arc<SemanticModel>, ParseError> {
    let _span = tracing::trace_span!("semantic_model", ?file).entered();
    let unit = parse_file(db.upcast(), file).clone()?;
    Ok(Arc::new(bind_unit(&unit, None)))
}

/// Preprocessor diagnostics followed by syntax and binding problems
#[salsa::tracked(returns(ref), no_eq)]
pub fn problem_diagnostics(db: &dyn SemanticDb, file: SourceFile) -> Result<Vec<Diagnostic>, ParseError> {
    let unit = parse_file(db.upcast(), file).clone()?;
    let model = semantic_model(db, file).clone()?;
    let mut diagnostics = unit.diagnostics.clone();
    diagnostics.extend(report_problems(&unit, &model));
    Ok(diagnostics)
}
