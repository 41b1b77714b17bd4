mod cancellation;
mod cpp;
mod declarators;
mod expressions;
mod macros;
mod recovery;
mod statements;
