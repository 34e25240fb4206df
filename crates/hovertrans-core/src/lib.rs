pub mod dom;
pub mod domain;
pub mod error;
pub mod extract;
pub mod language;
pub mod markup;
pub mod suppress;
pub mod trace;
