pub mod diagnostics;
pub mod tattoo;
