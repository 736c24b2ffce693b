pub mod diagnostics;
pub mod export;
pub mod tattoo;
