pub mod tattoo;
