//! State module: the declaration value passed between caller and engine.

pub mod declaration;

pub use declaration::Declaration;
