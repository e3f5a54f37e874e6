pub mod drawing;
pub mod file;
pub mod node;
