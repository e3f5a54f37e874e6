pub mod drawing;
pub mod node;
