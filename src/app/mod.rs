pub mod bootstrap;
pub mod terminal;
