// Adapters layer: concrete implementations of the quote source and store ports.

pub mod http;
pub mod memory;
pub mod sqlite;
