pub mod colors;
pub mod session;

pub use crate::domain::model::{Quote, QuoteResponse, Rgb, SessionState};
pub use crate::domain::ports::{ConfigProvider, QuoteSource, QuoteStore};
pub use crate::utils::error::Result;
