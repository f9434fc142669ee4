//! Output module: the values handed to callers
//!
//! This module holds:
//! - `StatRecord` / `StatFields`: one parsed entity row with ordered columns
//! - `FetchResult`: the uniform result of a fetch call

mod record;
mod result;

pub use record::{StatFields, StatRecord};
pub use result::FetchResult;
