pub mod result;

pub use result::{CheckResult, Stamp, resolve_host};
