/// Local append-only logs - Gateway
mod append_log;

pub use append_log::{AppendLog, GalleriesLog, ImageLinksLog};
