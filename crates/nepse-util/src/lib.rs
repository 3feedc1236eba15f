pub mod client_ext;
pub mod fs;
pub mod ui;

pub use crate::client_ext::util::ClientUtilExt as Util;
pub use crate::client_ext::build_client;
pub use crate::fs::{read_text, write_json, write_text};
