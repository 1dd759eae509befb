//! Storage Module
//!
//! Filesystem access for the server.
//!
//! ## Components
//! - **FileStore**: the flat served directory (list/stat/read/write/delete by name)
//! - **FileLocks**: per-name locks serializing transfers and deletes of one file
//!
//! ## Layout
//! ```text
//! {upload_dir}/
//!   ├── report.pdf
//!   ├── photo.jpg
//!   └── ...            (no subdirectories are served)
//! ```

mod locks;
mod store;

pub use locks::{FileGuard, FileLocks};
pub use store::{validate_filename, FileStore};
