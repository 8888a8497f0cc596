pub mod lock;
pub mod prompt;
pub mod zfs;

pub use lock::file::FileLockManager;
pub use lock::*;
pub use prompt::*;
pub use zfs::*;
