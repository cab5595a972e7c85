pub mod layout;
pub mod migrator;
pub mod usercache;

pub use layout::DataStore;
pub use migrator::FileMigrator;
pub use usercache::{NameDirectory, UserCache};
