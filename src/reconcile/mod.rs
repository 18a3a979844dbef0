pub mod install;
pub mod probe;
pub mod scan;
pub mod update;

pub use install::{InstallOutcome, install_all};
pub use probe::{Partition, check_all};
pub use scan::scan_installed;
pub use update::{UpdateOutcome, update_all};
