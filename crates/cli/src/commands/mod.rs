pub mod check;
pub mod find;
pub mod watch;

pub use check::check_command;
pub use find::find_command;
pub use watch::watch_command;
