pub mod event;
pub mod level;
pub mod recovery;
pub mod session;
pub mod step;
