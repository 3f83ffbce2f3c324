pub mod dashboard;
pub mod sync;
pub mod tasks;
