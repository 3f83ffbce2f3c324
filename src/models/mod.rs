pub mod dashboard;
pub mod message;
pub mod settings;
pub mod sync;
pub mod task;
pub mod user;

pub use dashboard::*;
pub use message::*;
pub use settings::*;
pub use sync::*;
pub use task::*;
pub use user::*;
