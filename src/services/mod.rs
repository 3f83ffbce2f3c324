pub mod anthropic;
pub mod capabilities;
pub mod dashboard_engine;
pub mod fetch_window;
pub mod gmail;
pub mod reconciler;
pub mod response_parser;
pub mod sync_engine;
pub mod task_repository;
