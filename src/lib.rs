pub mod config;
pub mod gui_app;
pub mod recognition;
pub mod surface;
