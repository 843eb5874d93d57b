pub mod iced_ui;
pub mod state;

pub use iced_ui::run_iced_app;
pub use state::{Notification, Session, UiMode};
