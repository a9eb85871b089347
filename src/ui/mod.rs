pub mod app;
mod components;
mod mailbox;
mod reply;
mod status_bar;
pub mod theme;
mod widgets;

pub use app::render;
