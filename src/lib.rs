pub mod canvas;
pub mod gui;
pub mod logging;
pub mod prompt;
pub mod settings;
pub mod settings_store;
