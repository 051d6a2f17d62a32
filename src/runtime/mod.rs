pub mod background;
pub mod commands;
