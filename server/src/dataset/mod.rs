pub mod demo;
pub mod loader;
