#[path = "helpers.rs"]
mod helpers;

#[path = "config/loader.rs"]
mod loader;
