pub mod carousel;
pub mod chrome;
pub mod config;
pub mod console;
mod css;
pub mod error;
pub mod events;
pub mod site;
pub mod tasks {
    pub mod preloader;
    pub mod runtime;
}

pub use page_model;
