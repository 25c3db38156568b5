pub mod app;
pub mod crop;
pub mod editor;
pub mod error;
pub mod filters;
pub mod history;
pub mod io;
