pub mod application;
pub mod commands;
pub mod error;
pub mod launcher;
pub mod package;
pub mod packager;
pub mod runtime;
