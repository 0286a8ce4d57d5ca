#![deny(clippy::all, clippy::pedantic)]

pub mod applications;
pub mod auth;
pub mod blogs;
pub mod community;
pub mod content;
pub mod events;
pub mod records;
