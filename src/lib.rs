#![forbid(unsafe_code)]

pub mod barrier;
pub mod book;
pub mod build;
pub mod cli;
pub mod config;
pub mod corrections;
pub mod crawl;
pub mod export;
pub mod extract;
pub mod formats;
pub mod logging;
pub mod paragraph;
pub mod toc;
