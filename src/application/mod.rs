pub mod cli;
pub mod pages;
