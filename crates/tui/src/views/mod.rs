pub mod activity;
pub mod flow;
pub mod help;
pub mod transcript;
pub mod workspace;
