mod client;
mod models;

pub use client::SportContentClient;
pub use models::*;
