pub mod api;
pub mod config;
pub mod models;
pub mod routes;
pub mod stores;

#[cfg(test)]
mod testing;
