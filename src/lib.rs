pub mod cli_args;
mod db;
mod error;
mod extractor;
mod middleware;
mod model;
mod repository;
mod route;
pub mod server;
mod state;

#[cfg(test)]
mod test;
