mod config;
mod env;
mod query_client;
mod services;
mod sqlite_store;
mod time;

#[cfg(test)]
mod test_support;

pub use config::BackendConfig;
pub use query_client::QueryClient;
pub use services::ParsecService;
pub use sqlite_store::SqliteStore;
