// ─── Trader simulation: routing table, identities, fleet driver, stream ───
pub mod config;
pub mod driver;
pub mod endpoints;
pub mod pool;
pub mod stream_ws;
pub mod types;
