pub mod gateway_http;
pub mod simulator;

pub use gateway_http::GatewayClient;
pub use simulator::config::Settings;
pub use simulator::driver::{ActorDriver, DriverConfig, FleetReport, OrderWave, WaveOutcome};
pub use simulator::endpoints::{Endpoint, EndpointRegistry};
pub use simulator::pool::TraderPool;
pub use simulator::stream_ws::TransactionStream;
pub use simulator::types::{ResolvedTransaction, Side, Trader};
