//! Actor Driver: fleet lifecycle for simulated traders.
//!
//! Phases, strictly in this order:
//!   1. Register: one fire-and-forget task per ordinal `1..=N`.
//!   2. Settle: a single time-based barrier of `N × settle_per_trader`,
//!      giving the gateway's account store time to become consistent.
//!   3. Login: sequential, one ordinal at a time. Each login runs in its own
//!      task and the driver awaits it before starting the next, so pool order
//!      equals login order and a bad login only kills itself.
//!   4. Order wave: `orders_per_side` BUY + `orders_per_side` SELL tasks, each
//!      picks a uniform random trader and submits exactly one order.
//!
//! The barrier is deliberately coarse: it does not poll for readiness.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::endpoints::{Endpoint, EndpointRegistry, TRADER_SERVICE, TRANSACTION_SERVICE};
use super::pool::TraderPool;
use super::types::{
    LoginRequest, LoginResponse, PlaceOrderRequest, RegisterRequest, Side, Trader, TraderPhase,
};
use crate::gateway_http::GatewayClient;

// ─────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Fleet size N.
    pub num_traders: usize,
    /// Settling delay per trader; the barrier is N times this.
    pub settle_per_trader: Duration,
    /// BUY tasks in the wave (and as many SELL tasks).
    pub orders_per_side: usize,
    /// Shared password for every generated account.
    pub password: String,
    pub order_asset: String,
    pub order_price: f64,
    pub order_quantity: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            num_traders: 5,
            settle_per_trader: Duration::from_secs(3),
            orders_per_side: 10,
            password: "pass123".to_string(),
            order_asset: "BTC".to_string(),
            order_price: 1178.20,
            order_quantity: 10.0,
        }
    }
}

impl DriverConfig {
    /// Total settling barrier: `num_traders × settle_per_trader`.
    pub fn settle_barrier(&self) -> Duration {
        let n = u32::try_from(self.num_traders).unwrap_or(u32::MAX);
        self.settle_per_trader.saturating_mul(n)
    }

    pub fn order(&self, side: Side) -> PlaceOrderRequest {
        PlaceOrderRequest::new(
            self.order_asset.clone(),
            self.order_price,
            self.order_quantity,
            side,
        )
    }
}

// ─────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetReport {
    pub registrations: usize,
    pub logins_attempted: usize,
    pub traders_active: usize,
    pub orders_spawned: usize,
}

/// In-flight order tasks. Dropping this detaches them.
#[derive(Debug)]
pub struct OrderWave {
    pub report: FleetReport,
    handles: Vec<JoinHandle<Result<()>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveOutcome {
    pub placed: usize,
    pub failed: usize,
}

impl OrderWave {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every order task. Panicked tasks count as failed.
    pub async fn join(self) -> WaveOutcome {
        let mut outcome = WaveOutcome::default();
        for handle in self.handles {
            match handle.await {
                Ok(Ok(())) => outcome.placed += 1,
                Ok(Err(_)) | Err(_) => outcome.failed += 1,
            }
        }
        outcome
    }
}

// ─────────────────────────────────────────────────────────
// Actor
// ─────────────────────────────────────────────────────────

pub struct ActorDriver {
    cfg: DriverConfig,
    client: GatewayClient,
    pool: TraderPool,
    register_ep: Endpoint,
    login_ep: Endpoint,
    order_ep: Endpoint,
}

impl ActorDriver {
    /// Resolve every endpoint the fleet needs up front; a missing route
    /// fails here, before anything is spawned.
    pub fn new(cfg: DriverConfig, client: GatewayClient, registry: &EndpointRegistry) -> Result<Self> {
        Ok(Self {
            register_ep: registry.get(TRADER_SERVICE, "register")?.clone(),
            login_ep: registry.get(TRADER_SERVICE, "login")?.clone(),
            order_ep: registry.get(TRANSACTION_SERVICE, "order")?.clone(),
            cfg,
            client,
            pool: TraderPool::new(),
        })
    }

    pub fn pool(&self) -> &TraderPool {
        &self.pool
    }

    /// Run register → settle → login, then launch the order wave.
    ///
    /// Returns once the wave is spawned. Errors only when no trader could log
    /// in, since an order wave over an empty pool is meaningless.
    pub async fn run(&self) -> Result<OrderWave> {
        let n = self.cfg.num_traders;
        info!(
            "🚦 ActorDriver started | traders={} settle={:?} orders/side={} gateway={}",
            n,
            self.cfg.settle_barrier(),
            self.cfg.orders_per_side,
            self.client.base_url(),
        );

        info!("📝 Registering {} traders", n);
        let registrations = self.register_fleet().len();

        let barrier = self.cfg.settle_barrier();
        info!("⏳ Waiting {:?} for account store to settle", barrier);
        sleep(barrier).await;

        info!("🔑 Logging traders in");
        let traders_active = self.login_fleet().await;
        info!("🔑 {}/{} traders active", traders_active, n);

        let mut report = FleetReport {
            registrations,
            logins_attempted: n,
            traders_active,
            orders_spawned: 0,
        };

        info!("📤 Placing orders");
        let handles = self.place_order_wave().await?;
        report.orders_spawned = handles.len();

        Ok(OrderWave { report, handles })
    }

    /// Spawn one registration per ordinal. Handles are returned but callers
    /// are free to drop them.
    fn register_fleet(&self) -> Vec<JoinHandle<()>> {
        (1..=self.cfg.num_traders)
            .map(|ordinal| {
                let client = self.client.clone();
                let endpoint = self.register_ep.clone();
                let payload = RegisterRequest::for_ordinal(ordinal, &self.cfg.password);

                tokio::spawn(async move {
                    debug!(username = %payload.username, phase = ?TraderPhase::Registering, "register");
                    match client.execute(&endpoint, &payload, None).await {
                        Ok(_) => {
                            debug!(username = %payload.username, phase = ?TraderPhase::Registered, "register sent");
                        }
                        Err(err) => {
                            warn!("💥 Registration of {} failed: {:#}", payload.username, err);
                        }
                    }
                })
            })
            .collect()
    }

    /// Log every ordinal in, one after another. Returns the pool size.
    async fn login_fleet(&self) -> usize {
        for ordinal in 1..=self.cfg.num_traders {
            let request = LoginRequest::for_ordinal(ordinal, &self.cfg.password);
            let username = request.username.clone();
            debug!(%username, phase = ?TraderPhase::LoggingIn, "login");

            let task = tokio::spawn(login(
                self.client.clone(),
                self.login_ep.clone(),
                self.pool.clone(),
                request,
            ));

            match task.await {
                Ok(Ok(index)) => {
                    info!(%username, index, phase = ?TraderPhase::Active, "✅ Trader logged in");
                }
                Ok(Err(err)) => {
                    warn!("💥 Login of {} failed: {:#}", username, err);
                }
                Err(err) => {
                    error!("💥 Login task of {} aborted: {}", username, err);
                }
            }
        }
        self.pool.size().await
    }

    async fn place_order_wave(&self) -> Result<Vec<JoinHandle<Result<()>>>> {
        if self.pool.is_empty().await {
            bail!("no trader logged in, refusing to place orders");
        }

        let mut handles = Vec::with_capacity(self.cfg.orders_per_side * 2);
        for _ in 0..self.cfg.orders_per_side {
            for side in [Side::Buy, Side::Sell] {
                handles.push(spawn_order(
                    self.client.clone(),
                    self.order_ep.clone(),
                    self.pool.clone(),
                    self.cfg.order(side),
                ));
            }
        }
        Ok(handles)
    }
}

// ─────────────────────────────────────────────────────────
// Per-trader operations
// ─────────────────────────────────────────────────────────

/// Decode the login response into an auth token.
pub fn decode_login(body: &[u8]) -> Result<String> {
    let resp: LoginResponse =
        serde_json::from_slice(body).context("login response is not {\"authToken\": ...}")?;
    if resp.auth_token.is_empty() {
        bail!("login response carried an empty authToken");
    }
    Ok(resp.auth_token)
}

/// Log in one trader and append it to the pool. Returns its pool index.
pub async fn login(
    client: GatewayClient,
    endpoint: Endpoint,
    pool: TraderPool,
    request: LoginRequest,
) -> Result<usize> {
    let body = client.execute(&endpoint, &request, None).await?;
    let token = decode_login(&body)
        .with_context(|| format!("malformed login response for {}", request.username))?;
    Ok(pool.append(Trader::new(request.username, token)).await)
}

/// Spawn a single order placement under a uniformly random trader.
/// A failure is logged and ends only this task.
pub fn spawn_order(
    client: GatewayClient,
    endpoint: Endpoint,
    pool: TraderPool,
    order: PlaceOrderRequest,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let side = order.side();
        let result = place_order(&client, &endpoint, &pool, &order).await;
        if let Err(err) = &result {
            warn!("💥 {} order failed: {:#}", side.as_str(), err);
        }
        result
    })
}

async fn place_order(
    client: &GatewayClient,
    endpoint: &Endpoint,
    pool: &TraderPool,
    order: &PlaceOrderRequest,
) -> Result<()> {
    let (index, trader) = pool
        .pick_random()
        .await
        .context("trader pool is empty")?;

    debug!(
        trader = %trader.username,
        index,
        side = order.side().as_str(),
        "placing {} {:.2}@{:.2}",
        order.asset,
        order.quantity,
        order.price
    );

    client.execute(endpoint, order, Some(trader.token())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_barrier_is_three_seconds_per_trader() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.num_traders, 5);
        assert_eq!(cfg.settle_barrier(), Duration::from_secs(15));

        let cfg = DriverConfig { num_traders: 0, ..Default::default() };
        assert_eq!(cfg.settle_barrier(), Duration::ZERO);
    }

    #[test]
    fn test_default_order_is_fixed() {
        let order = DriverConfig::default().order(Side::Buy);
        assert_eq!(order.asset, "BTC");
        assert!((order.price - 1178.20).abs() < 1e-9);
        assert!((order.quantity - 10.0).abs() < 1e-9);
        assert_eq!(order.side(), Side::Buy);
    }

    #[test]
    fn test_decode_login_accepts_token() {
        assert_eq!(decode_login(br#"{"authToken":"abc123"}"#).unwrap(), "abc123");
    }

    #[test]
    fn test_decode_login_rejects_malformed() {
        assert!(decode_login(b"<html>502</html>").is_err());
        assert!(decode_login(br#"{"error":"bad credentials"}"#).is_err());
        assert!(decode_login(br#"{"authToken":""}"#).is_err());
        assert!(decode_login(br#"{"authToken":42}"#).is_err());
    }

    #[test]
    fn test_new_resolves_routes() {
        let client = GatewayClient::new(url::Url::parse("http://localhost:9000").unwrap());
        let driver =
            ActorDriver::new(DriverConfig::default(), client, &EndpointRegistry::reactive_stock())
                .unwrap();
        assert_eq!(driver.order_ep.path, "/api/transaction/order");
        assert_eq!(driver.login_ep.path, "/api/trader/login");
        assert_eq!(driver.register_ep.path, "/api/trader/register");
    }

    #[tokio::test]
    async fn test_order_wave_refused_on_empty_pool() {
        let client = GatewayClient::new(url::Url::parse("http://127.0.0.1:9").unwrap());
        let driver =
            ActorDriver::new(DriverConfig::default(), client, &EndpointRegistry::reactive_stock())
                .unwrap();
        assert!(driver.place_order_wave().await.is_err());
    }
}
