use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Lifecycle of one simulated trader, from account creation to trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraderPhase {
    Unregistered,
    Registering,
    Registered,
    LoggingIn,
    /// Terminal: the identity sits in the pool and can place orders.
    Active,
}

/// Authenticated trader identity. Never mutated after login.
#[derive(Debug)]
pub struct Trader {
    pub username: String,
    token: SecretString,
}

impl Trader {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: SecretString::from(token.into()),
        }
    }

    /// Bearer token for authenticated calls.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

pub fn username_for(ordinal: usize) -> String {
    format!("trader{ordinal}")
}

// ===== REST API Types =====

/// POST /api/trader/register body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn for_ordinal(ordinal: usize, password: &str) -> Self {
        Self {
            username: username_for(ordinal),
            password: password.to_string(),
            email: format!("example{ordinal}@localhost"),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
        }
    }
}

/// POST /api/trader/login body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn for_ordinal(ordinal: usize, password: &str) -> Self {
        Self {
            username: username_for(ordinal),
            password: password.to_string(),
        }
    }
}

/// POST /api/trader/login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrderType {
    #[serde(rename = "type")]
    pub side: Side,
}

/// POST /api/transaction/order body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub asset: String,
    pub price: f64,
    pub quantity: f64,
    pub order_type: OrderType,
}

impl PlaceOrderRequest {
    pub fn new(asset: impl Into<String>, price: f64, quantity: f64, side: Side) -> Self {
        Self {
            asset: asset.into(),
            price,
            quantity,
            order_type: OrderType { side },
        }
    }

    pub fn side(&self) -> Side {
        self.order_type.side
    }
}

/// Completed trade pushed by the matching engine over the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTransaction {
    pub transaction_id: String,
    pub asset: String,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: String,
    pub buyer: String,
    pub seller: String,
}
