//! Process settings, read from the environment (after `.env`).
//!
//! Every knob defaults to the reference fleet: five traders, three seconds
//! of settling per trader, ten orders per side against `localhost:9000`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use super::driver::DriverConfig;
use crate::gateway_http::DEFAULT_GATEWAY_URL;

#[derive(Debug, Clone)]
pub struct Settings {
    pub gateway_url: Url,
    /// Optional directory for a daily rolling log file.
    pub log_dir: Option<PathBuf>,
    pub driver: DriverConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DriverConfig::default();

        let gateway_raw =
            lookup("INTERPOLATOR_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        let gateway_url = Url::parse(&gateway_raw)
            .with_context(|| format!("INTERPOLATOR_GATEWAY_URL is not a URL: {}", gateway_raw))?;

        let settle_secs: f64 = parse_or(
            &lookup,
            "INTERPOLATOR_SETTLE_SECS_PER_TRADER",
            defaults.settle_per_trader.as_secs_f64(),
        )?;
        let settle_per_trader = Duration::try_from_secs_f64(settle_secs)
            .context("INTERPOLATOR_SETTLE_SECS_PER_TRADER must be a non-negative number")?;

        let driver = DriverConfig {
            num_traders: parse_or(&lookup, "INTERPOLATOR_NUM_TRADERS", defaults.num_traders)?,
            settle_per_trader,
            orders_per_side: parse_or(
                &lookup,
                "INTERPOLATOR_ORDERS_PER_SIDE",
                defaults.orders_per_side,
            )?,
            password: lookup("INTERPOLATOR_PASSWORD").unwrap_or(defaults.password),
            order_asset: lookup("INTERPOLATOR_ORDER_ASSET").unwrap_or(defaults.order_asset),
            order_price: parse_or(&lookup, "INTERPOLATOR_ORDER_PRICE", defaults.order_price)?,
            order_quantity: parse_or(
                &lookup,
                "INTERPOLATOR_ORDER_QUANTITY",
                defaults.order_quantity,
            )?,
        };

        Ok(Self {
            gateway_url,
            log_dir: lookup("INTERPOLATOR_LOG_DIR").map(PathBuf::from),
            driver,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_match_reference_fleet() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.gateway_url.as_str(), "http://localhost:9000/");
        assert!(s.log_dir.is_none());
        assert_eq!(s.driver.num_traders, 5);
        assert_eq!(s.driver.settle_per_trader, Duration::from_secs(3));
        assert_eq!(s.driver.orders_per_side, 10);
        assert_eq!(s.driver.password, "pass123");
        assert_eq!(s.driver.order_asset, "BTC");
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("INTERPOLATOR_GATEWAY_URL", "https://gateway.test:8443"),
            ("INTERPOLATOR_NUM_TRADERS", "12"),
            ("INTERPOLATOR_SETTLE_SECS_PER_TRADER", "0.25"),
            ("INTERPOLATOR_ORDERS_PER_SIDE", " 3 "),
            ("INTERPOLATOR_ORDER_PRICE", "99.5"),
            ("INTERPOLATOR_LOG_DIR", "/tmp/interpolator"),
        ])
        .unwrap();
        assert_eq!(s.gateway_url.port(), Some(8443));
        assert_eq!(s.driver.num_traders, 12);
        assert_eq!(s.driver.settle_per_trader, Duration::from_millis(250));
        assert_eq!(s.driver.orders_per_side, 3);
        assert!((s.driver.order_price - 99.5).abs() < 1e-9);
        assert_eq!(s.log_dir, Some(PathBuf::from("/tmp/interpolator")));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(settings(&[("INTERPOLATOR_NUM_TRADERS", "five")]).is_err());
        assert!(settings(&[("INTERPOLATOR_GATEWAY_URL", "not a url")]).is_err());
        assert!(settings(&[("INTERPOLATOR_SETTLE_SECS_PER_TRADER", "-1")]).is_err());
    }
}
