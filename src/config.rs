// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Shop configuration. A plain value handed to [`crate::store::Store`];
//! persisted as rows of the `settings` table.

use chrono::{FixedOffset, Offset, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const KEYS: [&str; 5] = [
    "utc_offset",
    "recent_limit",
    "history_days",
    "max_amount",
    "default_user",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Shop timezone; decides which calendar day a timestamp falls on.
    #[serde(serialize_with = "serialize_offset")]
    pub utc_offset: FixedOffset,
    /// Size of the dashboard's recent list.
    pub recent_limit: usize,
    /// Default window for the daily balance history.
    pub history_days: u32,
    /// Ceiling on a single amount, catches fat-finger entries.
    pub max_amount: Decimal,
    pub default_user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Asia/Karachi, no DST
            utc_offset: FixedOffset::east_opt(5 * 3600).unwrap_or_else(utc),
            recent_limit: 10,
            history_days: 30,
            max_amount: Decimal::new(10_000_000, 0),
            default_user: "admin".to_string(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn serialize_offset<S: serde::Serializer>(
    offset: &FixedOffset,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_offset(*offset))
}

impl Config {
    /// Load from the `settings` table, falling back to defaults for missing keys.
    pub fn load(conn: &Connection) -> Result<Config> {
        let mut cfg = Config::default();
        for key in KEYS {
            let v: Option<String> = conn
                .query_row(
                    "SELECT value FROM settings WHERE key=?1",
                    params![key],
                    |r| r.get(0),
                )
                .optional()?;
            if let Some(v) = v {
                cfg.apply(key, &v)
                    .map_err(|e| Error::Corrupt(format!("setting '{}': {}", key, e)))?;
            }
        }
        debug!(?cfg, "loaded configuration");
        Ok(cfg)
    }

    /// Validate and persist one key. The in-memory value changes only once
    /// the row is written.
    pub fn set(&mut self, conn: &Connection, key: &str, value: &str) -> Result<()> {
        let key = canonical_key(key)?;
        let mut next = self.clone();
        next.apply(key, value)?;
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, next.get(key)?],
        )?;
        *self = next;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match canonical_key(key)? {
            "utc_offset" => format_offset(self.utc_offset),
            "recent_limit" => self.recent_limit.to_string(),
            "history_days" => self.history_days.to_string(),
            "max_amount" => self.max_amount.to_string(),
            _ => self.default_user.clone(),
        })
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match canonical_key(key)? {
            "utc_offset" => self.utc_offset = parse_offset(value)?,
            "recent_limit" => {
                self.recent_limit = value
                    .parse()
                    .map_err(|_| Error::validation("recent_limit", "expected a count"))?
            }
            "history_days" => {
                let days: u32 = value
                    .parse()
                    .map_err(|_| Error::validation("history_days", "expected a number of days"))?;
                if days == 0 {
                    return Err(Error::validation("history_days", "must be at least 1"));
                }
                self.history_days = days;
            }
            "max_amount" => {
                let max: Decimal = value
                    .parse()
                    .map_err(|_| Error::validation("max_amount", "expected a decimal"))?;
                if max <= Decimal::ZERO {
                    return Err(Error::validation("max_amount", "must be positive"));
                }
                self.max_amount = max;
            }
            _ => {
                if value.is_empty() {
                    return Err(Error::validation("default_user", "cannot be blank"));
                }
                self.default_user = value.to_string();
            }
        }
        Ok(())
    }
}

fn canonical_key(key: &str) -> Result<&'static str> {
    let key = key.trim().replace('-', "_");
    KEYS.into_iter()
        .find(|k| *k == key)
        .ok_or_else(|| Error::validation("key", format!("unknown setting '{}'", key)))
}

/// Parse `+05:00`, `-03:30` or `Z`.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let bad = || Error::validation("utc_offset", format!("expected +HH:MM, got '{}'", s));
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }
    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(bad()),
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let h: i32 = h.parse().map_err(|_| bad())?;
    let m: i32 = m.parse().map_err(|_| bad())?;
    if h > 14 || m > 59 {
        return Err(bad());
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60)).ok_or_else(bad)
}

pub fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}
