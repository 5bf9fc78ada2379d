// ==========================================
// Wellbeing Waitlist - Config Manager
// ==========================================
// Storage: config_kv table, scope_id = 'global'
// Missing or unparsable values fall back to built-in defaults
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::admission::{EscalationPolicy, MIN_BASE_STEP};
use crate::engine::dispatch::{DispatchSchedulerConfig, MAX_SCHEDULE_DURATION};
use crate::engine::scoring::DEFAULT_SIMILARITY_THRESHOLD;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// Typed configuration
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub phrase_table_path: Option<PathBuf>,
    pub fuzzy_similarity_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            phrase_table_path: None,
            fuzzy_similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaitlistConfig {
    pub dispatch: DispatchSchedulerConfig,
    pub scoring: ScoringConfig,
    pub escalation: EscalationPolicy,
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build from a shared connection. Re-applies the connection settings (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock failed: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// Upsert a global value.
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(key, value, "config value updated");
        Ok(())
    }

    /// All global values as a JSON object.
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Display + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "config value unparsable, using default"
                );
                Ok(default)
            }
        }
    }

    // ===== Dispatch =====

    pub fn get_dispatch_config(&self) -> Result<DispatchSchedulerConfig, Box<dyn Error>> {
        let defaults = DispatchSchedulerConfig::default();
        let mut interval = self.get_parsed_or_default(
            config_keys::DISPATCH_INTERVAL_SECS,
            defaults.interval.as_secs(),
        )?;
        if interval == 0 {
            tracing::warn!(
                config_key = config_keys::DISPATCH_INTERVAL_SECS,
                "dispatch interval must be positive, using default"
            );
            interval = defaults.interval.as_secs();
        }
        let max_secs = MAX_SCHEDULE_DURATION.as_secs();
        if interval > max_secs {
            tracing::warn!(
                config_key = config_keys::DISPATCH_INTERVAL_SECS,
                interval,
                max_secs,
                "dispatch interval too long, using default"
            );
            interval = defaults.interval.as_secs();
        }
        let mut initial_delay = self.get_parsed_or_default(
            config_keys::DISPATCH_INITIAL_DELAY_SECS,
            defaults.initial_delay.as_secs(),
        )?;
        if initial_delay > max_secs {
            tracing::warn!(
                config_key = config_keys::DISPATCH_INITIAL_DELAY_SECS,
                initial_delay,
                max_secs,
                "initial dispatch delay too long, using default"
            );
            initial_delay = defaults.initial_delay.as_secs();
        }

        Ok(DispatchSchedulerConfig {
            interval: Duration::from_secs(interval),
            initial_delay: Duration::from_secs(initial_delay),
        })
    }

    // ===== Scoring =====

    pub fn get_scoring_config(&self) -> Result<ScoringConfig, Box<dyn Error>> {
        let phrase_table_path = self
            .get_config_value(config_keys::PHRASE_TABLE_PATH)?
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut threshold = self.get_parsed_or_default(
            config_keys::FUZZY_SIMILARITY_THRESHOLD,
            DEFAULT_SIMILARITY_THRESHOLD,
        )?;
        if !(threshold > 0.0 && threshold <= 1.0) {
            tracing::warn!(threshold, "fuzzy threshold outside (0, 1], using default");
            threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }

        Ok(ScoringConfig {
            phrase_table_path,
            fuzzy_similarity_threshold: threshold,
        })
    }

    // ===== Escalation =====

    /// A base step below the minimum or a negative bonus falls back to its default.
    pub fn get_escalation_policy(&self) -> Result<EscalationPolicy, Box<dyn Error>> {
        let d = EscalationPolicy::default();
        let at_least = |key: &str, value: i32, min: i32, default: i32| {
            if value < min {
                tracing::warn!(config_key = key, value, min, "escalation value out of range, using default");
                default
            } else {
                value
            }
        };

        let base_step =
            self.get_parsed_or_default(config_keys::ESCALATION_BASE_STEP, d.base_step)?;
        let high_score_bonus = self.get_parsed_or_default(
            config_keys::ESCALATION_HIGH_SCORE_BONUS,
            d.high_score_bonus,
        )?;
        let senior_bonus =
            self.get_parsed_or_default(config_keys::ESCALATION_SENIOR_BONUS, d.senior_bonus)?;

        Ok(EscalationPolicy {
            base_step: at_least(
                config_keys::ESCALATION_BASE_STEP,
                base_step,
                MIN_BASE_STEP,
                d.base_step,
            ),
            high_score_threshold: self.get_parsed_or_default(
                config_keys::ESCALATION_HIGH_SCORE_THRESHOLD,
                d.high_score_threshold,
            )?,
            high_score_bonus: at_least(
                config_keys::ESCALATION_HIGH_SCORE_BONUS,
                high_score_bonus,
                0,
                d.high_score_bonus,
            ),
            senior_age: self.get_parsed_or_default(config_keys::ESCALATION_SENIOR_AGE, d.senior_age)?,
            senior_bonus: at_least(
                config_keys::ESCALATION_SENIOR_BONUS,
                senior_bonus,
                0,
                d.senior_bonus,
            ),
        })
    }

    pub fn load_waitlist_config(&self) -> Result<WaitlistConfig, Box<dyn Error>> {
        Ok(WaitlistConfig {
            dispatch: self.get_dispatch_config()?,
            scoring: self.get_scoring_config()?,
            escalation: self.get_escalation_policy()?,
        })
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // dispatch scheduler
    pub const DISPATCH_INTERVAL_SECS: &str = "dispatch_interval_secs";
    pub const DISPATCH_INITIAL_DELAY_SECS: &str = "dispatch_initial_delay_secs";

    // scoring
    pub const PHRASE_TABLE_PATH: &str = "phrase_table_path";
    pub const FUZZY_SIMILARITY_THRESHOLD: &str = "fuzzy_similarity_threshold";

    // escalation
    pub const ESCALATION_BASE_STEP: &str = "escalation_base_step";
    pub const ESCALATION_HIGH_SCORE_THRESHOLD: &str = "escalation_high_score_threshold";
    pub const ESCALATION_HIGH_SCORE_BONUS: &str = "escalation_high_score_bonus";
    pub const ESCALATION_SENIOR_AGE: &str = "escalation_senior_age";
    pub const ESCALATION_SENIOR_BONUS: &str = "escalation_senior_bonus";
}
