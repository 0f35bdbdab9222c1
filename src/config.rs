use std::env;

use crate::strategy::StrategyKind;

/// Runtime configuration, merged in order of increasing precedence:
/// compiled-in defaults, an optional `ACTORCHECK_CONF` TOML file, then
/// explicit overrides passed to [`crate::runtime::Runtime::builder`].
///
/// Mirrors the teacher's layered `Config` (defaults -> `riker.toml` ->
/// `app.toml`), but merges a single optional file since there is no
/// separate "application" layer in a testing core.
#[derive(Clone, Debug)]
pub struct Config {
    pub testing_iterations: u64,
    pub testing_timeout_seconds: i64,
    pub random_seed: Option<u64>,
    pub strategy: StrategyKind,
    pub strategy_bound: u32,
    pub max_unfair_scheduling_steps: u64,
    pub max_fair_scheduling_steps: u64,
    pub consider_depth_bound_hit_as_bug: bool,
    pub liveness_temperature_threshold: u64,
    pub deadlock_timeout_ms: u64,
    pub report_potential_deadlocks_as_bugs: bool,
    pub is_shared_state_reduction_enabled: bool,
    pub max_fuzzing_delay_ms: u64,
    pub run_test_iterations_to_completion: bool,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub module_filter: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            module_filter: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            testing_iterations: 1,
            testing_timeout_seconds: 0,
            random_seed: None,
            strategy: StrategyKind::Random,
            strategy_bound: 0,
            max_unfair_scheduling_steps: 10_000,
            max_fair_scheduling_steps: 100_000,
            consider_depth_bound_hit_as_bug: false,
            liveness_temperature_threshold: 0,
            deadlock_timeout_ms: 5_000,
            report_potential_deadlocks_as_bugs: true,
            is_shared_state_reduction_enabled: false,
            max_fuzzing_delay_ms: 0,
            run_test_iterations_to_completion: true,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    fn merge(&mut self, v: &toml::Value) -> Option<()> {
        let t = v.as_table()?;

        if let Some(x) = t.get("testing_iterations").and_then(|v| v.as_integer()) {
            self.testing_iterations = x as u64;
        }
        if let Some(x) = t
            .get("testing_timeout_seconds")
            .and_then(|v| v.as_integer())
        {
            self.testing_timeout_seconds = x;
        }
        if let Some(x) = t.get("random_seed").and_then(|v| v.as_integer()) {
            self.random_seed = Some(x as u64);
        }
        if let Some(x) = t.get("strategy").and_then(|v| v.as_str()) {
            if let Some(kind) = StrategyKind::parse(x) {
                self.strategy = kind;
            }
        }
        if let Some(x) = t.get("strategy_bound").and_then(|v| v.as_integer()) {
            self.strategy_bound = x as u32;
        }
        if let Some(x) = t
            .get("max_unfair_scheduling_steps")
            .and_then(|v| v.as_integer())
        {
            self.max_unfair_scheduling_steps = x as u64;
        }
        if let Some(x) = t
            .get("max_fair_scheduling_steps")
            .and_then(|v| v.as_integer())
        {
            self.max_fair_scheduling_steps = x as u64;
        }
        if let Some(x) = t
            .get("consider_depth_bound_hit_as_bug")
            .and_then(|v| v.as_bool())
        {
            self.consider_depth_bound_hit_as_bug = x;
        }
        if let Some(x) = t
            .get("liveness_temperature_threshold")
            .and_then(|v| v.as_integer())
        {
            self.liveness_temperature_threshold = x as u64;
        }
        if let Some(x) = t.get("deadlock_timeout_ms").and_then(|v| v.as_integer()) {
            self.deadlock_timeout_ms = x as u64;
        }
        if let Some(x) = t
            .get("report_potential_deadlocks_as_bugs")
            .and_then(|v| v.as_bool())
        {
            self.report_potential_deadlocks_as_bugs = x;
        }
        if let Some(x) = t
            .get("is_shared_state_reduction_enabled")
            .and_then(|v| v.as_bool())
        {
            self.is_shared_state_reduction_enabled = x;
        }
        if let Some(x) = t.get("max_fuzzing_delay_ms").and_then(|v| v.as_integer()) {
            self.max_fuzzing_delay_ms = x as u64;
        }
        if let Some(x) = t
            .get("run_test_iterations_to_completion")
            .and_then(|v| v.as_bool())
        {
            self.run_test_iterations_to_completion = x;
        }
        if let Some(log) = t.get("log").and_then(|v| v.as_table()) {
            if let Some(x) = log.get("level").and_then(|v| v.as_str()) {
                self.log.level = x.to_string();
            }
            if let Some(x) = log.get("module_filter").and_then(|v| v.as_array()) {
                self.log.module_filter = x
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect();
            }
        }

        Some(())
    }
}

/// Loads the merged configuration the same way the teacher's `load_config`
/// merges `RIKER_CONF`/`APP_CONF`: defaults first, then an optional TOML
/// file named by `ACTORCHECK_CONF` (defaulting to `config/actorcheck.toml`,
/// silently skipped if absent or unparsable).
pub fn load_config() -> Config {
    use std::fs;

    let mut cfg = Config::default();

    let path = env::var("ACTORCHECK_CONF").unwrap_or_else(|_| "config/actorcheck.toml".into());
    if let Ok(contents) = fs::read_to_string(&path) {
        if let Ok(value) = toml::from_str::<toml::Value>(&contents) {
            cfg.merge(&value);
        }
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.testing_iterations, 1);
        assert!(matches!(cfg.strategy, StrategyKind::Random));
        assert_eq!(cfg.liveness_temperature_threshold, 0);
    }

    #[test]
    fn merge_overrides_only_present_keys() {
        let mut cfg = Config::default();
        let toml_str = r#"
            testing_iterations = 200
            strategy = "prioritization"
            strategy_bound = 10

            [log]
            level = "trace"
        "#;
        let value: toml::Value = toml::from_str(toml_str).unwrap();
        cfg.merge(&value);

        assert_eq!(cfg.testing_iterations, 200);
        assert!(matches!(cfg.strategy, StrategyKind::Prioritization));
        assert_eq!(cfg.strategy_bound, 10);
        assert_eq!(cfg.log.level, "trace");
        // untouched field keeps its default
        assert_eq!(cfg.deadlock_timeout_ms, 5_000);
    }
}
