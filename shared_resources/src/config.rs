/// ----- CONFIG MODULE -----
/// Simulation settings read from an optional config.json, with command-line
/// overrides given as `--flag value` pairs.

use std::env;
use std::fs;
use std::time::Duration;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BuildingConfig {
    pub num_floors: u8,
    pub num_elevators: u8,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            num_floors: 10,
            num_elevators: 3,
        }
    }
}

/// Simulated durations and the passenger-exit probability. Tests construct
/// this directly with millisecond timings to drive units without wall-clock
/// delays.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub door_dwell_ms: u64,
    pub priority_dwell_ms: u64,
    pub evacuation_dwell_ms: u64,
    pub evacuation_step_ms: u64,
    pub exit_probability: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tick_ms: 500,
            door_dwell_ms: 2000,
            priority_dwell_ms: 1000,
            evacuation_dwell_ms: 5000,
            evacuation_step_ms: 1000,
            exit_probability: 0.3,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn door_dwell(&self) -> Duration {
        Duration::from_millis(self.door_dwell_ms)
    }

    pub fn priority_dwell(&self) -> Duration {
        Duration::from_millis(self.priority_dwell_ms)
    }

    pub fn evacuation_dwell(&self) -> Duration {
        Duration::from_millis(self.evacuation_dwell_ms)
    }

    pub fn evacuation_step(&self) -> Duration {
        Duration::from_millis(self.evacuation_step_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub strategy: String,
    pub duration_secs: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            strategy: String::from("COLLECTIVE"),
            duration_secs: 30,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub building: BuildingConfig,
    pub timing: TimingConfig,
    pub simulation: SimulationSettings,
}

fn read_config_file() -> ConfigFile {
    let file_path = "config.json";
    match fs::read_to_string(file_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                println!("{} is malformed ({}), using default settings...", file_path, err);
                ConfigFile::default()
            }
        },
        Err(_) => {
            println!("No configuration file provided, using default settings...");
            ConfigFile::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub building: BuildingConfig,
    pub timing: TimingConfig,
    pub strategy: String,
    pub duration_secs: u64,
}

impl SimulationConfig {
    pub fn get() -> Self {
        let config_file = read_config_file();
        let mut config = SimulationConfig {
            building: config_file.building,
            timing: config_file.timing,
            strategy: config_file.simulation.strategy,
            duration_secs: config_file.simulation.duration_secs,
        };
        parse_env_args(&mut config);
        config.building.num_floors = config.building.num_floors.max(2);
        config.building.num_elevators = config.building.num_elevators.max(1);
        config.duration_secs = config.duration_secs.max(5);
        config
    }
}

fn parse_env_args(config: &mut SimulationConfig) {
    let args: Vec<String> = env::args().collect();
    for arg_pair in args.rchunks_exact(2) {
        match arg_pair[0].as_str() {
            "--floors" => {
                config.building.num_floors = match arg_pair[1].parse::<u8>() {
                    Ok(num) => num,
                    Err(_) => {
                        println!("floors {} is not a number, skipping...", arg_pair[1]);
                        config.building.num_floors
                    }
                };
            }
            "--elevators" => {
                config.building.num_elevators = match arg_pair[1].parse::<u8>() {
                    Ok(num) => num,
                    Err(_) => {
                        println!("elevators {} is not a number, skipping...", arg_pair[1]);
                        config.building.num_elevators
                    }
                };
            }
            "--strategy" => {
                config.strategy = arg_pair[1].clone();
            }
            "--duration" => {
                config.duration_secs = match arg_pair[1].parse::<u64>() {
                    Ok(num) => num,
                    Err(_) => {
                        println!("duration {} is not a number, skipping...", arg_pair[1]);
                        config.duration_secs
                    }
                };
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_file_fills_defaults() {
        let parsed: ConfigFile =
            serde_json::from_str(r#"{"building": {"num_floors": 15}}"#).unwrap();
        assert_eq!(parsed.building.num_floors, 15);
        assert_eq!(parsed.building.num_elevators, 3);
        assert_eq!(parsed.timing.tick_ms, 500);
        assert_eq!(parsed.simulation.strategy, "COLLECTIVE");
    }

    #[test]
    fn timing_durations_match_millis() {
        let timing = TimingConfig::default();
        assert_eq!(timing.tick(), Duration::from_millis(timing.tick_ms));
        assert_eq!(timing.door_dwell(), Duration::from_millis(timing.door_dwell_ms));
    }
}
