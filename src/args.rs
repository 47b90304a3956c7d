// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgefirst_obstaclepub::{
    Error, GridConfig, SegmentationConfig,
    config::{DEFAULT_TOLERANCE_FACTOR, DEFAULT_TOLERANCE_M, DEFAULT_Y_LIMIT_M},
};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, WhatAmI};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input point cloud topic
    #[arg(long, env, default_value = "rt/lidar/points")]
    pub input_topic: String,

    /// Obstacle point cloud topic
    #[arg(long, env, default_value = "rt/lidar/obstacles")]
    pub obstacles_topic: String,

    /// Occupancy grid topic
    #[arg(long, env, default_value = "rt/lidar/gridmap")]
    pub grid_topic: String,

    /// Shutdown request topic, a std_msgs/Bool where true stops the service
    #[arg(long, env, default_value = "rt/state/stop")]
    pub stop_topic: String,

    /// Half width in meters of the corridor used to learn the background
    #[arg(long, env, default_value_t = DEFAULT_Y_LIMIT_M)]
    pub y_limit: f64,

    /// Base range tolerance in meters for the innermost ring
    #[arg(long, env, default_value_t = DEFAULT_TOLERANCE_M)]
    pub tolerance: f64,

    /// Relative tolerance growth per ring
    #[arg(long, env, default_value_t = DEFAULT_TOLERANCE_FACTOR)]
    pub tolerance_factor: f64,

    /// Occupancy grid columns (lateral)
    #[arg(long, env, default_value = "120")]
    pub grid_width: u32,

    /// Occupancy grid rows (longitudinal)
    #[arg(long, env, default_value = "400")]
    pub grid_height: u32,

    /// Occupancy grid cell size in meters
    #[arg(long, env, default_value = "0.10")]
    pub grid_resolution: f64,

    /// Grid extent ahead of and behind the sensor in meters
    #[arg(long, env, default_value = "20")]
    pub grid_longitudinal: f64,

    /// Grid extent to either side of the sensor in meters
    #[arg(long, env, default_value = "6")]
    pub grid_lateral: f64,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// Enable Tracy profiler broadcast
    #[arg(long, env)]
    pub tracy: bool,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl From<&Args> for SegmentationConfig {
    fn from(args: &Args) -> Self {
        SegmentationConfig {
            y_limit_m: args.y_limit,
            tolerance_m: args.tolerance,
            tolerance_factor: args.tolerance_factor,
            grid: GridConfig::symmetric(
                args.grid_width,
                args.grid_height,
                args.grid_resolution,
                args.grid_longitudinal,
                args.grid_lateral,
            ),
        }
    }
}

fn insert(config: &mut Config, key: &str, value: serde_json::Value) -> Result<(), Error> {
    config
        .insert_json5(key, &value.to_string())
        .map_err(|e| Error::Config(format!("zenoh {}: {}", key, e)))
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mut config = Config::default();

        insert(&mut config, "mode", json!(args.mode))?;

        if !args.connect.is_empty() {
            insert(&mut config, "connect/endpoints", json!(args.connect))?;
        }

        if !args.listen.is_empty() {
            insert(&mut config, "listen/endpoints", json!(args.listen))?;
        }

        if args.no_multicast_scouting {
            insert(&mut config, "scouting/multicast/enabled", json!(false))?;
        }

        insert(&mut config, "scouting/multicast/interface", json!("lo"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["obstaclepub"]);
        assert_eq!(args.input_topic, "rt/lidar/points");
        assert_eq!(args.obstacles_topic, "rt/lidar/obstacles");
        assert_eq!(args.grid_topic, "rt/lidar/gridmap");
        assert_eq!(args.stop_topic, "rt/state/stop");

        let config = SegmentationConfig::from(&args);
        assert_eq!(config, SegmentationConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "obstaclepub",
            "--y-limit",
            "2.5",
            "--tolerance",
            "0.5",
            "--grid-width",
            "60",
            "--grid-resolution",
            "0.2",
        ]);
        let config = SegmentationConfig::from(&args);
        assert_eq!(config.y_limit_m, 2.5);
        assert_eq!(config.tolerance_m, 0.5);
        assert_eq!(config.grid.width, 60);
        assert_eq!(config.grid.resolution, 0.2);
        assert_eq!(config.grid.left_m, 6.0);
        assert_eq!(config.grid.right_m, -6.0);
    }

    #[test]
    fn test_zenoh_config() {
        let args = Args::parse_from([
            "obstaclepub",
            "--mode",
            "client",
            "--connect",
            "tcp/127.0.0.1:7447",
            "--no-multicast-scouting",
        ]);
        assert!(Config::try_from(args).is_ok());
    }
}
