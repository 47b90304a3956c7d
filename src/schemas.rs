// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! ROS message definitions used by the publisher that are not provided by
//! `edgefirst_schemas`. Field order matches the ROS 2 IDL so the CDR encoding
//! is wire compatible.

pub mod geometry_msgs {
    use edgefirst_schemas::geometry_msgs::Quaternion;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Point {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Pose {
        pub position: Point,
        pub orientation: Quaternion,
    }

    impl Pose {
        /// Zero translation with identity rotation.
        pub fn identity() -> Self {
            Self {
                position: Point {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
                orientation: Quaternion {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0,
                },
            }
        }
    }
}

pub mod nav_msgs {
    use super::geometry_msgs::Pose;
    use crate::grid;
    use edgefirst_schemas::{builtin_interfaces::Time, std_msgs::Header};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct MapMetaData {
        pub map_load_time: Time,
        pub resolution: f32,
        pub width: u32,
        pub height: u32,
        pub origin: Pose,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OccupancyGrid {
        pub header: Header,
        pub info: MapMetaData,
        pub data: Vec<i8>,
    }

    impl OccupancyGrid {
        /// Wrap `grid` in a message anchored at the sensor with identity
        /// orientation.
        pub fn from_grid(grid: grid::OccupancyGrid, stamp: Time, frame_id: String) -> Self {
            let info = MapMetaData {
                map_load_time: Time {
                    sec: stamp.sec,
                    nanosec: stamp.nanosec,
                },
                resolution: grid.resolution() as f32,
                width: grid.width(),
                height: grid.height(),
                origin: Pose::identity(),
            };
            Self {
                header: Header { stamp, frame_id },
                info,
                data: grid.into_data(),
            }
        }
    }
}

pub mod std_msgs {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Bool {
        pub data: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cloud::{Point, Points},
        config::GridConfig,
        grid::{self, OCCUPIED},
    };
    use edgefirst_schemas::{builtin_interfaces::Time, serde_cdr};

    #[test]
    fn test_grid_message() {
        let config = GridConfig::default();
        let cloud: Points = [Point::new(0.0, 0.0, 0.0)].into_iter().collect();
        let raster = grid::rasterize(&cloud, &config);

        let stamp = Time {
            sec: 12,
            nanosec: 34,
        };
        let msg = nav_msgs::OccupancyGrid::from_grid(raster, stamp, "lidar".to_string());
        assert_eq!(msg.info.width, 120);
        assert_eq!(msg.info.height, 400);
        assert!((msg.info.resolution - 0.1).abs() < 1e-6);
        assert_eq!(msg.info.origin, geometry_msgs::Pose::identity());
        assert_eq!(msg.info.map_load_time.sec, 12);
        assert_eq!(msg.header.frame_id, "lidar");
        assert_eq!(msg.data.len(), 48_000);
        assert_eq!(msg.data[24_060], OCCUPIED);
    }

    #[test]
    fn test_cdr_roundtrip() {
        let config = GridConfig::symmetric(4, 4, 0.5, 1.0, 1.0);
        let raster = grid::rasterize(&Points::new(), &config);
        let msg = nav_msgs::OccupancyGrid::from_grid(
            raster,
            Time { sec: 1, nanosec: 2 },
            "base".to_string(),
        );
        let bytes = serde_cdr::serialize(&msg).unwrap();
        let decoded: nav_msgs::OccupancyGrid = serde_cdr::deserialize(&bytes).unwrap();
        assert_eq!(decoded, msg);

        let stop = std_msgs::Bool { data: true };
        let bytes = serde_cdr::serialize(&stop).unwrap();
        let decoded: std_msgs::Bool = serde_cdr::deserialize(&bytes).unwrap();
        assert!(decoded.data);
    }
}
