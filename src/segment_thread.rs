// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_obstaclepub::{
    Error, OccupancyGrid, Points, SegmentationConfig, Segmenter, cloud::timestamp,
    formats::{decode_points, points_message},
    schemas::{nav_msgs, std_msgs},
};
use edgefirst_schemas::{builtin_interfaces::Time, sensor_msgs::PointCloud2, serde_cdr};
use kanal::{Receiver, SendError, Sender};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info, info_span, instrument, warn};
use zenoh::{
    bytes::{Encoding, ZBytes},
    pubsub::Publisher,
};

/// Publishers for the two per-frame outputs.
pub struct Outputs<'a> {
    pub obstacles: Publisher<'a>,
    pub grid: Publisher<'a>,
}

// If the receiver is empty, waits for the next message, otherwise returns the
// most recent message on this receiver. If the receiver is closed, returns None
async fn drain_recv<T>(rx: &mut Receiver<T>) -> Option<T> {
    let mut msg = match rx.try_recv() {
        Err(_) => {
            return None;
        }
        Ok(Some(v)) => v,
        Ok(None) => return rx.recv().ok(),
    };
    let mut dropped = 0usize;
    while let Ok(Some(v)) = rx.try_recv() {
        msg = v;
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "skipped stale frames");
    }
    Some(msg)
}

/// Queue `msg` for the worker, first discarding any frame it has not picked
/// up yet so the newest frame always wins. `stale` must be a receiver of the
/// same channel as `tx`. Returns the number of frames discarded.
pub fn send_latest<T>(tx: &Sender<T>, stale: &Receiver<T>, msg: T) -> Result<usize, SendError> {
    let mut dropped = 0;
    while let Ok(Some(_)) = stale.try_recv() {
        dropped += 1;
    }
    if !tx.try_send(msg)? {
        // Only the input loop sends, so the slot emptied above stays empty.
        error!("frame queue still full after draining");
    }
    Ok(dropped)
}

// Returns the next frame to process, or None once shutdown was requested or
// the channel is closed.
async fn next_frame<T>(rx: &mut Receiver<T>, shutdown: &AtomicBool) -> Option<T> {
    if shutdown.load(Ordering::Relaxed) {
        return None;
    }
    let msg = drain_recv(rx).await?;
    if shutdown.load(Ordering::Relaxed) {
        return None;
    }
    Some(msg)
}

/// Decode a `std_msgs/Bool` stop request. Malformed payloads are logged and
/// ignored.
pub fn stop_requested(payload: &[u8]) -> bool {
    match serde_cdr::deserialize::<std_msgs::Bool>(payload) {
        Ok(msg) => msg.data,
        Err(e) => {
            warn!("invalid stop message: {}", e);
            false
        }
    }
}

fn time_from_nanos(nanos: u64) -> Time {
    Time {
        sec: (nanos / 1_000_000_000) as i32,
        nanosec: (nanos % 1_000_000_000) as u32,
    }
}

pub async fn segment_thread(
    mut rx: Receiver<Vec<u8>>,
    outputs: Outputs<'_>,
    config: SegmentationConfig,
    shutdown: Arc<AtomicBool>,
) {
    let mut segmenter = Segmenter::new(config);

    while let Some(payload) = next_frame(&mut rx, &shutdown).await {

        let (points, frame_id) = match decode_frame(&payload) {
            Ok(v) => v,
            Err(e) => {
                warn!("dropping undecodable point cloud: {}", e);
                continue;
            }
        };

        let result = info_span!("segment", n_points = points.len())
            .in_scope(|| segmenter.process(&points));

        let stamp = match timestamp() {
            Ok(t) => time_from_nanos(t),
            Err(e) => {
                error!("failed to read clock: {}", e);
                continue;
            }
        };

        match format_obstacles(&result.obstacles, stamp.clone(), frame_id.clone()) {
            Ok((msg, enc)) => {
                if let Err(e) = outputs.obstacles.put(msg).encoding(enc).await {
                    error!("obstacles publish error: {:?}", e);
                }
            }
            Err(e) => error!("Could not encode obstacle PCD: {}", e),
        }

        match format_grid(result.grid, stamp, frame_id) {
            Ok((msg, enc)) => {
                if let Err(e) = outputs.grid.put(msg).encoding(enc).await {
                    error!("grid publish error: {:?}", e);
                }
            }
            Err(e) => error!("Could not encode occupancy grid: {}", e),
        }
    }

    info!("segmentation thread stopped");
}

#[instrument(skip_all)]
fn decode_frame(payload: &[u8]) -> Result<(Points, String), Error> {
    let msg: PointCloud2 = serde_cdr::deserialize(payload)?;
    let points = decode_points(&msg)?;
    Ok((points, msg.header.frame_id))
}

/// Serialize the obstacle cloud as a packed xyz PointCloud2.
#[instrument(skip_all)]
fn format_obstacles(
    points: &Points,
    timestamp: Time,
    frame_id: String,
) -> Result<(ZBytes, Encoding), Error> {
    let msg = points_message(points, timestamp, frame_id);
    let msg = ZBytes::from(serde_cdr::serialize(&msg)?);
    let enc = Encoding::APPLICATION_CDR.with_schema("sensor_msgs/msg/PointCloud2");
    Ok((msg, enc))
}

#[instrument(skip_all)]
fn format_grid(
    grid: OccupancyGrid,
    timestamp: Time,
    frame_id: String,
) -> Result<(ZBytes, Encoding), Error> {
    let msg = nav_msgs::OccupancyGrid::from_grid(grid, timestamp, frame_id);
    let msg = ZBytes::from(serde_cdr::serialize(&msg)?);
    let enc = Encoding::APPLICATION_CDR.with_schema("nav_msgs/msg/OccupancyGrid");
    Ok((msg, enc))
}
