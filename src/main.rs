// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;
mod segment_thread;

use args::Args;
use clap::Parser as _;
use edgefirst_obstaclepub::SegmentationConfig;
use segment_thread::{Outputs, segment_thread, send_latest, stop_requested};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info};
use tracing_subscriber::{Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use zenoh::qos::{CongestionControl, Priority};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let stdout_log = tracing_subscriber::fmt::layer().with_filter(args.rust_log);
    let tracy = args
        .tracy
        .then(|| tracing_tracy::TracyLayer::default().with_filter(args.rust_log));
    tracing_subscriber::registry()
        .with(stdout_log)
        .with(tracy)
        .init();

    let config = SegmentationConfig::from(&args);
    config.validate()?;
    info!(?config, "segmentation config");

    let session = zenoh::open(zenoh::config::Config::try_from(args.clone())?).await?;
    debug!("opened zenoh session");

    let obstacles = session
        .declare_publisher(args.obstacles_topic.clone())
        .priority(Priority::DataHigh)
        .congestion_control(CongestionControl::Drop)
        .await?;
    let grid = session
        .declare_publisher(args.grid_topic.clone())
        .priority(Priority::DataHigh)
        .congestion_control(CongestionControl::Drop)
        .await?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let stop = session.declare_subscriber(args.stop_topic.clone()).await?;
    let stop_flag = shutdown.clone();
    tokio::spawn(async move {
        while let Ok(sample) = stop.recv_async().await {
            if stop_requested(&sample.payload().to_bytes()) {
                info!("stop requested");
                stop_flag.store(true, Ordering::Relaxed);
                break;
            }
        }
    });

    let (tx, rx) = kanal::bounded(1);
    let stale = rx.clone();
    let worker_shutdown = shutdown.clone();
    let worker = std::thread::Builder::new()
        .name("segment".to_string())
        .spawn(move || -> Result<(), std::io::Error> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(segment_thread(
                rx,
                Outputs { obstacles, grid },
                config,
                worker_shutdown,
            ));
            Ok(())
        })?;

    let subscriber = session.declare_subscriber(args.input_topic.clone()).await?;
    info!(topic = %args.input_topic, "waiting for point clouds");

    let poll = std::time::Duration::from_millis(100);
    while !shutdown.load(Ordering::Relaxed) {
        let sample = match tokio::time::timeout(poll, subscriber.recv_async()).await {
            Ok(Ok(sample)) => sample,
            Ok(Err(e)) => {
                error!("input subscriber closed: {}", e);
                break;
            }
            Err(_) => continue,
        };

        let payload = sample.payload().to_bytes().into_owned();
        match send_latest(&tx, &stale, payload) {
            Ok(0) => {}
            Ok(dropped) => debug!(dropped, "segmentation busy, replaced queued frame"),
            Err(e) => {
                error!("segmentation thread gone: {}", e);
                break;
            }
        }
    }

    // Closing the channel wakes the worker if it is waiting for a frame.
    drop(tx);
    drop(stale);
    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("segmentation runtime error: {}", e),
        Err(_) => error!("segmentation thread panicked"),
    }

    session.close().await?;
    info!("shutdown complete");
    Ok(())
}
