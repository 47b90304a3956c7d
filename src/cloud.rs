// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Point cloud container, crate error type, and timestamp helper.
//!
//! Clouds use a structure-of-arrays (SoA) layout so that every stage of the
//! segmentation pipeline walks contiguous coordinate slices.

use edgefirst_schemas::serde_cdr;
use std::fmt;

/// A single sensor-relative point: forward = +x, left = +y, up = +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance from the sensor origin.
    #[inline]
    pub fn range(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Elevation angle in degrees, or `None` when the range is zero and the
    /// elevation is undefined.
    #[inline]
    pub fn elevation_deg(&self, range: f64) -> Option<f64> {
        if range == 0.0 {
            return None;
        }
        Some((self.z / range).asin().to_degrees())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Ordered point cloud in structure-of-arrays layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Points {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Points {
    /// Create an empty cloud
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cloud with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, point: Point) {
        self.x.push(point.x);
        self.y.push(point.y);
        self.z.push(point.z);
    }

    /// Point at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn get(&self, i: usize) -> Point {
        Point::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| Point::new(x, y, z))
    }

    /// Clear all points while retaining capacity
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }

    /// Get the current number of points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// True when every coordinate of every point is finite.
    pub fn is_finite(&self) -> bool {
        self.iter().all(|p| p.is_finite())
    }
}

impl FromIterator<Point> for Points {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut points = Points::new();
        for p in iter {
            points.push(p);
        }
        points
    }
}

impl Extend<Point> for Points {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        for p in iter {
            self.push(p);
        }
    }
}

/// Common error type for decoding, encoding and configuration.
///
/// The segmentation stages themselves never fail: anomalies are isolated to
/// the offending point.
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),
    /// System time error
    SystemTime(std::time::SystemTimeError),
    /// CDR serialization error
    Cdr(serde_cdr::Error),
    /// Required point field is absent from the cloud
    MissingField(String),
    /// Unsupported point field layout
    UnsupportedFormat(String),
    /// Unexpected end of data at given byte position
    UnexpectedEnd(usize),
    /// Configuration error
    Config(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::SystemTime(err) => write!(f, "system time error: {}", err),
            Error::Cdr(err) => write!(f, "cdr error: {}", err),
            Error::MissingField(name) => write!(f, "missing point field: {}", name),
            Error::UnsupportedFormat(format) => write!(f, "unsupported format: {}", format),
            Error::UnexpectedEnd(len) => write!(f, "unexpected end of data at {} bytes", len),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<std::time::SystemTimeError> for Error {
    fn from(err: std::time::SystemTimeError) -> Self {
        Error::SystemTime(err)
    }
}

impl From<serde_cdr::Error> for Error {
    fn from(err: serde_cdr::Error) -> Self {
        Error::Cdr(err)
    }
}

/// Get current timestamp in nanoseconds.
///
/// On Linux, uses `CLOCK_MONOTONIC_RAW` for best accuracy.
/// On other platforms, falls back to `SystemTime`.
#[cfg(target_os = "linux")]
pub fn timestamp() -> Result<u64, Error> {
    let mut tp = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let err = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut tp) };
    if err != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    Ok(tp.tv_sec as u64 * 1_000_000_000 + tp.tv_nsec as u64)
}

#[cfg(not(target_os = "linux"))]
pub fn timestamp() -> Result<u64, Error> {
    let now = std::time::SystemTime::now();
    let duration = now.duration_since(std::time::UNIX_EPOCH)?;
    Ok(duration.as_nanos() as u64)
}
