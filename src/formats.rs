// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! PointCloud2 decoding and encoding.
//!
//! Incoming clouds may use any point layout as long as they carry `x`, `y`
//! and `z` fields of type FLOAT32 or FLOAT64. Outgoing clouds always use the
//! packed 12-byte little-endian layout below.
//!
//! ```text
//! ┌───────┬───────┬───────┐
//! │ x:f32 │ y:f32 │ z:f32 │
//! │ 4B    │ 4B    │ 4B    │
//! └───────┴───────┴───────┘
//! ```

use crate::cloud::{Error, Point, Points};
use edgefirst_schemas::{
    builtin_interfaces::Time,
    sensor_msgs::{PointCloud2, PointField},
    std_msgs::Header,
};

/// Bytes per point in the packed xyz output layout.
pub const XYZ_POINT_STEP: usize = 12;

/// Point field data types for PointCloud2 messages.
///
/// These values correspond to the ROS sensor_msgs/PointField datatype field.
/// All variants are defined for completeness, even if not all are currently
/// used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(dead_code)]
pub enum PointFieldType {
    INT8 = 1,
    UINT8 = 2,
    INT16 = 3,
    UINT16 = 4,
    INT32 = 5,
    UINT32 = 6,
    FLOAT32 = 7,
    FLOAT64 = 8,
}

/// Build the packed XYZ point fields (12-byte stride).
///
/// Returns a vector of PointField definitions for:
/// - x: FLOAT32 at offset 0
/// - y: FLOAT32 at offset 4
/// - z: FLOAT32 at offset 8
pub fn xyz_fields() -> Vec<PointField> {
    ["x", "y", "z"]
        .iter()
        .enumerate()
        .map(|(i, name)| PointField {
            name: String::from(*name),
            offset: (i * 4) as u32,
            datatype: PointFieldType::FLOAT32 as u8,
            count: 1,
        })
        .collect()
}

/// Location and type of one scalar coordinate within a point record.
#[derive(Debug, Clone, Copy)]
struct FieldReader {
    offset: usize,
    datatype: PointFieldType,
    big_endian: bool,
}

impl FieldReader {
    fn find(fields: &[PointField], name: &str, big_endian: bool) -> Result<Self, Error> {
        let field = fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::MissingField(name.to_string()))?;
        if field.count < 1 {
            return Err(Error::UnsupportedFormat(format!(
                "field {} has count {}",
                name, field.count
            )));
        }
        let datatype = match field.datatype {
            x if x == PointFieldType::FLOAT32 as u8 => PointFieldType::FLOAT32,
            x if x == PointFieldType::FLOAT64 as u8 => PointFieldType::FLOAT64,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "field {} has datatype {}",
                    name, other
                )));
            }
        };
        Ok(Self {
            offset: field.offset as usize,
            datatype,
            big_endian,
        })
    }

    fn width(&self) -> usize {
        match self.datatype {
            PointFieldType::FLOAT64 => 8,
            _ => 4,
        }
    }

    #[inline]
    fn read(&self, record: &[u8]) -> f64 {
        let at = self.offset;
        match (self.datatype, self.big_endian) {
            (PointFieldType::FLOAT64, false) => f64::from_le_bytes(bytes(record, at)),
            (PointFieldType::FLOAT64, true) => f64::from_be_bytes(bytes(record, at)),
            (_, false) => f32::from_le_bytes(bytes(record, at)) as f64,
            (_, true) => f32::from_be_bytes(bytes(record, at)) as f64,
        }
    }
}

#[inline]
fn bytes<const N: usize>(record: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&record[at..at + N]);
    out
}

/// Decode the x/y/z coordinates of every point in `msg`.
///
/// # Errors
///
/// - [`Error::MissingField`] when `x`, `y` or `z` is absent
/// - [`Error::UnsupportedFormat`] for non-float coordinates or a point step
///   too small for the declared fields
/// - [`Error::UnexpectedEnd`] when the data buffer is shorter than
///   `width * height * point_step`
pub fn decode_points(msg: &PointCloud2) -> Result<Points, Error> {
    let readers = [
        FieldReader::find(&msg.fields, "x", msg.is_bigendian)?,
        FieldReader::find(&msg.fields, "y", msg.is_bigendian)?,
        FieldReader::find(&msg.fields, "z", msg.is_bigendian)?,
    ];

    let step = msg.point_step as usize;
    for r in &readers {
        if r.offset + r.width() > step {
            return Err(Error::UnsupportedFormat(format!(
                "field at offset {} overruns point step {}",
                r.offset, step
            )));
        }
    }

    let n_points = msg.width as usize * msg.height as usize;
    if n_points == 0 {
        return Ok(Points::new());
    }

    let row_len = msg.width as usize * step;
    let row_step = (msg.row_step as usize).max(row_len);
    let needed = (msg.height as usize - 1) * row_step + row_len;
    if msg.data.len() < needed {
        return Err(Error::UnexpectedEnd(msg.data.len()));
    }

    let mut points = Points::with_capacity(n_points);
    for row in 0..msg.height as usize {
        let row_data = &msg.data[row * row_step..row * row_step + row_len];
        for record in row_data.chunks_exact(step) {
            points.push(Point::new(
                readers[0].read(record),
                readers[1].read(record),
                readers[2].read(record),
            ));
        }
    }
    Ok(points)
}

/// Format `points` into the packed 12-byte xyz layout.
pub fn format_points_xyz(points: &Points) -> Vec<u8> {
    let mut data = Vec::with_capacity(XYZ_POINT_STEP * points.len());
    for p in points.iter() {
        data.extend_from_slice(&(p.x as f32).to_le_bytes());
        data.extend_from_slice(&(p.y as f32).to_le_bytes());
        data.extend_from_slice(&(p.z as f32).to_le_bytes());
    }
    data
}

/// Build an unorganized PointCloud2 message for `points`.
pub fn points_message(points: &Points, stamp: Time, frame_id: String) -> PointCloud2 {
    let n_points = points.len();
    PointCloud2 {
        header: Header { stamp, frame_id },
        height: 1,
        width: n_points as u32,
        fields: xyz_fields(),
        is_bigendian: false,
        point_step: XYZ_POINT_STEP as u32,
        row_step: (XYZ_POINT_STEP * n_points) as u32,
        data: format_points_xyz(points),
        is_dense: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> Time {
        Time { sec: 0, nanosec: 0 }
    }

    fn field(name: &str, offset: u32, datatype: PointFieldType) -> PointField {
        PointField {
            name: name.to_string(),
            offset,
            datatype: datatype as u8,
            count: 1,
        }
    }

    fn cloud_message(
        fields: Vec<PointField>,
        point_step: u32,
        width: u32,
        data: Vec<u8>,
        is_bigendian: bool,
    ) -> PointCloud2 {
        PointCloud2 {
            header: Header {
                stamp: stamp(),
                frame_id: "lidar".to_string(),
            },
            height: 1,
            width,
            fields,
            is_bigendian,
            point_step,
            row_step: point_step * width,
            data,
            is_dense: true,
        }
    }

    #[test]
    fn test_format_points_xyz() {
        let points: Points = [Point::new(1.0, 10.0, 100.0), Point::new(-2.5, 0.25, 3.0)]
            .into_iter()
            .collect();
        let data = format_points_xyz(&points);
        assert_eq!(data.len(), 2 * XYZ_POINT_STEP);

        let x1 = f32::from_le_bytes([data[12], data[13], data[14], data[15]]);
        let y1 = f32::from_le_bytes([data[16], data[17], data[18], data[19]]);
        let z1 = f32::from_le_bytes([data[20], data[21], data[22], data[23]]);
        assert_eq!((x1, y1, z1), (-2.5, 0.25, 3.0));
    }

    #[test]
    fn test_points_message_decodes() {
        let points: Points = [Point::new(1.5, -2.0, 0.125), Point::new(0.0, 0.0, 0.0)]
            .into_iter()
            .collect();
        let msg = points_message(&points, stamp(), "lidar".to_string());
        assert_eq!(msg.width, 2);
        assert_eq!(msg.row_step, 24);
        assert_eq!(msg.header.frame_id, "lidar");
        assert_eq!(decode_points(&msg).unwrap(), points);
    }

    /// PCL-style 16-byte stride with padding and an extra intensity field.
    #[test]
    fn test_decode_padded_layout() {
        let fields = vec![
            field("x", 0, PointFieldType::FLOAT32),
            field("y", 4, PointFieldType::FLOAT32),
            field("z", 8, PointFieldType::FLOAT32),
            field("intensity", 12, PointFieldType::UINT8),
        ];
        let mut data = Vec::new();
        for (x, y, z) in [(1.0f32, 2.0f32, 3.0f32), (4.0, 5.0, 6.0)] {
            data.extend_from_slice(&x.to_le_bytes());
            data.extend_from_slice(&y.to_le_bytes());
            data.extend_from_slice(&z.to_le_bytes());
            data.extend_from_slice(&[200, 0, 0, 0]);
        }
        let msg = cloud_message(fields, 16, 2, data, false);
        let points = decode_points(&msg).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.get(1), Point::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_decode_float64_big_endian() {
        let fields = vec![
            field("z", 0, PointFieldType::FLOAT64),
            field("y", 8, PointFieldType::FLOAT64),
            field("x", 16, PointFieldType::FLOAT64),
        ];
        let mut data = Vec::new();
        for v in [3.25f64, -2.0, 1.0] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let msg = cloud_message(fields, 24, 1, data, true);
        let points = decode_points(&msg).unwrap();
        assert_eq!(points.get(0), Point::new(1.0, -2.0, 3.25));
    }

    #[test]
    fn test_decode_missing_field() {
        let fields = vec![
            field("x", 0, PointFieldType::FLOAT32),
            field("y", 4, PointFieldType::FLOAT32),
        ];
        let msg = cloud_message(fields, 8, 0, Vec::new(), false);
        assert!(matches!(decode_points(&msg), Err(Error::MissingField(f)) if f == "z"));
    }

    #[test]
    fn test_decode_integer_field_rejected() {
        let fields = vec![
            field("x", 0, PointFieldType::INT16),
            field("y", 2, PointFieldType::INT16),
            field("z", 4, PointFieldType::INT16),
        ];
        let msg = cloud_message(fields, 6, 1, vec![0; 6], false);
        assert!(matches!(
            decode_points(&msg),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decode_short_buffer() {
        let msg = cloud_message(xyz_fields(), 12, 3, vec![0; 30], false);
        assert!(matches!(decode_points(&msg), Err(Error::UnexpectedEnd(30))));
    }

    #[test]
    fn test_decode_empty_cloud() {
        let msg = cloud_message(xyz_fields(), 12, 0, Vec::new(), false);
        assert!(decode_points(&msg).unwrap().is_empty());
    }
}
