//! TopoJSON decoding
//!
//! Turns a topology-encoded world map into `CountryFeature`s. Supports the
//! subset the world atlas uses: quantized (delta-encoded) arcs, reversed arc
//! references, `Polygon` / `MultiPolygon` / `GeometryCollection` objects and
//! null geometries.
//!
//! # Arc stitching
//!
//! ```text
//! ring [0, ~1]:  arc 0 = a → b → c      arc ~1 = reverse(arc 1) = c → d → a
//!                result  = a → b → c → d → a   (shared endpoint kept once)
//! ```

use super::error::{DatasetError, DatasetResult};
use super::types::CountryFeature;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Top-level TopoJSON document
#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: HashMap<String, GeometryObject>,
}

/// Quantization transform applied to delta-encoded arc positions
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// A geometry object; `kind` is `None` for null geometries
#[derive(Debug, Deserialize)]
pub struct GeometryObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub arcs: Option<Value>,
    #[serde(default)]
    pub geometries: Vec<GeometryObject>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl Topology {
    /// Read a topology from a file
    pub fn from_path(path: &Path) -> DatasetResult<Self> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a topology from any reader
    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let topology: Topology = serde_json::from_reader(reader)?;
        topology.validate()?;
        Ok(topology)
    }

    /// Parse a topology from a string
    pub fn from_json(json: &str) -> DatasetResult<Self> {
        let topology: Topology = serde_json::from_str(json)?;
        topology.validate()?;
        Ok(topology)
    }

    fn validate(&self) -> DatasetResult<()> {
        if self.kind != "Topology" {
            return Err(DatasetError::InvalidTopology(format!(
                "expected type \"Topology\", found \"{}\"",
                self.kind
            )));
        }
        Ok(())
    }

    /// Decode every arc into absolute lon/lat coordinates
    pub fn decode_arcs(&self) -> DatasetResult<Vec<Vec<Coord<f64>>>> {
        self.arcs
            .iter()
            .enumerate()
            .map(|(arc_idx, arc)| {
                let mut x = 0.0;
                let mut y = 0.0;
                arc.iter()
                    .map(|position| {
                        if position.len() < 2 {
                            return Err(DatasetError::InvalidTopology(format!(
                                "arc {} has a position with {} values",
                                arc_idx,
                                position.len()
                            )));
                        }
                        match self.transform {
                            Some(t) => {
                                x += position[0];
                                y += position[1];
                                Ok(Coord {
                                    x: x * t.scale[0] + t.translate[0],
                                    y: y * t.scale[1] + t.translate[1],
                                })
                            }
                            None => Ok(Coord {
                                x: position[0],
                                y: position[1],
                            }),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Flatten the named object into country features
    ///
    /// `name_property` is read from each geometry's properties and becomes the
    /// join key. Geometries without it get an empty name.
    pub fn features(&self, object: &str, name_property: &str) -> DatasetResult<Vec<CountryFeature>> {
        let root = self.objects.get(object).ok_or_else(|| {
            DatasetError::InvalidTopology(format!("object \"{}\" not found", object))
        })?;

        let arcs = self.decode_arcs()?;
        let mut features = Vec::new();
        collect_features(root, &arcs, name_property, &mut features)?;
        Ok(features)
    }
}

fn collect_features(
    object: &GeometryObject,
    arcs: &[Vec<Coord<f64>>],
    name_property: &str,
    out: &mut Vec<CountryFeature>,
) -> DatasetResult<()> {
    if object.kind.as_deref() == Some("GeometryCollection") {
        for child in &object.geometries {
            collect_features(child, arcs, name_property, out)?;
        }
        return Ok(());
    }

    let geometry = decode_geometry(object, arcs)?;
    let name = object
        .properties
        .as_ref()
        .and_then(|props| props.get(name_property))
        .and_then(value_to_string)
        .unwrap_or_default();

    let mut feature = CountryFeature::new(name, geometry);
    feature.id = object.id.as_ref().and_then(value_to_string);
    out.push(feature);
    Ok(())
}

fn decode_geometry(object: &GeometryObject, arcs: &[Vec<Coord<f64>>]) -> DatasetResult<MultiPolygon<f64>> {
    let refs = object.arcs.clone().unwrap_or(Value::Null);

    match object.kind.as_deref() {
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(refs)?;
            Ok(MultiPolygon::new(polygon(&rings, arcs)?.into_iter().collect()))
        }
        Some("MultiPolygon") => {
            let polygons: Vec<Vec<Vec<i64>>> = serde_json::from_value(refs)?;
            let mut out = Vec::with_capacity(polygons.len());
            for rings in &polygons {
                out.extend(polygon(rings, arcs)?);
            }
            Ok(MultiPolygon::new(out))
        }
        None => Ok(MultiPolygon::new(Vec::new())),
        Some(other) => {
            tracing::debug!(kind = other, "Ignoring non-areal topology geometry");
            Ok(MultiPolygon::new(Vec::new()))
        }
    }
}

/// Build one polygon; the first ring is the exterior, the rest are holes
fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> DatasetResult<Option<Polygon<f64>>> {
    let mut rings = rings.iter();
    let exterior = match rings.next() {
        Some(r) => ring(r, arcs)?,
        None => return Ok(None),
    };
    let interiors = rings.map(|r| ring(r, arcs)).collect::<DatasetResult<Vec<_>>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
}

/// Stitch arc references into a single closed ring
fn ring(indices: &[i64], arcs: &[Vec<Coord<f64>>]) -> DatasetResult<LineString<f64>> {
    let mut points: Vec<Coord<f64>> = Vec::new();

    for &index in indices {
        let (arc_idx, reversed) = if index >= 0 {
            (index as usize, false)
        } else {
            ((!index) as usize, true)
        };
        let arc = arcs.get(arc_idx).ok_or_else(|| {
            DatasetError::InvalidTopology(format!("arc index {} out of range", index))
        })?;

        // consecutive arcs share their joining point
        points.pop();
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }

    if !points.is_empty() && points.len() < 4 {
        points.push(points[0]);
    }

    Ok(LineString::new(points))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
