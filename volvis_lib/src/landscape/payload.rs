//! Landscape payload
//!
//! JSON document with the graph nodes, their links and the contour lines:
//! `{ nodes: [{position: [x, y], functionValue}], link: [...], contourValues: [..],
//! contourPath: { level: [[[x, y], ...], ...] } }`

use std::{collections::BTreeMap, path::Path};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::LandscapeError;

/// Graph node in data coordinates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Node {
    pub position: [f64; 2],
    #[serde(rename = "functionValue")]
    pub value: f64,
}

impl Node {
    pub fn new(position: [f64; 2], value: f64) -> Node {
        Node { position, value }
    }
}

/// Closed polylines of one contour level, in node coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLevel {
    pub value: f64,
    pub polylines: Vec<Vec<[f64; 2]>>,
}

/// Decoded landscape, links are node index pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandscapeData {
    pub nodes: Vec<Node>,
    pub links: Vec<(usize, usize)>,
    pub contours: Vec<ContourLevel>,
}

impl LandscapeData {
    pub fn new(nodes: Vec<Node>, links: Vec<(usize, usize)>) -> LandscapeData {
        LandscapeData {
            nodes,
            links,
            contours: Vec::new(),
        }
    }

    pub fn with_contours(mut self, contours: Vec<ContourLevel>) -> Self {
        self.contours = contours;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn from_json(text: &str) -> Result<LandscapeData, LandscapeError> {
        let payload: Payload = serde_json::from_str(text)?;
        Ok(payload.into_data())
    }

    pub fn from_file<P>(path: P) -> Result<LandscapeData, LandscapeError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LandscapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        LandscapeData::from_json(&text)
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    nodes: Vec<Node>,
    // entries are decoded one by one, a malformed link must not reject the payload
    #[serde(default)]
    link: Vec<Value>,
    #[serde(default, rename = "contourValues")]
    contour_values: Vec<f64>,
    #[serde(default, rename = "contourPath")]
    contour_path: BTreeMap<String, Vec<Vec<[f64; 2]>>>,
}

/// Node reference, numbers or numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeRef {
    Index(f64),
    Text(String),
}

impl NodeRef {
    fn index(&self) -> Option<usize> {
        let v = match self {
            NodeRef::Index(v) => *v,
            NodeRef::Text(s) => s.trim().parse().ok()?,
        };
        to_index(v)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    /// `"a-b"`
    Text(String),
    Record { source: NodeRef, target: NodeRef },
    Pair([NodeRef; 2]),
}

impl LinkEntry {
    fn resolve(&self) -> Option<(usize, usize)> {
        match self {
            LinkEntry::Text(s) => {
                let (a, b) = s.split_once('-')?;
                let a = to_index(a.trim().parse().ok()?)?;
                let b = to_index(b.trim().parse().ok()?)?;
                Some((a, b))
            }
            LinkEntry::Record { source, target } => Some((source.index()?, target.index()?)),
            LinkEntry::Pair([a, b]) => Some((a.index()?, b.index()?)),
        }
    }
}

fn to_index(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
        Some(v as usize)
    } else {
        None
    }
}

/// Decode one link entry, `None` when it has none of the accepted shapes
pub fn parse_link(entry: &Value) -> Option<(usize, usize)> {
    serde_json::from_value::<LinkEntry>(entry.clone())
        .ok()?
        .resolve()
}

impl Payload {
    fn into_data(self) -> LandscapeData {
        let mut links = Vec::with_capacity(self.link.len());
        for entry in &self.link {
            match parse_link(entry) {
                Some(link) => links.push(link),
                None => warn!("Skipping malformed link entry {entry}"),
            }
        }

        let mut contours = Vec::with_capacity(self.contour_path.len());
        for (key, polylines) in self.contour_path {
            match key.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => contours.push(ContourLevel { value, polylines }),
                _ => warn!("Skipping contour level with non-numeric key {key:?}"),
            }
        }
        contours.sort_by(|a, b| a.value.total_cmp(&b.value));

        let missing = self
            .contour_values
            .iter()
            .filter(|v| !contours.iter().any(|c| c.value == **v))
            .count();
        if missing > 0 {
            debug!("{missing} contour values have no polylines");
        }

        LandscapeData {
            nodes: self.nodes,
            links,
            contours,
        }
    }
}
