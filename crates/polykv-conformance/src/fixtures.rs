//! Value shapes the suite stores and reads back.

use std::collections::BTreeMap;

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// The representative struct value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foo {
    pub bar: String,
}

impl Foo {
    pub fn new(bar: impl Into<String>) -> Self {
        Self { bar: bar.into() }
    }
}

/// Enum exercising every variant shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Off,
    Level(u8),
    Custom { name: String, weight: i32 },
}

/// Unit struct; a value, not nil.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker;

/// Nested composite: collections, options, boxes, and enums together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: u64,
    pub ratio: f64,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, i64>,
    pub mode: Mode,
    pub parent: Option<Box<Bundle>>,
}

impl Bundle {
    pub fn sample() -> Self {
        let parent = Bundle {
            id: 1,
            ratio: 0.5,
            tags: vec!["root".into()],
            mode: Mode::Level(3),
            ..Bundle::default()
        };
        Bundle {
            id: 2,
            ratio: -1.25,
            tags: vec!["child".into(), "leaf".into()],
            meta: BTreeMap::from([("depth".into(), 1), ("weight".into(), -7)]),
            mode: Mode::Custom {
                name: "tuned".into(),
                weight: 42,
            },
            parent: Some(Box::new(parent)),
        }
    }
}

/// Self-checking value written by concurrent callers.
///
/// A torn or mixed write shows up as a stamp whose payload disagrees with
/// its owner or length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub owner: u64,
    pub len: u32,
    pub payload: Vec<u8>,
}

impl Stamp {
    pub fn new(owner: u64, len: u32) -> Self {
        Self {
            owner,
            len,
            payload: vec![Self::fill(owner); len as usize],
        }
    }

    /// Payload length and contents agree with the header.
    pub fn is_consistent(&self) -> bool {
        self.payload.len() == self.len as usize
            && self.payload.iter().all(|&b| b == Self::fill(self.owner))
    }

    fn fill(owner: u64) -> u8 {
        (owner % 251) as u8
    }
}

/// Serializes as a sequence of unknown length, which bincode cannot encode.
#[derive(Clone, Debug, Default)]
pub struct LengthlessSeq(pub Vec<u32>);

impl Serialize for LengthlessSeq {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().filter(|_| true))
    }
}
