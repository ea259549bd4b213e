//! Element kinds, register shapes and the species descriptor table.
//!
//! The table is plain data built at compile time. Generic code reaches its
//! entry through the associated constant [`Species::DESCRIPTOR`](crate::Species::DESCRIPTOR);
//! runtime callers that only know a `(kind, shape)` pair go through
//! [`SpeciesDescriptor::lookup`].

use std::fmt;

use crate::error::{Result, VectorError};

/// Runtime name of a lane type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::I8,
        ElementKind::I16,
        ElementKind::I32,
        ElementKind::I64,
        ElementKind::F16,
        ElementKind::F32,
        ElementKind::F64,
    ];

    pub const fn bits(self) -> usize {
        match self {
            ElementKind::I8 => 8,
            ElementKind::I16 | ElementKind::F16 => 16,
            ElementKind::I32 | ElementKind::F32 => 32,
            ElementKind::I64 | ElementKind::F64 => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() / 8
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, ElementKind::F16 | ElementKind::F32 | ElementKind::F64)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::F16 => "f16",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Register bit size of a vector.
///
/// `S1024` and `S2048` stand in for the largest scalable register sizes; they
/// are never the preferred shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    S64,
    S128,
    S256,
    S512,
    S1024,
    S2048,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::S64,
        Shape::S128,
        Shape::S256,
        Shape::S512,
        Shape::S1024,
        Shape::S2048,
    ];

    pub const fn bit_size(self) -> usize {
        match self {
            Shape::S64 => 64,
            Shape::S128 => 128,
            Shape::S256 => 256,
            Shape::S512 => 512,
            Shape::S1024 => 1024,
            Shape::S2048 => 2048,
        }
    }

    pub const fn for_bit_size(bits: usize) -> Option<Shape> {
        match bits {
            64 => Some(Shape::S64),
            128 => Some(Shape::S128),
            256 => Some(Shape::S256),
            512 => Some(Shape::S512),
            1024 => Some(Shape::S1024),
            2048 => Some(Shape::S2048),
            _ => None,
        }
    }

    /// Widest shape the compile target has native registers for.
    pub const fn preferred() -> Shape {
        if cfg!(all(target_arch = "x86_64", target_feature = "avx512f")) {
            Shape::S512
        } else if cfg!(all(target_arch = "x86_64", target_feature = "avx2")) {
            Shape::S256
        } else {
            Shape::S128
        }
    }

    pub const fn lane_count(self, kind: ElementKind) -> usize {
        self.bit_size() / kind.bits()
    }
}

/// One supported (element kind, shape) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeciesDescriptor {
    pub kind: ElementKind,
    pub shape: Shape,
    pub lane_count: usize,
}

const TABLE_LEN: usize = ElementKind::ALL.len() * Shape::ALL.len();

const fn build_table() -> [SpeciesDescriptor; TABLE_LEN] {
    let mut table = [SpeciesDescriptor::new(ElementKind::I8, Shape::S64); TABLE_LEN];
    let mut k = 0;
    while k < ElementKind::ALL.len() {
        let mut s = 0;
        while s < Shape::ALL.len() {
            table[k * Shape::ALL.len() + s] =
                SpeciesDescriptor::new(ElementKind::ALL[k], Shape::ALL[s]);
            s += 1;
        }
        k += 1;
    }
    table
}

/// Every supported species, grouped by element kind then ordered by shape.
pub static SPECIES_TABLE: [SpeciesDescriptor; TABLE_LEN] = build_table();

impl SpeciesDescriptor {
    pub const fn new(kind: ElementKind, shape: Shape) -> Self {
        SpeciesDescriptor {
            kind,
            shape,
            lane_count: shape.lane_count(kind),
        }
    }

    pub fn lookup(kind: ElementKind, shape: Shape) -> &'static SpeciesDescriptor {
        let k = kind as usize;
        let s = shape as usize;
        &SPECIES_TABLE[k * Shape::ALL.len() + s]
    }

    /// Finds the species of `kind` with exactly `lane_count` lanes.
    pub fn for_lane_count(kind: ElementKind, lane_count: usize) -> Result<&'static SpeciesDescriptor> {
        SPECIES_TABLE
            .iter()
            .find(|d| d.kind == kind && d.lane_count == lane_count)
            .ok_or_else(|| {
                VectorError::ShapeMismatch(format!(
                    "no {} species with {} lanes",
                    kind, lane_count
                ))
            })
    }

    /// Species of `kind` at the preferred shape.
    pub fn preferred(kind: ElementKind) -> &'static SpeciesDescriptor {
        Self::lookup(kind, Shape::preferred())
    }

    pub const fn vector_bit_size(&self) -> usize {
        self.shape.bit_size()
    }

    pub const fn vector_byte_size(&self) -> usize {
        self.shape.bit_size() / 8
    }
}

impl fmt::Display for SpeciesDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Species[{}, {}, S_{}_BIT]", self.kind, self.lane_count, self.shape.bit_size())
    }
}
