use lazy_static::lazy_static;
use log::debug;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::mask::Mask;
use crate::shape::ElementKind;
use crate::traits::LaneType;
use crate::vector::Vector;

// Canonical values every species hands out
#[derive(Debug, Clone, Copy)]
pub struct SpeciesConstants<E: LaneType, const N: usize> {
    pub zero: Vector<E, N>,
    pub iota: Vector<E, N>,
    pub all_true: Mask<E, N>,
    pub all_false: Mask<E, N>,
}

impl<E: LaneType, const N: usize> SpeciesConstants<E, N> {
    fn build() -> Self {
        SpeciesConstants {
            zero: Vector::from_array([E::ZERO; N]),
            iota: Vector::from_array(std::array::from_fn(E::from_index)),
            all_true: Mask::from_array([true; N]),
            all_false: Mask::from_array([false; N]),
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

lazy_static! {
    // (element kind, lane count) -> SpeciesConstants of that species
    static ref SPECIES_CONSTANTS: RwLock<HashMap<(ElementKind, usize), Entry>> =
        RwLock::new(HashMap::new());
}

/// Constants of species `(E, N)`, built on first use.
///
/// Concurrent first uses may each build a copy; the first one inserted is
/// kept and all copies are equal.
pub fn constants<E: LaneType, const N: usize>() -> Arc<SpeciesConstants<E, N>> {
    let key = (E::KIND, N);
    let cached = SPECIES_CONSTANTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();
    if let Some(constants) = cached.and_then(|entry| entry.downcast().ok()) {
        return constants;
    }

    debug!("Building constants for {} x {} lanes", E::KIND, N);
    let built: Entry = Arc::new(SpeciesConstants::<E, N>::build());
    let entry = SPECIES_CONSTANTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert(built)
        .clone();
    entry
        .downcast()
        .unwrap_or_else(|_| Arc::new(SpeciesConstants::build()))
}
