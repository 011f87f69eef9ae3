//! Política de merge de hashtags.
//!
//! Invariantes de `AugmentedHashtags`:
//! - como máximo `HASHTAG_CAP` entradas;
//! - sin duplicados (coincidencia exacta, sensible a mayúsculas);
//! - gana la primera aparición y se preserva el orden de producción.
//!
//! La única forma de construirlo es `enforce`, de modo que cualquier valor de
//! este tipo ya cumple el tope aunque el motor lo haya ignorado.
use indexmap::IndexSet;
use serde::{Serialize, Serializer};

/// Tope duro de hashtags en la salida final.
pub const HASHTAG_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AugmentedHashtags(Vec<String>);

/// Qué tuvo que corregir la política sobre la salida cruda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MergeReport {
    pub received: usize,
    pub duplicates_dropped: usize,
    pub truncated: usize,
}

impl MergeReport {
    /// true si la salida cruda ya cumplía ambas restricciones.
    pub fn unchanged(&self) -> bool {
        self.duplicates_dropped == 0 && self.truncated == 0
    }
}

impl AugmentedHashtags {
    /// Aplica dedupe (primera aparición) y luego el tope.
    pub fn enforce<I, S>(raw: I) -> (Self, MergeReport)
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let mut received = 0;
        let mut seen: IndexSet<String> = IndexSet::new();
        for tag in raw {
            received += 1;
            seen.insert(tag.into());
        }
        let unique = seen.len();
        let kept: Vec<String> = seen.into_iter().take(HASHTAG_CAP).collect();
        let report = MergeReport { received,
                                   duplicates_dropped: received - unique,
                                   truncated: unique - kept.len() };
        (AugmentedHashtags(kept), report)
    }

    pub fn as_slice(&self) -> &[String] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn into_vec(self) -> Vec<String> { self.0 }
}

impl Serialize for AugmentedHashtags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
