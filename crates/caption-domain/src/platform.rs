use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Plataformas sociales soportadas. Conjunto cerrado: cualquier otro valor se
/// rechaza antes de invocar capacidades externas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    X,
    Facebook,
    LinkedIn,
}

impl Platform {
    /// Todas las plataformas, en el orden en que se muestran al usuario.
    pub const ALL: [Platform; 4] = [Platform::Instagram, Platform::X, Platform::Facebook, Platform::LinkedIn];

    /// Nombres aceptados (coincidencia exacta, sensible a mayúsculas).
    pub const NAMES: &'static [&'static str] = &["Instagram", "X", "Facebook", "LinkedIn"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::X => "X",
            Platform::Facebook => "Facebook",
            Platform::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL.iter()
                     .copied()
                     .find(|p| p.as_str() == s)
                     .ok_or_else(|| DomainError::ValidationError(format!("unsupported platform '{s}'")))
    }
}
