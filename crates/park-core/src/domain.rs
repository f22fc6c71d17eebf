// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

use std::fmt;

/// Environment tag attached to a zone or requested by a driver.
///
/// The `-Preferred` variants only ever fuzzy-match as a *zone's* tag against
/// a client's plain tag (never the reverse) — see
/// [`Environment::preferred_prefix`] and the parking manager's scoring code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Outdoor,
    Indoor,
    Both,
    IndoorPreferred,
    OutdoorPreferred,
}

impl Environment {
    /// Parse a wire token. Unknown tokens yield `None` rather than an error —
    /// an unrecognised environment simply contributes no weight to scoring.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Outdoor" => Some(Self::Outdoor),
            "Indoor" => Some(Self::Indoor),
            "Both" => Some(Self::Both),
            "Indoor-Preferred" => Some(Self::IndoorPreferred),
            "Outdoor-Preferred" => Some(Self::OutdoorPreferred),
            _ => None,
        }
    }

    pub fn wire(&self) -> &'static str {
        match self {
            Self::Outdoor => "Outdoor",
            Self::Indoor => "Indoor",
            Self::Both => "Both",
            Self::IndoorPreferred => "Indoor-Preferred",
            Self::OutdoorPreferred => "Outdoor-Preferred",
        }
    }

    /// If this tag is a `-Preferred` variant, the plain tag it is a fuzzy
    /// match for. `None` for plain tags.
    pub fn preferred_prefix(&self) -> Option<Environment> {
        match self {
            Self::IndoorPreferred => Some(Self::Indoor),
            Self::OutdoorPreferred => Some(Self::Outdoor),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// Pricing class requested by a driver or tagged on a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PricingClass {
    Low,
    Medium,
    High,
}

impl PricingClass {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    pub fn wire(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Numeric multiplier used by the parking manager's pricing-weight band.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Low => 0.25,
            Self::Medium => 1.0,
            Self::High => 2.0,
        }
    }
}

impl fmt::Display for PricingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}
