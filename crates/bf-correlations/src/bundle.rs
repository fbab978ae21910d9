//! Geometry summary consumed by the correlations.
//!
//! The geometry builder fills this in once per assembly; correlations never
//! look at individual subchannels.

use std::f64::consts::PI;

/// Subchannel categories of a hexagonal bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubchannelType {
    Interior,
    Edge,
    Corner,
}

impl SubchannelType {
    pub const ALL: [SubchannelType; 3] = [
        SubchannelType::Interior,
        SubchannelType::Edge,
        SubchannelType::Corner,
    ];

    /// Position in per-type arrays.
    pub fn slot(self) -> usize {
        match self {
            SubchannelType::Interior => 0,
            SubchannelType::Edge => 1,
            SubchannelType::Corner => 2,
        }
    }
}

/// Aggregate description of one subchannel type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubchannelClass {
    pub count: usize,
    /// Coolant flow area of one subchannel [m²].
    pub area: f64,
    /// Wetted perimeter of one subchannel [m].
    pub wetted_perimeter: f64,
    /// Wire cross-section inside one subchannel [m²].
    pub wire_area: f64,
    /// Wire area projected normal to the wire axis [m²].
    pub wire_projected_area: f64,
}

impl SubchannelClass {
    pub fn hydraulic_diameter(&self) -> f64 {
        if self.wetted_perimeter > 0.0 {
            4.0 * self.area / self.wetted_perimeter
        } else {
            0.0
        }
    }

    /// Flow area the subchannel would have without the wire.
    pub fn bare_area(&self) -> f64 {
        self.area + self.wire_area
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleParams {
    pub n_pins: usize,
    pub pin_pitch: f64,
    pub pin_diameter: f64,
    pub wire_pitch: f64,
    pub wire_diameter: f64,
    /// Distance from an outer-row pin center to the duct wall plus D/2.
    pub edge_pitch: f64,
    /// Interior, edge, corner (indexed by `SubchannelType::slot`).
    pub classes: [SubchannelClass; 3],
}

impl BundleParams {
    pub fn class(&self, t: SubchannelType) -> &SubchannelClass {
        &self.classes[t.slot()]
    }

    pub fn p_over_d(&self) -> f64 {
        self.pin_pitch / self.pin_diameter
    }

    pub fn w_over_d(&self) -> f64 {
        self.edge_pitch / self.pin_diameter
    }

    pub fn h_over_d(&self) -> f64 {
        self.wire_pitch / self.pin_diameter
    }

    pub fn dw_over_d(&self) -> f64 {
        self.wire_diameter / self.pin_diameter
    }

    /// tan of the wire helix angle, π(D + Dw)/H. Zero for bare pins.
    pub fn helix_tan(&self) -> f64 {
        if self.wire_pitch > 0.0 && self.wire_diameter > 0.0 {
            PI * (self.pin_diameter + self.wire_diameter) / self.wire_pitch
        } else {
            0.0
        }
    }

    pub fn total_area(&self) -> f64 {
        self.classes
            .iter()
            .map(|c| c.count as f64 * c.area)
            .sum()
    }

    pub fn total_wetted_perimeter(&self) -> f64 {
        self.classes
            .iter()
            .map(|c| c.count as f64 * c.wetted_perimeter)
            .sum()
    }

    /// Bundle-average hydraulic diameter 4A/P_w.
    pub fn hydraulic_diameter(&self) -> f64 {
        4.0 * self.total_area() / self.total_wetted_perimeter()
    }

    /// Share of the bundle flow area held by subchannels of type `t`.
    pub fn area_fraction(&self, t: SubchannelType) -> f64 {
        let c = self.class(t);
        c.count as f64 * c.area / self.total_area()
    }
}
