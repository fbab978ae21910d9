//! Pin bundle and duct wall parameters.

use std::f64::consts::PI;

/// Raw pin bundle dimensions [m].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinBundle {
    /// Number of pin rings, counting the center pin as ring 1.
    pub rings: u32,
    pub pin_pitch: f64,
    pub pin_diameter: f64,
    pub clad_thickness: f64,
    /// Wire-wrap axial lead. Zero for bare pins.
    pub wire_pitch: f64,
    /// Zero for bare pins.
    pub wire_diameter: f64,
}

impl PinBundle {
    pub fn n_pins(&self) -> usize {
        let n = self.rings as usize;
        3 * n * (n.saturating_sub(1)) + 1
    }

    pub fn pin_area(&self) -> f64 {
        PI * self.pin_diameter * self.pin_diameter / 4.0
    }

    pub fn wire_area(&self) -> f64 {
        PI * self.wire_diameter * self.wire_diameter / 4.0
    }

    pub fn has_wire(&self) -> bool {
        self.wire_diameter > 0.0 && self.wire_pitch > 0.0
    }

    /// Cosine of the wire helix angle relative to the pin axis.
    pub fn wire_cos(&self) -> f64 {
        if !self.has_wire() {
            return 1.0;
        }
        let tan = PI * (self.pin_diameter + self.wire_diameter) / self.wire_pitch;
        1.0 / (1.0 + tan * tan).sqrt()
    }

    pub fn clad_outer_radius(&self) -> f64 {
        self.pin_diameter / 2.0
    }

    pub fn clad_inner_radius(&self) -> f64 {
        self.pin_diameter / 2.0 - self.clad_thickness
    }

    /// Apothem of the hexagon through the outer-row pin centers.
    pub fn outer_row_apothem(&self) -> f64 {
        f64::from(self.rings.saturating_sub(1)) * self.pin_pitch * 3f64.sqrt() / 2.0
    }
}

/// One duct wall given by its inner and outer flat-to-flat distance [m].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuctWall {
    pub inner_ftf: f64,
    pub outer_ftf: f64,
}

impl DuctWall {
    pub fn thickness(&self) -> f64 {
        0.5 * (self.outer_ftf - self.inner_ftf)
    }

    pub fn mid_ftf(&self) -> f64 {
        0.5 * (self.outer_ftf + self.inner_ftf)
    }

    /// Length of one flat at the given flat-to-flat distance.
    pub fn side_length(ftf: f64) -> f64 {
        ftf / 3f64.sqrt()
    }

    /// Area enclosed by a hexagon of flat-to-flat `ftf`.
    pub fn hex_area(ftf: f64) -> f64 {
        3f64.sqrt() / 2.0 * ftf * ftf
    }

    pub fn inner_perimeter(&self) -> f64 {
        6.0 * Self::side_length(self.inner_ftf)
    }

    pub fn outer_perimeter(&self) -> f64 {
        6.0 * Self::side_length(self.outer_ftf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pin_counts() {
        let mut b = PinBundle {
            rings: 1,
            pin_pitch: 0.008,
            pin_diameter: 0.007,
            clad_thickness: 0.0005,
            wire_pitch: 0.2,
            wire_diameter: 0.001,
        };
        assert_eq!(b.n_pins(), 1);
        b.rings = 10;
        assert_eq!(b.n_pins(), 271);
    }

    #[test]
    fn hexagon_area_matches_six_triangles() {
        let ftf: f64 = 0.1;
        let side = DuctWall::side_length(ftf);
        assert_relative_eq!(
            DuctWall::hex_area(ftf),
            6.0 * 3f64.sqrt() / 4.0 * side * side,
            max_relative = 1e-12
        );
    }

    #[test]
    fn bare_pin_helix_is_axial() {
        let b = PinBundle {
            rings: 2,
            pin_pitch: 0.008,
            pin_diameter: 0.007,
            clad_thickness: 0.0005,
            wire_pitch: 0.0,
            wire_diameter: 0.0,
        };
        assert_eq!(b.wire_cos(), 1.0);
    }
}
