use eframe::egui::Color32;

use crate::analysis::regions::RegionKind;

// ---------------------------------------------------------------------------
// Plot colours
// ---------------------------------------------------------------------------

/// Background trace of the whole sweep.
pub const FULL_LOOP: Color32 = Color32::from_rgb(211, 211, 211);

/// Marker colour for a region: p1 blue, n1 red, n2 green, p2 magenta.
pub fn region_color(kind: RegionKind) -> Color32 {
    match kind {
        RegionKind::P1 => Color32::from_rgb(0, 0, 255),
        RegionKind::N1 => Color32::from_rgb(255, 0, 0),
        RegionKind::N2 => Color32::from_rgb(0, 128, 0),
        RegionKind::P2 => Color32::from_rgb(191, 0, 191),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_have_distinct_colours() {
        let colors: Vec<Color32> = RegionKind::ALL.into_iter().map(region_color).collect();
        for (i, a) in colors.iter().enumerate() {
            assert_ne!(*a, FULL_LOOP);
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
