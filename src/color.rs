use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::config::Site;

// ---------------------------------------------------------------------------
// Fallback palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Site colour mapping
// ---------------------------------------------------------------------------

/// Maps site names to their configured display colour.
///
/// Sites whose configured hex string does not parse get a colour from
/// [`generate_palette`] at their position instead.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<&'static str, Srgb<u8>>,
    default_color: Srgb<u8>,
}

impl ColorMap {
    pub fn new(sites: &'static [Site]) -> Self {
        let fallback = generate_palette(sites.len());
        let mapping = sites
            .iter()
            .zip(fallback)
            .map(|(site, generated)| {
                let color = site.color.parse::<Srgb<u8>>().unwrap_or_else(|e| {
                    log::warn!("invalid colour {:?} for {}: {e}", site.color, site.name);
                    generated
                });
                (site.name, color)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Srgb::new(128, 128, 128),
        }
    }

    /// Look up the colour for a site name.
    pub fn color_for(&self, site: &str) -> Srgb<u8> {
        self.mapping
            .get(site)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Wrap `text` in a 24-bit ANSI foreground escape using the site colour.
    pub fn paint(&self, site: &str, text: &str) -> String {
        let c = self.color_for(site);
        format!("\x1b[38;2;{};{};{}m{text}\x1b[0m", c.red, c.green, c.blue)
    }
}
