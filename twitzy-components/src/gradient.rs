//! Deterministic two-colour gradient for avatars without an image.

const SATURATION: f64 = 0.95;
const LIGHTNESS: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gradient {
    pub from_color: String,
    pub to_color: String,
}

/// djb2 over UTF-16 code units, with the shift done in 32 bits and the sum
/// carried in a wider integer, as browsers compute it.
pub fn djb2(seed: &str) -> i64 {
    seed.encode_utf16().fold(5381_i64, |hash, unit| {
        ((hash as i32).wrapping_shl(5)) as i64 + hash + unit as i64
    })
}

/// Negative hashes wrap around the colour wheel rather than clamping to hue 0,
/// so every seed gets its own hue.
pub fn hue_for(seed: &str) -> u32 {
    djb2(seed).rem_euclid(360) as u32
}

pub fn generate_gradient(seed: &str) -> Gradient {
    let hue = hue_for(seed);
    Gradient {
        from_color: hsl_to_hex(hue, SATURATION, LIGHTNESS),
        to_color: hsl_to_hex((hue + 120) % 360, SATURATION, LIGHTNESS),
    }
}

/// Lowercase `#rrggbb` for a hue in degrees and saturation/lightness in `0..=1`.
pub fn hsl_to_hex(hue: u32, saturation: f64, lightness: f64) -> String {
    let h = (hue % 360) as f64 / 360.0;
    let (r, g, b) = if saturation == 0.0 {
        (lightness, lightness, lightness)
    } else {
        let q = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}
