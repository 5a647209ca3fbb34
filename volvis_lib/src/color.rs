use nalgebra::{vector, Vector3, Vector4};

pub type RGBA = Vector4<f32>;
pub type RGB = Vector3<f32>;

pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
    vector![r, g, b, a]
}

pub fn rgb(r: f32, g: f32, b: f32) -> RGB {
    vector![r, g, b]
}

pub fn zero() -> RGBA {
    vector![0.0, 0.0, 0.0, 0.0]
}

pub fn mono(v: f32, opacity: f32) -> RGBA {
    vector![v, v, v, opacity]
}

pub fn white() -> RGBA {
    vector![1.0, 1.0, 1.0, 1.0]
}

/// Opaque color from a triple
pub fn opaque(c: RGB) -> RGBA {
    vector![c.x, c.y, c.z, 1.0]
}

/// Channel in [0,1] to byte, rounded
pub fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn from_byte(v: u8) -> f32 {
    v as f32 / 255.0
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blue -> green -> red heat map over `t` in [0,1]
pub fn heat_map(t: f32) -> RGB {
    vector![
        smoothstep(0.5, 1.0, t),
        smoothstep(0.0, 0.5, t) - smoothstep(0.5, 1.0, t),
        smoothstep(0.0, 0.5, 1.0 - t)
    ]
}

/// Parse `#rrggbb` (leading `#` optional)
pub fn hex_to_rgb(hex: &str) -> Option<RGB> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(from_byte);
    Some(vector![channel(0)?, channel(2)?, channel(4)?])
}

pub fn rgb_to_hex(c: RGB) -> String {
    format!("#{:02x}{:02x}{:02x}", to_byte(c.x), to_byte(c.y), to_byte(c.z))
}
