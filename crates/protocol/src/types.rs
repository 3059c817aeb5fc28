use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let channel = |i: usize| -> Option<f32> {
            let byte = u8::from_str_radix(digits.get(i..i + 2)?, 16).ok()?;
            Some(f32::from(byte) / 255.0)
        };
        let a = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Pixel dimensions of an output device (screen buffer or printed page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSize {
    pub width: i32,
    pub height: i32,
}

impl DeviceSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}
