//! 2D vector math shared by the bolt generators

/// Normalize a 2D vector, returns (0, 0) if length is too small
#[inline]
pub fn normalize(x: f32, y: f32) -> (f32, f32) {
    let len = (x * x + y * y).sqrt();
    if len > 0.0001 {
        (x / len, y / len)
    } else {
        (0.0, 0.0)
    }
}

/// Calculate the length of a 2D vector
#[inline]
pub fn length(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

/// Calculate squared distance between two points (avoids sqrt)
#[inline]
pub fn distance_squared(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Left-hand perpendicular of a vector. The input need not be normalized.
#[inline]
pub fn perpendicular(x: f32, y: f32) -> (f32, f32) {
    (-y, x)
}
