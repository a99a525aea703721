//! Small vector helpers used by shading and texture coordinate generation.

pub fn normalize(v: [f32; 3]) -> [f32; 3] {
    let mag = dot(v, v).sqrt();
    if mag == 0.0 {
        v
    } else {
        scalar_mul(v, 1.0 / mag)
    }
}

pub fn dot(v: [f32; 3], w: [f32; 3]) -> f32 {
    v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
}

pub fn scalar_mul(v: [f32; 3], s: f32) -> [f32; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

/// Multiplies an s10.5 coordinate by a 0.16 fixed point scale.
pub fn scale_coord(coord: i32, scale: u32) -> i32 {
    ((coord as i64 * scale as i64) >> 16) as i32
}
