use crate::vertex::RasterPoint;
use cgmath::{Vector2 as Vec2, Vector3 as Vec3, dot};

pub fn get_barycentric_coords(
    vertices: &[Vec2<f32>; 3],
    p: &Vec2<f32>,
) -> Option<(f32, f32, f32)> {
    let v0 = vertices[1] - vertices[0];
    let v1 = vertices[2] - vertices[0];
    let v2 = *p - vertices[0];

    let d00 = dot(v0, v0);
    let d01 = dot(v0, v1);
    let d11 = dot(v1, v1);
    let d20 = dot(v2, v0);
    let d21 = dot(v2, v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-6 {
        return None; // 三角形面积为零，无法计算重心坐标
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    Some((u, v, w))
}

/// 重心坐标 (u, v, w) 分别对应 points[0]、points[1]、points[2]
pub fn interpolate_depth(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> f32 {
    let (u, v, w) = bary;
    points[0].z * u + points[1].z * v + points[2].z * w
}

pub fn interpolate_color(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> Vec3<f32> {
    let (u, v, w) = bary;
    points[0].color * u + points[1].color * v + points[2].color * w
}

pub fn interpolate_normal(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> Vec3<f32> {
    let (u, v, w) = bary;
    points[0].normal * u + points[1].normal * v + points[2].normal * w
}

/// 包围盒，裁到 `[0, width) x [0, height)` 以内；完全在外或坐标非有限时返回 `None`
pub fn get_box(
    vertices: &[Vec2<f32>; 3],
    width: usize,
    height: usize,
) -> Option<(usize, usize, usize, usize)> {
    if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) || width == 0 || height == 0 {
        return None;
    }

    let mut min_x = vertices[0].x;
    let mut max_x = vertices[0].x;
    let mut min_y = vertices[0].y;
    let mut max_y = vertices[0].y;

    for v in vertices.iter().skip(1) {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }

    if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
        return None;
    }

    Some((
        min_x.floor().max(0.0) as usize,
        min_y.floor().max(0.0) as usize,
        (max_x.ceil() as usize).min(width - 1),
        (max_y.ceil() as usize).min(height - 1),
    ))
}

pub fn is_inside_triangle(vertices: &[Vec2<f32>; 3], p: &Vec2<f32>) -> bool {
    let v0 = vertices[1] - vertices[0];
    let v1 = vertices[2] - vertices[1];
    let v2 = vertices[0] - vertices[2];

    let p0 = *p - vertices[0];
    let p1 = *p - vertices[1];
    let p2 = *p - vertices[2];

    let cross0 = v0.x * p0.y - v0.y * p0.x;
    let cross1 = v1.x * p1.y - v1.y * p1.x;
    let cross2 = v2.x * p2.y - v2.y * p2.x;

    (cross0 >= 0.0 && cross1 >= 0.0 && cross2 >= 0.0)
        || (cross0 <= 0.0 && cross1 <= 0.0 && cross2 <= 0.0)
}

/// 屏幕空间（y 向下）的有向面积的两倍
pub fn signed_area(vertices: &[Vec2<f32>; 3]) -> f32 {
    let e1 = vertices[1] - vertices[0];
    let e2 = vertices[2] - vertices[0];
    e1.x * e2.y - e1.y * e2.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> [Vec2<f32>; 3] {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn barycentric_at_vertices() {
        let t = tri();
        let (u, v, w) = get_barycentric_coords(&t, &t[0]).unwrap();
        assert!((u - 1.0).abs() < 1e-6 && v.abs() < 1e-6 && w.abs() < 1e-6);
        let (u, v, w) = get_barycentric_coords(&t, &t[2]).unwrap();
        assert!(u.abs() < 1e-6 && v.abs() < 1e-6 && (w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_has_no_barycentric() {
        let line = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
        ];
        assert!(get_barycentric_coords(&line, &Vec2::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn inside_test() {
        let t = tri();
        assert!(is_inside_triangle(&t, &Vec2::new(2.0, 2.0)));
        assert!(!is_inside_triangle(&t, &Vec2::new(8.0, 8.0)));
    }

    #[test]
    fn box_is_clamped() {
        let big = [
            Vec2::new(-100.0, -50.0),
            Vec2::new(1e9, 3.0),
            Vec2::new(4.0, 1e9),
        ];
        assert_eq!(get_box(&big, 16, 8), Some((0, 0, 15, 7)));
        assert_eq!(get_box(&tri(), 5, 5), Some((0, 0, 4, 4)));
    }

    #[test]
    fn box_rejects_offscreen_and_non_finite() {
        let off = [
            Vec2::new(-10.0, -10.0),
            Vec2::new(-5.0, -10.0),
            Vec2::new(-5.0, -2.0),
        ];
        assert_eq!(get_box(&off, 16, 16), None);

        let nan = [
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_eq!(get_box(&nan, 16, 16), None);

        let inf = [
            Vec2::new(f32::INFINITY, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_eq!(get_box(&inf, 16, 16), None);
    }

    #[test]
    fn winding_sign() {
        // y 向下时 tri() 为顺时针
        assert!(signed_area(&tri()) > 0.0);
        let [a, b, c] = tri();
        assert!(signed_area(&[a, c, b]) < 0.0);
    }
}
