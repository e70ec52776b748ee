use crate::vertex::ClipSpaceVertex;

/// 允许的最小 w，更小的顶点视为落在相机平面上或身后
const MIN_W: f32 = 1e-5;

pub trait Clipper {
    // 接收一个裁剪空间的三角形
    // 返回一个 Vec，其中包含裁剪后产生的零个、一个或多个三角形
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]>;
}

/// 只做丢弃的裁剪器：任一顶点 w 过小或坐标非有限就整三角形丢掉
pub struct SimpleClipper;

impl Clipper for SimpleClipper {
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]> {
        let rejected = triangle.iter().any(|v| {
            let p = v.position;
            !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && p.w.is_finite())
                || p.w < MIN_W
        });
        if rejected { vec![] } else { vec![*triangle] }
    }
}
