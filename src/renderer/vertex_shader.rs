use crate::transform::Matrix4;
use crate::vertex::{ClipSpaceVertex, Triangle};
use cgmath::{InnerSpace, Matrix, Matrix3 as Mat3, Matrix4 as Mat4, SquareMatrix};

pub struct VertexShaderUniforms {
    pub mvp_matrix: Matrix4,
    pub normal_matrix: Mat3<f32>,
}

impl VertexShaderUniforms {
    /// 法线矩阵取模型视图左上 3x3 的逆转置，不可逆时退回原矩阵
    pub fn new(mvp_matrix: Matrix4, model_view: Matrix4) -> Self {
        let mv: Mat4<f32> = model_view.into();
        let upper = Mat3::from_cols(mv.x.truncate(), mv.y.truncate(), mv.z.truncate());
        let normal_matrix = upper.invert().map(|m| m.transpose()).unwrap_or(upper);
        Self {
            mvp_matrix,
            normal_matrix,
        }
    }
}

pub trait VertexShader {
    // 接收一个模型空间的三角形和uniforms
    // 返回一个裁剪空间的三角形
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3];
}

pub struct DefaultVertexShader;

impl VertexShader for DefaultVertexShader {
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3] {
        triangle.vertices.map(|v| {
            let normal = uniforms.normal_matrix * v.normal;
            ClipSpaceVertex {
                position: uniforms.mvp_matrix.transform(v.pos.extend(1.0)),
                normal: if normal.magnitude2() > 0.0 {
                    normal.normalize()
                } else {
                    normal
                },
                color: v.color,
            }
        })
    }
}
