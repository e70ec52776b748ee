//! 4x4 齐次变换矩阵
//!
//! 按列主序存储 16 个 `f32`：下标 `i` 对应第 `i % 4` 行、第 `i / 4` 列，
//! 和上传给着色器 uniform 的缓冲区布局一致。

use std::fmt;
use std::ops::{Index, Mul, MulAssign};

use cgmath::{Matrix4 as Mat4, Vector4 as Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    m: [f32; 16],
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Matrix4 = Matrix4 {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// 均匀缩放，只改对角线前三项
    pub fn scale(s: f32) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = s;
        out.m[5] = s;
        out.m[10] = s;
        out
    }

    /// 平移量写在第 4 列（下标 12、13、14）
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut out = Self::IDENTITY;
        out.m[12] = x;
        out.m[13] = y;
        out.m[14] = z;
        out
    }

    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[5] = c;
        out.m[6] = s;
        out.m[9] = -s;
        out.m[10] = c;
        out
    }

    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[0] = c;
        out.m[2] = -s;
        out.m[8] = s;
        out.m[10] = c;
        out
    }

    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[0] = c;
        out.m[1] = s;
        out.m[4] = -s;
        out.m[5] = c;
        out
    }

    /// 右手系透视投影
    ///
    /// `vfov` 为竖直视场角（弧度），`aspect` 为宽高比。
    /// 不检查 `near > 0`、`far > near`，非法参数按 IEEE 浮点规则得到 inf/NaN。
    pub fn perspective(vfov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let half = vfov / 2.0;
        let f = half.cos() / half.sin();
        let mut m = [0.0; 16];
        m[0] = f / aspect;
        m[5] = f;
        m[10] = -((far + near) / (far - near));
        m[11] = -1.0;
        m[14] = -((2.0 * far * near) / (far - near));
        m[15] = 0.0;
        Self { m }
    }

    /// `self * rhs`：作用到向量上时先 `rhs` 后 `self`
    ///
    /// 结果总是写进新的值里，所以 `m = m.multiply(&x)` 这类写法是安全的。
    pub fn multiply(&self, rhs: &Matrix4) -> Matrix4 {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Matrix4 { m: out }
    }

    /// 矩阵乘齐次坐标
    pub fn transform(&self, v: Vec4<f32>) -> Vec4<f32> {
        let m = &self.m;
        Vec4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<usize> for Matrix4 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.m[index]
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl Mul<Vec4<f32>> for Matrix4 {
    type Output = Vec4<f32>;

    fn mul(self, rhs: Vec4<f32>) -> Vec4<f32> {
        self.transform(rhs)
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        *self = self.multiply(&rhs);
    }
}

impl From<Matrix4> for [f32; 16] {
    fn from(value: Matrix4) -> Self {
        value.m
    }
}

impl From<Matrix4> for Mat4<f32> {
    #[rustfmt::skip]
    fn from(value: Matrix4) -> Self {
        let m = value.m;
        // cgmath 同样是列主序，按列依次传入
        Mat4::new(
            m[0], m[1], m[2], m[3],
            m[4], m[5], m[6], m[7],
            m[8], m[9], m[10], m[11],
            m[12], m[13], m[14], m[15],
        )
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix :")?;
        for row in 0..4 {
            writeln!(
                f,
                "{:6.2} {:6.2} {:6.2} {:6.2}",
                self.get(row, 0),
                self.get(row, 1),
                self.get(row, 2),
                self.get(row, 3)
            )?;
        }
        Ok(())
    }
}
