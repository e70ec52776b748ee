use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {}: {}", .path.display(), .source)]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 {}: {}", .path.display(), .source)]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    /// OBJ 加载失败
    #[error("无法加载模型 {}: {}", .path.display(), .source)]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("模型中没有三角形: {}", .0.display())]
    EmptyMesh(PathBuf),

    #[error("无法打开窗口: {0}")]
    Window(#[from] minifb::Error),

    #[error("无法保存图片: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
