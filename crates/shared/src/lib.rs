use serde::{Deserialize, Serialize};

/// MIME-тип HEIC: единственный формат, требующий конвертации
pub const HEIC_MIME: &str = "image/heic";

/// Уникальный идентификатор загруженного ресурса изображения
pub type ResourceId = u64;

/// Определить MIME-тип изображения по расширению файла
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "heic" => Some(HEIC_MIME),
        _ => None,
    }
}

/// Расширения, которые предлагает диалог выбора файла
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "heic"];

/// Состояние декодирования текстуры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStatus {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Метаданные ресурса изображения (без самих байтов)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub id: ResourceId,
    pub mime: String,
    pub byte_len: usize,
    pub status: DecodeStatus,
}

/// Трансформация модели: поворот вокруг вертикальной оси и масштаб
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    /// Угол поворота (радианы)
    pub yaw: f32,
    pub scale: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            scale: 1.0,
        }
    }
}

/// Снимок состояния конфигуратора для инспекции и тестов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub loading: bool,
    /// Накопленный угол поворота (радианы, без нормализации)
    pub angle: f32,
    pub hovered: bool,
    pub transform: ModelTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
    pub surface_count: usize,
    /// Количество поверхностей с текущей текстурой
    pub textured_surfaces: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
