use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    Ru,
    #[default]
    En,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(1); // 1=En (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        0 => Lang::Ru,
        _ => Lang::En,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::Ru => 0,
            Lang::En => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Header ──────────────────────────────────────────
        "app.title" => if ru { "Конструктор чехлов" } else { "Case Customizer" },
        "app.tagline" => if ru { "Ваш рисунок на вашем чехле" } else { "Your art, on your case" },
        "app.loading" => if ru { "Загрузка..." } else { "Loading..." },
        "menu.language" => if ru { "Язык" } else { "Language" },
        "menu.lighting" => if ru { "Освещение" } else { "Lighting" },

        // ── Controls ────────────────────────────────────────
        "ctl.rotate_left" => if ru { "⟲ Влево" } else { "⟲ Left" },
        "ctl.rotate_right" => if ru { "Вправо ⟳" } else { "Right ⟳" },
        "ctl.customize" => if ru { "Настроить" } else { "Customize" },
        "ctl.choose_title" => if ru { "Выберите изображение" } else { "Choose an image" },
        "ctl.images" => if ru { "Изображения" } else { "Images" },
        "ctl.reset_camera" => if ru { "Сбросить камеру" } else { "Reset camera" },

        // ── Status bar ──────────────────────────────────────
        "status.idle" => if ru { "Готово" } else { "Ready" },
        "status.uploading" => if ru { "Загрузка изображения" } else { "Uploading" },
        "status.decoding" => if ru { "Наложение текстуры..." } else { "Applying texture..." },
        "status.image" => if ru { "Изображение" } else { "Image" },
        "status.no_image" => if ru { "Изображение не выбрано" } else { "No image selected" },
        "status.error" => if ru { "Ошибка" } else { "Error" },
        "status.angle" => if ru { "Угол" } else { "Angle" },

        // ── Viewport ────────────────────────────────────────
        "vp.model_error" => if ru { "Не удалось загрузить модель" } else { "Could not load the model" },
        "vp.no_model" => if ru { "Модель не загружена" } else { "No model loaded" },

        _ => "???",
    }
}
