//! Image textures for record and camera previews

use std::collections::{HashMap, HashSet};

use eframe::egui::{self, ColorImage, TextureHandle, Vec2};
use image::DynamicImage;
use placaview_types::decode_image_base64;

pub fn color_image(img: &DynamicImage) -> ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

/// Decode a base64 image into a texture; None for empty or undecodable data
pub fn texture_from_base64(
    ctx: &egui::Context,
    name: &str,
    base64_data: &str,
) -> Option<TextureHandle> {
    if base64_data.trim().is_empty() {
        return None;
    }
    let bytes = match decode_image_base64(base64_data) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("invalid base64 image for {}: {}", name, e);
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(texture_from_image(ctx, name, &img)),
        Err(e) => {
            log::warn!("cannot decode image for {}: {}", name, e);
            None
        }
    }
}

pub fn texture_from_image(ctx: &egui::Context, name: &str, img: &DynamicImage) -> TextureHandle {
    ctx.load_texture(name, color_image(img), egui::TextureOptions::LINEAR)
}

/// Cached texture keyed by whatever it was decoded from
#[derive(Default)]
pub struct CachedTexture {
    key: Option<String>,
    texture: Option<TextureHandle>,
}

impl CachedTexture {
    /// Texture for `key`, decoding `base64_data` only when the key changes
    pub fn get_or_decode(
        &mut self,
        ctx: &egui::Context,
        key: &str,
        base64_data: &str,
    ) -> Option<&TextureHandle> {
        if self.key.as_deref() != Some(key) {
            self.key = Some(key.to_string());
            self.texture = texture_from_base64(ctx, key, base64_data);
        }
        self.texture.as_ref()
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.texture = None;
    }
}

/// Textures for a whole list, one per record id.
///
/// Records whose image cannot be decoded are remembered too, so they are
/// not decoded again every frame.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<TextureHandle>>,
}

impl TextureCache {
    pub fn get_or_decode(
        &mut self,
        ctx: &egui::Context,
        key: &str,
        base64_data: &str,
    ) -> Option<&TextureHandle> {
        self.textures
            .entry(key.to_string())
            .or_insert_with(|| texture_from_base64(ctx, key, base64_data))
            .as_ref()
    }

    /// Forget textures whose key is no longer listed
    pub fn retain<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let listed: HashSet<&str> = keys.into_iter().collect();
        self.textures.retain(|key, _| listed.contains(key.as_str()));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

/// Scale to fit within the given box, keeping the aspect ratio
pub fn fit_size(texture: &TextureHandle, max_width: f32, max_height: f32) -> Vec2 {
    let original = texture.size_vec2();
    if original.x <= 0.0 || original.y <= 0.0 {
        return original;
    }
    let scale = (max_width / original.x).min(max_height / original.y).min(1.0);
    original * scale
}

/// Show a texture scaled to fit
pub fn show(ui: &mut egui::Ui, texture: &TextureHandle, max_width: f32, max_height: f32) {
    let size = fit_size(texture, max_width, max_height);
    ui.add(egui::Image::new((texture.id(), size)));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 PNG
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn test_texture_from_data_url() {
        let ctx = egui::Context::default();
        let data_url = format!("data:image/png;base64,{}", PIXEL_PNG);

        let texture = texture_from_base64(&ctx, "pixel", &data_url).unwrap();
        assert_eq!(texture.size(), [1, 1]);
        assert!(texture_from_base64(&ctx, "broken", "not an image").is_none());
        assert!(texture_from_base64(&ctx, "empty", "  ").is_none());
    }

    #[test]
    fn test_texture_cache_keeps_listed_records() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::default();

        assert!(cache.get_or_decode(&ctx, "a", PIXEL_PNG).is_some());
        // Already cached under "a": the new data is not decoded
        assert!(cache.get_or_decode(&ctx, "a", "").is_some());
        assert!(cache.get_or_decode(&ctx, "b", "").is_none());
        assert_eq!(cache.len(), 2);

        cache.retain(["b"]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_decode(&ctx, "a", "").is_none());
    }

    #[test]
    fn test_color_image_size() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(4, 3));
        let color = color_image(&img);
        assert_eq!(color.size, [4, 3]);
    }
}
