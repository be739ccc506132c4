//! Template storage and loading.
//!
//! A [`Template`] always holds BGR data so it can be scored against frames
//! converted with [`to_bgr`](crate::image::color::to_bgr).

use crate::image::color::{to_bgr, PixelFormat};
use crate::image::{ImageView, OwnedImage, Size};
use crate::trace::{trace_event, trace_span};
use crate::util::{ClickMatchError, ClickMatchResult};
use std::path::Path;

pub(crate) mod plan;

pub use plan::TemplatePlan;

/// Immutable reference image in BGR order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    img: OwnedImage,
}

impl Template {
    /// Creates a template from a contiguous buffer in `format`.
    pub fn new(
        data: &[u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> ClickMatchResult<Self> {
        let view = ImageView::from_slice(data, width, height, format.channels())?;
        Ok(Self {
            img: to_bgr(view, format)?,
        })
    }

    /// Creates a template from an image decoded by the `image` crate.
    pub fn from_dynamic_image(img: &::image::DynamicImage) -> ClickMatchResult<Self> {
        let rgb = img.to_rgb8();
        Self::new(
            rgb.as_raw(),
            rgb.width() as usize,
            rgb.height() as usize,
            PixelFormat::Rgb,
        )
    }

    /// Returns a borrowed view of the BGR data.
    pub fn view(&self) -> ImageView<'_> {
        self.img.view()
    }

    /// Returns the template size in pixels.
    pub fn size(&self) -> Size {
        self.img.size()
    }
}

/// Loads and decodes a template image from disk.
///
/// The format is sniffed from the file contents, so the extension does not
/// need to be accurate. A missing file is reported as
/// [`ClickMatchError::PathNotFound`]; anything that exists but does not
/// decode (including zero-byte files) as [`ClickMatchError::DecodeFailure`].
pub fn load_template<P: AsRef<Path>>(path: P) -> ClickMatchResult<Template> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ClickMatchError::InvalidInput("template path is empty"));
    }
    let _span = trace_span!("load_template", path = %path.display()).entered();

    if !path.exists() {
        return Err(ClickMatchError::PathNotFound {
            path: path.to_path_buf(),
        });
    }

    let decode_failure = |reason: String| ClickMatchError::DecodeFailure {
        path: path.to_path_buf(),
        reason,
    };
    let img = ::image::ImageReader::open(path)
        .map_err(|err| decode_failure(err.to_string()))?
        .with_guessed_format()
        .map_err(|err| decode_failure(err.to_string()))?
        .decode()
        .map_err(|err| decode_failure(err.to_string()))?;

    let template = Template::from_dynamic_image(&img)?;
    let size = template.size();
    trace_event!("template_loaded", width = size.width, height = size.height);
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::{load_template, Template};
    use crate::image::color::PixelFormat;
    use crate::image::Size;
    use crate::util::ClickMatchError;
    use std::io::Write;

    #[test]
    fn rgb_template_is_stored_as_bgr() {
        let tpl = Template::new(&[1, 2, 3, 4, 5, 6], 2, 1, PixelFormat::Rgb).unwrap();
        assert_eq!(tpl.view().row(0).unwrap(), &[3u8, 2, 1, 6, 5, 4]);
        assert_eq!(tpl.size(), Size::new(2, 1));
    }

    #[test]
    fn empty_path_is_invalid_input() {
        let err = load_template("").unwrap_err();
        assert!(matches!(err, ClickMatchError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_is_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.png");
        let err = load_template(&path).unwrap_err();
        assert_eq!(err, ClickMatchError::PathNotFound { path });
    }

    #[test]
    fn zero_byte_and_garbage_files_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();

        let empty = dir.path().join("empty.png");
        std::fs::File::create(&empty).unwrap();
        let err = load_template(&empty).unwrap_err();
        assert!(matches!(err, ClickMatchError::DecodeFailure { .. }));

        let garbage = dir.path().join("garbage.png");
        let mut file = std::fs::File::create(&garbage).unwrap();
        file.write_all(b"definitely not an image").unwrap();
        let err = load_template(&garbage).unwrap_err();
        assert!(matches!(err, ClickMatchError::DecodeFailure { .. }));
    }

    #[test]
    fn png_with_wrong_extension_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("button.dat");
        let img = ::image::RgbImage::from_fn(3, 2, |x, y| ::image::Rgb([x as u8, y as u8, 200]));
        img.save_with_format(&path, ::image::ImageFormat::Png).unwrap();

        let tpl = load_template(&path).unwrap();
        assert_eq!(tpl.size(), Size::new(3, 2));
        assert_eq!(tpl.view().pixel(2, 1).unwrap(), &[200u8, 1, 2]);
    }
}
