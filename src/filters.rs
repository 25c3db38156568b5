use image::{DynamicImage, RgbaImage};

/// Slider state for the five tone/color adjustments. Values mirror the UI:
/// percentages where 100 is the identity, hue in degrees, blur in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParams {
    pub brightness: i32, // 0..=200, 100 = identity
    pub contrast: i32,   // 0..=200, 100 = identity
    pub saturation: i32, // 0..=200, 100 = identity
    pub hue: i32,        // 0..=360 degrees, 0 = identity
    pub blur: i32,       // 0..=10 px, 0 = off
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
            hue: 0,
            blur: 0,
        }
    }
}

impl FilterParams {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Grayscale,
    Sepia,
    Vintage,
    Cold,
    Warm,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Grayscale,
        Preset::Sepia,
        Preset::Vintage,
        Preset::Cold,
        Preset::Warm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Grayscale => "Grayscale",
            Preset::Sepia => "Sepia",
            Preset::Vintage => "Vintage",
            Preset::Cold => "Cold",
            Preset::Warm => "Warm",
        }
    }

    /// Each preset starts from identity and overrides a few sliders.
    pub fn params(&self) -> FilterParams {
        let mut p = FilterParams::default();
        match self {
            Preset::Grayscale => {
                p.saturation = 0;
            }
            Preset::Sepia => {
                p.saturation = 80;
                p.hue = 30;
                p.brightness = 110;
            }
            Preset::Vintage => {
                p.contrast = 120;
                p.saturation = 80;
                p.brightness = 95;
            }
            Preset::Cold => {
                p.hue = 200;
                p.saturation = 120;
            }
            Preset::Warm => {
                p.hue = 20;
                p.brightness = 110;
            }
        }
        p
    }
}

/// Composite `params` onto `source`, returning a new surface for display or
/// export. Identity params return a pixel-identical copy.
pub fn render(source: &DynamicImage, params: &FilterParams) -> DynamicImage {
    if params.is_identity() {
        return source.clone();
    }

    let mut out: RgbaImage = source.to_rgba8();

    let gain = params.brightness as f32 / 100.0;
    let slope = params.contrast as f32 / 100.0;
    let sat = params.saturation as f32 / 100.0;
    let hue_shift = params.hue as f32 / 360.0;

    let tone_identity = params.brightness == 100 && params.contrast == 100;
    let color_identity = params.saturation == 100 && params.hue == 0;

    if !(tone_identity && color_identity) {
        for px in out.pixels_mut() {
            let [r, g, b, a] = px.0;
            let (mut r, mut g, mut b) = (r as f32, g as f32, b as f32);

            if !tone_identity {
                r = (r * gain - 128.0) * slope + 128.0;
                g = (g * gain - 128.0) * slope + 128.0;
                b = (b * gain - 128.0) * slope + 128.0;
            }

            if !color_identity {
                let (h, s, l) = rgb_to_hsl(
                    (r / 255.0).clamp(0.0, 1.0),
                    (g / 255.0).clamp(0.0, 1.0),
                    (b / 255.0).clamp(0.0, 1.0),
                );
                let mut h = (h + hue_shift).fract();
                if h < 0.0 {
                    h += 1.0;
                }
                let s = (s * sat).clamp(0.0, 1.0);
                let (nr, ng, nb) = hsl_to_rgb(h, s, l);
                r = nr * 255.0;
                g = ng * 255.0;
                b = nb * 255.0;
            }

            px.0 = [
                r.clamp(0.0, 255.0) as u8,
                g.clamp(0.0, 255.0) as u8,
                b.clamp(0.0, 255.0) as u8,
                a,
            ];
        }
    }

    if params.blur > 0 {
        out = image::imageops::blur(&out, params.blur as f32);
    }

    DynamicImage::ImageRgba8(out)
}

/// RGB (0..1) → HSL (all 0..1).
fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < 1e-6 {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h / 6.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    (h, s, l)
}

/// HSL (all 0..1) → RGB (0..1).
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 120, 40, 255])
            } else {
                Rgba([10, 60, 220, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn identity_params_copy_pixels_unchanged() {
        let src = checker(8, 8);
        let out = render(&src, &FilterParams::default());
        assert_eq!(src.to_rgba8().as_raw(), out.to_rgba8().as_raw());
    }

    #[test]
    fn zero_saturation_produces_gray() {
        let src = checker(4, 4);
        let out = render(&src, &Preset::Grayscale.params()).to_rgba8();
        for px in out.pixels() {
            let [r, g, b, _] = px.0;
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "not gray: {:?}", px);
        }
    }

    #[test]
    fn brightness_raises_luminance() {
        let src = checker(4, 4);
        let bright = FilterParams {
            brightness: 150,
            ..Default::default()
        };
        let out = render(&src, &bright).to_rgba8();
        let sum = |img: &RgbaImage| -> u64 {
            img.pixels()
                .map(|p| p.0[0] as u64 + p.0[1] as u64 + p.0[2] as u64)
                .sum()
        };
        assert!(sum(&out) > sum(&src.to_rgba8()));
    }

    #[test]
    fn presets_start_from_identity() {
        // A preset must not inherit values from whatever was set before it.
        let p = Preset::Warm.params();
        assert_eq!(p.contrast, 100);
        assert_eq!(p.saturation, 100);
        assert_eq!(p.blur, 0);
    }
}
