use crate::domain::model::Rgb;
use rand::Rng;

const LUMINANCE_THRESHOLD: f64 = 0.5;

/// Black text on bright backgrounds, white text otherwise.
pub fn text_color_for(background: Rgb) -> Rgb {
    if background.luminance() > LUMINANCE_THRESHOLD {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

/// Draws a random opaque background and its contrasting text color.
pub fn derive_colors<R: Rng + ?Sized>(rng: &mut R) -> (Rgb, Rgb) {
    let background = Rgb::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
    (background, text_color_for(background))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_white_background_gets_black_text() {
        assert_eq!(text_color_for(Rgb::new(1.0, 1.0, 1.0)), Rgb::BLACK);
    }

    #[test]
    fn test_black_background_gets_white_text() {
        assert_eq!(text_color_for(Rgb::new(0.0, 0.0, 0.0)), Rgb::WHITE);
    }

    #[test]
    fn test_channel_weights_pick_text_color() {
        // Pure green is 0.587, pure red 0.299.
        assert_eq!(text_color_for(Rgb::new(0.0, 1.0, 0.0)), Rgb::BLACK);
        assert_eq!(text_color_for(Rgb::new(1.0, 0.0, 0.0)), Rgb::WHITE);
        // Red + blue: 0.413, still white.
        assert_eq!(text_color_for(Rgb::new(1.0, 0.0, 1.0)), Rgb::WHITE);
        // Red + green: 0.886.
        assert_eq!(text_color_for(Rgb::new(1.0, 1.0, 0.0)), Rgb::BLACK);
    }

    #[test]
    fn test_derive_colors_is_deterministic_for_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(derive_colors(&mut a), derive_colors(&mut b));
        }
    }

    #[test]
    fn test_derived_pairs_hold_contrast_invariant() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let (background, text) = derive_colors(&mut rng);
            for channel in [background.r, background.g, background.b] {
                assert!((0.0..1.0).contains(&channel));
            }
            let expected = if background.luminance() > 0.5 {
                Rgb::BLACK
            } else {
                Rgb::WHITE
            };
            assert_eq!(text, expected);
            assert_eq!(background.alpha(), 1.0);
        }
    }
}
