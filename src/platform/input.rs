//! Pointer input mapping

/// Map a pointer's client x onto playfield coordinates
///
/// The canvas may be scaled by CSS, so the position inside the element is
/// rescaled by `playfield_width / rect_width`. A zero-width rect maps to 0.
pub fn pointer_to_playfield(client_x: f32, rect_left: f32, rect_width: f32, playfield_width: f32) -> f32 {
    if rect_width <= 0.0 {
        return 0.0;
    }
    (client_x - rect_left) * playfield_width / rect_width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscaled_canvas() {
        assert_eq!(pointer_to_playfield(150.0, 50.0, 800.0, 800.0), 100.0);
    }

    #[test]
    fn test_scaled_canvas() {
        // Canvas shown at half size
        assert_eq!(pointer_to_playfield(250.0, 50.0, 400.0, 800.0), 400.0);
        assert_eq!(pointer_to_playfield(10.0, 10.0, 0.0, 800.0), 0.0);
    }
}
