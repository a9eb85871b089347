use ratatui::layout::Rect;

/// Space kept free around a popup on each axis
const POPUP_MARGIN: u16 = 4;

/// Centered rect whose size prefers the max, shrinks to the available area,
/// and never goes below the min.
pub fn centered_rect_constrained(
    area: Rect,
    min_width: u16,
    max_width: u16,
    min_height: u16,
    max_height: u16,
) -> Rect {
    let w = max_width
        .min(area.width.saturating_sub(POPUP_MARGIN))
        .max(min_width)
        .min(area.width);
    let h = max_height
        .min(area.height.saturating_sub(POPUP_MARGIN))
        .max(min_height)
        .min(area.height);

    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_uses_max_when_room() {
        let rect = centered_rect_constrained(Rect::new(0, 0, 120, 40), 40, 90, 12, 24);
        assert_eq!(rect, Rect::new(15, 8, 90, 24));
    }

    #[test]
    fn test_popup_never_exceeds_area() {
        let rect = centered_rect_constrained(Rect::new(0, 0, 30, 10), 40, 90, 12, 24);
        assert_eq!(rect, Rect::new(0, 0, 30, 10));
    }
}
