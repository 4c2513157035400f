//! On-frame visualization of the detection results.

use crate::{
    gesture::{self, FingerState},
    hand::{Hand, CONNECTIVITY},
    image::{draw, Color, Image},
    rect::Rect,
};

const GRAY: Color = Color([200, 200, 200, 255]);

/// Draws hand skeletons and the info panels onto a frame.
pub fn render(frame: &mut Image, hands: &[Hand]) {
    draw::filled_rect(frame, Rect::from_top_left(10.0, 10.0, 390.0, 90.0));
    draw::text(frame, 20.0, 40.0, "Hand Sign Detection").color(Color::WHITE);
    draw::text(frame, 20.0, 70.0, "Press 'q' to quit").color(GRAY);

    if hands.is_empty() {
        draw::filled_rect(frame, Rect::from_top_left(10.0, 140.0, 440.0, 60.0));
        draw::text(frame, 20.0, 175.0, "No hand detected").color(Color::RED);
        return;
    }

    for (idx, hand) in hands.iter().enumerate() {
        draw_skeleton(frame, hand);

        let gesture = gesture::classify(FingerState::detect(hand));
        let y = (150 + idx * 100) as f32;
        draw::filled_rect(frame, Rect::from_top_left(10.0, y - 40.0, 440.0, 70.0));
        draw::text(frame, 20.0, y - 10.0, &format!("Hand: {}", hand.handedness().name()))
            .color(Color::YELLOW);
        draw::text(frame, 20.0, y + 20.0, &format!("Gesture: {gesture}")).color(Color::GREEN);
    }
}

fn draw_skeleton(frame: &mut Image, hand: &Hand) {
    for &(a, b) in CONNECTIVITY {
        let (a, b) = (hand.landmark(a), hand.landmark(b));
        draw::line(frame, a.x, a.y, b.x, b.y).color(Color::BLUE);
    }
    for lm in hand.landmarks() {
        draw::marker(frame, lm.x, lm.y).color(Color::GREEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hand_banner() {
        let mut frame = Image::new(640, 480);
        // Probe pixels inside the header box, inside the banner box, and
        // outside of both.
        frame.set(15, 50, Color::WHITE);
        frame.set(15, 170, Color::WHITE);
        frame.set(600, 400, Color::WHITE);
        render(&mut frame, &[]);
        assert_eq!(frame.get(15, 50), Color::BLACK);
        assert_eq!(frame.get(15, 170), Color::BLACK);
        assert_eq!(frame.get(600, 400), Color::WHITE);
    }
}
