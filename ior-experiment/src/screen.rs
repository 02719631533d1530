use ior_core::{Display, InputCapture, Layer, MessageKey, ScreenLocation, Shape, TextStyle};

/// Fixation star and both placeholder boxes on a fresh background.
pub fn present_neutral_boxes<D: Display + ?Sized>(display: &mut D, star: &Shape) {
    display.fill();
    display.present(star, Layer::Placeholder, ScreenLocation::Centre);
    display.present(&Shape::Placeholder, Layer::Placeholder, ScreenLocation::LeftBox);
    display.present(&Shape::Placeholder, Layer::Placeholder, ScreenLocation::RightBox);
}

/// Shows a message and waits for any key.
pub fn show_text<H: Display + InputCapture + ?Sized>(
    host: &mut H,
    content: String,
    style: TextStyle,
) {
    host.fill();
    host.present(&Shape::Text { content, style }, Layer::Overlay, ScreenLocation::Centre);
    host.flip();
    host.acknowledge();
}

pub fn show_error_message<H: Display + InputCapture + ?Sized>(host: &mut H, key: MessageKey) {
    host.fill();
    host.present(&Shape::message(key), Layer::Overlay, ScreenLocation::Centre);
    host.flip();
    host.acknowledge();
}
