use mudra::{
    gui,
    hand::tracking::{HandTracker, TrackerConfig},
    overlay,
    resolution::Resolution,
    timer::FpsCounter,
    video::webcam::{Webcam, WebcamOptions},
};

fn main() {
    mudra::init_logger!();
    gui::run(demo);
}

fn demo() -> anyhow::Result<()> {
    let mut tracker = HandTracker::new(TrackerConfig::default())?;
    let mut webcam = Webcam::open(WebcamOptions::default().resolution(Resolution::RES_720P))?;
    log::info!("camera delivers {}", webcam.resolution());

    let mut fps = FpsCounter::new("hand sign");
    loop {
        let mut frame = match webcam.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("failed to read webcam frame: {e}");
                break;
            }
        };

        // Mirror the image so that it behaves like a mirror for the user.
        frame.flip_horizontal_in_place();

        let hands = tracker.track(&frame)?;
        overlay::render(&mut frame, &hands);
        gui::show_frame(&frame);

        fps.tick_with(webcam.timers().chain(tracker.timers()));

        if gui::quit_requested() {
            break;
        }
    }

    Ok(())
}
