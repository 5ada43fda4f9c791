//! Built-in demo documents

use std::f32::consts::TAU;
use std::fmt;

use clap::ValueEnum;
use recompose_wire::core::variables::{float_ref, system};
use recompose_wire::operations::{
    MathOperator, PaintBundle, RootContentBehavior, TextFromFloat, Theme,
};
use recompose_wire::{ColorSlot, DocumentBuilder, Result, VariableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// hh:mm:ss text driven by the time-of-day variables, with a pulsing dot
    Clock,
    /// One of each primitive inside a rotated frame
    Shapes,
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Demo::Clock => "clock",
            Demo::Shapes => "shapes",
        })
    }
}

impl Demo {
    pub fn build(self) -> Result<Vec<u8>> {
        match self {
            Demo::Clock => clock(),
            Demo::Shapes => shapes(),
        }
    }
}

/// Two-digit, zero-padded text of `value` modulo `modulus`
fn two_digits(b: &mut DocumentBuilder, value: f32, modulus: f32) -> Result<VariableId> {
    let wrapped = b.add_float_expression(&[value, modulus, MathOperator::Mod.as_float()])?;
    b.text_from_float(wrapped, 2, 0, TextFromFloat::PAD_PRE_ZERO)
}

fn clock() -> Result<Vec<u8>> {
    let mut b = DocumentBuilder::new();
    b.header(400, 200, 0).set_theme(Theme::DARK);
    b.set_root_content_description("Digital clock")?;

    let hours = two_digits(&mut b, float_ref(system::TIME_IN_HR), 24.0)?;
    let minutes = two_digits(&mut b, float_ref(system::TIME_IN_MIN), 60.0)?;
    let seconds = two_digits(&mut b, float_ref(system::TIME_IN_SEC), 60.0)?;
    let colon = b.add_text(":")?;
    let time = b.text_merge(hours, colon)?;
    let time = b.text_merge(time, minutes)?;
    let time = b.text_merge(time, colon)?;
    let time = b.text_merge(time, seconds)?;

    // radius = 10 + 5 * sin(2π t)
    let pulse = b.add_float_expression(&[
        float_ref(system::CONTINUOUS_SEC),
        TAU,
        MathOperator::Mul.as_float(),
        MathOperator::Sin.as_float(),
        5.0,
        MathOperator::Mul.as_float(),
        10.0,
        MathOperator::Add.as_float(),
    ])?;
    let phase = b.add_float_expression(&[
        float_ref(system::CONTINUOUS_SEC),
        1.0,
        MathOperator::Mod.as_float(),
    ])?;
    let dot = b.add_color_expression(
        ColorSlot::literal(0xFF20_60FF),
        ColorSlot::literal(0xFFFF_6020),
        phase,
    )?;

    let mut text_paint = PaintBundle::new();
    text_paint.color(0xFFFF_FFFF).text_size(48.0).anti_alias(true);
    let mut dot_paint = PaintBundle::new();
    dot_paint.color_id(dot);

    b.add_paint(&text_paint)
        .draw_text_run(time, 40.0, 120.0)
        .add_paint(&dot_paint)
        .draw_circle(360.0, 100.0, pulse);
    Ok(b.finish())
}

fn shapes() -> Result<Vec<u8>> {
    let mut b = DocumentBuilder::new();
    b.header(300, 300, 0).set_root_content_behavior(
        RootContentBehavior::NONE,
        RootContentBehavior::ALIGNMENT_CENTER,
        RootContentBehavior::SIZING_SCALE,
        RootContentBehavior::SCALE_FIT,
    );
    b.add_click_area(1, Some("frame"), 20.0, 20.0, 280.0, 280.0, None)?;

    let triangle = b.add_path_data(&[0.0, 0.0, 40.0, 0.0, 20.0, 35.0])?;
    let spin = b.add_float_expression(&[
        float_ref(system::CONTINUOUS_SEC),
        90.0,
        MathOperator::Mul.as_float(),
    ])?;

    let mut stroke = PaintBundle::new();
    stroke.color(0xFF33_3333).stroke_width(2.0).style(1);
    let mut fill = PaintBundle::new();
    fill.color(0xFF00_AA55).style(0);

    b.add_paint(&stroke)
        .clip_rect(0.0, 0.0, 300.0, 300.0)
        .draw_rect(20.0, 20.0, 280.0, 280.0)
        .matrix_save()
        .matrix_rotate(spin, 150.0, 150.0)
        .add_paint(&fill)
        .draw_circle(80.0, 80.0, 30.0)
        .draw_oval(140.0, 60.0, 240.0, 100.0)
        .draw_round_rect(60.0, 140.0, 140.0, 200.0, 8.0, 8.0)
        .draw_arc(160.0, 140.0, 240.0, 220.0, 0.0, 270.0)
        .draw_line(40.0, 250.0, 260.0, 250.0)
        .matrix_translate(130.0, 220.0)
        .draw_path(triangle, 0.0, 1.0)
        .matrix_restore();
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recompose_player::{FrameClock, PaintCall, Player, PlayerConfig, RecordingCanvas};
    use recompose_wire::OpcodeRegistry;
    use rstest::rstest;

    fn play(demo: Demo, clock: FrameClock) -> (Player, Vec<PaintCall>) {
        let registry = OpcodeRegistry::standard().unwrap();
        let bytes = demo.build().unwrap();
        let mut player = Player::decode(&bytes, &registry, PlayerConfig::default()).unwrap();
        let mut canvas = RecordingCanvas::new();
        let report = player.frame(&clock, &mut canvas).unwrap();
        assert!(report.update.is_clean(), "{:?}", report.update.unresolved);
        assert!(report.replay.failures.is_empty());
        (player, canvas.take_calls())
    }

    #[rstest]
    #[case(Demo::Clock)]
    #[case(Demo::Shapes)]
    fn test_demo_replays_cleanly(#[case] demo: Demo) {
        let (player, calls) = play(demo, FrameClock::default());
        assert!(!calls.is_empty());
        assert!(player.document().header().is_some());
    }

    #[test]
    fn test_clock_shows_time_of_day() {
        let (_, calls) = play(Demo::Clock, FrameClock::at_time_of_day(45_296.0));
        let text = calls.iter().find_map(|call| match call {
            PaintCall::DrawTextRun { text, .. } => Some(text.as_str()),
            _ => None,
        });
        assert_eq!(text, Some("12:34:56"));
    }

    #[test]
    fn test_shapes_balance_save_and_restore() {
        let (_, calls) = play(Demo::Shapes, FrameClock::default());
        let saves = calls.iter().filter(|c| **c == PaintCall::MatrixSave).count();
        let restores = calls.iter().filter(|c| **c == PaintCall::MatrixRestore).count();
        assert_eq!((saves, restores), (1, 1));
    }
}
