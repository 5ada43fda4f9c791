use pretty_assertions::assert_eq;
use recompose_player::{
    FrameClock, PaintCall, Player, PlayerConfig, PlayerError, RecordingCanvas, ReplayFailurePolicy,
};
use recompose_wire::operations::*;
use recompose_wire::{Document, DocumentBuilder, OpcodeRegistry, Operation, WireBuffer, WireError};

fn encode(ops: &[&dyn Operation]) -> Vec<u8> {
    let mut buffer = WireBuffer::new();
    for op in ops {
        op.write(&mut buffer);
    }
    buffer.into_bytes()
}

fn three_shapes() -> Vec<u8> {
    encode(&[
        &DrawRect::new(0.0, 0.0, 10.0, 10.0),
        &DrawLine::new(0.0, 0.0, 5.0, 5.0),
        &DrawCircle::new(1.0, 2.0, 3.0),
    ])
}

fn player(bytes: &[u8], config: PlayerConfig) -> Player {
    let registry = OpcodeRegistry::standard().unwrap();
    Player::decode(bytes, &registry, config).unwrap()
}

#[test]
fn test_save_circle_restore_end_to_end() {
    let bytes = encode(&[
        &MatrixSave::new(),
        &DrawCircle::new(10.0, 20.0, 5.0),
        &MatrixRestore::new(),
    ]);
    let registry = OpcodeRegistry::standard().unwrap();
    let document = Document::decode(&bytes, &registry).unwrap();
    assert_eq!(document.len(), 3);
    assert_eq!(
        document.iter().map(|op| op.name()).collect::<Vec<_>>(),
        ["MatrixSave", "DrawCircle", "MatrixRestore"]
    );

    let mut player = Player::attach(document, PlayerConfig::default()).unwrap();
    let mut canvas = RecordingCanvas::new();
    let report = player.frame(&FrameClock::default(), &mut canvas).unwrap();

    assert_eq!(
        canvas.calls(),
        &[
            PaintCall::MatrixSave,
            PaintCall::DrawCircle(10.0, 20.0, 5.0),
            PaintCall::MatrixRestore,
        ]
    );
    assert_eq!(report.replay.painted, 3);
    assert_eq!(canvas.save_depth(), 0);
    assert_eq!(player.frame_count(), 1);
}

#[test]
fn test_abort_frame_skips_remaining_operations() {
    let mut player = player(&three_shapes(), PlayerConfig::default());
    let mut canvas = RecordingCanvas::new().fail_on("draw_line");

    let err = player.frame(&FrameClock::default(), &mut canvas).unwrap_err();
    match err {
        PlayerError::Paint { index, name, source } => {
            assert_eq!((index, name), (1, "DrawLine"));
            assert_eq!(source.call, "draw_line");
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(canvas.calls(), &[PaintCall::DrawRect(0.0, 0.0, 10.0, 10.0)]);
    assert_eq!(player.frame_count(), 0);
}

#[test]
fn test_continue_and_report_attempts_everything() {
    let config = PlayerConfig::default().with_failure_policy(ReplayFailurePolicy::ContinueAndReport);
    let mut player = player(&three_shapes(), config);
    let mut canvas = RecordingCanvas::new().fail_on("draw_line").fail_on("draw_circle");

    let report = player.frame(&FrameClock::default(), &mut canvas).unwrap();
    let failed: Vec<(usize, &str)> = report
        .replay
        .failures
        .iter()
        .map(|failure| (failure.index, failure.name))
        .collect();
    assert_eq!(failed, [(1, "DrawLine"), (2, "DrawCircle")]);
    assert_eq!(report.replay.painted, 1);
    assert_eq!(report.replay.applied, 3);
    assert_eq!(canvas.calls().len(), 1);
}

#[test]
fn test_replay_order_survives_failure() {
    let config = PlayerConfig::default().with_failure_policy(ReplayFailurePolicy::ContinueAndReport);
    let bytes = encode(&[
        &MatrixRestore::new(),
        &MatrixSave::new(),
        &DrawOval::new(0.0, 0.0, 2.0, 1.0),
        &MatrixRestore::new(),
    ]);
    let mut player = player(&bytes, config);
    let mut canvas = RecordingCanvas::new();

    let report = player.frame(&FrameClock::default(), &mut canvas).unwrap();
    assert_eq!(report.replay.failures.len(), 1);
    assert_eq!(report.replay.failures[0].index, 0);
    assert_eq!(
        canvas.calls(),
        &[
            PaintCall::MatrixSave,
            PaintCall::DrawOval(0.0, 0.0, 2.0, 1.0),
            PaintCall::MatrixRestore,
        ]
    );
}

#[test]
fn test_incompatible_header_is_rejected() {
    let mut header = Header::new(100, 100, 0);
    header.major += 1;
    let bytes = encode(&[&header, &MatrixSave::new()]);
    let registry = OpcodeRegistry::standard().unwrap();
    let err = Player::decode(&bytes, &registry, PlayerConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::Wire(WireError::InvalidField {
            operation: "Header",
            ..
        })
    ));
}

#[test]
fn test_decode_errors_surface_through_player() {
    let registry = OpcodeRegistry::standard().unwrap();
    let bytes = three_shapes();
    let err = Player::decode(&bytes[..bytes.len() - 1], &registry, PlayerConfig::default()).unwrap_err();
    match err {
        PlayerError::Wire(wire) => assert!(wire.is_malformed_stream()),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_replay_records_document_properties() {
    let mut b = DocumentBuilder::new();
    b.header(320, 240, 0).set_theme(Theme::DARK);
    b.add_click_area(7, Some("ok"), 1.0, 2.0, 3.0, 4.0, None).unwrap();
    b.draw_rect(0.0, 0.0, 1.0, 1.0);
    let mut player = player(&b.finish(), PlayerConfig::default());

    player.frame(&FrameClock::default(), &mut RecordingCanvas::new()).unwrap();
    let properties = player.context().properties();
    assert_eq!(properties.theme, Some(Theme::DARK));
    assert_eq!(properties.header.map(|h| (h.width, h.height)), Some((320, 240)));
    assert_eq!(properties.click_areas.len(), 1);
    assert_eq!(properties.click_areas[0].id, 7);
}

#[test]
fn test_assets_are_loaded_before_use() {
    let mut b = DocumentBuilder::new();
    let path = b.add_path_data(&[0.0, 0.0, 10.0, 10.0]).unwrap();
    let mut paint = PaintBundle::new();
    paint.color(0xFF00FF00).stroke_width(3.0);
    b.add_paint(&paint).draw_path(path, 0.0, 1.0);
    let mut player = player(&b.finish(), PlayerConfig::default());
    let mut canvas = RecordingCanvas::new();

    player.frame(&FrameClock::default(), &mut canvas).unwrap();
    let names: Vec<&str> = canvas.calls().iter().map(PaintCall::name).collect();
    assert_eq!(names, ["load_path", "apply_paint", "draw_path"]);
    assert_eq!(
        canvas.calls()[2],
        PaintCall::DrawPath {
            path_id: path,
            start: 0.0,
            end: 1.0
        }
    );
}
