use pretty_assertions::assert_eq;
use proptest::prelude::*;
use recompose_wire::core::variables::{float_ref, FIRST_USER_ID};
use recompose_wire::operations::*;
use recompose_wire::{
    ColorSlot, DecodeLimits, DecodeOptions, Document, DocumentBuilder, Opcode, OpcodeRegistry,
    Operation, WireBuffer, WireError,
};

/// One record of every built-in kind
fn every_kind() -> Vec<u8> {
    let mut b = DocumentBuilder::new();
    b.header(640, 480, 1)
        .set_theme(Theme::DARK)
        .set_root_content_behavior(
            RootContentBehavior::SCROLL_VERTICAL,
            RootContentBehavior::ALIGNMENT_CENTER,
            RootContentBehavior::SIZING_SCALE,
            RootContentBehavior::SCALE_FIT,
        );
    b.set_root_content_description("every kind").unwrap();
    b.add_click_area(1, Some("button"), 0.0, 0.0, 10.0, 10.0, None).unwrap();

    let text = b.add_text("label").unwrap();
    let width = b.add_float(12.5).unwrap();
    let sum = b
        .add_float_expression(&[width, 2.0, MathOperator::Add.as_float()])
        .unwrap();
    let color = b
        .add_color_expression(ColorSlot::literal(0xFF0000FF), ColorSlot::literal(0xFFFF0000), 0.5)
        .unwrap();
    let number = b.text_from_float(sum, 3, 1, TextFromFloat::PAD_PRE_ZERO).unwrap();
    let merged = b.text_merge(text, number).unwrap();
    let path = b.add_path_data(&[0.0, 1.0, 2.0, 3.0]).unwrap();
    let bitmap = b.add_bitmap_data(1, 1, &[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
    let shader = b
        .add_shader("half4 main(float2 p) { return half4(1); }", vec![ShaderUniform::float("t", &[sum])])
        .unwrap();

    let mut paint = PaintBundle::new();
    paint.color_id(color).stroke_width(width).shader(shader);
    b.add_paint(&paint)
        .clip_path(path, ClipPath::INTERSECT)
        .clip_rect(0.0, 0.0, 640.0, 480.0)
        .matrix_save()
        .matrix_scale(2.0, 2.0, 0.0, 0.0)
        .matrix_translate(1.0, -1.0)
        .matrix_skew(0.1, 0.0)
        .matrix_rotate(45.0, 10.0, 10.0)
        .draw_arc(0.0, 0.0, 10.0, 10.0, 0.0, 90.0)
        .draw_circle(10.0, 20.0, sum)
        .draw_line(0.0, 0.0, 5.0, 5.0)
        .draw_oval(0.0, 0.0, 4.0, 2.0)
        .draw_rect(1.0, 2.0, 3.0, 4.0)
        .draw_round_rect(0.0, 0.0, 8.0, 8.0, 2.0, 2.0)
        .draw_path(path, 0.0, 1.0)
        .draw_tween_path(path, path, 0.5, 0.0, 1.0)
        .draw_text_run(merged, 5.0, 5.0)
        .draw_text_anchored(merged, 5.0, 5.0, 0.0, 0.0, AnchorFlags::MONOSPACE_MEASURE)
        .draw_text_on_path(text, path, 0.0, 0.0)
        .draw_bitmap(bitmap, 0.0, 0.0, 1.0, 1.0, 0)
        .draw_bitmap_int(bitmap, [0, 0, 1, 1], [0, 0, 2, 2], 0)
        .matrix_restore();
    b.finish()
}

#[test]
fn test_every_kind_round_trips_byte_exact() {
    let registry = OpcodeRegistry::standard().unwrap();
    let bytes = every_kind();
    let document = Document::decode(&bytes, &registry).unwrap();
    assert_eq!(document.encode(), bytes);

    let mut seen: Vec<u32> = document.iter().map(|op| op.opcode()).collect();
    seen.sort_unstable();
    seen.dedup();
    let mut all: Vec<u32> = Opcode::ALL.iter().map(|op| op.raw()).collect();
    all.sort_unstable();
    assert_eq!(seen, all);
}

#[test]
fn test_declared_ids_are_user_range() {
    let registry = OpcodeRegistry::standard().unwrap();
    let document = Document::decode(&every_kind(), &registry).unwrap();
    let text = document
        .iter()
        .find_map(|op| op.downcast_ref::<TextData>())
        .unwrap();
    assert_eq!(text.id, FIRST_USER_ID);
}

#[test]
fn test_max_length_string_accepted_and_one_more_rejected() {
    let registry = OpcodeRegistry::standard().unwrap();
    let limits = DecodeLimits::default();

    let mut buffer = WireBuffer::new();
    TextData::new(42, "x".repeat(limits.max_string_len)).write(&mut buffer);
    let document = Document::decode(&buffer.into_bytes(), &registry).unwrap();
    let text = document.operations()[0].downcast_ref::<TextData>().unwrap();
    assert_eq!(text.text.len(), limits.max_string_len);

    let mut buffer = WireBuffer::new();
    TextData::new(42, "x".repeat(limits.max_string_len + 1)).write(&mut buffer);
    let err = Document::decode(&buffer.into_bytes(), &registry).unwrap_err();
    assert!(matches!(err, WireError::LimitExceeded { kind: "string", .. }));
}

#[test]
fn test_blob_limit_is_configurable() {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    BitmapData::new(1, 4, 4, vec![0; 64]).write(&mut buffer);
    let bytes = buffer.into_bytes();

    let options =
        DecodeOptions::default().with_limits(DecodeLimits::default().with_max_blob_len(63));
    assert!(Document::decode_with(&bytes, &registry, &options).is_err());
    assert!(Document::decode(&bytes, &registry).is_ok());
}

#[test]
fn test_variable_reference_survives_round_trip() {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    DrawCircle::new(float_ref(43), 0.0, -0.0).write(&mut buffer);
    let document = Document::decode(&buffer.into_bytes(), &registry).unwrap();
    let circle = document.operations()[0].downcast_ref::<DrawCircle>().unwrap();
    assert_eq!(circle.center_x.variable_id(), Some(43));
    assert_eq!(circle.radius.raw().to_bits(), (-0.0f32).to_bits());
}

fn decode_single<T: Operation>(op: &T) -> Document {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    op.write(&mut buffer);
    Document::decode(&buffer.into_bytes(), &registry).unwrap()
}

proptest! {
    #[test]
    fn prop_rect_floats_bit_exact(bits in proptest::array::uniform4(any::<u32>())) {
        let [l, t, r, b] = bits.map(f32::from_bits);
        let rect = DrawRect::new(l, t, r, b);
        let document = decode_single(&rect);
        let decoded = document.operations()[0].downcast_ref::<DrawRect>().unwrap();
        prop_assert_eq!(decoded, &rect);
        prop_assert_eq!(decoded.left.raw().to_bits(), bits[0]);
    }

    #[test]
    fn prop_text_round_trip(text in "\\PC{0,200}", id in FIRST_USER_ID..1000u32) {
        let data = TextData::new(id, text.clone());
        let document = decode_single(&data);
        let decoded = document.operations()[0].downcast_ref::<TextData>().unwrap();
        prop_assert_eq!(&decoded.text, &text);
        prop_assert_eq!(decoded.id, id);
    }

    #[test]
    fn prop_path_data_round_trip(data in proptest::collection::vec(any::<f32>(), 0..64)) {
        let path = PathData::new(7, data);
        let document = decode_single(&path);
        let decoded = document.operations()[0].downcast_ref::<PathData>().unwrap();
        prop_assert_eq!(decoded, &path);
    }
}
