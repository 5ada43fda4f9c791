use pretty_assertions::assert_eq;
use recompose_wire::operations::*;
use recompose_wire::{
    DecodeOptions, Document, Opcode, OpcodeRegistry, Operation, RecordShape, WireBuffer,
    WireError, WireReader,
};
use rstest::rstest;

/// Encode operations and remember the byte offset after each record
fn encode_with_boundaries(ops: &[&dyn Operation]) -> (Vec<u8>, Vec<usize>) {
    let mut buffer = WireBuffer::new();
    let mut boundaries = vec![0];
    for op in ops {
        op.write(&mut buffer);
        boundaries.push(buffer.len());
    }
    (buffer.into_bytes(), boundaries)
}

fn mixed_stream() -> (Vec<u8>, Vec<usize>) {
    encode_with_boundaries(&[
        &Header::new(10, 10, 0),
        &TextData::new(42, "clock"),
        &FloatConstant::new(43, 1.5),
        &MatrixSave::new(),
        &DrawCircle::new(10.0, 20.0, 5.0),
        &PathData::new(1, vec![0.0, 1.0]),
        &MatrixRestore::new(),
    ])
}

#[test]
fn test_three_record_stream_decodes_in_order() {
    let registry = OpcodeRegistry::standard().unwrap();
    let (bytes, _) = encode_with_boundaries(&[
        &MatrixSave::new(),
        &DrawCircle::new(10.0, 20.0, 5.0),
        &MatrixRestore::new(),
    ]);
    let document = Document::decode(&bytes, &registry).unwrap();
    assert_eq!(document.len(), 3);

    let ops = document.operations();
    assert!(ops[0].is::<MatrixSave>());
    let circle = ops[1].downcast_ref::<DrawCircle>().unwrap();
    assert_eq!(
        (circle.center_x.get(), circle.center_y.get(), circle.radius.get()),
        (10.0, 20.0, 5.0)
    );
    assert!(ops[2].is::<MatrixRestore>());
}

#[test]
fn test_n_records_yield_n_operations() {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    for i in 0..500 {
        DrawLine::new(i as f32, 0.0, 0.0, i as f32).write(&mut buffer);
    }
    let document = Document::decode(&buffer.into_bytes(), &registry).unwrap();
    assert_eq!(document.len(), 500);
    for (i, op) in document.iter().enumerate() {
        let line = op.downcast_ref::<DrawLine>().unwrap();
        assert_eq!(line.x1.get(), i as f32);
    }
}

#[test]
fn test_truncation_inside_a_record_is_malformed() {
    let registry = OpcodeRegistry::standard().unwrap();
    let (bytes, boundaries) = mixed_stream();

    for cut in 0..bytes.len() {
        let result = Document::decode(&bytes[..cut], &registry);
        match boundaries.iter().position(|b| *b == cut) {
            // A cut on a record boundary is a shorter, valid stream
            Some(records) => assert_eq!(result.unwrap().len(), records, "cut at {cut}"),
            None => {
                let err = result.unwrap_err();
                assert!(err.is_malformed_stream(), "cut at {cut}: {err}");
            }
        }
    }
}

#[test]
fn test_trailing_payload_is_length_mismatch() {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    buffer.start_sized(Opcode::DATA_TEXT.raw());
    buffer.write_u32(42);
    buffer.write_utf8("abc");
    buffer.write_u8(0);
    let err = Document::decode(&buffer.into_bytes(), &registry).unwrap_err();
    assert!(matches!(
        err,
        WireError::LengthMismatch {
            opcode: 102,
            declared: 12,
            consumed: 11,
            ..
        }
    ));
}

#[rstest]
#[case(1)]
#[case(99)]
#[case(0x7FFF_FFFF)]
fn test_unregistered_lookup_is_none(#[case] opcode: u32) {
    let registry = OpcodeRegistry::standard().unwrap();
    assert!(registry.lookup(opcode).is_none());
}

#[test]
fn test_lookup_returns_matching_decoder() {
    let registry = OpcodeRegistry::standard().unwrap();
    for opcode in Opcode::ALL {
        let entry = registry.lookup(opcode.raw()).unwrap();
        assert_eq!(entry.opcode, opcode.raw());
    }
    assert_eq!(registry.lookup(46).unwrap().shape, RecordShape::Fixed(12));
    assert_eq!(registry.lookup(102).unwrap().shape, RecordShape::Sized);
}

#[test]
fn test_unknown_opcode_mid_stream() {
    let registry = OpcodeRegistry::standard().unwrap();
    let mut buffer = WireBuffer::new();
    MatrixSave::new().write(&mut buffer);
    let offset = buffer.len();
    buffer.start_sized(4242);
    buffer.write_i32(7);
    MatrixRestore::new().write(&mut buffer);
    let bytes = buffer.into_bytes();

    let err = Document::decode(&bytes, &registry).unwrap_err();
    assert_eq!(err, WireError::UnknownOpcode { opcode: 4242, offset });
    assert!(!err.is_malformed_stream());

    let document = Document::decode_with(&bytes, &registry, &DecodeOptions::lenient()).unwrap();
    assert_eq!(document.len(), 2);
}

#[test]
fn test_custom_decoder_may_expand_into_several_operations() {
    fn expand(
        reader: &mut WireReader<'_>,
        operations: &mut Vec<Box<dyn Operation>>,
    ) -> recompose_wire::Result<()> {
        let count = reader.read_u32()?;
        for _ in 0..count {
            operations.push(Box::new(MatrixSave::new()));
        }
        Ok(())
    }

    let mut registry = OpcodeRegistry::standard().unwrap();
    registry
        .register(5000, "SaveMany", RecordShape::Fixed(4), expand)
        .unwrap();

    let mut buffer = WireBuffer::new();
    buffer.start(5000);
    buffer.write_u32(3);
    buffer.start(5000);
    buffer.write_u32(0);
    let document = Document::decode(&buffer.into_bytes(), &registry).unwrap();
    assert_eq!(document.len(), 3);
}

#[test]
fn test_disassembly_listing() {
    let registry = OpcodeRegistry::standard().unwrap();
    let (bytes, _) = encode_with_boundaries(&[
        &MatrixSave::new(),
        &DrawCircle::new(10.0, 20.0, 5.0),
        &MatrixRestore::new(),
    ]);
    let document = Document::decode(&bytes, &registry).unwrap();
    assert_eq!(
        document.deep_to_string("  "),
        "  MatrixSave\n  DrawCircle 10, 20, 5\n  MatrixRestore\n"
    );
}
