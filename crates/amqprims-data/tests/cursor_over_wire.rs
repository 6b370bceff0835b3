use amqprims_data::{decode_data, encode_data, Data, DataType};
use bytes::BytesMut;

fn annotations() -> Data {
    let mut data = Data::new();
    data.put_map();
    data.enter();
    data.put_symbol("x-opt-jms-dest");
    data.put_int(1);
    data.put_symbol("x-opt-topic");
    data.put_string("sports/news");
    data.put_ulong(42);
    data.put_binary(vec![0xde, 0xad]);
    data.exit();
    data.rewind();
    data
}

#[test]
fn cursor_reads_decoded_map_in_wire_order() {
    let mut wire = BytesMut::new();
    encode_data(&annotations(), &mut wire).unwrap();

    let mut data = decode_data(&mut wire.freeze()).unwrap();
    assert!(data.next());
    assert_eq!(data.data_type(), Some(DataType::Map));
    assert_eq!(data.get_map(), 6);
    assert!(data.enter());

    let mut seen = Vec::new();
    while data.next() {
        seen.push(data.data_type().unwrap());
    }
    assert_eq!(
        seen,
        vec![
            DataType::Symbol,
            DataType::Int,
            DataType::Symbol,
            DataType::String,
            DataType::ULong,
            DataType::Binary,
        ]
    );
}

#[test]
fn rewound_stream_reads_identically_twice() {
    let mut data = annotations();
    let mut first = Vec::new();
    let mut second = Vec::new();

    for pass in [&mut first, &mut second] {
        let mut guard = data.scoped();
        guard.next();
        guard.enter();
        while guard.next() {
            pass.push(guard.data_type());
        }
    }

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[test]
fn empty_stream_encodes_to_nothing() {
    let mut wire = BytesMut::new();
    encode_data(&Data::new(), &mut wire).unwrap();
    assert!(wire.is_empty());

    let data = decode_data(&mut wire.freeze()).unwrap();
    assert!(data.is_empty());
}
