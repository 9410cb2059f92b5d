// example/src/main.rs

use brine_layout::*;
use serde_json::json;

const SCHEMA: &str = r#"{
    "SensorFrame": [
        { "type": "u8",      "name": "sensor_id" },
        { "type": "Reading", "name": "readings", "counts": 3 },
        { "type": "u16",     "name": "crc" }
    ],
    "Reading": [
        { "type": "u32",   "name": "timestamp" },
        { "type": "float", "name": "value" },
        { "type": "bool",  "name": "valid" }
    ]
}"#;

fn main() -> Result<(), LayoutError> {
    // Elaborate with the default C-compatible options.
    let report = compile(SCHEMA, &LayoutOptions::default())?;
    for diagnostic in &report.diagnostics {
        println!("{}", diagnostic);
    }
    let layout = report.into_value();

    for record in layout.records() {
        println!("{} (size {}, align {})", record.name, record.size, record.align);
        for member in &record.members {
            println!(
                "  {:>3}  {:<12} {:<8} {:?}",
                member.offset, member.name, member.type_name, member.counts
            );
        }
    }

    // Build a value directly, one reading short; the codec zero-fills it.
    let mut reading = Value::object();
    reading.set("timestamp", Value::U32(1_700_000_000));
    reading.set("value", Value::Float(21.5));
    reading.set("valid", Value::Bool(true));

    let mut frame = Value::object();
    frame.set("sensor_id", Value::U8(4));
    frame.set("readings", Value::Array(vec![reading.clone(), reading]));
    frame.set("crc", Value::U16(0xbeef));

    let encoded = layout.encode("SensorFrame", &frame)?;
    for warning in encoded.warnings() {
        println!("{}", warning);
    }
    println!("encoded {} bytes: {:02x?}", encoded.value.len(), encoded.value);

    let decoded = layout.decode("SensorFrame", &encoded.value)?;
    println!("crc = {:?}", decoded.get("crc"));
    println!("{}", decode_to_json(&layout, "SensorFrame", &encoded.value)?);

    // The same frame from JSON, big-endian.
    let big = compile(SCHEMA, &LayoutOptions { big_endian: true, ..LayoutOptions::default() })?.value;
    let input = json!({ "sensor_id": 4, "readings": [], "crc": 48879 });
    let bytes = encode_json(&big, "SensorFrame", &input)?.value;
    println!("big-endian crc bytes: {:02x?}", &bytes[bytes.len() - 4..bytes.len() - 2]);

    println!("{}", compile_layout_to_c(&layout));
    Ok(())
}
