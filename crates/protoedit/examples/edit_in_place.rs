//! Builds a small address book, edits it in place and dumps the result.
//!
//! Run with `cargo run --example edit_in_place [name]`.

use protoedit::{
    CheckOptions, Descriptor, Encoder, Field, FieldDescriptor, FieldType, Journal, Label, Message,
    Value,
};

static PERSON_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new(1, "name", FieldType::String, Label::Required),
    FieldDescriptor::new(2, "id", FieldType::Uint32, Label::Optional),
    FieldDescriptor::new(3, "email", FieldType::String, Label::Optional),
];
static PERSON: Descriptor = Descriptor::new(&PERSON_FIELDS);

static BOOK_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(1, "title", FieldType::String, Label::Optional),
    FieldDescriptor::new(2, "people", FieldType::Message, Label::Repeated).with_message(&PERSON),
];
static BOOK: Descriptor = Descriptor::new(&BOOK_FIELDS);

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

fn format_value(value: &Value<'_>) -> String {
    match value {
        Value::String(text) => format!("{text:?}"),
        Value::Bytes(bytes) => format!("BYTES[{}]", bytes.len()),
        other => format!("{other:?}"),
    }
}

fn dump(message: &Message<'_, '_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut cursor = message.cursor(0);
    while cursor.error().is_none() {
        let Some(field) = cursor.field_descriptor() else {
            println!("{indent}#{} (unknown)", cursor.tag());
            cursor.next();
            continue;
        };
        let part = cursor.part().expect("cursor is positioned");
        if field.is_message() {
            println!("{indent}{} @{}..{} {{", field.name, part.start(), part.end());
            let child = Message::from_cursor(&cursor).expect("submessage");
            dump(&child, depth + 1);
            println!("{indent}}}");
        } else {
            let value = cursor.get().expect("scalar value");
            println!(
                "{indent}{} @{}..{} = {}",
                field.name,
                part.start(),
                part.end(),
                format_value(&value)
            );
        }
        cursor.next();
    }
}

fn main() {
    let name = std::env::args().nth(1).unwrap_or_else(|| "Grace".to_string());

    let mut ada = Encoder::new(&PERSON);
    ada.encode(1, &Value::String("Ada".into())).expect("encode name");
    ada.encode(2, &Value::Uint32(1)).expect("encode id");
    let mut book = Encoder::new(&BOOK);
    book.encode_message(2, &ada).expect("encode person");

    println!("Encoded: {}", hex(book.as_bytes()));
    let journal = Journal::new(book.as_bytes()).expect("Failed to copy buffer");
    let mut root = Message::new(&journal, &BOOK);

    // Keep a view on Ada's id while the buffer changes around it
    let first = Message::from_cursor(&root.cursor(2)).expect("first person");
    let mut id = Field::from_cursor(&first.cursor(2)).expect("id field");

    root.put(1, &Value::String("Contacts".into())).expect("put title");
    let mut other = root.create_within(2).expect("new person");
    other.put(1, &Value::String(name.into())).expect("put name");
    other.put(2, &Value::Uint32(2)).expect("put id");
    id.put(&Value::Uint32(1815)).expect("put id");

    println!("Edited:  {}", hex(&journal.data()));
    println!("Journal: {} entries", journal.version());
    for index in 0..journal.version() {
        if let Some(entry) = journal.entry(index) {
            println!("  {entry:?}");
        }
    }

    println!("\n=== Contents ===");
    dump(&root, 0);

    match root.check(&CheckOptions::strict()) {
        Ok(()) => println!("\nValid"),
        Err(err) => println!("\nInvalid: {err}"),
    }
}
