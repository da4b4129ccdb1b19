use progressctl::client::{
    combined_progress_parts, encode_multipart, PayloadPart, SUPPORTING_FILES_FIELD,
};
use progressctl::update::{ActiveUpdateFlags, AttachedFile, BillDetails, FileKind, ProposedUpdate};

fn draft() -> ProposedUpdate {
    ProposedUpdate {
        progress: Some(45.0),
        new_bill_amount: Some(250_000.0),
        remarks: "work resumed after monsoon".to_string(),
        bill_details: BillDetails {
            bill_number: Some("RB-2".to_string()),
            bill_date: Some("2024-03-12".to_string()),
            bill_description: Some("second running bill".to_string()),
        },
    }
}

#[test]
fn physical_only_payload_omits_every_financial_field() {
    let parts =
        combined_progress_parts(&draft(), ActiveUpdateFlags::physical_only(), &[]).expect("parts");
    let names: Vec<_> = parts.iter().map(PayloadPart::name).collect();
    assert!(names.contains(&"progress"));
    assert!(!names.contains(&"newBillAmount"));
    assert!(!names.contains(&"billDetails"));
}

#[test]
fn financial_only_payload_omits_the_progress_field() {
    let parts =
        combined_progress_parts(&draft(), ActiveUpdateFlags::financial_only(), &[]).expect("parts");
    let names: Vec<_> = parts.iter().map(PayloadPart::name).collect();
    assert!(!names.contains(&"progress"));
    assert!(names.contains(&"newBillAmount"));
    assert!(names.contains(&"billDetails"));
}

#[test]
fn empty_remarks_produce_no_remarks_part() {
    let mut quiet = draft();
    quiet.remarks = "   ".to_string();
    let parts =
        combined_progress_parts(&quiet, ActiveUpdateFlags::physical_only(), &[]).expect("parts");
    assert!(parts.iter().all(|p| p.name() != "remarks"));
}

#[test]
fn every_attached_file_is_sent_under_the_supporting_files_field() {
    let files = vec![
        AttachedFile::new("mb-entry.pdf", FileKind::Pdf, vec![1; 16]),
        AttachedFile::new("site-photo.jpg", FileKind::Image, vec![2; 16]),
        AttachedFile::new("abstract.xlsx", FileKind::Excel, vec![3; 16]),
    ];
    let both = ActiveUpdateFlags {
        physical: true,
        financial: true,
    };
    let parts = combined_progress_parts(&draft(), both, &files).expect("parts");
    let file_count = parts
        .iter()
        .filter(|p| p.name() == SUPPORTING_FILES_FIELD)
        .count();
    assert_eq!(file_count, 3);
}

#[test]
fn encoded_body_frames_text_json_and_file_parts() {
    let files = vec![AttachedFile::new("mb.pdf", FileKind::Pdf, b"%PDF-1.4".to_vec())];
    let parts = combined_progress_parts(&draft(), ActiveUpdateFlags::financial_only(), &files)
        .expect("parts");
    let encoded = encode_multipart(&parts).expect("encode");

    assert!(encoded
        .content_type
        .starts_with("multipart/form-data; boundary="));
    let text = String::from_utf8_lossy(&encoded.body);
    assert!(text.contains("name=\"newBillAmount\"\r\n\r\n250000"));
    assert!(text.contains("name=\"billDetails\"\r\nContent-Type: application/json"));
    assert!(text.contains("\"billNumber\":\"RB-2\""));
    assert!(text.contains(
        "name=\"supportingFiles\"; filename=\"mb.pdf\"\r\nContent-Type: application/pdf"
    ));
    assert!(text.contains("%PDF-1.4"));
}

#[test]
fn boundaries_differ_between_encodings() {
    let parts =
        combined_progress_parts(&draft(), ActiveUpdateFlags::physical_only(), &[]).expect("parts");
    let first = encode_multipart(&parts).expect("first");
    let second = encode_multipart(&parts).expect("second");
    assert_ne!(first.content_type, second.content_type);
}
