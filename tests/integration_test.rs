use fxgraph::batch::convert_file;
use fxgraph::checksum::{self, CHECKSUM_OFFSET, CHECKSUM_START};
use fxgraph::container::ContainerError;
use fxgraph::directory::BUILTIN_TABLE;
use fxgraph::preset::CHUNK_MAGIC;
use fxgraph::scanner::{self, ScanError};
use fxgraph::{ConversionService, FileKind, PluginDirectory, PresetBlob, TemplateSet};
use proptest::prelude::*;
use tempfile::tempdir;

fn synth_directory() -> PluginDirectory {
    PluginDirectory::from_json(r#"{"abcd": "SynthX"}"#, "test").unwrap()
}

fn service() -> ConversionService {
    ConversionService::new(TemplateSet::builtin(), synth_directory())
}

/// 24-byte reference blob: CcnK, size, kind, version, id, 4 payload bytes.
fn sample_blob(kind: &[u8; 4], version: [u8; 4], id: &[u8; 4]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(CHUNK_MAGIC);
    v.extend_from_slice(&[0, 0, 0, 0]);
    v.extend_from_slice(kind);
    v.extend_from_slice(&version);
    v.extend_from_slice(id);
    v.extend_from_slice(&[0, 0, 0, 0]);
    v
}

/// Position of the first zero-terminated occurrence of `text`.
fn find_cstr(hay: &[u8], text: &str) -> Option<usize> {
    let mut needle = text.as_bytes().to_vec();
    needle.push(0);
    hay.windows(needle.len()).position(|w| w == needle.as_slice())
}

fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

fn read_u64_le(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(buf[at..at + 8].try_into().unwrap())
}

#[test]
fn test_end_to_end_sample() {
    let s = service();
    let input = sample_blob(b"FPCh", [0, 0, 0, 0], b"abcd");
    assert_eq!(input.len(), 24);

    let graph = s.convert(input.clone(), FileKind::Program, "Test").unwrap();
    assert_eq!(graph.kind, FileKind::Graph);
    let c = &graph.bytes;

    // displayName and nodeName both present, in that order, around the blob.
    let first = find_cstr(c, "Test (SynthX)").unwrap();
    let tag = find_cstr(c, r#"<PLUGIN file="SynthX.dll"/>"#).unwrap();
    let p = scanner::find_first(c, CHUNK_MAGIC, 0).unwrap();
    let last = find_cstr(&c[p..], "Test (SynthX)").unwrap() + p;
    assert!(first < tag && tag < p && p < last);

    // 07 00 marker and length field directly precede the blob.
    let blob_start = p - 4;
    assert_eq!(&c[blob_start - 10..blob_start - 8], &[0x07, 0x00]);

    let back = s.convert(graph.bytes.clone(), FileKind::Graph, "").unwrap();
    assert_eq!(back.kind, FileKind::Program);
    assert_eq!(back.bytes.len(), 24);
    let mut patched = input;
    patched[12..16].copy_from_slice(&[0, 0, 0, 1]);
    assert_eq!(back.bytes, patched);
}

#[test]
fn test_unknown_plugin_encodes_with_empty_fields() {
    let dir = synth_directory();
    assert_eq!(dir.resolve_name("zzzz"), "");

    let s = ConversionService::new(TemplateSet::builtin(), dir);
    let out = s.convert(sample_blob(b"FxBk", [0; 4], b"zzzz"), FileKind::Bank, "Pad").unwrap();
    assert!(find_cstr(&out.bytes, r#"<PLUGIN file=""/>"#).is_some());
    assert!(find_cstr(&out.bytes, "Pad ()").is_some());
    assert!(checksum::verify(&out.bytes));
}

#[test]
fn test_directory_override_precedence() {
    let mut dir = PluginDirectory::from_json(r#"{"abcd": "Foo"}"#, "base").unwrap();
    dir.merge(PluginDirectory::from_json(r#"{"abcd": "Bar"}"#, "override").unwrap());
    assert_eq!(dir.resolve_name("abcd"), "Bar");
}

#[test]
fn test_override_file_feeds_encoder() {
    let tmp = tempdir().unwrap();
    let table = tmp.path().join("plugins.json");
    std::fs::write(&table, r#"{"abcd": "SynthX", "": ""}"#).unwrap();

    let dir = PluginDirectory::load(BUILTIN_TABLE, Some(&table), true).unwrap();
    let s = ConversionService::new(TemplateSet::builtin(), dir);
    let out = s.convert(sample_blob(b"FPCh", [0; 4], b"abcd"), FileKind::Program, "Lead").unwrap();
    assert!(find_cstr(&out.bytes, "Lead (SynthX)").is_some());

    let rewritten = std::fs::read_to_string(&table).unwrap();
    assert!(!rewritten.contains(r#""": "#));
    assert!(rewritten.contains(r#""abcd": "SynthX""#));
}

#[test]
fn test_scanner_not_found() {
    let err = ScanError::SignatureNotFound { pattern: *CHUNK_MAGIC };
    assert_eq!(scanner::find_first(&[0u8; 64], CHUNK_MAGIC, 0), Err(err.clone()));
    assert_eq!(scanner::find_first(b"Ccn", CHUNK_MAGIC, 0), Err(err));
}

#[test]
fn test_foreign_container_reports_signature_not_found() {
    let s = service();
    let err = s.decoder().decode(b"RIFF....WAVEfmt this is not a graph").unwrap_err();
    assert!(matches!(err, ContainerError::Scan(ScanError::SignatureNotFound { .. })));
}

#[test]
fn test_file_roundtrip_through_disk() {
    let tmp = tempdir().unwrap();
    let s = service();

    let bank = tmp.path().join("Strings.fxb");
    std::fs::write(&bank, sample_blob(b"FBCh", [0, 0, 0, 2], b"abcd")).unwrap();

    let graph = convert_file(&s, &bank, None).unwrap();
    assert_eq!(graph, tmp.path().join("Strings.fxgraph"));
    let bytes = std::fs::read(&graph).unwrap();
    assert!(find_cstr(&bytes, "Strings (SynthX)").is_some());

    std::fs::remove_file(&bank).unwrap();
    let restored = convert_file(&s, &graph, None).unwrap();
    assert_eq!(restored, bank);
    assert_eq!(
        std::fs::read(&restored).unwrap(),
        sample_blob(b"FBCh", [0, 0, 0, 1], b"abcd")
    );
}

#[test]
fn test_substituted_templates() {
    let tmp = tempdir().unwrap();
    std::fs::write(tmp.path().join("header1.bin"), vec![0x5A; 48]).unwrap();
    std::fs::write(tmp.path().join("header2.bin"), b"").unwrap();
    std::fs::write(tmp.path().join("footer1.bin"), b"--").unwrap();
    std::fs::write(tmp.path().join("footer2.bin"), b"END").unwrap();

    let templates = TemplateSet::load_dir(tmp.path()).unwrap();
    let s = ConversionService::new(templates, synth_directory());
    let out = s.convert(sample_blob(b"FPCh", [0; 4], b"abcd"), FileKind::Program, "T").unwrap();

    assert!(out.bytes.ends_with(b"--T (SynthX)\0END"));
    assert_eq!(&out.bytes[..CHECKSUM_OFFSET], &[0x5A; CHECKSUM_OFFSET][..]);
    assert_eq!(&out.bytes[CHECKSUM_START..48], &[0x5A; 48 - CHECKSUM_START][..]);
    assert!(checksum::verify(&out.bytes));
}

fn kind_tag() -> impl Strategy<Value = [u8; 4]> {
    prop_oneof![
        Just(*b"FPCh"),
        Just(*b"FxCk"),
        Just(*b"FxBk"),
        Just(*b"FBCh"),
        any::<[u8; 4]>(),
    ]
}

/// A blob with arbitrary header fields and payload, chunk magic in front.
fn arb_blob() -> impl Strategy<Value = Vec<u8>> {
    (
        any::<[u8; 4]>(),
        kind_tag(),
        any::<[u8; 4]>(),
        any::<[u8; 4]>(),
        proptest::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(|(size, kind, version, id, payload)| {
            let mut v = CHUNK_MAGIC.to_vec();
            v.extend_from_slice(&size);
            v.extend_from_slice(&kind);
            v.extend_from_slice(&version);
            v.extend_from_slice(&id);
            v.extend_from_slice(&payload);
            v
        })
}

proptest! {
    #[test]
    fn prop_checksum_invariant(blob in arb_blob(), name in "[A-Za-z0-9 _-]{0,24}") {
        let c = service().convert(blob, FileKind::Bank, &name).unwrap().bytes;
        prop_assert_eq!(checksum::sum(&c, CHECKSUM_START), read_u32_le(&c, CHECKSUM_OFFSET));
    }

    #[test]
    fn prop_length_field_and_version_patch(blob in arb_blob()) {
        let c = service().convert(blob.clone(), FileKind::Program, "P").unwrap().bytes;
        let loc = service().decoder().locate(&c).unwrap();
        prop_assert_eq!(read_u64_le(&c, loc.blob_offset - 8), blob.len() as u64);
        prop_assert_eq!(loc.length_offset, loc.blob_offset - 8);
        prop_assert_eq!(loc.magic_end, loc.blob_offset + 4);

        let embedded = &c[loc.blob_offset..loc.blob_offset + blob.len()];
        prop_assert_eq!(&embedded[12..16], &[0u8, 0, 0, 1][..]);
        prop_assert_eq!(&embedded[..12], &blob[..12]);
        prop_assert_eq!(&embedded[16..], &blob[16..]);
    }

    #[test]
    fn prop_classification(blob in arb_blob()) {
        let s = service();
        let is_program = &blob[8..12] == b"FPCh";
        let c = s.convert(blob, FileKind::Bank, "K").unwrap();
        let back = s.convert(c.bytes, FileKind::Graph, "").unwrap();
        let expected = if is_program { FileKind::Program } else { FileKind::Bank };
        prop_assert_eq!(back.kind, expected);
    }

    #[test]
    fn prop_decode_recovers_patched_blob(blob in arb_blob()) {
        let s = service();
        let c = s.convert(blob.clone(), FileKind::Bank, "R").unwrap();
        let back = s.convert(c.bytes, FileKind::Graph, "").unwrap();
        let mut expected = PresetBlob::new(blob).unwrap();
        expected.patch_version();
        prop_assert_eq!(back.bytes, expected.into_bytes());
    }
}
