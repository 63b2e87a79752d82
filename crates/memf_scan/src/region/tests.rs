use super::*;
use pretty_assertions::assert_eq;

const SAMPLE_MAPS: &str = "\
55b7c4a00000-55b7c4a28000 r--p 00000000 08:02 1234567    /usr/bin/example
55b7c4a28000-55b7c4a8c000 r-xp 00028000 08:02 1234567    /usr/bin/example
55b7c4c8c000-55b7c4c96000 rw-p 00000000 00:00 0          [heap]
7f0000000000-7f0000001000 rw-s 00000000 00:05 42         /memfd:shared buffer (deleted)
7ffc12345000-7ffc12366000 rw-p 00000000 00:00 0          [stack]
7ffc1236c000-7ffc1236e000 rw-p 00000000 00:00 0
";

#[test]
fn parses_every_record() {
    let regions = parse_maps(SAMPLE_MAPS).expect("sample parses");
    assert_eq!(regions.len(), 6);

    let heap = &regions[2];
    assert_eq!(heap.from, 0x55b7_c4c8_c000);
    assert_eq!(heap.to, 0x55b7_c4c9_6000);
    assert_eq!(heap.perms.as_bytes(), b"rw-p");
    assert_eq!(heap.path.as_deref(), Some("[heap]"));
    assert_eq!(heap.len(), 0xa000);
}

#[test]
fn parses_offset_device_and_inode() {
    let regions = parse_maps(SAMPLE_MAPS).expect("sample parses");
    let text = &regions[1];
    assert_eq!(text.offset, 0x28000);
    assert_eq!((text.dev_major, text.dev_minor), (8, 2));
    assert_eq!(text.inode, 1_234_567);
}

#[test]
fn path_keeps_inner_spaces() {
    let regions = parse_maps(SAMPLE_MAPS).expect("sample parses");
    assert_eq!(
        regions[3].path.as_deref(),
        Some("/memfd:shared buffer (deleted)")
    );
}

#[test]
fn anonymous_region_has_no_path() {
    let regions = parse_maps(SAMPLE_MAPS).expect("sample parses");
    assert_eq!(regions[5].path, None);
}

#[test]
fn blank_lines_are_ignored() {
    let regions = parse_maps("\n00001000-00002000 r--p 00000000 00:00 0\n\n").expect("parses");
    assert_eq!(regions.len(), 1);
}

#[test]
fn truncated_line_is_a_fault() {
    let listing = "00001000-00002000 r--p 00000000 00:00 0\n00003000-00004000 r--p 00000000\n";
    assert_eq!(
        parse_maps(listing),
        Err(MapsError {
            line: 2,
            text: "00003000-00004000 r--p 00000000".to_string(),
        })
    );
}

#[test]
fn empty_interval_is_a_fault() {
    assert_eq!(Region::parse_line("2000-1000 r--p 0 00:00 0"), None);
    assert_eq!(Region::parse_line("1000-1000 r--p 0 00:00 0"), None);
}

#[test]
fn bad_permissions_are_a_fault() {
    assert_eq!(Region::parse_line("1000-2000 r-p 0 00:00 0"), None);
    assert_eq!(Region::parse_line("1000-2000 r--pp 0 00:00 0"), None);
}

#[test]
fn display_matches_listing_layout() {
    let region = Region::parse_line("1000-2000 r-xp 10 fd:01 99 /lib/x.so").expect("parses");
    assert_eq!(
        region.to_string(),
        "0000000000001000-0000000000002000 r-xp 00000010 fd:01 99 /lib/x.so"
    );
}
