use super::{FileName, FileName::Anonymous, LineWithHighlight, Location, SourceMap};
use crate::{span, ByteIndex, LocalByteIndex};

/// Letting the first proper offset be `1` frees up `0` to mean _unknown location_ in [`Span::default`].
#[test]
fn first_next_offset_is_one() {
    let map = SourceMap::default();

    assert_eq!(map.next_offset(), ByteIndex::new(1));
}

#[test]
fn spacing_between_files() {
    let mut map = SourceMap::default();

    let file0 = map.add_str(Anonymous, "abc");
    let file1 = map.add_str(Anonymous, "defgh");

    assert_eq!(map[file0].span, span(1, 4));
    assert_eq!(&map[file0][map[file0].local_span()], "abc");
    assert_eq!(map[file1].span, span(5, 10));
    assert_eq!(&map[file1][map[file1].local_span()], "defgh");
}

#[test]
fn file_lookup_across_files() {
    let mut map = SourceMap::default();

    map.add_str("first", "proc a() {}");
    map.add_str("second", "proc b() {}");

    assert_eq!(map.snippet(span(6, 7)), "a");
    assert_eq!(map.snippet(span(18, 19)), "b");
    // the end of input position of the first file
    assert_eq!(map.file(span(12, 12)).name(), &FileName::Virtual("first"));
}

#[test]
fn carriage_returns_are_normalized() {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, "let x = 1\r\nlet y = 2\r\n");

    assert_eq!(map[file].content(), "let x = 1\nlet y = 2\n");
}

#[test]
fn locations_are_one_based() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "abc\ndef\n\nxyz");

    assert_eq!(map.location(ByteIndex::new(1)), Location { line: 1, column: 1 });
    assert_eq!(map.location(ByteIndex::new(3)), Location { line: 1, column: 3 });
    // the line break belongs to the line it ends
    assert_eq!(map.location(ByteIndex::new(4)), Location { line: 1, column: 4 });
    assert_eq!(map.location(ByteIndex::new(6)), Location { line: 2, column: 2 });
    assert_eq!(map.location(ByteIndex::new(9)), Location { line: 3, column: 1 });
    assert_eq!(map.location(ByteIndex::new(12)), Location { line: 4, column: 3 });
}

#[test]
fn columns_count_characters() {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, "äöü x");

    assert_eq!(
        map[file].location(LocalByteIndex::new(7)),
        Location { line: 1, column: 5 }
    );
}

#[test]
fn single_line_highlight() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "alpha\nproc main() {}\n");

    assert_eq!(
        map.line_with_highlight(span(12, 16)),
        LineWithHighlight {
            file: &Anonymous,
            location: Location { line: 2, column: 6 },
            content: "proc main() {}",
            prefix_width: 5,
            width: 4,
        }
    );
}

#[test]
fn multi_line_highlight_is_cut_off() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "{ first\nsecond }");

    assert_eq!(
        map.line_with_highlight(span(1, 17)),
        LineWithHighlight {
            file: &Anonymous,
            location: Location { line: 1, column: 1 },
            content: "{ first",
            prefix_width: 0,
            width: 7,
        }
    );
}

#[test]
fn wide_characters_highlight() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "空#\n");

    assert_eq!(
        map.line_with_highlight(span(4, 5)),
        LineWithHighlight {
            file: &Anonymous,
            location: Location { line: 1, column: 2 },
            content: "空#",
            prefix_width: 2,
            width: 1,
        }
    );
}

#[test]
fn end_of_input_highlight() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "abc");

    assert_eq!(
        map.line_with_highlight(span(4, 4)),
        LineWithHighlight {
            file: &Anonymous,
            location: Location { line: 1, column: 4 },
            content: "abc",
            prefix_width: 3,
            width: 0,
        }
    );
}
