use blocksync_fs::NormalizedPath;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("a/./b//c", "a/b/c")]
#[case("a/../b", "b")]
#[case("../a", "../a")]
#[case("/a/b/../../c", "/c")]
#[case("/../a", "/a")]
#[case("a\\b\\c.kt", "a/b/c.kt")]
#[case("a/..", ".")]
#[case("//server/share/x", "//server/share/x")]
fn test_normalization(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[rstest]
#[case("res/values-nl/strings.xml", Some("xml"))]
#[case("res/.hidden", None)]
#[case("res/Makefile", None)]
fn test_extension(#[case] input: &str, #[case] expected: Option<&str>) {
    assert_eq!(NormalizedPath::new(input).extension(), expected);
}

#[test]
fn test_join_and_parent() {
    let base = NormalizedPath::new("/repo/app");
    let joined = base.join("src/main");
    assert_eq!(joined.as_str(), "/repo/app/src/main");
    assert_eq!(joined.parent().unwrap(), NormalizedPath::new("/repo/app/src"));
    assert_eq!(joined.file_name(), Some("main"));
}

proptest! {
    #[test]
    fn test_normalization_is_idempotent(s in "[a-z./\\\\]{0,24}") {
        let once = NormalizedPath::new(&s);
        let twice = NormalizedPath::new(once.as_str());
        prop_assert_eq!(&once, &twice);
        prop_assert!(!once.as_str().contains('\\'));
    }
}
