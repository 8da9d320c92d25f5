//! 词典模块测试

use super::*;
use proptest::prelude::*;
use std::io::Write;

const SAMPLE_CSV: &str = "English,Doggo\n\
bone,bark\n\
Dog,Doggo\n\
eat,nom nom\n\
chicken,chimken\n\
nuggets,nuggies\n\
Hello,Bork\n";

#[test]
fn test_build_lowercases_keys_keeps_values() {
    let index = DictionaryIndex::build([("Dog", "Doggo"), ("Hello", "Bork")]).unwrap();

    assert_eq!(index.lookup_forward("dog"), Some("Doggo"));
    assert_eq!(index.lookup_forward("DOG"), Some("Doggo"));
    assert_eq!(index.lookup_reverse("bork"), Some("Hello"));
    assert_eq!(index.lookup_reverse("cat"), None);

    let keys: Vec<&str> = index
        .entries(TranslationDirection::EnglishToDoggo)
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec!["dog", "hello"]);
}

#[test]
fn test_build_duplicate_key_overwrites_in_place() {
    let index =
        DictionaryIndex::build([("bone", "bark"), ("walk", "walkies"), ("Bone", "boney")]).unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.lookup_forward("bone"), Some("boney"));
    let entries: Vec<(&str, &str)> = index
        .entries(TranslationDirection::EnglishToDoggo)
        .collect();
    assert_eq!(entries, vec![("bone", "boney"), ("walk", "walkies")]);
    // 反向表保留两个 Doggolingo 词条
    assert_eq!(index.lookup_reverse("bark"), Some("bone"));
    assert_eq!(index.lookup_reverse("boney"), Some("Bone"));
}

#[test]
fn test_build_empty_rows() {
    let rows: Vec<(String, String)> = Vec::new();
    assert!(matches!(
        DictionaryIndex::build(rows),
        Err(DictionaryLoadError::Empty)
    ));
}

#[test]
fn test_from_reader_skips_header() {
    let index = DictionaryIndex::from_reader(SAMPLE_CSV.as_bytes()).unwrap();

    assert_eq!(index.len(), 6);
    assert_eq!(index.lookup_forward("english"), None);
    assert_eq!(index.lookup_forward("eat"), Some("nom nom"));
    assert_eq!(index.lookup_reverse("nom nom"), Some("eat"));
}

#[test]
fn test_from_reader_header_only_is_empty() {
    assert!(matches!(
        DictionaryIndex::from_reader("English,Doggo\n".as_bytes()),
        Err(DictionaryLoadError::Empty)
    ));
    assert!(matches!(
        DictionaryIndex::from_reader("".as_bytes()),
        Err(DictionaryLoadError::Empty)
    ));
}

#[test]
fn test_from_reader_wrong_column_count() {
    let csv = "English,Doggo\nbone,bark\nwalk,walkies,extra\n";
    match DictionaryIndex::from_reader(csv.as_bytes()) {
        Err(DictionaryLoadError::Malformed { line, found }) => {
            assert_eq!(line, 3);
            assert_eq!(found, 3);
        }
        other => panic!("expected Malformed, got {other:?}"),
    }

    let csv = "English,Doggo\nlonely\n";
    assert!(matches!(
        DictionaryIndex::from_reader(csv.as_bytes()),
        Err(DictionaryLoadError::Malformed { found: 1, .. })
    ));
}

#[test]
fn test_from_reader_quoted_fields() {
    let csv = "English,Doggo\n\"good boy, yes\",\"goodest boi\"\n";
    let index = DictionaryIndex::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(index.lookup_forward("good boy, yes"), Some("goodest boi"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"English,Doggo\nbone,bark\n").unwrap();
    file.flush().unwrap();

    let index = DictionaryIndex::load(file.path()).unwrap();
    assert_eq!(index.lookup_forward("bone"), Some("bark"));
    assert_eq!(index.lookup_reverse("bark"), Some("bone"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");
    assert!(matches!(
        DictionaryIndex::load(&path),
        Err(DictionaryLoadError::Io { .. })
    ));
}

fn arb_term() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,11}"
}

proptest! {
    /// 对每个已加载的 (e, d)：lookup_forward(e) == d 且 lookup_reverse(d) == e
    #[test]
    fn prop_dictionary_round_trip(
        rows in proptest::collection::vec((arb_term(), arb_term()), 1..20)
    ) {
        let index = DictionaryIndex::build(rows.clone()).unwrap();

        // 后写覆盖先写：只校验每个 key 最后一次出现的行
        for (i, (english, doggo)) in rows.iter().enumerate() {
            let last_english = rows
                .iter()
                .rposition(|(e, _)| e.to_lowercase() == english.to_lowercase())
                .unwrap();
            if last_english == i {
                prop_assert_eq!(index.lookup_forward(english), Some(doggo.as_str()));
            }

            let last_doggo = rows
                .iter()
                .rposition(|(_, d)| d.to_lowercase() == doggo.to_lowercase())
                .unwrap();
            if last_doggo == i {
                prop_assert_eq!(index.lookup_reverse(doggo), Some(english.as_str()));
            }
        }
    }

    /// 所有 key 都是小写
    #[test]
    fn prop_keys_are_lowercase(
        rows in proptest::collection::vec((arb_term(), arb_term()), 1..20)
    ) {
        let index = DictionaryIndex::build(rows).unwrap();
        for direction in [TranslationDirection::EnglishToDoggo, TranslationDirection::DoggoToEnglish] {
            for (key, _) in index.entries(direction) {
                prop_assert_eq!(key.to_string(), key.to_lowercase());
            }
        }
    }
}
