use courier_kernel::{CUSTOM_ID_LEN, SAFE_ALPHABET, safe_nanoid};

#[test]
fn generates_expected_length_and_charset() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in nanoid: {ch}");
    }
}

#[test]
fn custom_length() {
    let id = safe_nanoid!(CUSTOM_ID_LEN);
    assert_eq!(id.len(), 32);
}

#[test]
fn consecutive_ids_differ() {
    assert_ne!(safe_nanoid!(CUSTOM_ID_LEN), safe_nanoid!(CUSTOM_ID_LEN));
}
