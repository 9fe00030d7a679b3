use crate::tokenizer::tokenize;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_whitespace_splitting() {
    assert_eq!(tokenize("  ls   -l\t/tmp \n", 32), words(&["ls", "-l", "/tmp"]));
    assert!(tokenize("   \n", 32).is_empty());
}

#[test]
fn test_operators_stand_alone() {
    assert_eq!(
        tokenize("cat<in.txt|wc -l>out.txt", 32),
        words(&["cat", "<", "in.txt", "|", "wc", "-l", ">", "out.txt"])
    );
    assert_eq!(tokenize("ls || wc", 32), words(&["ls", "|", "|", "wc"]));
}

#[test]
fn test_single_quotes() {
    assert_eq!(
        tokenize("echo 'Hello World'", 32),
        words(&["echo", "Hello World"])
    );
    assert_eq!(tokenize(r"echo 'a\b'", 32), words(&["echo", r"a\b"]));
}

#[test]
fn test_double_quotes() {
    assert_eq!(
        tokenize(r#"echo "hello 'world'" "say \"hi\"""#, 32),
        words(&["echo", "hello 'world'", "say \"hi\""])
    );
}

#[test]
fn test_quotes_join_adjacent_text() {
    assert_eq!(tokenize(r#"a"b c"'d'e"#, 32), words(&["ab cde"]));
    assert_eq!(tokenize("echo ''", 32), words(&["echo", ""]));
}

#[test]
fn test_quoted_operators_are_plain_text() {
    assert_eq!(tokenize("echo 'a|b'", 32), words(&["echo", "a|b"]));
}

#[test]
fn test_escape_character() {
    assert_eq!(tokenize(r"echo Hello\ World", 32), words(&["echo", "Hello World"]));
    assert_eq!(tokenize(r"echo a\>b", 32), words(&["echo", "a>b"]));
}

#[test]
fn test_status_placeholder_is_a_word() {
    assert_eq!(tokenize("echo $?", 32), words(&["echo", "$?"]));
}

#[test]
fn test_token_limit() {
    assert_eq!(tokenize("a b c d e", 3), words(&["a", "b", "c"]));
    assert!(tokenize("a b", 0).is_empty());
}
