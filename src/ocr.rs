// ocr.rs
// Picks the stock item a scanned label refers to. Text recognition itself happens
// client-side; this only matches the recognised text.

use crate::models::StockItem;

/// Lowercase, accent-free, alphanumeric words separated by single spaces.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars().flat_map(char::to_lowercase) {
        let ch = strip_accent(ch);
        if ch.is_alphanumeric() {
            out.push(ch);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

fn strip_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Strength {
    Words(usize),
    Name(usize),
    Code,
}

fn contains_word_seq(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && format!(" {haystack} ").contains(&format!(" {needle} "))
}

fn strength(text: &str, words: &[&str], item: &StockItem) -> Option<Strength> {
    if let Some(code) = item.code.as_deref().map(fold).filter(|c| !c.is_empty()) {
        let compact_code = code.replace(' ', "");
        if contains_word_seq(text, &code) || text.replace(' ', "").contains(&compact_code) {
            return Some(Strength::Code);
        }
    }
    let name = fold(&item.name);
    if name.is_empty() {
        return None;
    }
    if contains_word_seq(text, &name) {
        return Some(Strength::Name(name.len()));
    }
    let name_words: Vec<&str> = name.split(' ').collect();
    if name_words.iter().all(|w| words.contains(w)) {
        return Some(Strength::Words(name.len()));
    }
    None
}

/// Best matching active item: code hits first, then the longest contained name, then
/// items whose name words all appear somewhere in the text.
pub fn match_item<'a>(recognised: &str, items: &'a [StockItem]) -> Option<&'a StockItem> {
    let text = fold(recognised);
    if text.is_empty() {
        return None;
    }
    let words: Vec<&str> = text.split(' ').collect();
    items
        .iter()
        .filter(|i| i.active)
        .filter_map(|i| strength(&text, &words, i).map(|s| (s, i)))
        .max_by_key(|(s, _)| *s)
        .map(|(_, i)| i)
}
