//! Identifier normalization
//!
//! [`jsify`] turns any string into a camel-cased JavaScript identifier:
//! characters that are neither letters nor digits are dropped, underscores
//! and lowercase-to-non-lowercase transitions start a new word, and words
//! found in the acronym table are written in a single case.

use crate::design::{Attribute, FIELD_NAME_KEY};
use crate::error::{Error, Result};

/// Words always rendered in a single case
const ACRONYMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JMES", "JSON", "JWT", "LHS", "OK", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH",
    "TCP", "TLS", "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XSRF",
    "XSS",
];

/// Sized numeric spellings that all map to the JS number type
const NUMERIC_SPELLINGS: &[&str] = &[
    "int64", "int32", "uint", "uint32", "int16", "uint16", "float32", "float64",
];

/// Upper bound on normalization passes; real inputs settle in two.
const MAX_PASSES: usize = 8;

/// Make a valid identifier out of any string.
///
/// With `first_upper` the result is PascalCase, otherwise camelCase.
///
/// # Examples
/// ```
/// use flowgen::jsgen::jsify;
/// assert_eq!(jsify("user_id", true).unwrap(), "UserID");
/// assert_eq!(jsify("id", false).unwrap(), "id");
/// assert_eq!(jsify("http_server", true).unwrap(), "HTTPServer");
/// assert_eq!(jsify("int64", true).unwrap(), "number");
/// ```
pub fn jsify(raw: &str, first_upper: bool) -> Result<String> {
    if NUMERIC_SPELLINGS.contains(&raw) {
        return Ok("number".to_string());
    }

    // The words of the output can differ from the words of the input
    // (`u_rl` renders as `URl`, which reads as one word), so normalize
    // until the spelling is stable.
    let mut current = normalize_once(raw, first_upper);
    for _ in 0..MAX_PASSES {
        let next = normalize_once(&current, first_upper);
        if next == current {
            break;
        }
        current = next;
    }

    match current.chars().next() {
        None => Err(Error::InvalidIdentifierInput(raw.to_string())),
        Some(c) if c.is_numeric() => Ok(format!("_{}", current)),
        Some(_) => Ok(current),
    }
}

/// Identifier for an attribute field, honoring the field name metadata
pub fn jsify_att(att: &Attribute, name: &str, first_upper: bool) -> Result<String> {
    let name = att
        .meta(FIELD_NAME_KEY)
        .and_then(|values| values.first())
        .map(String::as_str)
        .unwrap_or(name);
    jsify(name, first_upper)
}

fn normalize_once(raw: &str, first_upper: bool) -> String {
    let mut runes: Vec<char> = raw.chars().collect();

    // Dropping the trailing invalid run first keeps a valid rune at the
    // end, so every scan position below stays in bounds.
    while runes.last().is_some_and(|c| !is_valid(*c)) {
        runes.pop();
    }

    let (mut w, mut i) = (0, 0); // start of word, scan
    while i < runes.len() {
        let end = runes[i..]
            .iter()
            .position(|c| is_valid(*c))
            .map_or(runes.len(), |p| i + p);
        runes.drain(i..end);

        let mut eow = false;
        if i + 1 == runes.len() {
            eow = true;
        } else if runes[i + 1] == '_' {
            let n = runes[i + 1..].iter().take_while(|c| **c == '_').count();
            runes.drain(i + 1..i + 1 + n);
            eow = true;
        } else if runes[i].is_lowercase() && !runes[i + 1].is_lowercase() {
            eow = true;
        }
        i += 1;
        if !eow {
            continue;
        }

        let word: String = runes[w..i].iter().collect();
        let upper = word.to_uppercase();
        let lower = word.to_lowercase();
        if ACRONYMS.contains(&upper.as_str()) {
            let spelled = if !first_upper && w == 0 { lower } else { upper };
            for (slot, c) in runes[w..i].iter_mut().zip(spelled.chars()) {
                *slot = c;
            }
        } else if lower == word && (w > 0 || first_upper) {
            runes[w] = to_upper(runes[w]);
        }
        if w == 0 && !first_upper {
            runes[w] = to_lower(runes[w]);
        }
        w = i;
    }

    runes.into_iter().collect()
}

fn is_valid(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric()
}

fn to_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn to_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Generator of unique temporary variable names.
///
/// One instance lives for one generation run; names only ever grow.
#[derive(Debug, Default)]
pub struct TempVars {
    count: usize,
}

impl TempVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused name
    pub fn fresh(&mut self) -> String {
        self.count += 1;
        format!("tmp{}", self.count)
    }

    /// Number of names handed out so far
    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DataType;

    #[test]
    fn test_case_boundaries() {
        assert_eq!(jsify("fooBar", true).unwrap(), "FooBar");
        assert_eq!(jsify("fooBar", false).unwrap(), "fooBar");
        assert_eq!(jsify("FooBar", false).unwrap(), "fooBar");
        assert_eq!(jsify("foo-bar baz", false).unwrap(), "fooBarBaz");
    }

    #[test]
    fn test_underscore_runs_are_one_boundary() {
        assert_eq!(jsify("rate__of___climb", false).unwrap(), "rateOfClimb");
        assert_eq!(jsify("_leading_and_trailing_", true).unwrap(), "LeadingAndTrailing");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(jsify("api_url", false).unwrap(), "apiURL");
        assert_eq!(jsify("api_url", true).unwrap(), "APIURL");
        assert_eq!(jsify("Id", false).unwrap(), "id");
        assert_eq!(jsify("json_body", true).unwrap(), "JSONBody");
    }

    #[test]
    fn test_numeric_spellings() {
        for s in NUMERIC_SPELLINGS {
            assert_eq!(jsify(s, false).unwrap(), "number");
        }
    }

    #[test]
    fn test_trailing_invalid_dropped() {
        assert_eq!(jsify("name!!", false).unwrap(), "name");
        assert_eq!(jsify("a.", true).unwrap(), "A");
    }

    #[test]
    fn test_leading_digit_prefixed() {
        assert_eq!(jsify("1st_place", false).unwrap(), "_1stPlace");
        assert_eq!(jsify("_1stPlace", false).unwrap(), "_1stPlace");
    }

    #[test]
    fn test_no_letter_or_digit_fails() {
        assert!(matches!(
            jsify("-_- !", true),
            Err(Error::InvalidIdentifierInput(_))
        ));
        assert!(jsify("", false).is_err());
    }

    #[test]
    fn test_unstable_segmentation_settles() {
        let once = jsify("u_rl", true).unwrap();
        assert_eq!(once, "URL");
        assert_eq!(jsify(&once, true).unwrap(), once);
    }

    #[test]
    fn test_jsify_att_honors_metadata() {
        let att = Attribute::new(DataType::string()).with_metadata(FIELD_NAME_KEY, ["given_name"]);
        assert_eq!(jsify_att(&att, "first", false).unwrap(), "givenName");
        let plain = Attribute::new(DataType::string());
        assert_eq!(jsify_att(&plain, "first", true).unwrap(), "First");
    }

    #[test]
    fn test_temp_vars_are_monotonic() {
        let mut vars = TempVars::new();
        assert_eq!(vars.fresh(), "tmp1");
        assert_eq!(vars.fresh(), "tmp2");
        assert_eq!(vars.count(), 2);
        assert_eq!(TempVars::new().fresh(), "tmp1");
    }
}
