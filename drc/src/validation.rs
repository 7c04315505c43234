//! Field-level validators for informatieobject payloads.
//!
//! Request models declare their constraints with `validator` derive attributes; the predicates
//! that go beyond length checks live here so that they can be reused and tested in isolation.
//! Every function follows the `validator` custom-function contract: it receives the field value
//! and returns a [`ValidationError`] carrying a stable `code` and a human readable message.

use crate::types::Vertrouwelijkheidaanduiding;
use std::borrow::Cow;
use url::Url;
use validator::ValidationError;

/// ISO 639-2/B language codes accepted for `taal`.
pub const LANGUAGE_CODES: &[&str] = &[
    "aar", "abk", "ace", "ach", "ada", "ady", "afa", "afh", "afr", "ain", "aka", "akk", "alb", "ale", "alg", "alt", "amh",
    "ang", "anp", "apa", "ara", "arc", "arg", "arm", "arn", "arp", "art", "arw", "asm", "ast", "ath", "aus", "ava", "ave",
    "awa", "aym", "aze", "bad", "bai", "bak", "bal", "bam", "ban", "baq", "bas", "bat", "bej", "bel", "bem", "ben", "ber",
    "bho", "bih", "bik", "bin", "bis", "bla", "bnt", "bos", "bra", "bre", "btk", "bua", "bug", "bul", "bur", "byn", "cad",
    "cai", "car", "cat", "cau", "ceb", "cel", "cha", "chb", "che", "chg", "chi", "chk", "chm", "chn", "cho", "chp", "chr",
    "chu", "chv", "chy", "cmc", "cnr", "cop", "cor", "cos", "cpe", "cpf", "cpp", "cre", "crh", "crp", "csb", "cus", "cze",
    "dak", "dan", "dar", "day", "del", "den", "dgr", "din", "div", "doi", "dra", "dsb", "dua", "dum", "dut", "dyu", "dzo",
    "efi", "egy", "eka", "elx", "eng", "enm", "epo", "est", "ewe", "ewo", "fan", "fao", "fat", "fij", "fil", "fin", "fiu",
    "fon", "fre", "frm", "fro", "frr", "frs", "fry", "ful", "fur", "gaa", "gay", "gba", "gem", "geo", "ger", "gez", "gil",
    "gla", "gle", "glg", "glv", "gmh", "goh", "gon", "gor", "got", "grb", "grc", "gre", "grn", "gsw", "guj", "gwi", "hai",
    "hat", "hau", "haw", "heb", "her", "hil", "him", "hin", "hit", "hmn", "hmo", "hrv", "hsb", "hun", "hup", "iba", "ibo",
    "ice", "ido", "iii", "ijo", "iku", "ile", "ilo", "ina", "inc", "ind", "ine", "inh", "ipk", "ira", "iro", "ita", "jav",
    "jbo", "jpn", "jpr", "jrb", "kaa", "kab", "kac", "kal", "kam", "kan", "kar", "kas", "kau", "kaw", "kaz", "kbd", "kha",
    "khi", "khm", "kho", "kik", "kin", "kir", "kmb", "kok", "kom", "kon", "kor", "kos", "kpe", "krc", "krl", "kro", "kru",
    "kua", "kum", "kur", "kut", "lad", "lah", "lam", "lao", "lat", "lav", "lez", "lim", "lin", "lit", "lol", "loz", "ltz",
    "lua", "lub", "lug", "lui", "lun", "luo", "lus", "mac", "mad", "mag", "mah", "mai", "mak", "mal", "man", "mao", "map",
    "mar", "mas", "may", "mdf", "mdr", "men", "mga", "mic", "min", "mis", "mkh", "mlg", "mlt", "mnc", "mni", "mno", "moh",
    "mon", "mos", "mul", "mun", "mus", "mwl", "mwr", "myn", "myv", "nah", "nai", "nap", "nau", "nav", "nbl", "nde", "ndo",
    "nds", "nep", "new", "nia", "nic", "niu", "nno", "nob", "nog", "non", "nor", "nqo", "nso", "nub", "nwc", "nya", "nym",
    "nyn", "nyo", "nzi", "oci", "oji", "ori", "orm", "osa", "oss", "ota", "oto", "paa", "pag", "pal", "pam", "pan", "pap",
    "pau", "peo", "per", "phi", "phn", "pli", "pol", "pon", "por", "pra", "pro", "pus", "que", "raj", "rap", "rar", "roa",
    "roh", "rom", "rum", "run", "rup", "rus", "sad", "sag", "sah", "sai", "sal", "sam", "san", "sas", "sat", "scn", "sco",
    "sel", "sem", "sga", "sgn", "shn", "sid", "sin", "sio", "sit", "sla", "slo", "slv", "sma", "sme", "smi", "smj", "smn",
    "smo", "sms", "sna", "snd", "snk", "sog", "som", "son", "sot", "spa", "srd", "srn", "srp", "srr", "ssa", "ssw", "suk",
    "sun", "sus", "sux", "swa", "swe", "syc", "syr", "tah", "tai", "tam", "tat", "tel", "tem", "ter", "tet", "tgk", "tgl",
    "tha", "tib", "tig", "tir", "tiv", "tkl", "tlh", "tli", "tmh", "tog", "ton", "tpi", "tsi", "tsn", "tso", "tuk", "tum",
    "tup", "tur", "tut", "tvl", "twi", "tyv", "udm", "uga", "uig", "ukr", "umb", "und", "urd", "uzb", "vai", "ven", "vie",
    "vol", "vot", "wak", "wal", "war", "was", "wel", "wen", "wln", "wol", "xal", "xho", "yao", "yap", "yid", "yor", "ypk",
    "zap", "zbl", "zen", "zgh", "zha", "znd", "zul", "zun", "zxx", "zza",
];

/// Length of an RSIN.
pub const RSIN_LENGTH: usize = 9;

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// `identificatie` may only hold ASCII characters: no diacritics, no other non-ASCII text, no
/// control characters. When given it may not be blank; only an omitted value gets a default.
pub fn validate_identificatie(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "This field may not be blank"));
    }

    if value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        Ok(())
    } else {
        Err(error(
            "no_diacritics",
            format!("Value '{value}' may not contain diacritics or non-ASCII characters"),
        ))
    }
}

/// An RSIN is nine digits passing the 11-check: digits one to eight are weighted 9 down to 2,
/// the last digit is weighted -1, and the weighted sum must be divisible by 11.
///
/// An empty value is accepted, `bronorganisatie` is optional.
pub fn validate_rsin(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error("only_digits", "An RSIN may only contain digits"));
    }

    if value.len() != RSIN_LENGTH {
        return Err(error("invalid_length", format!("An RSIN must be exactly {RSIN_LENGTH} digits")));
    }

    let total: i64 = value
        .bytes()
        .rev()
        .enumerate()
        .map(|(idx, b)| {
            let digit = i64::from(b - b'0');
            let weight = idx as i64 + 1;
            if weight == 1 { -digit } else { weight * digit }
        })
        .sum();

    if total % 11 != 0 {
        return Err(error("invalid", format!("'{value}' is not a valid RSIN")));
    }

    Ok(())
}

/// Empty or one of the enumerated confidentiality levels.
pub fn validate_vertrouwelijkheidaanduiding(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.parse::<Vertrouwelijkheidaanduiding>().is_ok() {
        return Ok(());
    }

    let allowed = Vertrouwelijkheidaanduiding::ALL.map(|level| level.as_str()).join(", ");
    Err(error("invalid_choice", format!("'{value}' is not a valid choice, expected one of: {allowed}")))
}

pub fn validate_language(value: &str) -> Result<(), ValidationError> {
    if LANGUAGE_CODES.contains(&value) {
        Ok(())
    } else {
        Err(error("invalid_choice", format!("'{value}' is not an ISO 639-2/B language code")))
    }
}

/// Absolute http(s) URL with a host. Only the shape is checked; the referenced resource is never
/// fetched.
pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    let url = Url::parse(value).map_err(|_| error("invalid", format!("'{value}' is not a valid URL")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(error("invalid_scheme", format!("URL scheme '{scheme}' is not supported"))),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(error("invalid", format!("'{value}' has no host")));
    }

    Ok(())
}

/// Same as [`validate_url`] but an empty string is accepted, for optional URL fields.
pub fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() { Ok(()) } else { validate_url(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identificatie_accepts_ascii() {
        assert!(validate_identificatie("DOC-2018-0001").is_ok());
        assert!(validate_identificatie(&uuid::Uuid::new_v4().to_string()).is_ok());
    }

    #[test]
    fn test_identificatie_rejects_diacritics_and_non_ascii() {
        for value in ["café", "Ünïcode", "naïef-001", "日本語", "emoji-🙂"] {
            let err = validate_identificatie(value).unwrap_err();
            assert_eq!(err.code, "no_diacritics", "{value} should be rejected");
        }
    }

    #[test]
    fn test_identificatie_rejects_blank_values() {
        for value in ["", "   ", "\t"] {
            assert_eq!(validate_identificatie(value).unwrap_err().code, "blank", "{value:?}");
        }
    }

    #[test]
    fn test_identificatie_rejects_control_characters() {
        assert!(validate_identificatie("line\nbreak").is_err());
        assert!(validate_identificatie("tab\there").is_err());
    }

    #[test]
    fn test_rsin_valid_numbers() {
        assert!(validate_rsin("517439943").is_ok());
        assert!(validate_rsin("123456782").is_ok());
        assert!(validate_rsin("000000000").is_ok());
    }

    #[test]
    fn test_rsin_empty_is_allowed() {
        assert!(validate_rsin("").is_ok());
    }

    #[test]
    fn test_rsin_failing_eleven_check() {
        let err = validate_rsin("123456789").unwrap_err();
        assert_eq!(err.code, "invalid");
    }

    #[test]
    fn test_rsin_wrong_shape() {
        assert_eq!(validate_rsin("12345678").unwrap_err().code, "invalid_length");
        assert_eq!(validate_rsin("1234567890").unwrap_err().code, "invalid_length");
        assert_eq!(validate_rsin("12345678a").unwrap_err().code, "only_digits");
    }

    #[test]
    fn test_vertrouwelijkheidaanduiding_choices() {
        assert!(validate_vertrouwelijkheidaanduiding("openbaar").is_ok());
        assert!(validate_vertrouwelijkheidaanduiding("zeer_geheim").is_ok());
        assert!(validate_vertrouwelijkheidaanduiding("").is_ok());

        let err = validate_vertrouwelijkheidaanduiding("publiek").unwrap_err();
        assert_eq!(err.code, "invalid_choice");
    }

    #[test]
    fn test_language_codes() {
        assert!(validate_language("dut").is_ok());
        assert!(validate_language("eng").is_ok());
        assert!(validate_language("fre").is_ok());

        // ISO 639-1 and terminology (T) codes are not part of the vocabulary
        assert!(validate_language("nl").is_err());
        assert!(validate_language("nld").is_err());
        assert!(validate_language("DUT").is_err());
        assert!(validate_language("").is_err());
    }

    #[test]
    fn test_language_codes_are_three_lowercase_letters() {
        for code in LANGUAGE_CODES {
            assert_eq!(code.len(), 3, "{code}");
            assert!(code.chars().all(|c| c.is_ascii_lowercase()), "{code}");
        }
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("https://ztc.example.com/api/v1/informatieobjecttypen/1").is_ok());
        assert!(validate_url("http://localhost:8000/zaken/abc").is_ok());

        assert_eq!(validate_url("not a url").unwrap_err().code, "invalid");
        assert_eq!(validate_url("ftp://files.example.com/x").unwrap_err().code, "invalid_scheme");
        assert_eq!(validate_url("mailto:someone@example.com").unwrap_err().code, "invalid_scheme");
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_optional_url_validation() {
        assert!(validate_optional_url("").is_ok());
        assert!(validate_optional_url("https://example.com/doc.pdf").is_ok());
        assert!(validate_optional_url("example.com/doc.pdf").is_err());
    }
}
