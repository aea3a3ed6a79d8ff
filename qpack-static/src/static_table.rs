//! QPACK static table per RFC 9204 Appendix A, plus the reverse index the
//! encoder uses to pick a representation.
//!
//! Both are immutable after first use and shared by every encoder and decoder.

use std::collections::HashMap;

/// Static table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticEntry {
    pub name: &'static [u8],
    pub value: &'static [u8],
}

/// Number of entries in the static table.
pub const LEN: usize = 99;

/// QPACK static table (indexes 0-98, 0-based as in RFC 9204).
pub static STATIC_TABLE: [StaticEntry; LEN] = [
    StaticEntry { name: b":authority", value: b"" },                          // 0
    StaticEntry { name: b":path", value: b"/" },                              // 1
    StaticEntry { name: b"age", value: b"0" },                                // 2
    StaticEntry { name: b"content-disposition", value: b"" },                 // 3
    StaticEntry { name: b"content-length", value: b"0" },                     // 4
    StaticEntry { name: b"cookie", value: b"" },                              // 5
    StaticEntry { name: b"date", value: b"" },                                // 6
    StaticEntry { name: b"etag", value: b"" },                                // 7
    StaticEntry { name: b"if-modified-since", value: b"" },                   // 8
    StaticEntry { name: b"if-none-match", value: b"" },                       // 9
    StaticEntry { name: b"last-modified", value: b"" },                       // 10
    StaticEntry { name: b"link", value: b"" },                                // 11
    StaticEntry { name: b"location", value: b"" },                            // 12
    StaticEntry { name: b"referer", value: b"" },                             // 13
    StaticEntry { name: b"set-cookie", value: b"" },                          // 14
    StaticEntry { name: b":method", value: b"CONNECT" },                      // 15
    StaticEntry { name: b":method", value: b"DELETE" },                       // 16
    StaticEntry { name: b":method", value: b"GET" },                          // 17
    StaticEntry { name: b":method", value: b"HEAD" },                         // 18
    StaticEntry { name: b":method", value: b"OPTIONS" },                      // 19
    StaticEntry { name: b":method", value: b"POST" },                         // 20
    StaticEntry { name: b":method", value: b"PUT" },                          // 21
    StaticEntry { name: b":scheme", value: b"http" },                         // 22
    StaticEntry { name: b":scheme", value: b"https" },                        // 23
    StaticEntry { name: b":status", value: b"103" },                          // 24
    StaticEntry { name: b":status", value: b"200" },                          // 25
    StaticEntry { name: b":status", value: b"304" },                          // 26
    StaticEntry { name: b":status", value: b"404" },                          // 27
    StaticEntry { name: b":status", value: b"503" },                          // 28
    StaticEntry { name: b"accept", value: b"*/*" },                           // 29
    StaticEntry { name: b"accept", value: b"application/dns-message" },       // 30
    StaticEntry { name: b"accept-encoding", value: b"gzip, deflate, br" },    // 31
    StaticEntry { name: b"accept-ranges", value: b"bytes" },                  // 32
    StaticEntry { name: b"access-control-allow-headers", value: b"cache-control" }, // 33
    StaticEntry { name: b"access-control-allow-headers", value: b"content-type" },  // 34
    StaticEntry { name: b"access-control-allow-origin", value: b"*" },        // 35
    StaticEntry { name: b"cache-control", value: b"max-age=0" },              // 36
    StaticEntry { name: b"cache-control", value: b"max-age=2592000" },        // 37
    StaticEntry { name: b"cache-control", value: b"max-age=604800" },         // 38
    StaticEntry { name: b"cache-control", value: b"no-cache" },               // 39
    StaticEntry { name: b"cache-control", value: b"no-store" },               // 40
    StaticEntry { name: b"cache-control", value: b"public, max-age=31536000" }, // 41
    StaticEntry { name: b"content-encoding", value: b"br" },                  // 42
    StaticEntry { name: b"content-encoding", value: b"gzip" },                // 43
    StaticEntry { name: b"content-type", value: b"application/dns-message" }, // 44
    StaticEntry { name: b"content-type", value: b"application/javascript" },  // 45
    StaticEntry { name: b"content-type", value: b"application/json" },        // 46
    StaticEntry { name: b"content-type", value: b"application/x-www-form-urlencoded" }, // 47
    StaticEntry { name: b"content-type", value: b"image/gif" },               // 48
    StaticEntry { name: b"content-type", value: b"image/jpeg" },              // 49
    StaticEntry { name: b"content-type", value: b"image/png" },               // 50
    StaticEntry { name: b"content-type", value: b"text/css" },                // 51
    StaticEntry { name: b"content-type", value: b"text/html; charset=utf-8" }, // 52
    StaticEntry { name: b"content-type", value: b"text/plain" },              // 53
    StaticEntry { name: b"content-type", value: b"text/plain;charset=utf-8" }, // 54
    StaticEntry { name: b"range", value: b"bytes=0-" },                       // 55
    StaticEntry { name: b"strict-transport-security", value: b"max-age=31536000" }, // 56
    StaticEntry { name: b"strict-transport-security", value: b"max-age=31536000; includesubdomains" }, // 57
    StaticEntry { name: b"strict-transport-security", value: b"max-age=31536000; includesubdomains; preload" }, // 58
    StaticEntry { name: b"vary", value: b"accept-encoding" },                 // 59
    StaticEntry { name: b"vary", value: b"origin" },                          // 60
    StaticEntry { name: b"x-content-type-options", value: b"nosniff" },       // 61
    StaticEntry { name: b"x-xss-protection", value: b"1; mode=block" },       // 62
    StaticEntry { name: b":status", value: b"100" },                          // 63
    StaticEntry { name: b":status", value: b"204" },                          // 64
    StaticEntry { name: b":status", value: b"206" },                          // 65
    StaticEntry { name: b":status", value: b"302" },                          // 66
    StaticEntry { name: b":status", value: b"400" },                          // 67
    StaticEntry { name: b":status", value: b"403" },                          // 68
    StaticEntry { name: b":status", value: b"421" },                          // 69
    StaticEntry { name: b":status", value: b"425" },                          // 70
    StaticEntry { name: b":status", value: b"500" },                          // 71
    StaticEntry { name: b"accept-language", value: b"" },                     // 72
    StaticEntry { name: b"access-control-allow-credentials", value: b"FALSE" }, // 73
    StaticEntry { name: b"access-control-allow-credentials", value: b"TRUE" }, // 74
    StaticEntry { name: b"access-control-allow-headers", value: b"*" },       // 75
    StaticEntry { name: b"access-control-allow-methods", value: b"get" },     // 76
    StaticEntry { name: b"access-control-allow-methods", value: b"get, post, options" }, // 77
    StaticEntry { name: b"access-control-allow-methods", value: b"options" }, // 78
    StaticEntry { name: b"access-control-expose-headers", value: b"content-length" }, // 79
    StaticEntry { name: b"access-control-request-headers", value: b"content-type" }, // 80
    StaticEntry { name: b"access-control-request-method", value: b"get" },    // 81
    StaticEntry { name: b"access-control-request-method", value: b"post" },   // 82
    StaticEntry { name: b"alt-svc", value: b"clear" },                        // 83
    StaticEntry { name: b"authorization", value: b"" },                       // 84
    StaticEntry { name: b"content-security-policy", value: b"script-src 'none'; object-src 'none'; base-uri 'none'" }, // 85
    StaticEntry { name: b"early-data", value: b"1" },                         // 86
    StaticEntry { name: b"expect-ct", value: b"" },                           // 87
    StaticEntry { name: b"forwarded", value: b"" },                           // 88
    StaticEntry { name: b"if-range", value: b"" },                            // 89
    StaticEntry { name: b"origin", value: b"" },                              // 90
    StaticEntry { name: b"purpose", value: b"prefetch" },                     // 91
    StaticEntry { name: b"server", value: b"" },                              // 92
    StaticEntry { name: b"timing-allow-origin", value: b"*" },                // 93
    StaticEntry { name: b"upgrade-insecure-requests", value: b"1" },          // 94
    StaticEntry { name: b"user-agent", value: b"" },                          // 95
    StaticEntry { name: b"x-forwarded-for", value: b"" },                     // 96
    StaticEntry { name: b"x-frame-options", value: b"deny" },                 // 97
    StaticEntry { name: b"x-frame-options", value: b"sameorigin" },           // 98
];

/// Encoder index entry for one distinct static table name.
#[derive(Debug, Default)]
pub struct NameEntry {
    /// Lowest index at which the name occurs.
    pub default_index: usize,
    /// Index of each non-empty value stored under the name.
    pub values: HashMap<&'static [u8], usize>,
}

impl NameEntry {
    /// Returns true if the name only appears with an empty value.
    pub fn is_name_only(&self) -> bool {
        self.values.is_empty()
    }
}

fn build_index() -> HashMap<&'static [u8], NameEntry> {
    let mut index: HashMap<&'static [u8], NameEntry> = HashMap::new();

    for (idx, entry) in STATIC_TABLE.iter().enumerate() {
        let name_entry = index.entry(entry.name).or_insert_with(|| NameEntry {
            default_index: idx,
            values: HashMap::new(),
        });
        if !entry.value.is_empty() {
            name_entry.values.insert(entry.value, idx);
        }
    }

    index
}

lazy_static::lazy_static! {
    static ref ENCODER_INDEX: HashMap<&'static [u8], NameEntry> = build_index();
}

/// Get static table entry by index.
/// Returns None if index is out of bounds.
#[inline]
pub fn get(index: u64) -> Option<&'static StaticEntry> {
    usize::try_from(index).ok().and_then(|i| STATIC_TABLE.get(i))
}

/// Returns the `(name, value)` pair stored at `index`.
#[inline]
pub fn lookup_by_index(index: u64) -> Option<(&'static [u8], &'static [u8])> {
    get(index).map(|e| (e.name, e.value))
}

/// Returns the encoder index entry for `name`.
#[inline]
pub fn name_entry(name: &[u8]) -> Option<&'static NameEntry> {
    ENCODER_INDEX.get(name)
}

/// Find name-only match in static table.
/// Returns the lowest index carrying `name`.
#[inline]
pub fn find_name(name: &[u8]) -> Option<usize> {
    name_entry(name).map(|e| e.default_index)
}

/// Find exact match in static table.
pub fn find_exact(name: &[u8], value: &[u8]) -> Option<usize> {
    let entry = name_entry(name)?;
    if value.is_empty() {
        // empty values are only ever stored at the default index
        STATIC_TABLE[entry.default_index]
            .value
            .is_empty()
            .then_some(entry.default_index)
    } else {
        entry.values.get(value).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_table_size() {
        assert_eq!(STATIC_TABLE.len(), 99);
        assert!(get(98).is_some());
        assert!(get(99).is_none());
        assert!(get(u64::MAX).is_none());
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(find_exact(b":method", b"GET"), Some(17));
        assert_eq!(find_exact(b":status", b"200"), Some(25));
        assert_eq!(find_exact(b":authority", b""), Some(0));
        assert_eq!(find_exact(b":method", b""), None);
        assert_eq!(find_exact(b":method", b"PATCH"), None);
        assert_eq!(find_exact(b"x-unknown", b""), None);
    }

    #[test]
    fn test_name_match() {
        assert_eq!(find_name(b":method"), Some(15));
        assert_eq!(find_name(b"content-type"), Some(44));
        assert_eq!(find_name(b":status"), Some(24));
        assert_eq!(find_name(b"x-unknown"), None);
    }

    #[test]
    fn test_get_entry() {
        assert_eq!(
            lookup_by_index(17),
            Some((b":method".as_slice(), b"GET".as_slice()))
        );
    }

    #[test]
    fn test_index_covers_every_entry() {
        for (idx, entry) in STATIC_TABLE.iter().enumerate() {
            let name_entry = name_entry(entry.name).unwrap();
            if entry.value.is_empty() {
                assert_eq!(name_entry.default_index, idx);
                assert!(name_entry.is_name_only());
            } else {
                assert_eq!(name_entry.values[entry.value], idx);
            }
        }
    }

    #[test]
    fn test_every_index_entry_is_in_table() {
        for (name, entry) in ENCODER_INDEX.iter() {
            assert_eq!(STATIC_TABLE[entry.default_index].name, *name);
            for (value, &idx) in &entry.values {
                assert_eq!(STATIC_TABLE[idx].name, *name);
                assert_eq!(STATIC_TABLE[idx].value, *value);
            }
        }
    }
}
