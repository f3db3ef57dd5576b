use std::collections::BTreeMap;

/// Compute `api_sig` for a set of request parameters.
///
/// Parameters are concatenated as `keyvalue` in key order, `format` excluded,
/// followed by the shared secret; the result is the lowercase hex MD5 digest.
pub fn sign(params: &BTreeMap<&str, String>, shared_secret: &str) -> String {
    let mut buf = String::new();
    for (key, value) in params.iter().filter(|(k, _)| **k != "format") {
        buf.push_str(key);
        buf.push_str(value);
    }
    buf.push_str(shared_secret);

    format!("{:x}", md5::compute(buf.as_bytes()))
}
