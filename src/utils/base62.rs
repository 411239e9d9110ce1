//! Base62 encoding over the alphabet `[0-9a-zA-Z]`.

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of Base62 digits needed for any `u64`.
pub const U64_WIDTH: usize = 11;

/// Encodes `value` without leading zeros (`0` encodes as `"0"`).
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(U64_WIDTH);
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Encodes `value` left-padded with `'0'` to exactly [`U64_WIDTH`] digits.
pub fn encode_padded(value: u64) -> String {
    format!("{:0>width$}", encode(value), width = U64_WIDTH)
}
