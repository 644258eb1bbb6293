/// Appends the escaped form of `byte` to `output`.
///
/// Printable ASCII is written as is, apart from `"`, `'` and `\`. Everything
/// else uses a named escape where there is one and `\xNN` otherwise.
fn escape_byte(byte: u8, output: &mut String) {
    let named = match byte {
        b'"' => r#"\""#,
        b'\'' => r"\'",
        b'\\' => r"\\",
        b'\n' => r"\n",
        b'\r' => r"\r",
        b'\t' => r"\t",
        0x07 => r"\a",
        0x08 => r"\b",
        0x0b => r"\v",
        0x0c => r"\f",
        0x1b => r"\e",
        b' '..=b'~' => {
            output.push(char::from(byte));
            return;
        }
        _ => {
            hex_escape(byte, output);
            return;
        }
    };
    output.push_str(named);
}

fn hex_escape(byte: u8, output: &mut String) {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    output.push_str(r"\x");
    output.push(char::from(DIGITS[usize::from(byte >> 4)]));
    output.push(char::from(DIGITS[usize::from(byte & 0xf)]));
}

/// Renders the bytes of a bare token so that they read back as one token.
///
/// On top of the string escapes, spaces are escaped, parentheses are written
/// as hex escapes, and a leading `#!` is broken up so that it cannot be
/// mistaken for a shebang line.
pub fn escape_token(token: &[u8]) -> String {
    let mut output = String::with_capacity(token.len());

    for (index, &byte) in token.iter().enumerate() {
        match byte {
            b' ' => output.push_str(r"\ "),
            b'(' | b')' => hex_escape(byte, &mut output),
            b'#' if index == 0 && token.get(1) == Some(&b'!') => hex_escape(byte, &mut output),
            _ => escape_byte(byte, &mut output),
        }
    }

    output
}

/// Renders bytes as a double-quoted string literal.
pub fn escape_string(string: &[u8]) -> String {
    let mut output = String::with_capacity(string.len() + 2);
    output.push('"');

    for &byte in string {
        escape_byte(byte, &mut output);
    }

    output.push('"');
    output
}
