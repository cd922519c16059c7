//! Code unit value object.

/// A fixed-width element that can be moved through a buffer.
///
/// Buffers are allocated zero-initialised and copied with raw slice copies,
/// so implementors must be plain data.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - the all-zero bit pattern is a valid value,
/// - the type has no padding bytes and no drop glue,
/// - if `BYTE_PUNNABLE` is `true`, *every* bit pattern is a valid value.
pub unsafe trait CodeUnit: Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Whether the unit may be reinterpreted from raw bytes.
    ///
    /// Same-type copies use a raw slice copy when this is `true` and fall back
    /// to an element-wise copy otherwise.
    const BYTE_PUNNABLE: bool;

    /// Whether the unit is ASCII whitespace (space, `\t`, `\n`, `\v`, `\f`, `\r`).
    fn is_space(self) -> bool;

    /// Whether the unit is a line feed.
    fn is_newline(self) -> bool;
}

macro_rules! impl_integer_code_unit {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive integers have no padding and every bit pattern is valid.
            unsafe impl CodeUnit for $ty {
                const BYTE_PUNNABLE: bool = true;

                #[inline]
                fn is_space(self) -> bool {
                    matches!(self as u64, 0x20 | 0x09..=0x0d)
                }

                #[inline]
                fn is_newline(self) -> bool {
                    self as u64 == 0x0a
                }
            }
        )*
    };
}

impl_integer_code_unit!(u8, i8, u16, i16, u32, i32, u64, i64);

// SAFETY: `char` is 4 bytes without padding and `'\0'` is valid. Not every bit
// pattern is a valid `char`, hence `BYTE_PUNNABLE = false`.
unsafe impl CodeUnit for char {
    const BYTE_PUNNABLE: bool = false;

    #[inline]
    fn is_space(self) -> bool {
        self.is_ascii_whitespace() || self == '\u{0b}'
    }

    #[inline]
    fn is_newline(self) -> bool {
        self == '\n'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_units_are_punnable() {
        assert!(u8::BYTE_PUNNABLE);
        assert!(u16::BYTE_PUNNABLE);
        assert!(i64::BYTE_PUNNABLE);
        assert!(!char::BYTE_PUNNABLE);
    }

    #[test]
    fn test_whitespace_classification() {
        for b in [b' ', b'\t', b'\n', 0x0b, 0x0c, b'\r'] {
            assert!(b.is_space(), "{b:#x} should be whitespace");
        }
        assert!(!b'a'.is_space());
        assert!(!0u8.is_space());
        assert!(!(-1i8).is_space());
        assert!(' '.is_space());
        assert!(!'x'.is_space());
    }

    #[test]
    fn test_newline() {
        assert!(b'\n'.is_newline());
        assert!(0x0au16.is_newline());
        assert!(!b'\r'.is_newline());
        assert!('\n'.is_newline());
    }
}
