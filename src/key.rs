//! Coercion of keys to the text the slot hasher works on

use std::{borrow::Cow, iter, num::FpCategory};

/// A key that can be hashed by `ChainedHashMap`.
///
/// Hashing only ever sees the textual form of a key, so two different keys with the same
/// text (`1u8` and `1i64`, or `"1"` and `1`) hash identically. Equality for lookups is still
/// the key type's own `PartialEq`. An absent key (`None`) hashes as the empty string.
///
/// Types that are looked up through `Borrow` must produce the same text as the owned form,
/// as `String` and `str` do. Keys that compare equal must produce the same text; floats
/// therefore render both zeros as `"0"`.
pub trait KeyText {
    /// Textual representation fed to the hasher
    fn key_text(&self) -> Cow<'_, str>;
}

impl KeyText for str {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl KeyText for String {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl KeyText for Cow<'_, str> {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_ref())
    }
}

impl<T: KeyText + ?Sized> KeyText for &T {
    fn key_text(&self) -> Cow<'_, str> {
        (**self).key_text()
    }
}

impl<T: KeyText + ?Sized> KeyText for Box<T> {
    fn key_text(&self) -> Cow<'_, str> {
        (**self).key_text()
    }
}

impl<T: KeyText> KeyText for Option<T> {
    fn key_text(&self) -> Cow<'_, str> {
        match self {
            Some(key) => key.key_text(),
            None => Cow::Borrowed(""),
        }
    }
}

/// Implements `KeyText` through `ToString` for types whose `Display` is the wanted text
macro_rules! key_text_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyText for $ty {
                fn key_text(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

key_text_via_display!(
    char, bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
);

/// Implements `KeyText` for floats through [`number_text`]
macro_rules! key_text_via_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyText for $ty {
                fn key_text(&self) -> Cow<'_, str> {
                    Cow::Owned(number_text(
                        self.classify(),
                        self.is_sign_negative(),
                        &format!("{:e}", self.abs()),
                    ))
                }
            }
        )*
    };
}

key_text_via_number!(f32, f64);

/// Number-to-string conversion in the style of ECMAScript `Number::toString`.
///
/// `scientific` is the shortest round-trip form of the magnitude as printed by `{:e}`.
/// Both zeros render as `"0"`, so floats that compare equal always share their text.
/// Decimal exponents from -6 to 20 are written out in plain notation, anything else as
/// `1.5e+21` / `1e-7`.
fn number_text(category: FpCategory, negative: bool, scientific: &str) -> String {
    match category {
        FpCategory::Nan => return "NaN".to_owned(),
        FpCategory::Zero => return "0".to_owned(),
        FpCategory::Infinite if negative => return "-Infinity".to_owned(),
        FpCategory::Infinite => return "Infinity".to_owned(),
        FpCategory::Normal | FpCategory::Subnormal => {}
    }

    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific.to_owned();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific.to_owned();
    };
    let digits: Vec<char> = mantissa.chars().filter(char::is_ascii_digit).collect();
    let count = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    // Number of digits before the decimal point
    let point = exponent.saturating_add(1);
    let zeros = |n: i32| iter::repeat_n('0', usize::try_from(n.unsigned_abs()).unwrap_or(0));

    let mut text = String::new();
    if negative {
        text.push('-');
    }
    if count <= point && point <= 21 {
        text.extend(digits.iter());
        text.extend(zeros(point.saturating_sub(count)));
    } else if 0 < point && point <= 21 {
        let split = usize::try_from(point).unwrap_or(0);
        text.extend(digits.iter().take(split));
        text.push('.');
        text.extend(digits.iter().skip(split));
    } else if -6 < point && point <= 0 {
        text.push_str("0.");
        text.extend(zeros(point));
        text.extend(digits.iter());
    } else {
        let mut rest = digits.iter();
        text.extend(rest.next());
        if count > 1 {
            text.push('.');
            text.extend(rest);
        }
        text.push('e');
        text.push(if exponent < 0 { '-' } else { '+' });
        text.push_str(&exponent.unsigned_abs().to_string());
    }
    text
}
