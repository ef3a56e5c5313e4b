/// Conversion of values accepted by the store.
///
/// `None` stays the null marker, strings pass through unchanged, and any
/// other scalar is stored as its `Display` text.
pub trait OptionValue {
    fn into_option_value(self) -> Option<String>;
}

impl OptionValue for String {
    fn into_option_value(self) -> Option<String> {
        Some(self)
    }
}

impl OptionValue for &str {
    fn into_option_value(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl OptionValue for &String {
    fn into_option_value(self) -> Option<String> {
        Some(self.clone())
    }
}

impl<T: OptionValue> OptionValue for Option<T> {
    fn into_option_value(self) -> Option<String> {
        self.and_then(OptionValue::into_option_value)
    }
}

macro_rules! display_value {
    ($($ty:ty)*) => {
        $(
            impl OptionValue for $ty {
                fn into_option_value(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

display_value! {
    bool char i8 i16 i32 i64 i128 isize u8 u16 u32 u64 u128 usize f32 f64
}

impl OptionValue for std::path::PathBuf {
    fn into_option_value(self) -> Option<String> {
        Some(self.display().to_string())
    }
}

impl OptionValue for &std::path::Path {
    fn into_option_value(self) -> Option<String> {
        Some(self.display().to_string())
    }
}
